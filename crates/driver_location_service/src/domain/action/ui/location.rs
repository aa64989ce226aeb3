/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::web::Data;

use crate::{
    common::{types::*, utils::validate_point},
    domain::types::ui::location::*,
    environment::AppState,
    store::coordinator::ReportLocation,
    tools::{error::AppError, logger::*},
};

pub async fn update_driver_location(
    data: Data<AppState>,
    driver_id: DriverId,
    latitude: f64,
    longitude: f64,
    request_body: UpdateDriverLocationRequest,
) -> Result<UpdateDriverLocationResponse, AppError> {
    let point = validate_point(latitude, longitude)?;

    let timestamp = request_body
        .timestamp
        .map(|millis| {
            TimeStamp::from_millis(millis).ok_or(AppError::InvalidRequest(format!(
                "timestamp is not valid : {millis}"
            )))
        })
        .transpose()?;

    let (driver, outcome) = data
        .index
        .report_location(ReportLocation {
            driver_id,
            point,
            timestamp,
            is_available: request_body.is_online,
        })
        .await?;

    info!(
        tag = "[Driver Location Reported]",
        driver_id = %driver.driver_id,
        outcome = %outcome
    );

    Ok(UpdateDriverLocationResponse {
        driver,
        outcome: outcome.to_string(),
    })
}

pub async fn set_driver_status(
    data: Data<AppState>,
    driver_id: DriverId,
    request_body: DriverStatusRequest,
) -> Result<DriverState, AppError> {
    let point = match (request_body.latitude, request_body.longitude) {
        (Some(latitude), Some(longitude)) => Some(validate_point(latitude, longitude)?),
        (None, None) => None,
        _ => {
            return Err(AppError::InvalidRequest(
                "latitude and longitude must be provided together".to_string(),
            ))
        }
    };

    data.index
        .set_status(&driver_id, request_body.is_online, point)
        .await
}
