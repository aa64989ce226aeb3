/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::web::Data;
use std::time::Duration;

use crate::{
    common::{types::*, utils::*},
    domain::types::internal::location::*,
    environment::AppState,
    tools::error::AppError,
};

pub async fn get_all_drivers(data: Data<AppState>) -> Result<DriversListResponse, AppError> {
    let drivers = data.index.list_drivers().await?;
    Ok(DriversListResponse {
        count: drivers.len(),
        drivers,
    })
}

pub async fn get_available_drivers(data: Data<AppState>) -> Result<DriversListResponse, AppError> {
    let drivers = data.index.list_available_drivers().await?;
    Ok(DriversListResponse {
        count: drivers.len(),
        drivers,
    })
}

pub async fn get_nearby_drivers(
    data: Data<AppState>,
    latitude: f64,
    longitude: f64,
    radius: Option<f64>,
) -> Result<NearbyDriversResponse, AppError> {
    let center = validate_point(latitude, longitude)?;
    let radius = match radius {
        Some(radius) => validate_radius(radius)?,
        None => data.default_radius,
    };

    let drivers = data
        .index
        .find_nearby_with_deadline(center, radius, Duration::from_millis(data.request_timeout))
        .await?;

    Ok(NearbyDriversResponse {
        radius_km: radius.0,
        drivers,
    })
}

pub async fn get_driver_location(
    data: Data<AppState>,
    driver_id: DriverId,
) -> Result<DriverState, AppError> {
    data.index.get_driver(&driver_id).await
}
