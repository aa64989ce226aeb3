/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    patch, post,
    web::{Bytes, Data, Json, Path},
    HttpRequest,
};

use crate::{
    common::types::*,
    domain::{action::ui::location, api::parse_header, types::ui::location::*},
    environment::AppState,
    tools::error::AppError,
};

#[post("/drivers/location")]
pub async fn update_driver_location(
    data: Data<AppState>,
    body: Bytes,
    req: HttpRequest,
) -> Result<Json<UpdateDriverLocationResponse>, AppError> {
    let request_body = if body.iter().all(u8::is_ascii_whitespace) {
        UpdateDriverLocationRequest::default()
    } else {
        serde_json::from_slice::<UpdateDriverLocationRequest>(&body)
            .map_err(|err| AppError::UnprocessibleRequest(err.to_string()))?
    };

    let driver_id: String = parse_header(&req, "driver-id")?;
    let latitude: f64 = parse_header(&req, "latitude")?;
    let longitude: f64 = parse_header(&req, "longitude")?;

    Ok(Json(
        location::update_driver_location(
            data,
            DriverId(driver_id),
            latitude,
            longitude,
            request_body,
        )
        .await?,
    ))
}

#[patch("/drivers/{driverId}/status")]
pub async fn set_driver_status(
    data: Data<AppState>,
    path: Path<String>,
    param_obj: Json<DriverStatusRequest>,
) -> Result<Json<DriverState>, AppError> {
    let driver_id = path.into_inner();
    let request_body = param_obj.into_inner();

    Ok(Json(
        location::set_driver_status(data, DriverId(driver_id), request_body).await?,
    ))
}
