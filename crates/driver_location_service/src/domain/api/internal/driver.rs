/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
};

use crate::{
    common::types::*,
    domain::{action::internal::driver, types::internal::driver::*},
    environment::AppState,
    profile::{DriverDetails, DriverProfile, DriverProfileUpdate},
    tools::error::AppError,
};

#[post("/drivers")]
pub async fn create_driver(
    data: Data<AppState>,
    param_obj: Json<CreateDriverRequest>,
) -> Result<Json<DriverProfile>, AppError> {
    let request_body = param_obj.into_inner();

    Ok(Json(driver::create_driver(data, request_body).await?))
}

#[put("/drivers/{driverId}")]
pub async fn update_driver(
    data: Data<AppState>,
    path: Path<String>,
    param_obj: Json<DriverProfileUpdate>,
) -> Result<Json<DriverProfile>, AppError> {
    let driver_id = path.into_inner();
    let request_body = param_obj.into_inner();

    Ok(Json(
        driver::update_driver(data, DriverId(driver_id), request_body).await?,
    ))
}

#[get("/drivers/{driverId}/details")]
pub async fn get_driver_details(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<DriverDetails>, AppError> {
    let driver_id = path.into_inner();

    Ok(Json(
        driver::get_driver_details(data, DriverId(driver_id)).await?,
    ))
}
