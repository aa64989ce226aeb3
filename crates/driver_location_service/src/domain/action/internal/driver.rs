/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::web::Data;

use crate::{
    common::types::*,
    domain::types::internal::driver::*,
    environment::AppState,
    profile::{DriverDetails, DriverProfile, DriverProfileUpdate},
    tools::error::AppError,
};

pub async fn create_driver(
    data: Data<AppState>,
    request_body: CreateDriverRequest,
) -> Result<DriverProfile, AppError> {
    if request_body.driver_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("driverId is empty".to_string()));
    }

    data.profiles.create_profile(request_body.into()).await
}

pub async fn update_driver(
    data: Data<AppState>,
    driver_id: DriverId,
    request_body: DriverProfileUpdate,
) -> Result<DriverProfile, AppError> {
    data.profiles.update_profile(&driver_id, request_body).await
}

pub async fn get_driver_details(
    data: Data<AppState>,
    driver_id: DriverId,
) -> Result<DriverDetails, AppError> {
    let profile = data.profiles.get_profile(&driver_id).await?;
    let location = match data.index.get_driver(&driver_id).await {
        Ok(location) => Some(location),
        Err(AppError::DriverNotFound(_)) => None,
        Err(err) => return Err(err),
    };

    DriverDetails::join(driver_id.to_owned(), profile, location)
        .ok_or(AppError::DriverNotFound(driver_id.to_string()))
}
