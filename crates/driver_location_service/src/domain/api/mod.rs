/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
pub mod internal;
pub mod ui;

use crate::tools::error::AppError;
use actix_web::{web::ServiceConfig, HttpRequest};
use std::str::FromStr;

/// Registers every route. Fixed `/drivers/...` paths come before `/drivers/{driverId}` so they
/// are not captured as driver ids.
pub fn handler(config: &mut ServiceConfig) {
    config
        .service(ui::healthcheck::health_check)
        .service(ui::location::update_driver_location)
        .service(ui::location::set_driver_status)
        .service(internal::driver::create_driver)
        .service(internal::location::get_all_drivers)
        .service(internal::location::get_available_drivers)
        .service(internal::location::get_nearby_drivers)
        .service(internal::driver::update_driver)
        .service(internal::driver::get_driver_details)
        .service(internal::location::get_driver_location);
}

/// Reads header `name` and parses it as `T`.
pub fn parse_header<T: FromStr>(req: &HttpRequest, name: &str) -> Result<T, AppError> {
    let value = req
        .headers()
        .get(name)
        .and_then(|header_value| header_value.to_str().ok())
        .ok_or(AppError::InvalidRequest(format!("{name} not found")))?;

    value
        .trim()
        .parse::<T>()
        .map_err(|_| AppError::InvalidRequest(format!("{name} is not valid : {value}")))
}
