/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get,
    web::{Data, Json, Path, Query},
    HttpRequest,
};

use crate::{
    common::types::*,
    domain::{action::internal::location, api::parse_header, types::internal::location::*},
    environment::AppState,
    tools::error::AppError,
};

#[get("/drivers/all")]
pub async fn get_all_drivers(data: Data<AppState>) -> Result<Json<DriversListResponse>, AppError> {
    Ok(Json(location::get_all_drivers(data).await?))
}

#[get("/drivers/available")]
pub async fn get_available_drivers(
    data: Data<AppState>,
) -> Result<Json<DriversListResponse>, AppError> {
    Ok(Json(location::get_available_drivers(data).await?))
}

#[get("/drivers/nearby")]
pub async fn get_nearby_drivers(
    data: Data<AppState>,
    query: Query<NearbyDriversQuery>,
    req: HttpRequest,
) -> Result<Json<NearbyDriversResponse>, AppError> {
    let latitude: f64 = parse_header(&req, "latitude")?;
    let longitude: f64 = parse_header(&req, "longitude")?;

    Ok(Json(
        location::get_nearby_drivers(data, latitude, longitude, query.into_inner().radius).await?,
    ))
}

#[get("/drivers/{driverId}")]
pub async fn get_driver_location(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<DriverState>, AppError> {
    let driver_id = path.into_inner();

    Ok(Json(
        location::get_driver_location(data, DriverId(driver_id)).await?,
    ))
}
