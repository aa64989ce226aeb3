/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_message: String,
    pub error_code: String,
}

#[macros::add_error]
pub enum AppError {
    InternalError(String),
    InvalidRequest(String),
    UnprocessibleRequest(String),
    InvalidConfiguration(String),
    LargePayloadSize(usize, usize),
    InvalidCoordinate(f64, f64),
    InvalidRadius(f64),
    DriverNotFound(String),
    DriverAlreadyExists(String),
    /// Reserved: concurrent location writes resolve by last-writer-wins and never conflict.
    Conflict(String),
    RequestTimeout,
    IndexInconsistency(String),
    IndexClosed,
}

impl AppError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidRequest(err) => err.to_string(),
            AppError::UnprocessibleRequest(err) => err.to_string(),
            AppError::InvalidConfiguration(err) => format!("Invalid configuration : {err}"),
            AppError::LargePayloadSize(length, limit) => {
                format!("Content length ({length} Bytes) greater than allowed maximum limit : ({limit} Bytes)")
            }
            AppError::InvalidCoordinate(lat, lon) => {
                format!("Invalid coordinate : (Lat : {lat}, Lon : {lon})")
            }
            AppError::InvalidRadius(radius) => {
                format!("Invalid radius : {radius} (must be a finite number greater than 0)")
            }
            AppError::DriverNotFound(driver_id) => format!("Driver not found : {driver_id}"),
            AppError::DriverAlreadyExists(driver_id) => {
                format!("Driver already exists : {driver_id}")
            }
            AppError::Conflict(err) => format!("Conflicting update : {err}"),
            AppError::RequestTimeout => "Request timed out".to_string(),
            AppError::IndexInconsistency(driver_id) => {
                format!("Location index is inconsistent for driver : {driver_id}")
            }
            AppError::IndexClosed => "Location index is closed".to_string(),
        }
    }

    pub fn code(&self) -> String {
        match self {
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::UnprocessibleRequest(_) => "UNPROCESSIBLE_REQUEST",
            AppError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            AppError::LargePayloadSize(_, _) => "LARGE_PAYLOAD_SIZE",
            AppError::InvalidCoordinate(_, _) => "INVALID_COORDINATE",
            AppError::InvalidRadius(_) => "INVALID_RADIUS",
            AppError::DriverNotFound(_) => "DRIVER_NOT_FOUND",
            AppError::DriverAlreadyExists(_) => "DRIVER_ALREADY_EXISTS",
            AppError::Conflict(_) => "CONFLICT",
            AppError::RequestTimeout => "REQUEST_TIMEOUT",
            AppError::IndexInconsistency(_) => "INDEX_INCONSISTENCY",
            AppError::IndexClosed => "INDEX_CLOSED",
        }
        .to_string()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessibleRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::LargePayloadSize(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidCoordinate(_, _) => StatusCode::BAD_REQUEST,
            AppError::InvalidRadius(_) => StatusCode::BAD_REQUEST,
            AppError::DriverNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DriverAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::IndexInconsistency(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IndexClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
