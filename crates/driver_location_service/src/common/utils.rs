/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::tools::error::AppError;
use std::f64::consts::PI;

/// Mean radius of the Earth in meters.
pub const EARTH_RADIUS_IN_METERS: f64 = 6371000.0;

pub fn deg2rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn distance_between_in_meters(latlong1: &Point, latlong2: &Point) -> f64 {
    // Calculating using haversine formula
    let Latitude(lat1) = latlong1.lat;
    let Longitude(lon1) = latlong1.lon;
    let Latitude(lat2) = latlong2.lat;
    let Longitude(lon2) = latlong2.lon;

    let dlat = deg2rad(lat2 - lat1);
    let dlon = deg2rad(lon2 - lon1);

    let rlat1 = deg2rad(lat1);
    let rlat2 = deg2rad(lat2);

    let sq = |x: f64| x * x;

    // Rounding can push h marginally past 1 for antipodal points
    let h = (sq((dlat / 2.0).sin()) + rlat1.cos() * rlat2.cos() * sq((dlon / 2.0).sin())).min(1.0);

    2.0 * EARTH_RADIUS_IN_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn distance_in_km(latlong1: &Point, latlong2: &Point) -> Kilometers {
    Kilometers(distance_between_in_meters(latlong1, latlong2) / 1000.0)
}

pub fn validate_point(lat: f64, lon: f64) -> Result<Point, AppError> {
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);

    if !valid {
        return Err(AppError::InvalidCoordinate(lat, lon));
    }

    Ok(Point {
        lat: Latitude(lat),
        lon: Longitude(lon),
    })
}

pub fn validate_radius(radius_km: f64) -> Result<Radius, AppError> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(AppError::InvalidRadius(radius_km));
    }
    Ok(Radius(radius_km))
}
