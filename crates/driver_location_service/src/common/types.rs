/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct DriverId(pub String);

impl DriverId {
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Latitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Longitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Radius(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, PartialOrd, Copy)]
pub struct Kilometers(pub f64);

/// Instant of an accepted update, carried on the wire as milliseconds since the Unix epoch.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
pub struct TimeStamp(#[serde(with = "chrono::serde::ts_milliseconds")] pub DateTime<Utc>);

impl TimeStamp {
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(TimeStamp)
    }

    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Milliseconds elapsed from `self` to `later`; negative when `later` precedes `self`.
    pub fn millis_until(&self, later: &TimeStamp) -> i64 {
        later.millis() - self.millis()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub lat: Latitude,
    pub lon: Longitude,
}

/// Latest accepted state of a single driver.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverState {
    pub driver_id: DriverId,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: TimeStamp,
    pub is_available: bool,
}

impl DriverState {
    pub fn point(&self) -> Point {
        Point {
            lat: Latitude(self.latitude),
            lon: Longitude(self.longitude),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDriver {
    #[serde(flatten)]
    pub state: DriverState,
    pub distance_km: f64,
}

/// How a location report was resolved against the stored state.
#[derive(Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub enum UpdateOutcome {
    #[strum(serialize = "CREATED")]
    Created,
    #[strum(serialize = "MOVED")]
    Moved,
    /// Newer timestamp at the same geo-cell.
    #[strum(serialize = "UNCHANGED_CELL")]
    Unchanged,
    /// Equal or older timestamp, nothing applied.
    #[strum(serialize = "IGNORED")]
    Ignored,
}
