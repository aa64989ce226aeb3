/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;

pub const DEFAULT_STALENESS_THRESHOLD_MS: i64 = 5 * 60 * 1000;
pub const DEFAULT_RETENTION_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    /// Drivers silent for longer than this are left out of nearby results and dispatch listings.
    pub staleness_threshold_ms: i64,
    /// Drivers silent for longer than this are dropped from the index.
    pub retention_ms: i64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            staleness_threshold_ms: DEFAULT_STALENESS_THRESHOLD_MS,
            retention_ms: DEFAULT_RETENTION_MS,
        }
    }
}

impl FreshnessPolicy {
    pub fn is_fresh(&self, state: &DriverState, now: &TimeStamp) -> bool {
        state.timestamp.millis_until(now) <= self.staleness_threshold_ms
    }

    pub fn is_expired(&self, state: &DriverState, now: &TimeStamp) -> bool {
        state.timestamp.millis_until(now) > self.retention_ms
    }
}
