/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::{spatial::Placement, DriverLocationIndex};
use crate::common::{types::*, utils::validate_point};
use crate::tools::{
    error::AppError,
    logger::*,
    prometheus::{DRIVERS_EVICTED, LOCATION_UPDATES, TRACKED_DRIVERS},
};

#[derive(Debug, Clone)]
pub struct ReportLocation {
    pub driver_id: DriverId,
    pub point: Point,
    /// Defaults to the index clock when absent.
    pub timestamp: Option<TimeStamp>,
    pub is_available: Option<bool>,
}

impl DriverLocationIndex {
    /// Applies a location report under last-writer-wins on `timestamp`.
    ///
    /// A report strictly newer than the stored state replaces position and timestamp, and
    /// availability when one is supplied. Anything else is [`UpdateOutcome::Ignored`] and the
    /// stored state is returned unchanged.
    pub async fn report_location(
        &self,
        report: ReportLocation,
    ) -> Result<(DriverState, UpdateOutcome), AppError> {
        self.apply_report(report, false).await
    }

    /// Sets availability without touching position or timestamp.
    pub async fn set_availability(
        &self,
        driver_id: &DriverId,
        is_available: bool,
    ) -> Result<DriverState, AppError> {
        let mut records = self.records.write(driver_id).await;
        self.ensure_open()?;

        let state = records
            .get_mut(driver_id)
            .ok_or_else(|| AppError::DriverNotFound(driver_id.to_string()))?;
        state.is_available = is_available;

        info!(
            tag = "[Availability Updated]",
            driver_id = %driver_id,
            is_available = is_available
        );

        Ok(state.to_owned())
    }

    /// Online/offline toggle from the driver app. With a position it reports that position at
    /// the current time; without one only availability changes.
    pub async fn set_status(
        &self,
        driver_id: &DriverId,
        is_online: bool,
        point: Option<Point>,
    ) -> Result<DriverState, AppError> {
        match point {
            Some(point) => {
                let report = ReportLocation {
                    driver_id: driver_id.to_owned(),
                    point,
                    timestamp: Some(self.clock.now()),
                    is_available: Some(is_online),
                };
                let (state, _) = self.apply_report(report, true).await?;
                Ok(state)
            }
            None => self.set_availability(driver_id, is_online).await,
        }
    }

    /// Removes drivers silent past the retention bound. Returns how many were removed.
    ///
    /// A driver the spatial index disagrees about is left in place and the sweep moves on; the
    /// first such failure is returned once the rest of the index has been swept.
    #[macros::measure_duration]
    pub async fn evict_expired(&self) -> Result<usize, AppError> {
        self.ensure_open()?;
        let now = self.clock.now();
        let mut evicted = 0;
        let mut failure = None;

        for shard in self.records.shards() {
            let mut records = shard.write().await;
            if self.is_closed() {
                failure = Some(AppError::IndexClosed);
                break;
            }

            let expired: Vec<DriverId> = records
                .values()
                .filter(|state| self.freshness.is_expired(state, &now))
                .map(|state| state.driver_id.to_owned())
                .collect();
            if expired.is_empty() {
                continue;
            }

            let mut spatial = self.spatial.write().await;
            for driver_id in expired {
                if let Err(err) = spatial.evict(&driver_id) {
                    failure.get_or_insert(err);
                    continue;
                }
                records.remove(&driver_id);
                evicted += 1;
            }
        }

        if evicted > 0 {
            DRIVERS_EVICTED.inc_by(evicted as u64);
            TRACKED_DRIVERS.sub(evicted as i64);
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(evicted),
        }
    }

    async fn apply_report(
        &self,
        report: ReportLocation,
        force_availability: bool,
    ) -> Result<(DriverState, UpdateOutcome), AppError> {
        let ReportLocation {
            driver_id,
            point,
            timestamp,
            is_available,
        } = report;
        let point = validate_point(point.lat.0, point.lon.0)?;
        let timestamp = timestamp.unwrap_or_else(|| self.clock.now());
        let cell = self.grid.cell_of(&point)?;

        let mut records = self.records.write(&driver_id).await;
        self.ensure_open()?;

        let existing = records.get(&driver_id).cloned();

        if let Some(current) = &existing {
            if current.timestamp >= timestamp {
                let mut state = current.to_owned();
                if let (true, Some(is_available)) = (force_availability, is_available) {
                    if let Some(stored) = records.get_mut(&driver_id) {
                        stored.is_available = is_available;
                        state.is_available = is_available;
                    }
                }

                debug!(
                    tag = "[Location Update Ignored]",
                    driver_id = %driver_id,
                    stored_timestamp = current.timestamp.millis(),
                    incoming_timestamp = timestamp.millis()
                );
                LOCATION_UPDATES
                    .with_label_values(&[UpdateOutcome::Ignored.to_string().as_str()])
                    .inc();
                return Ok((state, UpdateOutcome::Ignored));
            }
        }

        let is_available = is_available
            .or_else(|| existing.as_ref().map(|current| current.is_available))
            .unwrap_or(true);

        let placement = self
            .spatial
            .write()
            .await
            .place(&driver_id, cell, existing.is_some())?;

        let Latitude(latitude) = point.lat;
        let Longitude(longitude) = point.lon;
        let state = DriverState {
            driver_id: driver_id.to_owned(),
            latitude,
            longitude,
            timestamp,
            is_available,
        };
        records.insert(driver_id, state.to_owned());

        let outcome = match placement {
            Placement::Inserted => {
                TRACKED_DRIVERS.inc();
                UpdateOutcome::Created
            }
            Placement::Moved => UpdateOutcome::Moved,
            Placement::Stayed => UpdateOutcome::Unchanged,
        };

        LOCATION_UPDATES
            .with_label_values(&[outcome.to_string().as_str()])
            .inc();
        debug!(
            tag = "[Location Updated]",
            driver_id = %state.driver_id,
            outcome = %outcome,
            timestamp = timestamp.millis()
        );

        Ok((state, outcome))
    }
}
