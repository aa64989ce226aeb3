/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::DriverLocationIndex;
use crate::common::{types::*, utils::*};
use crate::tools::{error::AppError, logger::*, prometheus::NEARBY_QUERY_CANDIDATES};
use std::time::Duration;

impl DriverLocationIndex {
    pub async fn get_driver(&self, driver_id: &DriverId) -> Result<DriverState, AppError> {
        self.ensure_open()?;
        self.records
            .get(driver_id)
            .await
            .ok_or_else(|| AppError::DriverNotFound(driver_id.to_string()))
    }

    /// Every tracked driver regardless of availability or freshness, ordered by id.
    pub async fn list_drivers(&self) -> Result<Vec<DriverState>, AppError> {
        self.ensure_open()?;
        let mut drivers = self.records.get_all().await;
        drivers.sort_by(|a, b| a.driver_id.cmp(&b.driver_id));
        Ok(drivers)
    }

    /// Drivers that can be dispatched right now: available and fresh, ordered by id.
    pub async fn list_available_drivers(&self) -> Result<Vec<DriverState>, AppError> {
        let now = self.clock.now();
        let drivers = self.list_drivers().await?;
        Ok(drivers
            .into_iter()
            .filter(|state| state.is_available && self.freshness.is_fresh(state, &now))
            .collect())
    }

    /// Available, fresh drivers within `radius` of `center`, nearest first, ties broken by id.
    #[macros::measure_duration]
    pub async fn find_nearby(
        &self,
        center: Point,
        radius: Radius,
    ) -> Result<Vec<NearbyDriver>, AppError> {
        self.ensure_open()?;
        let center = validate_point(center.lat.0, center.lon.0)?;
        let radius = validate_radius(radius.0)?;
        let Radius(radius_km) = radius;

        let candidates = self.spatial.read().await.candidates(&center, &radius);
        NEARBY_QUERY_CANDIDATES.observe(candidates.len() as f64);
        let candidate_count = candidates.len();

        let now = self.clock.now();
        let mut nearby: Vec<NearbyDriver> = self
            .records
            .get_many(candidates)
            .await
            .into_iter()
            .filter(|state| state.is_available && self.freshness.is_fresh(state, &now))
            .filter_map(|state| {
                let Kilometers(distance_km) = distance_in_km(&center, &state.point());
                (distance_km <= radius_km).then_some(NearbyDriver { state, distance_km })
            })
            .collect();

        nearby.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.state.driver_id.cmp(&b.state.driver_id))
        });

        debug!(
            tag = "[Nearby Drivers]",
            lat = center.lat.0,
            lon = center.lon.0,
            radius_km = radius_km,
            candidates = candidate_count,
            matched = nearby.len()
        );

        Ok(nearby)
    }

    /// [`DriverLocationIndex::find_nearby`] bounded by `deadline`; no partial result on expiry.
    pub async fn find_nearby_with_deadline(
        &self,
        center: Point,
        radius: Radius,
        deadline: Duration,
    ) -> Result<Vec<NearbyDriver>, AppError> {
        match tokio::time::timeout(deadline, self.find_nearby(center, radius)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(tag = "[Nearby Drivers Timed Out]", deadline_ms = deadline.as_millis() as u64);
                Err(AppError::RequestTimeout)
            }
        }
    }
}
