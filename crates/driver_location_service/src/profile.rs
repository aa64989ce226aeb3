/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Driver profile metadata (name, vehicle, plate). Joined with location state for driver
//! details only; it has no part in spatial lookups.

use crate::common::types::*;
use crate::tools::{error::AppError, logger::*};
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    pub driver_id: DriverId,
    pub name: String,
    pub vehicle_type: Option<String>,
    pub license_plate: Option<String>,
    pub phone_number: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfileUpdate {
    pub name: Option<String>,
    pub vehicle_type: Option<String>,
    pub license_plate: Option<String>,
    pub phone_number: Option<String>,
}

#[async_trait]
pub trait DriverProfileProvider: Send + Sync {
    async fn get_profile(&self, driver_id: &DriverId) -> Result<Option<DriverProfile>, AppError>;

    async fn create_profile(&self, profile: DriverProfile) -> Result<DriverProfile, AppError>;

    async fn update_profile(
        &self,
        driver_id: &DriverId,
        update: DriverProfileUpdate,
    ) -> Result<DriverProfile, AppError>;
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<FxHashMap<DriverId, DriverProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DriverProfileProvider for InMemoryProfileStore {
    async fn get_profile(&self, driver_id: &DriverId) -> Result<Option<DriverProfile>, AppError> {
        Ok(self.profiles.read().await.get(driver_id).cloned())
    }

    async fn create_profile(&self, profile: DriverProfile) -> Result<DriverProfile, AppError> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.driver_id) {
            return Err(AppError::DriverAlreadyExists(profile.driver_id.to_string()));
        }
        profiles.insert(profile.driver_id.to_owned(), profile.to_owned());

        info!(tag = "[Driver Profile Created]", driver_id = %profile.driver_id);
        Ok(profile)
    }

    async fn update_profile(
        &self,
        driver_id: &DriverId,
        update: DriverProfileUpdate,
    ) -> Result<DriverProfile, AppError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(driver_id)
            .ok_or_else(|| AppError::DriverNotFound(driver_id.to_string()))?;

        if let Some(name) = update.name {
            profile.name = name;
        }
        if update.vehicle_type.is_some() {
            profile.vehicle_type = update.vehicle_type;
        }
        if update.license_plate.is_some() {
            profile.license_plate = update.license_plate;
        }
        if update.phone_number.is_some() {
            profile.phone_number = update.phone_number;
        }

        info!(tag = "[Driver Profile Updated]", driver_id = %driver_id);
        Ok(profile.to_owned())
    }
}

/// Profile joined with the latest location state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverDetails {
    pub driver_id: DriverId,
    pub profile: Option<DriverProfile>,
    pub location: Option<DriverState>,
}

impl DriverDetails {
    /// `None` when neither side knows the driver.
    pub fn join(
        driver_id: DriverId,
        profile: Option<DriverProfile>,
        location: Option<DriverState>,
    ) -> Option<Self> {
        if profile.is_none() && location.is_none() {
            return None;
        }
        Some(Self {
            driver_id,
            profile,
            location,
        })
    }
}
