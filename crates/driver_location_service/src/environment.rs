/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{
    common::{clock::Clock, types::Radius, utils::validate_radius},
    profile::{DriverProfileProvider, InMemoryProfileStore},
    store::{
        freshness::FreshnessPolicy, spatial::MAX_CELL_PRECISION, DriverLocationIndex, IndexConfig,
    },
    tools::{error::AppError, logger::*},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    /// Whole-request deadline in milliseconds.
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub staleness_threshold_ms: i64,
    pub retention_ms: i64,
    /// Seconds between eviction sweeps.
    pub reaper_interval: u64,
    pub cell_precision: usize,
    pub store_shards: usize,
    pub default_radius_km: f64,
}

pub fn read_dhall_config(config_path: &str) -> Result<AppConfig, String> {
    let config = serde_dhall::from_file(config_path).parse::<AppConfig>();
    match config {
        Ok(config) => Ok(config),
        Err(e) => Err(format!("Error reading config: {}", e)),
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |reason: String| Err(AppError::InvalidConfiguration(reason));

        if self.workers == 0 {
            return invalid("workers must be greater than 0".to_string());
        }
        if self.request_timeout == 0 {
            return invalid("request_timeout must be greater than 0".to_string());
        }
        if self.staleness_threshold_ms <= 0 {
            return invalid(format!(
                "staleness_threshold_ms must be positive, got {}",
                self.staleness_threshold_ms
            ));
        }
        if self.retention_ms < self.staleness_threshold_ms {
            return invalid(format!(
                "retention_ms ({}) must not be below staleness_threshold_ms ({})",
                self.retention_ms, self.staleness_threshold_ms
            ));
        }
        if self.reaper_interval == 0 {
            return invalid("reaper_interval must be greater than 0".to_string());
        }
        if self.cell_precision == 0 || self.cell_precision > MAX_CELL_PRECISION {
            return invalid(format!(
                "cell_precision must be within 1..={MAX_CELL_PRECISION}, got {}",
                self.cell_precision
            ));
        }
        if self.store_shards == 0 {
            return invalid("store_shards must be greater than 0".to_string());
        }
        if validate_radius(self.default_radius_km).is_err() {
            return invalid(format!(
                "default_radius_km must be a positive number, got {}",
                self.default_radius_km
            ));
        }

        Ok(())
    }

    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            cell_precision: self.cell_precision,
            store_shards: self.store_shards,
            freshness: FreshnessPolicy {
                staleness_threshold_ms: self.staleness_threshold_ms,
                retention_ms: self.retention_ms,
            },
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<DriverLocationIndex>,
    pub profiles: Arc<dyn DriverProfileProvider>,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub default_radius: Radius,
    pub reaper_interval: u64,
}

impl AppState {
    pub fn new(app_config: AppConfig, clock: Arc<dyn Clock>) -> Result<AppState, AppError> {
        app_config.validate()?;

        let index = DriverLocationIndex::open(app_config.index_config(), clock)?;

        info!(
            tag = "[App State]",
            request_timeout = app_config.request_timeout,
            default_radius_km = app_config.default_radius_km,
            reaper_interval = app_config.reaper_interval
        );

        Ok(AppState {
            index,
            profiles: Arc::new(InMemoryProfileStore::new()),
            request_timeout: app_config.request_timeout,
            max_allowed_req_size: app_config.max_allowed_req_size,
            default_radius: Radius(app_config.default_radius_km),
            reaper_interval: app_config.reaper_interval,
        })
    }
}
