/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! In-memory driver location index.
//!
//! Two structures make up the index: the sharded [`records::LocationRecords`] holding the latest
//! state per driver, and the [`spatial::SpatialIndex`] bucketing drivers by geo-cell. Writers lock
//! the driver's shard, then the spatial index, and update both before releasing either. Readers
//! take one lock at a time and never both.

pub mod coordinator;
pub mod freshness;
pub mod query;
pub mod records;
pub mod spatial;

use self::{
    freshness::FreshnessPolicy,
    records::LocationRecords,
    spatial::{CellGrid, SpatialIndex},
};
use crate::common::clock::Clock;
use crate::tools::{error::AppError, logger::*, prometheus::TRACKED_DRIVERS};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::RwLock;

pub const DEFAULT_CELL_PRECISION: usize = 5;
pub const DEFAULT_STORE_SHARDS: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct IndexConfig {
    pub cell_precision: usize,
    pub store_shards: usize,
    pub freshness: FreshnessPolicy,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_precision: DEFAULT_CELL_PRECISION,
            store_shards: DEFAULT_STORE_SHARDS,
            freshness: FreshnessPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub tracked_drivers: usize,
    pub occupied_cells: usize,
}

pub struct DriverLocationIndex {
    records: LocationRecords,
    spatial: RwLock<SpatialIndex>,
    grid: CellGrid,
    freshness: FreshnessPolicy,
    clock: Arc<dyn Clock>,
    closed: AtomicBool,
}

impl DriverLocationIndex {
    pub fn open(config: IndexConfig, clock: Arc<dyn Clock>) -> Result<Arc<Self>, AppError> {
        if config.store_shards == 0 {
            return Err(AppError::InvalidConfiguration(
                "store_shards must be greater than 0".to_string(),
            ));
        }
        let grid = CellGrid::new(config.cell_precision)?;

        info!(
            tag = "[Location Index Opened]",
            cell_precision = config.cell_precision,
            store_shards = config.store_shards,
            staleness_threshold_ms = config.freshness.staleness_threshold_ms,
            retention_ms = config.freshness.retention_ms
        );

        Ok(Arc::new(Self {
            records: LocationRecords::new(config.store_shards),
            spatial: RwLock::new(SpatialIndex::new(grid)),
            grid,
            freshness: config.freshness,
            clock,
            closed: AtomicBool::new(false),
        }))
    }

    /// Drops every record and rejects all further operations.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut dropped = 0;
        for shard in self.records.shards() {
            let mut records = shard.write().await;
            dropped += records.len();
            records.clear();
        }
        self.spatial.write().await.clear();
        TRACKED_DRIVERS.sub(dropped as i64);

        info!(tag = "[Location Index Closed]", dropped_drivers = dropped);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn stats(&self) -> Result<IndexStats, AppError> {
        self.ensure_open()?;
        let occupied_cells = self.spatial.read().await.occupied_cells();
        Ok(IndexStats {
            tracked_drivers: self.records.len().await,
            occupied_cells,
        })
    }

    fn ensure_open(&self) -> Result<(), AppError> {
        if self.is_closed() {
            Err(AppError::IndexClosed)
        } else {
            Ok(())
        }
    }
}
