/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type Shard = FxHashMap<DriverId, DriverState>;

/// Latest accepted state per driver, split across independently locked shards.
///
/// A driver always maps to the same shard, so holding that shard's write lock serializes every
/// update to the driver.
pub struct LocationRecords {
    shards: Vec<RwLock<Shard>>,
}

impl LocationRecords {
    pub fn new(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shards: (0..shard_count)
                .map(|_| RwLock::new(FxHashMap::default()))
                .collect(),
        }
    }

    fn shard_index(&self, driver_id: &DriverId) -> usize {
        let mut hasher = FxHasher::default();
        driver_id.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    fn shard_of(&self, driver_id: &DriverId) -> &RwLock<Shard> {
        &self.shards[self.shard_index(driver_id)]
    }

    pub async fn read(&self, driver_id: &DriverId) -> RwLockReadGuard<'_, Shard> {
        self.shard_of(driver_id).read().await
    }

    pub async fn write(&self, driver_id: &DriverId) -> RwLockWriteGuard<'_, Shard> {
        self.shard_of(driver_id).write().await
    }

    pub async fn get(&self, driver_id: &DriverId) -> Option<DriverState> {
        self.read(driver_id).await.get(driver_id).cloned()
    }

    /// Looks up several drivers, locking each shard once.
    pub async fn get_many(&self, driver_ids: Vec<DriverId>) -> Vec<DriverState> {
        let mut by_shard: FxHashMap<usize, Vec<DriverId>> = FxHashMap::default();
        for driver_id in driver_ids {
            by_shard
                .entry(self.shard_index(&driver_id))
                .or_default()
                .push(driver_id);
        }

        let mut states = Vec::new();
        for (shard, driver_ids) in by_shard {
            let records = self.shards[shard].read().await;
            states.extend(
                driver_ids
                    .iter()
                    .filter_map(|driver_id| records.get(driver_id).cloned()),
            );
        }
        states
    }

    /// Snapshot of every record; each shard is read consistently, shards independently.
    pub async fn get_all(&self) -> Vec<DriverState> {
        let mut states = Vec::new();
        for shard in &self.shards {
            states.extend(shard.read().await.values().cloned());
        }
        states
    }

    pub async fn len(&self) -> usize {
        let mut len = 0;
        for shard in &self.shards {
            len += shard.read().await.len();
        }
        len
    }

    pub fn shards(&self) -> &[RwLock<Shard>] {
        &self.shards
    }
}
