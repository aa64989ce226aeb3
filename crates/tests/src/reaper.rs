/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::*;
use driver_location_service::{common::types::*, reaper::run_reaper, tools::error::AppError};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

#[tokio::test]
async fn expired_drivers_are_evicted_from_store_and_cells() {
    let (index, clock) = index_with_freshness(1_000, 10_000, 1_000);

    index
        .report_location(report("old", 12.97, 77.59, 1_000, None))
        .await
        .expect("report");
    index
        .report_location(report("new", 19.07, 72.87, 1_000, None))
        .await
        .expect("report");

    clock.set(at(8_000));
    index
        .report_location(report("new", 19.07, 72.87, 8_000, None))
        .await
        .expect("report");

    assert_eq!(index.evict_expired().await.expect("evict"), 0);

    clock.set(at(11_001));
    assert_eq!(index.evict_expired().await.expect("evict"), 1);

    assert!(matches!(
        index.get_driver(&driver("old")).await,
        Err(AppError::DriverNotFound(_))
    ));
    let stats = index.stats().await.expect("stats");
    assert_eq!(stats.tracked_drivers, 1);
    assert_eq!(stats.occupied_cells, 1);

    // An evicted driver starts over as a new one.
    let (_, outcome) = index
        .report_location(report("old", 12.97, 77.59, 500, None))
        .await
        .expect("report");
    assert_eq!(outcome, UpdateOutcome::Created);
}

#[tokio::test]
async fn reaper_evicts_then_stops_on_termination() {
    let (index, clock) = index_with_freshness(1_000, 10_000, 1_000);
    index
        .report_location(report("d1", 1.0, 1.0, 1_000, None))
        .await
        .expect("report");
    clock.set(at(20_000));

    let graceful_termination_requested = Arc::new(AtomicBool::new(false));
    let reaper = tokio::spawn(run_reaper(
        index.clone(),
        graceful_termination_requested.clone(),
        1,
    ));

    let mut remaining = usize::MAX;
    for _ in 0..50 {
        remaining = index.stats().await.expect("stats").tracked_drivers;
        if remaining == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(remaining, 0);

    graceful_termination_requested.store(true, Ordering::Relaxed);
    tokio::time::timeout(Duration::from_secs(5), reaper)
        .await
        .expect("Reaper did not stop")
        .expect("Reaper panicked");
}

#[tokio::test]
async fn reaper_stops_when_index_closes() {
    let (index, _) = index_at(1_000);
    let reaper = tokio::spawn(run_reaper(
        index.clone(),
        Arc::new(AtomicBool::new(false)),
        1,
    ));

    index.close().await;

    tokio::time::timeout(Duration::from_secs(5), reaper)
        .await
        .expect("Reaper did not stop")
        .expect("Reaper panicked");
}
