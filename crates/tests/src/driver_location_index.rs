/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::*;
use driver_location_service::{
    common::types::*,
    store::coordinator::ReportLocation,
    tools::error::AppError,
};
use rand::seq::SliceRandom;
use std::time::Duration;

#[tokio::test]
async fn reported_location_is_read_back() {
    let (index, _) = index_at(1_010);

    let spots = [
        ("d1", 12.9716, 77.5946),
        ("d2", -90.0, -180.0),
        ("d3", 90.0, 180.0),
        ("d4", 0.0, 0.0),
    ];
    for (id, lat, lon) in spots {
        let (state, outcome) = index
            .report_location(report(id, lat, lon, 1_000, None))
            .await
            .expect("Failed to report location");
        assert_eq!(outcome, UpdateOutcome::Created);

        let stored = index.get_driver(&driver(id)).await.expect("Driver not found");
        assert_eq!(stored, state);
        assert_eq!((stored.latitude, stored.longitude), (lat, lon));
        assert_eq!(stored.timestamp.millis(), 1_000);
        assert!(stored.is_available);
    }

    assert_eq!(index.list_drivers().await.expect("list").len(), spots.len());
}

#[tokio::test]
async fn missing_timestamp_defaults_to_clock() {
    let (index, clock) = index_at(5_000);
    clock.advance_millis(250);

    let (state, _) = index
        .report_location(ReportLocation {
            driver_id: driver("d1"),
            point: point(37.77, -122.41),
            timestamp: None,
            is_available: None,
        })
        .await
        .expect("Failed to report location");

    assert_eq!(state.timestamp.millis(), 5_250);
}

#[tokio::test]
async fn out_of_range_coordinate_is_rejected_without_side_effects() {
    let (index, _) = index_at(1_000);

    let invalid = ReportLocation {
        driver_id: driver("d1"),
        point: Point {
            lat: Latitude(100.0),
            lon: Longitude(10.0),
        },
        timestamp: Some(at(1_000)),
        is_available: None,
    };
    let result = index.report_location(invalid).await;

    assert!(matches!(result, Err(AppError::InvalidCoordinate(_, _))));
    assert!(index.list_drivers().await.expect("list").is_empty());
    assert!(matches!(
        index.get_driver(&driver("d1")).await,
        Err(AppError::DriverNotFound(_))
    ));
    assert_eq!(index.stats().await.expect("stats").occupied_cells, 0);
}

#[tokio::test]
async fn last_writer_wins_on_timestamp() {
    let (index, _) = index_at(200);

    index
        .report_location(report("d1", 10.0, 10.0, 100, None))
        .await
        .expect("report");
    let (state, outcome) = index
        .report_location(report("d1", 20.0, 20.0, 50, None))
        .await
        .expect("report");
    assert_eq!(outcome, UpdateOutcome::Ignored);
    assert_eq!((state.latitude, state.longitude), (10.0, 10.0));

    let (_, outcome) = index
        .report_location(report("d1", 20.0, 20.0, 100, None))
        .await
        .expect("report");
    assert_eq!(outcome, UpdateOutcome::Ignored);

    let (state, outcome) = index
        .report_location(report("d1", 20.0, 20.0, 150, None))
        .await
        .expect("report");
    assert_eq!(outcome, UpdateOutcome::Moved);
    assert_eq!((state.latitude, state.longitude), (20.0, 20.0));

    let stored = index.get_driver(&driver("d1")).await.expect("driver");
    assert_eq!(stored.timestamp.millis(), 150);
}

#[tokio::test]
async fn newer_report_in_same_cell_is_unchanged_cell() {
    let (index, _) = index_at(1_000);

    index
        .report_location(report("d1", 12.97160, 77.59460, 100, None))
        .await
        .expect("report");
    let (state, outcome) = index
        .report_location(report("d1", 12.97161, 77.59461, 200, None))
        .await
        .expect("report");

    assert_eq!(outcome, UpdateOutcome::Unchanged);
    assert_eq!(state.latitude, 12.97161);
    assert_eq!(index.stats().await.expect("stats").occupied_cells, 1);
}

#[tokio::test]
async fn repeated_report_is_idempotent() {
    let (index, _) = index_at(1_000);
    let ping = report("d1", 37.77, -122.41, 1_000, Some(true));

    let (first, _) = index.report_location(ping.clone()).await.expect("report");
    let (second, outcome) = index.report_location(ping).await.expect("report");

    assert_eq!(outcome, UpdateOutcome::Ignored);
    assert_eq!(first, second);
    assert_eq!(index.get_driver(&driver("d1")).await.expect("driver"), first);
}

#[tokio::test]
async fn availability_defaults_and_persists_across_reports() {
    let (index, _) = index_at(1_000);

    let (state, _) = index
        .report_location(report("d1", 1.0, 1.0, 100, None))
        .await
        .expect("report");
    assert!(state.is_available);

    let state = index
        .set_availability(&driver("d1"), false)
        .await
        .expect("availability");
    assert!(!state.is_available);
    assert_eq!(state.timestamp.millis(), 100);

    let (state, _) = index
        .report_location(report("d1", 1.1, 1.1, 200, None))
        .await
        .expect("report");
    assert!(!state.is_available);

    let (state, _) = index
        .report_location(report("d1", 1.2, 1.2, 300, Some(true)))
        .await
        .expect("report");
    assert!(state.is_available);

    let (state, outcome) = index
        .report_location(report("d1", 1.3, 1.3, 250, Some(false)))
        .await
        .expect("report");
    assert_eq!(outcome, UpdateOutcome::Ignored);
    assert!(state.is_available);
}

#[tokio::test]
async fn set_availability_requires_a_known_driver() {
    let (index, _) = index_at(1_000);

    assert!(matches!(
        index.set_availability(&driver("ghost"), true).await,
        Err(AppError::DriverNotFound(_))
    ));
    assert!(matches!(
        index.set_status(&driver("ghost"), true, None).await,
        Err(AppError::DriverNotFound(_))
    ));
}

#[tokio::test]
async fn set_status_with_position_reports_at_current_time() {
    let (index, clock) = index_at(1_000);

    let state = index
        .set_status(&driver("d1"), false, Some(point(37.77, -122.41)))
        .await
        .expect("status");
    assert!(!state.is_available);
    assert_eq!(state.timestamp.millis(), 1_000);

    // Same instant: position is stale but the toggle still applies.
    let state = index
        .set_status(&driver("d1"), true, Some(point(37.78, -122.40)))
        .await
        .expect("status");
    assert!(state.is_available);
    assert_eq!((state.latitude, state.longitude), (37.77, -122.41));

    clock.advance_millis(10);
    let state = index
        .set_status(&driver("d1"), true, Some(point(37.78, -122.40)))
        .await
        .expect("status");
    assert_eq!((state.latitude, state.longitude), (37.78, -122.40));
    assert_eq!(state.timestamp.millis(), 1_010);
}

#[tokio::test]
async fn end_to_end_nearby_scenario() {
    let (index, _) = index_at(1_010);

    index
        .report_location(report("D1", 37.77, -122.41, 1_000, Some(true)))
        .await
        .expect("report");
    index
        .report_location(report("D2", 37.78, -122.40, 1_000, Some(true)))
        .await
        .expect("report");

    let nearby = index
        .find_nearby(point(37.77, -122.41), Radius(5.0))
        .await
        .expect("nearby");
    assert_eq!(ids(&nearby), vec!["D1", "D2"]);
    assert!(nearby[0].distance_km.abs() < 1e-9);
    assert!((1.3..1.5).contains(&nearby[1].distance_km));

    index
        .set_availability(&driver("D1"), false)
        .await
        .expect("availability");

    let nearby = index
        .find_nearby(point(37.77, -122.41), Radius(5.0))
        .await
        .expect("nearby");
    assert_eq!(ids(&nearby), vec!["D2"]);
}

#[tokio::test]
async fn nearby_excludes_far_unavailable_and_stale_drivers() {
    let (index, clock) = index_with_freshness(60_000, 600_000, 100_000);
    let center = point(12.9716, 77.5946);

    index
        .report_location(report("near", 12.9800, 77.6000, 100_000, None))
        .await
        .expect("report");
    index
        .report_location(report("far", 13.1000, 77.5946, 100_000, None))
        .await
        .expect("report");
    index
        .report_location(report("off", 12.9720, 77.5950, 100_000, Some(false)))
        .await
        .expect("report");
    index
        .report_location(report("old", 12.9710, 77.5940, 30_000, None))
        .await
        .expect("report");

    let nearby = index.find_nearby(center, Radius(5.0)).await.expect("nearby");
    assert_eq!(ids(&nearby), vec!["near"]);
    assert!(nearby.iter().all(|found| found.distance_km <= 5.0));

    // Boundary: exactly at the staleness threshold is still fresh.
    clock.set(at(160_000));
    let nearby = index.find_nearby(center, Radius(5.0)).await.expect("nearby");
    assert_eq!(ids(&nearby), vec!["near"]);

    clock.advance_millis(1);
    let nearby = index.find_nearby(center, Radius(5.0)).await.expect("nearby");
    assert!(nearby.is_empty());

    // Stale drivers are filtered, not removed.
    assert_eq!(index.list_drivers().await.expect("list").len(), 4);
}

#[tokio::test]
async fn nearby_orders_by_distance_then_driver_id() {
    let (index, _) = index_at(1_000);
    let center = point(40.0, -74.0);

    for (id, lat, lon) in [
        ("c", 40.010, -74.0),
        ("b", 40.005, -74.0),
        ("a", 40.005, -74.0),
        ("z", 40.0, -74.0),
    ] {
        index
            .report_location(report(id, lat, lon, 1_000, None))
            .await
            .expect("report");
    }

    let nearby = index.find_nearby(center, Radius(3.0)).await.expect("nearby");
    assert_eq!(ids(&nearby), vec!["z", "a", "b", "c"]);
    assert!(nearby
        .windows(2)
        .all(|pair| pair[0].distance_km <= pair[1].distance_km));
}

#[tokio::test]
async fn nearby_validates_its_inputs() {
    let (index, _) = index_at(1_000);

    for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            index.find_nearby(point(0.0, 0.0), Radius(radius)).await,
            Err(AppError::InvalidRadius(_))
        ));
    }

    let off_globe = Point {
        lat: Latitude(0.0),
        lon: Longitude(181.0),
    };
    assert!(matches!(
        index.find_nearby(off_globe, Radius(1.0)).await,
        Err(AppError::InvalidCoordinate(_, _))
    ));

    let empty = index
        .find_nearby(point(0.0, 0.0), Radius(1.0))
        .await
        .expect("empty result is not an error");
    assert!(empty.is_empty());
}

#[tokio::test]
async fn nearby_crosses_the_antimeridian_and_the_pole() {
    let (index, _) = index_at(1_000);

    index
        .report_location(report("east", 0.0, 179.99, 1_000, None))
        .await
        .expect("report");
    index
        .report_location(report("north", 89.99, 0.0, 1_000, None))
        .await
        .expect("report");

    let nearby = index
        .find_nearby(point(0.0, -179.99), Radius(5.0))
        .await
        .expect("nearby");
    assert_eq!(ids(&nearby), vec!["east"]);
    assert!(nearby[0].distance_km < 2.5);

    let nearby = index
        .find_nearby(point(89.99, 180.0), Radius(5.0))
        .await
        .expect("nearby");
    assert_eq!(ids(&nearby), vec!["north"]);
}

#[tokio::test]
async fn huge_radius_reaches_every_fresh_driver() {
    let (index, _) = index_at(1_000);

    for (id, lat, lon) in [("a", 51.5, -0.12), ("b", -33.86, 151.2), ("c", 35.68, 139.69)] {
        index
            .report_location(report(id, lat, lon, 1_000, None))
            .await
            .expect("report");
    }

    let nearby = index
        .find_nearby(point(0.0, 0.0), Radius(25_000.0))
        .await
        .expect("nearby");
    assert_eq!(nearby.len(), 3);
}

#[tokio::test]
async fn deadline_bounded_query_matches_unbounded_query() {
    let (index, _) = index_at(1_000);
    index
        .report_location(report("d1", 37.77, -122.41, 1_000, None))
        .await
        .expect("report");

    let bounded = index
        .find_nearby_with_deadline(point(37.77, -122.41), Radius(1.0), Duration::from_secs(1))
        .await
        .expect("nearby");
    let unbounded = index
        .find_nearby(point(37.77, -122.41), Radius(1.0))
        .await
        .expect("nearby");
    assert_eq!(bounded, unbounded);
}

#[tokio::test]
async fn available_listing_hides_offline_and_stale_drivers() {
    let (index, clock) = index_with_freshness(1_000, 100_000, 10_000);

    index
        .report_location(report("on", 1.0, 1.0, 10_000, None))
        .await
        .expect("report");
    index
        .report_location(report("off", 1.0, 1.0, 10_000, Some(false)))
        .await
        .expect("report");
    index
        .report_location(report("old", 1.0, 1.0, 8_000, None))
        .await
        .expect("report");

    let available = index.list_available_drivers().await.expect("available");
    let available: Vec<&str> = available.iter().map(|state| state.driver_id.inner()).collect();
    assert_eq!(available, vec!["on"]);

    clock.advance_millis(5_000);
    assert!(index.list_available_drivers().await.expect("available").is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reports_keep_the_latest_timestamp() {
    let (index, _) = index_at(1_000_000);
    let drivers = 20;
    let reports_per_driver = 50;

    let mut reports: Vec<ReportLocation> = (0..drivers)
        .flat_map(|d| {
            (1..=reports_per_driver).map(move |t| {
                // Spread each driver's path across several cells.
                let lat = 10.0 + d as f64 + t as f64 * 0.01;
                let lon = 20.0 + t as f64 * 0.01;
                report(&format!("driver-{d}"), lat, lon, 1_000_000 - 1_000 + t, None)
            })
        })
        .collect();
    reports.shuffle(&mut rand::thread_rng());

    let handles: Vec<_> = reports
        .into_iter()
        .map(|ping| {
            let index = index.clone();
            tokio::spawn(async move { index.report_location(ping).await })
        })
        .collect();
    for result in futures::future::join_all(handles).await {
        result.expect("Task panicked").expect("report");
    }

    for d in 0..drivers {
        let id = format!("driver-{d}");
        let state = index.get_driver(&driver(&id)).await.expect("driver");
        let last = reports_per_driver as f64;
        assert_eq!(state.timestamp.millis(), 1_000_000 - 1_000 + reports_per_driver);
        assert_eq!(state.latitude, 10.0 + d as f64 + last * 0.01);
        assert_eq!(state.longitude, 20.0 + last * 0.01);

        let nearby = index
            .find_nearby(state.point(), Radius(0.5))
            .await
            .expect("nearby");
        assert!(ids(&nearby).contains(&id.as_str()));
    }

    let stats = index.stats().await.expect("stats");
    assert_eq!(stats.tracked_drivers, drivers as usize);
    assert!(stats.occupied_cells <= drivers as usize);
}

#[tokio::test]
async fn closed_index_rejects_operations() {
    let (index, _) = index_at(1_000);
    index
        .report_location(report("d1", 1.0, 1.0, 1_000, None))
        .await
        .expect("report");

    index.close().await;

    assert!(index.is_closed());
    assert!(matches!(
        index.get_driver(&driver("d1")).await,
        Err(AppError::IndexClosed)
    ));
    assert!(matches!(
        index.report_location(report("d2", 1.0, 1.0, 1_000, None)).await,
        Err(AppError::IndexClosed)
    ));
    assert!(matches!(
        index.find_nearby(point(1.0, 1.0), Radius(1.0)).await,
        Err(AppError::IndexClosed)
    ));
    assert!(matches!(index.list_drivers().await, Err(AppError::IndexClosed)));
}
