/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{
    histogram_opts, opts, register_histogram, register_histogram_vec, register_int_counter,
    register_int_counter_vec, register_int_gauge, Histogram, HistogramVec, IntCounter,
    IntCounterVec, IntGauge,
};

pub static INCOMING_API: once_cell::sync::Lazy<HistogramVec> = once_cell::sync::Lazy::new(|| {
    register_histogram_vec!(
        opts!("http_request_duration_seconds", "Incoming API requests").into(),
        &["method", "handler", "status_code", "code", "version"]
    )
    .expect("Failed to register incoming API metrics")
});

pub static LOCATION_UPDATES: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("location_updates", "Location updates by outcome"),
            &["outcome"]
        )
        .expect("Failed to register location updates metrics")
    });

pub static NEARBY_QUERY_CANDIDATES: once_cell::sync::Lazy<Histogram> =
    once_cell::sync::Lazy::new(|| {
        register_histogram!(histogram_opts!(
            "nearby_query_candidates",
            "Drivers collected from geo-cells before distance refinement",
            vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]
        ))
        .expect("Failed to register nearby query candidates metrics")
    });

pub static TRACKED_DRIVERS: once_cell::sync::Lazy<IntGauge> = once_cell::sync::Lazy::new(|| {
    register_int_gauge!("tracked_drivers", "Drivers currently held in the location index")
        .expect("Failed to register tracked drivers metrics")
});

pub static DRIVERS_EVICTED: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("drivers_evicted", "Drivers evicted past the retention bound")
        .expect("Failed to register drivers evicted metrics")
});

/// Observes the duration of an incoming API request.
///
/// # Arguments
///
/// * `$method` - The HTTP method of the request (e.g., GET, POST).
/// * `$endpoint` - The endpoint or route of the request.
/// * `$status` - The HTTP status code of the response.
/// * `$code` - The `errorCode` of the response, or `SUCCESS`.
/// * `$start` - The `Instant` when the request was received.
#[macro_export]
macro_rules! incoming_api {
    ($method:expr, $endpoint:expr, $status:expr, $code:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        let version = std::env::var("DEPLOYMENT_VERSION").unwrap_or("DEV".to_string());
        INCOMING_API
            .with_label_values(&[$method, $endpoint, $status, $code, version.as_str()])
            .observe(duration);
    };
}

/// Builds the `PrometheusMetrics` middleware and registers the service metrics on its registry.
///
/// The middleware serves the registry on `/metrics`.
///
/// # Panics
///
/// * If the builder fails or a metric is registered twice on the same registry.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus Metrics");

    prometheus
        .registry
        .register(Box::new(INCOMING_API.to_owned()))
        .expect("Failed to register incoming API metrics");

    prometheus
        .registry
        .register(Box::new(LOCATION_UPDATES.to_owned()))
        .expect("Failed to register location updates metrics");

    prometheus
        .registry
        .register(Box::new(NEARBY_QUERY_CANDIDATES.to_owned()))
        .expect("Failed to register nearby query candidates metrics");

    prometheus
        .registry
        .register(Box::new(TRACKED_DRIVERS.to_owned()))
        .expect("Failed to register tracked drivers metrics");

    prometheus
        .registry
        .register(Box::new(DRIVERS_EVICTED.to_owned()))
        .expect("Failed to register drivers evicted metrics");

    prometheus
}
