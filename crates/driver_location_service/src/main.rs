/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{web, App, HttpServer};
use driver_location_service::{
    common::clock::SystemClock,
    domain::api,
    environment::{read_dhall_config, AppState},
    middleware::*,
    reaper::run_reaper,
    tools::{error::AppError, logger::*, prometheus::prometheus_metrics},
};
use std::{
    env::var,
    sync::atomic::{AtomicBool, Ordering},
    sync::Arc,
};
use tokio::signal::unix::{signal, SignalKind};
use tracing_actix_web::TracingLogger;

fn listen_for_termination(kind: SignalKind, graceful_termination_requested: Arc<AtomicBool>) {
    tokio::spawn(async move {
        match signal(kind) {
            Ok(mut stream) => {
                stream.recv().await;
                info!(tag = "[Termination Signal Received]", signal = ?kind);
                graceful_termination_requested.store(true, Ordering::Relaxed);
            }
            Err(err) => {
                error!(tag = "[Signal Handler Registration Failed]", error = %err);
            }
        }
    });
}

#[actix_web::main]
async fn start_server() -> std::io::Result<()> {
    let dhall_config_path = var("DHALL_CONFIG")
        .unwrap_or_else(|_| "./dhall_config/driver_location_service.dhall".to_string());
    let app_config = read_dhall_config(&dhall_config_path).unwrap_or_else(|err| {
        println!("Dhall Config Reading Error : {}", err);
        std::process::exit(1);
    });

    let _guard = setup_tracing(app_config.logger_cfg);

    let port = app_config.port;
    let workers = app_config.workers;

    let app_state = AppState::new(app_config, Arc::new(SystemClock)).unwrap_or_else(|err| {
        error!(tag = "[App State Initialization Failed]", error = %err.message());
        std::process::exit(1);
    });
    let index = app_state.index.clone();
    let reaper_interval = app_state.reaper_interval;

    let data = web::Data::new(app_state);

    let graceful_termination_requested = Arc::new(AtomicBool::new(false));
    listen_for_termination(
        SignalKind::terminate(),
        graceful_termination_requested.to_owned(),
    );
    listen_for_termination(
        SignalKind::interrupt(),
        graceful_termination_requested.to_owned(),
    );

    let reaper_thread = tokio::spawn(run_reaper(
        index.clone(),
        graceful_termination_requested.to_owned(),
        reaper_interval,
    ));

    let prometheus = prometheus_metrics();

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _| AppError::UnprocessibleRequest(err.to_string()).into()),
            )
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|err, _| AppError::InvalidRequest(err.to_string()).into()),
            )
            .app_data(
                web::PathConfig::default()
                    .error_handler(|err, _| AppError::InvalidRequest(err.to_string()).into()),
            )
            .wrap(CheckContentLength)
            .wrap(RequestTimeout)
            .wrap(IncomingRequestMetrics)
            .wrap(TracingLogger::<DomainRootSpanBuilder>::new())
            .wrap(prometheus.clone())
            .configure(api::handler)
    })
    .workers(workers)
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    graceful_termination_requested.store(true, Ordering::Relaxed);
    if let Err(err) = reaper_thread.await {
        error!(tag = "[Reaper Task Failed]", error = %err);
    }
    index.close().await;

    Ok(())
}

fn main() {
    if let Err(err) = start_server() {
        eprintln!("Failed to start the server : {err}");
        std::process::exit(1);
    }
}
