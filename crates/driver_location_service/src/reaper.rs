/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::store::DriverLocationIndex;
use crate::tools::{error::AppError, logger::*};
use std::sync::atomic::{AtomicBool, Ordering};
use std::{sync::Arc, time::Duration};
use tokio::time::{interval, Instant};

/// Periodically evicts drivers past the retention bound until termination is requested or the
/// index is closed.
pub async fn run_reaper(
    index: Arc<DriverLocationIndex>,
    graceful_termination_requested: Arc<AtomicBool>,
    reaper_interval: u64,
) {
    let mut timer = interval(Duration::from_secs(reaper_interval.max(1)));

    loop {
        if graceful_termination_requested.load(Ordering::Relaxed) {
            info!(tag = "[Graceful Shutting Down]", task = "reaper");
            break;
        }
        tokio::select! {
            _ = timer.tick() => {
                let start_time = Instant::now();
                match index.evict_expired().await {
                    Ok(0) => {}
                    Ok(evicted) => {
                        info!(
                            tag = "[Evicted Expired Drivers]",
                            count = evicted,
                            duration_ms = start_time.elapsed().as_millis() as u64
                        );
                    }
                    Err(AppError::IndexClosed) => {
                        info!(tag = "[Location Index Closed]", task = "reaper");
                        break;
                    }
                    Err(err) => {
                        error!(tag = "[Error Evicting Expired Drivers]", error = %err);
                    }
                }
            },
            _ = tokio::time::sleep(Duration::from_secs(1)) => {},
        }
    }
}
