// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::service::uptime::provider;

/// Periodic external provider sync. Each registered provider is bounded
/// by its own minimum interval on top of this loop's cadence.
pub async fn run(shutdown: CancellationToken) {
    let mut interval = time::interval(time::Duration::from_secs(
        config::get_config().uptime.provider_sync_interval,
    ));
    interval.tick().await; // trigger the first run
    log::info!("[UPTIME] provider sync started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                provider::sync_all().await;
            }
            _ = shutdown.cancelled() => {
                log::info!("[UPTIME] provider sync stopped");
                break;
            }
        }
    }
}
