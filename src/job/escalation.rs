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

use crate::service::escalation;

/// The escalation engine loop. Ticks until shutdown; an in-flight tick
/// finishes draining its claimed incidents before the loop exits.
pub async fn run(shutdown: CancellationToken) {
    let mut interval = time::interval(time::Duration::from_secs(
        config::get_config().escalation.tick_interval,
    ));
    interval.tick().await; // trigger the first run
    log::info!("[ESCALATION] engine started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = escalation::run_tick().await {
                    log::error!("[ESCALATION] tick error: {e}");
                }
            }
            _ = shutdown.cancelled() => {
                log::info!("[ESCALATION] engine stopped");
                break;
            }
        }
    }
}
