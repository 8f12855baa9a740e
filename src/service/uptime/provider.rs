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

//! External monitoring provider sync.
//!
//! Concrete provider clients (UptimeRobot, Checkly, ...) are
//! collaborators implementing [`ExternalProvider`]; this module owns the
//! sync engine: idempotent upserts of provider monitor state and the
//! same up/down transition rules as local probes, keyed by the external
//! monitor id.

use std::sync::Arc;

use async_trait::async_trait;
use config::meta::{
    alert::{AlertSource, NormalizedAlert, StatusIntent},
    incident::Severity,
    uptime::ExternalMonitorState,
};
use config::utils::{json, time::now_micros};
use infra::{errors::Result, table::external_monitors};
use once_cell::sync::Lazy;
use tokio::sync::RwLock;

use super::{StateTransition, transition};
use crate::service::alerts::ingest::{self, IngestRoute};

/// One external monitoring account to pull from.
#[async_trait]
pub trait ExternalProvider: Send + Sync + 'static {
    /// Provider tag, e.g. `uptimerobot`.
    fn provider(&self) -> &str;
    /// Organization the synced monitors belong to.
    fn org_id(&self) -> &str;
    /// Minimum seconds between two sync rounds for this provider.
    fn min_sync_interval(&self) -> u64 {
        config::get_config().uptime.provider_sync_interval
    }
    async fn fetch(&self) -> anyhow::Result<Vec<ExternalMonitorState>>;
}

static REGISTRY: Lazy<RwLock<Vec<Arc<dyn ExternalProvider>>>> =
    Lazy::new(|| RwLock::new(Vec::new()));

pub async fn register(provider: Arc<dyn ExternalProvider>) {
    REGISTRY.write().await.push(provider);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub monitors: usize,
    pub incidents_opened: usize,
    pub incidents_resolved: usize,
    /// True when the round was skipped because the provider was synced
    /// too recently.
    pub throttled: bool,
}

/// Sync one provider account. Idempotent: repeated rounds with the same
/// provider state change nothing.
pub async fn sync_provider(provider: &dyn ExternalProvider) -> Result<SyncSummary> {
    let now = now_micros();
    let min_interval_micros = provider.min_sync_interval() as i64 * 1_000_000;
    if let Some(last) = external_monitors::last_synced_at(provider.org_id(), provider.provider()).await?
        && now - last < min_interval_micros
    {
        return Ok(SyncSummary {
            throttled: true,
            ..Default::default()
        });
    }

    let states = provider
        .fetch()
        .await
        .map_err(|e| infra::errors::Error::TransientFailure(format!(
            "provider {} fetch failed: {e}",
            provider.provider()
        )))?;

    let mut summary = SyncSummary {
        monitors: states.len(),
        ..Default::default()
    };

    for state in states {
        let (monitor, previous) = external_monitors::upsert(
            provider.org_id(),
            provider.provider(),
            &state.external_id,
            &state.name,
            state.is_up,
            &state.raw_status,
            now,
        )
        .await?;

        match transition(previous, state.is_up) {
            StateTransition::WentDown => {
                let alert = NormalizedAlert {
                    source: AlertSource::Uptime,
                    title: format!("External monitor {} is down", monitor.name),
                    description: monitor.raw_status.clone(),
                    severity: Severity::Critical,
                    status_intent: StatusIntent::Fire,
                    incident_key: Some(external_key(&monitor.provider, &monitor.external_id)),
                    external_id: Some(monitor.external_id.clone()),
                    payload: json::json!({
                        "provider": monitor.provider,
                        "external_id": monitor.external_id,
                        "raw_status": monitor.raw_status,
                    }),
                };
                ingest::process(provider.org_id(), &IngestRoute::default(), alert).await?;
                summary.incidents_opened += 1;
            }
            StateTransition::Recovered => {
                let alert = NormalizedAlert {
                    source: AlertSource::Uptime,
                    title: format!("External monitor {} recovered", monitor.name),
                    description: String::new(),
                    severity: Severity::Info,
                    status_intent: StatusIntent::Resolve,
                    incident_key: Some(external_key(&monitor.provider, &monitor.external_id)),
                    external_id: Some(monitor.external_id.clone()),
                    payload: json::json!({ "provider": monitor.provider }),
                };
                ingest::process(provider.org_id(), &IngestRoute::default(), alert).await?;
                summary.incidents_resolved += 1;
            }
            StateTransition::Unchanged => {}
        }
    }
    Ok(summary)
}

fn external_key(provider: &str, external_id: &str) -> String {
    format!("{provider}:{external_id}")
}

/// One sync round over every registered provider. Provider failures are
/// isolated: one broken account never blocks the others.
pub async fn sync_all() {
    let providers = REGISTRY.read().await.clone();
    for provider in providers {
        match sync_provider(provider.as_ref()).await {
            Ok(summary) if summary.throttled => {}
            Ok(summary) => {
                log::info!(
                    "[UPTIME] provider {} synced {} monitors ({} opened, {} resolved)",
                    provider.provider(),
                    summary.monitors,
                    summary.incidents_opened,
                    summary.incidents_resolved
                );
            }
            Err(e) => {
                log::error!("[UPTIME] provider {} sync failed: {e}", provider.provider());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_key_format() {
        assert_eq!(external_key("uptimerobot", "m-1"), "uptimerobot:m-1");
    }

    #[test]
    fn test_indeterminate_provider_state_never_transitions() {
        // paused/provisioning monitors report is_up = None
        assert_eq!(transition(Some(true), None), StateTransition::Unchanged);
        assert_eq!(transition(None, None), StateTransition::Unchanged);
        assert_eq!(transition(Some(false), None), StateTransition::Unchanged);
    }
}
