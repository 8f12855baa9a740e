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

//! Uptime reconciliation: probe reports and provider syncs become
//! incident open/close transitions through the same ingest path as
//! every other alert source, keyed by the monitor id.

use config::meta::{
    alert::{AlertSource, NormalizedAlert, StatusIntent},
    incident::Severity,
    uptime::UptimeMonitor,
};
use config::utils::{json, time::parse_i64_to_timestamp_micros};
use infra::{errors::Result, table::uptime_monitors};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::meta::ingestion::ProbeReport,
    service::alerts::ingest::{self, IngestRoute},
};

pub mod provider;

/// Up/down movement between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransition {
    WentDown,
    Recovered,
    Unchanged,
}

/// The transition table. A first-ever check that is down opens an
/// incident; indeterminate states (None current) never transition.
pub fn transition(previous: Option<bool>, current: Option<bool>) -> StateTransition {
    match (previous, current) {
        (None, Some(false)) => StateTransition::WentDown,
        (Some(true), Some(false)) => StateTransition::WentDown,
        (Some(false), Some(true)) => StateTransition::Recovered,
        _ => StateTransition::Unchanged,
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReportSummary {
    pub processed: usize,
    pub incidents_opened: usize,
    pub alerts_merged: usize,
    pub incidents_resolved: usize,
    pub skipped: usize,
}

/// Reconcile one batched probe report.
///
/// Every down observation is fed through the keyed upsert: the first one
/// opens the incident, repeats merge into it and bump its alert count.
/// An up observation resolves only on a down→up transition; steady up
/// states just record the sample.
pub async fn ingest_report(report: &ProbeReport) -> Result<ReportSummary> {
    let checked_at = parse_i64_to_timestamp_micros(report.timestamp);
    let mut summary = ReportSummary::default();

    for result in &report.results {
        let Some(monitor) = uptime_monitors::get_any(&result.monitor_id).await? else {
            log::warn!(
                "[UPTIME] probe report from {} references unknown monitor {}",
                report.location,
                result.monitor_id
            );
            summary.skipped += 1;
            continue;
        };

        let previous = uptime_monitors::record_check(
            &monitor.id,
            &report.location,
            result.is_up,
            result.latency,
            result.status,
            (!result.error.is_empty()).then_some(result.error.as_str()),
            checked_at,
        )
        .await?;
        summary.processed += 1;

        if !result.is_up {
            let outcome = open_incident(&monitor, result.status, &result.error).await?;
            match outcome.status {
                ingest::IngestStatus::Created => summary.incidents_opened += 1,
                _ => summary.alerts_merged += 1,
            }
        } else if transition(previous.is_up, Some(result.is_up)) == StateTransition::Recovered {
            resolve_incident(&monitor).await?;
            summary.incidents_resolved += 1;
        }
    }
    Ok(summary)
}

async fn open_incident(
    monitor: &UptimeMonitor,
    status: i32,
    error: &str,
) -> Result<ingest::IngestOutcome> {
    let alert = NormalizedAlert {
        source: AlertSource::Uptime,
        title: format!("Monitor {} is down", monitor.name),
        description: if error.is_empty() {
            format!("{} returned status {status}", monitor.target)
        } else {
            format!("{}: {error}", monitor.target)
        },
        severity: Severity::Critical,
        status_intent: StatusIntent::Fire,
        incident_key: Some(monitor.id.clone()),
        external_id: None,
        payload: json::json!({
            "monitor_id": monitor.id,
            "target": monitor.target,
            "status": status,
            "error": error,
        }),
    };
    let route = IngestRoute {
        project_id: monitor.project_id.clone(),
        group_id: None,
        policy_id: None,
    };
    ingest::process(&monitor.org_id, &route, alert).await
}

async fn resolve_incident(monitor: &UptimeMonitor) -> Result<()> {
    let alert = NormalizedAlert {
        source: AlertSource::Uptime,
        title: format!("Monitor {} recovered", monitor.name),
        description: String::new(),
        severity: Severity::Info,
        status_intent: StatusIntent::Resolve,
        incident_key: Some(monitor.id.clone()),
        external_id: None,
        payload: json::json!({ "monitor_id": monitor.id }),
    };
    ingest::process(&monitor.org_id, &IngestRoute::default(), alert).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use StateTransition::*;
        // first check
        assert_eq!(transition(None, Some(false)), WentDown);
        assert_eq!(transition(None, Some(true)), Unchanged);
        // flaps
        assert_eq!(transition(Some(true), Some(false)), WentDown);
        assert_eq!(transition(Some(false), Some(true)), Recovered);
        // steady state
        assert_eq!(transition(Some(true), Some(true)), Unchanged);
        assert_eq!(transition(Some(false), Some(false)), Unchanged);
        // indeterminate current state never transitions
        assert_eq!(transition(Some(true), None), Unchanged);
        assert_eq!(transition(None, None), Unchanged);
    }
}
