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

//! Alert ingestion: provider payloads are reduced to [`NormalizedAlert`]
//! by pure translators, then run through the keyed upsert or the resolve
//! path. The translators are the only code that understands provider
//! payloads.

use config::{
    SYSTEM_PRINCIPAL,
    meta::{
        alert::{
            AlertSource, NormalizedAlert, StatusIntent, severity_from_datadog_priority,
            severity_from_label,
        },
        incident::{Incident, NewIncident, Severity, Urgency},
        notification::IntentKind,
    },
    utils::json,
};
use infra::{
    errors::{Error, Result},
    table::{escalation_policies, incidents},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::meta::ingestion::{AlertmanagerAlert, AlertmanagerPayload, DatadogEvent},
    service::notifications,
};

/// Routing selected by the webhook URL: where incidents created from
/// this delivery land and which policy drives their escalation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IngestRoute {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub policy_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Created,
    Merged,
    Resolved,
    /// A resolve intent with no matching open incident; idempotent no-op.
    Ignored,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestOutcome {
    pub status: IngestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
}

/// Reduce a Datadog webhook body to the normalized shape.
///
/// Key preference: the configured `aggregate` field, else the event id.
/// A `Recovered` transition resolves; every other transition fires with
/// the priority-mapped severity.
pub fn normalize_datadog(event: &DatadogEvent) -> Result<NormalizedAlert> {
    let event_id = json_scalar_to_string(&event.id);
    if event.title.is_empty() && event_id.is_empty() {
        return Err(Error::BadRequest(
            "datadog event carries neither title nor id".to_string(),
        ));
    }

    let transition = event.transition.as_deref().unwrap_or("").trim();
    let recovered = transition.eq_ignore_ascii_case("recovered");

    let severity = if recovered {
        Severity::Info
    } else {
        severity_from_datadog_priority(event.alert_priority.as_deref().unwrap_or(""))
    };

    let incident_key = match event.aggregate.as_deref() {
        Some(aggregate) if !aggregate.is_empty() => Some(aggregate.to_string()),
        _ if !event_id.is_empty() => Some(event_id.clone()),
        _ => None,
    };

    let title = if event.title.is_empty() {
        format!("Datadog event {event_id}")
    } else {
        event.title.clone()
    };

    Ok(NormalizedAlert {
        source: AlertSource::Datadog,
        title,
        description: event.body.clone().unwrap_or_default(),
        severity,
        status_intent: if recovered {
            StatusIntent::Resolve
        } else {
            StatusIntent::Fire
        },
        incident_key,
        external_id: (!event_id.is_empty()).then_some(event_id),
        payload: json::to_value(event).unwrap_or_default(),
    })
}

/// One Alertmanager envelope yields one normalized alert per entry of
/// `alerts[]`, keyed by the fingerprint.
pub fn normalize_alertmanager(payload: &AlertmanagerPayload) -> Vec<NormalizedAlert> {
    payload.alerts.iter().map(normalize_alertmanager_alert).collect()
}

fn normalize_alertmanager_alert(alert: &AlertmanagerAlert) -> NormalizedAlert {
    let resolved = alert.status.eq_ignore_ascii_case("resolved");

    let title = alert
        .labels
        .get("alertname")
        .cloned()
        .or_else(|| alert.annotations.get("summary").cloned())
        .unwrap_or_else(|| "Prometheus alert".to_string());

    let description = alert
        .annotations
        .get("description")
        .or_else(|| alert.annotations.get("summary"))
        .cloned()
        .unwrap_or_default();

    NormalizedAlert {
        source: AlertSource::Prometheus,
        title,
        description,
        severity: severity_from_label(alert.labels.get("severity").map(String::as_str).unwrap_or("")),
        status_intent: if resolved {
            StatusIntent::Resolve
        } else {
            StatusIntent::Fire
        },
        incident_key: (!alert.fingerprint.is_empty()).then(|| alert.fingerprint.clone()),
        external_id: (!alert.fingerprint.is_empty()).then(|| alert.fingerprint.clone()),
        payload: json::to_value(alert).unwrap_or_default(),
    }
}

fn json_scalar_to_string(value: &json::Value) -> String {
    match value {
        json::Value::String(s) => s.clone(),
        json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Severity decides the default paging urgency.
fn urgency_for(severity: Severity) -> Urgency {
    match severity {
        Severity::Critical | Severity::High => Urgency::High,
        Severity::Warning | Severity::Info => Urgency::Low,
    }
}

/// Run one normalized alert through deduplication or resolution.
pub async fn process(
    org_id: &str,
    route: &IngestRoute,
    alert: NormalizedAlert,
) -> Result<IngestOutcome> {
    match alert.status_intent {
        StatusIntent::Fire => fire(org_id, route, alert).await,
        StatusIntent::Resolve => resolve(org_id, alert).await,
    }
}

async fn fire(org_id: &str, route: &IngestRoute, alert: NormalizedAlert) -> Result<IngestOutcome> {
    // the policy must belong to this org; a dangling policy id on the
    // route is a configuration error, not a reason to drop the alert
    let policy = match route.policy_id.as_deref() {
        Some(policy_id) => {
            let policy = escalation_policies::get(org_id, policy_id).await?;
            if policy.is_none() {
                log::warn!(
                    "[INGEST] org {org_id}: route references unknown escalation policy {policy_id}"
                );
            }
            policy
        }
        None => None,
    };
    let first_timeout = policy
        .as_ref()
        .and_then(|p| p.levels.first())
        .map(|l| l.timeout_secs);

    let new = NewIncident {
        org_id: org_id.to_string(),
        project_id: route.project_id.clone(),
        group_id: route.group_id.clone(),
        title: alert.title.clone(),
        description: alert.description.clone(),
        severity: alert.severity,
        urgency: urgency_for(alert.severity),
        source: alert.source.to_string(),
        incident_key: alert.incident_key.clone(),
        external_id: alert.external_id.clone(),
        escalation_policy_id: policy.map(|p| p.id),
    };

    if alert.incident_key.is_some() {
        let (incident, created) =
            incidents::upsert_by_key(&new, first_timeout, alert.payload, SYSTEM_PRINCIPAL).await?;
        if created {
            notifications::emit(IntentKind::IncidentCreated, &incident, None);
        }
        Ok(IngestOutcome {
            status: if created {
                IngestStatus::Created
            } else {
                IngestStatus::Merged
            },
            incident_id: Some(incident.id),
        })
    } else {
        // no usable dedup key: every delivery yields a fresh incident
        let incident =
            incidents::create(&new, first_timeout, alert.payload, SYSTEM_PRINCIPAL).await?;
        notifications::emit(IntentKind::IncidentCreated, &incident, None);
        Ok(IngestOutcome {
            status: IngestStatus::Created,
            incident_id: Some(incident.id),
        })
    }
}

/// Source-driven resolution: close the open incident holding the key.
/// No matching open incident makes this an idempotent no-op.
async fn resolve(org_id: &str, alert: NormalizedAlert) -> Result<IngestOutcome> {
    let Some(key) = alert.incident_key.as_deref().filter(|k| !k.is_empty()) else {
        return Ok(IngestOutcome {
            status: IngestStatus::Ignored,
            incident_id: None,
        });
    };

    let Some(open) = incidents::find_open_by_key(org_id, key).await? else {
        return Ok(IngestOutcome {
            status: IngestStatus::Ignored,
            incident_id: None,
        });
    };

    let resolved = incidents::resolve(
        org_id,
        &open.id,
        SYSTEM_PRINCIPAL,
        "auto-resolved-by-source",
        None,
    )
    .await?;
    emit_resolved(&resolved);
    Ok(IngestOutcome {
        status: IngestStatus::Resolved,
        incident_id: Some(resolved.id),
    })
}

fn emit_resolved(incident: &Incident) {
    notifications::emit(
        IntentKind::IncidentResolved,
        incident,
        incident.assigned_to.clone(),
    );
}

#[cfg(test)]
mod tests {
    use config::utils::json::json;

    use super::*;

    fn datadog_event(body: json::Value) -> DatadogEvent {
        json::from_value(body).unwrap()
    }

    #[test]
    fn test_datadog_triggered_p1() {
        let event = datadog_event(json!({
            "id": "evt-1",
            "title": "[P1] [Triggered] api down",
            "transition": "Triggered",
            "alert_priority": "P1",
            "aggregate": "abc",
            "body": "api is down"
        }));
        let alert = normalize_datadog(&event).unwrap();
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.status_intent, StatusIntent::Fire);
        assert_eq!(alert.incident_key.as_deref(), Some("abc"));
        assert_eq!(alert.external_id.as_deref(), Some("evt-1"));
        assert_eq!(alert.description, "api is down");
    }

    #[test]
    fn test_datadog_recovered_overrides_severity() {
        let event = datadog_event(json!({
            "id": "evt-2",
            "title": "[P1] [Recovered] api down",
            "transition": "Recovered",
            "alert_priority": "P1",
            "aggregate": "abc"
        }));
        let alert = normalize_datadog(&event).unwrap();
        assert_eq!(alert.severity, Severity::Info);
        assert_eq!(alert.status_intent, StatusIntent::Resolve);
        assert_eq!(alert.incident_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_datadog_key_falls_back_to_event_id() {
        let event = datadog_event(json!({
            "id": 4242,
            "title": "disk filling up",
            "transition": "Warn",
            "alert_priority": "P3"
        }));
        let alert = normalize_datadog(&event).unwrap();
        assert_eq!(alert.incident_key.as_deref(), Some("4242"));
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.status_intent, StatusIntent::Fire);
    }

    #[test]
    fn test_datadog_unknown_priority_defaults_to_warning() {
        let event = datadog_event(json!({
            "id": "evt-3",
            "title": "odd event",
            "transition": "Renotify"
        }));
        let alert = normalize_datadog(&event).unwrap();
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.status_intent, StatusIntent::Fire);
    }

    #[test]
    fn test_datadog_empty_event_rejected() {
        let event = datadog_event(json!({}));
        assert!(normalize_datadog(&event).is_err());
    }

    #[test]
    fn test_alertmanager_firing_and_resolved() {
        let payload: AlertmanagerPayload = json::from_value(json!({
            "receiver": "oncall",
            "status": "firing",
            "alerts": [
                {
                    "status": "firing",
                    "labels": {"alertname": "HighErrorRate", "severity": "CRITICAL"},
                    "annotations": {"description": "error rate above 5%"},
                    "fingerprint": "fp1"
                },
                {
                    "status": "resolved",
                    "labels": {"alertname": "HighLatency", "severity": "warn"},
                    "annotations": {},
                    "fingerprint": "fp2"
                }
            ]
        }))
        .unwrap();

        let alerts = normalize_alertmanager(&payload);
        assert_eq!(alerts.len(), 2);

        assert_eq!(alerts[0].title, "HighErrorRate");
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].status_intent, StatusIntent::Fire);
        assert_eq!(alerts[0].incident_key.as_deref(), Some("fp1"));
        assert_eq!(alerts[0].description, "error rate above 5%");

        assert_eq!(alerts[1].severity, Severity::Warning);
        assert_eq!(alerts[1].status_intent, StatusIntent::Resolve);
        assert_eq!(alerts[1].incident_key.as_deref(), Some("fp2"));
    }

    #[test]
    fn test_alertmanager_missing_fingerprint_yields_no_key() {
        let payload: AlertmanagerPayload = json::from_value(json!({
            "alerts": [
                {"status": "firing", "labels": {"alertname": "A"}, "annotations": {}}
            ]
        }))
        .unwrap();
        let alerts = normalize_alertmanager(&payload);
        assert_eq!(alerts[0].incident_key, None);
    }

    #[test]
    fn test_urgency_mapping() {
        assert_eq!(urgency_for(Severity::Critical), Urgency::High);
        assert_eq!(urgency_for(Severity::High), Urgency::High);
        assert_eq!(urgency_for(Severity::Warning), Urgency::Low);
        assert_eq!(urgency_for(Severity::Info), Urgency::Low);
    }
}
