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

//! Wire shapes of the inbound integrations. These are parsed at the HTTP
//! boundary and immediately reduced to normalized alerts; nothing else in
//! the system touches them.

use std::collections::HashMap;

use config::utils::json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Datadog webhook body. Datadog serializes some numeric fields as
/// strings depending on the webhook template, so `id` and `date` are
/// taken as raw values and normalized during ingest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DatadogEvent {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub id: json::Value,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub date: json::Value,
    #[serde(default)]
    pub org: Option<DatadogOrg>,
    #[serde(default)]
    pub body: Option<String>,
    /// Triggered, Recovered, Warn, No Data, Renotify
    #[serde(default)]
    pub transition: Option<String>,
    /// Deduplication key configured on the Datadog side
    #[serde(default)]
    pub aggregate: Option<String>,
    /// P1..P5
    #[serde(default)]
    pub alert_priority: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DatadogOrg {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub id: json::Value,
    #[serde(default)]
    pub name: Option<String>,
}

/// Prometheus Alertmanager webhook envelope (version 4).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AlertmanagerPayload {
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub alerts: Vec<AlertmanagerAlert>,
    #[serde(default, rename = "groupLabels")]
    pub group_labels: HashMap<String, String>,
    #[serde(default, rename = "commonLabels")]
    pub common_labels: HashMap<String, String>,
    #[serde(default, rename = "commonAnnotations")]
    pub common_annotations: HashMap<String, String>,
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "groupKey")]
    pub group_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AlertmanagerAlert {
    /// firing or resolved
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default, rename = "startsAt")]
    pub starts_at: String,
    #[serde(default, rename = "endsAt")]
    pub ends_at: String,
    /// Alertmanager's stable hash of the label set; the dedup key
    #[serde(default)]
    pub fingerprint: String,
}

/// Batched probe report posted by an edge worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProbeReport {
    pub location: String,
    /// Epoch timestamp; precision is normalized on ingest
    pub timestamp: i64,
    #[serde(default)]
    pub results: Vec<ProbeResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProbeResult {
    pub monitor_id: String,
    pub is_up: bool,
    /// Milliseconds
    #[serde(default)]
    pub latency: i64,
    /// HTTP status, or 0 for tcp/connection failures
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datadog_event_parses_string_and_numeric_ids() {
        let body = r#"{"id": 123456, "title": "[P1] [Triggered] api down", "transition": "Triggered", "alert_priority": "P1"}"#;
        let event: DatadogEvent = json::from_str(body).unwrap();
        assert_eq!(event.title, "[P1] [Triggered] api down");
        assert_eq!(event.transition.as_deref(), Some("Triggered"));

        let body = r#"{"id": "abc-123", "title": "t", "aggregate": "agg-1"}"#;
        let event: DatadogEvent = json::from_str(body).unwrap();
        assert_eq!(event.aggregate.as_deref(), Some("agg-1"));
    }

    #[test]
    fn test_alertmanager_envelope_parses() {
        let body = r#"{
            "receiver": "oncall",
            "status": "firing",
            "alerts": [
                {
                    "status": "firing",
                    "labels": {"alertname": "HighErrorRate", "severity": "critical"},
                    "annotations": {"summary": "error rate > 5%"},
                    "startsAt": "2024-05-01T12:00:00Z",
                    "endsAt": "0001-01-01T00:00:00Z",
                    "fingerprint": "fp1"
                }
            ],
            "groupLabels": {"alertname": "HighErrorRate"},
            "commonLabels": {},
            "commonAnnotations": {},
            "externalURL": "http://alertmanager:9093",
            "version": "4",
            "groupKey": "{}:{alertname=\"HighErrorRate\"}"
        }"#;
        let payload: AlertmanagerPayload = json::from_str(body).unwrap();
        assert_eq!(payload.alerts.len(), 1);
        assert_eq!(payload.alerts[0].fingerprint, "fp1");
        assert_eq!(
            payload.alerts[0].labels.get("severity").map(String::as_str),
            Some("critical")
        );
    }

    #[test]
    fn test_probe_report_parses() {
        let body = r#"{
            "location": "fra1",
            "timestamp": 1714567000,
            "results": [
                {"monitor_id": "mon1", "is_up": false, "latency": 0, "status": 0, "error": "connection refused"}
            ]
        }"#;
        let report: ProbeReport = json::from_str(body).unwrap();
        assert_eq!(report.location, "fra1");
        assert_eq!(report.results.len(), 1);
        assert!(!report.results[0].is_up);
    }
}
