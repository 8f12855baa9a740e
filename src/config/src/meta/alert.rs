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

//! The normalized alert shape every ingest source is translated into.
//!
//! Provider payloads are parsed at the HTTP boundary and reduced to
//! [`NormalizedAlert`] by pure functions; nothing downstream of ingest ever
//! sees a raw provider payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::incident::Severity;
use crate::utils::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertSource {
    Datadog,
    Prometheus,
    Uptime,
}

impl std::fmt::Display for AlertSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Datadog => write!(f, "datadog"),
            Self::Prometheus => write!(f, "prometheus"),
            Self::Uptime => write!(f, "uptime"),
        }
    }
}

/// Whether the alert opens (or merges into) an incident or resolves one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusIntent {
    #[default]
    Fire,
    Resolve,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NormalizedAlert {
    pub source: AlertSource,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    pub status_intent: StatusIntent,
    /// Deduplication key, scoped to the organization. Alerts without a
    /// usable key create a fresh incident per delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_key: Option<String>,
    /// Upstream event id, kept for traceability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Original provider payload, carried on the incident event.
    pub payload: json::Value,
}

/// Datadog alert priority (P1..P5) to severity.
pub fn severity_from_datadog_priority(priority: &str) -> Severity {
    match priority.trim().to_uppercase().as_str() {
        "P1" => Severity::Critical,
        "P2" => Severity::High,
        "P3" => Severity::Warning,
        "P4" => Severity::Info,
        _ => Severity::Warning,
    }
}

/// Alertmanager `labels.severity` to severity, case-insensitive with the
/// common aliases; anything unknown lands on warning.
pub fn severity_from_label(label: &str) -> Severity {
    match label.trim().to_lowercase().as_str() {
        "critical" | "crit" | "page" => Severity::Critical,
        "high" | "error" => Severity::High,
        "warning" | "warn" => Severity::Warning,
        "info" | "information" | "low" => Severity::Info,
        _ => Severity::Warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datadog_priority_mapping() {
        assert_eq!(severity_from_datadog_priority("P1"), Severity::Critical);
        assert_eq!(severity_from_datadog_priority("p1"), Severity::Critical);
        assert_eq!(severity_from_datadog_priority("P2"), Severity::High);
        assert_eq!(severity_from_datadog_priority("P3"), Severity::Warning);
        assert_eq!(severity_from_datadog_priority("P4"), Severity::Info);
        // P5, unknown and empty all default to warning
        assert_eq!(severity_from_datadog_priority("P5"), Severity::Warning);
        assert_eq!(severity_from_datadog_priority(""), Severity::Warning);
        assert_eq!(severity_from_datadog_priority("urgent"), Severity::Warning);
    }

    #[test]
    fn test_label_severity_mapping() {
        assert_eq!(severity_from_label("CRITICAL"), Severity::Critical);
        assert_eq!(severity_from_label("Page"), Severity::Critical);
        assert_eq!(severity_from_label("high"), Severity::High);
        assert_eq!(severity_from_label("Warning"), Severity::Warning);
        assert_eq!(severity_from_label("warn"), Severity::Warning);
        assert_eq!(severity_from_label("INFO"), Severity::Info);
        assert_eq!(severity_from_label("whatever"), Severity::Warning);
        assert_eq!(severity_from_label(""), Severity::Warning);
    }
}
