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

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::json;

/// Incident status lifecycle: Triggered → Acknowledged → Resolved, with the
/// direct Triggered → Resolved shortcut. Resolved is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    #[default]
    Triggered,
    Acknowledged,
    Resolved,
}

impl IncidentStatus {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved)
    }

    /// Whether `self → to` is a legal transition.
    pub fn can_transition_to(&self, to: IncidentStatus) -> bool {
        matches!(
            (self, to),
            (Self::Triggered, Self::Acknowledged)
                | (Self::Triggered, Self::Resolved)
                | (Self::Acknowledged, Self::Resolved)
                | (Self::Acknowledged, Self::Triggered)
        )
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Triggered => write!(f, "triggered"),
            Self::Acknowledged => write!(f, "acknowledged"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "triggered" => Ok(Self::Triggered),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            _ => Err("invalid incident status"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    #[default]
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err("invalid severity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    High,
    Low,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            _ => Err("invalid urgency"),
        }
    }
}

/// Where the incident sits in its escalation policy.
///
/// `(status, level)` together encode: None/0 = attached but never fired;
/// Pending/L = at level L waiting for the timeout to advance;
/// Completed/L = final level reached, no further advancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EscalationStatus {
    #[default]
    None,
    Pending,
    Completed,
}

impl std::fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for EscalationStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err("invalid escalation status"),
        }
    }
}

/// Event types recorded in the append-only incident history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentEventType {
    Created,
    AlertMerged,
    Acknowledged,
    Unacknowledged,
    Assigned,
    Escalated,
    EscalationCompleted,
    NotifyFailure,
    Resolved,
}

impl std::fmt::Display for IncidentEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::AlertMerged => write!(f, "alert_merged"),
            Self::Acknowledged => write!(f, "acknowledged"),
            Self::Unacknowledged => write!(f, "unacknowledged"),
            Self::Assigned => write!(f, "assigned"),
            Self::Escalated => write!(f, "escalated"),
            Self::EscalationCompleted => write!(f, "escalation_completed"),
            Self::NotifyFailure => write!(f, "notify_failure"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for IncidentEventType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "alert_merged" => Ok(Self::AlertMerged),
            "acknowledged" => Ok(Self::Acknowledged),
            "unacknowledged" => Ok(Self::Unacknowledged),
            "assigned" => Ok(Self::Assigned),
            "escalated" => Ok(Self::Escalated),
            "escalation_completed" => Ok(Self::EscalationCompleted),
            "notify_failure" => Ok(Self::NotifyFailure),
            "resolved" => Ok(Self::Resolved),
            _ => Err("invalid incident event type"),
        }
    }
}

/// The central entity of the control plane.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Incident {
    pub id: String,
    pub org_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    pub urgency: Urgency,
    pub status: IncidentStatus,
    /// Origin tag, e.g. `datadog`, `prometheus`, `uptime`.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Count of deduplicated alerts merged into this incident, >= 1.
    pub alert_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_policy_id: Option<String>,
    /// 0 means the policy has not fired yet.
    pub current_escalation_level: i32,
    pub escalation_status: EscalationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_escalated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_due_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<i64>,
}

/// Input for incident creation, produced by alert ingest or the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NewIncident {
    pub org_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub incident_key: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub escalation_policy_id: Option<String>,
}

/// One row in the append-only incident history. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentEvent {
    pub id: String,
    pub org_id: String,
    pub incident_id: String,
    pub event_type: IncidentEventType,
    pub event_data: json::Value,
    /// User id, or `system` for engine- and source-originated events.
    pub created_by: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use IncidentStatus::*;
        assert!(Triggered.can_transition_to(Acknowledged));
        assert!(Triggered.can_transition_to(Resolved));
        assert!(Acknowledged.can_transition_to(Resolved));
        // explicit un-acknowledge
        assert!(Acknowledged.can_transition_to(Triggered));
        // resolved is terminal
        assert!(!Resolved.can_transition_to(Triggered));
        assert!(!Resolved.can_transition_to(Acknowledged));
        assert!(!Resolved.can_transition_to(Resolved));
        // no self loops
        assert!(!Triggered.can_transition_to(Triggered));
        assert!(!Acknowledged.can_transition_to(Acknowledged));
    }

    #[test]
    fn test_status_open() {
        assert!(IncidentStatus::Triggered.is_open());
        assert!(IncidentStatus::Acknowledged.is_open());
        assert!(!IncidentStatus::Resolved.is_open());
    }

    #[test]
    fn test_enum_parse_roundtrip() {
        for s in [Severity::Critical, Severity::High, Severity::Warning, Severity::Info] {
            assert_eq!(s.to_string().parse::<Severity>().unwrap(), s);
        }
        for s in [
            EscalationStatus::None,
            EscalationStatus::Pending,
            EscalationStatus::Completed,
        ] {
            assert_eq!(s.to_string().parse::<EscalationStatus>().unwrap(), s);
        }
        for t in [
            IncidentEventType::Created,
            IncidentEventType::AlertMerged,
            IncidentEventType::Escalated,
            IncidentEventType::EscalationCompleted,
            IncidentEventType::NotifyFailure,
            IncidentEventType::Resolved,
        ] {
            assert_eq!(t.to_string().parse::<IncidentEventType>().unwrap(), t);
        }
        assert!("p1".parse::<Severity>().is_err());
    }
}
