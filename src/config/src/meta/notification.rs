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

//! Typed notification intents. The control plane emits these; delivery,
//! retry and fan-out belong to the notification collaborator.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::incident::{Incident, IncidentStatus, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    IncidentCreated,
    IncidentAssigned,
    IncidentEscalated,
    IncidentAcknowledged,
    IncidentResolved,
    ExternalDispatch,
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncidentCreated => write!(f, "incident_created"),
            Self::IncidentAssigned => write!(f, "incident_assigned"),
            Self::IncidentEscalated => write!(f, "incident_escalated"),
            Self::IncidentAcknowledged => write!(f, "incident_acknowledged"),
            Self::IncidentResolved => write!(f, "incident_resolved"),
            Self::ExternalDispatch => write!(f, "external_dispatch"),
        }
    }
}

/// Small denormalized view carried on every intent so transports do not
/// have to read the incident back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentSummary {
    pub incident_id: String,
    pub org_id: String,
    pub title: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub escalation_level: i32,
}

impl From<&Incident> for IncidentSummary {
    fn from(incident: &Incident) -> Self {
        Self {
            incident_id: incident.id.clone(),
            org_id: incident.org_id.clone(),
            title: incident.title.clone(),
            severity: incident.severity,
            status: incident.status,
            escalation_level: incident.current_escalation_level,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationIntent {
    pub kind: IntentKind,
    pub org_id: String,
    pub incident_id: String,
    /// Absent for external dispatch and broadcast-style intents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
    pub summary: IncidentSummary,
    pub created_at: i64,
}
