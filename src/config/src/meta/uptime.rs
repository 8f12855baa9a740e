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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MonitorKind {
    #[default]
    Http,
    Tcp,
}

impl std::fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Tcp => write!(f, "tcp"),
        }
    }
}

impl std::str::FromStr for MonitorKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "tcp" => Ok(Self::Tcp),
            _ => Err("invalid monitor kind"),
        }
    }
}

/// A probed target and its last known state. `is_up = None` means the
/// monitor has never been checked.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UptimeMonitor {
    pub id: String,
    pub org_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub name: String,
    /// URL for http monitors, host:port for tcp monitors.
    pub target: String,
    pub kind: MonitorKind,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_latency_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check_at: Option<i64>,
    pub created_at: i64,
}

/// Immutable probe sample, one row per (monitor, location, instant).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckSample {
    pub id: String,
    pub monitor_id: String,
    pub location: String,
    pub is_up: bool,
    pub latency_ms: i64,
    /// HTTP status, or 0 for tcp/connection failures.
    pub status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checked_at: i64,
}

/// State reported by an external monitoring provider for one of its
/// monitors. Produced by provider clients, consumed by the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExternalMonitorState {
    pub external_id: String,
    pub name: String,
    /// None when the provider reports an indeterminate state (paused,
    /// still provisioning); indeterminate states never open or close
    /// incidents.
    pub is_up: Option<bool>,
    #[serde(default)]
    pub raw_status: String,
}

/// Mirror of a provider-managed monitor, upserted by the periodic sync.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExternalMonitor {
    pub id: String,
    pub org_id: String,
    pub provider: String,
    pub external_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_up: Option<bool>,
    #[serde(default)]
    pub raw_status: String,
    pub last_synced_at: i64,
}
