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

//! `SeaORM` Entity for the incidents table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    /// Incident ID (KSUID, primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub org_id: String,

    pub project_id: Option<String>,

    /// Group whose schedule backs `current_schedule` escalation targets
    pub group_id: Option<String>,

    pub title: String,

    pub description: String,

    /// 'critical', 'high', 'warning' or 'info'
    pub severity: String,

    /// 'high' or 'low'
    pub urgency: String,

    /// 'triggered', 'acknowledged' or 'resolved'
    pub status: String,

    /// Origin tag, e.g. 'datadog', 'prometheus', 'uptime'
    pub source: String,

    /// Deduplication key; unique per org among open incidents
    pub incident_key: Option<String>,

    /// Upstream event id
    pub external_id: Option<String>,

    /// Deduplicated alerts merged into this incident, >= 1
    pub alert_count: i32,

    pub escalation_policy_id: Option<String>,

    /// 0 = policy attached but never fired
    pub current_escalation_level: i32,

    /// 'none', 'pending' or 'completed'
    pub escalation_status: String,

    /// When the engine last advanced this incident (microseconds)
    pub last_escalated_at: Option<i64>,

    /// Engine deadline: the incident becomes claimable once this instant
    /// passes. NULL when not subject to escalation.
    pub escalation_due_at: Option<i64>,

    pub assigned_to: Option<String>,

    pub resolution: Option<String>,

    pub created_at: i64,

    pub updated_at: i64,

    pub acknowledged_at: Option<i64>,

    pub resolved_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::incident_events::Entity")]
    IncidentEvents,
}

impl Related<super::incident_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncidentEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
