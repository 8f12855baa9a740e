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

//! `SeaORM` Entity for the uptime_monitors table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "uptime_monitors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub org_id: String,
    pub project_id: Option<String>,
    pub name: String,
    /// URL for http monitors, host:port for tcp monitors
    pub target: String,
    /// 'http' or 'tcp'
    pub kind: String,
    pub enabled: bool,
    /// NULL until the first probe result arrives
    pub is_up: Option<bool>,
    pub last_latency_ms: Option<i64>,
    pub last_status: Option<i32>,
    pub last_error: Option<String>,
    pub last_check_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::uptime_checks::Entity")]
    UptimeChecks,
}

impl Related<super::uptime_checks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UptimeChecks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
