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

//! `SeaORM` Entity for the uptime_checks table (immutable samples)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "uptime_checks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub monitor_id: String,
    /// Edge location that ran the probe
    pub location: String,
    pub is_up: bool,
    pub latency_ms: i64,
    /// HTTP status, or 0 for tcp/connection failures
    pub status: i32,
    pub error: Option<String>,
    pub checked_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::uptime_monitors::Entity",
        from = "Column::MonitorId",
        to = "super::uptime_monitors::Column::Id"
    )]
    UptimeMonitors,
}

impl Related<super::uptime_monitors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UptimeMonitors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
