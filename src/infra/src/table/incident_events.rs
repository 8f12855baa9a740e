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

//! Append-only incident history. Rows are written inside the same
//! transaction as the incident mutation they witness and are never
//! updated or deleted.

use config::{
    ider,
    meta::incident::{IncidentEvent, IncidentEventType},
    utils::json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::entity::incident_events::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

impl From<Model> for IncidentEvent {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            org_id: model.org_id,
            incident_id: model.incident_id,
            event_type: model
                .event_type
                .parse()
                .unwrap_or(IncidentEventType::Created),
            event_data: model.event_data,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

/// Append one event. `conn` is the transaction of the incident mutation
/// being witnessed; if the append fails the whole mutation rolls back.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    org_id: &str,
    incident_id: &str,
    event_type: IncidentEventType,
    event_data: json::Value,
    created_by: &str,
) -> Result<(), sea_orm::DbErr> {
    let model = ActiveModel {
        id: Set(ider::generate()),
        org_id: Set(org_id.to_string()),
        incident_id: Set(incident_id.to_string()),
        event_type: Set(event_type.to_string()),
        event_data: Set(event_data),
        created_by: Set(created_by.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };
    model.insert(conn).await?;
    Ok(())
}

/// Full event timeline for an incident, oldest first. KSUIDs sort by
/// creation time, so the id is a stable tie-breaker within one
/// microsecond.
pub async fn list(org_id: &str, incident_id: &str) -> Result<Vec<IncidentEvent>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .filter(Column::IncidentId.eq(incident_id))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(client)
        .await?
        .into_iter()
        .map(IncidentEvent::from)
        .collect())
}
