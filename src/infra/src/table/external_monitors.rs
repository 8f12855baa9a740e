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

use config::{ider, meta::uptime::ExternalMonitor};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::entity::external_monitors::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

impl From<Model> for ExternalMonitor {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            org_id: model.org_id,
            provider: model.provider,
            external_id: model.external_id,
            name: model.name,
            is_up: model.is_up,
            raw_status: model.raw_status,
            last_synced_at: model.last_synced_at,
        }
    }
}

pub async fn get(
    org_id: &str,
    provider: &str,
    external_id: &str,
) -> Result<Option<ExternalMonitor>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .filter(Column::Provider.eq(provider))
        .filter(Column::ExternalId.eq(external_id))
        .one(client)
        .await?
        .map(ExternalMonitor::from))
}

/// Idempotent per (org, provider, external_id): insert on first sight,
/// refresh state afterwards. Returns `(monitor, previous_is_up)` so the
/// sync engine can detect transitions.
pub async fn upsert(
    org_id: &str,
    provider: &str,
    external_id: &str,
    name: &str,
    is_up: Option<bool>,
    raw_status: &str,
    synced_at: i64,
) -> Result<(ExternalMonitor, Option<bool>), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let existing = Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .filter(Column::Provider.eq(provider))
        .filter(Column::ExternalId.eq(external_id))
        .one(client)
        .await?;

    match existing {
        Some(row) => {
            let previous = row.is_up;
            let mut active: ActiveModel = row.into();
            active.name = Set(name.to_string());
            active.is_up = Set(is_up);
            active.raw_status = Set(raw_status.to_string());
            active.last_synced_at = Set(synced_at);
            Ok((active.update(client).await?.into(), previous))
        }
        None => {
            let model = ActiveModel {
                id: Set(ider::generate()),
                org_id: Set(org_id.to_string()),
                provider: Set(provider.to_string()),
                external_id: Set(external_id.to_string()),
                name: Set(name.to_string()),
                is_up: Set(is_up),
                raw_status: Set(raw_status.to_string()),
                last_synced_at: Set(synced_at),
            };
            Ok((model.insert(client).await?.into(), None))
        }
    }
}

pub async fn list(org_id: &str, provider: Option<&str>) -> Result<Vec<ExternalMonitor>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let mut query = Entity::find().filter(Column::OrgId.eq(org_id));
    if let Some(provider) = provider {
        query = query.filter(Column::Provider.eq(provider));
    }
    Ok(query
        .order_by_asc(Column::Name)
        .all(client)
        .await?
        .into_iter()
        .map(ExternalMonitor::from)
        .collect())
}

/// Most recent sync instant for a provider within an org; the sync job
/// uses it to bound per-provider sync frequency.
pub async fn last_synced_at(org_id: &str, provider: &str) -> Result<Option<i64>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let row = Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .filter(Column::Provider.eq(provider))
        .order_by_desc(Column::LastSyncedAt)
        .one(client)
        .await?;
    Ok(row.map(|m| m.last_synced_at))
}
