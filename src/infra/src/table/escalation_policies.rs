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

use config::{
    ider,
    meta::escalation::{EscalationLevel, EscalationPolicy},
    utils::json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::entity::escalation_policies::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error},
};

impl From<Model> for EscalationPolicy {
    fn from(model: Model) -> Self {
        let levels: Vec<EscalationLevel> =
            json::from_value(model.levels.clone()).unwrap_or_default();
        Self {
            id: model.id,
            org_id: model.org_id,
            name: model.name,
            description: model.description,
            levels,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub async fn create(
    org_id: &str,
    name: &str,
    description: &str,
    levels: &[EscalationLevel],
) -> Result<EscalationPolicy, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();
    let model = ActiveModel {
        id: Set(ider::generate()),
        org_id: Set(org_id.to_string()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        levels: Set(json::to_value(levels)?),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(model.insert(client).await?.into())
}

pub async fn get(org_id: &str, id: &str) -> Result<Option<EscalationPolicy>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(client)
        .await?
        .map(EscalationPolicy::from))
}

pub async fn list(org_id: &str) -> Result<Vec<EscalationPolicy>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .order_by_asc(Column::Name)
        .all(client)
        .await?
        .into_iter()
        .map(EscalationPolicy::from)
        .collect())
}

pub async fn update(
    org_id: &str,
    id: &str,
    name: &str,
    description: &str,
    levels: &[EscalationLevel],
) -> Result<EscalationPolicy, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(client)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("escalation policy {id}")))?;

    let mut active: ActiveModel = row.into();
    active.name = Set(name.to_string());
    active.description = Set(description.to_string());
    active.levels = Set(json::to_value(levels)?);
    active.updated_at = Set(config::utils::time::now_micros());
    Ok(active.update(client).await?.into())
}

pub async fn delete(org_id: &str, id: &str) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::OrgId.eq(org_id))
        .exec(client)
        .await?;
    if res.rows_affected == 0 {
        return Err(Error::ResourceNotFound(format!("escalation policy {id}")));
    }
    Ok(())
}
