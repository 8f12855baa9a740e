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
    meta::organization::{Group, GroupVisibility},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::entity::groups::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error},
};

impl From<Model> for Group {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            org_id: model.org_id,
            project_id: model.project_id,
            name: model.name,
            visibility: model
                .visibility
                .parse()
                .unwrap_or(GroupVisibility::Organization),
            created_at: model.created_at,
        }
    }
}

pub async fn create(
    org_id: &str,
    project_id: Option<&str>,
    name: &str,
    visibility: GroupVisibility,
) -> Result<Group, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = ActiveModel {
        id: Set(ider::generate()),
        org_id: Set(org_id.to_string()),
        project_id: Set(project_id.map(|s| s.to_string())),
        name: Set(name.to_string()),
        visibility: Set(visibility.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };
    Ok(model.insert(client).await?.into())
}

/// Lookup by id alone, for authorization paths that only know the
/// object id.
pub async fn get_any(id: &str) -> Result<Option<Group>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id).one(client).await?.map(Group::from))
}

pub async fn get(org_id: &str, id: &str) -> Result<Option<Group>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(client)
        .await?
        .map(Group::from))
}

pub async fn list(org_id: &str) -> Result<Vec<Group>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .order_by_asc(Column::Name)
        .all(client)
        .await?
        .into_iter()
        .map(Group::from)
        .collect())
}

pub async fn update(
    org_id: &str,
    id: &str,
    name: &str,
    visibility: GroupVisibility,
) -> Result<Group, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(client)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("group {id}")))?;

    let mut active: ActiveModel = row.into();
    active.name = Set(name.to_string());
    active.visibility = Set(visibility.to_string());
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
        return Err(Error::ResourceNotFound(format!("group {id}")));
    }
    Ok(())
}
