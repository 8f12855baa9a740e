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

//! Operations on the single membership relation.

use config::meta::membership::{Membership, ObjectType, Role};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::entity::memberships::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error, unique_violation},
};

impl From<Model> for Membership {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            role: model.role.parse().unwrap_or(Role::Viewer),
            object_type: model.object_type.parse().unwrap_or(ObjectType::Org),
            object_id: model.object_id,
            org_id: model.org_id,
            created_at: model.created_at,
        }
    }
}

pub async fn add(
    user_id: &str,
    role: Role,
    object_type: ObjectType,
    object_id: &str,
    org_id: &str,
) -> Result<Membership, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = ActiveModel {
        user_id: Set(user_id.to_string()),
        object_type: Set(object_type.to_string()),
        object_id: Set(object_id.to_string()),
        role: Set(role.to_string()),
        org_id: Set(org_id.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };

    match model.insert(client).await {
        Ok(model) => Ok(model.into()),
        Err(e) if unique_violation(&e) => Err(Error::ResourceConflict(format!(
            "membership already exists for {user_id} on {object_type}/{object_id}"
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn update_role(
    user_id: &str,
    object_type: ObjectType,
    object_id: &str,
    role: Role,
) -> Result<Membership, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let row = Entity::find_by_id((
        user_id.to_string(),
        object_type.to_string(),
        object_id.to_string(),
    ))
    .one(client)
    .await?
    .ok_or_else(|| {
        Error::ResourceNotFound(format!(
            "membership for {user_id} on {object_type}/{object_id}"
        ))
    })?;

    let mut active: ActiveModel = row.into();
    active.role = Set(role.to_string());
    Ok(active.update(client).await?.into())
}

pub async fn remove(
    user_id: &str,
    object_type: ObjectType,
    object_id: &str,
) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let res = Entity::delete_by_id((
        user_id.to_string(),
        object_type.to_string(),
        object_id.to_string(),
    ))
    .exec(client)
    .await?;
    if res.rows_affected == 0 {
        return Err(Error::ResourceNotFound(format!(
            "membership for {user_id} on {object_type}/{object_id}"
        )));
    }
    Ok(())
}

pub async fn get(
    user_id: &str,
    object_type: ObjectType,
    object_id: &str,
) -> Result<Option<Membership>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id((
        user_id.to_string(),
        object_type.to_string(),
        object_id.to_string(),
    ))
    .one(client)
    .await?
    .map(Membership::from))
}

/// All members of one resource.
pub async fn list_resource_members(
    object_type: ObjectType,
    object_id: &str,
) -> Result<Vec<Membership>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::ObjectType.eq(object_type.to_string()))
        .filter(Column::ObjectId.eq(object_id))
        .order_by_asc(Column::UserId)
        .all(client)
        .await?
        .into_iter()
        .map(Membership::from)
        .collect())
}

/// All memberships one user holds, optionally narrowed to an org.
pub async fn list_user_memberships(
    user_id: &str,
    org_id: Option<&str>,
) -> Result<Vec<Membership>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let mut query = Entity::find().filter(Column::UserId.eq(user_id));
    if let Some(org_id) = org_id {
        query = query.filter(Column::OrgId.eq(org_id));
    }
    Ok(query
        .order_by_asc(Column::ObjectType)
        .all(client)
        .await?
        .into_iter()
        .map(Membership::from)
        .collect())
}

/// Project ids within the org that have at least one direct project
/// membership, i.e. the closed projects.
pub async fn projects_with_members(org_id: &str) -> Result<Vec<String>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let rows: Vec<String> = Entity::find()
        .select_only()
        .column(Column::ObjectId)
        .distinct()
        .filter(Column::OrgId.eq(org_id))
        .filter(Column::ObjectType.eq(ObjectType::Project.to_string()))
        .into_tuple()
        .all(client)
        .await?;
    Ok(rows)
}

/// Whether a project has any direct membership (closed) or none (open).
pub async fn project_member_count(project_id: &str) -> Result<u64, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::ObjectType.eq(ObjectType::Project.to_string()))
        .filter(Column::ObjectId.eq(project_id))
        .count(client)
        .await?)
}
