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

use config::{ider, meta::organization::Project};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::entity::projects::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error, unique_violation},
};

impl From<Model> for Project {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            org_id: model.org_id,
            identifier: model.identifier,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

pub async fn create(org_id: &str, identifier: &str, name: &str) -> Result<Project, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = ActiveModel {
        id: Set(ider::generate()),
        org_id: Set(org_id.to_string()),
        identifier: Set(identifier.to_string()),
        name: Set(name.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };

    match model.insert(client).await {
        Ok(model) => Ok(model.into()),
        Err(e) if unique_violation(&e) => Err(Error::ResourceConflict(format!(
            "project identifier {identifier} already exists in org {org_id}"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Lookup by id alone, for authorization paths that only know the
/// object id.
pub async fn get_any(id: &str) -> Result<Option<Project>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id)
        .one(client)
        .await?
        .map(Project::from))
}

pub async fn get(org_id: &str, id: &str) -> Result<Option<Project>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(client)
        .await?
        .map(Project::from))
}

pub async fn list(org_id: &str) -> Result<Vec<Project>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .order_by_asc(Column::Identifier)
        .all(client)
        .await?
        .into_iter()
        .map(Project::from)
        .collect())
}
