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

use config::{ider, meta::organization::Organization, utils::rand::generate_random_string};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use super::entity::organizations::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error, unique_violation},
};

impl From<Model> for Organization {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            identifier: model.identifier,
            name: model.name,
            ingest_token: Some(model.ingest_token),
            created_at: model.created_at,
        }
    }
}

pub async fn create(identifier: &str, name: &str) -> Result<Organization, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = ActiveModel {
        id: Set(ider::generate()),
        identifier: Set(identifier.to_string()),
        name: Set(name.to_string()),
        ingest_token: Set(generate_random_string(32)),
        created_at: Set(config::utils::time::now_micros()),
    };

    match model.insert(client).await {
        Ok(model) => Ok(model.into()),
        Err(e) if unique_violation(&e) => Err(Error::ResourceConflict(format!(
            "organization identifier {identifier} already exists"
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn get(id: &str) -> Result<Option<Organization>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id)
        .one(client)
        .await?
        .map(Organization::from))
}

pub async fn get_by_identifier(identifier: &str) -> Result<Option<Organization>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::Identifier.eq(identifier))
        .one(client)
        .await?
        .map(Organization::from))
}

/// Validate an inbound webhook token for the org. Used by the ingest
/// endpoints instead of a principal.
pub async fn verify_ingest_token(org_id: &str, token: &str) -> Result<bool, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let row = Entity::find_by_id(org_id).one(client).await?;
    Ok(row.is_some_and(|o| !token.is_empty() && o.ingest_token == token))
}
