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

use config::{ider, meta::user::User};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use super::entity::users::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error, unique_violation},
};

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            created_at: model.created_at,
        }
    }
}

pub async fn create(email: &str, display_name: &str) -> Result<User, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = ActiveModel {
        id: Set(ider::generate()),
        email: Set(email.to_string()),
        display_name: Set(display_name.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };

    match model.insert(client).await {
        Ok(model) => Ok(model.into()),
        Err(e) if unique_violation(&e) => Err(Error::ResourceConflict(format!(
            "user {email} already exists"
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn get(id: &str) -> Result<Option<User>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id).one(client).await?.map(User::from))
}

pub async fn get_by_email(email: &str) -> Result<Option<User>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::Email.eq(email))
        .one(client)
        .await?
        .map(User::from))
}
