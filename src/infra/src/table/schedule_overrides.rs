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

use config::{ider, meta::schedule::ScheduleOverride};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::entity::schedule_overrides::{ActiveModel, Column, Entity, Model};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error},
};

impl From<Model> for ScheduleOverride {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            org_id: model.org_id,
            group_id: model.group_id,
            user_id: model.user_id,
            start_at: model.start_at,
            end_at: model.end_at,
            reason: model.reason,
            created_at: model.created_at,
        }
    }
}

pub async fn create(
    org_id: &str,
    group_id: &str,
    user_id: &str,
    start_at: i64,
    end_at: i64,
    reason: &str,
) -> Result<ScheduleOverride, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = ActiveModel {
        id: Set(ider::generate()),
        org_id: Set(org_id.to_string()),
        group_id: Set(group_id.to_string()),
        user_id: Set(user_id.to_string()),
        start_at: Set(start_at),
        end_at: Set(end_at),
        reason: Set(reason.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };
    Ok(model.insert(client).await?.into())
}

/// Overrides whose interval intersects [from, to).
pub async fn list_in_window(
    group_id: &str,
    from: i64,
    to: i64,
) -> Result<Vec<ScheduleOverride>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::GroupId.eq(group_id))
        .filter(Column::StartAt.lt(to))
        .filter(Column::EndAt.gt(from))
        .order_by_asc(Column::StartAt)
        .all(client)
        .await?
        .into_iter()
        .map(ScheduleOverride::from)
        .collect())
}

/// Overrides covering a single instant (start <= at < end).
pub async fn list_covering(
    group_id: &str,
    at: i64,
) -> Result<Vec<ScheduleOverride>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::GroupId.eq(group_id))
        .filter(Column::StartAt.lte(at))
        .filter(Column::EndAt.gt(at))
        .order_by_asc(Column::CreatedAt)
        .all(client)
        .await?
        .into_iter()
        .map(ScheduleOverride::from)
        .collect())
}

pub async fn list(org_id: &str, group_id: Option<&str>) -> Result<Vec<ScheduleOverride>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let mut query = Entity::find().filter(Column::OrgId.eq(org_id));
    if let Some(group_id) = group_id {
        query = query.filter(Column::GroupId.eq(group_id));
    }
    Ok(query
        .order_by_desc(Column::StartAt)
        .all(client)
        .await?
        .into_iter()
        .map(ScheduleOverride::from)
        .collect())
}

pub async fn delete(org_id: &str, id: &str) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::OrgId.eq(org_id))
        .exec(client)
        .await?;
    if res.rows_affected == 0 {
        return Err(Error::ResourceNotFound(format!("override {id}")));
    }
    Ok(())
}
