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
    meta::uptime::{CheckSample, MonitorKind, UptimeMonitor},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::entity::{
    uptime_checks,
    uptime_monitors::{ActiveModel, Column, Entity, Model},
};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error},
};

impl From<Model> for UptimeMonitor {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            org_id: model.org_id,
            project_id: model.project_id,
            name: model.name,
            target: model.target,
            kind: model.kind.parse().unwrap_or(MonitorKind::Http),
            enabled: model.enabled,
            is_up: model.is_up,
            last_latency_ms: model.last_latency_ms,
            last_status: model.last_status,
            last_error: model.last_error,
            last_check_at: model.last_check_at,
            created_at: model.created_at,
        }
    }
}

impl From<uptime_checks::Model> for CheckSample {
    fn from(model: uptime_checks::Model) -> Self {
        Self {
            id: model.id,
            monitor_id: model.monitor_id,
            location: model.location,
            is_up: model.is_up,
            latency_ms: model.latency_ms,
            status: model.status,
            error: model.error,
            checked_at: model.checked_at,
        }
    }
}

pub async fn create(
    org_id: &str,
    project_id: Option<&str>,
    name: &str,
    target: &str,
    kind: MonitorKind,
    enabled: bool,
) -> Result<UptimeMonitor, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = ActiveModel {
        id: Set(ider::generate()),
        org_id: Set(org_id.to_string()),
        project_id: Set(project_id.map(|s| s.to_string())),
        name: Set(name.to_string()),
        target: Set(target.to_string()),
        kind: Set(kind.to_string()),
        enabled: Set(enabled),
        is_up: Set(None),
        last_latency_ms: Set(None),
        last_status: Set(None),
        last_error: Set(None),
        last_check_at: Set(None),
        created_at: Set(config::utils::time::now_micros()),
    };
    Ok(model.insert(client).await?.into())
}

pub async fn get(org_id: &str, id: &str) -> Result<Option<UptimeMonitor>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(client)
        .await?
        .map(UptimeMonitor::from))
}

/// Lookup without tenant narrowing, for probe reports that carry only the
/// monitor id.
pub async fn get_any(id: &str) -> Result<Option<UptimeMonitor>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id)
        .one(client)
        .await?
        .map(UptimeMonitor::from))
}

pub async fn list(
    org_id: &str,
    project_id: Option<&str>,
) -> Result<Vec<UptimeMonitor>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let mut query = Entity::find().filter(Column::OrgId.eq(org_id));
    if let Some(project_id) = project_id {
        query = query.filter(Column::ProjectId.eq(project_id));
    }
    Ok(query
        .order_by_asc(Column::Name)
        .all(client)
        .await?
        .into_iter()
        .map(UptimeMonitor::from)
        .collect())
}

pub async fn update(
    org_id: &str,
    id: &str,
    name: &str,
    target: &str,
    kind: MonitorKind,
    enabled: bool,
) -> Result<UptimeMonitor, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(client)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("monitor {id}")))?;

    let mut active: ActiveModel = row.into();
    active.name = Set(name.to_string());
    active.target = Set(target.to_string());
    active.kind = Set(kind.to_string());
    active.enabled = Set(enabled);
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
        return Err(Error::ResourceNotFound(format!("monitor {id}")));
    }
    Ok(())
}

/// Apply one probe result: update last-known state and append the
/// immutable check sample, atomically. Returns the monitor state as it
/// was *before* this result, for transition detection.
pub async fn record_check(
    monitor_id: &str,
    location: &str,
    is_up: bool,
    latency_ms: i64,
    status: i32,
    error: Option<&str>,
    checked_at: i64,
) -> Result<UptimeMonitor, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(monitor_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("monitor {monitor_id}")))?;
    let previous: UptimeMonitor = row.clone().into();

    let mut active: ActiveModel = row.into();
    active.is_up = Set(Some(is_up));
    active.last_latency_ms = Set(Some(latency_ms));
    active.last_status = Set(Some(status));
    active.last_error = Set(error.map(|e| e.to_string()));
    active.last_check_at = Set(Some(checked_at));
    active.update(&txn).await?;

    let sample = uptime_checks::ActiveModel {
        id: Set(ider::generate()),
        monitor_id: Set(monitor_id.to_string()),
        location: Set(location.to_string()),
        is_up: Set(is_up),
        latency_ms: Set(latency_ms),
        status: Set(status),
        error: Set(error.map(|e| e.to_string())),
        checked_at: Set(checked_at),
    };
    sample.insert(&txn).await?;

    txn.commit().await?;
    Ok(previous)
}

/// Recent samples for a monitor, newest first.
pub async fn list_checks(
    monitor_id: &str,
    limit: u64,
) -> Result<Vec<CheckSample>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(uptime_checks::Entity::find()
        .filter(uptime_checks::Column::MonitorId.eq(monitor_id))
        .order_by_desc(uptime_checks::Column::CheckedAt)
        .limit(limit)
        .all(client)
        .await?
        .into_iter()
        .map(CheckSample::from)
        .collect())
}
