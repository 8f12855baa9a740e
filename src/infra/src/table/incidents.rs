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

//! Incident table operations.
//!
//! Every mutation writes its witnessing event row inside the same
//! transaction; a failed event write rolls the mutation back. Keyed
//! upsert relies on the partial unique index over open incidents to
//! serialize racing creators.

use config::{
    ider,
    meta::incident::{
        EscalationStatus, Incident, IncidentEventType, IncidentStatus, NewIncident, Severity,
        Urgency,
    },
    utils::{json, time::now_micros},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{
    entity::incidents::{ActiveModel, Column, Entity, Model},
    incident_events,
};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, Error, unique_violation},
};

impl From<Model> for Incident {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            org_id: model.org_id,
            project_id: model.project_id,
            group_id: model.group_id,
            title: model.title,
            description: model.description,
            severity: model.severity.parse().unwrap_or(Severity::Warning),
            urgency: model.urgency.parse().unwrap_or(Urgency::High),
            status: model.status.parse().unwrap_or(IncidentStatus::Triggered),
            source: model.source,
            incident_key: model.incident_key,
            external_id: model.external_id,
            alert_count: model.alert_count,
            escalation_policy_id: model.escalation_policy_id,
            current_escalation_level: model.current_escalation_level,
            escalation_status: model
                .escalation_status
                .parse()
                .unwrap_or(EscalationStatus::None),
            last_escalated_at: model.last_escalated_at,
            escalation_due_at: model.escalation_due_at,
            assigned_to: model.assigned_to,
            resolution: model.resolution,
            created_at: model.created_at,
            updated_at: model.updated_at,
            acknowledged_at: model.acknowledged_at,
            resolved_at: model.resolved_at,
        }
    }
}

/// Project narrowing for tenant-scoped listings.
#[derive(Debug, Clone)]
pub enum ProjectScope {
    /// Caller supplied an explicit project: return only its entities.
    Strict(String),
    /// No project supplied: org-level entities plus entities in the
    /// caller's accessible projects, evaluated as one predicate.
    Computed(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub status: Option<IncidentStatus>,
    pub severity: Option<Severity>,
    pub limit: u64,
    pub offset: u64,
}

fn scope_condition(org_id: &str, scope: &ProjectScope) -> Condition {
    let cond = Condition::all().add(Column::OrgId.eq(org_id));
    match scope {
        ProjectScope::Strict(project_id) => cond.add(Column::ProjectId.eq(project_id.clone())),
        ProjectScope::Computed(project_ids) => {
            let mut any = Condition::any().add(Column::ProjectId.is_null());
            if !project_ids.is_empty() {
                any = any.add(Column::ProjectId.is_in(project_ids.clone()));
            }
            cond.add(any)
        }
    }
}

const OPEN_STATUSES: [&str; 2] = ["triggered", "acknowledged"];

pub async fn find_open_by_key(
    org_id: &str,
    incident_key: &str,
) -> Result<Option<Incident>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find()
        .filter(Column::OrgId.eq(org_id))
        .filter(Column::IncidentKey.eq(incident_key))
        .filter(Column::Status.is_in(OPEN_STATUSES))
        .one(client)
        .await?
        .map(Incident::from))
}

pub async fn get(org_id: &str, id: &str) -> Result<Option<Incident>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(client)
        .await?
        .map(Incident::from))
}

pub async fn list(
    org_id: &str,
    scope: &ProjectScope,
    filters: &ListFilters,
) -> Result<Vec<Incident>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let mut query = Entity::find().filter(scope_condition(org_id, scope));
    if let Some(status) = filters.status {
        query = query.filter(Column::Status.eq(status.to_string()));
    }
    if let Some(severity) = filters.severity {
        query = query.filter(Column::Severity.eq(severity.to_string()));
    }
    Ok(query
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .offset(filters.offset)
        .limit(filters.limit)
        .all(client)
        .await?
        .into_iter()
        .map(Incident::from)
        .collect())
}

pub async fn count(
    org_id: &str,
    scope: &ProjectScope,
    filters: &ListFilters,
) -> Result<u64, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let mut query = Entity::find().filter(scope_condition(org_id, scope));
    if let Some(status) = filters.status {
        query = query.filter(Column::Status.eq(status.to_string()));
    }
    if let Some(severity) = filters.severity {
        query = query.filter(Column::Severity.eq(severity.to_string()));
    }
    Ok(query.count(client).await?)
}

/// Insert a new incident and its `created` event in one transaction.
///
/// `first_level_timeout_secs` arms the escalation deadline when the
/// incident carries a policy.
pub async fn create(
    new: &NewIncident,
    first_level_timeout_secs: Option<i64>,
    event_data: json::Value,
    created_by: &str,
) -> Result<Incident, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = now_micros();
    let id = ider::generate();

    let due_at = match (&new.escalation_policy_id, first_level_timeout_secs) {
        (Some(_), Some(secs)) => Some(now + secs * 1_000_000),
        _ => None,
    };

    let model = ActiveModel {
        id: Set(id.clone()),
        org_id: Set(new.org_id.clone()),
        project_id: Set(new.project_id.clone()),
        group_id: Set(new.group_id.clone()),
        title: Set(new.title.clone()),
        description: Set(new.description.clone()),
        severity: Set(new.severity.to_string()),
        urgency: Set(new.urgency.to_string()),
        status: Set(IncidentStatus::Triggered.to_string()),
        source: Set(new.source.clone()),
        incident_key: Set(new.incident_key.clone()),
        external_id: Set(new.external_id.clone()),
        alert_count: Set(1),
        escalation_policy_id: Set(new.escalation_policy_id.clone()),
        current_escalation_level: Set(0),
        escalation_status: Set(EscalationStatus::None.to_string()),
        last_escalated_at: Set(None),
        escalation_due_at: Set(due_at),
        assigned_to: Set(None),
        resolution: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        acknowledged_at: Set(None),
        resolved_at: Set(None),
    };

    let txn = client.begin().await?;
    let inserted = match model.insert(&txn).await {
        Ok(m) => m,
        Err(e) => {
            txn.rollback().await.ok();
            if unique_violation(&e) {
                return Err(Error::ResourceConflict(format!(
                    "open incident already exists for key {:?} in org {}",
                    new.incident_key, new.org_id
                )));
            }
            return Err(e.into());
        }
    };
    incident_events::append(
        &txn,
        &new.org_id,
        &id,
        IncidentEventType::Created,
        event_data,
        created_by,
    )
    .await?;
    txn.commit().await?;
    Ok(inserted.into())
}

/// Merge one more deduplicated alert into an open incident: bump
/// `alert_count` and append an `alert_merged` event, atomically. The
/// incident status is left untouched.
pub async fn merge_alert(
    org_id: &str,
    id: &str,
    event_data: json::Value,
    created_by: &str,
) -> Result<Incident, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {id}")))?;

    if row.status == IncidentStatus::Resolved.to_string() {
        txn.rollback().await.ok();
        return Err(Error::ResourceConflict(format!(
            "incident {id} is resolved"
        )));
    }

    let alert_count = row.alert_count + 1;
    let mut active: ActiveModel = row.into();
    active.alert_count = Set(alert_count);
    active.updated_at = Set(now_micros());
    let updated = active.update(&txn).await?;

    incident_events::append(
        &txn,
        org_id,
        id,
        IncidentEventType::AlertMerged,
        event_data,
        created_by,
    )
    .await?;
    txn.commit().await?;
    Ok(updated.into())
}

/// Keyed upsert: attach to the open incident holding `(org_id, key)` or
/// create a fresh one. Racing creators are serialized by the partial
/// unique index; the losers fall back to merge.
pub async fn upsert_by_key(
    new: &NewIncident,
    first_level_timeout_secs: Option<i64>,
    event_data: json::Value,
    created_by: &str,
) -> Result<(Incident, bool), errors::Error> {
    let key = new
        .incident_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::BadRequest("incident_key is required for upsert".to_string()))?;

    if let Some(existing) = find_open_by_key(&new.org_id, key).await? {
        let merged = merge_alert(&new.org_id, &existing.id, event_data, created_by).await?;
        return Ok((merged, false));
    }

    match create(new, first_level_timeout_secs, event_data.clone(), created_by).await {
        Ok(incident) => Ok((incident, true)),
        Err(e) if matches!(&e, Error::ResourceConflict(_)) || e.is_unique_violation() => {
            // lost the creation race; the winner's row must exist now
            let existing = find_open_by_key(&new.org_id, key).await?.ok_or_else(|| {
                Error::TransientFailure(format!(
                    "open incident for key {key} vanished during upsert race"
                ))
            })?;
            let merged = merge_alert(&new.org_id, &existing.id, event_data, created_by).await?;
            Ok((merged, false))
        }
        Err(e) => Err(e),
    }
}

pub async fn acknowledge(org_id: &str, id: &str, by: &str) -> Result<Incident, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {id}")))?;

    if row.status != IncidentStatus::Triggered.to_string() {
        txn.rollback().await.ok();
        return Err(Error::ResourceConflict(format!(
            "cannot acknowledge incident {id} in status {}",
            row.status
        )));
    }

    let now = now_micros();
    let mut active: ActiveModel = row.into();
    active.status = Set(IncidentStatus::Acknowledged.to_string());
    active.acknowledged_at = Set(Some(now));
    // acknowledged incidents are never claimable
    active.escalation_due_at = Set(None);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    incident_events::append(
        &txn,
        org_id,
        id,
        IncidentEventType::Acknowledged,
        json::json!({ "acknowledged_by": by }),
        by,
    )
    .await?;
    txn.commit().await?;
    Ok(updated.into())
}

/// Return an acknowledged incident to triggered. `due_at` re-arms the
/// escalation deadline when a policy is still in play.
pub async fn unacknowledge(
    org_id: &str,
    id: &str,
    by: &str,
    due_at: Option<i64>,
) -> Result<Incident, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {id}")))?;

    if row.status != IncidentStatus::Acknowledged.to_string() {
        txn.rollback().await.ok();
        return Err(Error::ResourceConflict(format!(
            "cannot unacknowledge incident {id} in status {}",
            row.status
        )));
    }

    let mut active: ActiveModel = row.into();
    active.status = Set(IncidentStatus::Triggered.to_string());
    active.acknowledged_at = Set(None);
    active.escalation_due_at = Set(due_at);
    active.updated_at = Set(now_micros());
    let updated = active.update(&txn).await?;

    incident_events::append(
        &txn,
        org_id,
        id,
        IncidentEventType::Unacknowledged,
        json::json!({ "unacknowledged_by": by }),
        by,
    )
    .await?;
    txn.commit().await?;
    Ok(updated.into())
}

pub async fn resolve(
    org_id: &str,
    id: &str,
    by: &str,
    resolution: &str,
    note: Option<&str>,
) -> Result<Incident, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {id}")))?;

    if row.status == IncidentStatus::Resolved.to_string() {
        txn.rollback().await.ok();
        return Err(Error::ResourceConflict(format!(
            "incident {id} is already resolved"
        )));
    }

    let now = now_micros();
    let mut active: ActiveModel = row.into();
    active.status = Set(IncidentStatus::Resolved.to_string());
    active.resolved_at = Set(Some(now));
    active.resolution = Set(Some(resolution.to_string()));
    active.escalation_due_at = Set(None);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    incident_events::append(
        &txn,
        org_id,
        id,
        IncidentEventType::Resolved,
        json::json!({ "resolved_by": by, "resolution": resolution, "note": note }),
        by,
    )
    .await?;
    txn.commit().await?;
    Ok(updated.into())
}

/// Manual assignment (API-originated, never used by the engine).
pub async fn assign(
    org_id: &str,
    id: &str,
    assignee: &str,
    by: &str,
) -> Result<Incident, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {id}")))?;

    if row.status == IncidentStatus::Resolved.to_string() {
        txn.rollback().await.ok();
        return Err(Error::ResourceConflict(format!(
            "incident {id} is resolved"
        )));
    }

    let mut active: ActiveModel = row.into();
    active.assigned_to = Set(Some(assignee.to_string()));
    active.updated_at = Set(now_micros());
    let updated = active.update(&txn).await?;

    incident_events::append(
        &txn,
        org_id,
        id,
        IncidentEventType::Assigned,
        json::json!({ "assigned_to": assignee, "assigned_by": by }),
        by,
    )
    .await?;
    txn.commit().await?;
    Ok(updated.into())
}

/// One escalation step, applied atomically with its `escalated` event.
#[derive(Debug, Clone)]
pub struct EscalationStep {
    pub org_id: String,
    pub incident_id: String,
    pub next_level: i32,
    pub assigned_to: Option<String>,
    /// True when `next_level` is the policy's last level.
    pub completed: bool,
    pub now: i64,
    /// Deadline for the following level; None when completed.
    pub due_at: Option<i64>,
    pub event_data: json::Value,
}

pub async fn apply_escalation_step(step: &EscalationStep) -> Result<Incident, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(&step.incident_id)
        .filter(Column::OrgId.eq(&step.org_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {}", step.incident_id)))?;

    // the claim is only a lease: an acknowledge/resolve racing ahead of us
    // wins, and this step is dropped
    if row.status != IncidentStatus::Triggered.to_string() {
        txn.rollback().await.ok();
        return Err(Error::ResourceConflict(format!(
            "incident {} left triggered state during escalation",
            step.incident_id
        )));
    }
    // a step may only move the level forward by exactly one; anything else
    // means another worker already advanced this incident
    if row.current_escalation_level != step.next_level - 1 {
        txn.rollback().await.ok();
        return Err(Error::ResourceConflict(format!(
            "incident {} is at level {}, expected {}",
            step.incident_id,
            row.current_escalation_level,
            step.next_level - 1
        )));
    }

    let escalation_status = if step.completed {
        EscalationStatus::Completed
    } else {
        EscalationStatus::Pending
    };

    let mut active: ActiveModel = row.into();
    if step.assigned_to.is_some() {
        active.assigned_to = Set(step.assigned_to.clone());
    }
    active.current_escalation_level = Set(step.next_level);
    active.escalation_status = Set(escalation_status.to_string());
    active.last_escalated_at = Set(Some(step.now));
    active.escalation_due_at = Set(step.due_at);
    active.updated_at = Set(step.now);
    let updated = active.update(&txn).await?;

    incident_events::append(
        &txn,
        &step.org_id,
        &step.incident_id,
        IncidentEventType::Escalated,
        step.event_data.clone(),
        config::SYSTEM_PRINCIPAL,
    )
    .await?;
    txn.commit().await?;
    Ok(updated.into())
}

/// Mark a policy as exhausted without advancing the level.
pub async fn complete_escalation(
    org_id: &str,
    id: &str,
    event_data: json::Value,
) -> Result<Incident, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {id}")))?;

    let mut active: ActiveModel = row.into();
    active.escalation_status = Set(EscalationStatus::Completed.to_string());
    active.escalation_due_at = Set(None);
    active.updated_at = Set(now_micros());
    let updated = active.update(&txn).await?;

    incident_events::append(
        &txn,
        org_id,
        id,
        IncidentEventType::EscalationCompleted,
        event_data,
        config::SYSTEM_PRINCIPAL,
    )
    .await?;
    txn.commit().await?;
    Ok(updated.into())
}

/// Record a target-resolution failure and make the incident immediately
/// claimable again. Level and `last_escalated_at` stay untouched so the
/// next tick retries the same step.
pub async fn record_notify_failure(
    org_id: &str,
    id: &str,
    due_at: i64,
    event_data: json::Value,
) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let txn = client.begin().await?;

    let row = Entity::find_by_id(id)
        .filter(Column::OrgId.eq(org_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {id}")))?;

    let mut active: ActiveModel = row.into();
    active.escalation_due_at = Set(Some(due_at));
    active.updated_at = Set(now_micros());
    active.update(&txn).await?;

    incident_events::append(
        &txn,
        org_id,
        id,
        IncidentEventType::NotifyFailure,
        event_data,
        config::SYSTEM_PRINCIPAL,
    )
    .await?;
    txn.commit().await?;
    Ok(())
}
