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

//! Incident operations behind authorization.
//!
//! Handlers call only this layer; it asks C1, delegates the
//! transactional work to the store, and emits notification intents
//! after the fact. Out-of-scope incidents surface as NotFound so their
//! existence is not leaked.

use config::{
    meta::{
        incident::{Incident, IncidentEvent, NewIncident},
        membership::{Action, ObjectType},
        notification::IntentKind,
    },
    utils::json,
};
use infra::{
    errors::{Error, Result},
    table::{escalation_policies, incident_events, incidents},
};

use crate::service::{auth, notifications};

/// Load an incident the caller may see; denial and absence are
/// indistinguishable.
pub async fn get(user_id: &str, org_id: &str, incident_id: &str) -> Result<Incident> {
    let incident = incidents::get(org_id, incident_id)
        .await?
        .ok_or_else(|| Error::ResourceNotFound(format!("incident {incident_id}")))?;
    if !auth::can_view_scoped(user_id, org_id, incident.project_id.as_deref()).await? {
        return Err(Error::ResourceNotFound(format!("incident {incident_id}")));
    }
    Ok(incident)
}

pub async fn list(
    user_id: &str,
    org_id: &str,
    project_id: Option<&str>,
    filters: &incidents::ListFilters,
) -> Result<(Vec<Incident>, u64)> {
    let scope = auth::scope_for_list(user_id, org_id, project_id).await?;
    let items = incidents::list(org_id, &scope, filters).await?;
    let total = incidents::count(org_id, &scope, filters).await?;
    Ok((items, total))
}

pub async fn events(user_id: &str, org_id: &str, incident_id: &str) -> Result<Vec<IncidentEvent>> {
    // scope check through the incident itself
    get(user_id, org_id, incident_id).await?;
    incident_events::list(org_id, incident_id).await
}

/// Manual incident creation through the API.
pub async fn create(user_id: &str, new: &NewIncident) -> Result<Incident> {
    let allowed = match new.project_id.as_deref() {
        Some(project_id) => auth::check(user_id, Action::Create, ObjectType::Project, project_id).await?,
        None => auth::check(user_id, Action::Create, ObjectType::Org, &new.org_id).await?,
    };
    if !allowed {
        return Err(Error::Forbidden(format!(
            "user {user_id} may not create incidents in org {}",
            new.org_id
        )));
    }

    let first_timeout = match new.escalation_policy_id.as_deref() {
        Some(policy_id) => {
            let policy = escalation_policies::get(&new.org_id, policy_id)
                .await?
                .ok_or_else(|| {
                    Error::BadRequest(format!("unknown escalation policy {policy_id}"))
                })?;
            policy.levels.first().map(|l| l.timeout_secs)
        }
        None => None,
    };

    let incident = incidents::create(
        new,
        first_timeout,
        json::json!({ "created_by": user_id }),
        user_id,
    )
    .await?;
    notifications::emit(IntentKind::IncidentCreated, &incident, None);
    Ok(incident)
}

/// Operational mutations (ack, resolve, assign) are allowed for the
/// current assignee and for anyone whose effective role passes the
/// update column of the permission matrix.
async fn can_operate(user_id: &str, incident: &Incident) -> Result<bool> {
    if incident.assigned_to.as_deref() == Some(user_id) {
        return Ok(true);
    }
    match incident.project_id.as_deref() {
        Some(project_id) => auth::check(user_id, Action::Update, ObjectType::Project, project_id).await,
        None => auth::check(user_id, Action::Update, ObjectType::Org, &incident.org_id).await,
    }
}

pub async fn acknowledge(user_id: &str, org_id: &str, incident_id: &str) -> Result<Incident> {
    let incident = get(user_id, org_id, incident_id).await?;
    if !can_operate(user_id, &incident).await? {
        return Err(Error::Forbidden(format!(
            "user {user_id} may not acknowledge incident {incident_id}"
        )));
    }
    let updated = incidents::acknowledge(org_id, incident_id, user_id).await?;
    notifications::emit(
        IntentKind::IncidentAcknowledged,
        &updated,
        updated.assigned_to.clone(),
    );
    Ok(updated)
}

/// Explicit un-acknowledge: back to triggered, escalation re-armed from
/// the level the incident is sitting at.
pub async fn unacknowledge(user_id: &str, org_id: &str, incident_id: &str) -> Result<Incident> {
    let incident = get(user_id, org_id, incident_id).await?;
    if !can_operate(user_id, &incident).await? {
        return Err(Error::Forbidden(format!(
            "user {user_id} may not unacknowledge incident {incident_id}"
        )));
    }

    let due_at = rearm_due_at(&incident).await?;
    incidents::unacknowledge(org_id, incident_id, user_id, due_at).await
}

/// The deadline an incident gets when it returns to triggered: the
/// timeout of the level it sits at (or the first level when it never
/// fired), counted from now. Exhausted policies stay quiet.
async fn rearm_due_at(incident: &Incident) -> Result<Option<i64>> {
    use config::meta::incident::EscalationStatus;

    let Some(policy_id) = incident.escalation_policy_id.as_deref() else {
        return Ok(None);
    };
    if incident.escalation_status == EscalationStatus::Completed {
        return Ok(None);
    }
    let Some(policy) = escalation_policies::get(&incident.org_id, policy_id).await? else {
        return Ok(None);
    };
    let level_number = if incident.current_escalation_level == 0 {
        1
    } else {
        incident.current_escalation_level as u32
    };
    Ok(policy
        .level(level_number)
        .map(|l| config::utils::time::now_micros() + l.timeout_secs * 1_000_000))
}

pub async fn resolve(
    user_id: &str,
    org_id: &str,
    incident_id: &str,
    resolution: Option<&str>,
    note: Option<&str>,
) -> Result<Incident> {
    let incident = get(user_id, org_id, incident_id).await?;
    if !can_operate(user_id, &incident).await? {
        return Err(Error::Forbidden(format!(
            "user {user_id} may not resolve incident {incident_id}"
        )));
    }
    let updated = incidents::resolve(
        org_id,
        incident_id,
        user_id,
        resolution.unwrap_or("resolved"),
        note,
    )
    .await?;
    notifications::emit(
        IntentKind::IncidentResolved,
        &updated,
        updated.assigned_to.clone(),
    );
    Ok(updated)
}

/// Manual assignment. This is the only path that emits
/// `incident_assigned`; escalation-driven assignment announces itself
/// with `incident_escalated` instead.
pub async fn assign(
    user_id: &str,
    org_id: &str,
    incident_id: &str,
    assignee: &str,
) -> Result<Incident> {
    let incident = get(user_id, org_id, incident_id).await?;
    if !can_operate(user_id, &incident).await? {
        return Err(Error::Forbidden(format!(
            "user {user_id} may not assign incident {incident_id}"
        )));
    }
    let updated = incidents::assign(org_id, incident_id, assignee, user_id).await?;
    notifications::emit(
        IntentKind::IncidentAssigned,
        &updated,
        Some(assignee.to_string()),
    );
    Ok(updated)
}
