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

//! Relationship-based authorization over the single membership relation.
//!
//! All checks are deny-by-default and resolve through
//! `(user, role, object_type, object_id)` facts. The computed scope
//! produced by [`scope_for_list`] is the only way list queries are
//! narrowed; handlers never build their own predicates.

use config::meta::{
    membership::{Action, Membership, ObjectType, Role, project_role_from_org},
    organization::{Group, GroupVisibility, Project},
};
use infra::{
    errors::{Error, Result},
    table::{groups, incidents::ProjectScope, memberships, projects},
};

/// Direct role the user holds on one object, if any.
pub async fn role_on(
    user_id: &str,
    object_type: ObjectType,
    object_id: &str,
) -> Result<Option<Role>> {
    Ok(memberships::get(user_id, object_type, object_id)
        .await?
        .map(|m| m.role))
}

pub async fn org_role(user_id: &str, org_id: &str) -> Result<Option<Role>> {
    role_on(user_id, ObjectType::Org, org_id).await
}

/// A project is open when nobody holds a direct membership on it.
pub async fn project_is_open(project_id: &str) -> Result<bool> {
    Ok(memberships::project_member_count(project_id).await? == 0)
}

/// Explicit OR Inherited: a direct project membership wins; otherwise an
/// org membership reaches only *open* projects, with owner mapping to
/// project admin. Org admins get nothing extra on closed projects.
pub async fn effective_project_role(user_id: &str, project: &Project) -> Result<Option<Role>> {
    if let Some(role) = role_on(user_id, ObjectType::Project, &project.id).await? {
        return Ok(Some(role));
    }
    let Some(org_role) = org_role(user_id, &project.org_id).await? else {
        return Ok(None);
    };
    if project_is_open(&project.id).await? {
        Ok(Some(project_role_from_org(org_role)))
    } else {
        Ok(None)
    }
}

/// Effective view access on a group: direct membership always works;
/// otherwise visibility decides what an org membership reaches.
async fn group_view_role(user_id: &str, group: &Group) -> Result<Option<Role>> {
    if let Some(role) = role_on(user_id, ObjectType::Group, &group.id).await? {
        return Ok(Some(role));
    }
    let Some(org_role) = org_role(user_id, &group.org_id).await? else {
        return Ok(None);
    };
    match group.visibility {
        GroupVisibility::Public | GroupVisibility::Organization => Ok(Some(org_role)),
        GroupVisibility::Private => match org_role {
            Role::Owner | Role::Admin => Ok(Some(org_role)),
            _ => Ok(None),
        },
    }
}

/// Groups in the org the caller may see, visibility applied.
pub async fn visible_groups(user_id: &str, org_id: &str) -> Result<Vec<Group>> {
    let mut visible = vec![];
    for group in groups::list(org_id).await? {
        if group_view_role(user_id, &group).await?.is_some() {
            visible.push(group);
        }
    }
    Ok(visible)
}

/// "Can X do Y on Z?" — the single entry point handlers use.
pub async fn check(
    user_id: &str,
    action: Action,
    object_type: ObjectType,
    object_id: &str,
) -> Result<bool> {
    let role = match object_type {
        ObjectType::Org => org_role(user_id, object_id).await?,
        ObjectType::Project => {
            let Some(project) = projects::get_any(object_id).await? else {
                return Ok(false);
            };
            effective_project_role(user_id, &project).await?
        }
        ObjectType::Group => {
            let Some(group) = groups::get_any(object_id).await? else {
                return Ok(false);
            };
            group_view_role(user_id, &group).await?
        }
    };
    Ok(role.is_some_and(|r| r.allows(action, object_type)))
}

/// Projects within the org the caller can access: direct memberships
/// plus, for org members, every open project.
#[derive(Debug, Clone, Default)]
pub struct AccessibleProjects {
    pub project_ids: Vec<String>,
}

pub async fn accessible_projects(user_id: &str, org_id: &str) -> Result<AccessibleProjects> {
    let mut ids: Vec<String> = memberships::list_user_memberships(user_id, Some(org_id))
        .await?
        .into_iter()
        .filter(|m| m.object_type == ObjectType::Project)
        .map(|m| m.object_id)
        .collect();

    if org_role(user_id, org_id).await?.is_some() {
        let closed: Vec<String> = memberships::projects_with_members(org_id).await?;
        for project in projects::list(org_id).await? {
            if !closed.contains(&project.id) {
                ids.push(project.id);
            }
        }
    }

    ids.sort();
    ids.dedup();
    Ok(AccessibleProjects { project_ids: ids })
}

/// Build the project narrowing for a tenant-scoped list request.
///
/// Strict mode (explicit `project_id`): the caller must be able to view
/// that project. Computed mode: org membership is required, and the
/// predicate covers org-level entities plus accessible projects.
pub async fn scope_for_list(
    user_id: &str,
    org_id: &str,
    project_id: Option<&str>,
) -> Result<ProjectScope> {
    if org_id.is_empty() {
        return Err(Error::BadRequest("org_id is required".to_string()));
    }
    match project_id {
        Some(project_id) => {
            let Some(project) = projects::get(org_id, project_id).await? else {
                return Err(Error::ResourceNotFound(format!("project {project_id}")));
            };
            if effective_project_role(user_id, &project).await?.is_none() {
                return Err(Error::Forbidden(format!(
                    "no access to project {project_id}"
                )));
            }
            Ok(ProjectScope::Strict(project_id.to_string()))
        }
        None => {
            if org_role(user_id, org_id).await?.is_none() {
                return Err(Error::Forbidden(format!(
                    "user {user_id} is not a member of org {org_id}"
                )));
            }
            let accessible = accessible_projects(user_id, org_id).await?;
            Ok(ProjectScope::Computed(accessible.project_ids))
        }
    }
}

/// Whether the caller may see one specific incident-scoped object,
/// given its optional project. Used by get-by-id paths; denial surfaces
/// as NotFound to avoid leaking existence.
pub async fn can_view_scoped(
    user_id: &str,
    org_id: &str,
    project_id: Option<&str>,
) -> Result<bool> {
    match project_id {
        None => Ok(org_role(user_id, org_id).await?.is_some()),
        Some(project_id) => {
            let Some(project) = projects::get(org_id, project_id).await? else {
                return Ok(false);
            };
            Ok(effective_project_role(user_id, &project).await?.is_some())
        }
    }
}

/// Role required to administer memberships of one object.
async fn can_manage_members(
    user_id: &str,
    object_type: ObjectType,
    object_id: &str,
    org_id: &str,
) -> Result<bool> {
    // org owners/admins manage everything in the org
    if let Some(role) = org_role(user_id, org_id).await?
        && role.allows(Action::ManageMembers, object_type)
        && matches!(role, Role::Owner | Role::Admin)
    {
        return Ok(true);
    }
    // project/group admins manage their own object
    if object_type != ObjectType::Org
        && let Some(role) = role_on(user_id, object_type, object_id).await?
    {
        return Ok(role.allows(Action::ManageMembers, object_type));
    }
    Ok(false)
}

pub async fn add_membership(
    actor: &str,
    user_id: &str,
    role: Role,
    object_type: ObjectType,
    object_id: &str,
    org_id: &str,
) -> Result<Membership> {
    if !can_manage_members(actor, object_type, object_id, org_id).await? {
        return Err(Error::Forbidden(format!(
            "user {actor} may not manage members of {object_type}/{object_id}"
        )));
    }
    // owner is an org-only role
    if role == Role::Owner && object_type != ObjectType::Org {
        return Err(Error::BadRequest(
            "owner role can only be granted on organizations".to_string(),
        ));
    }
    memberships::add(user_id, role, object_type, object_id, org_id).await
}

pub async fn update_membership_role(
    actor: &str,
    user_id: &str,
    object_type: ObjectType,
    object_id: &str,
    org_id: &str,
    role: Role,
) -> Result<Membership> {
    if !can_manage_members(actor, object_type, object_id, org_id).await? {
        return Err(Error::Forbidden(format!(
            "user {actor} may not manage members of {object_type}/{object_id}"
        )));
    }
    if role == Role::Owner && object_type != ObjectType::Org {
        return Err(Error::BadRequest(
            "owner role can only be granted on organizations".to_string(),
        ));
    }
    memberships::update_role(user_id, object_type, object_id, role).await
}

pub async fn remove_membership(
    actor: &str,
    user_id: &str,
    object_type: ObjectType,
    object_id: &str,
    org_id: &str,
) -> Result<()> {
    if !can_manage_members(actor, object_type, object_id, org_id).await? {
        return Err(Error::Forbidden(format!(
            "user {actor} may not manage members of {object_type}/{object_id}"
        )));
    }
    memberships::remove(user_id, object_type, object_id).await
}

pub async fn list_resource_members(
    actor: &str,
    object_type: ObjectType,
    object_id: &str,
    org_id: &str,
) -> Result<Vec<Membership>> {
    // viewing the member list only needs view access on the object
    let allowed = match object_type {
        ObjectType::Org => org_role(actor, org_id).await?.is_some(),
        _ => check(actor, Action::View, object_type, object_id).await?,
    };
    if !allowed {
        return Err(Error::Forbidden(format!(
            "user {actor} may not view members of {object_type}/{object_id}"
        )));
    }
    memberships::list_resource_members(object_type, object_id).await
}

pub async fn list_user_memberships(
    actor: &str,
    user_id: &str,
    org_id: Option<&str>,
) -> Result<Vec<Membership>> {
    // users can always list their own; otherwise org manage-members is
    // required within the queried org
    if actor != user_id {
        let Some(org_id) = org_id else {
            return Err(Error::BadRequest(
                "org_id is required when listing another user's memberships".to_string(),
            ));
        };
        if !can_manage_members(actor, ObjectType::Org, org_id, org_id).await? {
            return Err(Error::Forbidden(format!(
                "user {actor} may not list memberships of {user_id}"
            )));
        }
    }
    memberships::list_user_memberships(user_id, org_id).await
}
