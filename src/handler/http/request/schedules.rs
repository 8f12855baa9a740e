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

//! Schedule, override and on-call resolution endpoints.

use axum::{
    Json,
    extract::{Path, Query},
    response::Response,
};
use config::{
    meta::{
        membership::{Action, ObjectType},
        schedule::RotationLayer,
    },
    utils::time::now_micros,
};
use infra::table::{schedule_overrides, schedules};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::extractors::{Principal, TenantContext},
    service::{auth, schedules as schedule_service},
};

/// The group must live in the caller's org and the caller must hold the
/// required action on it.
async fn require_group_access(
    user_id: &str,
    org_id: &str,
    group_id: &str,
    action: Action,
) -> Result<(), Response> {
    match infra::table::groups::get(org_id, group_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(MetaHttpResponse::not_found(format!("group {group_id}"))),
        Err(e) => return Err(MetaHttpResponse::from_error(e)),
    }
    match auth::check(user_id, action, ObjectType::Group, group_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(MetaHttpResponse::forbidden(format!(
            "no access to group {group_id}"
        ))),
        Err(e) => Err(MetaHttpResponse::from_error(e)),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleRequest {
    pub group_id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub layers: Vec<RotationLayer>,
}

fn default_enabled() -> bool {
    true
}

/// Create a schedule for a group
#[utoipa::path(
    post,
    path = "/schedules",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "CreateSchedule",
    security(("Authorization" = [])),
    request_body(content = ScheduleRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 403, description = "Forbidden", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn create(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<ScheduleRequest>,
) -> Response {
    if req.group_id.is_empty() || req.name.is_empty() {
        return MetaHttpResponse::bad_request("group_id and name are required");
    }
    if let Err(resp) = require_group_access(&principal.user_id, &ctx.org_id, &req.group_id, Action::Update).await
    {
        return resp;
    }
    match schedule_service::create_schedule(
        &ctx.org_id,
        &req.group_id,
        &req.name,
        req.enabled,
        &req.layers,
    )
    .await
    {
        Ok(schedule) => MetaHttpResponse::json(schedule),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ScheduleListQuery {
    pub group_id: Option<String>,
}

/// List schedules
#[utoipa::path(
    get,
    path = "/schedules",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "ListSchedules",
    security(("Authorization" = [])),
    params(ScheduleListQuery),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn list(
    ctx: TenantContext,
    principal: Principal,
    Query(query): Query<ScheduleListQuery>,
) -> Response {
    match auth::org_role(&principal.user_id, &ctx.org_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return MetaHttpResponse::forbidden("not a member of this organization"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match schedules::list(&ctx.org_id, query.group_id.as_deref()).await {
        Ok(items) => MetaHttpResponse::json(serde_json::json!({ "schedules": items })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Update a schedule; the change affects subsequent resolutions
/// immediately
#[utoipa::path(
    put,
    path = "/schedules/{schedule_id}",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "UpdateSchedule",
    security(("Authorization" = [])),
    params(("schedule_id" = String, Path, description = "Schedule ID")),
    request_body(content = ScheduleRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Updated", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, schedule_id = %schedule_id))]
pub async fn update(
    ctx: TenantContext,
    principal: Principal,
    Path(schedule_id): Path<String>,
    Json(req): Json<ScheduleRequest>,
) -> Response {
    let existing = match schedules::get(&ctx.org_id, &schedule_id).await {
        Ok(Some(s)) => s,
        Ok(None) => return MetaHttpResponse::not_found(format!("schedule {schedule_id}")),
        Err(e) => return MetaHttpResponse::from_error(e),
    };
    if let Err(resp) =
        require_group_access(&principal.user_id, &ctx.org_id, &existing.group_id, Action::Update).await
    {
        return resp;
    }
    match schedule_service::update_schedule(
        &ctx.org_id,
        &schedule_id,
        &req.name,
        req.enabled,
        &req.layers,
    )
    .await
    {
        Ok(schedule) => MetaHttpResponse::json(schedule),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Delete a schedule
#[utoipa::path(
    delete,
    path = "/schedules/{schedule_id}",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "DeleteSchedule",
    security(("Authorization" = [])),
    params(("schedule_id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Deleted", content_type = "application/json", body = MetaHttpResponse),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, schedule_id = %schedule_id))]
pub async fn delete(
    ctx: TenantContext,
    principal: Principal,
    Path(schedule_id): Path<String>,
) -> Response {
    let existing = match schedules::get(&ctx.org_id, &schedule_id).await {
        Ok(Some(s)) => s,
        Ok(None) => return MetaHttpResponse::not_found(format!("schedule {schedule_id}")),
        Err(e) => return MetaHttpResponse::from_error(e),
    };
    if let Err(resp) =
        require_group_access(&principal.user_id, &ctx.org_id, &existing.group_id, Action::Update).await
    {
        return resp;
    }
    match schedules::delete(&ctx.org_id, &schedule_id).await {
        Ok(()) => MetaHttpResponse::ok("schedule deleted"),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewRequest {
    #[serde(default)]
    pub layers: Vec<RotationLayer>,
    pub from: i64,
    pub to: i64,
}

/// Preview the shifts an unsaved schedule definition would produce
#[utoipa::path(
    post,
    path = "/schedules/preview",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "PreviewSchedule",
    security(("Authorization" = [])),
    request_body(content = PreviewRequest, content_type = "application/json"),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn preview(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<PreviewRequest>,
) -> Response {
    match auth::org_role(&principal.user_id, &ctx.org_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return MetaHttpResponse::forbidden("not a member of this organization"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match schedule_service::preview(&req.layers, req.from, req.to) {
        Ok(shifts) => MetaHttpResponse::json(serde_json::json!({ "shifts": shifts })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OnCallQuery {
    /// Instant to resolve, microseconds; defaults to now
    pub at: Option<i64>,
}

/// Who is on call for a group
#[utoipa::path(
    get,
    path = "/oncall/{group_id}",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "WhoIsOnCall",
    security(("Authorization" = [])),
    params(
        ("group_id" = String, Path, description = "Group ID"),
        OnCallQuery,
    ),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, group_id = %group_id))]
pub async fn who_is_on_call(
    ctx: TenantContext,
    principal: Principal,
    Path(group_id): Path<String>,
    Query(query): Query<OnCallQuery>,
) -> Response {
    if let Err(resp) = require_group_access(&principal.user_id, &ctx.org_id, &group_id, Action::View).await {
        return resp;
    }
    let at = query.at.unwrap_or_else(now_micros);
    match schedule_service::who_is_on_call(&group_id, at).await {
        Ok(user_id) => MetaHttpResponse::json(serde_json::json!({
            "group_id": group_id,
            "at": at,
            "on_call": user_id,
        })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ShiftsQuery {
    pub from: i64,
    pub to: i64,
}

/// Effective shifts for a group over a window, overrides applied
#[utoipa::path(
    get,
    path = "/oncall/{group_id}/shifts",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "EffectiveShifts",
    security(("Authorization" = [])),
    params(
        ("group_id" = String, Path, description = "Group ID"),
        ShiftsQuery,
    ),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, group_id = %group_id))]
pub async fn effective_shifts(
    ctx: TenantContext,
    principal: Principal,
    Path(group_id): Path<String>,
    Query(query): Query<ShiftsQuery>,
) -> Response {
    if let Err(resp) = require_group_access(&principal.user_id, &ctx.org_id, &group_id, Action::View).await {
        return resp;
    }
    match schedule_service::effective_shifts(&group_id, query.from, query.to).await {
        Ok(shifts) => MetaHttpResponse::json(serde_json::json!({ "shifts": shifts })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OverrideRequest {
    pub group_id: String,
    pub user_id: String,
    pub start_at: i64,
    pub end_at: i64,
    #[serde(default)]
    pub reason: String,
}

/// Create an override that supersedes the schedule for its interval
#[utoipa::path(
    post,
    path = "/overrides",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "CreateOverride",
    security(("Authorization" = [])),
    request_body(content = OverrideRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 400, description = "Invalid interval", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn create_override(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<OverrideRequest>,
) -> Response {
    if req.group_id.is_empty() || req.user_id.is_empty() {
        return MetaHttpResponse::bad_request("group_id and user_id are required");
    }
    if let Err(resp) = require_group_access(&principal.user_id, &ctx.org_id, &req.group_id, Action::Update).await
    {
        return resp;
    }
    match schedule_service::create_override(
        &ctx.org_id,
        &req.group_id,
        &req.user_id,
        req.start_at,
        req.end_at,
        &req.reason,
    )
    .await
    {
        Ok(ov) => MetaHttpResponse::json(ov),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// List overrides
#[utoipa::path(
    get,
    path = "/overrides",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "ListOverrides",
    security(("Authorization" = [])),
    params(ScheduleListQuery),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn list_overrides(
    ctx: TenantContext,
    principal: Principal,
    Query(query): Query<ScheduleListQuery>,
) -> Response {
    match auth::org_role(&principal.user_id, &ctx.org_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return MetaHttpResponse::forbidden("not a member of this organization"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match schedule_overrides::list(&ctx.org_id, query.group_id.as_deref()).await {
        Ok(items) => MetaHttpResponse::json(serde_json::json!({ "overrides": items })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Delete an override
#[utoipa::path(
    delete,
    path = "/overrides/{override_id}",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "DeleteOverride",
    security(("Authorization" = [])),
    params(("override_id" = String, Path, description = "Override ID")),
    responses(
        (status = 200, description = "Deleted", content_type = "application/json", body = MetaHttpResponse),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, override_id = %override_id))]
pub async fn delete_override(
    ctx: TenantContext,
    principal: Principal,
    Path(override_id): Path<String>,
) -> Response {
    match auth::check(&principal.user_id, Action::Update, ObjectType::Org, &ctx.org_id).await {
        Ok(true) => {}
        Ok(false) => return MetaHttpResponse::forbidden("override deletion denied"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match schedule_overrides::delete(&ctx.org_id, &override_id).await {
        Ok(()) => MetaHttpResponse::ok("override deleted"),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}
