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

//! Uptime monitors and the probe report endpoint.

use axum::{
    Json,
    extract::{Path, Query},
    http::HeaderMap,
    response::Response,
};
use config::meta::membership::{Action, ObjectType};
use config::meta::uptime::MonitorKind;
use infra::table::uptime_monitors;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{
        meta::{http::HttpResponse as MetaHttpResponse, ingestion::ProbeReport},
        utils::auth::verify_deployment_token,
    },
    handler::http::extractors::{Principal, TenantContext},
    service::{auth, uptime},
};

/// Probe report submission from an edge worker. Authenticated by the
/// deployment token, not a user principal.
#[utoipa::path(
    post,
    path = "/uptime/report",
    context_path = "/api",
    tag = "Uptime",
    operation_id = "SubmitProbeReport",
    request_body(content = ProbeReport, content_type = "application/json"),
    responses(
        (status = 200, description = "Reconciled", content_type = "application/json", body = uptime::ReportSummary),
        (status = 401, description = "Invalid deployment token", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(location = %report.location))]
pub async fn report(headers: HeaderMap, Json(report): Json<ProbeReport>) -> Response {
    if let Err(e) = verify_deployment_token(&headers) {
        return MetaHttpResponse::from_error(e);
    }
    match uptime::ingest_report(&report).await {
        Ok(summary) => MetaHttpResponse::json(summary),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMonitorRequest {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub kind: MonitorKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Register an uptime monitor
#[utoipa::path(
    post,
    path = "/monitors",
    context_path = "/api",
    tag = "Uptime",
    operation_id = "CreateMonitor",
    security(("Authorization" = [])),
    request_body(content = CreateMonitorRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 403, description = "Forbidden", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn create(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<CreateMonitorRequest>,
) -> Response {
    if req.name.is_empty() || req.target.is_empty() {
        return MetaHttpResponse::bad_request("name and target are required");
    }
    let allowed = match ctx.project_id.as_deref() {
        Some(project_id) => {
            auth::check(&principal.user_id, Action::Create, ObjectType::Project, project_id).await
        }
        None => auth::check(&principal.user_id, Action::Create, ObjectType::Org, &ctx.org_id).await,
    };
    match allowed {
        Ok(true) => {}
        Ok(false) => return MetaHttpResponse::forbidden("monitor creation denied"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }

    match uptime_monitors::create(
        &ctx.org_id,
        ctx.project_id.as_deref(),
        &req.name,
        &req.target,
        req.kind,
        req.enabled,
    )
    .await
    {
        Ok(monitor) => MetaHttpResponse::json(monitor),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// List monitors under the tenant scope
#[utoipa::path(
    get,
    path = "/monitors",
    context_path = "/api",
    tag = "Uptime",
    operation_id = "ListMonitors",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn list(ctx: TenantContext, principal: Principal) -> Response {
    match auth::can_view_scoped(&principal.user_id, &ctx.org_id, ctx.project_id.as_deref()).await {
        Ok(true) => {}
        Ok(false) => return MetaHttpResponse::forbidden("no access to this scope"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match uptime_monitors::list(&ctx.org_id, ctx.project_id.as_deref()).await {
        Ok(monitors) => MetaHttpResponse::json(serde_json::json!({ "monitors": monitors })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ChecksQuery {
    pub limit: Option<u64>,
}

/// Get one monitor with its recent check samples
#[utoipa::path(
    get,
    path = "/monitors/{monitor_id}",
    context_path = "/api",
    tag = "Uptime",
    operation_id = "GetMonitor",
    security(("Authorization" = [])),
    params(
        ("monitor_id" = String, Path, description = "Monitor ID"),
        ChecksQuery,
    ),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, monitor_id = %monitor_id))]
pub async fn get(
    ctx: TenantContext,
    principal: Principal,
    Path(monitor_id): Path<String>,
    Query(query): Query<ChecksQuery>,
) -> Response {
    let monitor = match uptime_monitors::get(&ctx.org_id, &monitor_id).await {
        Ok(Some(monitor)) => monitor,
        Ok(None) => return MetaHttpResponse::not_found(format!("monitor {monitor_id}")),
        Err(e) => return MetaHttpResponse::from_error(e),
    };
    match auth::can_view_scoped(&principal.user_id, &ctx.org_id, monitor.project_id.as_deref())
        .await
    {
        Ok(true) => {}
        // indistinguishable from a missing monitor
        Ok(false) => return MetaHttpResponse::not_found(format!("monitor {monitor_id}")),
        Err(e) => return MetaHttpResponse::from_error(e),
    }

    let limit = query.limit.unwrap_or(100).min(1000);
    match uptime_monitors::list_checks(&monitor_id, limit).await {
        Ok(checks) => MetaHttpResponse::json(serde_json::json!({
            "monitor": monitor,
            "checks": checks,
        })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMonitorRequest {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub kind: MonitorKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Update a monitor
#[utoipa::path(
    put,
    path = "/monitors/{monitor_id}",
    context_path = "/api",
    tag = "Uptime",
    operation_id = "UpdateMonitor",
    security(("Authorization" = [])),
    params(("monitor_id" = String, Path, description = "Monitor ID")),
    request_body(content = UpdateMonitorRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Updated", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, monitor_id = %monitor_id))]
pub async fn update(
    ctx: TenantContext,
    principal: Principal,
    Path(monitor_id): Path<String>,
    Json(req): Json<UpdateMonitorRequest>,
) -> Response {
    let monitor = match uptime_monitors::get(&ctx.org_id, &monitor_id).await {
        Ok(Some(monitor)) => monitor,
        Ok(None) => return MetaHttpResponse::not_found(format!("monitor {monitor_id}")),
        Err(e) => return MetaHttpResponse::from_error(e),
    };
    // project-scoped monitors are governed by their project, like create()
    let allowed = match monitor.project_id.as_deref() {
        Some(project_id) => {
            auth::check(&principal.user_id, Action::Update, ObjectType::Project, project_id).await
        }
        None => auth::check(&principal.user_id, Action::Update, ObjectType::Org, &ctx.org_id).await,
    };
    match allowed {
        Ok(true) => {}
        Ok(false) => return MetaHttpResponse::forbidden("monitor update denied"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match uptime_monitors::update(
        &ctx.org_id,
        &monitor_id,
        &req.name,
        &req.target,
        req.kind,
        req.enabled,
    )
    .await
    {
        Ok(monitor) => MetaHttpResponse::json(monitor),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Delete a monitor
#[utoipa::path(
    delete,
    path = "/monitors/{monitor_id}",
    context_path = "/api",
    tag = "Uptime",
    operation_id = "DeleteMonitor",
    security(("Authorization" = [])),
    params(("monitor_id" = String, Path, description = "Monitor ID")),
    responses(
        (status = 200, description = "Deleted", content_type = "application/json", body = MetaHttpResponse),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, monitor_id = %monitor_id))]
pub async fn delete(
    ctx: TenantContext,
    principal: Principal,
    Path(monitor_id): Path<String>,
) -> Response {
    let monitor = match uptime_monitors::get(&ctx.org_id, &monitor_id).await {
        Ok(Some(monitor)) => monitor,
        Ok(None) => return MetaHttpResponse::not_found(format!("monitor {monitor_id}")),
        Err(e) => return MetaHttpResponse::from_error(e),
    };
    let allowed = match monitor.project_id.as_deref() {
        Some(project_id) => {
            auth::check(&principal.user_id, Action::Delete, ObjectType::Project, project_id).await
        }
        None => auth::check(&principal.user_id, Action::Delete, ObjectType::Org, &ctx.org_id).await,
    };
    match allowed {
        Ok(true) => {}
        Ok(false) => return MetaHttpResponse::forbidden("monitor deletion denied"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match uptime_monitors::delete(&ctx.org_id, &monitor_id).await {
        Ok(()) => MetaHttpResponse::ok("monitor deleted"),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}
