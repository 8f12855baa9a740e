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

//! Incident API endpoints.

use axum::{
    Json,
    extract::{Path, Query},
    response::Response,
};
use config::meta::incident::{IncidentStatus, NewIncident, Severity, Urgency};
use infra::table::incidents::ListFilters;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::extractors::{Principal, TenantContext},
    service::incidents as incident_service,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct IncidentListQuery {
    /// Filter by status (triggered, acknowledged, resolved)
    pub status: Option<String>,
    /// Filter by severity (critical, high, warning, info)
    pub severity: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// List incidents under the caller's computed scope
#[utoipa::path(
    get,
    path = "/incidents",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "ListIncidents",
    security(("Authorization" = [])),
    params(IncidentListQuery),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
        (status = 400, description = "Missing tenant context", content_type = "application/json", body = MetaHttpResponse),
        (status = 403, description = "Forbidden", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn list(
    ctx: TenantContext,
    principal: Principal,
    Query(query): Query<IncidentListQuery>,
) -> Response {
    let cfg = config::get_config();
    let status = match query.status.as_deref() {
        Some(s) => match s.parse::<IncidentStatus>() {
            Ok(v) => Some(v),
            Err(e) => return MetaHttpResponse::bad_request(e),
        },
        None => None,
    };
    let severity = match query.severity.as_deref() {
        Some(s) => match s.parse::<Severity>() {
            Ok(v) => Some(v),
            Err(e) => return MetaHttpResponse::bad_request(e),
        },
        None => None,
    };
    let filters = ListFilters {
        status,
        severity,
        limit: query
            .limit
            .unwrap_or(cfg.limit.default_page_size)
            .min(cfg.limit.max_page_size),
        offset: query.offset.unwrap_or(0),
    };

    match incident_service::list(
        &principal.user_id,
        &ctx.org_id,
        ctx.project_id.as_deref(),
        &filters,
    )
    .await
    {
        Ok((incidents, total)) => MetaHttpResponse::json(serde_json::json!({
            "incidents": incidents,
            "total": total,
            "limit": filters.limit,
            "offset": filters.offset,
        })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIncidentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub escalation_policy_id: Option<String>,
}

/// Create an incident manually
#[utoipa::path(
    post,
    path = "/incidents",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "CreateIncident",
    security(("Authorization" = [])),
    request_body(content = CreateIncidentRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 403, description = "Forbidden", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn create(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<CreateIncidentRequest>,
) -> Response {
    if req.title.is_empty() {
        return MetaHttpResponse::bad_request("title is required");
    }
    let new = NewIncident {
        org_id: ctx.org_id.clone(),
        project_id: ctx.project_id.clone(),
        group_id: req.group_id,
        title: req.title,
        description: req.description,
        severity: req.severity,
        urgency: req.urgency,
        source: "manual".to_string(),
        incident_key: None,
        external_id: None,
        escalation_policy_id: req.escalation_policy_id,
    };
    match incident_service::create(&principal.user_id, &new).await {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Get one incident
#[utoipa::path(
    get,
    path = "/incidents/{incident_id}",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "GetIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, incident_id = %incident_id))]
pub async fn get(
    ctx: TenantContext,
    principal: Principal,
    Path(incident_id): Path<String>,
) -> Response {
    match incident_service::get(&principal.user_id, &ctx.org_id, &incident_id).await {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Get the append-only event timeline of an incident
#[utoipa::path(
    get,
    path = "/incidents/{incident_id}/events",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "GetIncidentEvents",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, incident_id = %incident_id))]
pub async fn events(
    ctx: TenantContext,
    principal: Principal,
    Path(incident_id): Path<String>,
) -> Response {
    match incident_service::events(&principal.user_id, &ctx.org_id, &incident_id).await {
        Ok(events) => MetaHttpResponse::json(serde_json::json!({ "events": events })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Acknowledge a triggered incident
#[utoipa::path(
    post,
    path = "/incidents/{incident_id}/acknowledge",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "AcknowledgeIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Acknowledged", content_type = "application/json"),
        (status = 409, description = "Conflict", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, incident_id = %incident_id))]
pub async fn acknowledge(
    ctx: TenantContext,
    principal: Principal,
    Path(incident_id): Path<String>,
) -> Response {
    match incident_service::acknowledge(&principal.user_id, &ctx.org_id, &incident_id).await {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Return an acknowledged incident to triggered
#[utoipa::path(
    post,
    path = "/incidents/{incident_id}/unacknowledge",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "UnacknowledgeIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Back to triggered", content_type = "application/json"),
        (status = 409, description = "Conflict", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, incident_id = %incident_id))]
pub async fn unacknowledge(
    ctx: TenantContext,
    principal: Principal,
    Path(incident_id): Path<String>,
) -> Response {
    match incident_service::unacknowledge(&principal.user_id, &ctx.org_id, &incident_id).await {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResolveIncidentRequest {
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Resolve an incident
#[utoipa::path(
    post,
    path = "/incidents/{incident_id}/resolve",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "ResolveIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident ID")),
    request_body(content = ResolveIncidentRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Resolved", content_type = "application/json"),
        (status = 409, description = "Conflict", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, incident_id = %incident_id))]
pub async fn resolve(
    ctx: TenantContext,
    principal: Principal,
    Path(incident_id): Path<String>,
    Json(req): Json<ResolveIncidentRequest>,
) -> Response {
    match incident_service::resolve(
        &principal.user_id,
        &ctx.org_id,
        &incident_id,
        req.resolution.as_deref(),
        req.note.as_deref(),
    )
    .await
    {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignIncidentRequest {
    pub user_id: String,
}

/// Assign an incident to a user
#[utoipa::path(
    post,
    path = "/incidents/{incident_id}/assign",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "AssignIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident ID")),
    request_body(content = AssignIncidentRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Assigned", content_type = "application/json"),
        (status = 409, description = "Conflict", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, incident_id = %incident_id))]
pub async fn assign(
    ctx: TenantContext,
    principal: Principal,
    Path(incident_id): Path<String>,
    Json(req): Json<AssignIncidentRequest>,
) -> Response {
    if req.user_id.is_empty() {
        return MetaHttpResponse::bad_request("user_id is required");
    }
    match incident_service::assign(&principal.user_id, &ctx.org_id, &incident_id, &req.user_id)
        .await
    {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}
