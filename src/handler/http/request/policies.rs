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

//! Escalation policy endpoints.

use axum::{Json, extract::Path, response::Response};
use config::meta::{
    escalation::{EscalationLevel, EscalationPolicy},
    membership::{Action, ObjectType},
};
use infra::table::escalation_policies;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::extractors::{Principal, TenantContext},
    service::auth,
};

async fn require_org(user_id: &str, org_id: &str, action: Action) -> Result<(), Response> {
    match auth::check(user_id, action, ObjectType::Org, org_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(MetaHttpResponse::forbidden(format!(
            "escalation policy access denied in org {org_id}"
        ))),
        Err(e) => Err(MetaHttpResponse::from_error(e)),
    }
}

fn validate(levels: &[EscalationLevel]) -> Result<(), Response> {
    // reuse the policy-shape validation with a synthetic wrapper
    let policy = EscalationPolicy {
        id: String::new(),
        org_id: String::new(),
        name: "validation".to_string(),
        description: String::new(),
        levels: levels.to_vec(),
        created_at: 0,
        updated_at: 0,
    };
    policy.validate().map_err(MetaHttpResponse::bad_request)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PolicyRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub levels: Vec<EscalationLevel>,
}

/// Create an escalation policy
#[utoipa::path(
    post,
    path = "/policies",
    context_path = "/api",
    tag = "Escalation",
    operation_id = "CreateEscalationPolicy",
    security(("Authorization" = [])),
    request_body(content = PolicyRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 400, description = "Invalid levels", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn create(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<PolicyRequest>,
) -> Response {
    if req.name.is_empty() {
        return MetaHttpResponse::bad_request("name is required");
    }
    if let Err(resp) = require_org(&principal.user_id, &ctx.org_id, Action::Create).await {
        return resp;
    }
    if let Err(resp) = validate(&req.levels) {
        return resp;
    }
    match escalation_policies::create(&ctx.org_id, &req.name, &req.description, &req.levels).await
    {
        Ok(policy) => MetaHttpResponse::json(policy),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// List escalation policies
#[utoipa::path(
    get,
    path = "/policies",
    context_path = "/api",
    tag = "Escalation",
    operation_id = "ListEscalationPolicies",
    security(("Authorization" = [])),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn list(ctx: TenantContext, principal: Principal) -> Response {
    if let Err(resp) = require_org(&principal.user_id, &ctx.org_id, Action::View).await {
        return resp;
    }
    match escalation_policies::list(&ctx.org_id).await {
        Ok(policies) => MetaHttpResponse::json(serde_json::json!({ "policies": policies })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Get an escalation policy
#[utoipa::path(
    get,
    path = "/policies/{policy_id}",
    context_path = "/api",
    tag = "Escalation",
    operation_id = "GetEscalationPolicy",
    security(("Authorization" = [])),
    params(("policy_id" = String, Path, description = "Policy ID")),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, policy_id = %policy_id))]
pub async fn get(
    ctx: TenantContext,
    principal: Principal,
    Path(policy_id): Path<String>,
) -> Response {
    if let Err(resp) = require_org(&principal.user_id, &ctx.org_id, Action::View).await {
        return resp;
    }
    match escalation_policies::get(&ctx.org_id, &policy_id).await {
        Ok(Some(policy)) => MetaHttpResponse::json(policy),
        Ok(None) => MetaHttpResponse::not_found(format!("escalation policy {policy_id}")),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Update an escalation policy; edits take effect for subsequent
/// escalations immediately
#[utoipa::path(
    put,
    path = "/policies/{policy_id}",
    context_path = "/api",
    tag = "Escalation",
    operation_id = "UpdateEscalationPolicy",
    security(("Authorization" = [])),
    params(("policy_id" = String, Path, description = "Policy ID")),
    request_body(content = PolicyRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Updated", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, policy_id = %policy_id))]
pub async fn update(
    ctx: TenantContext,
    principal: Principal,
    Path(policy_id): Path<String>,
    Json(req): Json<PolicyRequest>,
) -> Response {
    if let Err(resp) = require_org(&principal.user_id, &ctx.org_id, Action::Update).await {
        return resp;
    }
    if let Err(resp) = validate(&req.levels) {
        return resp;
    }
    match escalation_policies::update(
        &ctx.org_id,
        &policy_id,
        &req.name,
        &req.description,
        &req.levels,
    )
    .await
    {
        Ok(policy) => MetaHttpResponse::json(policy),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Delete an escalation policy
#[utoipa::path(
    delete,
    path = "/policies/{policy_id}",
    context_path = "/api",
    tag = "Escalation",
    operation_id = "DeleteEscalationPolicy",
    security(("Authorization" = [])),
    params(("policy_id" = String, Path, description = "Policy ID")),
    responses(
        (status = 200, description = "Deleted", content_type = "application/json", body = MetaHttpResponse),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, policy_id = %policy_id))]
pub async fn delete(
    ctx: TenantContext,
    principal: Principal,
    Path(policy_id): Path<String>,
) -> Response {
    if let Err(resp) = require_org(&principal.user_id, &ctx.org_id, Action::Delete).await {
        return resp;
    }
    match escalation_policies::delete(&ctx.org_id, &policy_id).await {
        Ok(()) => MetaHttpResponse::ok("escalation policy deleted"),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}
