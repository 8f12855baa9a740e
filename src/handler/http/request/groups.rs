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

//! On-call group endpoints.

use axum::{Json, extract::Path, response::Response};
use config::meta::{
    membership::{Action, ObjectType},
    organization::GroupVisibility,
};
use infra::table::groups;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::extractors::{Principal, TenantContext},
    service::auth,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct GroupRequest {
    pub name: String,
    #[serde(default)]
    pub visibility: GroupVisibility,
}

/// Create an on-call group
#[utoipa::path(
    post,
    path = "/groups",
    context_path = "/api",
    tag = "Groups",
    operation_id = "CreateGroup",
    security(("Authorization" = [])),
    request_body(content = GroupRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 403, description = "Forbidden", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn create(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<GroupRequest>,
) -> Response {
    if req.name.is_empty() {
        return MetaHttpResponse::bad_request("name is required");
    }
    match auth::check(&principal.user_id, Action::Create, ObjectType::Org, &ctx.org_id).await {
        Ok(true) => {}
        Ok(false) => return MetaHttpResponse::forbidden("group creation denied"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match groups::create(
        &ctx.org_id,
        ctx.project_id.as_deref(),
        &req.name,
        req.visibility,
    )
    .await
    {
        Ok(group) => MetaHttpResponse::json(group),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// List groups visible to the caller
#[utoipa::path(
    get,
    path = "/groups",
    context_path = "/api",
    tag = "Groups",
    operation_id = "ListGroups",
    security(("Authorization" = [])),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn list(ctx: TenantContext, principal: Principal) -> Response {
    match auth::visible_groups(&principal.user_id, &ctx.org_id).await {
        Ok(groups) => MetaHttpResponse::json(serde_json::json!({ "groups": groups })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Get a group
#[utoipa::path(
    get,
    path = "/groups/{group_id}",
    context_path = "/api",
    tag = "Groups",
    operation_id = "GetGroup",
    security(("Authorization" = [])),
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, group_id = %group_id))]
pub async fn get(
    ctx: TenantContext,
    principal: Principal,
    Path(group_id): Path<String>,
) -> Response {
    match auth::check(&principal.user_id, Action::View, ObjectType::Group, &group_id).await {
        Ok(true) => {}
        // invisible groups read as missing
        Ok(false) => return MetaHttpResponse::not_found(format!("group {group_id}")),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match groups::get(&ctx.org_id, &group_id).await {
        Ok(Some(group)) => MetaHttpResponse::json(group),
        Ok(None) => MetaHttpResponse::not_found(format!("group {group_id}")),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Update a group
#[utoipa::path(
    put,
    path = "/groups/{group_id}",
    context_path = "/api",
    tag = "Groups",
    operation_id = "UpdateGroup",
    security(("Authorization" = [])),
    params(("group_id" = String, Path, description = "Group ID")),
    request_body(content = GroupRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Updated", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, group_id = %group_id))]
pub async fn update(
    ctx: TenantContext,
    principal: Principal,
    Path(group_id): Path<String>,
    Json(req): Json<GroupRequest>,
) -> Response {
    match auth::check(&principal.user_id, Action::Update, ObjectType::Group, &group_id).await {
        Ok(true) => {}
        Ok(false) => return MetaHttpResponse::forbidden("group update denied"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match groups::update(&ctx.org_id, &group_id, &req.name, req.visibility).await {
        Ok(group) => MetaHttpResponse::json(group),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Delete a group
#[utoipa::path(
    delete,
    path = "/groups/{group_id}",
    context_path = "/api",
    tag = "Groups",
    operation_id = "DeleteGroup",
    security(("Authorization" = [])),
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Deleted", content_type = "application/json", body = MetaHttpResponse),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, group_id = %group_id))]
pub async fn delete(
    ctx: TenantContext,
    principal: Principal,
    Path(group_id): Path<String>,
) -> Response {
    match auth::check(&principal.user_id, Action::Delete, ObjectType::Group, &group_id).await {
        Ok(true) => {}
        Ok(false) => return MetaHttpResponse::forbidden("group deletion denied"),
        Err(e) => return MetaHttpResponse::from_error(e),
    }
    match groups::delete(&ctx.org_id, &group_id).await {
        Ok(()) => MetaHttpResponse::ok("group deleted"),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}
