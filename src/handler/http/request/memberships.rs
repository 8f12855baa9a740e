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

//! Membership management over the single ReBAC relation.

use axum::{Json, extract::Path, response::Response};
use config::meta::membership::{ObjectType, Role};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::extractors::{Principal, TenantContext},
    service::auth,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MembershipRequest {
    pub user_id: String,
    /// owner, admin, member or viewer
    pub role: String,
    /// org, project or group
    pub object_type: String,
    pub object_id: String,
}

/// Grant a membership
#[utoipa::path(
    post,
    path = "/memberships",
    context_path = "/api",
    tag = "Memberships",
    operation_id = "AddMembership",
    security(("Authorization" = [])),
    request_body(content = MembershipRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 403, description = "Forbidden", content_type = "application/json", body = MetaHttpResponse),
        (status = 409, description = "Already exists", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn add(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<MembershipRequest>,
) -> Response {
    let (role, object_type) = match parse_membership(&req.role, &req.object_type) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match auth::add_membership(
        &principal.user_id,
        &req.user_id,
        role,
        object_type,
        &req.object_id,
        &ctx.org_id,
    )
    .await
    {
        Ok(membership) => MetaHttpResponse::json(membership),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub user_id: String,
    pub role: String,
    pub object_type: String,
    pub object_id: String,
}

/// Change a member's role in place
#[utoipa::path(
    put,
    path = "/memberships",
    context_path = "/api",
    tag = "Memberships",
    operation_id = "UpdateMembershipRole",
    security(("Authorization" = [])),
    request_body(content = UpdateRoleRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Updated", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn update_role(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<UpdateRoleRequest>,
) -> Response {
    let (role, object_type) = match parse_membership(&req.role, &req.object_type) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match auth::update_membership_role(
        &principal.user_id,
        &req.user_id,
        object_type,
        &req.object_id,
        &ctx.org_id,
        role,
    )
    .await
    {
        Ok(membership) => MetaHttpResponse::json(membership),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveMembershipRequest {
    pub user_id: String,
    pub object_type: String,
    pub object_id: String,
}

/// Remove a membership
#[utoipa::path(
    delete,
    path = "/memberships",
    context_path = "/api",
    tag = "Memberships",
    operation_id = "RemoveMembership",
    security(("Authorization" = [])),
    request_body(content = RemoveMembershipRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Removed", content_type = "application/json", body = MetaHttpResponse),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn remove(
    ctx: TenantContext,
    principal: Principal,
    Json(req): Json<RemoveMembershipRequest>,
) -> Response {
    let object_type = match req.object_type.parse::<ObjectType>() {
        Ok(v) => v,
        Err(e) => return MetaHttpResponse::bad_request(e),
    };
    match auth::remove_membership(
        &principal.user_id,
        &req.user_id,
        object_type,
        &req.object_id,
        &ctx.org_id,
    )
    .await
    {
        Ok(()) => MetaHttpResponse::ok("membership removed"),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// List members of a resource
#[utoipa::path(
    get,
    path = "/memberships/resource/{object_type}/{object_id}",
    context_path = "/api",
    tag = "Memberships",
    operation_id = "ListResourceMembers",
    security(("Authorization" = [])),
    params(
        ("object_type" = String, Path, description = "org, project or group"),
        ("object_id" = String, Path, description = "Object ID"),
    ),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id))]
pub async fn list_resource_members(
    ctx: TenantContext,
    principal: Principal,
    Path((object_type, object_id)): Path<(String, String)>,
) -> Response {
    let object_type = match object_type.parse::<ObjectType>() {
        Ok(v) => v,
        Err(e) => return MetaHttpResponse::bad_request(e),
    };
    match auth::list_resource_members(&principal.user_id, object_type, &object_id, &ctx.org_id)
        .await
    {
        Ok(members) => MetaHttpResponse::json(serde_json::json!({ "members": members })),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// List the memberships a user holds within the org
#[utoipa::path(
    get,
    path = "/memberships/user/{user_id}",
    context_path = "/api",
    tag = "Memberships",
    operation_id = "ListUserMemberships",
    security(("Authorization" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %ctx.org_id, user_id = %user_id))]
pub async fn list_user_memberships(
    ctx: TenantContext,
    principal: Principal,
    Path(user_id): Path<String>,
) -> Response {
    match auth::list_user_memberships(&principal.user_id, &user_id, Some(&ctx.org_id)).await {
        Ok(memberships) => {
            MetaHttpResponse::json(serde_json::json!({ "memberships": memberships }))
        }
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

fn parse_membership(role: &str, object_type: &str) -> Result<(Role, ObjectType), Response> {
    let role = role
        .parse::<Role>()
        .map_err(MetaHttpResponse::bad_request)?;
    let object_type = object_type
        .parse::<ObjectType>()
        .map_err(MetaHttpResponse::bad_request)?;
    Ok((role, object_type))
}
