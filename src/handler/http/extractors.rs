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

use std::collections::HashMap;

use axum::{
    Json,
    extract::{FromRequestParts, Query},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

/// Tenant context required on every API request: `org_id` as a query
/// parameter or `X-Org-ID` header, optionally narrowed by `project_id`
/// or `X-Project-ID`. Missing org context is always a 400, never a
/// silently unfiltered query.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub org_id: String,
    pub project_id: Option<String>,
}

pub struct TenantRejection {
    message: String,
}

impl IntoResponse for TenantRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "code": 400,
                "message": self.message
            })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = TenantRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query: Query<HashMap<String, String>> = Query::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|_| Query(HashMap::new()));

        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };

        let org_id = query
            .get("org_id")
            .cloned()
            .or_else(|| header("x-org-id"))
            .unwrap_or_default();
        if org_id.is_empty() {
            return Err(TenantRejection {
                message: "missing tenant context: org_id query parameter or X-Org-ID header is required".to_string(),
            });
        }

        let project_id = query
            .get("project_id")
            .cloned()
            .or_else(|| header("x-project-id"))
            .filter(|v| !v.is_empty());

        Ok(TenantContext { org_id, project_id })
    }
}

/// The verified principal. Authentication is the identity collaborator's
/// job; the gateway forwards the verified user id in a trusted header
/// (`OP_AUTH_USER_HEADER`, `X-User-ID` by default).
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
}

pub struct PrincipalRejection;

impl IntoResponse for PrincipalRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "code": 401,
                "message": "missing or empty principal header"
            })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = PrincipalRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cfg = config::get_config();
        let user_id = parts
            .headers
            .get(cfg.auth.user_header.as_str())
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if user_id.is_empty() {
            return Err(PrincipalRejection);
        }
        Ok(Principal { user_id })
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};

    use super::*;

    async fn tenant_from(uri: &str, headers: &[(&str, &str)]) -> Result<TenantContext, String> {
        let mut builder = Request::builder().uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let request = builder.body(Body::empty()).unwrap();
        let (mut parts, _) = request.into_parts();
        TenantContext::from_request_parts(&mut parts, &())
            .await
            .map_err(|r| r.message)
    }

    #[tokio::test]
    async fn test_org_from_query() {
        let ctx = tenant_from("/api/incidents?org_id=org1", &[]).await.unwrap();
        assert_eq!(ctx.org_id, "org1");
        assert_eq!(ctx.project_id, None);
    }

    #[tokio::test]
    async fn test_org_from_header() {
        let ctx = tenant_from("/api/incidents", &[("x-org-id", "org2")])
            .await
            .unwrap();
        assert_eq!(ctx.org_id, "org2");
    }

    #[tokio::test]
    async fn test_project_narrowing() {
        let ctx = tenant_from("/api/incidents?org_id=org1&project_id=proj1", &[])
            .await
            .unwrap();
        assert_eq!(ctx.project_id.as_deref(), Some("proj1"));

        let ctx = tenant_from(
            "/api/incidents?org_id=org1",
            &[("x-project-id", "proj2")],
        )
        .await
        .unwrap();
        assert_eq!(ctx.project_id.as_deref(), Some("proj2"));
    }

    #[tokio::test]
    async fn test_missing_org_is_rejected() {
        let err = tenant_from("/api/incidents", &[]).await.unwrap_err();
        assert!(err.contains("org_id"));
    }

    #[tokio::test]
    async fn test_principal_header() {
        let request = Request::builder()
            .uri("/api/incidents")
            .header("x-user-id", "user1")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let principal = Principal::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(principal.user_id, "user1");

        let request = Request::builder()
            .uri("/api/incidents")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        assert!(Principal::from_request_parts(&mut parts, &()).await.is_err());
    }
}
