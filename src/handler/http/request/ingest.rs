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

//! Inbound alert webhooks. These endpoints authenticate by the org's
//! ingest token embedded in the URL, not by a principal; the optional
//! query parameters route created incidents to a project, group and
//! escalation policy.

use axum::{
    Json,
    extract::{Path, Query},
    response::Response,
};
use infra::table::organizations;

use crate::{
    common::meta::{
        http::HttpResponse as MetaHttpResponse,
        ingestion::{AlertmanagerPayload, DatadogEvent},
    },
    service::alerts::ingest::{self, IngestRoute},
};

async fn verify_token(org_id: &str, token: &str) -> Result<(), Response> {
    match organizations::verify_ingest_token(org_id, token).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(MetaHttpResponse::unauthorized("invalid ingest token")),
        Err(e) => Err(MetaHttpResponse::from_error(e)),
    }
}

/// Datadog webhook
#[utoipa::path(
    post,
    path = "/ingest/datadog/{org_id}/{token}",
    context_path = "/api",
    tag = "Ingest",
    operation_id = "IngestDatadog",
    params(
        ("org_id" = String, Path, description = "Organization ID"),
        ("token" = String, Path, description = "Org ingest token"),
        ("project_id" = Option<String>, Query, description = "Project to file incidents under"),
        ("group_id" = Option<String>, Query, description = "On-call group backing current_schedule targets"),
        ("policy_id" = Option<String>, Query, description = "Escalation policy for created incidents"),
    ),
    request_body(content = DatadogEvent, content_type = "application/json"),
    responses(
        (status = 200, description = "Processed", content_type = "application/json"),
        (status = 400, description = "Unusable payload", content_type = "application/json", body = MetaHttpResponse),
        (status = 401, description = "Invalid token", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %org_id))]
pub async fn datadog(
    Path((org_id, token)): Path<(String, String)>,
    Query(route): Query<IngestRoute>,
    Json(event): Json<DatadogEvent>,
) -> Response {
    if let Err(resp) = verify_token(&org_id, &token).await {
        return resp;
    }

    let alert = match ingest::normalize_datadog(&event) {
        Ok(alert) => alert,
        Err(e) => return MetaHttpResponse::from_error(e),
    };

    match ingest::process(&org_id, &route, alert).await {
        Ok(outcome) => MetaHttpResponse::json(outcome),
        Err(e) => MetaHttpResponse::from_error(e),
    }
}

/// Prometheus Alertmanager webhook. One envelope may carry many alerts;
/// each is processed independently and the per-alert outcomes are
/// returned in order.
#[utoipa::path(
    post,
    path = "/ingest/alertmanager/{org_id}/{token}",
    context_path = "/api",
    tag = "Ingest",
    operation_id = "IngestAlertmanager",
    params(
        ("org_id" = String, Path, description = "Organization ID"),
        ("token" = String, Path, description = "Org ingest token"),
        ("project_id" = Option<String>, Query, description = "Project to file incidents under"),
        ("group_id" = Option<String>, Query, description = "On-call group backing current_schedule targets"),
        ("policy_id" = Option<String>, Query, description = "Escalation policy for created incidents"),
    ),
    request_body(content = AlertmanagerPayload, content_type = "application/json"),
    responses(
        (status = 200, description = "Processed", content_type = "application/json"),
        (status = 401, description = "Invalid token", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(org_id = %org_id))]
pub async fn alertmanager(
    Path((org_id, token)): Path<(String, String)>,
    Query(route): Query<IngestRoute>,
    Json(payload): Json<AlertmanagerPayload>,
) -> Response {
    if let Err(resp) = verify_token(&org_id, &token).await {
        return resp;
    }

    let alerts = ingest::normalize_alertmanager(&payload);
    let mut outcomes = Vec::with_capacity(alerts.len());
    for alert in alerts {
        match ingest::process(&org_id, &route, alert).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => return MetaHttpResponse::from_error(e),
        }
    }
    MetaHttpResponse::json(serde_json::json!({ "outcomes": outcomes }))
}
