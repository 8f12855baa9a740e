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

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::request::{
    groups, health, incidents, ingest, memberships, policies, schedules, uptime,
};

pub mod openapi;

pub fn create_router() -> Router {
    let cfg = config::get_config();

    let api = Router::new()
        // incidents
        .route("/incidents", get(incidents::list).post(incidents::create))
        .route("/incidents/{incident_id}", get(incidents::get))
        .route("/incidents/{incident_id}/events", get(incidents::events))
        .route(
            "/incidents/{incident_id}/acknowledge",
            post(incidents::acknowledge),
        )
        .route(
            "/incidents/{incident_id}/unacknowledge",
            post(incidents::unacknowledge),
        )
        .route("/incidents/{incident_id}/resolve", post(incidents::resolve))
        .route("/incidents/{incident_id}/assign", post(incidents::assign))
        // inbound webhooks
        .route("/ingest/datadog/{org_id}/{token}", post(ingest::datadog))
        .route(
            "/ingest/alertmanager/{org_id}/{token}",
            post(ingest::alertmanager),
        )
        // uptime
        .route("/uptime/report", post(uptime::report))
        .route("/monitors", get(uptime::list).post(uptime::create))
        .route(
            "/monitors/{monitor_id}",
            get(uptime::get).put(uptime::update).delete(uptime::delete),
        )
        // schedules & on-call
        .route("/schedules", get(schedules::list).post(schedules::create))
        .route("/schedules/preview", post(schedules::preview))
        .route(
            "/schedules/{schedule_id}",
            axum::routing::put(schedules::update).delete(schedules::delete),
        )
        .route("/oncall/{group_id}", get(schedules::who_is_on_call))
        .route("/oncall/{group_id}/shifts", get(schedules::effective_shifts))
        .route(
            "/overrides",
            get(schedules::list_overrides).post(schedules::create_override),
        )
        .route("/overrides/{override_id}", delete(schedules::delete_override))
        // escalation policies
        .route("/policies", get(policies::list).post(policies::create))
        .route(
            "/policies/{policy_id}",
            get(policies::get)
                .put(policies::update)
                .delete(policies::delete),
        )
        // groups
        .route("/groups", get(groups::list).post(groups::create))
        .route(
            "/groups/{group_id}",
            get(groups::get).put(groups::update).delete(groups::delete),
        )
        // memberships
        .route(
            "/memberships",
            post(memberships::add)
                .put(memberships::update_role)
                .delete(memberships::remove),
        )
        .route(
            "/memberships/resource/{object_type}/{object_id}",
            get(memberships::list_resource_members),
        )
        .route(
            "/memberships/user/{user_id}",
            get(memberships::list_user_memberships),
        );

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(
            cfg.http.request_timeout,
        )))
        .layer(DefaultBodyLimit::max(
            cfg.limit.json_body_limit_mb * 1024 * 1024,
        ))
}
