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

use axum::{Json, response::IntoResponse, response::Response};
use utoipa::OpenApi;

use crate::{common, handler::http::request, service};

#[derive(OpenApi)]
#[openapi(
    paths(
        request::health::healthz,
        request::incidents::list,
        request::incidents::create,
        request::incidents::get,
        request::incidents::events,
        request::incidents::acknowledge,
        request::incidents::unacknowledge,
        request::incidents::resolve,
        request::incidents::assign,
        request::ingest::datadog,
        request::ingest::alertmanager,
        request::uptime::report,
        request::uptime::create,
        request::uptime::list,
        request::uptime::get,
        request::uptime::update,
        request::uptime::delete,
        request::schedules::create,
        request::schedules::list,
        request::schedules::update,
        request::schedules::delete,
        request::schedules::preview,
        request::schedules::who_is_on_call,
        request::schedules::effective_shifts,
        request::schedules::create_override,
        request::schedules::list_overrides,
        request::schedules::delete_override,
        request::policies::create,
        request::policies::list,
        request::policies::get,
        request::policies::update,
        request::policies::delete,
        request::groups::create,
        request::groups::list,
        request::groups::get,
        request::groups::update,
        request::groups::delete,
        request::memberships::add,
        request::memberships::update_role,
        request::memberships::remove,
        request::memberships::list_resource_members,
        request::memberships::list_user_memberships,
    ),
    components(schemas(
        common::meta::http::HttpResponse,
        common::meta::ingestion::DatadogEvent,
        common::meta::ingestion::DatadogOrg,
        common::meta::ingestion::AlertmanagerPayload,
        common::meta::ingestion::AlertmanagerAlert,
        common::meta::ingestion::ProbeReport,
        common::meta::ingestion::ProbeResult,
        config::meta::incident::Incident,
        config::meta::incident::IncidentEvent,
        config::meta::incident::IncidentStatus,
        config::meta::incident::IncidentEventType,
        config::meta::incident::Severity,
        config::meta::incident::Urgency,
        config::meta::incident::EscalationStatus,
        config::meta::membership::Role,
        config::meta::membership::ObjectType,
        config::meta::membership::Membership,
        config::meta::organization::Group,
        config::meta::organization::GroupVisibility,
        config::meta::schedule::Schedule,
        config::meta::schedule::RotationLayer,
        config::meta::schedule::TimeRestriction,
        config::meta::schedule::ScheduleOverride,
        config::meta::schedule::Shift,
        config::meta::escalation::EscalationPolicy,
        config::meta::escalation::EscalationLevel,
        config::meta::escalation::EscalationTarget,
        config::meta::uptime::UptimeMonitor,
        config::meta::uptime::CheckSample,
        config::meta::uptime::MonitorKind,
        service::uptime::ReportSummary,
        service::alerts::ingest::IngestOutcome,
        service::alerts::ingest::IngestStatus,
        request::incidents::CreateIncidentRequest,
        request::incidents::ResolveIncidentRequest,
        request::incidents::AssignIncidentRequest,
        request::uptime::CreateMonitorRequest,
        request::uptime::UpdateMonitorRequest,
        request::schedules::ScheduleRequest,
        request::schedules::PreviewRequest,
        request::schedules::OverrideRequest,
        request::policies::PolicyRequest,
        request::groups::GroupRequest,
        request::memberships::MembershipRequest,
        request::memberships::UpdateRoleRequest,
        request::memberships::RemoveMembershipRequest,
    )),
    tags(
        (name = "Incidents", description = "Incident lifecycle"),
        (name = "Ingest", description = "Inbound alert webhooks"),
        (name = "Uptime", description = "Monitors and probe reports"),
        (name = "Schedules", description = "On-call schedules, overrides and resolution"),
        (name = "Escalation", description = "Escalation policies"),
        (name = "Groups", description = "On-call groups"),
        (name = "Memberships", description = "ReBAC membership management"),
        (name = "Meta", description = "Service metadata"),
    ),
    info(
        title = "OpenPager API",
        description = "Incident response control plane: alert ingestion, on-call resolution, escalation."
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Response {
    Json(ApiDoc::openapi()).into_response()
}
