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

use axum::response::Response;

use crate::common::meta::http::HttpResponse as MetaHttpResponse;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Meta",
    operation_id = "Healthz",
    responses((status = 200, description = "Alive", content_type = "application/json")),
)]
pub async fn healthz() -> Response {
    MetaHttpResponse::json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
