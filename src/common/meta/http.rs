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

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use infra::errors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// HTTP response
/// code 200 is success
/// code 400 is error
/// code 404 is not found
/// code 500 is internal server error
/// code 503 is service unavailable
/// message is the message or error message
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HttpResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl HttpResponse {
    pub fn message(code: u16, message: String) -> Self {
        HttpResponse {
            code,
            message,
            error_detail: None,
        }
    }

    pub fn error(code: u16, error: impl ToString) -> Self {
        HttpResponse {
            code,
            message: error.to_string(),
            error_detail: None,
        }
    }

    /// Send a normal response in json format and associate the
    /// provided message as `message` field.
    pub fn ok(msg: impl ToString) -> Response {
        (
            StatusCode::OK,
            Json(Self::message(StatusCode::OK.into(), msg.to_string())),
        )
            .into_response()
    }

    /// Send a BadRequest response in json format and associate the
    /// provided error as `error` field.
    pub fn bad_request(error: impl ToString) -> Response {
        Self::error(StatusCode::BAD_REQUEST.into(), error.to_string()).into_response()
    }

    pub fn unauthorized(error: impl ToString) -> Response {
        Self::error(StatusCode::UNAUTHORIZED.into(), error.to_string()).into_response()
    }

    pub fn forbidden(error: impl ToString) -> Response {
        Self::error(StatusCode::FORBIDDEN.into(), error.to_string()).into_response()
    }

    pub fn conflict(error: impl ToString) -> Response {
        Self::error(StatusCode::CONFLICT.into(), error.to_string()).into_response()
    }

    pub fn not_found(error: impl ToString) -> Response {
        Self::error(StatusCode::NOT_FOUND.into(), error.to_string()).into_response()
    }

    pub fn internal_error(error: impl ToString) -> Response {
        Self::error(
            StatusCode::INTERNAL_SERVER_ERROR.into(),
            error.to_string(),
        )
        .into_response()
    }

    /// Send a response in json format, status code is 200.
    /// The payload should be serde-serializable.
    pub fn json(payload: impl Serialize) -> Response {
        (StatusCode::OK, Json(serde_json::json!(payload))).into_response()
    }

    /// The single place service errors become HTTP responses. NotFound
    /// covers both missing objects and objects outside the caller's
    /// computed scope.
    pub fn from_error(e: errors::Error) -> Response {
        match e {
            errors::Error::BadRequest(msg) => Self::bad_request(msg),
            errors::Error::Unauthorized(msg) => Self::unauthorized(msg),
            errors::Error::Forbidden(msg) => Self::forbidden(msg),
            errors::Error::ResourceNotFound(msg) => Self::not_found(msg),
            errors::Error::ResourceConflict(msg) => Self::conflict(msg),
            errors::Error::TransientFailure(msg) => {
                Self::error(StatusCode::SERVICE_UNAVAILABLE.into(), msg).into_response()
            }
            other => {
                log::error!("[HTTP] internal error: {other}");
                Self::internal_error("internal server error")
            }
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_message() {
        let msg = "This is an error response";
        let err = HttpResponse::message(StatusCode::OK.into(), msg.to_string());
        assert_eq!(err.code, 200);
        assert_eq!(err.message, msg);

        let err = HttpResponse::error(StatusCode::INTERNAL_SERVER_ERROR.into(), msg);
        assert_eq!(err.code, 500);
        assert_eq!(err.message, msg);
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let resp =
            HttpResponse::from_error(infra::errors::Error::BadRequest("missing org_id".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = HttpResponse::from_error(infra::errors::Error::ResourceConflict(
            "already resolved".into(),
        ));
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = HttpResponse::from_error(infra::errors::Error::ResourceNotFound(
            "incident x".into(),
        ));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = HttpResponse::from_error(infra::errors::Error::Forbidden("nope".into()));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp =
            HttpResponse::from_error(infra::errors::Error::TransientFailure("db gone".into()));
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
