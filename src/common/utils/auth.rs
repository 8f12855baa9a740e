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

use axum::http::HeaderMap;
use infra::errors::Error;

/// Validate the shared deployment token presented by edge probe workers.
/// Accepts `Authorization: Bearer <token>` or `X-Deployment-Token`.
/// An empty configured token disables the probe report endpoint.
pub fn verify_deployment_token(headers: &HeaderMap) -> Result<(), Error> {
    let cfg = config::get_config();
    let expected = cfg.uptime.deployment_token.as_str();
    if expected.is_empty() {
        return Err(Error::Unauthorized(
            "probe reporting is disabled: no deployment token configured".to_string(),
        ));
    }

    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| {
            headers
                .get("x-deployment-token")
                .and_then(|v| v.to_str().ok())
        })
        .unwrap_or("");

    if presented != expected {
        return Err(Error::Unauthorized("invalid deployment token".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_deployment_token_missing_header() {
        // default config has an empty token, so the endpoint is disabled
        let headers = HeaderMap::new();
        assert!(verify_deployment_token(&headers).is_err());
    }

    #[test]
    fn test_deployment_token_header_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        let presented = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("");
        assert_eq!(presented, "abc123");
    }
}
