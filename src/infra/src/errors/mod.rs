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

use config::utils::json;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IoError# {0}")]
    IoError(#[from] std::io::Error),
    #[error("DbError# {0}")]
    DbError(#[from] DbError),
    #[error("SerdeJsonError# {0}")]
    SerdeJsonError(#[from] json::Error),
    #[error("SqlxError# {0}")]
    SqlxError(#[from] sqlx::Error),
    /// Malformed input or missing tenant context.
    #[error("BadRequest# {0}")]
    BadRequest(String),
    /// Absent or invalid principal.
    #[error("Unauthorized# {0}")]
    Unauthorized(String),
    /// The principal lacks the required action on the resource.
    #[error("Forbidden# {0}")]
    Forbidden(String),
    /// Missing, or outside the caller's computed scope — deliberately
    /// indistinguishable.
    #[error("NotFound# {0}")]
    ResourceNotFound(String),
    /// State-machine or uniqueness violation.
    #[error("Conflict# {0}")]
    ResourceConflict(String),
    /// Downstream unavailability; safe to retry.
    #[error("TransientFailure# {0}")]
    TransientFailure(String),
    #[error("Error# {0}")]
    Message(String),
    #[error("Unknown error")]
    Unknown,
}

impl From<sea_orm::DbErr> for Error {
    fn from(e: sea_orm::DbErr) -> Self {
        Error::DbError(DbError::SeaORMError(e.to_string()))
    }
}

impl Error {
    /// Whether the underlying database rejected a unique constraint.
    /// Used by keyed upsert to turn an insert race into a merge.
    pub fn is_unique_violation(&self) -> bool {
        let msg = self.to_string().to_lowercase();
        msg.contains("unique constraint") || msg.contains("duplicate key")
    }
}

pub fn unique_violation(e: &sea_orm::DbErr) -> bool {
    let msg = e.to_string().to_lowercase();
    msg.contains("unique constraint") || msg.contains("duplicate key")
}

#[derive(ThisError, Debug)]
pub enum DbError {
    #[error("key {0} does not exist")]
    KeyNotExists(String),
    #[error("error {0} performing operation on key {1}")]
    DBOperError(String, String),
    #[error("SeaORMError# {0}")]
    SeaORMError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detection() {
        let sqlite = sea_orm::DbErr::Custom(
            "Execution Error: error returned from database: (code: 2067) UNIQUE constraint failed: incidents.org_id, incidents.incident_key".to_string(),
        );
        assert!(unique_violation(&sqlite));

        let postgres = sea_orm::DbErr::Custom(
            "Execution Error: duplicate key value violates unique constraint \"incidents_org_key_open_idx\"".to_string(),
        );
        assert!(unique_violation(&postgres));

        let other = sea_orm::DbErr::Custom("connection reset".to_string());
        assert!(!unique_violation(&other));
    }

    #[test]
    fn test_error_display_prefixes() {
        assert!(
            Error::ResourceConflict("incident already resolved".to_string())
                .to_string()
                .starts_with("Conflict#")
        );
        assert!(
            Error::BadRequest("missing org_id".to_string())
                .to_string()
                .starts_with("BadRequest#")
        );
    }
}
