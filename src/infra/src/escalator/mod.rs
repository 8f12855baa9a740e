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

//! Work claiming for the escalation engine.
//!
//! A claim atomically pushes `escalation_due_at` forward by the lease
//! duration for up to N due incidents and returns their ids. Sibling
//! engine replicas skip rows locked by a concurrent claim, so each due
//! incident is handed to at most one worker per lease window. A worker
//! that dies mid-step leaves the lease to expire, after which the
//! incident becomes claimable again.

use async_trait::async_trait;
use config::{POSTGRES_STORE, get_config};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub mod postgres;
pub mod sqlite;

static CLIENT: Lazy<Box<dyn Escalator>> = Lazy::new(connect);

pub fn connect() -> Box<dyn Escalator> {
    if get_config().database.store == POSTGRES_STORE {
        Box::<postgres::PostgresEscalator>::default()
    } else {
        Box::<sqlite::SqliteEscalator>::default()
    }
}

#[async_trait]
pub trait Escalator: Sync + Send + 'static {
    /// Claim up to `concurrency` due incidents, leasing them for
    /// `lease_secs`.
    async fn claim(&self, concurrency: i64, lease_secs: i64) -> Result<Vec<ClaimedIncident>>;
}

/// Identity of a claimed incident. The engine reloads the full row and
/// rechecks eligibility before acting; the claim is only a lease.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct ClaimedIncident {
    pub id: String,
    pub org_id: String,
}

pub async fn init() -> Result<()> {
    // the incidents table and its indexes are created by table::init
    Ok(())
}

#[inline]
pub async fn claim(concurrency: i64, lease_secs: i64) -> Result<Vec<ClaimedIncident>> {
    CLIENT.claim(concurrency, lease_secs).await
}
