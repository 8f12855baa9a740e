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

use async_trait::async_trait;
use chrono::Duration;

use super::ClaimedIncident;
use crate::{db::sqlite::CLIENT_RW, errors::Result};

pub struct SqliteEscalator {}

impl SqliteEscalator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for SqliteEscalator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::Escalator for SqliteEscalator {
    /// SQLite has no row locks to skip; the single-writer mutex around
    /// the RW pool serializes claims instead, which gives the same
    /// at-most-one-worker guarantee in local mode.
    async fn claim(&self, concurrency: i64, lease_secs: i64) -> Result<Vec<ClaimedIncident>> {
        let client = CLIENT_RW.clone();
        let client = client.lock().await;

        let now = chrono::Utc::now().timestamp_micros();
        let leased_until = now
            + Duration::try_seconds(lease_secs)
                .unwrap()
                .num_microseconds()
                .unwrap();
        let query = r#"UPDATE incidents
SET escalation_due_at = $1
WHERE id IN (
    SELECT id
    FROM incidents
    WHERE status = 'triggered'
      AND escalation_policy_id IS NOT NULL
      AND escalation_status IN ('none', 'pending')
      AND escalation_due_at IS NOT NULL AND escalation_due_at <= $2
    ORDER BY escalation_due_at
    LIMIT $3
)
RETURNING id, org_id;"#;

        let claimed: Vec<ClaimedIncident> = sqlx::query_as::<_, ClaimedIncident>(query)
            .bind(leased_until)
            .bind(now)
            .bind(concurrency)
            .fetch_all(&*client)
            .await?;
        Ok(claimed)
    }
}
