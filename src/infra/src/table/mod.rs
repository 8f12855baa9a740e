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

use sea_orm::{ConnectionTrait, EntityTrait, Schema};

use crate::db::{ORM_CLIENT, connect_to_orm};

pub mod entity;
pub mod escalation_policies;
pub mod external_monitors;
pub mod groups;
pub mod incident_events;
pub mod incidents;
pub mod memberships;
pub mod organizations;
pub mod projects;
pub mod schedule_overrides;
pub mod schedules;
pub mod uptime_monitors;
pub mod users;

pub async fn init() -> Result<(), anyhow::Error> {
    create_tables().await?;
    create_indexes().await?;
    Ok(())
}

async fn create_table_for<E: EntityTrait>(e: E) -> Result<(), sea_orm::DbErr> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let builder = client.get_database_backend();
    let schema = Schema::new(builder);
    let mut stmt = schema.create_table_from_entity(e);
    stmt.if_not_exists();
    client.execute(builder.build(&stmt)).await?;
    Ok(())
}

async fn create_tables() -> Result<(), anyhow::Error> {
    create_table_for(entity::organizations::Entity).await?;
    create_table_for(entity::projects::Entity).await?;
    create_table_for(entity::users::Entity).await?;
    create_table_for(entity::memberships::Entity).await?;
    create_table_for(entity::groups::Entity).await?;
    create_table_for(entity::schedules::Entity).await?;
    create_table_for(entity::schedule_overrides::Entity).await?;
    create_table_for(entity::escalation_policies::Entity).await?;
    create_table_for(entity::incidents::Entity).await?;
    create_table_for(entity::incident_events::Entity).await?;
    create_table_for(entity::uptime_monitors::Entity).await?;
    create_table_for(entity::uptime_checks::Entity).await?;
    create_table_for(entity::external_monitors::Entity).await?;
    Ok(())
}

async fn create_indexes() -> Result<(), anyhow::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    // The partial unique index on (org_id, incident_key) is what makes keyed
    // upsert race-safe: open incidents hold the key, resolved incidents
    // release it. Identical syntax on sqlite and postgres.
    let queries = [
        "CREATE INDEX IF NOT EXISTS incidents_org_status_idx ON incidents (org_id, status);",
        "CREATE UNIQUE INDEX IF NOT EXISTS incidents_org_key_open_idx ON incidents (org_id, incident_key) WHERE incident_key IS NOT NULL AND status IN ('triggered', 'acknowledged');",
        "CREATE INDEX IF NOT EXISTS incidents_due_idx ON incidents (escalation_due_at) WHERE escalation_due_at IS NOT NULL;",
        "CREATE INDEX IF NOT EXISTS incident_events_incident_created_idx ON incident_events (incident_id, created_at);",
        "CREATE INDEX IF NOT EXISTS memberships_user_type_idx ON memberships (user_id, object_type);",
        "CREATE INDEX IF NOT EXISTS memberships_object_idx ON memberships (object_type, object_id);",
        "CREATE UNIQUE INDEX IF NOT EXISTS projects_org_identifier_idx ON projects (org_id, identifier);",
        "CREATE INDEX IF NOT EXISTS groups_org_idx ON groups (org_id);",
        "CREATE INDEX IF NOT EXISTS schedules_group_idx ON schedules (group_id);",
        "CREATE INDEX IF NOT EXISTS schedule_overrides_group_start_idx ON schedule_overrides (group_id, start_at);",
        "CREATE INDEX IF NOT EXISTS uptime_checks_monitor_time_idx ON uptime_checks (monitor_id, checked_at);",
        "CREATE UNIQUE INDEX IF NOT EXISTS external_monitors_org_provider_idx ON external_monitors (org_id, provider, external_id);",
        "CREATE INDEX IF NOT EXISTS escalation_policies_org_idx ON escalation_policies (org_id);",
    ];

    for query in queries {
        if let Err(e) = client.execute_unprepared(query).await {
            log::error!("[TABLE] create index error: {e}");
            return Err(e.into());
        }
    }
    Ok(())
}
