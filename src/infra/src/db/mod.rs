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

use config::{POSTGRES_STORE, get_config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::sync::OnceCell;

use crate::errors::Result;

pub mod postgres;
pub mod sqlite;

pub static ORM_CLIENT: OnceCell<DatabaseConnection> = OnceCell::const_new();

pub async fn connect_to_orm() -> DatabaseConnection {
    let cfg = get_config();
    let url = if cfg.database.store == POSTGRES_STORE {
        cfg.database.dsn.clone()
    } else {
        format!("sqlite://{}metadata.sqlite?mode=rwc", cfg.database.data_dir)
    };

    let mut opts = ConnectOptions::new(url);
    // sqlite tolerates a single writer; the pool is clamped so ORM writes
    // never race each other in local mode
    let max_connections = if cfg.database.store == POSTGRES_STORE {
        cfg.database.max_connections
    } else {
        1
    };
    opts.max_connections(max_connections)
        .min_connections(cfg.database.min_connections.min(max_connections))
        .connect_timeout(Duration::from_secs(cfg.database.connect_timeout))
        .sqlx_logging(false);

    Database::connect(opts)
        .await
        .expect("database connect failed")
}

pub async fn init() -> Result<()> {
    let cfg = get_config();
    std::fs::create_dir_all(&cfg.database.data_dir)?;
    _ = ORM_CLIENT.get_or_init(connect_to_orm).await;
    Ok(())
}

/// Acquires the SQLite writer lock when SQLite is the configured store.
/// SQLite tolerates only one writer; every multi-statement write path takes
/// this guard first. Returns `None` on postgres.
pub async fn get_lock() -> Option<tokio::sync::MutexGuard<'static, sqlx::Pool<sqlx::Sqlite>>> {
    if get_config().database.store == POSTGRES_STORE {
        None
    } else {
        Some(sqlite::CLIENT_RW.lock().await)
    }
}
