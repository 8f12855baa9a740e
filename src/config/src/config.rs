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

use std::sync::Arc;

use arc_swap::ArcSwap;
use dotenv_config::EnvConfig;
use dotenvy::dotenv_override;
use once_cell::sync::Lazy;

pub const SQLITE_STORE: &str = "sqlite";
pub const POSTGRES_STORE: &str = "postgres";

/// Principal recorded on events that the system itself produces
/// (escalation steps, source-driven auto-resolution).
pub const SYSTEM_PRINCIPAL: &str = "system";

static CONFIG: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from(Arc::new(init())));

pub fn get_config() -> Arc<Config> {
    CONFIG.load().clone()
}

pub fn refresh_config() -> Result<(), anyhow::Error> {
    CONFIG.store(Arc::new(init()));
    Ok(())
}

fn init() -> Config {
    dotenv_override().ok();
    let cfg = Config::init().expect("config loading from environment failed");
    if let Err(e) = validate(&cfg) {
        panic!("config validation failed: {e}");
    }
    cfg
}

fn validate(cfg: &Config) -> Result<(), anyhow::Error> {
    if cfg.database.store != SQLITE_STORE && cfg.database.store != POSTGRES_STORE {
        return Err(anyhow::anyhow!(
            "OP_DB_STORE must be one of: sqlite, postgres, got: {}",
            cfg.database.store
        ));
    }
    if cfg.database.store == POSTGRES_STORE && cfg.database.dsn.is_empty() {
        return Err(anyhow::anyhow!("OP_DB_DSN is required for postgres"));
    }
    if cfg.escalation.batch_size == 0 {
        return Err(anyhow::anyhow!(
            "OP_ESCALATION_BATCH_SIZE must be greater than zero"
        ));
    }
    if cfg.escalation.concurrency == 0 {
        return Err(anyhow::anyhow!(
            "OP_ESCALATION_CONCURRENCY must be greater than zero"
        ));
    }
    Ok(())
}

#[derive(EnvConfig)]
pub struct Config {
    pub http: Http,
    pub log: Log,
    pub database: Database,
    pub limit: Limit,
    pub auth: Auth,
    pub escalation: Escalation,
    pub uptime: Uptime,
    pub notifications: Notifications,
}

#[derive(EnvConfig)]
pub struct Http {
    #[env_config(name = "OP_HTTP_ADDR", default = "0.0.0.0")]
    pub addr: String,
    #[env_config(name = "OP_HTTP_PORT", default = 5080)]
    pub port: u16,
    #[env_config(name = "OP_HTTP_IPV6_ENABLED", default = false)]
    pub ipv6_enabled: bool,
    #[env_config(name = "OP_HTTP_REQUEST_TIMEOUT", default = 30)]
    pub request_timeout: u64,
}

#[derive(EnvConfig)]
pub struct Log {
    #[env_config(name = "OP_LOG_LEVEL", default = "info")]
    pub level: String,
    #[env_config(name = "OP_LOG_JSON", default = false)]
    pub json_format: bool,
}

#[derive(EnvConfig)]
pub struct Database {
    /// Meta store backend: sqlite (local mode) or postgres (cluster mode).
    #[env_config(name = "OP_DB_STORE", default = "sqlite")]
    pub store: String,
    #[env_config(name = "OP_DB_DSN", default = "")]
    pub dsn: String,
    #[env_config(name = "OP_DATA_DIR", default = "./data/")]
    pub data_dir: String,
    #[env_config(name = "OP_DB_MAX_CONNECTIONS", default = 20)]
    pub max_connections: u32,
    #[env_config(name = "OP_DB_MIN_CONNECTIONS", default = 2)]
    pub min_connections: u32,
    #[env_config(name = "OP_DB_CONNECT_TIMEOUT", default = 10)]
    pub connect_timeout: u64,
}

#[derive(EnvConfig)]
pub struct Limit {
    #[env_config(name = "OP_LIST_DEFAULT_PAGE_SIZE", default = 100)]
    pub default_page_size: u64,
    #[env_config(name = "OP_LIST_MAX_PAGE_SIZE", default = 1000)]
    pub max_page_size: u64,
    #[env_config(name = "OP_JSON_BODY_LIMIT_MB", default = 4)]
    pub json_body_limit_mb: usize,
}

#[derive(EnvConfig)]
pub struct Auth {
    /// Header carrying the verified principal id. Authentication itself is
    /// the identity provider's job; this service trusts the gateway.
    #[env_config(name = "OP_AUTH_USER_HEADER", default = "x-user-id")]
    pub user_header: String,
}

#[derive(EnvConfig)]
pub struct Escalation {
    /// Seconds between engine ticks.
    #[env_config(name = "OP_ESCALATION_TICK_INTERVAL", default = 5)]
    pub tick_interval: u64,
    /// Maximum incidents claimed per tick.
    #[env_config(name = "OP_ESCALATION_BATCH_SIZE", default = 50)]
    pub batch_size: i64,
    /// Incidents advanced in parallel within one tick.
    #[env_config(name = "OP_ESCALATION_CONCURRENCY", default = 8)]
    pub concurrency: usize,
    /// Claim lease in seconds. A claimed incident is invisible to sibling
    /// replicas until the lease expires or the step commits.
    #[env_config(name = "OP_ESCALATION_CLAIM_LEASE", default = 30)]
    pub claim_lease: i64,
    /// Per-advance deadline in seconds; an advance exceeding it is
    /// abandoned and retried on a later tick.
    #[env_config(name = "OP_ESCALATION_STEP_DEADLINE", default = 25)]
    pub step_deadline: u64,
}

#[derive(EnvConfig)]
pub struct Uptime {
    /// Shared secret presented by edge probe workers on report submission.
    #[env_config(name = "OP_UPTIME_DEPLOYMENT_TOKEN", default = "")]
    pub deployment_token: String,
    /// Seconds between external provider sync rounds.
    #[env_config(name = "OP_UPTIME_PROVIDER_SYNC_INTERVAL", default = 300)]
    pub provider_sync_interval: u64,
}

#[derive(EnvConfig)]
pub struct Notifications {
    #[env_config(name = "OP_NOTIFICATION_QUEUE_SIZE", default = 1024)]
    pub queue_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let cfg = Config::init().unwrap();
        assert_eq!(cfg.escalation.tick_interval, 5);
        assert_eq!(cfg.escalation.batch_size, 50);
        assert!(cfg.limit.max_page_size >= cfg.limit.default_page_size);
        assert_eq!(cfg.auth.user_header, "x-user-id");
    }

    #[test]
    fn test_config_store_validation() {
        let cfg = Config::init().unwrap();
        assert!(validate(&cfg).is_ok());
    }
}
