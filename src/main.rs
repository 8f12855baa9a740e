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

use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    sync::Arc,
};

use openpager::{handler::http::router, job, service::notifications};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    config::init()?;
    setup_logs();

    let cfg = config::get_config();
    log::info!("starting OpenPager v{}", env!("CARGO_PKG_VERSION"));

    infra::init().await?;

    let shutdown = CancellationToken::new();
    let dispatcher = notifications::init(Arc::new(notifications::LogTransport), shutdown.clone());
    let jobs = job::init(shutdown.clone());

    let ip: IpAddr = if cfg.http.ipv6_enabled {
        IpAddr::V6(Ipv6Addr::UNSPECIFIED)
    } else {
        cfg.http
            .addr
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    };
    let addr = SocketAddr::new(ip, cfg.http.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, router::create_router())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await?;

    // drain background loops and queued notification intents
    for handle in jobs {
        if let Err(e) = handle.await {
            log::error!("background job join error: {e}");
        }
    }
    if let Err(e) = dispatcher.await {
        log::error!("notification dispatcher join error: {e}");
    }
    log::info!("shutdown complete");
    Ok(())
}

fn setup_logs() {
    let cfg = config::get_config();
    tracing_log::LogTracer::init().expect("log tracer init failed");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log.level.clone()));
    if cfg.log.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("ctrl-c handler install failed");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("sigterm handler install failed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}
