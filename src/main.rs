// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HeadVantage Contact Intake Service
//!
//! Serves `POST /contact` for the website contact form.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! read first when present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX_REQUESTS`: Submissions per window per client (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 900)
//! - `MAIL_API_KEY`: Mail API credential; notifications are off without it
//! - `MAIL_FROM` / `MAIL_TO`: Sender and operator addresses
//! - `MAIL_TIMEOUT_MS`: Dispatch backstop (default: 10000)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use headvantage_contact::{build_router, AppState, Config, Notifier, RateLimiter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = Config::from_env();
    info!(
        bind_addr = %config.server.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        notifications = config.notifier.is_enabled(),
        "Starting contact intake service"
    );

    let limiter = RateLimiter::new(config.rate_limit.clone());
    let notifier = Notifier::from_config(&config.notifier)?;
    let state = Arc::new(AppState::new(config.clone(), limiter, notifier)?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let sweep_interval = config.rate_limit.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            if let Err(err) = cleanup_state.limiter.cleanup().await {
                warn!(error = %err, "Rate limit sweep failed");
            }
        }
    });

    let app = build_router(state);

    let addr: SocketAddr = config.server.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
