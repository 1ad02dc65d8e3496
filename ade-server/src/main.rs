//! ADE KPI administration server.

mod config;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use ade::AdeBuilder;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Command line interface for the ADE server
#[derive(Parser, Debug)]
#[command(name = "ade-server", version, about = "ADE KPI administration backend")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ADE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overrides `listen` from the config file
    #[arg(long, env = "ADE_LISTEN")]
    listen: Option<SocketAddr>,

    /// Database connection string, overrides `database_url` from the config file
    #[arg(long, env = "ADE_DATABASE_URL")]
    database_url: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(database_url) = self.database_url {
            config.database_url = database_url;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting ADE server");

    let ade = AdeBuilder::new()
        .with_sqlite(&config.database_url)
        .await?
        .with_login_limits(config.login.to_limits()?)
        .with_objective_window(config.objectives.to_window())
        .apply_migrations(config.apply_migrations)
        .build()
        .await?;

    if let Some(admin) = &config.bootstrap_admin {
        if let Some(user) = ade.bootstrap_admin(&admin.username, &admin.password).await? {
            info!(user_id = user.id, username = %user.nom_utilisateur, "Created initial administrator");
        }
    }

    let ade = Arc::new(ade);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleanup = ade.start_cleanup_task(shutdown_rx);

    let app = ade_axum::create_router(ade);
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!(address = %config.listen, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    if let Err(e) = cleanup.await {
        warn!(error = %e, "Login limiter cleanup task ended abnormally");
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "ade-server",
            "--listen",
            "127.0.0.1:9000",
            "--database-url",
            "sqlite::memory:",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        assert_eq!(config.listen, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.login.max_attempts, 3);
    }
}
