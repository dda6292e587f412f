use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::{app, AppState};
use crate::auth::{issue_token, Claims, IDM_ADMIN};
use crate::config::{AppConfig, StoreDriver};
use crate::database::{DatabaseManager, MemoryStore, PgStore};
use crate::telemetry;

#[derive(Parser)]
#[command(name = "idm-api")]
#[command(about = "Identity management API: employees and roles")]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = ".env", help = "Environment file loaded before reading configuration")]
    pub env_file: PathBuf,

    #[arg(long, help = "Listen port, overrides APP_PORT")]
    pub port: Option<u16>,

    #[arg(long, help = "Create missing tables before serving")]
    pub migrate: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print a signed development token")]
    Token {
        #[arg(long = "role", default_values_t = vec![IDM_ADMIN.to_string()], help = "Realm role, repeatable")]
        roles: Vec<String>,

        #[arg(long, default_value = "dev", help = "Token subject")]
        sub: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    load_env_file(&cli.env_file)?;

    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.api.port = port;
    }

    match cli.command {
        Some(Commands::Token { roles, sub }) => {
            let claims = Claims::new(sub, roles, config.security.jwt_expiry_hours);
            let token = issue_token(&claims, &config.security.jwt_secret)?;
            println!("{}", token);
            Ok(())
        }
        None => serve(config, cli.migrate).await,
    }
}

/// A missing file is fine; a malformed one is not.
fn load_env_file(path: &Path) -> anyhow::Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

async fn serve(config: AppConfig, migrate: bool) -> anyhow::Result<()> {
    telemetry::init_tracing(&config.logging)?;
    info!(
        name = %config.app_name,
        version = %config.app_version,
        environment = ?config.environment,
        "Starting server"
    );

    let bind_addr = format!("0.0.0.0:{}", config.api.port);

    let (state, pool) = match config.database.driver {
        StoreDriver::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if migrate {
                DatabaseManager::ensure_schema(&pool).await?;
            }
            let store = Arc::new(PgStore::new(pool.clone()));
            let state = AppState::new(config, store.clone(), store.clone(), store);
            (state, Some(pool))
        }
        StoreDriver::Memory => {
            info!("Using in-memory store");
            let store = Arc::new(MemoryStore::new());
            let state = AppState::new(config, store.clone(), store.clone(), store);
            (state, None)
        }
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        info!("Database pool closed");
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
