use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lessons_api::config::{self, AppConfig};
use lessons_api::database::{DatabaseManager, Repositories};
use lessons_api::identity::{HttpIdentityService, IdentityService, StaticIdentityService};
use lessons_api::{app, AppState, Caches};

#[derive(Parser)]
#[command(name = "lessons-api")]
#[command(about = "Lessons API - lessons, lesson plans and activities over HTTP")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides API_PORT")]
        port: Option<u16>,

        #[arg(long, help = "Keep all data in process memory instead of Postgres")]
        in_memory: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lessons_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Lessons API in {:?} mode", config.environment);

    let command = Cli::parse().command.unwrap_or(Command::Serve {
        port: None,
        in_memory: false,
    });

    match command {
        Command::Serve { port, in_memory } => serve(config, port, in_memory).await,
        Command::Migrate => migrate(config).await,
    }
}

async fn serve(config: &AppConfig, port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    config
        .security
        .require_jwt_secret()
        .with_context(|| format!("refusing to start in {:?} mode", config.environment))?;

    let repos = if in_memory {
        tracing::warn!("Using in-memory storage; data is lost on exit");
        Repositories::in_memory()
    } else {
        let manager = DatabaseManager::connect(&config.database).await?;
        if config.database.run_migrations {
            manager.migrate().await?;
        }
        Repositories::postgres(Arc::new(manager))
    };

    let identity: Arc<dyn IdentityService> = match &config.identity.static_users {
        Some(directory) => {
            tracing::info!("Resolving users from IDENTITY_STATIC_USERS");
            Arc::new(StaticIdentityService::parse(directory)?)
        }
        None => {
            tracing::info!("Resolving users via {}", config.identity.base_url);
            Arc::new(HttpIdentityService::new(&config.identity)?)
        }
    };

    let state = AppState::new(repos, identity, Caches::ttl(&config.cache), config.security.clone());

    let bind_addr = format!("{}:{}", config.server.bind_host, port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Lessons API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let manager = DatabaseManager::connect(&config.database).await?;
    manager.migrate().await?;
    manager.close().await;
    tracing::info!("Migrations applied");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
