//! # Cineteca Server
//!
//! HTTP service around the sitemap engine of the Cineteca site:
//!
//! - **Publication**: serves the canonical `sitemap.xml` artifact
//! - **Admin trigger**: token-gated generation endpoint returning the run
//!   summary
//! - **Stats surface**: the single-row generation statistics record
//! - **Discrepancy report**: tracked pages missing from the published
//!   document, each with a classified reason
//! - **Visit tracking**: the collaborator-facing write surface feeding the
//!   `generated_pages` table
//!
//! Built on Axum with PostgreSQL for persistent storage.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cineteca_config::{Config, ConfigLoad, ConfigLoader};
use cineteca_server::{AppState, routes, scheduler};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "cineteca-server")]
#[command(
    about = "Sitemap generation, reconciliation and statistics service for the Cineteca site"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the configuration file
    #[arg(long, env = "CINETECA_CONFIG")]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Run one generation pass and print the summary as JSON
    Generate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,sqlx=warn")
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;
    for warning in warnings.iter() {
        warn!("{warning}");
    }

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    let database_url = config.database.primary_url.clone().context(
        "no database URL configured; set DATABASE_URL or [database] url",
    )?;
    if let Some(source) = config.metadata.database_url_source {
        info!(source = source.as_str(), "database URL resolved");
    }

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let config = Arc::new(config);
    let state = AppState::new(pool, config.clone())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Generate => {
            let summary = state.generator.run().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Serve => serve(state, config).await,
    }
}

async fn serve(state: AppState, config: Arc<Config>) -> anyhow::Result<()> {
    if let Some(interval) = config.sitemap.generation_interval {
        info!(?interval, "scheduled sitemap generation enabled");
        scheduler::spawn(state.generator.clone(), interval);
    }

    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr =
        format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "cineteca sitemap service listening");

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}
