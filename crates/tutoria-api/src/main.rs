//! Tutoria CLI and REST API entry point.
//!
//! Binary name: `tutoria`
//!
//! Parses CLI arguments, loads configuration, initializes tracing, then
//! dispatches to the one-shot `ask` command or starts the REST API server.

mod cli;
mod http;
mod state;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;
use tutoria_infra::config::{ConfigSource, load_config};
use tutoria_observe::tracing_setup::{
    TracingOptions, filter_for_verbosity, init_tracing, shutdown_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = load_config(&cli.config)
        .await
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    init_tracing(&TracingOptions {
        default_filter: filter_for_verbosity(cli.verbose, cli.quiet).to_string(),
        json: cli.json,
        enable_otel: config.observability.otel,
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    match source {
        ConfigSource::File => {
            tracing::debug!(path = %cli.config.display(), "Configuration loaded");
        }
        ConfigSource::Defaults => {
            tracing::debug!(path = %cli.config.display(), "No config file, using defaults");
        }
    }

    let result = match cli.command {
        Commands::Ask {
            question,
            interests,
            persona,
        } => cli::ask::ask(&config, &question, interests, persona, cli.json).await,

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(&config, cli.quiet).await
        }
    };

    shutdown_tracing();
    result
}

/// Run the REST API until Ctrl+C or SIGTERM.
///
/// On shutdown the root token is cancelled so in-flight generations stop
/// promptly; the server then drains open connections.
async fn serve(config: &tutoria_types::config::AppConfig, quiet: bool) -> anyhow::Result<()> {
    let state = AppState::init(config).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    if !quiet {
        println!(
            "  {} Tutoria API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }
    tracing::info!(%addr, "Server started");

    let shutdown = state.shutdown.clone();
    let db_pool = state.db_pool.clone();
    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, cancelling in-flight generations");
            shutdown.cancel();
        })
        .await?;

    db_pool.close().await;

    if !quiet {
        println!("\n  Server stopped.");
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
