//! bedchat entry point.
//!
//! Binary name: `bedchat`
//!
//! Parses CLI arguments, loads configuration, builds the shared application
//! state, then starts the web server or runs a terminal command.

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use bedchat_core::chat::format::GenericErrorFormatter;
use bedchat_infra::config::{apply_env_overrides, default_config_path, load_config};
use bedchat_observe::tracing_setup::{init_tracing, shutdown_tracing};
use bedchat_types::config::AppConfig;
use bedchat_web::http;
use bedchat_web::state::AppState;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,bedchat=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => load_config(&path).await,
        None => {
            let mut config = AppConfig::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            config
        }
    };

    let mut state = AppState::init(&config)?;
    if cli.hide_errors {
        state = state.with_formatter(Arc::new(GenericErrorFormatter));
    }

    let result = match cli.command.unwrap_or(Commands::Serve {
        port: None,
        host: None,
    }) {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let idle_timeout = Duration::from_secs(config.server.session_idle_timeout_secs);
            serve(state, &host, port, idle_timeout).await
        }
        Commands::Chat => cli::chat::run_chat_loop(&state).await,
        Commands::Check => cli::check::check(&state).await,
    };

    shutdown_tracing();
    result
}

async fn serve(state: AppState, host: &str, port: u16, idle_timeout: Duration) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Zero disables expiry
    if !idle_timeout.is_zero() {
        tokio::spawn(state.clone().run_session_sweeper(idle_timeout));
    }

    println!(
        "  {} bedchat listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
