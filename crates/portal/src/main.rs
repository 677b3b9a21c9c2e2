//! Gridview
//!
//! Web front end for browsing a data grid namespace.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portal::config::Config;
use portal::server::PortalServer;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Gridview - web front end for browsing a data grid namespace.
#[derive(Parser, Debug)]
#[command(name = "gridview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the collection browser until interrupted
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,

    /// Print the effective configuration as TOML
    PrintConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(config_path) => Config::load(config_path)?,
        None => Config::load_default()?,
    };
    config.apply_env_overrides();

    if let Commands::Serve { bind: Some(bind) } = &cli.command {
        config.server.bind = bind.clone();
    }

    let _guard = init_tracing(&config, cli.verbose);
    tracing::debug!("Using config file: {:?}", cli.config);

    match cli.command {
        Commands::Serve { .. } => {
            config.validate()?;
            let server = PortalServer::new(config)?;
            tracing::info!("Gridview starting...");
            server.run(wait_for_shutdown_signal()).await?;
        }
        Commands::CheckConfig => {
            config.validate()?;
            println!("Configuration OK");
        }
        Commands::PrintConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Effective log level: `-v` wins over the configuration.
fn log_level(config: &Config, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config.server.log_level.to_lowercase()
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the computed level. When `log_dir` is
/// configured, output is also written to a daily rolling file; the returned
/// guard must be kept alive to flush it.
fn init_tracing(config: &Config, verbose: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(config, verbose)));

    let (file_layer, guard) = match &config.server.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "gridview.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    guard
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!("Failed to register SIGTERM handler: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for SIGINT: {}", e);
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT");
        }
    }
}
