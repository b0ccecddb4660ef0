//! Moderation Server
//!
//! Serves the trained moderation classifier over HTTP. The trained artifacts
//! are loaded before the listener binds; a missing model aborts startup.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

use moderation_server::{create_router, AppState, ConfigOverrides, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "moderation-server")]
#[command(about = "Multilingual text moderation service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "moderation.yaml")]
    config: String,

    /// Directory holding the trained artifacts
    #[arg(short, long)]
    model_dir: Option<String>,

    /// Lemmatizer model path
    #[arg(long)]
    lemmatizer: Option<String>,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "MODERATION_PORT")]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen: self.listen.clone(),
            port: self.port,
            model_dir: self.model_dir.clone(),
            lemmatizer: self.lemmatizer.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting moderation server");

    // Load configuration
    let config = ServiceConfig::load(&cli.config, &cli.overrides())?;
    info!("Configuration loaded successfully");
    info!("Model directory: {}", config.model_dir);
    info!("Lemmatizer: {}", config.lemmatizer);

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Load the model before accepting any connection
    let addr: SocketAddr = config.bind_address().parse()?;
    let state = AppState::load(config, metrics_handle)?;
    info!("Application state initialized successfully");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Moderation service listening on http://{}", addr);

    // Graceful shutdown handler
    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new(default_directives("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives("info")))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Log directives for the workspace crates at `level`
fn default_directives(level: &str) -> String {
    ["moderation_server", "moderation_classifiers"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "moderation_requests_total",
        "Total number of check requests received"
    );
    metrics::describe_counter!(
        "moderation_flagged_total",
        "Total number of texts flagged for review"
    );
    metrics::describe_counter!(
        "moderation_fast_path_total",
        "Total number of checks answered without classification"
    );
    metrics::describe_histogram!(
        "moderation_inference_latency_us",
        metrics::Unit::Microseconds,
        "Classification latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_name_crate_targets() {
        assert_eq!(
            default_directives("info"),
            "moderation_server=info,moderation_classifiers=info"
        );
        assert!(tracing_subscriber::EnvFilter::try_new(default_directives("debug")).is_ok());
    }

    #[test]
    fn test_port_from_flag() {
        let cli = Cli::parse_from(["moderation-server", "--port", "6001", "-m", "/srv/models"]);
        let overrides = cli.overrides();

        assert_eq!(overrides.port, Some(6001));
        assert_eq!(overrides.model_dir.as_deref(), Some("/srv/models"));
        assert_eq!(overrides.listen, None);
    }
}
