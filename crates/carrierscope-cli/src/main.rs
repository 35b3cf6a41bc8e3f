//! CarrierScope CLI
//!
//! Runs carrier and SIM posture detection against a captured device snapshot
//! and prints the result as JSON.
//!
//! The snapshot stands in for the live telephony, reachability and interface
//! collaborators. Logs go to stderr so stdout stays machine-readable.

use anyhow::Result;
use carrierscope_detect::{CarrierDetector, QueryStrategy};
use clap::{Parser, ValueEnum};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod config;
mod report;

/// Configuration file consulted when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "carrierscope.yaml";

#[derive(Parser, Debug)]
#[command(name = "carrierscope")]
#[command(about = "Detect the mobile carrier and SIM posture of a device snapshot", long_about = None)]
pub struct Cli {
    /// Device snapshot (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Detector configuration file
    #[arg(short, long, env = "CARRIERSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the snapshot's Wi-Fi connectivity flag
    #[arg(short, long)]
    wifi: Option<bool>,

    /// Disable the registry lookup fallback
    #[arg(long)]
    no_whois: bool,

    /// Registry query strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Per-endpoint registry timeout in milliseconds
    #[arg(long)]
    endpoint_timeout_ms: Option<u64>,

    /// Overall deadline for the registry fallback in milliseconds
    #[arg(short, long)]
    deadline_ms: Option<u64>,

    /// Print collected metrics to stderr after detection
    #[arg(long)]
    metrics: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum StrategyArg {
    Sequential,
    Race,
}

impl From<StrategyArg> for QueryStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Sequential => QueryStrategy::Sequential,
            StrategyArg::Race => QueryStrategy::Race,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    let metrics_handle = if cli.metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    // Load configuration
    let config = cli.load_config()?;
    info!(
        whois = config.whois.enabled,
        strategy = ?config.whois.strategy,
        endpoints = config.whois.endpoints.len(),
        "Configuration loaded"
    );

    let detector = CarrierDetector::from_config(&config)?;

    let mut snapshot = report::load_snapshot(&cli.snapshot)?;
    if let Some(wifi) = cli.wifi {
        snapshot.on_wifi = wifi;
    }
    info!(
        slots = snapshot.providers.len(),
        interfaces = snapshot.interfaces.len(),
        on_wifi = snapshot.on_wifi,
        "Snapshot loaded"
    );

    let deadline = cli
        .deadline_ms
        .map(|ms| tokio::time::Instant::now() + Duration::from_millis(ms));

    let report = report::build_report(&detector, &snapshot, deadline).await;
    info!(
        carrier = %report.detection.carrier,
        confidence = %report.detection.confidence,
        method = %report.detection.method,
        "Detection complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("carrierscope=debug,carrierscope_detect=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("carrierscope=info,carrierscope_detect=warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Install the metrics recorder and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "carrierscope_detections_total",
        "Total number of detections by resolving method"
    );
    metrics::describe_counter!(
        "carrierscope_whois_queries_total",
        "Registry endpoint queries by endpoint and outcome"
    );
    metrics::describe_histogram!(
        "carrierscope_whois_latency_us",
        metrics::Unit::Microseconds,
        "Registry endpoint query latency in microseconds"
    );

    Ok(handle)
}
