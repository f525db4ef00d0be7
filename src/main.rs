//! Explanation service binary entry point.
//!
//! Serves newline-delimited JSON requests on stdin. All logs go to stderr;
//! stdout is reserved for responses.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use neuroscan_explain::config::Config;
use neuroscan_explain::server::ExplainServer;

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging to stderr only (stdout is for responses)
    tracing_subscriber::fmt()
        .with_env_filter(
            config
                .log_level
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(
        labels = config.class_labels.len(),
        saliency = config.saliency_enabled,
        export = config.export_directory.as_deref().unwrap_or("disabled"),
        "neuroscan-explain starting"
    );

    let server = ExplainServer::new(config);
    if let Err(e) = server.run_stdio().await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    tracing::info!("neuroscan-explain shutdown complete");
}
