//! Stdio service.
//!
//! This module provides:
//! - The JSON-lines request/response protocol ([`Request`], [`Response`])
//! - Dispatch over one conversation session ([`ExplainService`])
//! - The line transport ([`StdioTransport`])
//!
//! # Example
//!
//! ```
//! use neuroscan_explain::config::Config;
//! use neuroscan_explain::server::ExplainService;
//!
//! let mut service = ExplainService::from_config(&Config::default()).unwrap();
//! let response = service.handle_line(
//!     r#"{"method":"explain","params":{"probabilities":[0.041,0.85,0.022,0.082],"pixels":[0.2,0.5,0.8]}}"#,
//! );
//! assert!(response.is_ok());
//!
//! let response = service.handle_line(r#"{"method":"ask","params":{"question":"What is the diagnosis?"}}"#);
//! assert!(response.is_ok());
//! ```

mod requests;
mod service;
mod transport;

pub use requests::{AskParams, ErrorKind, ExplainParams, Request, Response};
pub use service::{ExplainResult, ExplainService, NO_HEATMAP};
pub use transport::{StdioTransport, TransportConfig};

use tokio::io::BufReader;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;

/// Binary entry point: one session served over stdin/stdout.
#[derive(Debug)]
pub struct ExplainServer {
    /// Server configuration.
    config: Config,
}

impl ExplainServer {
    /// Creates a new server with the given configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Serve stdin/stdout until end of input or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configured labels are invalid
    /// - Reading stdin or writing stdout fails
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run_stdio(&self) -> Result<(), AppError> {
        let mut service = ExplainService::from_config(&self.config)?;
        let transport = StdioTransport::new();

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        tokio::select! {
            served = transport.serve(&mut service, stdin, stdout) => {
                let handled = served?;
                info!(handled, "Input closed, shutting down");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
            }
        }

        Ok(())
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
