//! Transport layer for the explanation service.
//!
//! Newline-delimited JSON over any async reader/writer pair; the binary
//! wires it to stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::requests::Response;
use super::service::ExplainService;
use crate::error::ServerError;
use crate::traits::TimeProvider;

/// Configuration for transport options.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum request line size in bytes.
    pub max_message_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_message_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Line-oriented transport handler.
#[derive(Debug, Default)]
pub struct StdioTransport {
    config: TransportConfig,
}

impl StdioTransport {
    /// Creates a new transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new transport with custom configuration.
    #[must_use]
    pub const fn with_config(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Serve requests until the reader reaches end of input.
    ///
    /// Blank lines are skipped. Every other line gets exactly one response
    /// line. Returns the number of responses written.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] if reading or writing fails.
    pub async fn serve<R, W, T>(
        &self,
        service: &mut ExplainService<T>,
        reader: R,
        mut writer: W,
    ) -> Result<usize, ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        T: TimeProvider + Clone,
    {
        let mut lines = reader.lines();
        let mut handled = 0;

        while let Some(line) = lines.next_line().await.map_err(transport_error)? {
            if line.trim().is_empty() {
                continue;
            }

            let response = if line.len() > self.config.max_message_size {
                warn!(bytes = line.len(), "Request exceeds maximum message size");
                Response::from(ServerError::InvalidRequest {
                    message: format!(
                        "request of {} bytes exceeds the {} byte limit",
                        line.len(),
                        self.config.max_message_size
                    ),
                })
            } else {
                service.handle_line(&line)
            };

            let mut encoded = serde_json::to_vec(&response).map_err(|e| ServerError::Transport {
                message: e.to_string(),
            })?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await.map_err(transport_error)?;
            writer.flush().await.map_err(transport_error)?;

            handled += 1;
            debug!(handled, ok = response.is_ok(), "Response written");
        }

        Ok(handled)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn transport_error(err: std::io::Error) -> ServerError {
    ServerError::Transport {
        message: err.to_string(),
    }
}
