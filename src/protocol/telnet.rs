// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telnet-style TCP protocol implementation.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};

use crate::error::ProtocolError;
use crate::protocol::iac::IacDecoder;
use crate::protocol::{CR, CommandResponse, Protocol, decode_response, encode_frame};

// ============================================================================
// TelnetConfig - Endpoint configuration
// ============================================================================

/// Configuration for a telnet endpoint.
///
/// Each command opens its own connection, so this only describes where
/// to connect and how long to wait.
///
/// # Examples
///
/// ```
/// use telnet_switch::protocol::TelnetConfig;
/// use std::time::Duration;
///
/// // Simple configuration (port 23)
/// let config = TelnetConfig::new("192.168.1.40");
///
/// // With all options
/// let config = TelnetConfig::new("192.168.1.40")
///     .with_port(2323)
///     .with_connect_timeout(Duration::from_secs(2))
///     .with_read_timeout(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelnetConfig {
    host: String,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TelnetConfig {
    /// Default telnet port.
    pub const DEFAULT_PORT: u16 = 23;
    /// Default bound on establishing the TCP connection.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default window for reading the response line.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(200);

    /// Creates a new configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the remote device
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the response read window.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Creates a `TelnetClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the port is zero.
    pub fn into_client(self) -> Result<TelnetClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(ProtocolError::InvalidAddress(format!(
                "{}: port must be non-zero",
                self.host
            )));
        }

        Ok(TelnetClient { config: self })
    }
}

// ============================================================================
// TelnetClient
// ============================================================================

/// One-shot TCP client for line-oriented devices.
///
/// # Examples
///
/// ```no_run
/// use telnet_switch::protocol::{Protocol, TelnetConfig};
///
/// # async fn example() -> Result<(), telnet_switch::ProtocolError> {
/// let client = TelnetConfig::new("192.168.1.40").into_client()?;
/// let response = client.send_raw("STATUS?").await?;
/// println!("device says {}", response.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TelnetClient {
    config: TelnetConfig,
}

impl TelnetClient {
    /// Returns the endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &TelnetConfig {
        &self.config
    }

    async fn connect(&self) -> Result<TcpStream, ProtocolError> {
        let addr = (self.config.host.as_str(), self.config.port);

        match time::timeout(self.config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(stream) => Ok(stream?),
            Err(_) => Err(ProtocolError::ConnectTimeout(self.config.connect_timeout)),
        }
    }

    /// Reads data bytes until `\r` or the read deadline.
    ///
    /// The returned bytes exclude the terminator and anything after it.
    /// Option refusals are written back under the same deadline.
    async fn read_line<S>(&self, stream: &mut S) -> Result<Vec<u8>, ProtocolError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let deadline = Instant::now() + self.config.read_timeout;
        let mut decoder = IacDecoder::new();
        let mut data = Vec::new();
        let mut replies = Vec::new();
        let mut buf = [0u8; 256];

        loop {
            let Ok(read) = time::timeout_at(deadline, stream.read(&mut buf)).await else {
                tracing::trace!(received = data.len(), "Read window elapsed");
                break;
            };

            let n = read?;
            if n == 0 {
                if data.is_empty() {
                    return Err(ProtocolError::ConnectionClosed);
                }
                break;
            }

            decoder.feed(&buf[..n], &mut data, &mut replies);

            if !replies.is_empty() {
                let Ok(written) = time::timeout_at(deadline, stream.write_all(&replies)).await
                else {
                    tracing::trace!(
                        received = data.len(),
                        "Read window elapsed while refusing options"
                    );
                    break;
                };
                written?;
                replies.clear();
            }

            if data.contains(&CR) {
                break;
            }
        }

        if let Some(pos) = data.iter().position(|&b| b == CR) {
            data.truncate(pos);
        }

        Ok(data)
    }
}

impl Protocol for TelnetClient {
    async fn send_raw(&self, command: &str) -> Result<CommandResponse, ProtocolError> {
        let frame = encode_frame(command)?;

        tracing::debug!(address = %self.config.address(), command, "Sending telnet command");

        // The stream lives in this scope only; every return path closes it.
        let mut stream = self.connect().await?;
        stream.write_all(&frame).await?;
        stream.flush().await?;

        let raw = self.read_line(&mut stream).await?;
        let response = decode_response(&raw)?;

        tracing::debug!(body = %response.body(), "Received telnet response");

        Ok(response)
    }
}
