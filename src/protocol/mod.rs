// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementation for talking to line-oriented remote devices.
//!
//! Every exchange is one-shot: open a TCP connection, write one
//! carriage-return terminated command, read at most one response line,
//! release the connection. There is no connection reuse between calls.
//!
//! # Protocols
//!
//! - [`TelnetClient`]: the TCP implementation used by configured switches
//!
//! Anything implementing [`Protocol`] can stand in for the client, which
//! is how the switch state machine is tested without a network.

mod iac;
mod telnet;

pub use telnet::{TelnetClient, TelnetConfig};

use std::future::Future;

use crate::error::ProtocolError;

/// Carriage return, the only line terminator on the wire.
pub const CR: u8 = b'\r';

/// Response line read back from the remote device.
///
/// The text is already decoded and trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    body: String,
}

impl CommandResponse {
    /// Creates a new command response with the given body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Returns the response text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns true if the device answered with nothing (or only whitespace).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Trait for transports that can deliver a raw command to a remote device.
pub trait Protocol: Send + Sync {
    /// Sends a raw command string and returns the response line.
    ///
    /// A read timeout is not an error: whatever was received before the
    /// deadline is returned, possibly empty.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the connection, the write, the read, or
    /// the ASCII encoding/decoding fails.
    fn send_raw(
        &self,
        command: &str,
    ) -> impl Future<Output = Result<CommandResponse, ProtocolError>> + Send;
}

/// Encodes a command into its wire frame: ASCII bytes plus one `\r`.
///
/// # Errors
///
/// Returns `ProtocolError::Encoding` on the first non-ASCII byte.
pub fn encode_frame(command: &str) -> Result<Vec<u8>, ProtocolError> {
    if let Some((offset, &byte)) = command.as_bytes().iter().enumerate().find(|(_, b)| !b.is_ascii())
    {
        return Err(ProtocolError::Encoding { byte, offset });
    }

    let mut frame = Vec::with_capacity(command.len() + 1);
    frame.extend_from_slice(command.as_bytes());
    frame.push(CR);
    Ok(frame)
}

/// Decodes response bytes as strict ASCII and trims surrounding whitespace.
///
/// # Errors
///
/// Returns `ProtocolError::Decoding` on the first non-ASCII byte.
pub fn decode_response(bytes: &[u8]) -> Result<CommandResponse, ProtocolError> {
    if let Some((offset, &byte)) = bytes.iter().enumerate().find(|(_, b)| !b.is_ascii()) {
        return Err(ProtocolError::Decoding { byte, offset });
    }

    // All bytes are ASCII, so this cannot fail.
    let text = String::from_utf8_lossy(bytes);
    Ok(CommandResponse::new(text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_ends_with_single_carriage_return() {
        let frame = encode_frame("POWER ON").unwrap();
        assert_eq!(frame, b"POWER ON\r");
    }

    #[test]
    fn frame_rejects_non_ascii() {
        let err = encode_frame("LICHT AN ä").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Encoding {
                byte: 0xC3,
                offset: 9
            }
        ));
    }

    #[test]
    fn decode_trims_whitespace() {
        let response = decode_response(b"  True \n").unwrap();
        assert_eq!(response.body(), "True");
    }

    #[test]
    fn decode_rejects_high_bytes() {
        let err = decode_response(b"ok\xff").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decoding {
                byte: 0xFF,
                offset: 2
            }
        ));
    }

    #[test]
    fn whitespace_only_response_is_empty() {
        assert!(decode_response(b" \t ").unwrap().is_empty());
        assert!(!CommandResponse::new("0").is_empty());
    }
}
