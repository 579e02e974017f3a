// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `telnet_switch` library.
//!
//! Only configuration and setup surface errors to callers. Transport
//! failures are recovered inside the switch command path and reported as
//! events, so [`ProtocolError`] is mostly seen by [`Protocol`] implementors.
//!
//! [`Protocol`]: crate::protocol::Protocol

use std::time::Duration;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to the remote device.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The switch or platform configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by a single command exchange.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Socket level failure (refused connection, reset, write error).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection could not be established in time.
    #[error("connect timed out after {} ms", .0.as_millis())]
    ConnectTimeout(Duration),

    /// The peer closed the connection before sending any data.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The command contains a byte outside the ASCII range.
    #[error("command is not ASCII: byte {byte:#04x} at offset {offset}")]
    Encoding {
        /// The offending byte.
        byte: u8,
        /// Its position in the command.
        offset: usize,
    },

    /// The response contains a byte outside the ASCII range.
    #[error("response is not ASCII: byte {byte:#04x} at offset {offset}")]
    Decoding {
        /// The offending byte.
        byte: u8,
        /// Its position in the response.
        offset: usize,
    },

    /// Invalid host or port.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to switch and platform configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration does not define any switch.
    #[error("no switches configured")]
    NoSwitches,

    /// The object id is not a lowercase slug.
    #[error("invalid object id {0:?}: expected [a-z0-9_]+")]
    InvalidObjectId(String),

    /// A required field is missing or empty.
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),

    /// A command string contains non-ASCII characters.
    #[error("{field} is not ASCII: {value:?}")]
    NonAsciiCommand {
        /// The configuration key.
        field: &'static str,
        /// The rejected command text.
        value: String,
    },

    /// The value template could not be parsed.
    #[error("invalid value template: {0}")]
    InvalidTemplate(String),

    /// The configuration document is not valid JSON for the schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
