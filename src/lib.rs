// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `telnet_switch` - control on/off devices over a telnet-style line protocol.
//!
//! Many AV receivers, projectors, serial-over-IP bridges and relay boards
//! accept plain text commands on a TCP port. This library models such a
//! device as a switch: one command turns it on, one turns it off, and an
//! optional query reads its state back.
//!
//! # Features
//!
//! - **One-shot transport**: connect, send one `\r`-terminated ASCII
//!   command, read one response line within 200 ms, disconnect
//! - **Two state modes**: assumed state (follows the last command) or
//!   polled state (read back with a query and a value template)
//! - **Silent failures, visible events**: operations never return errors;
//!   failures are logged and published on an [`EventBus`]
//! - **Polling**: a tokio-based scheduler polls switches every 10 seconds
//!
//! # Quick Start
//!
//! ## Assumed-State Switch
//!
//! ```no_run
//! use telnet_switch::{SwitchConfig, TelnetSwitch};
//! use telnet_switch::event::EventBus;
//!
//! #[tokio::main]
//! async fn main() -> telnet_switch::Result<()> {
//!     let config = SwitchConfig::new("10.0.0.5", "POWER ON", "POWER OFF");
//!     let switch = TelnetSwitch::from_config("projector", &config, EventBus::new())?;
//!
//!     switch.turn_on().await;
//!     assert!(switch.is_on());
//!     assert!(switch.assumed_state());
//!     Ok(())
//! }
//! ```
//!
//! ## Polled Switch
//!
//! ```no_run
//! use std::sync::Arc;
//! use telnet_switch::{PollScheduler, SwitchConfig, TelnetSwitch};
//! use telnet_switch::event::EventBus;
//!
//! #[tokio::main]
//! async fn main() -> telnet_switch::Result<()> {
//!     let config = SwitchConfig::new("10.0.0.6", "PWON", "PWSTANDBY")
//!         .with_state_command("PW?")
//!         .with_value_template("{{ value_json.on }}");
//!
//!     let events = EventBus::new();
//!     let mut rx = events.subscribe();
//!     let switch = Arc::new(TelnetSwitch::from_config("receiver", &config, events)?);
//!
//!     let _polling = PollScheduler::new().schedule(switch);
//!
//!     while let Ok(event) = rx.recv().await {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod event;
pub mod interpreter;
pub mod platform;
pub mod protocol;
pub mod scheduler;
pub mod switch;

pub use error::{ConfigError, Error, ProtocolError, Result};
pub use event::{EventBus, SwitchEvent, SwitchId};
pub use interpreter::{Identity, ResponseInterpreter, ValueTemplate};
pub use platform::{PlatformConfig, SwitchConfig, TelnetPlatform};
pub use protocol::{CommandResponse, Protocol, TelnetClient, TelnetConfig};
pub use scheduler::{PollHandle, PollScheduler, SCAN_INTERVAL};
pub use switch::{StatePolling, Switch, SwitchBuilder, TelnetSwitch};
