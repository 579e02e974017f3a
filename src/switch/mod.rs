// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch state machine.
//!
//! A [`TelnetSwitch`] holds a single on/off value and runs in one of two
//! modes, fixed at construction:
//!
//! ## Assumed state
//!
//! No state query is configured. The stored value follows the last
//! command issued, whether or not the device acknowledged it, and
//! [`assumed_state`](TelnetSwitch::assumed_state) is `true`. The switch is
//! never polled.
//!
//! ## Polled state
//!
//! A state query and a [`ResponseInterpreter`] are configured. Commands do
//! not touch the stored value; only [`update`](TelnetSwitch::update) does,
//! by rendering the query response and comparing it with `"True"`.
//!
//! ```no_run
//! use telnet_switch::interpreter::Identity;
//! use telnet_switch::protocol::TelnetConfig;
//! use telnet_switch::event::SwitchId;
//! use telnet_switch::switch::{StatePolling, TelnetSwitch};
//!
//! # async fn example() -> telnet_switch::Result<()> {
//! let client = TelnetConfig::new("10.0.0.5").into_client()?;
//! let switch = TelnetSwitch::builder(SwitchId::new("projector")?, client)
//!     .with_commands("POWER ON", "POWER OFF")
//!     .with_state_polling(StatePolling::new("STATUS?", Identity))
//!     .build()?;
//!
//! switch.turn_on().await;
//! switch.update().await;
//! println!("{} is on: {}", switch.name(), switch.is_on());
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::SwitchBuilder;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::event::{EventBus, SwitchEvent, SwitchId};
use crate::interpreter::{Identity, ResponseInterpreter};
use crate::protocol::{CommandResponse, Protocol, TelnetClient};

/// The rendered text that means "on". Compared exactly, case-sensitive.
pub const ON_TEXT: &str = "True";

/// Host-facing surface of a switch.
///
/// The poll scheduler drives switches through this trait only.
pub trait Switch: Send + Sync {
    /// Returns the display name.
    fn name(&self) -> &str;

    /// Returns the stored state.
    fn is_on(&self) -> bool;

    /// Returns true if the switch should be polled.
    fn should_poll(&self) -> bool;

    /// Returns true if the state is optimistic rather than read back.
    fn assumed_state(&self) -> bool;

    /// Polls the device and reconciles the stored state.
    fn update(&self) -> impl Future<Output = ()> + Send;

    /// Sends the on command.
    fn turn_on(&self) -> impl Future<Output = ()> + Send;

    /// Sends the off command.
    fn turn_off(&self) -> impl Future<Output = ()> + Send;
}

/// State query command paired with the interpreter for its response.
#[derive(Clone)]
pub struct StatePolling {
    command: String,
    interpreter: Arc<dyn ResponseInterpreter>,
}

impl StatePolling {
    /// Creates a polling setup from a query command and an interpreter.
    #[must_use]
    pub fn new(command: impl Into<String>, interpreter: impl ResponseInterpreter + 'static) -> Self {
        Self {
            command: command.into(),
            interpreter: Arc::new(interpreter),
        }
    }

    /// Creates a polling setup whose response is used as-is.
    #[must_use]
    pub fn with_identity(command: impl Into<String>) -> Self {
        Self::new(command, Identity)
    }

    /// Returns the state query command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Renders a response and decides whether it means "on".
    #[must_use]
    pub fn interpret(&self, raw: &str) -> bool {
        self.interpreter.evaluate(raw) == ON_TEXT
    }
}

impl fmt::Debug for StatePolling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePolling")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// A switch controlled by one-line commands over a telnet-style connection.
///
/// All network operations on one switch are serialized: a poll and a
/// command issued from different tasks never overlap on the wire. Reading
/// the state with [`is_on`](Self::is_on) never waits for the network.
pub struct TelnetSwitch<P: Protocol = TelnetClient> {
    id: SwitchId,
    name: String,
    protocol: P,
    command_on: String,
    command_off: String,
    polling: Option<StatePolling>,
    state: RwLock<bool>,
    exchange: Mutex<()>,
    events: EventBus,
}

impl<P: Protocol> TelnetSwitch<P> {
    /// Starts building a switch that talks through `protocol`.
    #[must_use]
    pub fn builder(id: SwitchId, protocol: P) -> SwitchBuilder<P> {
        SwitchBuilder::new(id, protocol)
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn id(&self) -> &SwitchId {
        &self.id
    }

    /// Returns the entity id, `switch.<object_id>`.
    #[must_use]
    pub fn entity_id(&self) -> String {
        self.id.entity_id()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stored state.
    #[must_use]
    pub fn is_on(&self) -> bool {
        *self.state.read()
    }

    /// Returns true iff a state query is configured.
    #[must_use]
    pub fn should_poll(&self) -> bool {
        self.polling.is_some()
    }

    /// Returns true iff no state query is configured.
    #[must_use]
    pub fn assumed_state(&self) -> bool {
        self.polling.is_none()
    }

    /// Returns the state query command, if any.
    #[must_use]
    pub fn state_command(&self) -> Option<&str> {
        self.polling.as_ref().map(StatePolling::command)
    }

    /// Returns the on command.
    #[must_use]
    pub fn command_on(&self) -> &str {
        &self.command_on
    }

    /// Returns the off command.
    #[must_use]
    pub fn command_off(&self) -> &str {
        &self.command_off
    }

    /// Returns the underlying protocol client.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Returns the bus this switch publishes on.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Sends the on command.
    ///
    /// In assumed-state mode the stored state becomes on even if the
    /// command failed.
    pub async fn turn_on(&self) {
        self.switch_to(true).await;
    }

    /// Sends the off command.
    ///
    /// In assumed-state mode the stored state becomes off even if the
    /// command failed.
    pub async fn turn_off(&self) {
        self.switch_to(false).await;
    }

    /// Polls the device with the state query.
    ///
    /// The state becomes on if the rendered response is exactly `"True"`
    /// and off for any other rendering. If nothing usable comes back the
    /// previous state is kept and an [`SwitchEvent::EmptyResponse`] is
    /// published. Without a state query this does nothing.
    pub async fn update(&self) {
        let Some(polling) = &self.polling else {
            tracing::debug!(switch_id = %self.id, "No state command, skipping update");
            return;
        };

        let _exchange = self.exchange.lock().await;

        match self.telnet_command(polling.command()).await {
            Some(response) if !response.is_empty() => {
                self.store(polling.interpret(response.body()));
            }
            _ => {
                tracing::warn!(
                    switch_id = %self.id,
                    command = polling.command(),
                    "Empty response for command"
                );
                self.events
                    .publish(SwitchEvent::empty_response(self.id.clone(), polling.command()));
            }
        }
    }

    async fn switch_to(&self, on: bool) {
        let command = if on {
            &self.command_on
        } else {
            &self.command_off
        };

        let _exchange = self.exchange.lock().await;
        // The payload of a command is never used.
        let _ = self.telnet_command(command).await;

        if self.assumed_state() {
            self.store(on);
        }
    }

    /// Sends one command, turning any transport failure into `None`.
    async fn telnet_command(&self, command: &str) -> Option<CommandResponse> {
        match self.protocol.send_raw(command).await {
            Ok(response) => Some(response),
            Err(error) => {
                tracing::error!(
                    switch_id = %self.id,
                    command,
                    error = %error,
                    "Command failed"
                );
                self.events.publish(SwitchEvent::command_failed(
                    self.id.clone(),
                    command,
                    error.to_string(),
                ));
                None
            }
        }
    }

    fn store(&self, is_on: bool) {
        let previous = std::mem::replace(&mut *self.state.write(), is_on);

        if previous != is_on {
            tracing::debug!(switch_id = %self.id, is_on, "State changed");
            self.events.publish(SwitchEvent::state_changed(
                self.id.clone(),
                is_on,
                self.assumed_state(),
            ));
        }
    }
}

impl<P: Protocol> Switch for TelnetSwitch<P> {
    fn name(&self) -> &str {
        TelnetSwitch::name(self)
    }

    fn is_on(&self) -> bool {
        TelnetSwitch::is_on(self)
    }

    fn should_poll(&self) -> bool {
        TelnetSwitch::should_poll(self)
    }

    fn assumed_state(&self) -> bool {
        TelnetSwitch::assumed_state(self)
    }

    fn update(&self) -> impl Future<Output = ()> + Send {
        TelnetSwitch::update(self)
    }

    fn turn_on(&self) -> impl Future<Output = ()> + Send {
        TelnetSwitch::turn_on(self)
    }

    fn turn_off(&self) -> impl Future<Output = ()> + Send {
        TelnetSwitch::turn_off(self)
    }
}

impl<P: Protocol> fmt::Debug for TelnetSwitch<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelnetSwitch")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("is_on", &self.is_on())
            .field("polling", &self.polling)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted protocol for exercising the state machine without a network.

    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use crate::error::ProtocolError;
    use crate::protocol::{CommandResponse, Protocol};

    /// Replays queued results in order; an exhausted script answers with
    /// `ConnectionClosed`.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedProtocol {
        script: Mutex<VecDeque<Result<String, ()>>>,
        sent: Mutex<Vec<String>>,
    }

    impl ScriptedProtocol {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(self, body: &str) -> Self {
            self.script.lock().push_back(Ok(body.to_string()));
            self
        }

        pub(crate) fn fail(self) -> Self {
            self.script.lock().push_back(Err(()));
            self
        }

        pub(crate) fn sent(&self) -> Vec<String> {
            self.sent.lock().clone()
        }
    }

    impl Protocol for ScriptedProtocol {
        async fn send_raw(&self, command: &str) -> Result<CommandResponse, ProtocolError> {
            self.sent.lock().push(command.to_string());
            match self.script.lock().pop_front() {
                Some(Ok(body)) => Ok(CommandResponse::new(body)),
                Some(Err(())) | None => Err(ProtocolError::ConnectionClosed),
            }
        }
    }
}
