// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch builder.

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::{ConfigError, Error};
use crate::event::{EventBus, SwitchId};
use crate::protocol::Protocol;

use super::{StatePolling, TelnetSwitch};

/// Builder for [`TelnetSwitch`].
///
/// The on and off commands are required. Adding a [`StatePolling`] turns
/// the switch into a polled switch; leaving it out gives an assumed-state
/// switch.
///
/// # Examples
///
/// ```
/// use telnet_switch::event::SwitchId;
/// use telnet_switch::protocol::TelnetConfig;
/// use telnet_switch::switch::TelnetSwitch;
///
/// # fn example() -> telnet_switch::Result<()> {
/// let client = TelnetConfig::new("10.0.0.5").into_client()?;
/// let switch = TelnetSwitch::builder(SwitchId::new("amp")?, client)
///     .with_name("Amplifier")
///     .with_commands("POWER ON", "POWER OFF")
///     .build()?;
///
/// assert!(switch.assumed_state());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SwitchBuilder<P: Protocol> {
    id: SwitchId,
    protocol: P,
    name: Option<String>,
    command_on: Option<String>,
    command_off: Option<String>,
    polling: Option<StatePolling>,
    events: Option<EventBus>,
}

impl<P: Protocol> SwitchBuilder<P> {
    pub(crate) fn new(id: SwitchId, protocol: P) -> Self {
        Self {
            id,
            protocol,
            name: None,
            command_on: None,
            command_off: None,
            polling: None,
            events: None,
        }
    }

    /// Sets the display name. Defaults to the object id.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the on and off commands.
    #[must_use]
    pub fn with_commands(mut self, on: impl Into<String>, off: impl Into<String>) -> Self {
        self.command_on = Some(on.into());
        self.command_off = Some(off.into());
        self
    }

    /// Enables polling with the given state query.
    #[must_use]
    pub fn with_state_polling(mut self, polling: StatePolling) -> Self {
        self.polling = Some(polling);
        self
    }

    /// Publishes events on a shared bus instead of a private one.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Builds the switch. The initial state is off.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a command is missing, empty or not ASCII.
    pub fn build(self) -> Result<TelnetSwitch<P>, Error> {
        let command_on = validate_command("command_on", self.command_on)?;
        let command_off = validate_command("command_off", self.command_off)?;
        if let Some(polling) = &self.polling {
            validate_command("command_state", Some(polling.command().to_string()))?;
        }

        let name = self
            .name
            .unwrap_or_else(|| self.id.object_id().to_string());

        Ok(TelnetSwitch {
            id: self.id,
            name,
            protocol: self.protocol,
            command_on,
            command_off,
            polling: self.polling,
            state: RwLock::new(false),
            exchange: Mutex::new(()),
            events: self.events.unwrap_or_default(),
        })
    }
}

pub(crate) fn validate_command(
    field: &'static str,
    value: Option<String>,
) -> Result<String, ConfigError> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingField(field))?;

    if !value.is_ascii() {
        return Err(ConfigError::NonAsciiCommand { field, value });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::switch::testing::ScriptedProtocol;

    fn builder() -> SwitchBuilder<ScriptedProtocol> {
        SwitchBuilder::new(SwitchId::new("tv").unwrap(), ScriptedProtocol::new())
    }

    #[test]
    fn name_defaults_to_object_id() {
        let switch = builder().with_commands("ON", "OFF").build().unwrap();
        assert_eq!(switch.name(), "tv");
        assert_eq!(switch.entity_id(), "switch.tv");
    }

    #[test]
    fn explicit_name() {
        let switch = builder()
            .with_name("Living Room TV")
            .with_commands("ON", "OFF")
            .build()
            .unwrap();
        assert_eq!(switch.name(), "Living Room TV");
    }

    #[test]
    fn commands_are_required() {
        let result = builder().build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField("command_on")))
        ));

        let result = builder().with_commands("ON", "").build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField("command_off")))
        ));
    }

    #[test]
    fn state_command_must_not_be_empty() {
        let result = builder()
            .with_commands("ON", "OFF")
            .with_state_polling(StatePolling::with_identity(""))
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField("command_state")))
        ));
    }

    #[test]
    fn rejects_non_ascii_commands() {
        let result = builder().with_commands("EIN", "AUS ö").build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::NonAsciiCommand {
                field: "command_off",
                ..
            }))
        ));
    }

    #[test]
    fn shared_event_bus() {
        let bus = EventBus::new();
        let _rx = bus.subscribe();

        let switch = builder()
            .with_commands("ON", "OFF")
            .with_event_bus(bus.clone())
            .build()
            .unwrap();

        assert_eq!(switch.events().subscriber_count(), 1);
    }
}
