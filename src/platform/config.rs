// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration records for telnet switches.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::interpreter::{Identity, ValueTemplate};
use crate::protocol::TelnetConfig;
use crate::switch::StatePolling;

/// Configuration for one switch.
///
/// Field names match the keys of the platform configuration document.
///
/// # Examples
///
/// ```
/// use telnet_switch::platform::SwitchConfig;
///
/// // Assumed-state switch on port 23
/// let config = SwitchConfig::new("10.0.0.5", "POWER ON", "POWER OFF");
///
/// // Polled switch with a template
/// let config = SwitchConfig::new("10.0.0.6", "PWR1", "PWR0")
///     .with_port(2323)
///     .with_name("Projector")
///     .with_state_command("PWR?")
///     .with_value_template("{{ value_json.power }}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchConfig {
    /// Host name or IP address of the remote device.
    pub resource: String,
    /// TCP port (default 23).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Display name (defaults to the object id).
    #[serde(default)]
    pub name: Option<String>,
    /// Command that turns the device on.
    pub command_on: String,
    /// Command that turns the device off.
    pub command_off: String,
    /// Optional command that queries the device state.
    #[serde(default)]
    pub command_state: Option<String>,
    /// Optional template rendering the state query response.
    #[serde(default)]
    pub value_template: Option<String>,
}

fn default_port() -> u16 {
    TelnetConfig::DEFAULT_PORT
}

impl SwitchConfig {
    /// Creates a configuration with the required fields.
    #[must_use]
    pub fn new(
        resource: impl Into<String>,
        command_on: impl Into<String>,
        command_off: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            port: default_port(),
            name: None,
            command_on: command_on.into(),
            command_off: command_off.into(),
            command_state: None,
            value_template: None,
        }
    }

    /// Sets the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the state query command.
    #[must_use]
    pub fn with_state_command(mut self, command: impl Into<String>) -> Self {
        self.command_state = Some(command.into());
        self
    }

    /// Sets the value template.
    #[must_use]
    pub fn with_value_template(mut self, template: impl Into<String>) -> Self {
        self.value_template = Some(template.into());
        self
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub fn telnet_config(&self) -> TelnetConfig {
        TelnetConfig::new(self.resource.clone()).with_port(self.port)
    }

    /// Builds the polling setup, if a state command is configured.
    ///
    /// Without a value template the response is used as-is. A template is
    /// parsed even when there is no state command, so typos surface early.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTemplate` if the template does not parse.
    pub fn state_polling(&self) -> Result<Option<StatePolling>, ConfigError> {
        let template = self
            .value_template
            .as_deref()
            .map(ValueTemplate::parse)
            .transpose()?;

        let Some(command) = &self.command_state else {
            if template.is_some() {
                tracing::debug!(
                    resource = %self.resource,
                    "value_template has no effect without command_state"
                );
            }
            return Ok(None);
        };

        Ok(Some(match template {
            Some(template) => StatePolling::new(command.clone(), template),
            None => StatePolling::new(command.clone(), Identity),
        }))
    }
}

/// Platform configuration: switches keyed by object id.
///
/// # Examples
///
/// ```
/// use telnet_switch::platform::PlatformConfig;
///
/// let config = PlatformConfig::from_json(r#"{
///     "switches": {
///         "projector": {
///             "resource": "10.0.0.5",
///             "command_on": "POWER ON",
///             "command_off": "POWER OFF"
///         }
///     }
/// }"#).unwrap();
///
/// assert_eq!(config.switches["projector"].port, 23);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlatformConfig {
    /// Switch configurations keyed by object id.
    #[serde(default)]
    pub switches: BTreeMap<String, SwitchConfig>,
}

impl PlatformConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a switch.
    #[must_use]
    pub fn with_switch(mut self, object_id: impl Into<String>, config: SwitchConfig) -> Self {
        self.switches.insert(object_id.into(), config);
        self
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_config_defaults() {
        let config = SwitchConfig::new("10.0.0.5", "ON", "OFF");
        assert_eq!(config.port, 23);
        assert!(config.name.is_none());
        assert!(config.command_state.is_none());
        assert_eq!(config.telnet_config().address(), "10.0.0.5:23");
    }

    #[test]
    fn no_state_command_means_no_polling() {
        let config = SwitchConfig::new("10.0.0.5", "ON", "OFF");
        assert!(config.state_polling().unwrap().is_none());
    }

    #[test]
    fn template_without_state_command_is_ignored() {
        let config = SwitchConfig::new("10.0.0.5", "ON", "OFF").with_value_template("{{ value }}");
        assert!(config.state_polling().unwrap().is_none());
    }

    #[test]
    fn invalid_template_is_rejected() {
        let config = SwitchConfig::new("10.0.0.5", "ON", "OFF").with_value_template("{{ value");
        assert!(matches!(
            config.state_polling(),
            Err(ConfigError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn state_command_without_template_uses_identity() {
        let polling = SwitchConfig::new("10.0.0.5", "ON", "OFF")
            .with_state_command("STATUS?")
            .state_polling()
            .unwrap()
            .unwrap();

        assert_eq!(polling.command(), "STATUS?");
        assert!(polling.interpret("True"));
        assert!(!polling.interpret("true"));
    }

    #[test]
    fn state_command_with_template() {
        let polling = SwitchConfig::new("10.0.0.5", "ON", "OFF")
            .with_state_command("STATUS?")
            .with_value_template("{{ value_json.on }}")
            .state_polling()
            .unwrap()
            .unwrap();

        assert!(polling.interpret(r#"{"on": true}"#));
        assert!(!polling.interpret(r#"{"on": false}"#));
    }

    #[test]
    fn parse_full_document() {
        let config = PlatformConfig::from_json(
            r#"{
                "switches": {
                    "amp": {
                        "resource": "amp.local",
                        "port": 2323,
                        "name": "Amplifier",
                        "command_on": "PWON",
                        "command_off": "PWSTANDBY",
                        "command_state": "PW?",
                        "value_template": "{{ value }}"
                    },
                    "tv": {
                        "resource": "10.0.0.7",
                        "command_on": "ON",
                        "command_off": "OFF"
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.switches.len(), 2);
        let amp = &config.switches["amp"];
        assert_eq!(amp.port, 2323);
        assert_eq!(amp.name.as_deref(), Some("Amplifier"));
        assert_eq!(amp.command_state.as_deref(), Some("PW?"));
        assert_eq!(config.switches["tv"].port, 23);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let result = PlatformConfig::from_json(
            r#"{"switches": {"tv": {"resource": "10.0.0.7", "command_on": "ON"}}}"#,
        );
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = PlatformConfig::from_json(
            r#"{"switches": {"tv": {"resource": "h", "command_on": "ON", "command_off": "OFF", "timeout": 3}}}"#,
        );
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn empty_document_has_no_switches() {
        let config = PlatformConfig::from_json("{}").unwrap();
        assert!(config.switches.is_empty());
    }
}
