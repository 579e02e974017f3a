// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform setup: turning a configuration document into switches.
//!
//! # Examples
//!
//! ```no_run
//! use telnet_switch::platform::{PlatformConfig, TelnetPlatform};
//! use telnet_switch::scheduler::PollScheduler;
//!
//! #[tokio::main]
//! async fn main() -> telnet_switch::Result<()> {
//!     let config = PlatformConfig::from_json(&std::fs::read_to_string("switches.json").unwrap())?;
//!     let platform = TelnetPlatform::setup(&config)?;
//!
//!     let mut events = platform.subscribe();
//!     let _polling = platform.start_polling(&PollScheduler::new());
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```

mod config;

pub use config::{PlatformConfig, SwitchConfig};

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::{ConfigError, Error};
use crate::event::{EventBus, SwitchEvent, SwitchId};
use crate::protocol::TelnetClient;
use crate::scheduler::{PollHandle, PollScheduler};
use crate::switch::TelnetSwitch;

impl TelnetSwitch<TelnetClient> {
    /// Builds a switch from its configuration record.
    ///
    /// # Errors
    ///
    /// Returns an error if the object id, endpoint, commands or template
    /// are invalid.
    pub fn from_config(
        object_id: &str,
        config: &SwitchConfig,
        events: EventBus,
    ) -> Result<Self, Error> {
        let id = SwitchId::new(object_id)?;
        if config.resource.trim().is_empty() {
            return Err(ConfigError::MissingField("resource").into());
        }

        let client = config.telnet_config().into_client()?;
        let mut builder = TelnetSwitch::builder(id, client)
            .with_commands(config.command_on.clone(), config.command_off.clone())
            .with_event_bus(events);

        if let Some(name) = &config.name {
            builder = builder.with_name(name.clone());
        }
        if let Some(polling) = config.state_polling()? {
            builder = builder.with_state_polling(polling);
        }

        builder.build()
    }
}

/// The set of switches created from one platform configuration.
///
/// All switches share one [`EventBus`].
#[derive(Debug)]
pub struct TelnetPlatform {
    switches: Vec<Arc<TelnetSwitch>>,
    events: EventBus,
}

impl TelnetPlatform {
    /// Creates every configured switch.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoSwitches` if the configuration is empty, or
    /// the first error raised by an invalid switch entry. Either way no
    /// switch is created.
    pub fn setup(config: &PlatformConfig) -> Result<Self, Error> {
        let events = EventBus::new();
        let mut switches = Vec::with_capacity(config.switches.len());

        for (object_id, switch_config) in &config.switches {
            let switch = TelnetSwitch::from_config(object_id, switch_config, events.clone())
                .inspect_err(|error| {
                    tracing::error!(object_id = %object_id, error = %error, "Invalid switch configuration");
                })?;

            tracing::debug!(
                switch_id = %switch.id(),
                address = %switch.protocol().config().address(),
                polled = switch.should_poll(),
                "Switch added"
            );
            switches.push(Arc::new(switch));
        }

        if switches.is_empty() {
            tracing::error!("No switches added");
            return Err(ConfigError::NoSwitches.into());
        }

        Ok(Self { switches, events })
    }

    /// Returns all switches, ordered by object id.
    #[must_use]
    pub fn switches(&self) -> &[Arc<TelnetSwitch>] {
        &self.switches
    }

    /// Looks up a switch by object id.
    #[must_use]
    pub fn get(&self, object_id: &str) -> Option<&Arc<TelnetSwitch>> {
        self.switches
            .iter()
            .find(|switch| switch.id().object_id() == object_id)
    }

    /// Subscribes to the events of every switch on this platform.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SwitchEvent> {
        self.events.subscribe()
    }

    /// Schedules polling for every switch that has a state command.
    ///
    /// Assumed-state switches are skipped. Dropping the returned handles
    /// stops polling.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start_polling(&self, scheduler: &PollScheduler) -> Vec<PollHandle> {
        self.switches
            .iter()
            .filter_map(|switch| scheduler.schedule(Arc::clone(switch)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_switches() -> PlatformConfig {
        PlatformConfig::new()
            .with_switch(
                "tv",
                SwitchConfig::new("10.0.0.7", "ON", "OFF").with_name("Television"),
            )
            .with_switch(
                "amp",
                SwitchConfig::new("10.0.0.8", "PWON", "PWSTANDBY")
                    .with_port(2323)
                    .with_state_command("PW?"),
            )
    }

    #[test]
    fn setup_creates_all_switches() {
        let platform = TelnetPlatform::setup(&two_switches()).unwrap();

        let ids: Vec<_> = platform
            .switches()
            .iter()
            .map(|s| s.entity_id())
            .collect();
        assert_eq!(ids, ["switch.amp", "switch.tv"]);

        let tv = platform.get("tv").unwrap();
        assert_eq!(tv.name(), "Television");
        assert!(tv.assumed_state());

        let amp = platform.get("amp").unwrap();
        assert_eq!(amp.name(), "amp");
        assert!(amp.should_poll());
        assert_eq!(amp.protocol().config().address(), "10.0.0.8:2323");
    }

    #[test]
    fn setup_without_switches_fails() {
        let result = TelnetPlatform::setup(&PlatformConfig::new());
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::NoSwitches))
        ));
    }

    #[test]
    fn setup_rejects_invalid_object_id() {
        let config = PlatformConfig::new()
            .with_switch("Living Room", SwitchConfig::new("h", "ON", "OFF"));
        assert!(matches!(
            TelnetPlatform::setup(&config),
            Err(Error::Config(ConfigError::InvalidObjectId(_)))
        ));
    }

    #[test]
    fn setup_rejects_empty_resource() {
        let config = PlatformConfig::new().with_switch("tv", SwitchConfig::new("", "ON", "OFF"));
        assert!(matches!(
            TelnetPlatform::setup(&config),
            Err(Error::Config(ConfigError::MissingField("resource")))
        ));
    }

    #[test]
    fn setup_rejects_port_zero() {
        let config = PlatformConfig::new()
            .with_switch("tv", SwitchConfig::new("10.0.0.7", "ON", "OFF").with_port(0));
        assert!(matches!(
            TelnetPlatform::setup(&config),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn switches_share_the_platform_bus() {
        let platform = TelnetPlatform::setup(&two_switches()).unwrap();
        let _rx = platform.subscribe();

        for switch in platform.switches() {
            assert_eq!(switch.events().subscriber_count(), 1);
        }
    }

    #[tokio::test]
    async fn start_polling_skips_assumed_state_switches() {
        let platform = TelnetPlatform::setup(&two_switches()).unwrap();
        let handles = platform.start_polling(&PollScheduler::new());

        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].switch_name(), "amp");
    }
}
