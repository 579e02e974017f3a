// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch event types.

use super::SwitchId;

/// Events emitted by switches.
///
/// Transport failures never reach the caller of a switch operation; these
/// events are how they become observable.
///
/// # Examples
///
/// ```
/// use telnet_switch::event::{SwitchEvent, SwitchId};
///
/// let switch_id = SwitchId::new("amp").unwrap();
/// let event = SwitchEvent::empty_response(switch_id.clone(), "STATUS?");
///
/// assert!(event.is_failure());
/// assert_eq!(event.switch_id(), &switch_id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchEvent {
    /// The stored on/off state changed.
    StateChanged {
        /// The switch.
        switch_id: SwitchId,
        /// The new state.
        is_on: bool,
        /// Whether the state is optimistic rather than read from the device.
        assumed: bool,
    },

    /// A command could not be delivered or its response could not be read.
    CommandFailed {
        /// The switch.
        switch_id: SwitchId,
        /// The command that failed.
        command: String,
        /// Description of the failure.
        error: String,
    },

    /// A state query produced no usable response; the state was kept.
    EmptyResponse {
        /// The switch.
        switch_id: SwitchId,
        /// The state query command.
        command: String,
    },
}

impl SwitchEvent {
    /// Returns the switch this event belongs to.
    #[must_use]
    pub fn switch_id(&self) -> &SwitchId {
        match self {
            Self::StateChanged { switch_id, .. }
            | Self::CommandFailed { switch_id, .. }
            | Self::EmptyResponse { switch_id, .. } => switch_id,
        }
    }

    /// Returns `true` for `CommandFailed` and `EmptyResponse`.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::CommandFailed { .. } | Self::EmptyResponse { .. }
        )
    }

    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(switch_id: SwitchId, is_on: bool, assumed: bool) -> Self {
        Self::StateChanged {
            switch_id,
            is_on,
            assumed,
        }
    }

    /// Creates a command failed event.
    #[must_use]
    pub fn command_failed(
        switch_id: SwitchId,
        command: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            switch_id,
            command: command.into(),
            error: error.into(),
        }
    }

    /// Creates an empty response event.
    #[must_use]
    pub fn empty_response(switch_id: SwitchId, command: impl Into<String>) -> Self {
        Self::EmptyResponse {
            switch_id,
            command: command.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> SwitchId {
        SwitchId::new("amp").unwrap()
    }

    #[test]
    fn switch_id_extraction() {
        assert_eq!(SwitchEvent::state_changed(id(), true, true).switch_id(), &id());
        assert_eq!(
            SwitchEvent::command_failed(id(), "ON", "refused").switch_id(),
            &id()
        );
        assert_eq!(SwitchEvent::empty_response(id(), "Q").switch_id(), &id());
    }

    #[test]
    fn failure_events() {
        assert!(!SwitchEvent::state_changed(id(), false, false).is_failure());
        assert!(SwitchEvent::command_failed(id(), "ON", "refused").is_failure());
        assert!(SwitchEvent::empty_response(id(), "Q").is_failure());
    }

    #[test]
    fn command_failed_fields() {
        let event = SwitchEvent::command_failed(id(), "POWER ON", "connection refused");

        if let SwitchEvent::CommandFailed { command, error, .. } = event {
            assert_eq!(command, "POWER ON");
            assert_eq!(error, "connection refused");
        } else {
            panic!("Expected CommandFailed event");
        }
    }
}
