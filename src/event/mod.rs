// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for switch state changes and failures.
//!
//! Switch operations never return errors. State changes, failed commands
//! and empty poll responses are published on an [`EventBus`] instead,
//! backed by tokio's broadcast channel.
//!
//! # Examples
//!
//! ```
//! use telnet_switch::event::{EventBus, SwitchEvent, SwitchId};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let switch_id = SwitchId::new("amp").unwrap();
//! bus.publish(SwitchEvent::command_failed(switch_id, "POWER ON", "connection refused"));
//! ```

mod event_bus;
mod switch_event;
mod switch_id;

pub use event_bus::EventBus;
pub use switch_event::SwitchEvent;
pub use switch_id::SwitchId;
