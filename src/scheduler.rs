// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-interval polling of switches.
//!
//! The switch itself has no timer. [`PollScheduler`] spawns one tokio task
//! per pollable switch that calls [`Switch::update`] every scan interval.
//! Failed polls are not retried early; the next tick is the retry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::switch::Switch;

/// Default interval between two polls of the same switch.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Spawns polling tasks for switches.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use telnet_switch::scheduler::PollScheduler;
/// # use telnet_switch::switch::TelnetSwitch;
///
/// # fn example(switch: Arc<TelnetSwitch>) {
/// let scheduler = PollScheduler::new().with_interval(Duration::from_secs(30));
///
/// // None if the switch has no state command.
/// if let Some(handle) = scheduler.schedule(switch) {
///     // ...
///     handle.stop();
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PollScheduler {
    interval: Duration,
}

impl PollScheduler {
    /// Creates a scheduler polling every [`SCAN_INTERVAL`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval: SCAN_INTERVAL,
        }
    }

    /// Sets the polling interval.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll interval must be non-zero");
        self.interval = interval;
        self
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts polling `switch`. The first poll happens immediately.
    ///
    /// Returns `None` without spawning anything if the switch should not
    /// be polled.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use = "dropping the handle stops polling"]
    pub fn schedule<S>(&self, switch: Arc<S>) -> Option<PollHandle>
    where
        S: Switch + 'static,
    {
        if !switch.should_poll() {
            tracing::debug!(name = switch.name(), "Switch has no state command, not polling");
            return None;
        }

        let switch_name = switch.name().to_string();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tracing::trace!(name = switch.name(), "Polling switch");
                switch.update().await;
            }
        });

        Some(PollHandle { task, switch_name })
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running polling task. Dropping it stops the polling.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
    switch_name: String,
}

impl PollHandle {
    /// Returns the display name of the polled switch.
    #[must_use]
    pub fn switch_name(&self) -> &str {
        &self.switch_name
    }

    /// Returns true once the polling task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops polling. An update in progress is cancelled.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
