// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timer event registration and dispatch.
//!
//! The table in [`DeviceState`] decides *when* the shared timer resource
//! must fire next; this module applies those decisions to the resource and
//! runs the dispatch rounds it triggers.

use std::time::Duration;

use tokio::time::Instant;

use crate::device::{DeviceState, Inner};
use crate::error::{Error, Result};
use crate::timer::TimerId;
use crate::timer::table::{Rearm, TimerCallback};
use crate::types::PowerState;

impl Inner {
    pub(super) async fn add_timer_event(
        &self,
        id: TimerId,
        interval: Duration,
        callback: TimerCallback,
    ) -> Result<()> {
        if interval.is_zero() {
            return Err(Error::InvalidArgument(
                "timer interval must be non-zero".to_string(),
            ));
        }
        let mut state = self.gate.lock().await;
        let rearm = state.timers.register(Instant::now(), id, interval, callback);
        self.apply_rearm(rearm);
        tracing::debug!(
            %id,
            ?interval,
            minimum = ?state.timers.minimum_interval(),
            "timer event registered"
        );
        Ok(())
    }

    pub(super) async fn remove_timer_event(&self, id: TimerId) {
        let mut state = self.gate.lock().await;
        let rearm = state.timers.unregister(id);
        self.apply_rearm(rearm);
        tracing::debug!(%id, remaining = state.timers.len(), "timer event removed");
    }

    pub(super) async fn clear_timer_events(&self) {
        let mut state = self.gate.lock().await;
        self.periodic_timer.cancel();
        state.timers.clear();
        tracing::debug!("all timer events removed");
    }

    /// Fired by the shared timer resource.
    pub(super) async fn dispatch_timer_events(&self, force: bool) {
        let mut state = self.gate.lock().await;
        self.dispatch_locked(&mut state, force);
    }

    /// Runs one dispatch round: every registered callback fires once, the
    /// anchor advances by the interval that scheduled this round, and the
    /// timer is re-armed from the anchor.
    ///
    /// Unforced rounds are skipped entirely while the device sleeps - no
    /// dispatch and no re-arm, leaving the timer dormant until the wake path
    /// forces a round.
    pub(super) fn dispatch_locked(&self, state: &mut DeviceState, force: bool) {
        if state.timers.is_empty() {
            return;
        }
        if !force && self.gate.current() == PowerState::Sleep {
            return;
        }

        let step = state.timers.minimum_interval();
        let callbacks = state.timers.callbacks();
        tracing::trace!(count = callbacks.len(), force, "dispatching timer events");
        for callback in callbacks {
            callback();
        }

        if !state.timers.is_empty() {
            let next = state.timers.advance(step);
            self.periodic_timer.arm(next);
        }
    }

    fn apply_rearm(&self, rearm: Rearm) {
        match rearm {
            Rearm::At(at) => self.periodic_timer.arm(at),
            Rearm::Cancel => self.periodic_timer.cancel(),
            Rearm::Unchanged => {}
        }
    }
}
