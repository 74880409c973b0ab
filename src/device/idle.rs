// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The idle sleep scheduler.
//!
//! A dedicated one-shot timer (never the shared periodic one) that requests
//! the idle power-down after the configured delay. It is re-armed every time
//! the last running engine stops; an engine starting before it fires makes
//! the eventual firing stale, which the guard in
//! [`Inner::handle_idle_timeout`] detects and ignores.

use tokio::time::Instant;

use crate::device::{DeviceState, Inner};
use crate::types::{IdleDelay, PowerState};

impl Inner {
    pub(super) async fn set_idle_delay(&self, delay: IdleDelay) {
        let mut state = self.gate.lock().await;
        self.idle_timer.cancel();
        state.idle_delay = delay;
        tracing::debug!(%delay, "idle delay changed");
        if !delay.is_never() {
            self.schedule_idle_sleep(&mut state);
        }
    }

    /// Arms the idle timer per the configured delay, or requests the idle
    /// power-down immediately for a zero delay.
    pub(super) fn schedule_idle_sleep(&self, state: &mut DeviceState) {
        match state.idle_delay {
            IdleDelay::Never => {}
            IdleDelay::Immediate => {
                if let Err(err) = self.initiate_transition(state) {
                    tracing::warn!(error = %err, "idle power-down failed");
                }
            }
            IdleDelay::After(delay) => {
                self.idle_timer.arm(Instant::now() + delay);
                tracing::trace!(?delay, "idle sleep timer armed");
            }
        }
    }

    /// Fired by the idle timer.
    pub(super) async fn handle_idle_timeout(&self) {
        let mut state = self.gate.lock().await;
        // The device may have gone active again since the timer was armed;
        // a stale firing is an expected race, not an error.
        if state.idle_delay.is_never() || state.pending != PowerState::Idle {
            tracing::trace!(pending = %state.pending, "stale idle timer ignored");
            return;
        }
        if let Err(err) = self.initiate_transition(&mut state) {
            tracing::warn!(error = %err, "idle power-down failed");
        }
    }
}
