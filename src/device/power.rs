// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The power state machine.
//!
//! All triggers - platform ordinals, engine starts/stops, the idle timer -
//! end up requesting a *pending* state and calling
//! [`Inner::initiate_transition`]. The driver hook either finishes the
//! hardware work before returning (the transition completes inside the same
//! serialized call) or defers, in which case the async-in-progress flag
//! stays set until the driver calls back into
//! [`Inner::complete_power_state_change`].

use tokio::sync::MutexGuard;
use tokio::time::Instant;

use crate::device::{DeviceState, Inner};
use crate::driver::PowerTransition;
use crate::error::{Error, Result};
use crate::event::DeviceEvent;
use crate::types::{PowerOrdinal, PowerState};

impl Inner {
    pub(super) async fn set_power_state(&self, raw_ordinal: u32) -> Result<()> {
        let Some(ordinal) = PowerOrdinal::from_raw(raw_ordinal) else {
            return Err(Error::InvalidState {
                ordinal: raw_ordinal,
                max: PowerOrdinal::COUNT - 1,
            });
        };

        let mut state = self.gate.lock_settled().await;
        tracing::debug!(%ordinal, current = %self.gate.current(), "platform power request");

        match ordinal {
            PowerOrdinal::Sleep => {
                if self.gate.current() != PowerState::Sleep {
                    state.pending = PowerState::Sleep;
                    state.engines.pause_all_running();
                }
            }
            PowerOrdinal::On => {
                if self.gate.current() == PowerState::Sleep {
                    state.pending = if state.engines.running_count() == 0 {
                        PowerState::Idle
                    } else {
                        PowerState::Active
                    };
                }
            }
        }

        self.initiate_transition(&mut state)
    }

    /// Kicks off the hardware transition toward the pending state.
    ///
    /// A no-op when nothing is pending or a deferred transition is already
    /// outstanding (transitions never overlap; blocking entry points settle
    /// first, non-blocking ones simply skip).
    pub(super) fn initiate_transition(&self, state: &mut DeviceState) -> Result<()> {
        let current = self.gate.current();
        if current == state.pending || self.gate.async_in_progress() {
            return Ok(());
        }

        self.gate.set_async_in_progress(true);
        match self.driver.perform_power_state_change(current, state.pending) {
            Ok(PowerTransition::Complete) => {
                self.gate.set_async_in_progress(false);
                self.complete_locked(state);
                Ok(())
            }
            Ok(PowerTransition::Deferred { eta }) => {
                tracing::debug!(
                    from = %current,
                    to = %state.pending,
                    ?eta,
                    "power transition deferred by driver"
                );
                Ok(())
            }
            Err(err) => {
                self.gate.set_async_in_progress(false);
                tracing::warn!(
                    from = %current,
                    to = %state.pending,
                    error = %err,
                    "hardware power transition failed"
                );
                Err(err)
            }
        }
    }

    pub(super) async fn complete_power_state_change(&self) {
        let mut state = self.gate.lock().await;
        self.complete_locked(&mut state);
    }

    /// Finishes a transition: post-wake housekeeping, waiter wakeups, and
    /// the current-state update, in that order.
    pub(super) fn complete_locked(&self, state: &mut DeviceState) {
        let previous = self.gate.current();
        if previous == state.pending {
            // An engine start can pin `pending` back to the current state
            // while a deferred transition is in flight, making its completion
            // a no-op; the flag must still clear so waiters are released.
            if self.gate.async_in_progress() {
                self.gate.set_async_in_progress(false);
            }
            return;
        }

        if previous == PowerState::Sleep {
            // Waking: resync the shared timer so every periodic callback is
            // due right now, fire them once, then resume paused engines.
            state.timers.reset_anchor(Instant::now());
            if !state.timers.is_empty() {
                self.dispatch_locked(state, true);
            }
            state.engines.resume_all_paused();
        }

        if self.gate.async_in_progress() {
            self.gate.set_async_in_progress(false);
        }

        self.gate.publish_current(state.pending);
        self.bus.publish(DeviceEvent::PowerStateChanged {
            previous,
            current: state.pending,
        });
        tracing::debug!(%previous, current = %state.pending, "power state change complete");
    }

    /// Releases `guard` and reacquires it once no deferred transition is
    /// outstanding. Conditions checked before the call must be re-checked by
    /// the caller if they matter after it.
    pub(super) async fn settle<'a>(
        &'a self,
        guard: MutexGuard<'a, DeviceState>,
    ) -> MutexGuard<'a, DeviceState> {
        drop(guard);
        self.gate.lock_settled().await
    }
}
