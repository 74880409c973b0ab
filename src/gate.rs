// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serialized execution context for device state.
//!
//! Every state-mutating operation in the library funnels through the single
//! mutex here, so at most one mutation body runs at a time. The two values
//! other tasks need to wait on - the current power state and the
//! async-transition flag - live in `watch` channels rather than behind the
//! mutex: each channel doubles as a condition variable for its value
//! (`Receiver::wait_for` re-checks on every wake) and as a lock-free read
//! path. Channels are only ever written while the state lock is held.
//!
//! No other lock in the crate may be held across these operations; the
//! device-property lock is leaf-only.

use tokio::sync::watch;
use tokio::sync::{Mutex, MutexGuard};

use crate::device::DeviceState;
use crate::types::PowerState;

pub(crate) struct StateGate {
    state: Mutex<DeviceState>,
    current: watch::Sender<PowerState>,
    async_in_progress: watch::Sender<bool>,
}

impl StateGate {
    pub(crate) fn new(state: DeviceState) -> Self {
        Self {
            state: Mutex::new(state),
            current: watch::channel(PowerState::Idle).0,
            async_in_progress: watch::channel(false).0,
        }
    }

    /// Acquires exclusive access to the device state.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().await
    }

    /// Acquires exclusive access once no asynchronous power transition is
    /// outstanding.
    ///
    /// If one is in progress the lock is released while waiting and the
    /// condition is re-checked after reacquisition, since another waiter may
    /// have started a new transition in between.
    pub(crate) async fn lock_settled(&self) -> MutexGuard<'_, DeviceState> {
        loop {
            let guard = self.state.lock().await;
            if !*self.async_in_progress.borrow() {
                return guard;
            }
            drop(guard);
            self.wait_async_clear().await;
        }
    }

    /// Current power state, readable without the lock.
    pub(crate) fn current(&self) -> PowerState {
        *self.current.borrow()
    }

    /// Publishes a new current power state, waking waiters on it.
    ///
    /// Callers must hold the state lock.
    pub(crate) fn publish_current(&self, state: PowerState) {
        self.current.send_replace(state);
    }

    pub(crate) fn subscribe_current(&self) -> watch::Receiver<PowerState> {
        self.current.subscribe()
    }

    /// Suspends until the current power state equals `state`.
    pub(crate) async fn wait_for_current(&self, state: PowerState) {
        let mut rx = self.current.subscribe();
        // The sender lives in self, so wait_for cannot fail.
        let _ = rx.wait_for(|current| *current == state).await;
    }

    /// Whether a deferred power transition is outstanding.
    pub(crate) fn async_in_progress(&self) -> bool {
        *self.async_in_progress.borrow()
    }

    /// Sets the async-transition flag, waking waiters when it clears.
    ///
    /// Callers must hold the state lock.
    pub(crate) fn set_async_in_progress(&self, in_progress: bool) {
        self.async_in_progress.send_replace(in_progress);
    }

    /// Suspends until no asynchronous transition is outstanding.
    ///
    /// Returns immediately if none is.
    pub(crate) async fn wait_async_clear(&self) {
        let mut rx = self.async_in_progress.subscribe();
        let _ = rx.wait_for(|in_progress| !in_progress).await;
    }
}
