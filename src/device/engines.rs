// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine lifecycle entry points.
//!
//! The running-engine count is the bridge between engines and power: the
//! first engine to start demands `Active`, the last one to stop demands
//! `Idle` and re-arms the idle sleep scheduler.

use std::sync::Arc;

use crate::device::Inner;
use crate::engine::{AudioEngine, EngineId};
use crate::error::{Error, Result};
use crate::event::DeviceEvent;
use crate::types::PowerState;

impl Inner {
    pub(super) async fn activate_engine(
        &self,
        engine: Arc<dyn AudioEngine>,
        should_start: bool,
    ) -> Result<EngineId> {
        let mut state = self.gate.lock().await;
        if should_start {
            if let Err(err) = engine.start() {
                tracing::warn!(error = %err, "engine start failed during activation");
                return Err(Error::Engine(err));
            }
        }
        let id = state.engines.insert(engine);
        drop(state);
        self.bus.publish(DeviceEvent::EngineActivated { engine: id });
        tracing::debug!(%id, should_start, "audio engine activated");
        Ok(id)
    }

    pub(super) async fn engine_started(&self, id: EngineId) -> Result<()> {
        let mut state = self.gate.lock().await;
        state.engines.mark_running(id)?;
        let running = state.engines.running_count();
        tracing::debug!(%id, running, "audio engine started");

        if running == 1 {
            // First engine starting - the device needs to be active.
            if self.gate.current() == PowerState::Idle {
                let mut state = self.settle(state).await;
                state.pending = PowerState::Active;
                let initiated = self.initiate_transition(&mut state);
                drop(state);
                // A deferred transition means the hardware is not active yet;
                // don't report the engine as started until it is.
                self.gate.wait_async_clear().await;
                initiated?;
            } else if state.pending != PowerState::Sleep {
                // Pin the pending state so an armed idle timer that fires now
                // cannot downgrade the device while this engine runs.
                state.pending = PowerState::Active;
            }
        }

        self.bus.publish(DeviceEvent::EngineStarted { engine: id });
        Ok(())
    }

    pub(super) async fn engine_stopped(&self, id: EngineId) -> Result<()> {
        let mut state = self.gate.lock().await;
        state.engines.mark_stopped(id)?;
        let running = state.engines.running_count();
        tracing::debug!(%id, running, "audio engine stopped");

        if running == 0 && self.gate.current() == PowerState::Active {
            // Last engine stopping - the device goes idle.
            let mut state = self.settle(state).await;
            state.pending = PowerState::Idle;
            self.schedule_idle_sleep(&mut state);
        }

        self.bus.publish(DeviceEvent::EngineStopped { engine: id });
        Ok(())
    }

    pub(super) async fn deactivate_all_engines(&self) {
        let terminate = !self.is_shutting_down();
        let mut state = self.gate.lock().await;
        state.engines.drain(terminate);
        drop(state);
        self.bus.publish(DeviceEvent::EnginesDeactivated);
        tracing::debug!(terminate, "all audio engines deactivated");
    }
}
