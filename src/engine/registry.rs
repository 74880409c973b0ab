// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine registry: tracked engines and the running count.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{AudioEngine, EngineId, EngineState};
use crate::error::EngineError;

struct Entry {
    engine: Arc<dyn AudioEngine>,
    state: EngineState,
}

/// Engines attached to the device, keyed by their stable index.
///
/// The running count is maintained here and changes exactly once per
/// start/stop notification; the per-engine state checks below are what
/// enforce that. Paused engines still count as running - pausing is a
/// device-sleep artifact, not a client stop.
pub(crate) struct EngineRegistry {
    entries: HashMap<EngineId, Entry>,
    next_index: u32,
    running: u32,
}

impl EngineRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_index: 0,
            running: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn running_count(&self) -> u32 {
        self.running
    }

    pub(crate) fn state_of(&self, id: EngineId) -> Option<EngineState> {
        self.entries.get(&id).map(|entry| entry.state)
    }

    /// Records an engine and assigns it a stable index.
    pub(crate) fn insert(&mut self, engine: Arc<dyn AudioEngine>) -> EngineId {
        let id = EngineId::new(self.next_index);
        self.next_index += 1;
        self.entries.insert(
            id,
            Entry {
                engine,
                state: EngineState::Attached,
            },
        );
        id
    }

    /// Marks an engine as running and increments the running count.
    pub(crate) fn mark_running(&mut self, id: EngineId) -> Result<(), EngineError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(EngineError::NotFound(id))?;
        match entry.state {
            EngineState::Running | EngineState::Paused => Err(EngineError::AlreadyRunning(id)),
            EngineState::Attached | EngineState::Stopped => {
                entry.state = EngineState::Running;
                self.running += 1;
                Ok(())
            }
        }
    }

    /// Marks an engine as stopped and decrements the running count.
    pub(crate) fn mark_stopped(&mut self, id: EngineId) -> Result<(), EngineError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(EngineError::NotFound(id))?;
        match entry.state {
            EngineState::Running | EngineState::Paused => {
                entry.state = EngineState::Stopped;
                self.running -= 1;
                Ok(())
            }
            EngineState::Attached | EngineState::Stopped => Err(EngineError::NotRunning(id)),
        }
    }

    /// Pauses every running engine. The running count is unchanged.
    pub(crate) fn pause_all_running(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.state == EngineState::Running {
                entry.engine.pause();
                entry.state = EngineState::Paused;
            }
        }
    }

    /// Resumes every paused engine.
    pub(crate) fn resume_all_paused(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.state == EngineState::Paused {
                entry.engine.resume();
                entry.state = EngineState::Running;
            }
        }
    }

    /// Stops every engine and clears the registry.
    ///
    /// `terminate` additionally invokes each engine's terminate hook; the
    /// shutdown path skips it because the device itself is going away.
    pub(crate) fn drain(&mut self, terminate: bool) {
        for entry in self.entries.values_mut() {
            entry.engine.stop();
            if terminate {
                entry.engine.terminate();
            }
            entry.state = EngineState::Stopped;
        }
        self.entries.clear();
        self.running = 0;
    }
}
