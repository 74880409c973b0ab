// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audio engine lifecycle.
//!
//! An audio engine is the streaming half of a device - the part that moves
//! samples. This library does not care how it streams; it only tracks which
//! engines exist, which are running, and drives pause/resume across device
//! sleep. The engine's own behavior lives behind the [`AudioEngine`] trait.

use std::fmt;

use crate::error::EngineError;

pub(crate) mod registry;

/// Stable index of an engine within its device.
///
/// Assigned at activation and never reused for the device's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineId(u32);

impl EngineId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index value.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Engine({})", self.0)
    }
}

/// Lifecycle state of an engine as tracked by its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineState {
    /// Activated but not streaming.
    Attached,
    /// Streaming; counts toward the device's running-engine total.
    Running,
    /// Streaming suspended by device sleep; still counts as running.
    Paused,
    /// Streaming ended.
    Stopped,
}

/// Behavior hooks for an audio engine.
///
/// Hooks are invoked from within the device's serialized section and must
/// not call back into blocking [`AudioDevice`](crate::AudioDevice) APIs.
/// In particular, an engine that begins streaming on its own reports that
/// via [`engine_started`](crate::AudioDevice::engine_started) from outside
/// these hooks, not from inside [`start`](AudioEngine::start).
pub trait AudioEngine: Send + Sync + 'static {
    /// Initializes the engine so it is ready to stream.
    ///
    /// Called during [`activate_engine`](crate::AudioDevice::activate_engine)
    /// when `should_start` is set.
    ///
    /// # Errors
    ///
    /// Returning an error rolls the activation back; the engine is not
    /// recorded.
    fn start(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Stops streaming. Called for every tracked engine during bulk
    /// deactivation and shutdown.
    fn stop(&self) {}

    /// Suspends streaming without losing position. Called when the device
    /// goes to sleep while this engine is running.
    fn pause(&self) {}

    /// Resumes streaming after [`pause`](AudioEngine::pause). Called when
    /// the device wakes.
    fn resume(&self) {}

    /// Releases driver-side resources. Called during
    /// [`deactivate_all_engines`](crate::AudioDevice::deactivate_all_engines)
    /// unless the device itself is shutting down.
    fn terminate(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_id_display() {
        assert_eq!(EngineId::new(0).to_string(), "Engine(0)");
        assert_eq!(EngineId::new(42).to_string(), "Engine(42)");
    }

    #[test]
    fn engine_id_index() {
        assert_eq!(EngineId::new(7).index(), 7);
    }
}
