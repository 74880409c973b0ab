// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events published by an audio device.

use crate::engine::EngineId;
use crate::types::PowerState;

/// An event published on the device's broadcast bus.
///
/// Events describe completed facts, not requests: `PowerStateChanged` is
/// published when a transition finishes (including the deferred case), never
/// when one is merely pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A power transition completed and the current state changed.
    PowerStateChanged {
        /// State before the transition.
        previous: PowerState,
        /// State after the transition.
        current: PowerState,
    },
    /// An engine was activated and assigned its index.
    EngineActivated {
        /// The newly assigned engine id.
        engine: EngineId,
    },
    /// An engine reported that it began streaming.
    EngineStarted {
        /// The engine that started.
        engine: EngineId,
    },
    /// An engine reported that it stopped streaming.
    EngineStopped {
        /// The engine that stopped.
        engine: EngineId,
    },
    /// Every tracked engine was stopped and the registry cleared.
    EnginesDeactivated,
    /// The device shut down; no further events follow.
    Shutdown,
}

impl DeviceEvent {
    /// Returns `true` for power-transition events.
    #[must_use]
    pub const fn is_power_event(&self) -> bool {
        matches!(self, Self::PowerStateChanged { .. })
    }

    /// Returns the engine this event concerns, if any.
    #[must_use]
    pub const fn engine(&self) -> Option<EngineId> {
        match self {
            Self::EngineActivated { engine }
            | Self::EngineStarted { engine }
            | Self::EngineStopped { engine } => Some(*engine),
            _ => None,
        }
    }
}
