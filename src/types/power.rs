// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power-related types for audio devices.
//!
//! The device tracks a three-state logical power model (`Sleep`, `Idle`,
//! `Active`) above a two-state hardware power table. The platform power
//! manager only ever requests the hardware states, addressed by
//! [`PowerOrdinal`]; whether a wake lands in `Idle` or `Active` depends on
//! how many engines are running.

use std::fmt;

/// Logical power state of an audio device.
///
/// Hardware-visible states are exactly `Sleep` and "on"; the distinction
/// between `Idle` and `Active` exists only above the hardware layer and
/// decides idle-timeout behavior.
///
/// # Examples
///
/// ```
/// use audiodev::PowerState;
///
/// assert!(!PowerState::Sleep.is_awake());
/// assert!(PowerState::Idle.is_awake());
/// assert!(PowerState::Active.is_awake());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerState {
    /// Hardware is powered down; engines are paused and timers suspended.
    Sleep,
    /// Hardware is on but no engine is running; the idle timeout applies.
    Idle,
    /// Hardware is on and at least one engine is running.
    Active,
}

impl PowerState {
    /// Returns a lowercase name for the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Idle => "idle",
            Self::Active => "active",
        }
    }

    /// Returns `true` unless the device is sleeping.
    #[must_use]
    pub const fn is_awake(&self) -> bool {
        !matches!(self, Self::Sleep)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A power-state ordinal as presented by the platform power manager.
///
/// The platform addresses the hardware power table by index: 0 is sleep,
/// 1 is on. Raw ordinals are validated at the device boundary; anything
/// outside the table is rejected without touching device state.
///
/// # Examples
///
/// ```
/// use audiodev::PowerOrdinal;
///
/// assert_eq!(PowerOrdinal::from_raw(0), Some(PowerOrdinal::Sleep));
/// assert_eq!(PowerOrdinal::from_raw(1), Some(PowerOrdinal::On));
/// assert_eq!(PowerOrdinal::from_raw(2), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerOrdinal {
    /// Ordinal 0: power the hardware down.
    Sleep,
    /// Ordinal 1: power the hardware up.
    On,
}

impl PowerOrdinal {
    /// Number of entries in the hardware power table.
    pub const COUNT: u32 = 2;

    /// Validates a raw ordinal from the platform.
    ///
    /// Returns `None` for ordinals outside the power table.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Sleep),
            1 => Some(Self::On),
            _ => None,
        }
    }

    /// Returns the raw table index.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Sleep => 0,
            Self::On => 1,
        }
    }
}

impl fmt::Display for PowerOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}
