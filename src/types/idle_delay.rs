// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Idle-timeout delay type.
//!
//! Controls how long an idle device stays powered before the idle sleep
//! scheduler asks the driver to power it down.
//!
//! # Device Methods
//!
//! Use [`IdleDelay`] with these [`AudioDevice`](crate::AudioDevice) methods:
//! - [`set_idle_delay()`](crate::AudioDevice::set_idle_delay) - Change the delay
//! - [`idle_delay()`](crate::AudioDevice::idle_delay) - Query the current delay

use std::fmt;
use std::time::Duration;

/// Delay between the last engine stopping and the idle power-down request.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use audiodev::IdleDelay;
///
/// // Power down 30 seconds after going idle.
/// let delay = IdleDelay::After(Duration::from_secs(30));
/// assert!(!delay.is_never());
///
/// // A zero duration means "power down right away, no timer".
/// assert_eq!(IdleDelay::from(Duration::ZERO), IdleDelay::Immediate);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IdleDelay {
    /// Never power down automatically while idle.
    Never,
    /// Request the idle power-down as soon as the device goes idle.
    #[default]
    Immediate,
    /// Arm a one-shot timer and power down after this much idle time.
    After(Duration),
}

impl IdleDelay {
    /// Returns `true` if automatic idle power-down is disabled.
    #[must_use]
    pub const fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }
}

impl From<Duration> for IdleDelay {
    fn from(delay: Duration) -> Self {
        if delay.is_zero() {
            Self::Immediate
        } else {
            Self::After(delay)
        }
    }
}

impl fmt::Display for IdleDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::Immediate => write!(f, "immediate"),
            Self::After(delay) => write!(f, "after {delay:?}"),
        }
    }
}
