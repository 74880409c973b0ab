// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic timer multiplexing.
//!
//! Any number of clients can register a periodic callback with the device;
//! all registrations share one underlying timer resource that always fires at
//! the minimum registered interval. [`TimerId`] identifies a registration
//! slot: registering the same id again replaces the slot's interval and
//! callback, and removing the id frees it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) mod one_shot;
pub(crate) mod table;

/// Identity of a periodic timer registration.
///
/// Ids are unique for the lifetime of the process. A client creates one id
/// per logical callback and holds on to it: re-registering with the same id
/// replaces the callback and interval, and
/// [`remove_timer_event`](crate::AudioDevice::remove_timer_event) takes the
/// id to unregister.
///
/// # Examples
///
/// ```
/// use audiodev::TimerId;
///
/// let metering = TimerId::new();
/// let watchdog = TimerId::new();
/// assert_ne!(metering, watchdog);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Creates a new process-unique timer id.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = TimerId::new();
        let b = TimerId::new();
        assert_ne!(a, b);
        assert_ne!(a.value(), b.value());
    }

    #[test]
    fn display() {
        let id = TimerId::new();
        assert_eq!(id.to_string(), format!("Timer({})", id.value()));
    }
}
