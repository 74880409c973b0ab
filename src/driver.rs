// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver hooks for device-specific hardware control.
//!
//! The library never touches hardware itself. Everything that does real I/O
//! lives behind [`DeviceDriver`], implemented once per device family and
//! handed to [`AudioDevice::builder`](crate::AudioDevice::builder).

use std::time::Duration;

use crate::error::Result;
use crate::types::PowerState;

/// Outcome of a hardware power transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    /// The hardware finished the transition before the hook returned.
    Complete,
    /// The hardware will acknowledge later; the driver must call
    /// [`AudioDevice::complete_power_state_change`](crate::AudioDevice::complete_power_state_change)
    /// when it does. `eta` is the driver's latency estimate, informational
    /// only.
    Deferred {
        /// Estimated time until the hardware acknowledges.
        eta: Duration,
    },
}

/// Device-specific hardware hooks.
///
/// Hooks are invoked from within the device's serialized section: at most one
/// hook runs at a time, and a hook must not call back into blocking
/// [`AudioDevice`](crate::AudioDevice) APIs. Deferred completion is the
/// exception by design - `complete_power_state_change` is called later, from
/// whatever task observes the hardware acknowledgement.
///
/// # Examples
///
/// ```
/// use audiodev::{DeviceDriver, PowerState, PowerTransition};
///
/// struct CodecDriver;
///
/// impl DeviceDriver for CodecDriver {
///     fn perform_power_state_change(
///         &self,
///         from: PowerState,
///         to: PowerState,
///     ) -> audiodev::Result<PowerTransition> {
///         // Write the codec's power register here.
///         let _ = (from, to);
///         Ok(PowerTransition::Complete)
///     }
/// }
/// ```
pub trait DeviceDriver: Send + Sync + 'static {
    /// Device-specific bring-up, called exactly once before power management
    /// begins, from [`AudioDeviceBuilder::build`](crate::AudioDeviceBuilder::build).
    ///
    /// # Errors
    ///
    /// Returning an error aborts device construction.
    fn init_hardware(&self) -> Result<()> {
        Ok(())
    }

    /// Performs the hardware side of a power transition.
    ///
    /// This is the only place hardware power I/O happens. The hook must not
    /// partially apply: on failure the hardware must remain in `from`, so
    /// that a later request can safely retry the same transition.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the transition; it is surfaced to whoever
    /// requested it and there is no automatic retry.
    fn perform_power_state_change(
        &self,
        from: PowerState,
        to: PowerState,
    ) -> Result<PowerTransition>;
}
