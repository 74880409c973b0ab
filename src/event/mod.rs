// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event system.
//!
//! The device publishes [`DeviceEvent`]s on a broadcast [`EventBus`];
//! interested observers subscribe via
//! [`AudioDevice::subscribe`](crate::AudioDevice::subscribe) instead of
//! polling device state.

mod bus;
mod device_event;

pub use bus::EventBus;
pub use device_event::DeviceEvent;
