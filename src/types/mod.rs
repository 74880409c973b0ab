// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core value types used across the library.

mod idle_delay;
mod power;

pub use idle_delay::IdleDelay;
pub use power::{PowerOrdinal, PowerState};
