// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `audiodev` - Power-state and timer coordination for audio device
//! controllers.
//!
//! This library provides the device-level core an audio driver builds on: a
//! serialized power state machine (sleep / idle / active, with synchronous or
//! deferred hardware transitions), an idle-timeout scheduler, a shared
//! periodic-timer multiplexer, and lifecycle tracking for the device's audio
//! engines. The actual hardware I/O stays in the driver, behind the
//! [`DeviceDriver`] trait.
//!
//! # Supported Features
//!
//! - **Power management**: platform wake/sleep ordinals, engine-driven
//!   idle/active transitions, deferred hardware acknowledgement, blocking
//!   waits on pending transitions
//! - **Idle timeout**: configurable delay before an idle device powers down
//! - **Timer events**: any number of periodic callbacks multiplexed onto a
//!   single timer resource, firing at the minimum registered interval
//! - **Engine lifecycle**: activation, running-count tracking, pause/resume
//!   across sleep, bulk deactivation
//! - **Events**: broadcast notifications for power and engine changes
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use audiodev::{AudioDevice, DeviceDriver, IdleDelay, PowerState, PowerTransition};
//!
//! struct MyDriver;
//!
//! impl DeviceDriver for MyDriver {
//!     fn perform_power_state_change(
//!         &self,
//!         _from: PowerState,
//!         _to: PowerState,
//!     ) -> audiodev::Result<PowerTransition> {
//!         // Poke the hardware here. Returning `Complete` finishes the
//!         // transition before this call returns.
//!         Ok(PowerTransition::Complete)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> audiodev::Result<()> {
//!     let device = AudioDevice::builder(MyDriver)
//!         .name("Example Audio Device")
//!         .manufacturer("Example Corp")
//!         .idle_delay(IdleDelay::After(Duration::from_secs(30)))
//!         .build()
//!         .await?;
//!
//!     // Platform power manager says "wake".
//!     device.set_power_state(1).await?;
//!     assert!(device.power_state().is_awake());
//!
//!     device.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Periodic Timer Events
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use audiodev::TimerId;
//! # use audiodev::{AudioDevice, DeviceDriver, PowerState, PowerTransition};
//! # struct MyDriver;
//! # impl DeviceDriver for MyDriver {
//! #     fn perform_power_state_change(
//! #         &self,
//! #         _from: PowerState,
//! #         _to: PowerState,
//! #     ) -> audiodev::Result<PowerTransition> {
//! #         Ok(PowerTransition::Complete)
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> audiodev::Result<()> {
//!     let device = AudioDevice::builder(MyDriver).build().await?;
//!
//!     // Level metering every 100ms; the id is the handle for removal.
//!     let meter = TimerId::new();
//!     device
//!         .add_timer_event(meter, Duration::from_millis(100), || {
//!             // read peak levels from hardware
//!         })
//!         .await?;
//!
//!     device.remove_timer_event(meter).await;
//!     Ok(())
//! }
//! ```

mod device;
pub mod driver;
pub mod engine;
pub mod error;
pub mod event;
mod gate;
pub mod info;
pub mod timer;
pub mod types;

pub use device::{AudioDevice, AudioDeviceBuilder};
pub use driver::{DeviceDriver, PowerTransition};
pub use engine::{AudioEngine, EngineId, EngineState};
pub use error::{EngineError, Error, Result, TransitionError};
pub use event::{DeviceEvent, EventBus};
pub use info::{DefaultsFlags, DeviceInfo, TransportType};
pub use timer::TimerId;
pub use types::{IdleDelay, PowerOrdinal, PowerState};
