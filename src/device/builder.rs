// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder for creating audio devices.

use std::sync::{Arc, Weak};
use std::sync::atomic::AtomicBool;

use parking_lot::RwLock;

use crate::device::{AudioDevice, DeviceState, Inner};
use crate::driver::DeviceDriver;
use crate::error::Result;
use crate::event::EventBus;
use crate::gate::StateGate;
use crate::info::{DefaultsFlags, DeviceInfo, TransportType};
use crate::timer::one_shot::OneShot;
use crate::types::IdleDelay;

/// Builder for [`AudioDevice`].
///
/// Created via [`AudioDevice::builder`]. All metadata is optional; the only
/// required input is the driver.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use audiodev::{AudioDevice, IdleDelay, TransportType};
/// # use audiodev::{DeviceDriver, PowerState, PowerTransition};
/// # struct MyDriver;
/// # impl DeviceDriver for MyDriver {
/// #     fn perform_power_state_change(
/// #         &self,
/// #         _from: PowerState,
/// #         _to: PowerState,
/// #     ) -> audiodev::Result<PowerTransition> {
/// #         Ok(PowerTransition::Complete)
/// #     }
/// # }
///
/// # async fn example() -> audiodev::Result<()> {
/// let device = AudioDevice::builder(MyDriver)
///     .name("Example Audio Device")
///     .manufacturer("Example Corp")
///     .transport(TransportType::Usb)
///     .idle_delay(IdleDelay::After(Duration::from_secs(30)))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct AudioDeviceBuilder {
    driver: Arc<dyn DeviceDriver>,
    info: DeviceInfo,
    idle_delay: IdleDelay,
    event_capacity: Option<usize>,
}

impl AudioDeviceBuilder {
    pub(crate) fn new(driver: impl DeviceDriver) -> Self {
        Self {
            driver: Arc::new(driver),
            info: DeviceInfo::new(),
            idle_delay: IdleDelay::default(),
            event_capacity: None,
        }
    }

    /// Sets the device name (deriving a model name if none is given).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.info.set_name(name);
        self
    }

    /// Sets the abbreviated device name.
    #[must_use]
    pub fn short_name(mut self, short_name: impl Into<String>) -> Self {
        self.info.set_short_name(short_name);
        self
    }

    /// Sets the manufacturer name.
    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.info.set_manufacturer(manufacturer);
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.info.set_model_name(model_name);
        self
    }

    /// Sets the transport type.
    #[must_use]
    pub fn transport(mut self, transport: TransportType) -> Self {
        self.info.set_transport(transport);
        self
    }

    /// Sets which system default roles the device may take.
    #[must_use]
    pub fn defaults(mut self, defaults: DefaultsFlags) -> Self {
        self.info.set_defaults(defaults);
        self
    }

    /// Sets the idle-timeout delay the device starts with.
    ///
    /// The idle timer is not armed at build time; the delay applies from the
    /// first time the device goes idle.
    #[must_use]
    pub fn idle_delay(mut self, delay: IdleDelay) -> Self {
        self.idle_delay = delay;
        self
    }

    /// Sets the event-bus capacity per subscriber.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Builds the device.
    ///
    /// Runs the driver's [`init_hardware`](DeviceDriver::init_hardware) hook
    /// exactly once, before power management starts. The device comes up
    /// with current and pending state `Idle` and no timers armed.
    ///
    /// # Errors
    ///
    /// Whatever `init_hardware` returns; no device is created on failure.
    pub async fn build(self) -> Result<AudioDevice> {
        let Self {
            driver,
            info,
            idle_delay,
            event_capacity,
        } = self;

        driver.init_hardware()?;

        let mut state = DeviceState::new();
        state.idle_delay = idle_delay;

        let bus = event_capacity.map_or_else(EventBus::new, EventBus::with_capacity);

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let periodic_timer = OneShot::spawn({
                let weak = weak.clone();
                move || {
                    let weak = weak.clone();
                    async move {
                        if let Some(inner) = weak.upgrade() {
                            inner.dispatch_timer_events(false).await;
                        }
                    }
                }
            });
            let idle_timer = OneShot::spawn({
                let weak = weak.clone();
                move || {
                    let weak = weak.clone();
                    async move {
                        if let Some(inner) = weak.upgrade() {
                            inner.handle_idle_timeout().await;
                        }
                    }
                }
            });
            Inner {
                gate: StateGate::new(state),
                driver,
                bus,
                info: RwLock::new(info),
                periodic_timer,
                idle_timer,
                shutting_down: AtomicBool::new(false),
            }
        });

        tracing::debug!("audio device built");
        Ok(AudioDevice { inner })
    }
}
