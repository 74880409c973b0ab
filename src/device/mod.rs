// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The audio device core.
//!
//! [`AudioDevice`] is a cloneable handle over the shared device internals:
//! the serialized state (power machine, timer table, engine registry), the
//! two timer resources, the event bus, and the driver hooks.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;

use crate::driver::DeviceDriver;
use crate::engine::registry::EngineRegistry;
use crate::engine::{AudioEngine, EngineId, EngineState};
use crate::error::Result;
use crate::event::{DeviceEvent, EventBus};
use crate::gate::StateGate;
use crate::info::{DefaultsFlags, DeviceInfo, TransportType};
use crate::timer::TimerId;
use crate::timer::one_shot::OneShot;
use crate::timer::table::TimerTable;
use crate::types::{IdleDelay, PowerState};

mod builder;
mod engines;
mod idle;
mod power;
mod timers;

pub use builder::AudioDeviceBuilder;

/// Mutable device state guarded by the serialized execution context.
///
/// The current power state and the async-transition flag are not here; they
/// live in the gate's watch channels (written only under this lock) so that
/// waiters and lock-free readers can observe them.
pub(crate) struct DeviceState {
    /// The power state the device is transitioning toward; equals the
    /// current state when no transition is outstanding.
    pending: PowerState,
    idle_delay: IdleDelay,
    timers: TimerTable,
    engines: EngineRegistry,
}

impl DeviceState {
    pub(crate) fn new() -> Self {
        Self {
            pending: PowerState::Idle,
            idle_delay: IdleDelay::default(),
            timers: TimerTable::new(Instant::now()),
            engines: EngineRegistry::new(),
        }
    }
}

pub(crate) struct Inner {
    gate: StateGate,
    driver: Arc<dyn DeviceDriver>,
    bus: EventBus,
    info: RwLock<DeviceInfo>,
    /// Shared timer resource for all periodic timer events.
    periodic_timer: OneShot,
    /// Dedicated timer resource for the idle sleep scheduler.
    idle_timer: OneShot,
    shutting_down: AtomicBool,
}

impl Inner {
    /// Idempotent teardown: cancel the idle timer, then the periodic timer,
    /// then drain state - mirroring acquisition order in reverse.
    async fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.idle_timer.cancel();
        self.periodic_timer.cancel();
        {
            let mut state = self.gate.lock().await;
            state.timers.clear();
            state.engines.drain(false);
        }
        self.bus.publish(DeviceEvent::Shutdown);
        tracing::debug!("audio device shut down");
    }

    fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}

/// An audio device coordinating power state, timers, and engines.
///
/// The handle is cheap to clone; all clones share the same device. The
/// device-specific hardware behavior comes from the [`DeviceDriver`] handed
/// to [`builder`](AudioDevice::builder).
///
/// # Concurrency
///
/// Any number of tasks may call into the device concurrently; every
/// state-mutating entry point is serialized internally. The only operations
/// that suspend beyond that queueing are the explicit waits
/// ([`wait_for_pending_change`](AudioDevice::wait_for_pending_change),
/// [`wait_for_power_state`](AudioDevice::wait_for_power_state)) and entry
/// points that must not overlap a deferred transition.
#[derive(Clone)]
pub struct AudioDevice {
    inner: Arc<Inner>,
}

impl AudioDevice {
    /// Starts building a device around the given driver.
    pub fn builder(driver: impl DeviceDriver) -> AudioDeviceBuilder {
        AudioDeviceBuilder::new(driver)
    }

    // =========================================================================
    // Power
    // =========================================================================

    /// Current power state.
    ///
    /// A transition that completes synchronously is visible here before the
    /// call that requested it returns; a deferred transition becomes visible
    /// only once the driver acknowledges it.
    #[must_use]
    pub fn power_state(&self) -> PowerState {
        self.inner.gate.current()
    }

    /// The state the device is transitioning toward. Equals
    /// [`power_state`](AudioDevice::power_state) when no transition is
    /// outstanding.
    pub async fn pending_power_state(&self) -> PowerState {
        self.inner.gate.lock().await.pending
    }

    /// A watch receiver tracking the current power state.
    #[must_use]
    pub fn power_state_watch(&self) -> watch::Receiver<PowerState> {
        self.inner.gate.subscribe_current()
    }

    /// Suspends until the current power state equals `state`.
    pub async fn wait_for_power_state(&self, state: PowerState) {
        self.inner.gate.wait_for_current(state).await;
    }

    /// Suspends until no deferred power transition is outstanding.
    ///
    /// Returns immediately if none is. Callable from any task, including one
    /// other than the task that initiated the transition.
    pub async fn wait_for_pending_change(&self) {
        self.inner.gate.wait_async_clear().await;
    }

    /// Handles a power request from the platform power manager.
    ///
    /// Ordinal 0 requests sleep; ordinal 1 requests wake, landing in `Idle`
    /// or `Active` depending on the running-engine count. If a deferred
    /// transition is outstanding this waits for it to complete first, so
    /// transitions never overlap.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`](crate::Error::InvalidState) for an ordinal
    /// outside the power table (no state is touched), or the driver's error
    /// if the hardware hook fails (the transition is aborted; a later
    /// request may retry).
    pub async fn set_power_state(&self, ordinal: u32) -> Result<()> {
        self.inner.set_power_state(ordinal).await
    }

    /// Completes a deferred power transition.
    ///
    /// Called by the driver when the hardware acknowledges a transition it
    /// reported as [`Deferred`](crate::PowerTransition::Deferred). Wakes
    /// every task blocked in
    /// [`wait_for_pending_change`](AudioDevice::wait_for_pending_change).
    /// A no-op if no transition is outstanding.
    pub async fn complete_power_state_change(&self) {
        self.inner.complete_power_state_change().await;
    }

    // =========================================================================
    // Idle sleep
    // =========================================================================

    /// Current idle-timeout delay.
    pub async fn idle_delay(&self) -> IdleDelay {
        self.inner.gate.lock().await.idle_delay
    }

    /// Changes the idle-timeout delay.
    ///
    /// Cancels any armed idle timer, stores the new delay, and re-evaluates:
    /// [`IdleDelay::Immediate`] requests the idle power-down right away,
    /// [`IdleDelay::After`] arms the idle timer, [`IdleDelay::Never`]
    /// disables automatic idle power-down.
    pub async fn set_idle_delay(&self, delay: IdleDelay) {
        self.inner.set_idle_delay(delay).await;
    }

    // =========================================================================
    // Engines
    // =========================================================================

    /// Attaches an engine to the device.
    ///
    /// With `should_start` set, the engine's
    /// [`start`](crate::AudioEngine::start) hook runs first; if it fails the
    /// engine is not recorded. On success the engine is assigned a stable
    /// index and an [`EngineActivated`](DeviceEvent::EngineActivated) event
    /// is published.
    ///
    /// # Errors
    ///
    /// [`EngineError::StartFailed`](crate::EngineError::StartFailed) if the
    /// start hook fails.
    pub async fn activate_engine(
        &self,
        engine: Arc<dyn AudioEngine>,
        should_start: bool,
    ) -> Result<EngineId> {
        self.inner.activate_engine(engine, should_start).await
    }

    /// Reports that an engine began streaming.
    ///
    /// The first running engine demands an `Active` power state: if the
    /// device is idle this initiates the transition and, for a deferred
    /// transition, waits until the hardware acknowledges before returning.
    ///
    /// # Errors
    ///
    /// [`EngineError`](crate::EngineError) if the id is unknown or the
    /// engine is already counted as running; the driver's error if the
    /// wake-up transition fails.
    pub async fn engine_started(&self, id: EngineId) -> Result<()> {
        self.inner.engine_started(id).await
    }

    /// Reports that an engine stopped streaming.
    ///
    /// When the last running engine stops, the device demands `Idle` and the
    /// idle sleep scheduler is re-armed.
    ///
    /// # Errors
    ///
    /// [`EngineError`](crate::EngineError) if the id is unknown or the
    /// engine is not counted as running.
    pub async fn engine_stopped(&self, id: EngineId) -> Result<()> {
        self.inner.engine_stopped(id).await
    }

    /// Stops every tracked engine and clears the registry.
    ///
    /// Each engine's [`terminate`](crate::AudioEngine::terminate) hook runs
    /// unless the device itself is shutting down.
    pub async fn deactivate_all_engines(&self) {
        self.inner.deactivate_all_engines().await;
    }

    /// Number of engines currently counted as running (paused engines
    /// included).
    pub async fn running_engine_count(&self) -> u32 {
        self.inner.gate.lock().await.engines.running_count()
    }

    /// Tracked lifecycle state of an engine, if it is registered.
    pub async fn engine_state(&self, id: EngineId) -> Option<EngineState> {
        self.inner.gate.lock().await.engines.state_of(id)
    }

    /// Number of engines attached to the device.
    pub async fn engine_count(&self) -> usize {
        self.inner.gate.lock().await.engines.len()
    }

    // =========================================================================
    // Timer events
    // =========================================================================

    /// Registers a periodic callback.
    ///
    /// All registrations share one timer resource that fires at the minimum
    /// registered interval; every callback runs on every tick. Registering
    /// an id again replaces that slot's interval and callback. Callbacks run
    /// inside the device's serialized section, in unspecified order, and
    /// must not call back into blocking device APIs - spawn a task to modify
    /// registrations from within a callback.
    ///
    /// Dispatch is suspended while the device sleeps; on wake, every
    /// callback fires once immediately and the cadence restarts from there.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) for a zero
    /// interval.
    pub async fn add_timer_event<F>(
        &self,
        id: TimerId,
        interval: Duration,
        callback: F,
    ) -> Result<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner
            .add_timer_event(id, interval, Arc::new(callback))
            .await
    }

    /// Unregisters a periodic callback; unknown ids are a no-op.
    ///
    /// Removing the registration that defined the minimum interval
    /// recomputes it from the remaining registrations; removing the last one
    /// cancels the timer resource.
    pub async fn remove_timer_event(&self, id: TimerId) {
        self.inner.remove_timer_event(id).await;
    }

    /// Unregisters every periodic callback and cancels the timer resource.
    pub async fn clear_timer_events(&self) {
        self.inner.clear_timer_events().await;
    }

    /// Number of periodic callbacks currently registered.
    pub async fn timer_event_count(&self) -> usize {
        self.inner.gate.lock().await.timers.len()
    }

    // =========================================================================
    // Events and metadata
    // =========================================================================

    /// Subscribes to device events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.inner.bus.subscribe()
    }

    /// Snapshot of the device's descriptive properties.
    #[must_use]
    pub fn info(&self) -> DeviceInfo {
        self.inner.info.read().clone()
    }

    /// Sets the device name (and derives a model name if none is set).
    pub fn set_device_name(&self, name: impl Into<String>) {
        self.inner.info.write().set_name(name);
    }

    /// Sets the abbreviated device name.
    pub fn set_short_name(&self, short_name: impl Into<String>) {
        self.inner.info.write().set_short_name(short_name);
    }

    /// Sets the manufacturer name.
    pub fn set_manufacturer_name(&self, manufacturer: impl Into<String>) {
        self.inner.info.write().set_manufacturer(manufacturer);
    }

    /// Sets the model identifier.
    pub fn set_model_name(&self, model_name: impl Into<String>) {
        self.inner.info.write().set_model_name(model_name);
    }

    /// Sets the transport type.
    pub fn set_transport_type(&self, transport: TransportType) {
        self.inner.info.write().set_transport(transport);
    }

    /// Sets which system default roles the device may take.
    pub fn set_defaults_flags(&self, defaults: DefaultsFlags) {
        self.inner.info.write().set_defaults(defaults);
    }

    /// Sets the configuration application bundle identifier.
    pub fn set_configuration_application(&self, bundle_id: impl Into<String>) {
        self.inner
            .info
            .write()
            .set_configuration_application(bundle_id);
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Shuts the device down.
    ///
    /// Cancels the idle timer, then the periodic timer, clears all timer
    /// registrations, stops and drops every engine, and publishes
    /// [`DeviceEvent::Shutdown`]. Idempotent.
    pub async fn shutdown(&self) {
        self.inner.shutdown().await;
    }
}

impl fmt::Debug for AudioDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioDevice")
            .field("power_state", &self.power_state())
            .field("shutting_down", &self.inner.is_shutting_down())
            .finish_non_exhaustive()
    }
}
