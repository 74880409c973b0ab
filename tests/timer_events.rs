// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for multiplexed periodic timer events, driven with the
//! paused tokio clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use audiodev::{AudioDevice, DeviceDriver, Error, PowerState, PowerTransition, TimerId};

struct NoopDriver;

impl DeviceDriver for NoopDriver {
    fn perform_power_state_change(
        &self,
        _from: PowerState,
        _to: PowerState,
    ) -> audiodev::Result<PowerTransition> {
        Ok(PowerTransition::Complete)
    }
}

async fn build_device() -> AudioDevice {
    AudioDevice::builder(NoopDriver).build().await.unwrap()
}

fn counter() -> (Arc<AtomicU32>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicU32::new(0));
    let callback = {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };
    (count, callback)
}

/// Lets the timer task observe expired deadlines and dispatch.
async fn run_pending_tasks() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

async fn advance(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    run_pending_tasks().await;
}

// Scenario: a single 100ms registration fires at t=100, t=200, ... with the
// cadence anchored to the registration time.
#[tokio::test(start_paused = true)]
async fn single_registration_fires_on_its_interval() {
    let device = build_device().await;
    let (count, callback) = counter();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(100), callback)
        .await
        .unwrap();

    advance(99).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    advance(1).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    advance(100).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

// Scenario: T1 at 100ms registered at t=0, T2 at 30ms registered at t=10.
// The shared timer is pulled in to t=30 - derived from the t=0 anchor, not
// t=40 - and every registered callback fires on each tick.
#[tokio::test(start_paused = true)]
async fn shorter_registration_pulls_fire_time_forward() {
    let device = build_device().await;
    let (count1, callback1) = counter();
    let (count2, callback2) = counter();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(100), callback1)
        .await
        .unwrap();

    advance(10).await;
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(30), callback2)
        .await
        .unwrap();

    advance(19).await; // t=29
    assert_eq!(count1.load(Ordering::SeqCst), 0);
    assert_eq!(count2.load(Ordering::SeqCst), 0);

    advance(1).await; // t=30
    assert_eq!(count1.load(Ordering::SeqCst), 1);
    assert_eq!(count2.load(Ordering::SeqCst), 1);

    advance(30).await; // t=60
    assert_eq!(count2.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn removing_minimum_registration_stretches_cadence() {
    let device = build_device().await;
    let (count_fast, fast_callback) = counter();
    let (count_slow, slow_callback) = counter();
    let fast = TimerId::new();
    device
        .add_timer_event(fast, Duration::from_millis(30), fast_callback)
        .await
        .unwrap();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(100), slow_callback)
        .await
        .unwrap();

    advance(30).await; // t=30: both fire, anchor moves to 30
    assert_eq!(count_fast.load(Ordering::SeqCst), 1);
    assert_eq!(count_slow.load(Ordering::SeqCst), 1);

    // Removing the 30ms registration re-anchors the next fire to
    // anchor + 100 = t=130.
    device.remove_timer_event(fast).await;

    advance(70).await; // t=100
    assert_eq!(count_slow.load(Ordering::SeqCst), 1);

    advance(30).await; // t=130
    assert_eq!(count_fast.load(Ordering::SeqCst), 1);
    assert_eq!(count_slow.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn removing_last_registration_cancels_the_timer() {
    let device = build_device().await;
    let (count, callback) = counter();
    let id = TimerId::new();
    device
        .add_timer_event(id, Duration::from_millis(50), callback)
        .await
        .unwrap();
    device.remove_timer_event(id).await;
    assert_eq!(device.timer_event_count().await, 0);

    advance(1_000).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn removing_unknown_id_is_a_noop() {
    let device = build_device().await;
    let (count, callback) = counter();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(50), callback)
        .await
        .unwrap();

    device.remove_timer_event(TimerId::new()).await;
    assert_eq!(device.timer_event_count().await, 1);

    advance(50).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_rejected() {
    let device = build_device().await;
    let err = device
        .add_timer_event(TimerId::new(), Duration::ZERO, || {})
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(device.timer_event_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn reregistering_an_id_replaces_its_slot() {
    let device = build_device().await;
    let (old_count, old_callback) = counter();
    let (new_count, new_callback) = counter();
    let id = TimerId::new();
    device
        .add_timer_event(id, Duration::from_millis(100), old_callback)
        .await
        .unwrap();
    device
        .add_timer_event(id, Duration::from_millis(50), new_callback)
        .await
        .unwrap();
    assert_eq!(device.timer_event_count().await, 1);

    advance(50).await;
    assert_eq!(old_count.load(Ordering::SeqCst), 0);
    assert_eq!(new_count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn clear_timer_events_removes_everything() {
    let device = build_device().await;
    let (count, callback) = counter();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(20), callback)
        .await
        .unwrap();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(40), || {})
        .await
        .unwrap();

    device.clear_timer_events().await;
    assert_eq!(device.timer_event_count().await, 0);

    advance(500).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

// Dispatch is suspended while the device sleeps; waking force-fires every
// callback once and restarts the cadence from the wake time.
#[tokio::test(start_paused = true)]
async fn sleep_suspends_dispatch_and_wake_resyncs() {
    let device = build_device().await;
    let (count, callback) = counter();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(100), callback)
        .await
        .unwrap();

    advance(100).await; // t=100: first fire
    assert_eq!(count.load(Ordering::SeqCst), 1);

    device.set_power_state(0).await.unwrap();
    assert_eq!(device.power_state(), PowerState::Sleep);

    // The pending t=200 firing hits the sleep check and the timer goes
    // dormant; nothing fires for as long as the device sleeps.
    advance(500).await; // t=600
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Wake: the anchor rewinds one interval, so the callback fires once
    // within the completion itself.
    device.set_power_state(1).await.unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);

    // Cadence restarts relative to the wake time.
    advance(99).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
    advance(1).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn registrations_made_while_asleep_fire_after_wake() {
    let device = build_device().await;
    device.set_power_state(0).await.unwrap();

    let (count, callback) = counter();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(50), callback)
        .await
        .unwrap();

    advance(200).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    device.set_power_state(1).await.unwrap();
    // The wake path force-dispatches pending callbacks once.
    assert_eq!(count.load(Ordering::SeqCst), 1);

    advance(50).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_periodic_dispatch() {
    let device = build_device().await;
    let (count, callback) = counter();
    device
        .add_timer_event(TimerId::new(), Duration::from_millis(50), callback)
        .await
        .unwrap();

    device.shutdown().await;
    assert_eq!(device.timer_event_count().await, 0);

    advance(500).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
