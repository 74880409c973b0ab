// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registration table for multiplexed periodic timer events.
//!
//! The table owns the bookkeeping for the shared timer resource: which
//! callbacks exist, the cached minimum interval, and the `last_fire` anchor
//! from which the next absolute fire time is derived. Next fire is always
//! `last_fire + minimum_interval` rather than `now + minimum_interval`, so
//! irregular wakeups do not accumulate phase drift.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::timer::TimerId;

/// Callback invoked on every shared-timer tick.
pub(crate) type TimerCallback = Arc<dyn Fn() + Send + Sync>;

/// What the caller must do to the underlying timer after a table mutation.
#[derive(Clone, Copy)]
pub(crate) enum Rearm {
    /// Arm (or re-arm) the timer for this absolute time.
    At(Instant),
    /// No registrations remain; cancel the timer.
    Cancel,
    /// The scheduled fire time is still correct.
    Unchanged,
}

struct Registration {
    interval: Duration,
    callback: TimerCallback,
}

pub(crate) struct TimerTable {
    events: HashMap<TimerId, Registration>,
    /// Cached minimum of all registered intervals; meaningless when empty.
    minimum_interval: Duration,
    /// Anchor of the last real dispatch.
    last_fire: Instant,
}

impl TimerTable {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            events: HashMap::new(),
            minimum_interval: Duration::ZERO,
            last_fire: now,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn minimum_interval(&self) -> Duration {
        self.minimum_interval
    }

    #[cfg(test)]
    pub(crate) fn last_fire(&self) -> Instant {
        self.last_fire
    }

    /// Inserts or replaces the registration for `id`.
    ///
    /// Replacement keeps the slot but may invalidate the cached minimum; a
    /// shorter interval may pull the next fire time forward. The `last_fire`
    /// anchor is never touched here, preserving phase for callbacks that were
    /// already registered.
    pub(crate) fn register(
        &mut self,
        now: Instant,
        id: TimerId,
        interval: Duration,
        callback: TimerCallback,
    ) -> Rearm {
        let registration = Registration { interval, callback };

        if self.events.is_empty() {
            self.events.insert(id, registration);
            self.minimum_interval = interval;
            self.last_fire = now;
            return Rearm::At(now + interval);
        }

        let prior = self.events.insert(id, registration);
        if let Some(prior) = prior {
            if prior.interval <= self.minimum_interval && interval > prior.interval {
                // The replaced entry could have defined the minimum.
                self.minimum_interval = self.scan_minimum();
                return Rearm::At(self.last_fire + self.minimum_interval);
            }
        }

        if interval < self.minimum_interval {
            // Pull the next fire time in. The new deadline derives from the
            // anchor, not from now, so existing callbacks keep their phase;
            // a deadline already in the past fires immediately as catch-up.
            self.minimum_interval = interval;
            return Rearm::At(self.last_fire + interval);
        }

        Rearm::Unchanged
    }

    /// Removes the registration for `id`; unknown ids are a no-op.
    pub(crate) fn unregister(&mut self, id: TimerId) -> Rearm {
        let Some(removed) = self.events.remove(&id) else {
            return Rearm::Unchanged;
        };

        if self.events.is_empty() {
            return Rearm::Cancel;
        }

        if removed.interval <= self.minimum_interval {
            // Conservative: another entry may share the removed minimum, but
            // a full rescan is always correct and never serves a stale,
            // too-large interval.
            self.minimum_interval = self.scan_minimum();
            return Rearm::At(self.last_fire + self.minimum_interval);
        }

        Rearm::Unchanged
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    /// Snapshots every registered callback for one dispatch round.
    ///
    /// Iteration order of the underlying map is unspecified, and so is
    /// dispatch order among simultaneously-due callbacks.
    pub(crate) fn callbacks(&self) -> Vec<TimerCallback> {
        self.events
            .values()
            .map(|registration| Arc::clone(&registration.callback))
            .collect()
    }

    /// Advances the anchor by one tick and returns the next fire time.
    ///
    /// `step` is the minimum interval captured when the dispatch round began;
    /// the next fire time uses the current minimum.
    pub(crate) fn advance(&mut self, step: Duration) -> Instant {
        self.last_fire += step;
        self.last_fire + self.minimum_interval
    }

    /// Rewinds the anchor to one interval before `now`.
    ///
    /// Used on wake so that every callback is due immediately on the first
    /// post-wake dispatch.
    pub(crate) fn reset_anchor(&mut self, now: Instant) {
        self.last_fire = now.checked_sub(self.minimum_interval).unwrap_or(now);
    }

    fn scan_minimum(&self) -> Duration {
        self.events
            .values()
            .map(|registration| registration.interval)
            .min()
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn noop() -> TimerCallback {
        Arc::new(|| {})
    }

    fn assert_armed_at(rearm: Rearm, expected: Instant) {
        match rearm {
            Rearm::At(at) => assert_eq!(at, expected),
            Rearm::Cancel => panic!("expected re-arm, got cancel"),
            Rearm::Unchanged => panic!("expected re-arm, got unchanged"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_registration_arms_and_anchors() {
        let now = Instant::now();
        let mut table = TimerTable::new(now);

        let rearm = table.register(now, TimerId::new(), ms(100), noop());
        assert_armed_at(rearm, now + ms(100));
        assert_eq!(table.minimum_interval(), ms(100));
        assert_eq!(table.last_fire(), now);
    }

    #[tokio::test(start_paused = true)]
    async fn shorter_interval_pulls_fire_time_in_from_anchor() {
        let start = Instant::now();
        let mut table = TimerTable::new(start);
        table.register(start, TimerId::new(), ms(100), noop());

        // 10ms later a 30ms registration arrives; the next fire moves to
        // t=30, computed from the t=0 anchor rather than from now (t=40).
        let later = start + ms(10);
        let rearm = table.register(later, TimerId::new(), ms(30), noop());
        assert_armed_at(rearm, start + ms(30));
        assert_eq!(table.minimum_interval(), ms(30));
        assert_eq!(table.last_fire(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn pull_in_past_deadline_fires_as_catch_up() {
        let start = Instant::now();
        let mut table = TimerTable::new(start);
        table.register(start, TimerId::new(), ms(100), noop());

        // At t=95 a 90ms registration arrives: the anchor-derived deadline
        // t=90 has already passed, so the timer is re-armed into the past
        // and the resource fires immediately to catch up.
        let later = start + ms(95);
        let rearm = table.register(later, TimerId::new(), ms(90), noop());
        assert_armed_at(rearm, start + ms(90));
        assert_eq!(table.minimum_interval(), ms(90));
    }

    #[tokio::test(start_paused = true)]
    async fn longer_interval_does_not_change_minimum() {
        let now = Instant::now();
        let mut table = TimerTable::new(now);
        table.register(now, TimerId::new(), ms(50), noop());

        let rearm = table.register(now, TimerId::new(), ms(200), noop());
        assert!(matches!(rearm, Rearm::Unchanged));
        assert_eq!(table.minimum_interval(), ms(50));
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_minimum_with_larger_interval_rescans() {
        let now = Instant::now();
        let mut table = TimerTable::new(now);
        let id = TimerId::new();
        table.register(now, id, ms(50), noop());
        table.register(now, TimerId::new(), ms(100), noop());

        let rearm = table.register(now + ms(10), id, ms(300), noop());
        assert_armed_at(rearm, now + ms(100));
        assert_eq!(table.minimum_interval(), ms(100));
        assert_eq!(table.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_keeps_slot_not_list_semantics() {
        let now = Instant::now();
        let mut table = TimerTable::new(now);
        let id = TimerId::new();
        table.register(now, id, ms(50), noop());
        table.register(now, id, ms(50), noop());
        assert_eq!(table.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unregister_minimum_rescans_from_anchor() {
        let start = Instant::now();
        let mut table = TimerTable::new(start);
        let short = TimerId::new();
        table.register(start, short, ms(30), noop());
        table.register(start, TimerId::new(), ms(100), noop());

        // One dispatch has happened; the anchor sits at t=30.
        table.advance(ms(30));

        let rearm = table.unregister(short);
        assert_armed_at(rearm, start + ms(30) + ms(100));
        assert_eq!(table.minimum_interval(), ms(100));
    }

    #[tokio::test(start_paused = true)]
    async fn unregister_last_cancels() {
        let now = Instant::now();
        let mut table = TimerTable::new(now);
        let id = TimerId::new();
        table.register(now, id, ms(30), noop());

        assert!(matches!(table.unregister(id), Rearm::Cancel));
        assert!(table.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unregister_unknown_is_noop() {
        let now = Instant::now();
        let mut table = TimerTable::new(now);
        table.register(now, TimerId::new(), ms(30), noop());

        assert!(matches!(table.unregister(TimerId::new()), Rearm::Unchanged));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn minimum_tracks_true_minimum_across_sequences() {
        let now = Instant::now();
        let mut table = TimerTable::new(now);
        let a = TimerId::new();
        let b = TimerId::new();
        let c = TimerId::new();

        table.register(now, a, ms(120), noop());
        table.register(now, b, ms(40), noop());
        table.register(now, c, ms(80), noop());
        assert_eq!(table.minimum_interval(), ms(40));

        table.unregister(b);
        assert_eq!(table.minimum_interval(), ms(80));

        table.register(now, b, ms(200), noop());
        assert_eq!(table.minimum_interval(), ms(80));

        table.unregister(c);
        assert_eq!(table.minimum_interval(), ms(120));

        table.register(now, a, ms(60), noop());
        assert_eq!(table.minimum_interval(), ms(60));
    }

    #[tokio::test(start_paused = true)]
    async fn advance_moves_anchor_by_entry_step() {
        let start = Instant::now();
        let mut table = TimerTable::new(start);
        table.register(start, TimerId::new(), ms(100), noop());

        let next = table.advance(ms(100));
        assert_eq!(table.last_fire(), start + ms(100));
        assert_eq!(next, start + ms(200));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_anchor_makes_all_callbacks_due() {
        let start = Instant::now();
        let mut table = TimerTable::new(start);
        table.register(start, TimerId::new(), ms(100), noop());

        tokio::time::advance(ms(500)).await;
        let now = Instant::now();
        table.reset_anchor(now);

        // The next advance lands exactly on "now".
        let next = table.advance(ms(100));
        assert_eq!(next, now + ms(100));
        assert_eq!(table.last_fire(), now);
    }

    #[tokio::test(start_paused = true)]
    async fn callbacks_snapshot_covers_every_registration() {
        let now = Instant::now();
        let mut table = TimerTable::new(now);
        table.register(now, TimerId::new(), ms(10), noop());
        table.register(now, TimerId::new(), ms(20), noop());
        table.register(now, TimerId::new(), ms(30), noop());

        assert_eq!(table.callbacks().len(), 3);
    }
}
