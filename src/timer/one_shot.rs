// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot timer resource.
//!
//! Stands in for a hardware timer: it can be armed for an absolute time,
//! re-armed (replacing the previous deadline), and cancelled. The device owns
//! two of these - one multiplexed across all periodic timer events, one
//! dedicated to the idle sleep scheduler - and they are never conflated.

use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// A cancellable, re-armable one-shot timer backed by a background task.
///
/// The task sleeps until the armed deadline and runs `on_fire` once per
/// arming. Arming while a deadline is pending replaces it; cancelling clears
/// it. Dropping the resource aborts the task.
pub(crate) struct OneShot {
    deadline: watch::Sender<Option<Instant>>,
    task: JoinHandle<()>,
}

impl OneShot {
    pub(crate) fn spawn<F, Fut>(on_fire: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (deadline, mut armed) = watch::channel(None);
        let task = tokio::spawn(async move {
            loop {
                let target = *armed.borrow_and_update();
                let Some(at) = target else {
                    if armed.changed().await.is_err() {
                        break;
                    }
                    continue;
                };
                tokio::select! {
                    () = sleep_until(at) => {
                        on_fire().await;
                        // Wait for the next arming unless one raced in while
                        // the callback ran.
                        match armed.has_changed() {
                            Ok(true) => {}
                            Ok(false) => {
                                if armed.changed().await.is_err() {
                                    break;
                                }
                            }
                            Err(_) => break,
                        }
                    }
                    changed = armed.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Self { deadline, task }
    }

    /// Arms the timer for `at`, replacing any pending deadline.
    pub(crate) fn arm(&self, at: Instant) {
        self.deadline.send_replace(Some(at));
    }

    /// Clears any pending deadline without firing.
    pub(crate) fn cancel(&self) {
        self.deadline.send_replace(None);
    }
}

impl Drop for OneShot {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    fn counting_timer() -> (OneShot, Arc<AtomicU32>) {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fired);
        let timer = OneShot::spawn(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (timer, fired)
    }

    async fn run_pending_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_at_deadline() {
        let (timer, fired) = counting_timer();
        timer.arm(Instant::now() + Duration::from_millis(50));

        tokio::time::advance(Duration::from_millis(49)).await;
        run_pending_tasks().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(1)).await;
        run_pending_tasks().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // One-shot: no further firings without re-arming.
        tokio::time::advance(Duration::from_secs(5)).await;
        run_pending_tasks().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let (timer, fired) = counting_timer();
        timer.arm(Instant::now() + Duration::from_millis(50));
        timer.cancel();

        tokio::time::advance(Duration::from_secs(1)).await;
        run_pending_tasks().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_deadline() {
        let (timer, fired) = counting_timer();
        timer.arm(Instant::now() + Duration::from_millis(50));
        timer.arm(Instant::now() + Duration::from_millis(200));

        tokio::time::advance(Duration::from_millis(100)).await;
        run_pending_tasks().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(100)).await;
        run_pending_tasks().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_after_fire_runs_again() {
        let (timer, fired) = counting_timer();
        timer.arm(Instant::now() + Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(10)).await;
        run_pending_tasks().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        timer.arm(Instant::now() + Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(10)).await;
        run_pending_tasks().await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
