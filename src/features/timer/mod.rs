//! # Feature: Elapsed Timer
//!
//! Emits one integer tick per second while a request is in flight, so the
//! front end can show how long the user has been waiting. The first tick
//! (value 0) lands one full second after start; stopping inside that first
//! second observes no ticks at all.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("a timer is already running for this orchestration")]
    AlreadyRunning,
}

/// Stop control for one timer run. Cloneable; all clones refer to the
/// same run.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    stopped: Arc<AtomicBool>,
}

impl TimerHandle {
    pub(crate) fn same_as(&self, other: &TimerHandle) -> bool {
        Arc::ptr_eq(&self.stopped, &other.stopped)
    }
}

/// At-most-one-at-a-time per-second tick source.
///
/// The orchestrator's at-most-one-pending rule means [`ElapsedTimer::start`]
/// should never see a second concurrent run; the `AlreadyRunning` error is a
/// defensive invariant check, not an expected path.
#[derive(Debug, Default)]
pub struct ElapsedTimer {
    running: Arc<AtomicBool>,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin emitting ticks 0, 1, 2, … into `ticks`, one per second, until
    /// stopped or the receiver is dropped.
    pub fn start(&self, ticks: mpsc::UnboundedSender<u64>) -> Result<TimerHandle, TimerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(TimerError::AlreadyRunning);
        }

        let stopped = Arc::new(AtomicBool::new(false));
        let handle = TimerHandle {
            stopped: Arc::clone(&stopped),
        };
        let running = Arc::clone(&self.running);

        tokio::spawn(async move {
            let mut tick: u64 = 0;
            loop {
                sleep(Duration::from_secs(1)).await;
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                if ticks.send(tick).is_err() {
                    break;
                }
                tick += 1;
            }
            // Release the running slot unless stop() already did.
            if !stopped.swap(true, Ordering::SeqCst) {
                running.store(false, Ordering::SeqCst);
            }
        });

        Ok(handle)
    }

    /// Stop a run. Idempotent: a second stop (or stopping a run that already
    /// wound down on its own) is a no-op. The running slot is released
    /// immediately, so a new `start` may follow without waiting for the tick
    /// task to wake.
    pub fn stop(&self, handle: &TimerHandle) {
        if !handle.stopped.swap(true, Ordering::SeqCst) {
            self.running.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_count_up_from_zero_once_per_second() {
        let timer = ElapsedTimer::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = timer.start(tx).unwrap();

        assert_eq!(rx.recv().await, Some(0));
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));

        timer.stop(&handle);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_first_tick_emits_nothing() {
        let timer = ElapsedTimer::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = timer.start(tx).unwrap();

        timer.stop(&handle);

        // The tick task wakes at the 1s mark, sees the stop, and drops the
        // sender without emitting.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_while_running_is_rejected() {
        let timer = ElapsedTimer::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let _handle = timer.start(tx).unwrap();

        let (tx2, _rx2) = mpsc::unbounded_channel();
        assert_eq!(timer.start(tx2).unwrap_err(), TimerError::AlreadyRunning);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_frees_the_slot_immediately() {
        let timer = ElapsedTimer::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = timer.start(tx).unwrap();

        timer.stop(&handle);
        timer.stop(&handle);

        // A fresh run may start right away, before the old task wakes.
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let handle2 = timer.start(tx2).unwrap();
        assert_eq!(rx2.recv().await, Some(0));
        timer.stop(&handle2);
    }
}
