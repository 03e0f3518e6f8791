//! Beat clock
//!
//! Fixed-period ticker driving all game-state advancement. The clock runs
//! only between [`start`](BeatClock::start) and [`stop`](BeatClock::stop);
//! outside that window it holds no timer and consumes nothing. Stopping and
//! restarting never leaves a stale tick scheduled: `start` replaces any
//! previous ticker task, and an aborted task's receiver simply runs dry.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Fixed-period game beat ticker
pub struct BeatClock {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl BeatClock {
    /// Create a clock with the given beat period
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    /// Start ticking, replacing any previous ticker
    ///
    /// Returns the beat receiver. The first beat lands one full period after
    /// start; missed ticks are delayed rather than burst, so a stalled
    /// consumer never sees back-to-back catch-up beats.
    pub fn start(&mut self) -> mpsc::Receiver<()> {
        self.stop();

        let (tx, rx) = mpsc::channel(1);
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the immediate first tick
            interval.tick().await;

            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        }));
        rx
    }

    /// Stop ticking; no beat is delivered after this returns
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether the ticker task is live
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for BeatClock {
    fn drop(&mut self) {
        self.stop();
    }
}
