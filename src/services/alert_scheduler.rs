/// Alert Scheduler
///
/// Debounces bad posture: a score below the threshold arms a timer, and the
/// alert fires only if the timer elapses before the score recovers.
///
/// Timers sit behind the `AlertTimer` trait. `ManualTimer` is a virtual clock
/// advanced by the caller (tests, recording replay); `TokioTimer` runs real
/// delays on the tokio runtime and reports elapsed timers over a channel.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::AlertConfig;
use crate::models::ScoreResult;

/// Handle of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Schedule-after-delay / cancel interface
pub trait AlertTimer {
    /// Start a timer; its id is reported back once `delay` has passed
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Cancel a pending timer. Unknown or elapsed ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Idle,
    ArmedWaiting,
}

pub struct AlertScheduler<T: AlertTimer> {
    timer: T,
    /// Timer pending while armed
    pending: Option<TimerId>,
    threshold: u8,
    delay: Duration,
    alerts_fired: u64,
}

impl<T: AlertTimer> AlertScheduler<T> {
    pub fn new(timer: T, config: &AlertConfig) -> Self {
        Self {
            timer,
            pending: None,
            threshold: config.bad_posture_threshold,
            delay: config.delay(),
            alerts_fired: 0,
        }
    }

    pub fn state(&self) -> AlertState {
        match self.pending {
            Some(_) => AlertState::ArmedWaiting,
            None => AlertState::Idle,
        }
    }

    pub fn alerts_fired(&self) -> u64 {
        self.alerts_fired
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Feed the latest score. Results without a score leave the state alone.
    pub fn observe(&mut self, result: &ScoreResult) -> AlertState {
        let Some(score) = result.score else {
            return self.state();
        };

        match self.pending {
            None if score < self.threshold => {
                let id = self.timer.schedule(self.delay);
                self.pending = Some(id);
                tracing::debug!(score, ?id, delay_ms = self.delay.as_millis() as u64, "Bad posture, alert armed");
            }
            Some(id) if score >= self.threshold => {
                self.timer.cancel(id);
                self.pending = None;
                tracing::debug!(score, ?id, "Posture recovered, alert disarmed");
            }
            _ => {}
        }

        self.state()
    }

    /// Timer completion; returns `true` when this fired the alert
    pub fn on_timer_elapsed(&mut self, id: TimerId) -> bool {
        if self.pending != Some(id) {
            tracing::debug!(?id, "Ignoring stale alert timer");
            return false;
        }

        self.pending = None;
        self.alerts_fired += 1;
        tracing::info!(alerts_fired = self.alerts_fired, "Bad posture alert fired");
        true
    }

    /// Cancel any pending timer and return to idle
    pub fn reset(&mut self) {
        if let Some(id) = self.pending.take() {
            self.timer.cancel(id);
            tracing::debug!(?id, "Pending alert cancelled");
        }
    }
}

/// Virtual clock timer, advanced explicitly by the caller
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now: Duration,
    next_id: u64,
    /// Deadline per pending timer
    pending: BTreeMap<TimerId, Duration>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward, returning timers that elapsed (earliest first)
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        let target = self.now + by;
        self.advance_to(target)
    }

    /// Move the clock to `now` (never backwards), returning elapsed timers
    pub fn advance_to(&mut self, now: Duration) -> Vec<TimerId> {
        self.now = self.now.max(now);

        let mut elapsed: Vec<(Duration, TimerId)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= self.now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        elapsed.sort();

        for (_, id) in &elapsed {
            self.pending.remove(id);
        }

        elapsed.into_iter().map(|(_, id)| id).collect()
    }
}

impl AlertTimer for ManualTimer {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, self.now + delay);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }
}

/// Tokio-backed timer; must be used from within a tokio runtime
pub struct TokioTimer {
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    elapsed_tx: mpsc::UnboundedSender<TimerId>,
}

impl TokioTimer {
    /// Create a timer and the receiver its elapsed ids are delivered on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (elapsed_tx, elapsed_rx) = mpsc::unbounded_channel();
        let timer = Self {
            next_id: 0,
            tasks: HashMap::new(),
            elapsed_tx,
        };
        (timer, elapsed_rx)
    }
}

impl AlertTimer for TokioTimer {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.tasks.retain(|_, handle| !handle.is_finished());

        let id = TimerId(self.next_id);
        self.next_id += 1;

        let tx = self.elapsed_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session is shutting down
            let _ = tx.send(id);
        });
        self.tasks.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
