//! Keep-alive timer and liveness tracking
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  Keep-alive task     │
//! │  (Tokio spawn)       │
//! │                      │
//! │  Every interval:     │        ┌──────────────────┐
//! │  1. Wait for tick    │        │  LivenessClock   │
//! │  2. Run check ───────┼──────> │  last inbound ms │ <── receive task touches
//! │  3. Stop if told to  │        └──────────────────┘
//! └──────────────────────┘
//! ```
//!
//! The peer dictates the interval through its ping messages. The connection
//! treats `2 × interval` without any inbound message as a dead link.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Timestamp of the last inbound message
///
/// Stored as milliseconds since an internal epoch so it can live in an
/// atomic and be touched from the receive task without locking.
pub struct LivenessClock {
    epoch: Instant,
    last_message_ms: AtomicU64,
}

impl LivenessClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_message_ms: AtomicU64::new(0),
        }
    }

    /// Record that a message just arrived
    pub fn touch(&self) {
        let ms = self.epoch.elapsed().as_millis() as u64;
        self.last_message_ms.store(ms, Ordering::Release);
    }

    /// Time since the last recorded message (or since creation)
    pub fn since_last_message(&self) -> Duration {
        let last = self.last_message_ms.load(Ordering::Acquire);
        let now = self.epoch.elapsed().as_millis() as u64;
        Duration::from_millis(now.saturating_sub(last))
    }

    /// Whether the link has been silent for more than twice `interval`
    ///
    /// A zero interval never expires.
    pub fn is_expired(&self, interval: Duration) -> bool {
        !interval.is_zero() && self.since_last_message() > interval * 2
    }
}

impl Default for LivenessClock {
    fn default() -> Self {
        Self::new()
    }
}

struct Armed {
    interval: Duration,
    handle: JoinHandle<()>,
    shutdown_tx: Sender<()>,
}

/// Recurring timer driving the liveness check
///
/// Not synchronized on its own; the connection keeps it behind its state
/// lock so arming, re-arming and cancelling serialize with every other
/// transition.
#[derive(Default)]
pub struct KeepAliveMonitor {
    armed: Option<Armed>,
}

impl KeepAliveMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `interval`, calling `check` on each tick
    ///
    /// `check` returns `false` to stop the timer. Arming an armed monitor
    /// replaces the previous timer.
    pub fn arm<F>(&mut self, runtime: &Handle, interval: Duration, check: F)
    where
        F: Fn() -> bool + Send + 'static,
    {
        self.cancel();

        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let handle = runtime.spawn(keep_alive_task(interval, check, shutdown_rx));
        self.armed = Some(Armed {
            interval,
            handle,
            shutdown_tx,
        });
    }

    /// Re-arm with a new interval; no-op if the interval is unchanged
    ///
    /// # Returns
    /// `true` if a new timer was started
    pub fn rearm<F>(&mut self, runtime: &Handle, interval: Duration, check: F) -> bool
    where
        F: Fn() -> bool + Send + 'static,
    {
        if self.interval() == Some(interval) {
            return false;
        }
        self.arm(runtime, interval, check);
        true
    }

    /// Stop the timer if one is running
    pub fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            let _ = armed.shutdown_tx.try_send(());
            armed.handle.abort();
            debug!("Keep-alive cancelled (interval {:?})", armed.interval);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.armed.as_ref().map(|armed| armed.interval)
    }
}

impl Drop for KeepAliveMonitor {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn keep_alive_task<F>(interval: Duration, check: F, shutdown_rx: Receiver<()>)
where
    F: Fn() -> bool + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    // First tick fires immediately
    ticker.tick().await;
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    debug!("Keep-alive armed with interval {:?}", interval);

    loop {
        ticker.tick().await;

        match shutdown_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        if !check() {
            debug!("Keep-alive check asked to stop");
            break;
        }
    }
}
