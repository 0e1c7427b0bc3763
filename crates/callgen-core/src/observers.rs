//! Concrete observer implementations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::{debug, info};

use crate::constants::DEFAULT_LOG_INTERVAL_MS;
use crate::observer::{RunEvent, RunObserver};

/// Observer that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl NoOpObserver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RunObserver for NoOpObserver {
    fn on_event(&self, _event: &RunEvent) {}
}

/// Observer that counts events across all runs of a generator.
#[derive(Debug, Default)]
pub struct CountingObserver {
    started: AtomicU64,
    initialized: AtomicU64,
    produced: AtomicU64,
    finished: AtomicU64,
    failed: AtomicU64,
}

impl CountingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs whose producer thread started.
    #[must_use]
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Runs whose initializer succeeded.
    #[must_use]
    pub fn initialized(&self) -> u64 {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Values delivered to consumers.
    #[must_use]
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    /// Runs that reached finalization.
    #[must_use]
    pub fn finished(&self) -> u64 {
        self.finished.load(Ordering::Relaxed)
    }

    /// Finished runs that recorded an error.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

impl RunObserver for CountingObserver {
    fn on_event(&self, event: &RunEvent) {
        let counter = match event {
            RunEvent::Started { .. } => &self.started,
            RunEvent::Initialized { .. } => &self.initialized,
            RunEvent::Produced { .. } => &self.produced,
            RunEvent::Finished { failed, .. } => {
                if *failed {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                }
                &self.finished
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Observer that logs events, throttling `Produced` lines in time.
pub struct LoggingObserver {
    origin: Instant,
    min_interval_ms: u64,
    last_time: AtomicU64,
}

impl LoggingObserver {
    /// Create a new logging observer with the given minimum interval.
    #[must_use]
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            origin: Instant::now(),
            min_interval_ms,
            last_time: AtomicU64::new(0),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL_MS)
    }
}

impl RunObserver for LoggingObserver {
    fn on_event(&self, event: &RunEvent) {
        match *event {
            RunEvent::Started { run_id } => debug!(run_id, "run started"),
            RunEvent::Initialized { run_id } => debug!(run_id, "run initialized"),
            RunEvent::Produced { run_id, index } => {
                let now = self.elapsed_ms();
                let last = self.last_time.load(Ordering::Relaxed);
                if index > 0 && now.saturating_sub(last) < self.min_interval_ms {
                    return;
                }
                self.last_time.store(now, Ordering::Relaxed);
                info!(run_id, index, "value delivered");
            }
            RunEvent::Finished {
                run_id,
                steps,
                delivered,
                failed,
            } => info!(run_id, steps, delivered, failed, "run finished"),
        }
    }
}
