//! Per-generator run options.

use std::time::Duration;

use crate::constants::DEFAULT_THREAD_NAME;

/// Options applied to every run started from a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Longest time a produced value may wait for the consumer.
    /// `None` waits indefinitely.
    pub handoff_timeout: Option<Duration>,
    /// Name of the producer thread.
    pub thread_name: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            handoff_timeout: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl RunOptions {
    /// Set the handoff deadline.
    #[must_use]
    pub fn with_handoff_timeout(mut self, timeout: Duration) -> Self {
        self.handoff_timeout = Some(timeout);
        self
    }

    /// Set the producer thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Normalize options, applying defaults where values are empty.
    ///
    /// A zero handoff timeout would fail every push, so it is treated as
    /// "no deadline".
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.thread_name.trim().is_empty() {
            self.thread_name = DEFAULT_THREAD_NAME.to_string();
        }
        if self.handoff_timeout == Some(Duration::ZERO) {
            self.handoff_timeout = None;
        }
        self
    }
}
