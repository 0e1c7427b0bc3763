//! Observer pattern for run lifecycle events.

/// Lifecycle event emitted by a run's producer thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    /// The producer thread started.
    Started {
        /// Id of the run.
        run_id: u64,
    },
    /// The initializer returned successfully.
    Initialized {
        /// Id of the run.
        run_id: u64,
    },
    /// The consumer accepted the value produced at `index`.
    Produced {
        /// Id of the run.
        run_id: u64,
        /// 0-based step index.
        index: u64,
    },
    /// The finalizer ran and the conduit is about to close.
    Finished {
        /// Id of the run.
        run_id: u64,
        /// Step callback invocations.
        steps: u64,
        /// Values accepted by the consumer.
        delivered: u64,
        /// Whether the run recorded an error.
        failed: bool,
    },
}

impl RunEvent {
    /// Id of the run that emitted this event.
    #[must_use]
    pub fn run_id(&self) -> u64 {
        match *self {
            Self::Started { run_id }
            | Self::Initialized { run_id }
            | Self::Produced { run_id, .. }
            | Self::Finished { run_id, .. } => run_id,
        }
    }
}

/// Observer trait for receiving run lifecycle events.
///
/// Called from the producer thread, so implementations must not block
/// for long: a slow observer delays the next step.
pub trait RunObserver: Send + Sync {
    /// Receive a lifecycle event.
    fn on_event(&self, event: &RunEvent);
}
