//! Errors recorded by a run, tagged by the lifecycle phase that produced them.

use std::fmt;
use std::time::Duration;

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The one-shot initializer.
    Init,
    /// The repeated step callback and the handoff that follows it.
    Step,
    /// The one-shot finalizer.
    Finalize,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Step => "step",
            Self::Finalize => "finalize",
        })
    }
}

/// The error a run reports once its conduit has closed.
///
/// `E` is the error type of the user callbacks. A failing finalizer
/// replaces any earlier error as the reported one, but keeps the replaced
/// error reachable through [`GeneratorError::masked`].
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError<E> {
    /// The initializer failed; the step callback was never invoked.
    #[error("init callback failed: {0}")]
    Init(#[source] E),

    /// The step callback failed at `index`.
    #[error("step callback failed at index {index}: {source}")]
    Step {
        /// 0-based index of the failing step.
        index: u64,
        #[source]
        source: E,
    },

    /// The finalizer failed.
    #[error("finalize callback failed: {source}")]
    Finalize {
        #[source]
        source: E,
        /// Error recorded before the finalizer ran, if any.
        masked: Option<Box<GeneratorError<E>>>,
    },

    /// The run was cancelled before the sequence ended.
    #[error("run cancelled after {delivered} delivered values")]
    Cancelled {
        /// Values the consumer accepted before cancellation.
        delivered: u64,
    },

    /// The value produced at `index` waited longer than the handoff deadline.
    #[error("handoff of value {index} timed out after {after:?}")]
    Timeout {
        /// 0-based index of the undelivered value.
        index: u64,
        /// The configured deadline.
        after: Duration,
    },

    /// A callback panicked.
    #[error("{phase} callback panicked: {message}")]
    Panicked {
        /// Phase whose callback panicked.
        phase: Phase,
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl<E> GeneratorError<E> {
    /// Phase that produced this error.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Init(_) => Phase::Init,
            Self::Step { .. } | Self::Cancelled { .. } | Self::Timeout { .. } => Phase::Step,
            Self::Finalize { .. } => Phase::Finalize,
            Self::Panicked { phase, .. } => *phase,
        }
    }

    /// The error a failing finalizer replaced.
    #[must_use]
    pub fn masked(&self) -> Option<&GeneratorError<E>> {
        match self {
            Self::Finalize { masked, .. } => masked.as_deref(),
            _ => None,
        }
    }

    /// The earliest recorded error of the run.
    #[must_use]
    pub fn root_cause(&self) -> &GeneratorError<E> {
        let mut current = self;
        while let Some(inner) = current.masked() {
            current = inner;
        }
        current
    }

    /// The user callback error carried by this variant, if any.
    #[must_use]
    pub fn callback_error(&self) -> Option<&E> {
        match self {
            Self::Init(source) | Self::Step { source, .. } | Self::Finalize { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// Whether the run stopped because it was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Record a finalizer failure on top of `previous`.
    pub(crate) fn finalize_failed(source: E, previous: Option<Self>) -> Self {
        Self::Finalize {
            source,
            masked: previous.map(Box::new),
        }
    }
}

/// The error accessor was consulted before the run's conduit closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("run {run_id} is still active; drain it to closure before reading its error")]
pub struct RunStillActive {
    /// Id of the run that is still producing.
    pub run_id: u64,
}
