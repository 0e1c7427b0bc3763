//! Consumer handle for one run of a generator.

use std::fmt;
use std::iter::FusedIterator;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::{GeneratorError, Phase, RunStillActive};
use crate::producer::{panic_message, RunReport};

/// Totals of a run that completed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Id of the run within its generator.
    pub run_id: u64,
    /// Step callback invocations, including the terminating one.
    pub steps: u64,
    /// Values delivered to the consumer.
    pub delivered: u64,
}

/// Read side of a run.
///
/// Iterate it to receive values in step order; iteration ends when the
/// producer closes the conduit. Only then does [`error`](Self::error)
/// report how the run ended. Dropping an unfinished run cancels it.
pub struct Run<T, E> {
    id: u64,
    rx: Receiver<T>,
    cancel: CancellationToken,
    producer: Option<JoinHandle<RunReport<E>>>,
    delivered: u64,
    outcome: Option<Outcome<E>>,
}

struct Outcome<E> {
    steps: u64,
    error: Option<GeneratorError<E>>,
}

impl<T, E> Run<T, E> {
    pub(crate) fn new(
        id: u64,
        rx: Receiver<T>,
        cancel: CancellationToken,
        producer: JoinHandle<RunReport<E>>,
    ) -> Self {
        Self {
            id,
            rx,
            cancel,
            producer: Some(producer),
            delivered: 0,
            outcome: None,
        }
    }

    /// Id of this run within its generator, starting at 0.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Ask the producer to stop. The conduit closes once the step in
    /// progress (if any) returns and the finalizer has run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run, for use from another thread.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the conduit has closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outcome.is_some()
    }

    /// Values received so far.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Step callback invocations, once the run has closed.
    #[must_use]
    pub fn steps(&self) -> Option<u64> {
        self.outcome.as_ref().map(|outcome| outcome.steps)
    }

    /// The run's recorded error.
    ///
    /// `Ok(None)` means the sequence ended cleanly. Fails with
    /// [`RunStillActive`] until iteration has observed closure.
    pub fn error(&self) -> Result<Option<&GeneratorError<E>>, RunStillActive> {
        self.outcome
            .as_ref()
            .map(|outcome| outcome.error.as_ref())
            .ok_or(RunStillActive { run_id: self.id })
    }

    /// Drain the run to closure, discarding remaining values, and report
    /// how it ended.
    ///
    /// This waits for the sequence to end on its own; call
    /// [`cancel`](Self::cancel) first (or use [`abort`](Self::abort)) for
    /// unbounded sources.
    pub fn finish(mut self) -> Result<RunSummary, GeneratorError<E>> {
        for _ in self.by_ref() {}
        let (steps, error) = match self.outcome.as_mut() {
            Some(outcome) => (outcome.steps, outcome.error.take()),
            None => (0, None),
        };
        match error {
            Some(err) => Err(err),
            None => Ok(RunSummary {
                run_id: self.id,
                steps,
                delivered: self.delivered,
            }),
        }
    }

    /// Cancel the run and wait for it to close.
    pub fn abort(self) -> Result<RunSummary, GeneratorError<E>> {
        self.cancel();
        self.finish()
    }

    fn close(&mut self) {
        let outcome = match self.producer.take().map(JoinHandle::join) {
            Some(Ok(report)) => Outcome {
                steps: report.steps,
                error: report.error,
            },
            Some(Err(payload)) => Outcome {
                steps: 0,
                error: Some(GeneratorError::Panicked {
                    phase: Phase::Step,
                    message: panic_message(payload.as_ref()),
                }),
            },
            None => Outcome {
                steps: 0,
                error: None,
            },
        };
        debug!(
            run_id = self.id,
            delivered = self.delivered,
            failed = outcome.error.is_some(),
            "run closed"
        );
        self.outcome = Some(outcome);
    }
}

impl<T, E> Iterator for Run<T, E> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.outcome.is_some() {
            return None;
        }
        if let Ok(value) = self.rx.recv() {
            self.delivered += 1;
            Some(value)
        } else {
            self.close();
            None
        }
    }
}

impl<T, E> FusedIterator for Run<T, E> {}

impl<T, E> Drop for Run<T, E> {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            debug!(run_id = self.id, "run dropped before closure, cancelling");
            self.cancel.cancel();
        }
    }
}

impl<T, E> fmt::Debug for Run<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("id", &self.id)
            .field("delivered", &self.delivered)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
