//! Single-producer/single-consumer rendezvous conduit.
//!
//! The channel has no buffer: a push completes only when the consumer
//! takes the value, so the producer is never more than one computed
//! element ahead. Dropping the [`Handoff`] closes the conduit, which is
//! the only completion signal the consumer sees.

use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};

use crate::cancel::CancellationToken;

/// Create the rendezvous channel backing one run.
pub(crate) fn conduit<T>() -> (Sender<T>, Receiver<T>) {
    crossbeam_channel::bounded(0)
}

/// Why a value could not be handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushError {
    /// The run's token was cancelled.
    Cancelled,
    /// The consumer dropped its end of the conduit.
    Disconnected,
    /// The consumer did not take the value within the deadline.
    TimedOut(Duration),
}

/// Producer end of the conduit.
pub(crate) struct Handoff<T> {
    tx: Sender<T>,
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl<T> Handoff<T> {
    pub(crate) fn new(tx: Sender<T>, cancel: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            tx,
            cancel,
            timeout,
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Block until the consumer takes `value`, the run is cancelled, or the
    /// deadline passes.
    pub(crate) fn push(&self, value: T) -> Result<(), PushError> {
        if self.cancel.is_cancelled() {
            return Err(PushError::Cancelled);
        }
        let signal = self.cancel.signal();
        match self.timeout {
            Some(limit) => select! {
                send(self.tx, value) -> sent => sent.map_err(|_| PushError::Disconnected),
                recv(signal) -> _ => Err(PushError::Cancelled),
                default(limit) => Err(PushError::TimedOut(limit)),
            },
            None => select! {
                send(self.tx, value) -> sent => sent.map_err(|_| PushError::Disconnected),
                recv(signal) -> _ => Err(PushError::Cancelled),
            },
        }
    }
}
