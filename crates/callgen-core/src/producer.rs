//! The producer loop that drives one run to completion.
//!
//! Runs on the run's background thread: initializer once, step callback
//! for indices 0, 1, 2, ... until it reports `Done` or `Failed` (or the
//! run is cancelled), finalizer once, then the conduit closes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, debug_span, warn};

use crate::error::{GeneratorError, Phase};
use crate::handoff::{Handoff, PushError};
use crate::observer::{RunEvent, RunObserver};
use crate::step::Step;

pub(crate) type InitFn<P, S, E> = Arc<dyn Fn(&P) -> Result<S, E> + Send + Sync>;
pub(crate) type StepFn<S, T, E> = Arc<dyn Fn(u64, &S) -> Step<T, E> + Send + Sync>;
pub(crate) type FinalizeFn<S, E> = Arc<dyn Fn(Option<&S>) -> Result<(), E> + Send + Sync>;

/// Everything a producer thread needs, cloned out of the generator.
pub(crate) struct Recipe<P, S, T, E> {
    pub(crate) params: Arc<P>,
    pub(crate) init: InitFn<P, S, E>,
    pub(crate) step: StepFn<S, T, E>,
    pub(crate) finalize: Option<FinalizeFn<S, E>>,
    pub(crate) observer: Arc<dyn RunObserver>,
}

/// What the producer hands back when its thread exits.
#[derive(Debug)]
pub(crate) struct RunReport<E> {
    /// Step callback invocations.
    pub(crate) steps: u64,
    /// Values the consumer accepted.
    pub(crate) delivered: u64,
    pub(crate) error: Option<GeneratorError<E>>,
}

/// Drive one run. Consumes `handoff`, so the conduit is closed on return.
pub(crate) fn drive<P, S, T, E>(
    run_id: u64,
    recipe: &Recipe<P, S, T, E>,
    handoff: Handoff<T>,
) -> RunReport<E> {
    let span = debug_span!("run", run_id);
    let _entered = span.enter();
    notify(recipe.observer.as_ref(), &RunEvent::Started { run_id });

    let mut report = RunReport {
        steps: 0,
        delivered: 0,
        error: None,
    };

    let state = match guarded(Phase::Init, || (recipe.init)(recipe.params.as_ref())) {
        Ok(Ok(state)) => {
            debug!("initializer completed");
            notify(recipe.observer.as_ref(), &RunEvent::Initialized { run_id });
            Some(state)
        }
        Ok(Err(source)) => {
            warn!("initializer failed, skipping steps");
            report.error = Some(GeneratorError::Init(source));
            None
        }
        Err(panicked) => {
            warn!("initializer panicked, skipping steps");
            report.error = Some(panicked);
            None
        }
    };

    if let Some(state) = &state {
        stream(run_id, recipe, state, &handoff, &mut report);
    }

    if let Some(finalize) = &recipe.finalize {
        match guarded(Phase::Finalize, || finalize(state.as_ref())) {
            Ok(Ok(())) => debug!("finalizer completed"),
            Ok(Err(source)) => {
                warn!(masked = report.error.is_some(), "finalizer failed");
                report.error = Some(GeneratorError::finalize_failed(source, report.error.take()));
            }
            Err(panicked) => {
                warn!("finalizer panicked");
                report.error = Some(panicked);
            }
        }
    }
    drop(state);

    let failed = report.error.is_some();
    notify(
        recipe.observer.as_ref(),
        &RunEvent::Finished {
            run_id,
            steps: report.steps,
            delivered: report.delivered,
            failed,
        },
    );
    debug!(
        steps = report.steps,
        delivered = report.delivered,
        failed,
        "closing conduit"
    );
    drop(handoff);
    report
}

/// Invoke the step callback with increasing indices until the run ends.
fn stream<P, S, T, E>(
    run_id: u64,
    recipe: &Recipe<P, S, T, E>,
    state: &S,
    handoff: &Handoff<T>,
    report: &mut RunReport<E>,
) {
    let mut index = 0u64;
    loop {
        if handoff.is_cancelled() {
            debug!(index, "cancelled before step");
            report.error = Some(GeneratorError::Cancelled {
                delivered: report.delivered,
            });
            return;
        }

        report.steps += 1;
        let outcome = match guarded(Phase::Step, || (recipe.step)(index, state)) {
            Ok(outcome) => outcome,
            Err(panicked) => {
                warn!(index, "step panicked");
                report.error = Some(panicked);
                return;
            }
        };

        match outcome {
            Step::Produced(value) => match handoff.push(value) {
                Ok(()) => {
                    report.delivered += 1;
                    notify(recipe.observer.as_ref(), &RunEvent::Produced { run_id, index });
                }
                Err(PushError::Cancelled | PushError::Disconnected) => {
                    debug!(index, "consumer gone or run cancelled during handoff");
                    report.error = Some(GeneratorError::Cancelled {
                        delivered: report.delivered,
                    });
                    return;
                }
                Err(PushError::TimedOut(after)) => {
                    warn!(index, ?after, "handoff deadline expired");
                    report.error = Some(GeneratorError::Timeout { index, after });
                    return;
                }
            },
            Step::Done => {
                debug!(steps = report.steps, "sequence exhausted");
                return;
            }
            Step::Failed(source) => {
                warn!(index, "step failed");
                report.error = Some(GeneratorError::Step { index, source });
                return;
            }
        }
        index += 1;
    }
}

/// Deliver `event` to the observer. A panicking observer loses the event
/// but never the run.
fn notify(observer: &dyn RunObserver, event: &RunEvent) {
    if panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event))).is_err() {
        warn!(?event, "observer panicked, event dropped");
    }
}

/// Run a callback, turning a panic into a `Panicked` error for `phase`.
fn guarded<R, E>(phase: Phase, f: impl FnOnce() -> R) -> Result<R, GeneratorError<E>> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| GeneratorError::Panicked {
        phase,
        message: panic_message(payload.as_ref()),
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
