//! The generator recipe and its builder.
//!
//! A [`Generator`] bundles the step callback, the optional initializer and
//! finalizer, and the constructor parameters. It is immutable once built:
//! callbacks can only be registered on the [`GeneratorBuilder`], so no
//! registration can race with a run that has already started.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::handoff::{self, Handoff};
use crate::observer::RunObserver;
use crate::observers::NoOpObserver;
use crate::options::RunOptions;
use crate::producer::{self, FinalizeFn, InitFn, Recipe, StepFn};
use crate::run::Run;
use crate::step::Step;

/// Builder for [`Generator`].
///
/// `P` is the constructor parameter type, `S` the init result passed to
/// every step and to the finalizer, `E` the callback error type.
///
/// # Example
/// ```
/// use callgen_core::{GeneratorBuilder, Step};
///
/// let words = GeneratorBuilder::with_init("a b c".to_string(), |text: &String| {
///     Ok::<_, std::convert::Infallible>(text.split(' ').map(str::to_string).collect::<Vec<_>>())
/// })
/// .step(|i, words: &Vec<String>| match words.get(i as usize) {
///     Some(word) => Step::Produced(word.clone()),
///     None => Step::Done,
/// });
///
/// let run = words.start();
/// assert_eq!(run.collect::<Vec<_>>(), ["a", "b", "c"]);
/// ```
pub struct GeneratorBuilder<P, S, E> {
    params: P,
    init: InitFn<P, S, E>,
    finalize: Option<FinalizeFn<S, E>>,
    observer: Arc<dyn RunObserver>,
    options: RunOptions,
}

impl<P, E> GeneratorBuilder<P, P, E>
where
    P: Clone + Send + Sync + 'static,
    E: 'static,
{
    /// Builder without an initializer: every run hands its steps a clone of
    /// `params`.
    #[must_use]
    pub fn new(params: P) -> Self {
        Self::with_init(params, |params: &P| Ok(params.clone()))
    }
}

impl<P, S, E> GeneratorBuilder<P, S, E>
where
    P: Send + Sync + 'static,
    S: 'static,
    E: 'static,
{
    /// Builder whose runs call `init` once with `params` and pass its result
    /// to every step and to the finalizer.
    #[must_use]
    pub fn with_init<F>(params: P, init: F) -> Self
    where
        F: Fn(&P) -> Result<S, E> + Send + Sync + 'static,
    {
        Self {
            params,
            init: Arc::new(init),
            finalize: None,
            observer: Arc::new(NoOpObserver::new()),
            options: RunOptions::default(),
        }
    }

    /// Register the finalizer, called once per run whatever the outcome.
    ///
    /// It receives `None` when the initializer failed. An error it returns
    /// becomes the run's error; the error it replaces stays reachable
    /// through [`GeneratorError::masked`](crate::GeneratorError::masked).
    #[must_use]
    pub fn finalize<F>(mut self, finalize: F) -> Self
    where
        F: Fn(Option<&S>) -> Result<(), E> + Send + Sync + 'static,
    {
        self.finalize = Some(Arc::new(finalize));
        self
    }

    /// Register an observer for lifecycle events of every run.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set the run options.
    #[must_use]
    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = options.normalize();
        self
    }

    /// Fix the step callback and build the generator.
    #[must_use]
    pub fn step<T, F>(self, step: F) -> Generator<P, S, T, E>
    where
        F: Fn(u64, &S) -> Step<T, E> + Send + Sync + 'static,
        T: 'static,
    {
        let step: StepFn<S, T, E> = Arc::new(step);
        Generator {
            params: Arc::new(self.params),
            init: self.init,
            step,
            finalize: self.finalize,
            observer: self.observer,
            options: self.options,
            next_run_id: AtomicU64::new(0),
        }
    }
}

/// Immutable recipe for push-style lazy sequences.
///
/// Every call to [`start`](Self::start) spawns an independent run with its
/// own index counter, conduit, cancellation token, and error cell.
///
/// # Example
/// ```
/// use callgen_core::{Generator, Step};
///
/// let squares = Generator::new(
///     |i, limit: &u64| {
///         if i < *limit {
///             Step::<_, std::convert::Infallible>::Produced(i * i)
///         } else {
///             Step::Done
///         }
///     },
///     4,
/// );
///
/// let mut run = squares.start();
/// let values: Vec<u64> = run.by_ref().collect();
/// assert_eq!(values, [0, 1, 4, 9]);
/// assert!(run.error().unwrap().is_none());
/// ```
pub struct Generator<P, S, T, E> {
    params: Arc<P>,
    init: InitFn<P, S, E>,
    step: StepFn<S, T, E>,
    finalize: Option<FinalizeFn<S, E>>,
    observer: Arc<dyn RunObserver>,
    options: RunOptions,
    next_run_id: AtomicU64,
}

impl<P, T, E> Generator<P, P, T, E>
where
    P: Clone + Send + Sync + 'static,
    T: 'static,
    E: 'static,
{
    /// Generator without initializer or finalizer: steps receive `params`.
    #[must_use]
    pub fn new<F>(step: F, params: P) -> Self
    where
        F: Fn(u64, &P) -> Step<T, E> + Send + Sync + 'static,
    {
        GeneratorBuilder::new(params).step(step)
    }
}

impl<P, S, T, E> Generator<P, S, T, E>
where
    P: Send + Sync + 'static,
    S: 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Constructor parameters shared by all runs.
    #[must_use]
    pub fn params(&self) -> &P {
        &self.params
    }

    /// Options applied to every run.
    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Whether a finalizer is registered.
    #[must_use]
    pub fn has_finalizer(&self) -> bool {
        self.finalize.is_some()
    }

    /// Number of runs started so far.
    #[must_use]
    pub fn runs_started(&self) -> u64 {
        self.next_run_id.load(Ordering::Relaxed)
    }

    /// Start a new run on its own producer thread.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to create a thread, like [`std::thread::spawn`].
    /// Use [`try_start`](Self::try_start) to handle that case.
    pub fn start(&self) -> Run<T, E> {
        match self.try_start() {
            Ok(run) => run,
            Err(err) => panic!("failed to spawn producer thread: {err}"),
        }
    }

    /// Start a new run, reporting thread creation failure.
    pub fn try_start(&self) -> io::Result<Run<T, E>> {
        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let (tx, rx) = handoff::conduit();
        let handoff = Handoff::new(tx, cancel.clone(), self.options.handoff_timeout);
        let recipe = Recipe {
            params: Arc::clone(&self.params),
            init: Arc::clone(&self.init),
            step: Arc::clone(&self.step),
            finalize: self.finalize.clone(),
            observer: Arc::clone(&self.observer),
        };

        let producer = thread::Builder::new()
            .name(self.options.thread_name.clone())
            .spawn(move || producer::drive(run_id, &recipe, handoff))?;
        debug!(run_id, thread = %self.options.thread_name, "spawned producer");

        Ok(Run::new(run_id, rx, cancel, producer))
    }
}

impl<P, S, T, E> fmt::Debug for Generator<P, S, T, E>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("params", &self.params)
            .field("finalize", &self.finalize.is_some())
            .field("options", &self.options)
            .field("runs_started", &self.next_run_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
