//! End-to-end lifecycle scenarios.
//!
//! A recording callback mock drives complete runs and the assertions check
//! call counts, the arguments each callback saw, and the reported error.

use std::sync::Arc;

use parking_lot::Mutex;

use callgen_tests::{Generator, GeneratorBuilder, GeneratorError, Phase, Step};

// ---------------------------------------------------------------------------
// Callback mock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
struct MockError(&'static str);

#[derive(Default)]
struct Calls {
    init: usize,
    step: usize,
    finalize: usize,
    last_state: Option<Vec<i32>>,
}

/// Yields `true` for indices 0..5 and the sentinel afterwards, optionally
/// failing in any phase.
#[derive(Clone, Default)]
struct CallbackMock {
    calls: Arc<Mutex<Calls>>,
    init_err: Option<MockError>,
    step_err: Option<MockError>,
    finalize_err: Option<MockError>,
}

impl CallbackMock {
    fn new() -> Self {
        Self::default()
    }

    fn with_init_error(mut self, err: &'static str) -> Self {
        self.init_err = Some(MockError(err));
        self
    }

    fn with_step_error(mut self, err: &'static str) -> Self {
        self.step_err = Some(MockError(err));
        self
    }

    fn with_finalize_error(mut self, err: &'static str) -> Self {
        self.finalize_err = Some(MockError(err));
        self
    }

    fn init(&self, _: &()) -> Result<Vec<i32>, MockError> {
        self.calls.lock().init += 1;
        match &self.init_err {
            Some(err) => Err(err.clone()),
            None => Ok(vec![1, 2, 3]),
        }
    }

    fn step(&self, i: u64, state: &Vec<i32>) -> Step<bool, MockError> {
        let mut calls = self.calls.lock();
        calls.step += 1;
        calls.last_state = Some(state.clone());
        if i >= 5 {
            return Step::Done;
        }
        match &self.step_err {
            Some(err) => Step::Failed(err.clone()),
            None => Step::Produced(true),
        }
    }

    fn finalize(&self, _: Option<&Vec<i32>>) -> Result<(), MockError> {
        self.calls.lock().finalize += 1;
        match &self.finalize_err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn build(&self, with_init: bool, with_finalize: bool) -> Generator<(), Vec<i32>, bool, MockError> {
        let init = self.clone();
        let builder = if with_init {
            GeneratorBuilder::with_init((), move |p: &()| init.init(p))
        } else {
            GeneratorBuilder::with_init((), |_: &()| Ok(Vec::new()))
        };
        let builder = if with_finalize {
            let fin = self.clone();
            builder.finalize(move |state: Option<&Vec<i32>>| fin.finalize(state))
        } else {
            builder
        };
        let step = self.clone();
        builder.step(move |i, state: &Vec<i32>| step.step(i, state))
    }

    fn counts(&self) -> (usize, usize, usize) {
        let calls = self.calls.lock();
        (calls.init, calls.step, calls.finalize)
    }

    fn last_state(&self) -> Option<Vec<i32>> {
        self.calls.lock().last_state.clone()
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn no_init_iteration_works() {
    let mock = CallbackMock::new();
    let generator = mock.build(false, false);

    let mut run = generator.start();
    let values: Vec<bool> = run.by_ref().collect();

    assert_eq!(values, vec![true; 5]);
    assert!(run.error().unwrap().is_none());
    assert_eq!(mock.counts(), (0, 6, 0));
    assert_eq!(mock.last_state(), Some(Vec::new()));
}

#[test]
fn plain_generator_receives_params() {
    let generator = Generator::new(
        |i, prefix: &String| {
            if i < 2 {
                Step::<_, MockError>::Produced(format!("{prefix}{i}"))
            } else {
                Step::Done
            }
        },
        "row-".to_string(),
    );

    let values: Vec<String> = generator.start().collect();
    assert_eq!(values, ["row-0", "row-1"]);
}

#[test]
fn init_result_reaches_every_step() {
    let mock = CallbackMock::new();
    let generator = mock.build(true, false);

    let mut run = generator.start();
    assert_eq!(run.by_ref().count(), 5);

    assert!(run.error().unwrap().is_none());
    assert_eq!(mock.last_state(), Some(vec![1, 2, 3]));
    assert_eq!(mock.counts(), (1, 6, 0));
}

#[test]
fn init_error_skips_steps() {
    let mock = CallbackMock::new().with_init_error("init error");
    let generator = mock.build(true, true);

    let mut run = generator.start();
    assert_eq!(run.by_ref().count(), 0);

    let err = run.error().unwrap().unwrap();
    assert!(matches!(err, GeneratorError::Init(MockError("init error"))));
    assert_eq!(mock.counts(), (1, 0, 1));
    assert_eq!(mock.last_state(), None);
}

#[test]
fn init_and_finalize_errors_report_finalize() {
    let mock = CallbackMock::new()
        .with_init_error("init error")
        .with_finalize_error("finalize error");
    let generator = mock.build(true, true);

    let mut run = generator.start();
    assert_eq!(run.by_ref().count(), 0);

    let err = run.error().unwrap().unwrap();
    assert_eq!(err.phase(), Phase::Finalize);
    assert_eq!(err.to_string(), "finalize callback failed: finalize error");
    assert_eq!(err.root_cause().to_string(), "init callback failed: init error");
}

#[test]
fn step_error_stops_on_first_call() {
    let mock = CallbackMock::new().with_step_error("callback error");
    let generator = mock.build(true, false);

    let mut run = generator.start();
    assert_eq!(run.by_ref().count(), 0);

    let err = run.error().unwrap().unwrap();
    assert!(matches!(err, GeneratorError::Step { index: 0, .. }));
    assert_eq!(mock.last_state(), Some(vec![1, 2, 3]));
    assert_eq!(mock.counts(), (1, 1, 0));
}

#[test]
fn finalizer_runs_once_on_clean_end() {
    let mock = CallbackMock::new();
    let generator = mock.build(true, true);

    let summary = generator.start().finish().unwrap();
    assert_eq!(summary.delivered, 5);
    assert_eq!(summary.steps, 6);
    assert_eq!(mock.counts(), (1, 6, 1));
}

#[test]
fn each_start_is_an_independent_run() {
    let mock = CallbackMock::new();
    let generator = mock.build(true, true);

    let first = generator.start();
    let second = generator.start();
    let (a, b) = (first.finish().unwrap(), second.finish().unwrap());

    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.delivered, 5);
    assert_eq!(b.delivered, 5);
    assert_eq!(mock.counts(), (2, 12, 2));
}

#[test]
fn abandoned_run_still_finalizes() {
    let mock = CallbackMock::new();
    let generator = mock.build(true, true);

    let err = {
        let mut run = generator.start();
        assert_eq!(run.next(), Some(true));
        run.abort().unwrap_err()
    };

    assert!(err.is_cancelled());
    let (init, _, finalize) = mock.counts();
    assert_eq!((init, finalize), (1, 1));
}
