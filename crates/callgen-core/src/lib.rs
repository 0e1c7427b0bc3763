//! # callgen-core
//!
//! Push-style lazy sequences. A [`Generator`] bundles a step callback with
//! an optional one-shot initializer and finalizer; every
//! [`start`](Generator::start) spawns a producer thread that drives those
//! callbacks and hands values one at a time to the returned [`Run`], which
//! the caller consumes as a plain iterator.
//!
//! ```
//! use callgen_core::{Generator, Step};
//!
//! let evens = Generator::new(
//!     |i, limit: &u64| {
//!         if i < *limit {
//!             Step::<_, std::convert::Infallible>::Produced(i * 2)
//!         } else {
//!             Step::Done
//!         }
//!     },
//!     3,
//! );
//!
//! let mut run = evens.start();
//! assert_eq!(run.by_ref().collect::<Vec<_>>(), [0, 2, 4]);
//! assert!(run.error().unwrap().is_none());
//! ```

pub mod cancel;
pub mod constants;
pub mod error;
pub mod generator;
pub(crate) mod handoff;
pub mod observer;
pub mod observers;
pub mod options;
pub(crate) mod producer;
pub mod run;
pub mod sources;
pub mod step;

// Re-exports
pub use cancel::CancellationToken;
pub use constants::exit_codes;
pub use error::{GeneratorError, Phase, RunStillActive};
pub use generator::{Generator, GeneratorBuilder};
pub use observer::{RunEvent, RunObserver};
pub use observers::{CountingObserver, LoggingObserver, NoOpObserver};
pub use options::RunOptions;
pub use run::{Run, RunSummary};
pub use step::Step;
