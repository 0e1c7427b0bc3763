//! Workspace-level scenario tests for the callgen generator engine.
//!
//! The tests live under `tests/`; this crate only re-exports the engine so
//! they can reach it through a single dependency.

pub use callgen_core::*;
