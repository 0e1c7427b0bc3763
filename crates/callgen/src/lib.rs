//! callgen library: application logic for the line-streaming CLI.

pub mod app;
pub mod completion;
pub mod config;
pub mod errors;
pub mod output;
