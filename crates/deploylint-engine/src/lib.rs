//! Deploylint Engine - check execution and report generation
//!
//! This crate is the core of deploylint:
//! - `CheckExecutor`: runs an arbitrary set of independent checks under a
//!   fixed concurrency bound, with per-check retry and failure isolation
//! - `PlainReporter`: folds the result set into a single, deterministic,
//!   severity-ranked text report

pub mod executor;
pub mod reporter;

pub use executor::{CheckExecutor, ExecutorConfig};
pub use reporter::PlainReporter;
