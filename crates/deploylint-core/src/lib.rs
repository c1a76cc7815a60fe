//! Deploylint Core - Foundation types, traits, and error handling
//!
//! This crate provides the core abstractions used throughout deploylint:
//! - `Check`: the trait every audit check implements
//! - `CheckResult`: the verdict a check produces
//! - `Severity`, `Category`: result classification
//! - `ErrorPolicy`: injected strategy for handling API errors inside checks

pub mod check;
pub mod error;
pub mod policy;
pub mod result;
pub mod severity;

// Re-export commonly used types at crate root
pub use check::Check;
pub use error::{Error, Result};
pub use policy::{ErrorPolicy, PermissiveErrorPolicy, StrictErrorPolicy};
pub use result::CheckResult;
pub use severity::{Category, Severity};
