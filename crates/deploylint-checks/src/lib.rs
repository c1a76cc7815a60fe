//! Deploylint Checks - the audit check catalogue and registry
//!
//! This crate provides:
//! - `CheckRegistry`: constructs the full ordered check collection and
//!   applies the skip/only id filters
//! - The concrete checks, one module per category

pub mod naming;
pub mod organization;
pub mod performance;
pub mod registry;
pub mod security;
pub mod special_variables;

pub use registry::CheckRegistry;
