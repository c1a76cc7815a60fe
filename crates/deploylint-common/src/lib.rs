//! Deploylint Common - Shared utilities: configuration and logging
//!
//! This crate provides the ambient plumbing used by the CLI and the check
//! crates: layered configuration (file, environment, flags) and tracing setup.

pub mod config;
pub mod logging;

pub use config::{ChecksConfig, Config, ConfigBuilder, ExecutorConfigSection};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogFormat};
