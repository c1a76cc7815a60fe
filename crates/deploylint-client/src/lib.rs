//! Deploylint Client - REST client for the deployment platform API
//!
//! This crate provides:
//! - `PlatformClient`: an authenticated, space-scoped HTTP/JSON client
//! - Typed resource models matching the platform wire format
//! - Transparent take/skip pagination with a per-call fetch limit
//!
//! The client is strictly read-only; every method is a GET.

pub mod client;
pub mod resources;

pub use client::{ClientConfig, PlatformClient};
pub use resources::*;
