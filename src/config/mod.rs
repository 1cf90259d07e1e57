//! Configuration loading and layering.
//!
//! Handles `.recheck.toml` loading, environment variable resolution,
//! and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{Config, HostConfig, ProviderConfig, ReviewConfig};
