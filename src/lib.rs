//! recheck — incremental AI review for Azure DevOps pull requests (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod changeset;
pub mod config;
pub mod constants;
pub mod diff;
pub mod env;
pub mod host;
pub mod models;
pub mod output;
pub mod reviewer;
pub mod state;
