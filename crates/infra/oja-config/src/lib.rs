//! Configuration for the oja galley upload tool.
//!
//! This crate provides:
//! - [`OjaConfig`]: connection settings, execution timing and logging
//! - [`load_merged`]: two-layer config loading (global + local) with env overrides
//! - [`validation`]: advisory warnings plus the required-credential check
//!
//! # Configuration Precedence (lowest to highest)
//! 1. Default values
//! 2. Global config (`~/.config/oja/oja.json`)
//! 3. Local config (`./oja.json`)
//! 4. Environment variables
//!
//! # Environment Variables
//! - `OJS_BASE_URL`: Base URL of the OJS journal
//! - `OJS_API_TOKEN`: REST API token
//! - `OJS_USERNAME`: Web login username
//! - `OJS_PASSWORD`: Web login password
//! - `OJA_LOG_LEVEL`: Default log filter

pub mod loader;
pub mod merge;
pub mod migration;
pub mod types;
pub mod validation;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use loader::{LoadedOjaConfig, load_merged, load_merged_with};
pub use types::OjaConfig;
