//! CLI command implementations.

pub mod config;
pub mod serve;

use std::path::Path;
use stylize_core::{Config, ConfigError};

/// Load config from an explicit path, or from the default location.
///
/// A path that does not exist yet yields the defaults, so `config init`
/// can target it.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) if path.exists() => Config::load_from(path),
        Some(_) => Ok(Config::default()),
        None => Config::load(),
    }
}
