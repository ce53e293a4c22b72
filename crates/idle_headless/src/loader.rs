//! Loading content, configuration and strategies from disk.
//!
//! Every loader falls back to the built-in data when no path is given.

use std::fs;
use std::path::Path;

use idle_core::config::EconomyConfig;
use idle_core::data::Catalog;

use crate::error::{HeadlessError, Result};
use crate::strategy::Strategy;

fn read(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(HeadlessError::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Load a catalog file, or the built-in catalog.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::from_ron_str(&read(path)?, &path.display().to_string())?,
        None => Catalog::builtin()?,
    };
    Ok(catalog)
}

/// Load a config file, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EconomyConfig> {
    match path {
        Some(path) => Ok(EconomyConfig::from_ron_str(&read(path)?)?),
        None => Ok(EconomyConfig::default()),
    }
}

/// Load a strategy file, or the built-in balanced strategy.
pub fn load_strategy(path: Option<&Path>) -> Result<Strategy> {
    match path {
        Some(path) => Strategy::from_ron_str(&read(path)?, &path.display().to_string()),
        None => Strategy::balanced(),
    }
}
