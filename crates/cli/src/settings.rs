// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locating and loading the configuration file

use anyhow::{Context, Result};
use latch_core::LatchConfig;
use std::path::{Path, PathBuf};

/// Default location: `<config dir>/latch/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("latch").join("config.toml"))
}

/// Load `explicit` if given, else the default file if it exists, else defaults
pub fn resolve(explicit: Option<&Path>) -> Result<LatchConfig> {
    resolve_from(explicit, default_path().as_deref())
}

fn resolve_from(explicit: Option<&Path>, fallback: Option<&Path>) -> Result<LatchConfig> {
    if let Some(path) = explicit {
        return LatchConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()));
    }
    match fallback {
        Some(path) if path.is_file() => {
            tracing::debug!(path = %path.display(), "using default config file");
            LatchConfig::load(path).with_context(|| format!("loading config {}", path.display()))
        }
        _ => Ok(LatchConfig::default()),
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
