//! Application directory paths for sift.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/sift/` | `~/.config/sift/` |
//! | Cache | `~/Library/Caches/sift/` | `~/.cache/sift/` |
//!
//! # Environment Overrides
//!
//! - `SIFT_CONFIG_DIR` overrides [`config_dir`]
//! - `SIFT_CACHE_DIR` overrides [`results_cache_dir`] (the result cache itself,
//!   not its parent)

use std::path::PathBuf;

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/sift/` by default. Override with
/// the `SIFT_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("SIFT_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("sift"))
        .unwrap_or_else(|| PathBuf::from("/tmp/sift-config"))
}

/// Application cache root (`dirs::cache_dir()/sift/`).
#[must_use]
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("sift"))
        .unwrap_or_else(|| PathBuf::from("/tmp/sift-cache"))
}

/// Directory holding one JSON record per cached query.
///
/// Resolves to `cache_dir()/results/` by default. Override with the
/// `SIFT_CACHE_DIR` environment variable.
#[must_use]
pub fn results_cache_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("SIFT_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }
    cache_dir().join("results")
}

/// Default config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
