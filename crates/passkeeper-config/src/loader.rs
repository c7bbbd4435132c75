// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./passkeeper.toml` > `~/.config/passkeeper/passkeeper.toml`
//! > `/etc/passkeeper/passkeeper.toml` with environment variable overrides via
//! the `PASSKEEPER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PassKeeperConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/passkeeper/passkeeper.toml` (system-wide)
/// 3. `~/.config/passkeeper/passkeeper.toml` (user XDG config)
/// 4. `./passkeeper.toml` (local directory)
/// 5. `PASSKEEPER_*` environment variables
pub fn load_config() -> Result<PassKeeperConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PassKeeperConfig::default()))
        .merge(Toml::file("/etc/passkeeper/passkeeper.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("passkeeper/passkeeper.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("passkeeper.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PassKeeperConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PassKeeperConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PassKeeperConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PassKeeperConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that key names
/// containing underscores stay intact: `PASSKEEPER_RETRY_BASE_DELAY_MS`
/// must map to `retry.base_delay_ms`, not `retry.base.delay.ms`.
fn env_provider() -> Env {
    Env::prefixed("PASSKEEPER_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("storage_", "storage.", 1)
            .replacen("retry_", "retry.", 1);
        mapped.into()
    })
}
