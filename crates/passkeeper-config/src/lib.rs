// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the PassKeeper vault.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides via the `PASSKEEPER_` prefix.

pub mod loader;
pub mod model;

use passkeeper_core::PassKeeperError;
use tracing::debug;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{PassKeeperConfig, RetryConfig, StorageConfig};

/// Upper bound on cumulative retry backoff. The only bound on vault
/// operation latency is `max_retries x exponential backoff`, so the policy
/// must keep the worst case within a few seconds.
const MAX_WORST_CASE_BACKOFF_MS: u64 = 10_000;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<PassKeeperConfig, PassKeeperError> {
    let config = loader::load_config()
        .map_err(|e| PassKeeperError::Config(e.to_string()))?;
    validate(&config)?;
    debug!(
        database_path = %config.storage.database_path,
        wal_mode = config.storage.wal_mode,
        "configuration loaded"
    );
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<PassKeeperConfig, PassKeeperError> {
    let config = loader::load_config_from_str(toml_content)
        .map_err(|e| PassKeeperError::Config(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Validate semantic constraints that serde cannot express.
pub fn validate(config: &PassKeeperConfig) -> Result<(), PassKeeperError> {
    if config.storage.database_path.trim().is_empty() {
        return Err(PassKeeperError::Config(
            "storage.database_path must not be empty".to_string(),
        ));
    }

    let worst_case = config.retry.worst_case_backoff_ms();
    if worst_case > MAX_WORST_CASE_BACKOFF_MS {
        return Err(PassKeeperError::Config(format!(
            "retry policy worst-case backoff is {worst_case}ms, exceeding the \
             {MAX_WORST_CASE_BACKOFF_MS}ms bound -- lower retry.max_retries or \
             retry.base_delay_ms"
        )));
    }

    Ok(())
}
