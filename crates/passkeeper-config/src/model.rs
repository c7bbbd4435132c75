// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the PassKeeper vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at load time.

use serde::{Deserialize, Serialize};

/// Top-level PassKeeper configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PassKeeperConfig {
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Lock-contention retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Whether to enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "passkeeper.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Retry policy for lock-contended storage operations.
///
/// Attempt `n` (1-based) waits `base_delay_ms * 2^(n-1)` before retrying.
/// Only lock-contention errors are retried; everything else propagates
/// immediately.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// Total worst-case time spent sleeping between retries.
    pub fn worst_case_backoff_ms(&self) -> u64 {
        (0..self.max_retries)
            .map(|attempt| self.base_delay_ms.saturating_mul(2u64.saturating_pow(attempt)))
            .fold(0u64, u64::saturating_add)
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_deserialize_directly_from_toml() {
        let storage: StorageConfig =
            toml::from_str("database_path = \"/tmp/vault.db\"\nwal_mode = false").unwrap();
        assert_eq!(storage.database_path, "/tmp/vault.db");
        assert!(!storage.wal_mode);
    }

    #[test]
    fn unknown_keys_fail_direct_deserialization() {
        let err = toml::from_str::<RetryConfig>("max_retries = 3\nmax_retrys = 5").unwrap_err();
        assert!(err.to_string().contains("max_retrys"));
    }

    #[test]
    fn defaults_match_documented_policy() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.base_delay_ms, 300);
        // 300 + 600 + 1200
        assert_eq!(retry.worst_case_backoff_ms(), 2100);
    }

    #[test]
    fn worst_case_backoff_saturates_instead_of_overflowing() {
        let retry = RetryConfig {
            max_retries: 63,
            base_delay_ms: u64::MAX / 2,
        };
        assert_eq!(retry.worst_case_backoff_ms(), u64::MAX);
    }

    #[test]
    fn worst_case_backoff_handles_retry_counts_past_the_shift_width() {
        // 2^attempt exceeds u64 from attempt 64 on; the doubling must
        // saturate rather than panic.
        let retry = RetryConfig {
            max_retries: 200,
            base_delay_ms: 1,
        };
        assert_eq!(retry.worst_case_backoff_ms(), u64::MAX);
    }
}
