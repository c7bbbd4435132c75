// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry-with-backoff executor and atomic transaction wrapper.
//!
//! The relational store accepts one writer at a time; "database is locked"
//! responses are transient and are absorbed here with exponential backoff
//! instead of failing fast. Everything else propagates untouched on the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use rusqlite::TransactionBehavior;
use tracing::warn;

use passkeeper_config::RetryConfig;
use passkeeper_core::PassKeeperError;

use crate::database::{channel_err, from_sqlite, CallResult, Database};

/// Run `op`, retrying on lock contention with exponential backoff.
///
/// Attempt `n` (1-based) sleeps `base_delay * 2^(n-1)` before re-running.
/// After `max_retries` retries the original lock error propagates. Non-lock
/// errors propagate immediately without retry.
pub async fn execute_with_retry<T, F, Fut>(policy: &RetryConfig, op: F) -> Result<T, PassKeeperError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, PassKeeperError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_lock_contention() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = Duration::from_millis(
                    policy
                        .base_delay_ms
                        .saturating_mul(2u64.saturating_pow(attempt - 1)),
                );
                warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "storage locked, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run `ops` between BEGIN IMMEDIATE and COMMIT, with rollback on any error.
///
/// The whole transaction -- not individual statements -- is the retry unit:
/// on lock contention the transaction is rolled back and re-run from the
/// top. A rollback that itself fails is logged but never masks the original
/// error. Nested transactions are forbidden; code that must run inside an
/// existing transaction calls the query primitives on the `Transaction` it
/// is handed instead of re-entering this function.
pub async fn execute_in_transaction<T, F>(
    db: &Database,
    policy: &RetryConfig,
    ops: F,
) -> Result<T, PassKeeperError>
where
    F: for<'t> Fn(&rusqlite::Transaction<'t>) -> Result<T, PassKeeperError>
        + Clone
        + Send
        + 'static,
    T: Send + 'static,
{
    execute_with_retry(policy, || {
        let ops = ops.clone();
        async move {
            db.connection()
                .call(move |conn| -> CallResult<T> {
                    let tx = match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
                        Ok(tx) => tx,
                        Err(e) => return Ok(Err(from_sqlite(e))),
                    };
                    match ops(&tx) {
                        Ok(value) => match tx.commit() {
                            Ok(()) => Ok(Ok(value)),
                            Err(e) => {
                                let mapped = from_sqlite(e);
                                if mapped.is_lock_contention() {
                                    Ok(Err(mapped))
                                } else {
                                    Ok(Err(PassKeeperError::TransactionAbort {
                                        source: mapped.to_string().into(),
                                    }))
                                }
                            }
                        },
                        Err(e) => {
                            if let Err(rollback_err) = tx.rollback() {
                                warn!(error = %rollback_err, "rollback failed; propagating the original error");
                            }
                            Ok(Err(e))
                        }
                    }
                })
                .await
                .map_err(channel_err)?
        }
    })
    .await
}
