// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-slot authentication request gate.
//!
//! At most one authentication prompt is outstanding at a time. A caller
//! obtains a receiver from [`AuthGate::request`] and awaits the user's
//! decision; whoever drives the UI calls [`AuthGate::resolve`]. A second
//! request while one is pending is rejected, unless the first caller has
//! abandoned its receiver, in which case the stale slot is reclaimed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use passkeeper_core::PassKeeperError;

#[derive(Default)]
pub struct AuthGate {
    slot: Mutex<Option<Pending>>,
    next_id: AtomicU64,
}

struct Pending {
    id: u64,
    sender: oneshot::Sender<bool>,
}

impl AuthGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an authentication request. The receiver resolves to the user's
    /// decision once [`resolve`](Self::resolve) is called; dropping it
    /// abandons the request and frees the slot.
    pub fn request(&self) -> Result<oneshot::Receiver<bool>, PassKeeperError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| PassKeeperError::Internal("auth gate poisoned".into()))?;

        if let Some(pending) = slot.as_ref() {
            if pending.sender.is_closed() {
                debug!(request_id = pending.id, "reclaiming abandoned auth request");
            } else {
                return Err(PassKeeperError::Validation(
                    "an authentication request is already pending".into(),
                ));
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        *slot = Some(Pending { id, sender });
        debug!(request_id = id, "auth request opened");
        Ok(receiver)
    }

    /// Complete the pending request with the user's decision.
    pub fn resolve(&self, approved: bool) -> Result<(), PassKeeperError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| PassKeeperError::Internal("auth gate poisoned".into()))?;

        let Some(pending) = slot.take() else {
            return Err(PassKeeperError::Validation(
                "no authentication request is pending".into(),
            ));
        };
        let id = pending.id;
        if pending.sender.send(approved).is_err() {
            warn!(request_id = id, "auth requester went away before resolution");
        } else {
            debug!(request_id = id, approved, "auth request resolved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_then_resolve_delivers_the_decision() {
        let gate = AuthGate::new();
        let receiver = gate.request().unwrap();
        gate.resolve(true).unwrap();
        assert!(receiver.await.unwrap());

        let receiver = gate.request().unwrap();
        gate.resolve(false).unwrap();
        assert!(!receiver.await.unwrap());
    }

    #[tokio::test]
    async fn second_request_is_rejected_while_one_is_pending() {
        let gate = AuthGate::new();
        let _receiver = gate.request().unwrap();

        let err = gate.request().unwrap_err();
        assert!(matches!(err, PassKeeperError::Validation(_)));
    }

    #[tokio::test]
    async fn abandoned_request_frees_the_slot() {
        let gate = AuthGate::new();
        let receiver = gate.request().unwrap();
        drop(receiver);

        // The stale slot is reclaimed instead of blocking the new request.
        let receiver = gate.request().unwrap();
        gate.resolve(true).unwrap();
        assert!(receiver.await.unwrap());
    }

    #[tokio::test]
    async fn resolve_without_a_request_is_an_error() {
        let gate = AuthGate::new();
        let err = gate.resolve(true).unwrap_err();
        assert!(matches!(err, PassKeeperError::Validation(_)));
    }

    #[tokio::test]
    async fn resolving_an_abandoned_request_clears_the_slot() {
        let gate = AuthGate::new();
        let receiver = gate.request().unwrap();
        drop(receiver);

        // The decision has nowhere to go, but the gate stays usable.
        gate.resolve(true).unwrap();
        let _receiver = gate.request().unwrap();
    }
}
