//! Registry of running transfers, one per user

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

/// Tracks which users have a transfer in flight
#[derive(Clone, Default)]
pub struct TransferRegistry {
    active: Arc<RwLock<HashMap<u64, CancellationToken>>>,
}

impl TransferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the transfer slot of a user.
    ///
    /// Returns `None` while another transfer of the same user is running.
    /// The slot is released when the returned guard is dropped.
    pub fn try_begin(&self, user_id: u64) -> Option<TransferGuard> {
        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        if active.contains_key(&user_id) {
            return None;
        }

        let token = CancellationToken::new();
        active.insert(user_id, token.clone());
        Some(TransferGuard {
            registry: self.clone(),
            user_id,
            token,
        })
    }

    /// Request cancellation of the running transfer of a user.
    ///
    /// Returns `false` if the user has nothing running.
    pub fn cancel(&self, user_id: u64) -> bool {
        let active = self.active.read().unwrap_or_else(|e| e.into_inner());
        match active.get(&user_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, user_id: u64) -> bool {
        let active = self.active.read().unwrap_or_else(|e| e.into_inner());
        active.contains_key(&user_id)
    }

    pub fn active_count(&self) -> usize {
        let active = self.active.read().unwrap_or_else(|e| e.into_inner());
        active.len()
    }
}

/// Held for the lifetime of one transfer
pub struct TransferGuard {
    registry: TransferRegistry,
    user_id: u64,
    token: CancellationToken,
}

impl TransferGuard {
    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        let mut active = self.registry.active.write().unwrap_or_else(|e| e.into_inner());
        active.remove(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_transfer_per_user() {
        let registry = TransferRegistry::new();

        let guard = registry.try_begin(1).unwrap();
        assert!(registry.try_begin(1).is_none());
        assert!(registry.is_active(1));

        // Other users are independent
        let other = registry.try_begin(2).unwrap();
        assert_eq!(registry.active_count(), 2);

        drop(guard);
        assert!(!registry.is_active(1));
        assert!(registry.try_begin(1).is_some());
        drop(other);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_cancel() {
        let registry = TransferRegistry::new();
        assert!(!registry.cancel(7));

        let guard = registry.try_begin(7).unwrap();
        assert!(!guard.is_cancelled());
        assert!(registry.cancel(7));
        assert!(guard.is_cancelled());
        assert!(guard.token().is_cancelled());
        assert_eq!(guard.user_id(), 7);
    }

    #[test]
    fn test_fresh_slot_is_not_cancelled() {
        let registry = TransferRegistry::new();
        let guard = registry.try_begin(3).unwrap();
        registry.cancel(3);
        drop(guard);

        let guard = registry.try_begin(3).unwrap();
        assert!(!guard.is_cancelled());
    }
}
