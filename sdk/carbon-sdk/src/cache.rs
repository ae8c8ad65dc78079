//! Advisory membership cache.
//!
//! Strictly a UX hint layer: populated by authoritative reads, updated on
//! confirmed joins, consulted only through [`MembershipCache::hint`]. No
//! decision with financial effect reads it; the mutating paths always go
//! back to the ledger.

use std::collections::HashMap;
use std::sync::RwLock;

use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Default)]
pub struct MembershipCache {
    entries: RwLock<HashMap<Pubkey, bool>>,
}

impl MembershipCache {
    pub fn new() -> Self {
        MembershipCache::default()
    }

    /// Last observed membership for `owner`, `None` when never observed.
    pub fn hint(&self, owner: &Pubkey) -> Option<bool> {
        self.entries.read().ok()?.get(owner).copied()
    }

    pub fn record(&self, owner: Pubkey, is_member: bool) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(owner, is_member);
        }
    }

    /// Drop the entry for `owner`; the next read repopulates it.
    pub fn invalidate(&self, owner: &Pubkey) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(owner);
        }
    }
}
