//! Time-bounded cache for group membership lookups.
//!
//! Group expansion is the expensive step of notification fan-out; a
//! ten-minute staleness window bounds it to one store query per group
//! per window. The cache is an explicit service injected into the
//! engine, not hidden process state.

use std::collections::HashMap;

use mentions_core::id::{GroupName, UserId};
use tokio::sync::Mutex;

/// How long a membership entry stays valid.
pub const MEMBERS_EXPIRY_MS: u64 = 600_000;

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub members: Vec<UserId>,
    /// When this entry was fetched, milliseconds since the Unix epoch.
    pub fetched_at: u64,
}

/// One entry per group ever queried; entries live for the process
/// lifetime and are only refreshed in place on expiry, never evicted
/// by size.
///
/// Reads and writes are per-key check-then-act without cross-group
/// coordination; two overlapping refreshes of the same group are
/// tolerated (last writer wins, both fetched valid-at-the-time data).
#[derive(Debug)]
pub struct MembershipCache {
    entries: Mutex<HashMap<GroupName, CacheEntry>>,
    expiry_ms: u64,
}

impl Default for MembershipCache {
    fn default() -> Self {
        Self::new(MEMBERS_EXPIRY_MS)
    }
}

impl MembershipCache {
    pub fn new(expiry_ms: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            expiry_ms,
        }
    }

    /// A live entry's members, or `None` when the group was never
    /// fetched or its entry has aged out (an expired entry is treated
    /// as absent).
    pub async fn get(&self, group: &GroupName, now_ms: u64) -> Option<Vec<UserId>> {
        let entries = self.entries.lock().await;
        entries
            .get(group)
            .filter(|entry| !self.is_expired(entry, now_ms))
            .map(|entry| entry.members.clone())
    }

    pub async fn put(&self, group: GroupName, members: Vec<UserId>, now_ms: u64) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            group,
            CacheEntry {
                members,
                fetched_at: now_ms,
            },
        );
    }

    pub fn is_expired(&self, entry: &CacheEntry, now_ms: u64) -> bool {
        entry.fetched_at + self.expiry_ms < now_ms
    }
}
