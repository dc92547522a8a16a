// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-tick identity tracking.
//!
//! [`IdentityRegistry`] maps opaque view handles (plus a [`NodeRole`]) to
//! stable [`NodeId`]s. Every capture tick is bracketed by
//! [`begin_tick`](IdentityRegistry::begin_tick) and
//! [`end_tick`](IdentityRegistry::end_tick):
//!
//! ```text
//!   begin_tick()        clear every live flag
//!   id_for(key) ...     look up or allocate, set live flag
//!   end_tick()          evict entries whose flag is still clear
//! ```
//!
//! Evicted ids are retired: the counter only moves forward, so a view that
//! appears later always receives a fresh id. Only [`reset`](IdentityRegistry::reset)
//! restarts the id space. Once the last id has been handed out the registry
//! reports [`is_exhausted`](IdentityRegistry::is_exhausted) and the owner
//! is expected to reset it.
//!
//! [`NodeRole`]: crate::id::NodeRole

use alloc::collections::BTreeMap;

use crate::id::{IdentityKey, NodeId};

/// First id handed out after construction or [`IdentityRegistry::reset`].
pub const FIRST_ID: u32 = 1;

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: NodeId,
    live: bool,
}

/// Handle → id registry with per-tick liveness sweeps.
#[derive(Clone, Debug)]
pub struct IdentityRegistry {
    entries: BTreeMap<IdentityKey, Entry>,
    next: u32,
    retired: u64,
    exhausted: bool,
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(NodeId(FIRST_ID))
    }

    /// Creates an empty registry whose first allocation is `first`.
    ///
    /// Lets a host continue an id space persisted across restarts.
    /// [`reset`](Self::reset) still restarts at [`FIRST_ID`].
    #[must_use]
    pub fn starting_at(first: NodeId) -> Self {
        Self {
            entries: BTreeMap::new(),
            next: first.get(),
            retired: 0,
            exhausted: false,
        }
    }

    /// Returns the id for `key`, allocating the next unused id if the key has
    /// not been seen since the last eviction. Marks the entry live.
    ///
    /// Never fails. After `u32::MAX` has been handed out, new keys keep
    /// receiving it and [`is_exhausted`](Self::is_exhausted) turns true;
    /// ids allocated from then on are not unique.
    pub fn id_for(&mut self, key: IdentityKey) -> NodeId {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.live = true;
            return entry.id;
        }
        let id = NodeId(self.next);
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        self.entries.insert(key, Entry { id, live: true });
        id
    }

    /// Whether the id space ran out. Cleared by [`reset`](Self::reset).
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns the id currently assigned to `key` without allocating or
    /// touching the live flag.
    #[must_use]
    pub fn get(&self, key: IdentityKey) -> Option<NodeId> {
        self.entries.get(&key).map(|e| e.id)
    }

    /// Clears the live flag on every entry.
    pub fn begin_tick(&mut self) {
        for entry in self.entries.values_mut() {
            entry.live = false;
        }
    }

    /// Evicts every entry whose live flag was not set since
    /// [`begin_tick`](Self::begin_tick) and returns how many were evicted.
    ///
    /// Evicted ids are never handed out again until [`reset`](Self::reset).
    pub fn end_tick(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.live);
        let evicted = before - self.entries.len();
        self.retired += evicted as u64;
        evicted
    }

    /// Forgets every mapping and restarts the counter at [`FIRST_ID`].
    pub fn reset(&mut self) {
        self.entries.clear();
        self.next = FIRST_ID;
        self.retired = 0;
        self.exhausted = false;
    }

    /// Number of live mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id the next allocation will receive.
    #[must_use]
    pub const fn next_id(&self) -> NodeId {
        NodeId(self.next)
    }

    /// Total ids retired since construction or the last reset.
    #[must_use]
    pub const fn retired(&self) -> u64 {
        self.retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ViewHandle;

    fn key(h: u64) -> IdentityKey {
        IdentityKey::view(ViewHandle(h))
    }

    #[test]
    fn same_handle_keeps_id_across_ticks() {
        let mut reg = IdentityRegistry::new();
        reg.begin_tick();
        let a = reg.id_for(key(10));
        let b = reg.id_for(key(20));
        assert_eq!(reg.end_tick(), 0);

        reg.begin_tick();
        assert_eq!(reg.id_for(key(10)), a);
        assert_eq!(reg.id_for(key(20)), b);
        assert_eq!(reg.end_tick(), 0);
        assert_eq!(a, NodeId(1));
        assert_eq!(b, NodeId(2));
    }

    #[test]
    fn roles_get_distinct_ids() {
        let mut reg = IdentityRegistry::new();
        let h = ViewHandle(7);
        let view = reg.id_for(IdentityKey::view(h));
        let text = reg.id_for(IdentityKey::text(h));
        let doc = reg.id_for(IdentityKey::document(h));
        assert_ne!(view, text);
        assert_ne!(view, doc);
        assert_ne!(text, doc);
    }

    #[test]
    fn unseen_entries_are_evicted_and_ids_retired() {
        let mut reg = IdentityRegistry::new();
        reg.begin_tick();
        let gone = reg.id_for(key(1));
        let _kept = reg.id_for(key(2));
        reg.end_tick();

        reg.begin_tick();
        let _ = reg.id_for(key(2));
        assert_eq!(reg.end_tick(), 1);
        assert_eq!(reg.get(key(1)), None);
        assert_eq!(reg.retired(), 1);

        // The same handle coming back is a new view as far as ids go.
        reg.begin_tick();
        let again = reg.id_for(key(1));
        reg.end_tick();
        assert_ne!(again, gone);
        assert_eq!(again, NodeId(3));
    }

    #[test]
    fn get_does_not_refresh_liveness() {
        let mut reg = IdentityRegistry::new();
        reg.begin_tick();
        let _ = reg.id_for(key(1));
        reg.end_tick();

        reg.begin_tick();
        assert!(reg.get(key(1)).is_some());
        assert_eq!(reg.end_tick(), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn reset_restarts_counter() {
        let mut reg = IdentityRegistry::new();
        let _ = reg.id_for(key(1));
        let _ = reg.id_for(key(2));
        assert_eq!(reg.next_id(), NodeId(3));

        reg.reset();
        assert!(reg.is_empty());
        assert_eq!(reg.id_for(key(5)), NodeId(FIRST_ID));
    }

    #[test]
    fn exhausted_id_space_is_reported_not_fatal() {
        let mut reg = IdentityRegistry::starting_at(NodeId(u32::MAX - 1));
        assert_eq!(reg.id_for(key(1)), NodeId(u32::MAX - 1));
        assert!(!reg.is_exhausted());
        assert_eq!(reg.id_for(key(2)), NodeId(u32::MAX));
        assert!(reg.is_exhausted());
        // Further keys saturate instead of panicking.
        assert_eq!(reg.id_for(key(3)), NodeId(u32::MAX));
        assert_eq!(reg.id_for(key(1)), NodeId(u32::MAX - 1));

        reg.reset();
        assert!(!reg.is_exhausted());
        assert_eq!(reg.id_for(key(3)), NodeId(FIRST_ID));
    }
}
