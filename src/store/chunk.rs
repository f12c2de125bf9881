// Thu Feb 5 2026 - Alex

use thiserror::Error;

use crate::value::{Value, ValueFlags};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("out of memory growing the match store")]
    OutOfMemory,
}

impl From<std::collections::TryReserveError> for StoreError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// One candidate address with its last observed value snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchEntry {
    pub addr: u64,
    pub value: Value,
    pub flags: ValueFlags,
}

/// Capacity tiers for match chunks.
///
/// Fresh chunks are always the largest tier; the smaller ones exist so
/// compaction can shrink trailing waste after heavy narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChunkTier {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl ChunkTier {
    pub const DEFAULT: Self = Self::Huge;

    pub fn capacity(self) -> usize {
        match self {
            Self::Tiny => 50,
            Self::Small => 100,
            Self::Medium => 200,
            Self::Large => 400,
            Self::Huge => 800,
        }
    }
}

/// A fixed-capacity block of match entries.
///
/// The backing storage is reserved once at the full tier size and never
/// grows. Deletion swaps the last entry into the vacated slot, so order
/// within a chunk is not preserved across deletions.
#[derive(Debug)]
pub struct MatchChunk {
    tier: ChunkTier,
    entries: Vec<MatchEntry>,
}

impl MatchChunk {
    pub fn new(tier: ChunkTier) -> Result<Self, StoreError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(tier.capacity())?;
        Ok(Self { tier, entries })
    }

    pub fn tier(&self) -> ChunkTier {
        self.tier
    }

    pub fn capacity(&self) -> usize {
        self.tier.capacity()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity()
    }

    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    pub fn push(&mut self, entry: MatchEntry) {
        debug_assert!(!self.is_full());
        self.entries.push(entry);
    }

    pub fn swap_delete(&mut self, slot: usize) {
        if slot < self.entries.len() {
            self.entries.swap_remove(slot);
        }
    }

    pub fn get(&self, slot: usize) -> Option<&MatchEntry> {
        self.entries.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut MatchEntry> {
        self.entries.get_mut(slot)
    }

    pub fn entries(&self) -> &[MatchEntry] {
        &self.entries
    }

    /// Take `count` entries off the tail, for compaction moves.
    pub(crate) fn take_tail(&mut self, count: usize) -> Vec<MatchEntry> {
        let at = self.entries.len() - count;
        self.entries.split_off(at)
    }

    /// Move every entry of `other` into this chunk. The caller checks
    /// that they fit; the reserved capacity must never be exceeded.
    pub(crate) fn absorb(&mut self, other: &mut MatchChunk) {
        debug_assert!(other.len() <= self.free());
        self.entries.append(&mut other.entries);
    }

    pub(crate) fn push_all(&mut self, entries: Vec<MatchEntry>) {
        debug_assert!(entries.len() <= self.free());
        self.entries.extend(entries);
    }
}
