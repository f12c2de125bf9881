// Thu Feb 5 2026 - Alex

use crate::store::chunk::{ChunkTier, MatchChunk, MatchEntry, StoreError};

/// The evolving set of candidate addresses.
///
/// Entries live in an ordered sequence of fixed-capacity chunks.
/// Insertion order is preserved across chunks; within a chunk it is
/// only preserved until the first deletion. The store is owned by the
/// caller and mutated in place by scan and narrow passes.
#[derive(Debug, Default)]
pub struct MatchStore {
    chunks: Vec<MatchChunk>,
    count: usize,
    tier: Option<ChunkTier>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            count: 0,
            tier: None,
        }
    }

    /// Use a fixed allocation tier instead of the default largest one.
    pub fn with_tier(tier: ChunkTier) -> Self {
        Self {
            chunks: Vec::new(),
            count: 0,
            tier: Some(tier),
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn chunks(&self) -> &[MatchChunk] {
        &self.chunks
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchEntry> {
        self.chunks.iter().flat_map(|c| c.entries().iter())
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.count = 0;
    }

    /// Append an entry, growing by one full-tier chunk when needed.
    pub fn push(&mut self, entry: MatchEntry) -> Result<(), StoreError> {
        let needs_chunk = match self.chunks.last() {
            Some(chunk) => chunk.is_full(),
            None => true,
        };

        if needs_chunk {
            self.chunks.try_reserve(1)?;
            self.chunks
                .push(MatchChunk::new(self.tier.unwrap_or(ChunkTier::DEFAULT))?);
        }

        if let Some(chunk) = self.chunks.last_mut() {
            chunk.push(entry);
            self.count += 1;
        }

        Ok(())
    }

    /// Swap-with-last delete of one slot. Empty chunks are left in place;
    /// a retain or compact pass unlinks them.
    pub fn delete_at(&mut self, chunk: usize, slot: usize) {
        if let Some(c) = self.chunks.get_mut(chunk) {
            if slot < c.len() {
                c.swap_delete(slot);
                self.count -= 1;
            }
        }
    }

    /// Visit every entry; the callback decides keep, drop, or abort.
    ///
    /// Dropped entries are removed by swap-with-last, so the slot is
    /// revisited rather than advanced. Chunks that empty out are
    /// unlinked afterwards. On error the walk stops where it is and the
    /// store stays valid.
    pub fn for_each_retain<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut MatchEntry) -> Result<bool, E>,
    {
        let mut dropped = 0;
        let mut walk = || -> Result<(), E> {
            for chunk in self.chunks.iter_mut() {
                let mut slot = 0;
                while let Some(entry) = chunk.get_mut(slot) {
                    if f(entry)? {
                        slot += 1;
                    } else {
                        chunk.swap_delete(slot);
                        dropped += 1;
                    }
                }
            }
            Ok(())
        };

        let result = walk();
        self.count -= dropped;
        self.chunks.retain(|c| !c.is_empty());
        result
    }

    /// Consolidate partially-filled chunks.
    ///
    /// The first partial chunk becomes the destination. Entries always
    /// move into the chunk with the larger capacity; a source that fits
    /// entirely is drained and freed, otherwise the destination is
    /// topped up from the source's tail and the source takes over as
    /// destination.
    pub fn compact(&mut self) {
        self.chunks.retain(|c| !c.is_empty());

        let mut dst: Option<usize> = None;
        let mut i = 0;

        while i < self.chunks.len() {
            if self.chunks[i].is_full() {
                i += 1;
                continue;
            }

            let Some(d) = dst else {
                dst = Some(i);
                i += 1;
                continue;
            };

            if self.chunks[i].capacity() > self.chunks[d].capacity() {
                self.chunks.swap(d, i);
            }

            let (head, rest) = self.chunks.split_at_mut(i);
            let dest = &mut head[d];
            let src = &mut rest[0];

            if src.len() <= dest.free() {
                dest.absorb(src);
                let dest_full = dest.is_full();
                self.chunks.remove(i);
                if dest_full {
                    dst = None;
                }
            } else {
                let moved = src.take_tail(dest.free());
                dest.push_all(moved);
                dst = Some(i);
                i += 1;
            }
        }
    }
}
