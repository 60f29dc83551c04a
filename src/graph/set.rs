//! Dense bit set over block ids.
//!
//! The numbering pass, reachability walks, and iterated-frontier worklists all need
//! "have I seen this block" tests over a dense id space. [`BlockSet`] packs those
//! flags 64 per word instead of hashing.

use crate::graph::BlockId;

/// A fixed-capacity set of [`BlockId`]s backed by a bit vector.
///
/// The capacity is the arena size of the graph (including removed slots), so every
/// id handed out by that graph fits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlockSet {
    /// The bits, stored as a vector of words.
    words: Vec<u64>,
    /// The number of addressable ids.
    capacity: usize,
}

impl BlockSet {
    /// Creates an empty set able to hold ids `0..capacity`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
            capacity,
        }
    }

    /// Returns the number of addressable ids.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if no id is in the set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns the number of ids in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Adds `block` to the set.
    ///
    /// Returns `true` if the block was not present before.
    ///
    /// # Panics
    ///
    /// Panics if `block.index() >= self.capacity()`.
    pub fn insert(&mut self, block: BlockId) -> bool {
        let (word, mask) = self.locate(block);
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    /// Removes `block` from the set.
    ///
    /// Returns `true` if the block was present.
    ///
    /// # Panics
    ///
    /// Panics if `block.index() >= self.capacity()`.
    pub fn remove(&mut self, block: BlockId) -> bool {
        let (word, mask) = self.locate(block);
        let present = self.words[word] & mask != 0;
        self.words[word] &= !mask;
        present
    }

    /// Returns `true` if `block` is in the set.
    ///
    /// # Panics
    ///
    /// Panics if `block.index() >= self.capacity()`.
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        let (word, mask) = self.locate(block);
        self.words[word] & mask != 0
    }

    /// Removes every id.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Returns an iterator over the ids in the set in increasing order.
    pub fn iter(&self) -> BlockSetIter<'_> {
        BlockSetIter {
            set: self,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    #[inline]
    fn locate(&self, block: BlockId) -> (usize, u64) {
        let index = block.index();
        assert!(
            index < self.capacity,
            "block {block} out of bounds for set of capacity {}",
            self.capacity
        );
        (index / 64, 1u64 << (index % 64))
    }
}

impl std::fmt::Debug for BlockSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over the ids in a [`BlockSet`].
pub struct BlockSetIter<'a> {
    set: &'a BlockSet,
    word_idx: usize,
    current: u64,
}

impl Iterator for BlockSetIter<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                // clear lowest set bit
                self.current &= self.current - 1;
                return Some(BlockId::new(self.word_idx * 64 + bit));
            }
            self.word_idx += 1;
            self.current = *self.set.words.get(self.word_idx)?;
        }
    }
}
