//! # Change Tracking
//!
//! Compact bitset of entity slots whose component data changed since the
//! last clear. At 64 entities per `u64`, tracking 1M entities takes ~122KB.
//!
//! - Mark dirty: O(1)
//! - Clear all: O(n/64)
//! - Iterate dirty: skips clean words with `trailing_zeros`

/// Dirty bitset keyed by entity index.
#[derive(Debug)]
pub struct ChangeTracker {
    /// 1 = dirty, 0 = clean. 64 entities per u64.
    bits: Vec<u64>,
    /// Capacity in entities.
    capacity: usize,
    /// Cached count of dirty entities.
    dirty_count: usize,
}

impl ChangeTracker {
    /// Creates a tracker for `capacity` entity slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            bits: vec![0u64; capacity.div_ceil(64)],
            capacity,
            dirty_count: 0,
        }
    }

    /// Marks an entity index as dirty.
    #[inline]
    pub fn mark(&mut self, index: usize) {
        if index >= self.capacity {
            return;
        }
        let mask = 1u64 << (index % 64);
        let word = &mut self.bits[index / 64];
        if *word & mask == 0 {
            *word |= mask;
            self.dirty_count += 1;
        }
    }

    /// Clears one entity index.
    #[inline]
    pub fn unmark(&mut self, index: usize) {
        if index >= self.capacity {
            return;
        }
        let mask = 1u64 << (index % 64);
        let word = &mut self.bits[index / 64];
        if *word & mask != 0 {
            *word &= !mask;
            self.dirty_count -= 1;
        }
    }

    /// Checks if an entity index is dirty.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        (self.bits[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Clears all dirty flags.
    pub fn clear(&mut self) {
        self.bits.fill(0);
        self.dirty_count = 0;
    }

    /// Returns the number of dirty entities.
    #[inline]
    #[must_use]
    pub const fn dirty_count(&self) -> usize {
        self.dirty_count
    }

    /// Iterates over dirty entity indices in ascending order.
    pub fn iter(&self) -> ChangeIter<'_> {
        ChangeIter {
            bits: &self.bits,
            word_idx: 0,
            current_word: self.bits.first().copied().unwrap_or(0),
            capacity: self.capacity,
        }
    }
}

/// Iterator over dirty entity indices.
pub struct ChangeIter<'a> {
    bits: &'a [u64],
    word_idx: usize,
    current_word: u64,
    capacity: usize,
}

impl Iterator for ChangeIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit = self.current_word.trailing_zeros() as usize;
                let index = self.word_idx * 64 + bit;
                self.current_word &= self.current_word - 1;
                if index < self.capacity {
                    return Some(index);
                }
            }

            self.word_idx += 1;
            if self.word_idx >= self.bits.len() {
                return None;
            }
            self.current_word = self.bits[self.word_idx];
        }
    }
}
