//! Candidate move set backed by a bitset
//!
//! Search mutates the set in place on every make/unmake, so membership,
//! insertion and removal are all single bit operations. Iteration walks set
//! bits in index order, which keeps move generation deterministic.

use super::Pos;

/// Set of empty cells worth searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    bits: Vec<u64>,
    size: usize,
    len: usize,
}

/// Record of one `Board::update_candidates` call, enough to undo it exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateDelta {
    /// The occupied cell
    pub pos: Option<Pos>,
    /// Whether `pos` was in the set and got removed
    pub removed: bool,
    /// Cells that were newly added
    pub added: Vec<Pos>,
}

impl CandidateSet {
    /// Create an empty set for a `size x size` board
    pub fn new(size: usize) -> Self {
        let words = (size * size).div_ceil(64);
        Self {
            bits: vec![0; words],
            size,
            len: 0,
        }
    }

    #[inline]
    pub fn board_size(&self) -> usize {
        self.size
    }

    /// Insert a cell, returning `true` if it was not already present
    #[inline]
    pub fn insert(&mut self, pos: Pos) -> bool {
        let idx = pos.to_index(self.size);
        let (word, bit) = (idx / 64, idx % 64);
        let mask = 1u64 << bit;
        if self.bits[word] & mask != 0 {
            return false;
        }
        self.bits[word] |= mask;
        self.len += 1;
        true
    }

    /// Remove a cell, returning `true` if it was present
    #[inline]
    pub fn remove(&mut self, pos: Pos) -> bool {
        let idx = pos.to_index(self.size);
        let (word, bit) = (idx / 64, idx % 64);
        let mask = 1u64 << bit;
        if self.bits[word] & mask == 0 {
            return false;
        }
        self.bits[word] &= !mask;
        self.len -= 1;
        true
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        let idx = pos.to_index(self.size);
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.bits.fill(0);
        self.len = 0;
    }

    /// Undo a `Board::update_candidates` call: drop the cells it added and
    /// put back the cell it removed.
    pub fn revert(&mut self, delta: &CandidateDelta) {
        for &pos in &delta.added {
            self.remove(pos);
        }
        if let (Some(pos), true) = (delta.pos, delta.removed) {
            self.insert(pos);
        }
    }

    /// Iterate over members in row-major order
    pub fn iter(&self) -> CandidateIter<'_> {
        CandidateIter {
            set: self,
            word_idx: 0,
            current_word: self.bits.first().copied().unwrap_or(0),
        }
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = Pos;
    type IntoIter = CandidateIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the cells in a `CandidateSet`
pub struct CandidateIter<'a> {
    set: &'a CandidateSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for CandidateIter<'_> {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_word == 0 {
            self.word_idx += 1;
            if self.word_idx >= self.set.bits.len() {
                return None;
            }
            self.current_word = self.set.bits[self.word_idx];
        }

        let bit_pos = self.current_word.trailing_zeros() as usize;
        let idx = self.word_idx * 64 + bit_pos;
        self.current_word &= self.current_word - 1;

        Some(Pos::from_index(idx, self.set.size))
    }
}
