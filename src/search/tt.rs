//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by board hash,
//! enabling reuse of previous search results for positions we've seen before.
//! Entries survive between top-level searches; the depth guard keeps a
//! shallow entry from answering a deeper query.
//!
//! # Example
//!
//! ```
//! use gomoku::board::Pos;
//! use gomoku::search::{Bound, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1); // 1 MB
//!
//! let hash = 0x123456789ABCDEF0;
//! tt.store(hash, 5, 100, Bound::Exact, Some(Pos::new(9, 9)));
//!
//! let entry = tt.probe(hash).unwrap();
//! assert_eq!(entry.value, 100);
//! assert_eq!(entry.best_move, Some(Pos::new(9, 9)));
//! ```

use crate::board::Pos;

/// How a stored value relates to the true value of the position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Searched with an open window
    Exact,
    /// Failed high: true value >= stored value
    Lower,
    /// Failed low: true value <= stored value
    Upper,
}

/// Transposition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    /// Zobrist hash of the position
    pub hash: u64,
    /// Value as seen from the maximizing (AI) side
    pub value: i32,
    /// Best move found for this position
    pub best_move: Option<Pos>,
    /// Remaining depth the value was searched to
    pub depth: u8,
    pub bound: Bound,
}

impl TTEntry {
    /// Apply this entry to a node searching `depth` plies with window
    /// `(alpha, beta)`.
    ///
    /// Returns the value to answer with when the entry settles the node.
    /// Otherwise a bound entry may narrow the window in place.
    pub fn resolve(&self, depth: u8, alpha: &mut i32, beta: &mut i32) -> Option<i32> {
        if self.depth < depth {
            return None;
        }

        match self.bound {
            Bound::Exact => return Some(self.value),
            Bound::Lower => *alpha = (*alpha).max(self.value),
            Bound::Upper => *beta = (*beta).min(self.value),
        }

        (*alpha >= *beta).then_some(self.value)
    }
}

/// Transposition table for caching search results.
///
/// Uses a simple direct-mapped approach where each hash maps to exactly
/// one slot. Collisions are handled by replacement policies based on
/// search depth.
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    size: usize,
}

impl TranspositionTable {
    /// Create a new transposition table with the given size in megabytes.
    ///
    /// ```
    /// use gomoku::search::TranspositionTable;
    ///
    /// let tt = TranspositionTable::new(16); // 16 MB table
    /// assert!(tt.stats().size >= 1024);
    /// ```
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let size = (size_mb * 1024 * 1024) / entry_size;

        // Ensure at least some entries
        let size = size.max(1024);

        Self {
            entries: vec![None; size],
            size,
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.size as u64) as usize
    }

    /// Look up the entry stored for `hash`, if the slot still holds it.
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<TTEntry> {
        self.entries[self.index(hash)].filter(|e| e.hash == hash)
    }

    /// Best move from a previous search of this position, for move ordering.
    #[must_use]
    pub fn best_move(&self, hash: u64) -> Option<Pos> {
        self.probe(hash).and_then(|e| e.best_move)
    }

    /// Store a position in the table.
    ///
    /// Uses a depth-preferred replacement policy: an entry is replaced if
    /// the slot is empty, contains the same position, or the new search
    /// is at least as deep as the existing entry.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u8,
        value: i32,
        bound: Bound,
        best_move: Option<Pos>,
    ) {
        let idx = self.index(hash);

        let should_replace = match &self.entries[idx] {
            None => true,
            Some(e) => e.hash == hash || e.depth <= depth,
        };

        if should_replace {
            self.entries[idx] = Some(TTEntry {
                hash,
                value,
                best_move,
                depth,
                bound,
            });
        }
    }

    /// Clear all entries in the table.
    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let used = self.entries.iter().filter(|e| e.is_some()).count();
        TTStats {
            size: self.size,
            used,
            usage_percent: (used as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}
