//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when placing/removing markers.
//! The board keeps a running hash that the transposition table uses as its key.
//!
//! # Example
//!
//! ```
//! use gomoku::board::{Marker, Pos};
//! use gomoku::search::ZobristTable;
//!
//! let zt = ZobristTable::with_seed(20, 7);
//! let pos = Pos::new(9, 9);
//!
//! let placed = zt.update(0, pos, Marker::Ai);
//! // XOR is its own inverse: removing restores the previous hash
//! assert_eq!(zt.update(placed, pos, Marker::Ai), 0);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Marker, Pos};

/// Zobrist key table for one board size.
///
/// Holds one random key per (cell, side). Empty cells contribute nothing,
/// so the hash of a board is the XOR of the keys of the markers on it,
/// whatever order they were placed in.
#[derive(Debug, Clone)]
pub struct ZobristTable {
    /// Keys laid out as `[cell][side]`, side 0 = Player, 1 = Ai
    keys: Vec<[u64; 2]>,
    size: usize,
}

impl ZobristTable {
    /// Generate a table from OS entropy.
    #[must_use]
    pub fn generate(size: usize) -> Self {
        Self::from_rng(size, &mut StdRng::from_entropy())
    }

    /// Generate a reproducible table from a fixed seed.
    #[must_use]
    pub fn with_seed(size: usize, seed: u64) -> Self {
        Self::from_rng(size, &mut StdRng::seed_from_u64(seed))
    }

    fn from_rng(size: usize, rng: &mut StdRng) -> Self {
        let keys = (0..size * size).map(|_| [rng.gen(), rng.gen()]).collect();
        Self { keys, size }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Key for a marker on a cell. Always 0 for `Marker::Empty`.
    #[inline]
    #[must_use]
    pub fn key(&self, pos: Pos, marker: Marker) -> u64 {
        let cell = &self.keys[pos.to_index(self.size)];
        match marker {
            Marker::Player => cell[0],
            Marker::Ai => cell[1],
            Marker::Empty => 0,
        }
    }

    /// Toggle a marker in or out of `hash`. Used for both placing and
    /// removing since XOR is self-inverse.
    #[inline]
    #[must_use]
    pub fn update(&self, hash: u64, pos: Pos, marker: Marker) -> u64 {
        hash ^ self.key(pos, marker)
    }

    /// Compute the full hash for a board from scratch.
    #[must_use]
    pub fn hash_board(&self, board: &Board) -> u64 {
        board
            .cells()
            .filter(|&(_, marker)| marker != Marker::Empty)
            .fold(0, |h, (pos, marker)| h ^ self.key(pos, marker))
    }
}
