//! History heuristic
//!
//! Cells that caused cutoffs anywhere in the tree are tried earlier among
//! moves of equal delta. Deep cutoffs weigh exponentially more.

use crate::board::Pos;

/// Largest shift applied on a cutoff, keeps the sum far from overflow
const MAX_SHIFT: u8 = 40;

#[derive(Debug, Clone)]
pub struct HistoryTable {
    scores: Vec<u64>,
    size: usize,
}

impl HistoryTable {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            scores: vec![0; size * size],
            size,
        }
    }

    /// Zero every cell, resizing if the board size changed.
    pub fn reset(&mut self, size: usize) {
        if self.size != size {
            *self = Self::new(size);
        } else {
            self.scores.fill(0);
        }
    }

    /// Record a cutoff at `pos` with `depth` plies remaining.
    #[inline]
    pub fn bump(&mut self, pos: Pos, depth: u8) {
        let idx = pos.to_index(self.size);
        self.scores[idx] = self.scores[idx].saturating_add(1u64 << depth.min(MAX_SHIFT));
    }

    #[inline]
    #[must_use]
    pub fn score(&self, pos: Pos) -> u64 {
        self.scores[pos.to_index(self.size)]
    }
}
