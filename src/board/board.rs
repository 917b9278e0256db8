//! Board structure with move history and incremental hashing

use std::fmt;

use super::candidates::{CandidateDelta, CandidateSet};
use super::{Marker, Pos, DIRECTIONS, MAX_BOARD_SIZE, MIN_BOARD_SIZE, NEIGHBOR_OFFSETS, WIN_LENGTH};
use crate::search::ZobristTable;

/// Game board with undo history and a running Zobrist hash.
///
/// Search mutates the board in place and undoes its own moves, so the
/// history is a strict LIFO stack. The marker for a history entry is read
/// back from the grid when it is undone.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Marker>,
    history: Vec<Pos>,
    hash: u64,
    zobrist: ZobristTable,
}

impl Board {
    /// Create an empty `size x size` board with freshly generated Zobrist keys.
    ///
    /// # Panics
    ///
    /// Panics if `size` is outside `MIN_BOARD_SIZE..=MAX_BOARD_SIZE`.
    /// `GameConfig::validate` checks this for user-supplied sizes.
    pub fn new(size: usize) -> Self {
        Self::with_zobrist(ZobristTable::generate(size))
    }

    /// Create an empty board using an existing key table (its size decides the board size).
    pub fn with_zobrist(zobrist: ZobristTable) -> Self {
        let size = zobrist.size();
        assert!(
            (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size),
            "board size {size} out of range"
        );
        Self {
            size,
            cells: vec![Marker::Empty; size * size],
            history: Vec::with_capacity(size * size),
            hash: 0,
            zobrist,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current Zobrist hash of the position
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn zobrist(&self) -> &ZobristTable {
        &self.zobrist
    }

    /// Get marker at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Marker {
        self.cells[pos.to_index(self.size)]
    }

    /// Marker at signed coordinates, `None` when off the board
    #[inline]
    pub fn get_checked(&self, col: i32, row: i32) -> Option<Marker> {
        Pos::checked(col, row, self.size).map(|p| self.get(p))
    }

    #[inline]
    pub fn is_empty_cell(&self, pos: Pos) -> bool {
        self.get(pos) == Marker::Empty
    }

    /// Bounds and occupancy check for untrusted input
    pub fn is_legal(&self, col: i32, row: i32) -> bool {
        self.get_checked(col, row) == Some(Marker::Empty)
    }

    /// Moves in play order
    #[inline]
    pub fn history(&self) -> &[Pos] {
        &self.history
    }

    #[inline]
    pub fn last_move(&self) -> Option<Pos> {
        self.history.last().copied()
    }

    #[inline]
    pub fn stone_count(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.history.len() == self.cells.len()
    }

    /// Centre cell, the opening move on an empty board
    #[inline]
    pub fn center(&self) -> Pos {
        #[allow(clippy::cast_possible_truncation)]
        let mid = (self.size / 2) as u8;
        Pos::new(mid, mid)
    }

    /// Iterate over every cell with its marker, row-major
    pub fn cells(&self) -> impl Iterator<Item = (Pos, Marker)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, &m)| (Pos::from_index(idx, self.size), m))
    }

    /// Place a marker. The caller guarantees the cell is on the board and empty.
    #[inline]
    pub fn place(&mut self, pos: Pos, marker: Marker) {
        debug_assert!(marker != Marker::Empty);
        debug_assert!(self.is_empty_cell(pos), "cell {pos} is occupied");
        self.cells[pos.to_index(self.size)] = marker;
        self.history.push(pos);
        self.hash = self.zobrist.update(self.hash, pos, marker);
    }

    /// Take back the most recent move. Returns `None` (and does nothing)
    /// on an empty history.
    pub fn undo(&mut self) -> Option<Pos> {
        let pos = self.history.pop()?;
        let idx = pos.to_index(self.size);
        self.hash = self.zobrist.update(self.hash, pos, self.cells[idx]);
        self.cells[idx] = Marker::Empty;
        Some(pos)
    }

    /// Remove every marker, keeping the key table.
    pub fn clear(&mut self) {
        self.cells.fill(Marker::Empty);
        self.history.clear();
        self.hash = 0;
    }

    /// Count contiguous `marker` cells from `pos` (exclusive) along `(dc, dr)`,
    /// stopping after `limit` cells.
    fn run_length(&self, pos: Pos, dc: i32, dr: i32, marker: Marker, limit: usize) -> usize {
        (1..=limit as i32)
            .take_while(|&step| {
                pos.offset(dc, dr, step, self.size)
                    .is_some_and(|p| self.get(p) == marker)
            })
            .count()
    }

    /// Longest line of `marker` through `pos` over the four directions,
    /// counting `pos` itself as holding `marker`.
    fn longest_line_through(&self, pos: Pos, marker: Marker) -> usize {
        let reach = WIN_LENGTH - 1;
        DIRECTIONS
            .iter()
            .map(|&(dc, dr)| {
                1 + self.run_length(pos, dc, dr, marker, reach)
                    + self.run_length(pos, -dc, -dr, marker, reach)
            })
            .max()
            .unwrap_or(1)
    }

    /// Did the most recent move complete five or more in a row?
    ///
    /// Only the four lines through the last move are read. Returns `false`
    /// on an empty history.
    pub fn is_winning_last_move(&self) -> bool {
        let Some(pos) = self.last_move() else {
            return false;
        };
        let marker = self.get(pos);
        marker != Marker::Empty && self.longest_line_through(pos, marker) >= WIN_LENGTH
    }

    /// Would placing `marker` on the empty cell `pos` complete five in a row?
    pub fn completes_five(&self, pos: Pos, marker: Marker) -> bool {
        marker != Marker::Empty && self.longest_line_through(pos, marker) >= WIN_LENGTH
    }

    /// The full winning run through the last move, if it won.
    pub fn winning_line(&self) -> Option<Vec<Pos>> {
        let pos = self.last_move()?;
        let marker = self.get(pos);
        let unbounded = self.size;

        DIRECTIONS.iter().find_map(|&(dc, dr)| {
            let back = self.run_length(pos, -dc, -dr, marker, unbounded) as i32;
            let fwd = self.run_length(pos, dc, dr, marker, unbounded) as i32;
            if (back + fwd + 1) as usize >= WIN_LENGTH {
                Some(
                    (-back..=fwd)
                        .filter_map(|step| pos.offset(dc, dr, step, self.size))
                        .collect(),
                )
            } else {
                None
            }
        })
    }

    /// Chebyshev distance from `pos` to the last move, 0 on an empty history.
    #[inline]
    pub fn chebyshev_distance(&self, pos: Pos) -> u8 {
        self.last_move().map_or(0, |last| pos.chebyshev(last))
    }

    /// Maintain the candidate set after `pos` has been occupied.
    ///
    /// Removes `pos` and adds every empty, on-board cell at the neighbour
    /// offsets that was not already present. The returned delta lets a
    /// backtracking caller restore the set with `CandidateSet::revert`.
    pub fn update_candidates(&self, candidates: &mut CandidateSet, pos: Pos) -> CandidateDelta {
        let removed = candidates.remove(pos);
        let mut added = Vec::with_capacity(NEIGHBOR_OFFSETS.len());

        for &(dc, dr) in &NEIGHBOR_OFFSETS {
            if let Some(n) = pos.offset(dc, dr, 1, self.size) {
                if self.is_empty_cell(n) && candidates.insert(n) {
                    added.push(n);
                }
            }
        }

        CandidateDelta {
            pos: Some(pos),
            removed,
            added,
        }
    }

    /// Rebuild a candidate set from scratch for the current position.
    pub fn candidates(&self) -> CandidateSet {
        let mut set = CandidateSet::new(self.size);
        for &pos in &self.history {
            self.update_candidates(&mut set, pos);
        }
        set
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.size {
            write!(f, " {}", column_label(col))?;
        }
        writeln!(f)?;

        for row in 0..self.size {
            write!(f, "{row:>3}")?;
            for col in 0..self.size {
                #[allow(clippy::cast_possible_truncation)]
                let pos = Pos::new(col as u8, row as u8);
                write!(f, " {}", self.get(pos).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Column letter used by the text board and coordinate parser
pub fn column_label(col: usize) -> char {
    const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!?";
    LABELS.get(col).map_or('?', |&b| b as char)
}
