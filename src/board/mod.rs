//! Board representation for Gomoku

pub mod board;
pub mod candidates;


// Re-exports
pub use board::{column_label, Board};
pub use candidates::{CandidateDelta, CandidateSet};

/// Default board size (20x20)
pub const DEFAULT_BOARD_SIZE: usize = 20;
/// Smallest board on which five in a row fits
pub const MIN_BOARD_SIZE: usize = 5;
/// Largest supported board (coordinates are stored as `u8`)
pub const MAX_BOARD_SIZE: usize = 64;

/// Stones needed in a row to win
pub const WIN_LENGTH: usize = 5;

/// Line directions as (dcol, drow): horizontal, vertical, diagonal, anti-diagonal.
/// Each line is scanned both ways, so four directions cover all eight rays.
pub const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Neighbourhood used for candidate generation: the 8 adjacent cells plus
/// the 8 cells two steps away along rows, columns and diagonals.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 16] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (-2, -2),
    (0, -2),
    (2, -2),
    (-2, 0),
    (2, 0),
    (-2, 2),
    (0, 2),
    (2, 2),
];

/// Cell contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Marker {
    #[default]
    Empty,
    /// Human side, minimizing
    Player,
    /// Engine side, maximizing
    Ai,
}

impl Marker {
    /// Get the other side
    #[inline]
    pub fn opponent(self) -> Marker {
        match self {
            Marker::Player => Marker::Ai,
            Marker::Ai => Marker::Player,
            Marker::Empty => Marker::Empty,
        }
    }

    /// Single-character symbol used by the text board
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Marker::Empty => '.',
            Marker::Player => 'X',
            Marker::Ai => 'O',
        }
    }
}

/// Position on the board, column first to match the `(x, y)` input order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub col: u8,
    pub row: u8,
}

impl Pos {
    #[inline]
    pub fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Build a position from signed coordinates, `None` if outside `[0, size)`.
    #[inline]
    pub fn checked(col: i32, row: i32, size: usize) -> Option<Self> {
        if !Self::in_bounds(col, row, size) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pos = Self::new(col as u8, row as u8);
        Some(pos)
    }

    #[inline]
    pub fn in_bounds(col: i32, row: i32, size: usize) -> bool {
        let size = size as i32;
        col >= 0 && col < size && row >= 0 && row < size
    }

    /// Flat index into a `size * size` grid (row-major)
    #[inline]
    pub fn to_index(self, size: usize) -> usize {
        self.row as usize * size + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize, size: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let pos = Self {
            col: (idx % size) as u8,
            row: (idx / size) as u8,
        };
        pos
    }

    /// Step `steps` cells along `(dc, dr)`, `None` when it leaves the board.
    #[inline]
    pub fn offset(self, dc: i32, dr: i32, steps: i32, size: usize) -> Option<Self> {
        Self::checked(
            i32::from(self.col) + dc * steps,
            i32::from(self.row) + dr * steps,
            size,
        )
    }

    /// Chebyshev (king-move) distance
    #[inline]
    pub fn chebyshev(self, other: Pos) -> u8 {
        self.col.abs_diff(other.col).max(self.row.abs_diff(other.row))
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}
