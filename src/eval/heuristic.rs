//! Incremental heuristic evaluation
//!
//! A position is never scored as a whole. Instead every move carries a
//! delta: the change in pattern value of the four line windows through the
//! move, measured before and after the marker lands. Search accumulates these
//! deltas along the path from the root.
//!
//! Windows are scored whole rather than patched, because one marker can
//! change which pattern a window matches. A fragment worth `OPEN_THREE` can
//! turn into a `FOUR` or drop to a `CLOSED_THREE`.
//!
//! Sign convention throughout: positive favours `Marker::Ai`, negative
//! favours `Marker::Player`.

use crate::board::{Board, Marker, Pos, DIRECTIONS};

use super::patterns::pattern_tables;

/// Cells read on each side of the move
pub const WINDOW_RADIUS: i32 = 5;

/// Longest possible window
pub const MAX_WINDOW: usize = 2 * WINDOW_RADIUS as usize + 1;

/// A line of up to `MAX_WINDOW` cells through a move, clipped at the board
/// edge. A clipped end reads like a blocked end to the pattern matcher.
#[derive(Debug, Clone, Copy)]
pub struct LineWindow {
    cells: [Marker; MAX_WINDOW],
    len: usize,
}

impl LineWindow {
    #[inline]
    pub fn as_slice(&self) -> &[Marker] {
        &self.cells[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Collect the window through `pos` along `(dc, dr)`.
///
/// With `placed = Some(m)` the centre cell reads as `m` regardless of the
/// board, which is how the "after" window of a move is produced without
/// writing to the board.
pub fn line_window(
    board: &Board,
    pos: Pos,
    (dc, dr): (i32, i32),
    placed: Option<Marker>,
) -> LineWindow {
    let mut window = LineWindow {
        cells: [Marker::Empty; MAX_WINDOW],
        len: 0,
    };

    for step in -WINDOW_RADIUS..=WINDOW_RADIUS {
        let Some(p) = pos.offset(dc, dr, step, board.size()) else {
            continue;
        };
        let marker = match placed {
            Some(m) if step == 0 => m,
            _ => board.get(p),
        };
        window.cells[window.len] = marker;
        window.len += 1;
    }

    window
}

/// Value of one window: best `Ai` pattern minus best `Player` pattern.
pub fn line_window_value(window: &[Marker]) -> i32 {
    let tables = pattern_tables();
    tables.ai.best_match(window) - tables.player.best_match(window)
}

/// Change in heuristic value from putting `marker` on the empty cell `pos`.
///
/// The board is left untouched.
#[must_use]
pub fn move_value_delta(board: &Board, pos: Pos, marker: Marker) -> i32 {
    debug_assert!(board.is_empty_cell(pos));

    DIRECTIONS
        .iter()
        .map(|&dir| {
            let before = line_window(board, pos, dir, None);
            let after = line_window(board, pos, dir, Some(marker));
            line_window_value(after.as_slice()) - line_window_value(before.as_slice())
        })
        .sum()
}

impl Board {
    /// Heuristic delta of placing `marker` at `pos`; see [`move_value_delta`].
    #[inline]
    #[must_use]
    pub fn move_value_delta(&self, pos: Pos, marker: Marker) -> i32 {
        move_value_delta(self, pos, marker)
    }
}
