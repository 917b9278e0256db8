//! Heuristic evaluation
//!
//! - [`patterns`]: the ordered pattern list and its per-side compiled tables
//! - [`heuristic`]: line windows and the incremental move delta

pub mod heuristic;
pub mod patterns;

pub use heuristic::{line_window, line_window_value, move_value_delta, LineWindow, WINDOW_RADIUS};
pub use patterns::{pattern_tables, PatternScore, PatternTable, PATTERNS};
