//! Search module for Gomoku AI
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - History heuristic for move ordering
//! - Alpha-Beta search with iterative deepening
//! - Metrics observer

pub mod alphabeta;
pub mod history;
pub mod observer;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{SearchResult, Searcher, EARLY_STOP_GAIN, WIN_SCORE};
pub use history::HistoryTable;
pub use observer::{NoopObserver, SearchObserver, SearchStats};
pub use tt::{Bound, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristTable;
