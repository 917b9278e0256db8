//! Gomoku AI Engine
//!
//! A Gomoku (five in a row) engine for a human-versus-AI game on a square
//! board of configurable size:
//! - Freestyle rules, five or more in a row wins
//! - Incremental pattern-based evaluation
//! - Iterative-deepening alpha-beta search under a wall-clock budget
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Board state, move history and the candidate frontier
//! - [`eval`]: Line patterns and the incremental move delta
//! - [`search`]: Zobrist hashing, transposition table and alpha-beta search
//! - [`game`]: Turn loop, move validation and the background AI worker
//! - [`config`] and [`error`]: settings and the driver's error type
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use gomoku::{Game, GameConfig, Marker, SearchConfig};
//!
//! let config = GameConfig::default()
//!     .with_board_size(15)
//!     .with_search(SearchConfig::default().with_time_limit(Duration::from_millis(100)));
//! let mut game = Game::new(config).unwrap();
//!
//! game.play(7, 7).unwrap();
//! let reply = game.ai_move().unwrap();
//! assert_eq!(game.board().get(reply), Marker::Ai);
//! ```
//!
//! # Search Priority
//!
//! At every node the searcher:
//! 1. Answers from the transposition table when a deep enough entry settles it
//! 2. Plays an immediate five if one exists
//! 3. Otherwise tries moves best first: table move, heuristic delta,
//!    history weight, distance to the last move

pub mod board;
pub mod config;
pub mod error;
pub mod eval;
pub mod game;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, CandidateSet, Marker, Pos};
pub use config::{GameConfig, SearchConfig};
pub use error::{GameError, Result};
pub use game::{parse_coordinate, Game, GameStatus};
pub use search::{SearchResult, Searcher};
