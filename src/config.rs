//! Engine and game configuration
//!
//! Defaults match a 20x20 game with a one-second move budget.

use std::time::Duration;

use crate::board::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::{GameError, Result};

/// Search tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Wall-clock budget per move
    pub time_limit: Duration,
    /// Iterative deepening stops here even with time left
    pub max_depth: u8,
    /// Transposition table size in megabytes
    pub tt_size_mb: usize,
    /// Remaining depth from which non-first moves get a null-window probe
    pub pvs_min_depth: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_millis(1000),
            max_depth: 50,
            tt_size_mb: 16,
            pvs_min_depth: 3,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_tt_size_mb(mut self, tt_size_mb: usize) -> Self {
        self.tt_size_mb = tt_size_mb;
        self
    }

    #[must_use]
    pub fn with_pvs_min_depth(mut self, pvs_min_depth: u8) -> Self {
        self.pvs_min_depth = pvs_min_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_limit.is_zero() {
            return Err(GameError::InvalidTimeLimit);
        }
        Ok(())
    }
}

/// Settings for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub board_size: usize,
    pub search: SearchConfig,
    /// Fixed Zobrist seed for reproducible hashing; random when `None`
    pub zobrist_seed: Option<u64>,
    /// Whether the human moves first
    pub player_starts: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            search: SearchConfig::default(),
            zobrist_seed: None,
            player_starts: true,
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn with_board_size(mut self, board_size: usize) -> Self {
        self.board_size = board_size;
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    #[must_use]
    pub fn with_zobrist_seed(mut self, seed: u64) -> Self {
        self.zobrist_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_player_starts(mut self, player_starts: bool) -> Self {
        self.player_starts = player_starts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(GameError::InvalidBoardSize {
                size: self.board_size,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }
        self.search.validate()
    }
}
