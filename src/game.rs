//! Game driver
//!
//! Owns the persistent board, the running candidate set and the running
//! heuristic value for a human-versus-AI game. Human moves are validated
//! here; the search only ever sees cells it generated itself.
//!
//! The AI can move inline with [`Game::ai_move`] or on a worker thread with
//! [`Game::start_ai_search`] and [`Game::poll_ai`]. While a worker runs it owns
//! the [`Searcher`] and a copy of the position, so the game's own board is
//! never shared.

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use log::{debug, info};

use crate::board::{column_label, Board, CandidateSet, Marker, Pos};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::search::{NoopObserver, SearchResult, Searcher, ZobristTable};

/// Where the game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won(Marker),
    /// Board filled without a five
    Draw,
}

/// What a worker thread hands back
type WorkerReply = (Searcher, SearchResult);

struct Worker {
    receiver: Receiver<WorkerReply>,
    started: Instant,
}

pub struct Game {
    config: GameConfig,
    board: Board,
    candidates: CandidateSet,
    value: i32,
    turn: Marker,
    status: GameStatus,
    /// `None` while a worker owns it
    searcher: Option<Searcher>,
    worker: Option<Worker>,
    last_search: Option<SearchResult>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let board = match config.zobrist_seed {
            Some(seed) => Board::with_zobrist(ZobristTable::with_seed(config.board_size, seed)),
            None => Board::new(config.board_size),
        };

        Ok(Self {
            candidates: CandidateSet::new(config.board_size),
            board,
            value: 0,
            turn: first_mover(&config),
            status: GameStatus::InProgress,
            searcher: Some(Searcher::new(config.search.clone())),
            worker: None,
            last_search: None,
            config,
        })
    }

    /// Start over on an empty board. Also forgets everything the searcher
    /// learned during the previous game.
    pub fn new_game(&mut self) -> Result<()> {
        self.ensure_idle()?;

        self.board.clear();
        self.candidates.clear();
        self.value = 0;
        self.turn = first_mover(&self.config);
        self.status = GameStatus::InProgress;
        self.last_search = None;
        if let Some(searcher) = self.searcher.as_mut() {
            searcher.clear();
        }
        info!("new {0}x{0} game", self.config.board_size);
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// Running heuristic value, positive when the AI is ahead
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn turn(&self) -> Marker {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Marker> {
        match self.status {
            GameStatus::Won(marker) => Some(marker),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    pub fn is_ai_thinking(&self) -> bool {
        self.worker.is_some()
    }

    /// How long the running worker has been thinking
    pub fn ai_thinking_elapsed(&self) -> Option<std::time::Duration> {
        self.worker.as_ref().map(|w| w.started.elapsed())
    }

    /// Result of the most recent AI search
    pub fn last_search(&self) -> Option<&SearchResult> {
        self.last_search.as_ref()
    }

    /// Play the human move at `(col, row)`.
    pub fn play(&mut self, col: i32, row: i32) -> Result<Pos> {
        self.ensure_playable(Marker::Player)?;

        let size = self.board.size();
        let pos = Pos::checked(col, row, size).ok_or(GameError::OutOfBounds {
            col,
            row,
            max: size - 1,
        })?;
        if !self.board.is_empty_cell(pos) {
            return Err(GameError::Occupied {
                col: pos.col,
                row: pos.row,
            });
        }

        self.commit(pos, Marker::Player);
        Ok(pos)
    }

    /// Search and play the AI move on the calling thread.
    pub fn ai_move(&mut self) -> Result<Pos> {
        self.ensure_playable(Marker::Ai)?;
        let searcher = self.searcher.as_mut().ok_or(GameError::AiBusy)?;

        let time_limit = self.config.search.time_limit;
        let result = searcher.find_move_observed(
            &mut self.board,
            &mut self.candidates,
            self.value,
            time_limit,
            &mut NoopObserver,
        );
        self.finish_search(result)
    }

    /// Hand the AI move to a worker thread. Collect it with
    /// [`Game::poll_ai`] or [`Game::wait_ai`].
    pub fn start_ai_search(&mut self) -> Result<()> {
        self.ensure_playable(Marker::Ai)?;
        let mut searcher = self.searcher.take().ok_or(GameError::AiBusy)?;

        let mut board = self.board.clone();
        let mut candidates = self.candidates.clone();
        let value = self.value;
        let (tx, rx) = channel();

        thread::spawn(move || {
            let result = searcher.find_move_with_stats(&mut board, &mut candidates, value);
            // Receiver gone means the game was dropped
            let _ = tx.send((searcher, result));
        });

        debug!("AI search started on worker thread");
        self.worker = Some(Worker {
            receiver: rx,
            started: Instant::now(),
        });
        Ok(())
    }

    /// Commit the worker's move if it is ready. `Ok(None)` while the worker
    /// is still thinking or when none was started.
    pub fn poll_ai(&mut self) -> Result<Option<Pos>> {
        let Some(worker) = &self.worker else {
            return Ok(None);
        };

        let reply = match worker.receiver.try_recv() {
            Ok(reply) => reply,
            Err(TryRecvError::Empty) => return Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.recover_from_lost_worker();
                return Err(GameError::WorkerDisconnected);
            }
        };

        self.accept_reply(reply).map(Some)
    }

    /// Block until the worker's move is ready and commit it.
    pub fn wait_ai(&mut self) -> Result<Pos> {
        let Some(worker) = &self.worker else {
            return Err(GameError::NotYourTurn);
        };

        match worker.receiver.recv() {
            Ok(reply) => self.accept_reply(reply),
            Err(_) => {
                self.recover_from_lost_worker();
                Err(GameError::WorkerDisconnected)
            }
        }
    }

    /// Take back moves until a human move has been taken back, so the human
    /// can replay it. Returns how many moves were undone.
    pub fn undo_turn(&mut self) -> Result<usize> {
        self.ensure_idle()?;

        let mut undone = 0;
        while let Some(pos) = self.board.last_move() {
            let marker = self.board.get(pos);
            self.board.undo();
            self.value -= self.board.move_value_delta(pos, marker);
            self.turn = marker;
            undone += 1;
            if marker == Marker::Player {
                break;
            }
        }

        if undone > 0 {
            self.candidates = self.board.candidates();
            self.status = GameStatus::InProgress;
            info!("took back {undone} move(s), value {}", self.value);
        }
        Ok(undone)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.worker.is_some() {
            return Err(GameError::AiBusy);
        }
        Ok(())
    }

    fn ensure_playable(&self, side: Marker) -> Result<()> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        self.ensure_idle()?;
        if self.turn != side {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    fn accept_reply(&mut self, (searcher, result): WorkerReply) -> Result<Pos> {
        if let Some(worker) = self.worker.take() {
            debug!("AI worker finished after {:?}", worker.started.elapsed());
        }
        self.searcher = Some(searcher);
        self.finish_search(result)
    }

    fn recover_from_lost_worker(&mut self) {
        self.worker = None;
        self.searcher = Some(Searcher::new(self.config.search.clone()));
    }

    fn finish_search(&mut self, result: SearchResult) -> Result<Pos> {
        let best_move = result.best_move;
        debug!(
            "AI search: depth {}, score {}, {} nodes, timed out: {}",
            result.depth, result.score, result.stats.nodes, result.timed_out
        );
        self.last_search = Some(result);

        let pos = best_move.ok_or(GameError::NoMoveAvailable)?;
        self.commit(pos, Marker::Ai);
        Ok(pos)
    }

    /// Make a validated move permanent.
    fn commit(&mut self, pos: Pos, marker: Marker) {
        self.value += self.board.move_value_delta(pos, marker);
        self.board.place(pos, marker);
        self.board.update_candidates(&mut self.candidates, pos);
        info!(
            "{marker:?} plays {}{}, value {}",
            column_label(pos.col as usize),
            pos.row,
            self.value
        );

        if self.board.is_winning_last_move() {
            self.status = GameStatus::Won(marker);
            info!("{marker:?} wins");
        } else if self.board.is_full() {
            self.status = GameStatus::Draw;
            info!("board full, draw");
        } else {
            self.turn = marker.opponent();
        }
    }
}

fn first_mover(config: &GameConfig) -> Marker {
    if config.player_starts {
        Marker::Player
    } else {
        Marker::Ai
    }
}

/// Parse a move typed as `"<col> <row>"`.
///
/// The column is either a number or the label shown above the board (a
/// letter, case-insensitive on boards of up to 26 columns). The row is a
/// number. A comma works as the separator too.
pub fn parse_coordinate(input: &str, size: usize) -> Result<Pos> {
    let parse_err = |reason: &str| GameError::Parse {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let (Some(col_text), Some(row_text), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(parse_err("expected a column and a row"));
    };

    let col = parse_column(col_text, size).ok_or_else(|| parse_err("bad column"))?;
    let row: i32 = row_text.parse().map_err(|_| parse_err("row must be a number"))?;

    Pos::checked(col, row, size).ok_or(GameError::OutOfBounds {
        col,
        row,
        max: size - 1,
    })
}

fn parse_column(text: &str, size: usize) -> Option<i32> {
    if let Ok(n) = text.parse::<i32>() {
        return Some(n);
    }

    let mut chars = text.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };

    if size <= 26 && c.is_ascii_alphabetic() {
        return Some(i32::from(c.to_ascii_lowercase() as u8 - b'a'));
    }
    (0..size).find(|&i| column_label(i) == c).map(|i| i as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use std::time::Duration;

    fn config() -> GameConfig {
        GameConfig::default().with_zobrist_seed(7).with_search(
            SearchConfig::default()
                .with_time_limit(Duration::from_millis(150))
                .with_tt_size_mb(1),
        )
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(
            Game::new(config().with_board_size(3)),
            Err(GameError::InvalidBoardSize { size: 3, .. })
        ));
    }

    #[test]
    fn test_play_validates() {
        let mut game = Game::new(config()).unwrap();
        assert!(matches!(
            game.play(-1, 3),
            Err(GameError::OutOfBounds { col: -1, row: 3, max: 19 })
        ));
        assert!(matches!(game.play(3, 20), Err(GameError::OutOfBounds { .. })));

        assert_eq!(game.play(10, 10).unwrap(), Pos::new(10, 10));
        assert_eq!(game.turn(), Marker::Ai);
        assert!(matches!(game.play(11, 11), Err(GameError::NotYourTurn)));
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut game = Game::new(config()).unwrap();
        game.play(10, 10).unwrap();
        let ai = game.ai_move().unwrap();
        assert!(matches!(
            game.play(i32::from(ai.col), i32::from(ai.row)),
            Err(GameError::Occupied { .. })
        ));
        assert!(matches!(game.play(10, 10), Err(GameError::Occupied { col: 10, row: 10 })));
    }

    #[test]
    fn test_commit_tracks_value_and_candidates() {
        let mut game = Game::new(config()).unwrap();
        game.play(10, 10).unwrap();
        assert_eq!(game.value(), -4);
        assert_eq!(game.candidates().len(), 16);

        let ai = game.ai_move().unwrap();
        assert!(game.board().get(ai) == Marker::Ai);
        assert_eq!(game.turn(), Marker::Player);
        assert_eq!(game.candidates(), &game.board().candidates());
        assert!(game.last_search().is_some());
    }

    #[test]
    fn test_ai_first() {
        let mut game = Game::new(config().with_player_starts(false)).unwrap();
        assert!(matches!(game.play(1, 1), Err(GameError::NotYourTurn)));
        assert_eq!(game.ai_move().unwrap(), Pos::new(10, 10));
    }

    #[test]
    fn test_win_ends_game() {
        let mut game = Game::new(config()).unwrap();
        // Player builds a row on row 0 while the AI plays elsewhere
        for col in 0..5 {
            game.play(col, 0).unwrap();
            if game.is_over() {
                break;
            }
            // Force the AI reply away from the row by playing it directly
            game.commit(Pos::new(col as u8, 10), Marker::Ai);
        }
        assert_eq!(game.winner(), Some(Marker::Player));
        assert_eq!(game.status(), GameStatus::Won(Marker::Player));
        assert!(matches!(game.play(7, 7), Err(GameError::GameOver)));
        assert!(matches!(game.ai_move(), Err(GameError::GameOver)));
    }

    #[test]
    fn test_worker_search() {
        let mut game = Game::new(config()).unwrap();
        game.play(10, 10).unwrap();
        game.start_ai_search().unwrap();
        assert!(game.is_ai_thinking());
        assert!(matches!(game.play(11, 11), Err(GameError::AiBusy)));
        assert!(matches!(game.new_game(), Err(GameError::AiBusy)));

        let pos = game.wait_ai().unwrap();
        assert!(!game.is_ai_thinking());
        assert_eq!(game.board().get(pos), Marker::Ai);
        assert_eq!(game.board().stone_count(), 2);
        assert_eq!(game.turn(), Marker::Player);
        assert_eq!(game.poll_ai().unwrap(), None);
    }

    #[test]
    fn test_poll_eventually_commits() {
        let mut game = Game::new(config()).unwrap();
        game.play(5, 5).unwrap();
        game.start_ai_search().unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let pos = loop {
            if let Some(pos) = game.poll_ai().unwrap() {
                break pos;
            }
            assert!(Instant::now() < deadline, "worker never replied");
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(game.board().last_move(), Some(pos));
    }

    #[test]
    fn test_undo_turn_restores_value() {
        let mut game = Game::new(config()).unwrap();
        game.play(10, 10).unwrap();
        let value_after_player = game.value();
        game.ai_move().unwrap();
        let free = game.board().is_empty_cell(Pos::new(12, 12));
        let (col, row) = if free { (12, 12) } else { (8, 8) };
        game.play(col, row).unwrap();
        game.ai_move().unwrap();

        assert_eq!(game.undo_turn().unwrap(), 2);
        assert_eq!(game.board().stone_count(), 2);
        assert_eq!(game.turn(), Marker::Player);

        assert_eq!(game.undo_turn().unwrap(), 2);
        assert_eq!(game.value(), 0);
        assert!(game.board().is_board_empty());
        assert!(game.candidates().is_empty());
        assert_eq!(game.undo_turn().unwrap(), 0);

        game.play(10, 10).unwrap();
        assert_eq!(game.value(), value_after_player);
    }

    #[test]
    fn test_new_game_resets() {
        let mut game = Game::new(config()).unwrap();
        game.play(10, 10).unwrap();
        game.ai_move().unwrap();
        game.new_game().unwrap();
        assert!(game.board().is_board_empty());
        assert_eq!(game.value(), 0);
        assert_eq!(game.turn(), Marker::Player);
        assert_eq!(game.board().hash(), 0);
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("C 7", 20).unwrap(), Pos::new(2, 7));
        assert_eq!(parse_coordinate("c 7", 20).unwrap(), Pos::new(2, 7));
        assert_eq!(parse_coordinate("3,4", 20).unwrap(), Pos::new(3, 4));
        assert_eq!(parse_coordinate("  12   0 ", 20).unwrap(), Pos::new(12, 0));
        // Beyond 26 columns labels are case-sensitive
        assert_eq!(parse_coordinate("a 1", 30).unwrap(), Pos::new(26, 1));
        assert_eq!(parse_coordinate("A 1", 30).unwrap(), Pos::new(0, 1));
    }

    #[test]
    fn test_parse_coordinate_rejects() {
        assert!(matches!(parse_coordinate("", 20), Err(GameError::Parse { .. })));
        assert!(matches!(parse_coordinate("C", 20), Err(GameError::Parse { .. })));
        assert!(matches!(parse_coordinate("C 7 1", 20), Err(GameError::Parse { .. })));
        assert!(matches!(parse_coordinate("CC 7", 20), Err(GameError::Parse { .. })));
        assert!(matches!(parse_coordinate("C x", 20), Err(GameError::Parse { .. })));
        assert!(matches!(parse_coordinate("Z 3", 20), Err(GameError::OutOfBounds { col: 25, .. })));
        assert!(matches!(parse_coordinate("3 -1", 20), Err(GameError::OutOfBounds { .. })));
    }
}
