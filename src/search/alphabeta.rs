//! Alpha-Beta search with iterative deepening and transposition table
//!
//! This module implements the move search for the AI side. The AI is the
//! maximizing player and the human the minimizing one; values are never
//! negated between plies.
//!
//! # Features
//!
//! - Iterative deepening for time management and move ordering
//! - Transposition table retained across moves, guarded by depth
//! - History heuristic and delta-based move ordering
//! - PVS null-window probes for non-first moves
//! - Immediate-win short-circuit
//!
//! Values are never computed from scratch. Each move carries the heuristic
//! delta from [`Board::move_value_delta`] and the search adds it to the value
//! it was handed by the caller.
//!
//! # Example
//!
//! ```
//! use gomoku::board::{Board, Marker, Pos};
//! use gomoku::config::SearchConfig;
//! use gomoku::search::Searcher;
//!
//! let mut board = Board::new(15);
//! for col in 3..7 {
//!     board.place(Pos::new(col, 7), Marker::Ai);
//! }
//! board.place(Pos::new(2, 7), Marker::Player);
//! let mut candidates = board.candidates();
//!
//! let mut searcher = Searcher::new(SearchConfig::default().with_tt_size_mb(1));
//! let result = searcher.search_depth(&mut board, &mut candidates, 0, 2);
//! assert_eq!(result.best_move, Some(Pos::new(7, 7)));
//! ```

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::board::{Board, CandidateDelta, CandidateSet, Marker, Pos};
use crate::config::SearchConfig;
use crate::eval::PatternScore;

use super::{
    Bound, HistoryTable, NoopObserver, SearchObserver, SearchStats, TTEntry, TTStats,
    TranspositionTable,
};

/// Base value of a completed five. Remaining depth is added on top so that
/// quicker wins (and slower losses) are preferred.
pub const WIN_SCORE: i32 = 100_000_000;

/// Infinity score for alpha-beta bounds
const INF: i32 = 2 * WIN_SCORE;

/// Magnitude from which a score is a proven win or loss, whatever depth it
/// was found at
const WIN_BOUND: i32 = WIN_SCORE - u8::MAX as i32;

/// Deepening stops once the best line gains this much over the root value.
/// Only checked after depths that end with the opponent's reply.
pub const EARLY_STOP_GAIN: i32 = PatternScore::OPEN_FOUR / 5 * 4;

/// Win scores count remaining depth from the root. In the table they are
/// stored relative to the node, so an entry read at a different remaining
/// depth still reports how many plies the win is away.
fn score_to_tt(score: i32, depth: u8) -> i32 {
    let depth = i32::from(depth);
    if score >= WIN_BOUND {
        score - depth
    } else if score <= -WIN_BOUND {
        score + depth
    } else {
        score
    }
}

fn score_from_tt(score: i32, depth: u8) -> i32 {
    let depth = i32::from(depth);
    if score >= WIN_BOUND {
        score + depth
    } else if score <= -WIN_BOUND {
        score - depth
    } else {
        score
    }
}

/// The deadline passed; unwinds the whole search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timeout;

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move found, if any
    pub best_move: Option<Pos>,
    /// Value of `best_move` as the last usable iteration saw it
    pub score: i32,
    /// Deepest iteration that completed
    pub depth: u8,
    /// Whether the deadline cut the search short
    pub timed_out: bool,
    /// Search diagnostics
    pub stats: SearchStats,
}

impl SearchResult {
    fn empty(root_value: i32) -> Self {
        Self {
            best_move: None,
            score: root_value,
            depth: 0,
            timed_out: false,
            stats: SearchStats::default(),
        }
    }

    /// True when `score` is a proven win for the AI
    pub fn is_win(&self) -> bool {
        self.score >= WIN_BOUND
    }

    /// True when `score` is a proven loss for the AI
    pub fn is_loss(&self) -> bool {
        self.score <= -WIN_BOUND
    }
}

/// Candidate move with its ordering keys
#[derive(Debug, Clone, Copy)]
struct ScoredMove {
    pos: Pos,
    /// Heuristic delta, AI-positive
    delta: i32,
    /// Delta from the mover's point of view
    gain: i32,
    history: u64,
    distance: u8,
    is_tt_move: bool,
}

/// A move made on the board and the candidate set, taken back on drop.
///
/// Dropping happens on every exit path, including a `Timeout` unwinding
/// through `?`, so a cancelled search leaves both structures as it found them.
struct AppliedMove<'a> {
    board: &'a mut Board,
    candidates: &'a mut CandidateSet,
    delta: CandidateDelta,
}

impl<'a> AppliedMove<'a> {
    fn apply(
        board: &'a mut Board,
        candidates: &'a mut CandidateSet,
        pos: Pos,
        marker: Marker,
    ) -> Self {
        board.place(pos, marker);
        let delta = board.update_candidates(candidates, pos);
        Self {
            board,
            candidates,
            delta,
        }
    }

    fn parts(&mut self) -> (&mut Board, &mut CandidateSet) {
        (&mut *self.board, &mut *self.candidates)
    }
}

impl Drop for AppliedMove<'_> {
    fn drop(&mut self) {
        self.candidates.revert(&self.delta);
        self.board.undo();
    }
}

/// Per-search state: borrowed tables, the deadline and the metric sinks.
struct SearchContext<'s, O: SearchObserver> {
    tt: &'s mut TranspositionTable,
    history: &'s mut HistoryTable,
    observer: &'s mut O,
    stats: SearchStats,
    deadline: Option<Instant>,
    pvs_min_depth: u8,
}

impl<O: SearchObserver> SearchContext<'_, O> {
    #[inline]
    fn check_deadline(&self) -> Result<(), Timeout> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Timeout),
            _ => Ok(()),
        }
    }

    fn record_node(&mut self, depth: u8) {
        self.stats.on_node(depth);
        self.observer.on_node(depth);
    }

    fn record_tt_hit(&mut self, depth: u8) {
        self.stats.on_tt_hit(depth);
        self.observer.on_tt_hit(depth);
    }

    fn record_cutoff(&mut self, pos: Pos, depth: u8, move_index: usize) {
        self.history.bump(pos, depth);
        self.stats.on_cutoff(depth, move_index);
        self.observer.on_cutoff(depth, move_index);
    }

    fn record_research(&mut self, depth: u8) {
        self.stats.on_research(depth);
        self.observer.on_research(depth);
    }

    /// Every candidate for `marker`, best first.
    ///
    /// Order: transposition move, mover's delta (descending), history weight
    /// (descending), distance to the last move (ascending), cell index.
    fn ordered_moves(
        &self,
        board: &Board,
        candidates: &CandidateSet,
        marker: Marker,
        tt_move: Option<Pos>,
    ) -> Vec<ScoredMove> {
        let size = board.size();
        let mut moves: Vec<ScoredMove> = candidates
            .iter()
            .map(|pos| {
                let delta = board.move_value_delta(pos, marker);
                ScoredMove {
                    pos,
                    delta,
                    gain: if marker == Marker::Ai { delta } else { -delta },
                    history: self.history.score(pos),
                    distance: board.chebyshev_distance(pos),
                    is_tt_move: tt_move == Some(pos),
                }
            })
            .collect();

        moves.sort_unstable_by(|a, b| {
            b.is_tt_move
                .cmp(&a.is_tt_move)
                .then(b.gain.cmp(&a.gain))
                .then(b.history.cmp(&a.history))
                .then(a.distance.cmp(&b.distance))
                .then(a.pos.to_index(size).cmp(&b.pos.to_index(size)))
        });
        moves
    }

    /// Root of one iterative-deepening pass. The AI moves here.
    ///
    /// `progress` holds the best fully searched root move of this pass so
    /// the driver can still use it if the pass times out.
    fn search_root(
        &mut self,
        board: &mut Board,
        candidates: &mut CandidateSet,
        root_value: i32,
        depth: u8,
        progress: &mut Option<(Pos, i32)>,
    ) -> Result<(i32, Option<Pos>), Timeout> {
        self.check_deadline()?;
        self.record_node(depth);

        let hash = board.hash();
        let entry = self.tt.probe(hash);

        if let Some(e) = entry.filter(|e| e.bound == Bound::Exact && e.depth >= depth) {
            let reusable = e
                .best_move
                .filter(|&p| candidates.contains(p) && board.is_empty_cell(p));
            if let Some(pos) = reusable {
                let value = score_from_tt(e.value, depth);
                trace!("root reuses depth {} entry: {} ({})", e.depth, pos, value);
                self.record_tt_hit(depth);
                *progress = Some((pos, value));
                return Ok((value, Some(pos)));
            }
        }

        let tt_move = entry.and_then(|e| e.best_move);
        let moves = self.ordered_moves(board, candidates, Marker::Ai, tt_move);

        if let Some(win) = moves.iter().find(|m| board.completes_five(m.pos, Marker::Ai)) {
            let score = WIN_SCORE + i32::from(depth) - 1;
            self.tt.store(hash, depth, score_to_tt(score, depth), Bound::Exact, Some(win.pos));
            *progress = Some((win.pos, score));
            return Ok((score, Some(win.pos)));
        }

        let mut alpha = -INF;
        let mut best: Option<(Pos, i32)> = None;

        for (i, mv) in moves.iter().enumerate() {
            let score = {
                let mut applied = AppliedMove::apply(board, candidates, mv.pos, Marker::Ai);
                let (board, candidates) = applied.parts();
                let child_value = root_value + mv.delta;
                self.search_child(board, candidates, alpha, INF, true, child_value, depth, i == 0)?
            };

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((mv.pos, score));
                *progress = best;
            }
            alpha = alpha.max(score);
        }

        match best {
            Some((pos, score)) => {
                self.tt.store(hash, depth, score_to_tt(score, depth), Bound::Exact, Some(pos));
                Ok((score, Some(pos)))
            }
            None => Ok((root_value, None)),
        }
    }

    /// Search the child reached by a move from a node where `maximizing`
    /// was to move. Non-first moves at sufficient depth are first probed with
    /// a null window on the side's own bound.
    #[allow(clippy::too_many_arguments)]
    fn search_child(
        &mut self,
        board: &mut Board,
        candidates: &mut CandidateSet,
        alpha: i32,
        beta: i32,
        maximizing: bool,
        child_value: i32,
        depth: u8,
        is_first: bool,
    ) -> Result<i32, Timeout> {
        let child_depth = depth - 1;

        if is_first || depth < self.pvs_min_depth {
            return self.search(
                board,
                candidates,
                alpha,
                beta,
                !maximizing,
                child_value,
                child_depth,
            );
        }

        let (lo, hi) = if maximizing {
            (alpha, alpha + 1)
        } else {
            (beta - 1, beta)
        };
        let probe = self.search(board, candidates, lo, hi, !maximizing, child_value, child_depth)?;

        if probe > alpha && probe < beta {
            self.record_research(depth);
            self.search(board, candidates, alpha, beta, !maximizing, child_value, child_depth)
        } else {
            Ok(probe)
        }
    }

    /// Fail-soft alpha-beta. `value` is the accumulated heuristic value of
    /// the current position.
    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        board: &mut Board,
        candidates: &mut CandidateSet,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        value: i32,
        depth: u8,
    ) -> Result<i32, Timeout> {
        self.check_deadline()?;
        self.record_node(depth);

        let hash = board.hash();
        let (original_alpha, original_beta) = (alpha, beta);

        let entry = self.tt.probe(hash);
        if let Some(e) = entry {
            let e = TTEntry {
                value: score_from_tt(e.value, depth),
                ..e
            };
            if let Some(settled) = e.resolve(depth, &mut alpha, &mut beta) {
                self.record_tt_hit(depth);
                return Ok(settled);
            }
        }

        if board.is_winning_last_move() {
            // The side that just moved is the one not to move now
            let score = WIN_SCORE + i32::from(depth);
            return Ok(if maximizing { -score } else { score });
        }
        if depth == 0 {
            return Ok(value);
        }

        let marker = if maximizing { Marker::Ai } else { Marker::Player };
        let moves = self.ordered_moves(board, candidates, marker, entry.and_then(|e| e.best_move));
        if moves.is_empty() {
            return Ok(value);
        }

        if let Some(win) = moves.iter().find(|m| board.completes_five(m.pos, marker)) {
            let score = WIN_SCORE + i32::from(depth) - 1;
            let score = if maximizing { score } else { -score };
            self.tt.store(hash, depth, score_to_tt(score, depth), Bound::Exact, Some(win.pos));
            return Ok(score);
        }

        let mut best_value = if maximizing { -INF } else { INF };
        let mut best_move = None;

        for (i, mv) in moves.iter().enumerate() {
            let score = {
                let mut applied = AppliedMove::apply(board, candidates, mv.pos, marker);
                let (board, candidates) = applied.parts();
                let child_value = value + mv.delta;
                self.search_child(
                    board,
                    candidates,
                    alpha,
                    beta,
                    maximizing,
                    child_value,
                    depth,
                    i == 0,
                )?
            };

            if maximizing {
                if score > best_value {
                    best_value = score;
                    best_move = Some(mv.pos);
                }
                alpha = alpha.max(score);
            } else {
                if score < best_value {
                    best_value = score;
                    best_move = Some(mv.pos);
                }
                beta = beta.min(score);
            }

            if alpha >= beta {
                self.record_cutoff(mv.pos, depth, i);
                break;
            }
        }

        let bound = if best_value <= original_alpha {
            Bound::Upper
        } else if best_value >= original_beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(hash, depth, score_to_tt(best_value, depth), bound, best_move);

        Ok(best_value)
    }
}

/// How far one top-level search may go
#[derive(Debug, Clone, Copy)]
struct Limits {
    deadline: Option<Instant>,
    max_depth: u8,
    early_stop: bool,
}

/// Move search for the AI side.
///
/// The transposition table lives as long as the searcher and is shared by
/// every move of a game; call [`Searcher::clear`] between games.
#[derive(Debug, Clone)]
pub struct Searcher {
    config: SearchConfig,
    tt: TranspositionTable,
    history: HistoryTable,
}

impl Searcher {
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            tt: TranspositionTable::new(config.tt_size_mb),
            history: HistoryTable::new(0),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_time_limit(&mut self, time_limit: Duration) {
        self.config.time_limit = time_limit;
    }

    /// Best AI move within `time_limit`, or `None` when there is nothing to
    /// play.
    ///
    /// `root_value` is the running heuristic value of the current position.
    /// `board` and `candidates` are mutated during the search and restored
    /// before this returns.
    pub fn find_move(
        &mut self,
        board: &mut Board,
        candidates: &mut CandidateSet,
        root_value: i32,
        time_limit: Duration,
    ) -> Option<Pos> {
        self.find_move_observed(board, candidates, root_value, time_limit, &mut NoopObserver)
            .best_move
    }

    /// Like [`Searcher::find_move`] with the configured time limit, returning
    /// the full result.
    pub fn find_move_with_stats(
        &mut self,
        board: &mut Board,
        candidates: &mut CandidateSet,
        root_value: i32,
    ) -> SearchResult {
        let time_limit = self.config.time_limit;
        self.find_move_observed(board, candidates, root_value, time_limit, &mut NoopObserver)
    }

    /// Timed search reporting every event to `observer`.
    pub fn find_move_observed<O: SearchObserver>(
        &mut self,
        board: &mut Board,
        candidates: &mut CandidateSet,
        root_value: i32,
        time_limit: Duration,
        observer: &mut O,
    ) -> SearchResult {
        let limits = Limits {
            deadline: Some(Instant::now() + time_limit),
            max_depth: self.config.max_depth,
            early_stop: true,
        };
        self.iterative_deepening(board, candidates, root_value, limits, observer)
    }

    /// Search every depth up to `depth` with no deadline and no early stop.
    ///
    /// Deterministic for a given position and table state, which makes it the
    /// entry point for tests and benchmarks.
    pub fn search_depth(
        &mut self,
        board: &mut Board,
        candidates: &mut CandidateSet,
        root_value: i32,
        depth: u8,
    ) -> SearchResult {
        let limits = Limits {
            deadline: None,
            max_depth: depth,
            early_stop: false,
        };
        self.iterative_deepening(board, candidates, root_value, limits, &mut NoopObserver)
    }

    /// Forget all transposition entries and history weights.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.history.reset(0);
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    fn iterative_deepening<O: SearchObserver>(
        &mut self,
        board: &mut Board,
        candidates: &mut CandidateSet,
        root_value: i32,
        limits: Limits,
        observer: &mut O,
    ) -> SearchResult {
        let start = Instant::now();
        let mut result = SearchResult::empty(root_value);

        if candidates.is_empty() {
            if board.is_board_empty() {
                result.best_move = Some(board.center());
            }
            return result;
        }

        self.history.reset(board.size());
        let max_depth = limits.max_depth.max(1);
        let empty_cells = board.size() * board.size() - board.stone_count();

        let mut ctx = SearchContext {
            tt: &mut self.tt,
            history: &mut self.history,
            observer,
            stats: SearchStats::default(),
            deadline: limits.deadline,
            pvs_min_depth: self.config.pvs_min_depth,
        };

        let fallback = {
            let tt_move = ctx.tt.best_move(board.hash());
            ctx.ordered_moves(board, candidates, Marker::Ai, tt_move)
                .first()
                .map(|m| m.pos)
        };

        for depth in 1..=max_depth {
            let mut progress = None;
            match ctx.search_root(board, candidates, root_value, depth, &mut progress) {
                Ok((score, best_move)) => {
                    result.best_move = best_move;
                    result.score = score;
                    result.depth = depth;
                    ctx.stats.on_iteration(depth, score, best_move);
                    ctx.observer.on_iteration(depth, score, best_move);
                    debug!(
                        "depth {depth}: score {score}, move {}, {} nodes, {:?}",
                        best_move.map_or_else(|| "-".to_string(), |p| p.to_string()),
                        ctx.stats.nodes,
                        start.elapsed()
                    );

                    if score.abs() >= WIN_BOUND || usize::from(depth) >= empty_cells {
                        break;
                    }
                    // After an odd depth the AI's last move went unanswered
                    let replied = depth % 2 == 0;
                    if limits.early_stop && replied && score - root_value >= EARLY_STOP_GAIN {
                        break;
                    }
                }
                Err(Timeout) => {
                    result.timed_out = true;
                    if let Some((pos, score)) = progress {
                        result.best_move = Some(pos);
                        result.score = score;
                        debug!("timed out at depth {depth}, keeping partial best {pos} ({score})");
                    } else {
                        debug!("timed out at depth {depth}, keeping depth {} result", result.depth);
                    }
                    break;
                }
            }
        }

        if result.best_move.is_none() {
            debug!("no completed root move, falling back to first ordered candidate");
            result.best_move = fallback;
        }

        result.stats = ctx.stats;
        result
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ZobristTable;

    fn board(size: usize) -> Board {
        Board::with_zobrist(ZobristTable::with_seed(size, 0xC0FFEE))
    }

    fn searcher() -> Searcher {
        Searcher::new(SearchConfig::default().with_tt_size_mb(1))
    }

    fn place_all(board: &mut Board, stones: &[(u8, u8)], marker: Marker) {
        for &(c, r) in stones {
            board.place(Pos::new(c, r), marker);
        }
    }

    #[test]
    fn test_empty_board_takes_centre() {
        let mut board = board(20);
        let mut candidates = board.candidates();
        let result = searcher().search_depth(&mut board, &mut candidates, 0, 3);
        assert_eq!(result.best_move, Some(Pos::new(10, 10)));
        assert_eq!(result.depth, 0);
    }

    #[test]
    fn test_full_board_has_no_move() {
        let mut board = board(5);
        let markers = [Marker::Ai, Marker::Player];
        for row in 0..5u8 {
            for col in 0..5u8 {
                // Stripes of two never make five in a row
                let m = markers[usize::from((col / 2 + row) % 2)];
                board.place(Pos::new(col, row), m);
            }
        }
        let mut candidates = board.candidates();
        assert!(candidates.is_empty());
        let found = searcher().find_move(&mut board, &mut candidates, 0, Duration::from_millis(50));
        assert_eq!(found, None);
    }

    #[test]
    fn test_search_finds_winning_move() {
        let mut board = board(20);
        place_all(&mut board, &[(9, 0), (9, 1), (9, 2), (9, 3)], Marker::Ai);
        place_all(&mut board, &[(3, 3), (15, 15), (3, 15), (15, 3)], Marker::Player);
        let mut candidates = board.candidates();

        let result = searcher().search_depth(&mut board, &mut candidates, 0, 2);
        assert_eq!(result.best_move, Some(Pos::new(9, 4)));
        assert!(result.is_win());
    }

    #[test]
    fn test_search_blocks_opponent_four() {
        let mut board = board(20);
        place_all(&mut board, &[(9, 0), (9, 1), (9, 2), (9, 3)], Marker::Player);
        place_all(&mut board, &[(10, 0), (12, 12), (14, 14)], Marker::Ai);
        let mut candidates = board.candidates();

        let result = searcher().search_depth(&mut board, &mut candidates, 0, 3);
        assert_eq!(result.best_move, Some(Pos::new(9, 4)));
    }

    #[test]
    fn test_search_restores_board_and_candidates() {
        let mut board = board(20);
        place_all(&mut board, &[(8, 8), (9, 9)], Marker::Player);
        place_all(&mut board, &[(8, 9), (10, 10)], Marker::Ai);
        let mut candidates = board.candidates();
        let hash = board.hash();
        let history = board.history().to_vec();
        let before: Vec<Pos> = candidates.iter().collect();

        let _ = searcher().search_depth(&mut board, &mut candidates, 0, 3);

        assert_eq!(board.hash(), hash);
        assert_eq!(board.history(), history.as_slice());
        assert_eq!(candidates.iter().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_timeout_restores_board_and_returns_move() {
        let mut board = board(20);
        place_all(&mut board, &[(8, 8), (9, 9), (11, 7)], Marker::Player);
        place_all(&mut board, &[(8, 9), (10, 10), (7, 7)], Marker::Ai);
        let mut candidates = board.candidates();
        let hash = board.hash();
        let len = candidates.len();

        let config = SearchConfig::default()
            .with_tt_size_mb(1)
            .with_time_limit(Duration::from_millis(200));
        let mut searcher = Searcher::new(config);
        let result = searcher.find_move_with_stats(&mut board, &mut candidates, 0);
        let short = Duration::from_millis(20);
        let result_short =
            searcher.find_move_observed(&mut board, &mut candidates, 0, short, &mut NoopObserver);

        for r in [&result, &result_short] {
            let mv = r.best_move.unwrap();
            assert!(candidates.contains(mv));
        }
        assert_eq!(board.hash(), hash);
        assert_eq!(candidates.len(), len);
    }

    #[test]
    fn test_zero_deadline_falls_back() {
        let mut board = board(20);
        place_all(&mut board, &[(10, 10)], Marker::Player);
        let mut candidates = board.candidates();

        let result = searcher().find_move_observed(
            &mut board,
            &mut candidates,
            0,
            Duration::ZERO,
            &mut NoopObserver,
        );
        assert!(result.timed_out);
        assert_eq!(result.depth, 0);
        assert!(result.best_move.is_some_and(|p| candidates.contains(p)));
    }

    #[test]
    fn test_observer_sees_iterations() {
        #[derive(Default)]
        struct Depths(Vec<u8>);
        impl SearchObserver for Depths {
            fn on_iteration(&mut self, depth: u8, _score: i32, _best_move: Option<Pos>) {
                self.0.push(depth);
            }
        }

        let mut board = board(15);
        place_all(&mut board, &[(7, 7)], Marker::Player);
        let mut candidates = board.candidates();
        let config = SearchConfig::default().with_tt_size_mb(1).with_max_depth(3);
        let mut searcher = Searcher::new(config);
        let mut depths = Depths::default();
        let budget = Duration::from_secs(30);

        let result =
            searcher.find_move_observed(&mut board, &mut candidates, 0, budget, &mut depths);
        assert_eq!(depths.0, vec![1, 2, 3]);
        assert_eq!(result.stats.iterations, 3);
        assert!(result.stats.nodes > 0);
    }

    #[test]
    fn test_tt_retained_between_searches() {
        let mut board = board(20);
        place_all(&mut board, &[(9, 9), (10, 10)], Marker::Player);
        place_all(&mut board, &[(9, 10)], Marker::Ai);
        let mut candidates = board.candidates();
        let mut searcher = searcher();

        let first = searcher.search_depth(&mut board, &mut candidates, 0, 3);
        let second = searcher.search_depth(&mut board, &mut candidates, 0, 3);

        assert_eq!(first.best_move, second.best_move);
        assert_eq!(first.score, second.score);
        assert!(second.stats.nodes < first.stats.nodes / 10);
        assert!(second.stats.tt_hits > 0);

        searcher.clear();
        assert_eq!(searcher.tt_stats().used, 0);
    }

    #[test]
    fn test_ordering_prefers_tt_move_then_gain() {
        let mut board = board(20);
        place_all(&mut board, &[(5, 5), (6, 5), (7, 5)], Marker::Player);
        let candidates = board.candidates();
        let mut tt = TranspositionTable::new(1);
        let mut history = HistoryTable::new(20);
        let mut observer = NoopObserver;
        let ctx = SearchContext {
            tt: &mut tt,
            history: &mut history,
            observer: &mut observer,
            stats: SearchStats::default(),
            deadline: None,
            pvs_min_depth: 3,
        };

        let moves = ctx.ordered_moves(&board, &candidates, Marker::Ai, None);
        assert_eq!(moves.len(), candidates.len());
        assert!(moves.windows(2).all(|w| w[0].gain >= w[1].gain));
        assert!(matches!(moves[0].pos, Pos { col: 4 | 8, row: 5 }));

        let far = Pos::new(9, 7);
        let moves = ctx.ordered_moves(&board, &candidates, Marker::Ai, Some(far));
        assert_eq!(moves[0].pos, far);
    }

    #[test]
    fn test_tt_win_scores_relative_to_node() {
        // Found at a node with 4 plies left, the win lands with 2 left
        let win = WIN_SCORE + 2;
        let stored = score_to_tt(win, 4);
        assert_eq!(score_from_tt(stored, 4), win);
        assert_eq!(score_from_tt(stored, 3), WIN_SCORE + 1);
        assert_eq!(score_from_tt(score_to_tt(-win, 4), 3), -(WIN_SCORE + 1));

        assert_eq!(score_to_tt(12_345, 9), 12_345);
        assert_eq!(score_from_tt(-12_345, 9), -12_345);
    }

    #[test]
    fn test_reused_win_keeps_distance() {
        let mut board = board(20);
        place_all(&mut board, &[(5, 5), (6, 5), (7, 5)], Marker::Ai);
        place_all(&mut board, &[(15, 15), (2, 16)], Marker::Player);
        let mut candidates = board.candidates();
        let mut searcher = searcher();

        // Open four, forced block, five: three plies
        let deep = searcher.search_depth(&mut board, &mut candidates, 0, 3);
        assert_eq!(deep.score, WIN_SCORE);
        assert!(matches!(deep.best_move, Some(Pos { col: 4 | 8, row: 5 })));

        // Read back at one ply, the same win is still three plies away
        let shallow = searcher.search_depth(&mut board, &mut candidates, 0, 1);
        assert_eq!(shallow.best_move, deep.best_move);
        assert_eq!(shallow.score, WIN_SCORE - 2);
        assert!(shallow.is_win());
        assert!(shallow.stats.tt_hits > 0);
    }

    #[test]
    fn test_cutoffs_bump_history() {
        #[derive(Default)]
        struct Cutoffs(u64);
        impl SearchObserver for Cutoffs {
            fn on_cutoff(&mut self, _depth: u8, _move_index: usize) {
                self.0 += 1;
            }
        }

        let mut board = board(20);
        place_all(&mut board, &[(9, 9), (11, 10)], Marker::Player);
        place_all(&mut board, &[(10, 10)], Marker::Ai);
        let mut candidates = board.candidates();
        let config = SearchConfig::default().with_tt_size_mb(1).with_max_depth(3);
        let mut searcher = Searcher::new(config);
        let mut cutoffs = Cutoffs::default();
        let budget = Duration::from_secs(30);

        let result =
            searcher.find_move_observed(&mut board, &mut candidates, 0, budget, &mut cutoffs);
        assert_eq!(result.depth, 3);
        assert!(cutoffs.0 > 0);
        assert_eq!(cutoffs.0, result.stats.cutoffs);

        // Every cutoff adds at least 2 (depth >= 1) to its cell
        let total: u64 = (0..400)
            .map(|idx| searcher.history.score(Pos::from_index(idx, 20)))
            .sum();
        assert!(total >= 2 * cutoffs.0);
    }

    #[test]
    fn test_ordering_history_breaks_delta_ties() {
        let mut board = board(20);
        place_all(&mut board, &[(10, 10)], Marker::Player);
        place_all(&mut board, &[(9, 9)], Marker::Ai);
        let candidates = board.candidates();
        let mut tt = TranspositionTable::new(1);
        let mut history = HistoryTable::new(20);
        let mut observer = NoopObserver;

        // Mirror images across the diagonal, so equal deltas
        let (favoured, mirror) = (Pos::new(8, 10), Pos::new(10, 8));
        history.bump(favoured, 5);
        // Behind the Player stone: lowest delta, highest history
        let behind = Pos::new(12, 12);
        history.bump(behind, 9);

        let ctx = SearchContext {
            tt: &mut tt,
            history: &mut history,
            observer: &mut observer,
            stats: SearchStats::default(),
            deadline: None,
            pvs_min_depth: 3,
        };
        let moves = ctx.ordered_moves(&board, &candidates, Marker::Ai, None);
        let rank = |p: Pos| moves.iter().position(|m| m.pos == p);

        assert_eq!(
            board.move_value_delta(favoured, Marker::Ai),
            board.move_value_delta(mirror, Marker::Ai)
        );
        assert!(rank(favoured) < rank(mirror));
        assert!(rank(Pos::new(8, 8)) < rank(behind));
        assert!(moves.windows(2).all(|w| w[0].gain >= w[1].gain));
    }

    #[test]
    fn test_applied_move_reverts_on_drop() {
        let mut board = board(10);
        board.place(Pos::new(4, 4), Marker::Player);
        let mut candidates = board.candidates();
        let before: Vec<Pos> = candidates.iter().collect();
        let hash = board.hash();

        {
            let mut applied =
                AppliedMove::apply(&mut board, &mut candidates, Pos::new(5, 5), Marker::Ai);
            let (b, c) = applied.parts();
            assert_eq!(b.stone_count(), 2);
            assert!(!c.contains(Pos::new(5, 5)));
        }

        assert_eq!(board.hash(), hash);
        assert_eq!(board.stone_count(), 1);
        assert_eq!(candidates.iter().collect::<Vec<_>>(), before);
    }
}
