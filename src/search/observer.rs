//! Search metrics
//!
//! The searcher reports its effort through [`SearchObserver`] rather than
//! through counters of its own. [`SearchStats`] is the built-in sink and is
//! returned with every [`SearchResult`](super::SearchResult).

use crate::board::Pos;

/// Receives search events. Every method defaults to doing nothing.
pub trait SearchObserver {
    /// A node was entered with `depth` plies remaining
    fn on_node(&mut self, _depth: u8) {}

    /// A transposition entry answered a node outright
    fn on_tt_hit(&mut self, _depth: u8) {}

    /// A cutoff happened on the `move_index`-th ordered move
    fn on_cutoff(&mut self, _depth: u8, _move_index: usize) {}

    /// A null-window probe had to be repeated with the full window
    fn on_research(&mut self, _depth: u8) {}

    /// An iterative-deepening pass finished
    fn on_iteration(&mut self, _depth: u8, _score: i32, _best_move: Option<Pos>) {}
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes entered, root included
    pub nodes: u64,
    /// Transposition entries that answered a node
    pub tt_hits: u64,
    /// Total cutoffs
    pub cutoffs: u64,
    /// Cutoffs on the first move tried (measures move ordering quality)
    pub first_move_cutoffs: u64,
    /// Null-window probes that needed a full re-search
    pub researches: u64,
    /// Completed iterative-deepening passes
    pub iterations: u64,
}

impl SearchStats {
    /// First-move cutoff rate in percent
    pub fn first_move_rate(&self) -> f64 {
        if self.cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.cutoffs as f64 * 100.0
        }
    }

    /// Share of nodes answered by the transposition table, in percent
    pub fn tt_hit_rate(&self) -> f64 {
        if self.nodes == 0 {
            0.0
        } else {
            self.tt_hits as f64 / self.nodes as f64 * 100.0
        }
    }
}

impl SearchObserver for SearchStats {
    fn on_node(&mut self, _depth: u8) {
        self.nodes += 1;
    }

    fn on_tt_hit(&mut self, _depth: u8) {
        self.tt_hits += 1;
    }

    fn on_cutoff(&mut self, _depth: u8, move_index: usize) {
        self.cutoffs += 1;
        if move_index == 0 {
            self.first_move_cutoffs += 1;
        }
    }

    fn on_research(&mut self, _depth: u8) {
        self.researches += 1;
    }

    fn on_iteration(&mut self, _depth: u8, _score: i32, _best_move: Option<Pos>) {
        self.iterations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counts_events() {
        let mut stats = SearchStats::default();
        stats.on_node(3);
        stats.on_node(2);
        stats.on_tt_hit(2);
        stats.on_cutoff(2, 0);
        stats.on_cutoff(1, 4);
        stats.on_research(3);
        stats.on_iteration(3, 10, None);

        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.tt_hits, 1);
        assert_eq!(stats.cutoffs, 2);
        assert_eq!(stats.first_move_cutoffs, 1);
        assert_eq!(stats.researches, 1);
        assert_eq!(stats.iterations, 1);
        assert!((stats.first_move_rate() - 50.0).abs() < f64::EPSILON);
        assert!((stats.tt_hit_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rates_on_empty_stats() {
        let stats = SearchStats::default();
        assert_eq!(stats.first_move_rate(), 0.0);
        assert_eq!(stats.tt_hit_rate(), 0.0);
    }
}
