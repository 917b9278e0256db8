//! Pattern scores for Gomoku evaluation
//!
//! Patterns are short line fragments written with `x` for the scored side's
//! marker, `o` for the other side and `.` for an empty cell. The list is kept
//! in descending score order so the first pattern found in a window is also
//! the highest-valued one.

use once_cell::sync::Lazy;

use crate::board::Marker;

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    // Winning pattern
    /// Five in a row - immediate win
    pub const FIVE: i32 = 1_000_000;

    // Strong attacking patterns
    /// Open four: _OOOO_ (cannot be blocked on both ends)
    pub const OPEN_FOUR: i32 = 100_000;
    /// Closed or broken four: one move from five, one defence available
    pub const FOUR: i32 = 10_000;

    // Moderate threats
    /// Open three: _OOO_ (becomes open four if not blocked)
    pub const OPEN_THREE: i32 = 5_000;
    /// Broken open three: _OO_O_ / _O_OO_
    pub const BROKEN_THREE: i32 = 3_000;
    /// Closed three: three stones that can still reach five on one side
    pub const CLOSED_THREE: i32 = 500;

    // Building patterns
    /// Open two: _OO_
    pub const OPEN_TWO: i32 = 100;
    /// Split two: _O_O_
    pub const BROKEN_TWO: i32 = 50;
    /// Closed two: OO___ / ___OO
    pub const CLOSED_TWO: i32 = 10;
    /// Lone stone
    pub const SINGLE: i32 = 1;
}

/// Longest pattern in `PATTERNS`
pub const MAX_PATTERN_LEN: usize = 7;

/// All patterns, highest score first. Closed under reversal: a pattern and
/// its mirror image always carry the same score.
pub const PATTERNS: &[(&str, i32)] = &[
    ("xxxxx", PatternScore::FIVE),
    (".xxxx.", PatternScore::OPEN_FOUR),
    ("xxxx.", PatternScore::FOUR),
    (".xxxx", PatternScore::FOUR),
    ("xxx.x", PatternScore::FOUR),
    ("x.xxx", PatternScore::FOUR),
    ("xx.xx", PatternScore::FOUR),
    (".xxx.", PatternScore::OPEN_THREE),
    (".xx.x.", PatternScore::BROKEN_THREE),
    (".x.xx.", PatternScore::BROKEN_THREE),
    ("xxx..", PatternScore::CLOSED_THREE),
    ("..xxx", PatternScore::CLOSED_THREE),
    ("xx.x.", PatternScore::CLOSED_THREE),
    (".x.xx", PatternScore::CLOSED_THREE),
    ("x.xx.", PatternScore::CLOSED_THREE),
    (".xx.x", PatternScore::CLOSED_THREE),
    ("xx..x", PatternScore::CLOSED_THREE),
    ("x..xx", PatternScore::CLOSED_THREE),
    ("x.x.x", PatternScore::CLOSED_THREE),
    (".xx.", PatternScore::OPEN_TWO),
    (".x.x.", PatternScore::BROKEN_TWO),
    ("xx...", PatternScore::CLOSED_TWO),
    ("...xx", PatternScore::CLOSED_TWO),
    ("x", PatternScore::SINGLE),
];

/// One compiled pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    cells: Vec<Marker>,
    /// Number of scored-side markers, for quick rejection
    own: usize,
    score: i32,
}

impl Pattern {
    fn compile(text: &str, score: i32, side: Marker) -> Self {
        let cells: Vec<Marker> = text
            .chars()
            .map(|c| match c {
                'x' => side,
                'o' => side.opponent(),
                _ => Marker::Empty,
            })
            .collect();
        let own = cells.iter().filter(|&&m| m == side).count();
        Self { cells, own, score }
    }

    #[inline]
    pub fn score(&self) -> i32 {
        self.score
    }

    #[inline]
    pub fn cells(&self) -> &[Marker] {
        &self.cells
    }
}

/// `PATTERNS` compiled for one side, in priority order.
#[derive(Debug, Clone)]
pub struct PatternTable {
    side: Marker,
    patterns: Vec<Pattern>,
}

impl PatternTable {
    /// Compile the pattern list with `x` bound to `side`.
    pub fn for_side(side: Marker) -> Self {
        let patterns = PATTERNS
            .iter()
            .map(|&(text, score)| Pattern::compile(text, score, side))
            .collect();
        Self { side, patterns }
    }

    #[inline]
    pub fn side(&self) -> Marker {
        self.side
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Score of the first (highest) pattern occurring anywhere in `window`,
    /// or 0 if none does.
    pub fn best_match(&self, window: &[Marker]) -> i32 {
        let own = window.iter().filter(|&&m| m == self.side).count();
        if own == 0 {
            return 0;
        }

        self.patterns
            .iter()
            .filter(|p| p.own <= own && p.cells.len() <= window.len())
            .find(|p| window.windows(p.cells.len()).any(|w| w == p.cells.as_slice()))
            .map_or(0, |p| p.score)
    }
}

/// The pattern list compiled once per side.
#[derive(Debug)]
pub struct PatternTables {
    pub ai: PatternTable,
    pub player: PatternTable,
}

static TABLES: Lazy<PatternTables> = Lazy::new(|| PatternTables {
    ai: PatternTable::for_side(Marker::Ai),
    player: PatternTable::for_side(Marker::Player),
});

/// Shared compiled tables
#[inline]
pub fn pattern_tables() -> &'static PatternTables {
    &TABLES
}
