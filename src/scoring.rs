use crate::ScoreParams;

/// Substitution and gap scoring consumed by every engine.
///
/// Gap penalties are positive and subtracted: a gap of length `L` costs
/// `gap_open() + gap_extend() * (L - 1)`.
pub trait ScoringModel {
    fn similarity(&self, a: u8, b: u8) -> f32;
    fn gap_open(&self) -> f32;
    fn gap_extend(&self) -> f32;
    /// Best attainable substitution score.
    fn highest_score(&self) -> f32;
    /// Worst attainable substitution score.
    fn lowest_score(&self) -> f32;
}

impl<T: ScoringModel + ?Sized> ScoringModel for &T {
    fn similarity(&self, a: u8, b: u8) -> f32 {
        (**self).similarity(a, b)
    }

    fn gap_open(&self) -> f32 {
        (**self).gap_open()
    }

    fn gap_extend(&self) -> f32 {
        (**self).gap_extend()
    }

    fn highest_score(&self) -> f32 {
        (**self).highest_score()
    }

    fn lowest_score(&self) -> f32 {
        (**self).lowest_score()
    }
}

impl ScoringModel for ScoreParams {
    fn similarity(&self, a: u8, b: u8) -> f32 {
        if a.eq_ignore_ascii_case(&b) {
            self.match_score
        } else {
            self.mismatch
        }
    }

    fn gap_open(&self) -> f32 {
        self.gap_open
    }

    fn gap_extend(&self) -> f32 {
        self.gap_ext
    }

    fn highest_score(&self) -> f32 {
        self.match_score.max(self.mismatch)
    }

    fn lowest_score(&self) -> f32 {
        self.match_score.min(self.mismatch)
    }
}

/// Matrix coordinate: `i` indexes the database (rows), `j` the query (columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub i: usize,
    pub j: usize,
}

impl Position {
    pub const ORIGIN: Position = Position { i: 0, j: 0 };

    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

// Running high score of a fill pass. Ties keep the first cell offered.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HighScore {
    score: f32,
    position: Position,
}

impl HighScore {
    pub fn new(score: f32, position: Position) -> Self {
        Self { score, position }
    }

    pub fn offer(&mut self, score: f32, position: Position) {
        if score > self.score {
            self.score = score;
            self.position = position;
        }
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn position(&self) -> Position {
        self.position
    }
}
