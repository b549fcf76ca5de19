use std::fmt;

use crate::gap_model::GapModel;
use crate::matrix::{AlignmentMatrix, Cell, Move};
use crate::scoring::{HighScore, Position};
use crate::{AlignerError, SequenceView, GAP_SYMBOL};

/// Absolute tolerances tried in order when re-deriving a gap run length.
///
/// Each pass takes the shortest run within its tolerance, so the tightest
/// pass runs first; starting loose could settle on a shorter wrong run.
pub const TRACEBACK_TOLERANCES: [f32; 3] = [1e-6, 1e-5, 1e-4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracebackOperation {
    Match,
    Mismatch,
    Insertion,
    Deletion,
}

/// Gap-padded pair of aligned sequences with 1-based inclusive coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseAlignment {
    pub score: f32,
    pub start_database: usize,
    pub end_database: usize,
    pub start_query: usize,
    pub end_query: usize,
    pub aligned_database: Vec<u8>,
    pub aligned_query: Vec<u8>,
    pub operations: Vec<TracebackOperation>,
}

impl PairwiseAlignment {
    /// Number of aligned columns.
    pub fn len(&self) -> usize {
        self.aligned_database.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned_database.is_empty()
    }

    pub fn gap_columns(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, TracebackOperation::Insertion | TracebackOperation::Deletion))
            .count()
    }

    /// Move the coordinates by a chunk offset.
    pub(crate) fn shift(&mut self, database: usize, query: usize) {
        self.start_database += database;
        self.end_database += database;
        self.start_query += query;
        self.end_query += query;
    }
}

impl fmt::Display for PairwiseAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bar: String = self
            .operations
            .iter()
            .map(|op| match op {
                TracebackOperation::Match => '|',
                TracebackOperation::Mismatch => '.',
                _ => ' ',
            })
            .collect();
        writeln!(
            f,
            "score {}  database {}-{}  query {}-{}",
            self.score, self.start_database, self.end_database, self.start_query, self.end_query
        )?;
        writeln!(f, "{}", String::from_utf8_lossy(&self.aligned_database))?;
        writeln!(f, "{}", bar)?;
        write!(f, "{}", String::from_utf8_lossy(&self.aligned_query))
    }
}

/// Outcome of one anchored extension run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionResult {
    pub alignment: Option<PairwiseAlignment>,
    /// True when extending with a further chunk cannot improve the result.
    pub end_of_extension: bool,
}

impl ExtensionResult {
    pub(crate) fn none() -> Self {
        Self {
            alignment: None,
            end_of_extension: true,
        }
    }
}

// Columns gathered while walking backward; reversed once at the end.
#[derive(Debug, Default)]
pub(crate) struct ColumnBuffer {
    database: Vec<u8>,
    query: Vec<u8>,
    operations: Vec<TracebackOperation>,
}

impl ColumnBuffer {
    pub fn push_pair(&mut self, database: u8, query: u8) {
        self.database.push(database);
        self.query.push(query);
        self.operations.push(if database.eq_ignore_ascii_case(&query) {
            TracebackOperation::Match
        } else {
            TracebackOperation::Mismatch
        });
    }

    pub fn push_deletion(&mut self, database: u8) {
        self.database.push(database);
        self.query.push(GAP_SYMBOL);
        self.operations.push(TracebackOperation::Deletion);
    }

    pub fn push_insertion(&mut self, query: u8) {
        self.database.push(GAP_SYMBOL);
        self.query.push(query);
        self.operations.push(TracebackOperation::Insertion);
    }

    /// Build the alignment spanning the cells `start` (exclusive) to `end`
    /// (inclusive). An empty buffer means no alignment.
    pub fn finish(mut self, score: f32, start: Position, end: Position) -> Option<PairwiseAlignment> {
        if self.operations.is_empty() {
            return None;
        }
        self.database.reverse();
        self.query.reverse();
        self.operations.reverse();

        Some(PairwiseAlignment {
            score,
            start_database: start.i + 1,
            end_database: end.i,
            start_query: start.j + 1,
            end_query: end.j,
            aligned_database: self.database,
            aligned_query: self.query,
            operations: self.operations,
        })
    }
}

/// One backward move: the cell it came from and how many columns it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub source: Position,
    pub op: Move,
    pub length: usize,
}

/// Cells within `overlap` of a chunk edge belong to the neighbouring chunk.
#[derive(Debug, Clone, Copy)]
struct OverlapBoundary {
    rows: usize,
    cols: usize,
    overlap: usize,
}

impl OverlapBoundary {
    // 3′ side: true once `position` is at least `overlap` away from both far ends.
    fn reached_overlap_boundary(&self, position: Position) -> bool {
        position.i + self.overlap <= self.rows && position.j + self.overlap <= self.cols
    }

    // 5′ side: true while both unconsumed prefixes still hold `overlap` characters.
    fn keeps_flank(&self, position: Position) -> bool {
        position.i >= self.overlap && position.j >= self.overlap
    }
}

/// Reconstructs alignments from a filled move-tagged matrix.
pub(crate) struct Traceback<'a, D: ?Sized, Q: ?Sized, G> {
    matrix: &'a AlignmentMatrix<Cell>,
    database: &'a D,
    query: &'a Q,
    gaps: &'a G,
}

impl<'a, D, Q, G> Traceback<'a, D, Q, G>
where
    D: SequenceView + ?Sized,
    Q: SequenceView + ?Sized,
    G: GapModel,
{
    pub fn new(matrix: &'a AlignmentMatrix<Cell>, database: &'a D, query: &'a Q, gaps: &'a G) -> Self {
        Self {
            matrix,
            database,
            query,
            gaps,
        }
    }

    /// Free local alignment: from the best cell back to the first zero cell.
    pub fn trace_local(&self, best: HighScore) -> Result<Option<PairwiseAlignment>, AlignerError> {
        if best.score() <= 0.0 {
            return Ok(None);
        }
        let end = best.position();
        let mut columns = ColumnBuffer::default();
        let mut position = end;
        while !self.reached_alignment_start(position) {
            let step = self.step(position)?;
            self.emit(&mut columns, position, step);
            position = step.source;
        }
        Ok(columns.finish(best.score(), position, end))
    }

    /// Anchored at `(0, 0)`. Moves inside the last `overlap` rows or columns are
    /// discarded; the reported score is the score where the walk leaves them.
    pub fn trace_extend_3prime(
        &self,
        best: HighScore,
        overlap: usize,
    ) -> Result<ExtensionResult, AlignerError> {
        let boundary = OverlapBoundary {
            rows: self.matrix.rows() - 1,
            cols: self.matrix.cols() - 1,
            overlap,
        };

        let mut position = best.position();
        while !boundary.reached_overlap_boundary(position) {
            if position == Position::ORIGIN {
                log::trace!("Overlap {} exceeds the available flank", overlap);
                return Ok(ExtensionResult::none());
            }
            position = self.step(position)?.source;
        }

        let crossing = position;
        let mut columns = ColumnBuffer::default();
        while position != Position::ORIGIN {
            let step = self.step(position)?;
            self.emit(&mut columns, position, step);
            position = step.source;
        }

        let alignment = columns.finish(self.matrix.at(crossing).score, Position::ORIGIN, crossing);
        let end_of_extension = best.position() == Position::ORIGIN || alignment.is_none();
        Ok(ExtensionResult {
            alignment,
            end_of_extension,
        })
    }

    /// Anchored at the terminal cell, free start. A move that would leave fewer
    /// than `overlap` unconsumed characters in either sequence is rolled back
    /// whole and ends the walk.
    pub fn trace_extend_5prime(&self, overlap: usize) -> Result<ExtensionResult, AlignerError> {
        let boundary = OverlapBoundary {
            rows: self.matrix.rows() - 1,
            cols: self.matrix.cols() - 1,
            overlap,
        };

        let end = self.matrix.terminal();
        let mut columns = ColumnBuffer::default();
        let mut position = end;
        let mut cut_by_overlap = false;
        while !self.reached_alignment_start(position) {
            let step = self.step(position)?;
            if !boundary.keeps_flank(step.source) {
                cut_by_overlap = true;
                break;
            }
            self.emit(&mut columns, position, step);
            position = step.source;
        }

        let score = self.matrix.at(end).score - self.matrix.at(position).score;
        Ok(match columns.finish(score, position, end) {
            Some(alignment) => ExtensionResult {
                alignment: Some(alignment),
                end_of_extension: !cut_by_overlap,
            },
            None => ExtensionResult::none(),
        })
    }

    fn reached_alignment_start(&self, position: Position) -> bool {
        position.i == 0 || position.j == 0 || self.matrix.at(position).score <= 0.0
    }

    /// The move that produced `position`, with gap runs resolved to their length.
    pub fn step(&self, position: Position) -> Result<Step, AlignerError> {
        let cell = self.matrix.at(position);
        match cell.op {
            Move::Diagonal if position.i > 0 && position.j > 0 => Ok(Step {
                source: Position::new(position.i - 1, position.j - 1),
                op: Move::Diagonal,
                length: 1,
            }),
            Move::Deletion if position.i > 0 => {
                let length = self.run_length(position, cell.score, Move::Deletion)?;
                Ok(Step {
                    source: Position::new(position.i - length, position.j),
                    op: Move::Deletion,
                    length,
                })
            }
            Move::Insertion if position.j > 0 => {
                let length = self.run_length(position, cell.score, Move::Insertion)?;
                Ok(Step {
                    source: Position::new(position.i, position.j - length),
                    op: Move::Insertion,
                    length,
                })
            }
            op => Err(invariant_violation(format!(
                "cell ({}, {}) with score {} has no predecessor for move {:?}",
                position.i, position.j, cell.score, op
            ))),
        }
    }

    // The running maxima keep no run lengths, so find the shortest run whose
    // affine cost from its source reproduces the stored score.
    fn run_length(&self, end: Position, score: f32, op: Move) -> Result<usize, AlignerError> {
        let max_length = if op == Move::Deletion { end.i } else { end.j };
        let open = self.gaps.default_open();
        let ext = self.gaps.extend();
        let dual = self.gaps.is_position_dependent();
        for tolerance in TRACEBACK_TOLERANCES {
            let mut crossings = 0.0f32;
            for length in 1..=max_length {
                let tail = ext * (length - 1) as f32;
                let (source, cell_open) = if op == Move::Deletion {
                    let source = Position::new(end.i - length, end.j);
                    if length > 1 {
                        crossings += self.gaps.database_crossing(source.i + 2);
                    }
                    (source, self.gaps.open_at(source.i + 1, source.j))
                } else {
                    let source = Position::new(end.i, end.j - length);
                    if length > 1 {
                        crossings += self.gaps.query_crossing(source.j + 2);
                    }
                    (source, self.gaps.open_at(source.i, source.j + 1))
                };

                let source_score = self.matrix.at(source).score;
                // the fill rounds once per extended column
                let drift = 4.0 * f32::EPSILON * length as f32 * source_score.abs().max(score.abs());
                let tolerance = tolerance.max(drift);
                if (source_score - (open + tail) - score).abs() <= tolerance {
                    return Ok(length);
                }
                if dual && (source_score - (cell_open + tail + crossings) - score).abs() <= tolerance
                {
                    return Ok(length);
                }
            }
        }

        Err(invariant_violation(format!(
            "no {:?} run ending at ({}, {}) reproduces score {}",
            op, end.i, end.j, score
        )))
    }

    fn emit(&self, columns: &mut ColumnBuffer, position: Position, step: Step) {
        match step.op {
            Move::Diagonal => columns.push_pair(
                self.database.char_at(position.i - 1),
                self.query.char_at(position.j - 1),
            ),
            Move::Deletion => {
                for row in (position.i - step.length..position.i).rev() {
                    columns.push_deletion(self.database.char_at(row));
                }
            }
            Move::Insertion => {
                for col in (position.j - step.length..position.j).rev() {
                    columns.push_insertion(self.query.char_at(col));
                }
            }
            Move::None => {}
        }
    }
}

fn invariant_violation(message: String) -> AlignerError {
    log::error!("Traceback invariant violated: {}", message);
    AlignerError::TracebackError(message)
}
