//! Brute-force affine-gap local alignment, kept as a correctness oracle.
//!
//! Every gap candidate is scanned explicitly over the whole row or column,
//! so a fill costs O(M² · N). Use [`crate::Aligner`] for real inputs.

use crate::matrix::{AlignmentMatrix, PredecessorCell};
use crate::scoring::{HighScore, Position, ScoringModel};
use crate::traceback::{ColumnBuffer, PairwiseAlignment};
use crate::{check_sequences, AlignerError, SequenceView};

#[derive(Debug, Clone)]
pub struct ReferenceAligner<S: ScoringModel> {
    scoring: S,
}

impl<S: ScoringModel> ReferenceAligner<S> {
    pub fn new(scoring: S) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    /// Optimal local alignment with uniform affine gaps, or `Ok(None)` when
    /// no cell scores above zero.
    pub fn align<D, Q>(
        &self,
        database: &D,
        query: &Q,
    ) -> Result<Option<PairwiseAlignment>, AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        check_sequences(database, query)?;
        log::debug!(
            "Reference fill of {}x{} matrix",
            database.len() + 1,
            query.len() + 1
        );

        let (matrix, best) = self.fill(database, query);
        if best.score() <= 0.0 {
            return Ok(None);
        }
        trace(&matrix, database, query, best)
    }

    fn fill<D, Q>(&self, database: &D, query: &Q) -> (AlignmentMatrix<PredecessorCell>, HighScore)
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        let rows = database.len();
        let cols = query.len();
        let open = self.scoring.gap_open();
        let ext = self.scoring.gap_extend();

        let mut matrix: AlignmentMatrix<PredecessorCell> = AlignmentMatrix::new(rows, cols);
        let mut best = HighScore::new(0.0, Position::ORIGIN);

        for i in 1..=rows {
            for j in 1..=cols {
                let diagonal = matrix.get(i - 1, j - 1).score
                    + self
                        .scoring
                        .similarity(database.char_at(i - 1), query.char_at(j - 1));
                // A gap source must beat this to win against the diagonal.
                let threshold = diagonal + open;

                let mut insertion = (f32::NEG_INFINITY, Position::ORIGIN);
                for down in 0..j {
                    let source = matrix.get(i, down).score;
                    if source > threshold {
                        let candidate = source - open - ext * (j - down - 1) as f32;
                        if candidate > insertion.0 {
                            insertion = (candidate, Position::new(i, down));
                        }
                    }
                }

                let mut deletion = (f32::NEG_INFINITY, Position::ORIGIN);
                for left in 0..i {
                    let source = matrix.get(left, j).score;
                    if source > threshold {
                        let candidate = source - open - ext * (i - left - 1) as f32;
                        if candidate > deletion.0 {
                            deletion = (candidate, Position::new(left, j));
                        }
                    }
                }

                let cell = cascade((diagonal, Position::new(i - 1, j - 1)), insertion, deletion);
                matrix.set(i, j, cell);
                best.offer(cell.score, Position::new(i, j));
            }
        }

        (matrix, best)
    }
}

/// Tie policy of the reference engine.
///
/// The diagonal is the provisional winner; insertion and then deletion
/// replace it only when strictly greater. A winner of zero or less restarts
/// the alignment, so zero wins every tie.
pub(crate) fn cascade(
    diagonal: (f32, Position),
    insertion: (f32, Position),
    deletion: (f32, Position),
) -> PredecessorCell {
    let mut winner = diagonal;
    if insertion.0 > winner.0 {
        winner = insertion;
    }
    if deletion.0 > winner.0 {
        winner = deletion;
    }

    if winner.0 <= 0.0 {
        PredecessorCell::default()
    } else {
        PredecessorCell {
            score: winner.0,
            source: Some(winner.1),
        }
    }
}

fn trace<D, Q>(
    matrix: &AlignmentMatrix<PredecessorCell>,
    database: &D,
    query: &Q,
    best: HighScore,
) -> Result<Option<PairwiseAlignment>, AlignerError>
where
    D: SequenceView + ?Sized,
    Q: SequenceView + ?Sized,
{
    let end = best.position();
    let mut columns = ColumnBuffer::default();
    let mut position = end;

    while matrix.at(position).score != 0.0 {
        let cell = matrix.at(position);
        let source = cell.source.ok_or_else(|| {
            let message = format!(
                "cell ({}, {}) with score {} has no predecessor",
                position.i, position.j, cell.score
            );
            log::error!("Reference traceback failed: {}", message);
            AlignerError::TracebackError(message)
        })?;

        if source.i + 1 == position.i && source.j + 1 == position.j {
            columns.push_pair(database.char_at(source.i), query.char_at(source.j));
        } else if source.i == position.i {
            for col in (source.j..position.j).rev() {
                columns.push_insertion(query.char_at(col));
            }
        } else {
            for row in (source.i..position.i).rev() {
                columns.push_deletion(database.char_at(row));
            }
        }
        position = source;
    }

    Ok(columns.finish(best.score(), position, end))
}
