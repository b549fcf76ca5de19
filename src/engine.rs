//! Gotoh fill pass shared by every boundary mode and gap model.

use crate::alignment_mode::BoundaryMode;
use crate::gap_model::GapModel;
use crate::matrix::{AlignmentMatrix, Cell, Move};
use crate::scoring::{HighScore, Position, ScoringModel};
use crate::SequenceView;

pub(crate) struct FilledMatrix {
    pub matrix: AlignmentMatrix<Cell>,
    pub best: HighScore,
}

/// Fill the matrix in one pass, O(|database| * |query|).
///
/// `insertion_*[i]` holds the best score of an alignment ending at row `i`
/// with an open gap in the database; `deletion_*[j]` the same for a gap in
/// the query at column `j`. The `_variable` tracks only exist for
/// position-dependent gap models.
pub(crate) fn fill<D, Q, S, G>(
    database: &D,
    query: &Q,
    scoring: &S,
    gaps: &G,
    mode: BoundaryMode,
) -> FilledMatrix
where
    D: SequenceView + ?Sized,
    Q: SequenceView + ?Sized,
    S: ScoringModel + ?Sized,
    G: GapModel,
{
    let rows = database.len();
    let cols = query.len();
    let mut matrix = AlignmentMatrix::new(rows, cols);
    if mode == BoundaryMode::Extend3Prime {
        initialize_anchored_borders(&mut matrix, gaps);
    }
    let restart = mode != BoundaryMode::Extend3Prime;

    let open = gaps.default_open();
    let ext = gaps.extend();
    let dual = gaps.is_position_dependent();

    let mut insertion_uniform = vec![f32::NEG_INFINITY; rows + 1];
    let mut insertion_variable = vec![f32::NEG_INFINITY; rows + 1];
    let mut deletion_uniform = vec![f32::NEG_INFINITY; cols + 1];
    let mut deletion_variable = vec![f32::NEG_INFINITY; cols + 1];

    let mut best = HighScore::new(0.0, Position::ORIGIN);

    for i in 1..=rows {
        let db_char = database.char_at(i - 1);
        let db_crossing = if dual { gaps.database_crossing(i) } else { 0.0 };

        for j in 1..=cols {
            let diagonal =
                matrix.get(i - 1, j - 1).score + scoring.similarity(db_char, query.char_at(j - 1));

            let left = matrix.get(i, j - 1).score;
            let up = matrix.get(i - 1, j).score;
            insertion_uniform[i] = (left - open).max(insertion_uniform[i] - ext);
            deletion_uniform[j] = (up - open).max(deletion_uniform[j] - ext);

            let (insertion, deletion) = if dual {
                let cell_open = gaps.open_at(i, j);
                insertion_variable[i] = (left - cell_open)
                    .max(insertion_variable[i] - ext - gaps.query_crossing(j));
                deletion_variable[j] =
                    (up - cell_open).max(deletion_variable[j] - ext - db_crossing);
                (
                    insertion_uniform[i].max(insertion_variable[i]),
                    deletion_uniform[j].max(deletion_variable[j]),
                )
            } else {
                (insertion_uniform[i], deletion_uniform[j])
            };

            let cell = pick_best(diagonal, insertion, deletion, restart);
            matrix.set(i, j, cell);
            best.offer(cell.score, Position::new(i, j));
        }
    }

    FilledMatrix { matrix, best }
}

/// Leading-gap costs on row and column 0, so every path starts at `(0, 0)`.
fn initialize_anchored_borders<G: GapModel>(matrix: &mut AlignmentMatrix<Cell>, gaps: &G) {
    let open = gaps.default_open();
    let ext = gaps.extend();
    for j in 1..matrix.cols() {
        matrix.set(0, j, Cell::new(-leading_gap_cost(open, ext, j), Move::Insertion));
    }
    for i in 1..matrix.rows() {
        matrix.set(i, 0, Cell::new(-leading_gap_cost(open, ext, i), Move::Deletion));
    }
}

pub(crate) fn leading_gap_cost(open: f32, ext: f32, length: usize) -> f32 {
    open + ext * (length - 1) as f32
}

/// Tie policy of the Gotoh engines.
///
/// Diagonal, insertion and deletion are ranked first (diagonal wins ties,
/// then insertion); only afterwards is the winner compared with a fresh
/// start, which replaces it only when the winner is strictly negative. A
/// candidate of exactly zero therefore keeps its move.
pub(crate) fn pick_best(diagonal: f32, insertion: f32, deletion: f32, restart: bool) -> Cell {
    let winner = if diagonal >= insertion && diagonal >= deletion {
        Cell::new(diagonal, Move::Diagonal)
    } else if insertion >= deletion {
        Cell::new(insertion, Move::Insertion)
    } else {
        Cell::new(deletion, Move::Deletion)
    };

    if restart && winner.score < 0.0 {
        Cell::default()
    } else {
        winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap_model::{HomopolymerGaps, UniformGaps};
    use crate::ScoreParams;

    fn simple() -> ScoreParams {
        ScoreParams::new(1.0, -1.0, 5.0, 1.0).unwrap()
    }

    #[test]
    fn pick_best_prefers_diagonal_then_insertion() {
        assert_eq!(pick_best(2.0, 2.0, 2.0, true).op, Move::Diagonal);
        assert_eq!(pick_best(1.0, 2.0, 2.0, true).op, Move::Insertion);
        assert_eq!(pick_best(1.0, 2.0, 3.0, true).op, Move::Deletion);
    }

    #[test]
    fn pick_best_keeps_move_on_zero() {
        assert_eq!(pick_best(0.0, -5.0, -5.0, true), Cell::new(0.0, Move::Diagonal));
        assert_eq!(pick_best(-1.0, -5.0, -5.0, true), Cell::default());
        // anchored fills never restart
        assert_eq!(pick_best(-1.0, -5.0, -5.0, false), Cell::new(-1.0, Move::Diagonal));
    }

    #[test]
    fn local_fill_tracks_best_cell() {
        let scoring = simple();
        let gaps = UniformGaps::from_scoring(&scoring);
        let filled = fill(b"TTACGTT", b"GACGA", &scoring, &gaps, BoundaryMode::Local);
        assert_eq!(filled.best.score(), 3.0);
        assert_eq!(filled.best.position(), Position::new(5, 4));
        assert_eq!(filled.matrix.get(0, 3), Cell::default());
    }

    #[test]
    fn zero_scoring_diagonal_keeps_its_move() {
        // "AC" vs "AG": one match then one mismatch sums to exactly zero.
        let scoring = simple();
        let gaps = UniformGaps::from_scoring(&scoring);
        let filled = fill(b"AC", b"AG", &scoring, &gaps, BoundaryMode::Local);
        assert_eq!(filled.matrix.get(2, 2), Cell::new(0.0, Move::Diagonal));
    }

    #[test]
    fn anchored_borders_hold_leading_gap_costs() {
        let scoring = simple();
        let gaps = UniformGaps::from_scoring(&scoring);
        let filled = fill(b"ACG", b"AC", &scoring, &gaps, BoundaryMode::Extend3Prime);
        assert_eq!(filled.matrix.get(0, 0), Cell::default());
        assert_eq!(filled.matrix.get(0, 1), Cell::new(-5.0, Move::Insertion));
        assert_eq!(filled.matrix.get(0, 2), Cell::new(-6.0, Move::Insertion));
        assert_eq!(filled.matrix.get(3, 0), Cell::new(-7.0, Move::Deletion));
        assert_eq!(filled.best.position(), Position::new(2, 2));
    }

    #[test]
    fn affine_gap_costs_open_once() {
        // one 3-long deletion of the GGG block
        let scoring = ScoreParams::new(2.0, -3.0, 3.0, 1.0).unwrap();
        let gaps = UniformGaps::from_scoring(&scoring);
        let filled = fill(b"AAAAGGGTTTT", b"AAAATTTT", &scoring, &gaps, BoundaryMode::Local);
        // 8 matches (16) minus open 3 minus 2 extensions
        assert_eq!(filled.best.score(), 11.0);
        assert_eq!(filled.best.position(), Position::new(11, 8));
        assert_eq!(filled.matrix.get(7, 4), Cell::new(3.0, Move::Deletion));
    }

    #[test]
    fn homopolymer_fill_is_cheaper_inside_runs() {
        let scoring = ScoreParams::new(2.0, -1.0, 5.0, 1.0).unwrap();
        let uniform = UniformGaps::from_scoring(&scoring);
        let homopolymer = HomopolymerGaps::derive(b"AAAAATTT", b"AAAATTT", &scoring, None);
        let flat = fill(b"AAAAATTT", b"AAAATTT", &scoring, &uniform, BoundaryMode::Extend3Prime);
        let aware = fill(
            b"AAAAATTT",
            b"AAAATTT",
            &scoring,
            &homopolymer,
            BoundaryMode::Extend3Prime,
        );
        assert_eq!(flat.matrix.get(8, 7).score, 9.0);
        assert!((aware.matrix.get(8, 7).score - 11.9).abs() < 1e-4);
        assert_eq!(aware.matrix.get(5, 4).op, Move::Deletion);
    }
}
