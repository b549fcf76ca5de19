//! Dynamic-programming grid and its cell types.

use crate::scoring::Position;

/// How a cell was reached from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Move {
    /// Alignment starts here (or border cell in free modes).
    #[default]
    None,
    Diagonal,
    /// Query character against a gap in the database.
    Insertion,
    /// Database character against a gap in the query.
    Deletion,
}

/// Cell of the O(M·N) engines: score plus the move that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    pub score: f32,
    pub op: Move,
}

impl Cell {
    pub fn new(score: f32, op: Move) -> Self {
        Self { score, op }
    }
}

/// Cell of the reference engine, which records its predecessor explicitly
/// because a gap may come from any earlier cell of the row or column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PredecessorCell {
    pub score: f32,
    pub source: Option<Position>,
}

/// `(|database| + 1) x (|query| + 1)` grid stored row-major.
#[derive(Debug, Clone)]
pub struct AlignmentMatrix<C> {
    data: Vec<C>,
    rows: usize,
    cols: usize,
}

impl<C: Copy + Default> AlignmentMatrix<C> {
    /// Grid for a database of `database_len` and a query of `query_len`
    /// characters; row and column 0 stand for the empty prefix.
    pub fn new(database_len: usize, query_len: usize) -> Self {
        let rows = database_len + 1;
        let cols = query_len + 1;
        Self {
            data: vec![C::default(); rows * cols],
            rows,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn set(&mut self, row: usize, col: usize, value: C) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    pub fn get(&self, row: usize, col: usize) -> C {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    pub fn at(&self, position: Position) -> C {
        self.get(position.i, position.j)
    }

    /// Last cell, `(|database|, |query|)`.
    pub fn terminal(&self) -> Position {
        Position::new(self.rows - 1, self.cols - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_include_empty_prefix() {
        let matrix: AlignmentMatrix<Cell> = AlignmentMatrix::new(3, 5);
        assert_eq!(matrix.rows(), 4);
        assert_eq!(matrix.cols(), 6);
        assert_eq!(matrix.terminal(), Position::new(3, 5));
        assert_eq!(matrix.get(3, 5), Cell::default());
    }

    #[test]
    fn set_and_get_are_row_major() {
        let mut matrix: AlignmentMatrix<Cell> = AlignmentMatrix::new(2, 2);
        matrix.set(1, 2, Cell::new(4.0, Move::Diagonal));
        assert_eq!(matrix.get(1, 2).score, 4.0);
        assert_eq!(matrix.at(Position::new(1, 2)).op, Move::Diagonal);
        assert_eq!(matrix.get(2, 1), Cell::default());
    }

    #[test]
    fn predecessor_cells_start_unset() {
        let matrix: AlignmentMatrix<PredecessorCell> = AlignmentMatrix::new(1, 1);
        assert_eq!(matrix.get(1, 1).source, None);
        assert_eq!(matrix.get(1, 1).score, 0.0);
    }
}
