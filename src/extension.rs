//! Chunked extension of a seed match toward both sequence ends.
//!
//! Each step aligns one window of at most `chunk_size` characters per
//! sequence with an anchored engine run, so memory stays bounded by
//! `chunk_size²` whatever the sequence lengths. The last `overlap` characters
//! at a window's free edge are left for the next window to re-align.

use crate::alignment_mode::{AlignmentParams, BoundaryMode, GapModelKind};
use crate::scoring::{Position, ScoringModel};
use crate::traceback::{ColumnBuffer, PairwiseAlignment};
use crate::{check_sequences, Aligner, AlignerError, SequenceView};

pub const DEFAULT_CHUNK_SIZE: usize = 256;
pub const DEFAULT_OVERLAP: usize = 16;

/// Confirmed match between the two sequences, in 0-based coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub database_pos: usize,
    pub query_pos: usize,
    pub length: usize,
}

impl Seed {
    pub fn new(database_pos: usize, query_pos: usize, length: usize) -> Self {
        Self {
            database_pos,
            query_pos,
            length,
        }
    }

    fn database_end(&self) -> Option<usize> {
        self.database_pos.checked_add(self.length)
    }

    fn query_end(&self) -> Option<usize> {
        self.query_pos.checked_add(self.length)
    }
}

/// Borrowed sub-range of a sequence, itself usable as a [`SequenceView`].
#[derive(Debug, Clone, Copy)]
pub struct Window<'a, S: ?Sized> {
    sequence: &'a S,
    start: usize,
    len: usize,
}

impl<'a, S: SequenceView + ?Sized> Window<'a, S> {
    pub fn new(sequence: &'a S, start: usize, len: usize) -> Result<Self, AlignerError> {
        if start.checked_add(len).map_or(true, |end| end > sequence.len()) {
            return Err(AlignerError::InvalidParameter(format!(
                "window of {} at {} exceeds sequence length {}",
                len,
                start,
                sequence.len()
            )));
        }
        Ok(Self {
            sequence,
            start,
            len,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }
}

impl<'a, S: SequenceView + ?Sized> SequenceView for Window<'a, S> {
    fn len(&self) -> usize {
        self.len
    }

    fn char_at(&self, index: usize) -> u8 {
        self.sequence.char_at(self.start + index)
    }
}

#[derive(Debug, Clone)]
pub struct SeedExtender<S: ScoringModel> {
    scoring: S,
    chunk_size: usize,
    overlap: usize,
    gap_model: GapModelKind,
    boundary_cross_penalty: Option<f32>,
}

impl<S: ScoringModel> SeedExtender<S> {
    pub fn new(scoring: S) -> Self {
        Self {
            scoring,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            gap_model: GapModelKind::Uniform,
            boundary_cross_penalty: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_gap_model(mut self, gap_model: GapModelKind) -> Self {
        self.gap_model = gap_model;
        self
    }

    pub fn with_boundary_cross_penalty(mut self, penalty: Option<f32>) -> Self {
        self.boundary_cross_penalty = penalty;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Extend `seed` in both directions and stitch the pieces into one
    /// alignment with absolute 1-based coordinates. The score is the sum of
    /// the seed columns and every extension chunk.
    pub fn extend<D, Q>(
        &self,
        database: &D,
        query: &Q,
        seed: Seed,
    ) -> Result<PairwiseAlignment, AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        check_sequences(database, query)?;
        let (database_end, query_end) = self.check_seed(database, query, seed)?;
        if self.chunk_size <= self.overlap {
            return Err(AlignerError::InvalidParameter(format!(
                "chunk size {} must exceed overlap {}",
                self.chunk_size, self.overlap
            )));
        }

        let upstream = self.extend_5prime(database, query, seed)?;
        let downstream = self.extend_3prime(database, query, database_end, query_end)?;

        let mut seed_columns = ColumnBuffer::default();
        let mut seed_score = 0.0;
        for offset in (0..seed.length).rev() {
            let db_char = database.char_at(seed.database_pos + offset);
            let q_char = query.char_at(seed.query_pos + offset);
            seed_columns.push_pair(db_char, q_char);
            seed_score += self.scoring.similarity(db_char, q_char);
        }
        let mut stitched = seed_columns
            .finish(
                seed_score,
                Position::new(seed.database_pos, seed.query_pos),
                Position::new(database_end, query_end),
            )
            .ok_or_else(|| AlignerError::InvalidParameter("seed has no columns".to_string()))?;

        // nearest chunk first, each one lands in front of the previous
        for part in &upstream {
            prepend(&mut stitched, part);
        }
        for part in &downstream {
            append(&mut stitched, part);
        }

        log::debug!(
            "Seed at ({}, {}) extended to database {}-{}, query {}-{}, score {}",
            seed.database_pos,
            seed.query_pos,
            stitched.start_database,
            stitched.end_database,
            stitched.start_query,
            stitched.end_query,
            stitched.score
        );
        Ok(stitched)
    }

    // Exclusive seed ends, once the seed is known to fit both sequences.
    fn check_seed<D, Q>(
        &self,
        database: &D,
        query: &Q,
        seed: Seed,
    ) -> Result<(usize, usize), AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        if seed.length == 0 {
            return Err(AlignerError::InvalidParameter(
                "seed length must be positive".to_string(),
            ));
        }
        match (seed.database_end(), seed.query_end()) {
            (Some(database_end), Some(query_end))
                if database_end <= database.len() && query_end <= query.len() =>
            {
                Ok((database_end, query_end))
            }
            _ => Err(AlignerError::InvalidParameter(format!(
                "seed {:?} lies outside sequences of length {} and {}",
                seed,
                database.len(),
                query.len()
            ))),
        }
    }

    fn chunk_aligner(&self, mode: BoundaryMode, overlap: usize) -> Result<Aligner<&S>, AlignerError> {
        Aligner::with_params(
            &self.scoring,
            AlignmentParams {
                mode,
                gap_model: self.gap_model,
                overlap,
                boundary_cross_penalty: self.boundary_cross_penalty,
            },
        )
    }

    // Chunks walking right from the seed end, in sequence order.
    fn extend_3prime<D, Q>(
        &self,
        database: &D,
        query: &Q,
        mut db_cursor: usize,
        mut q_cursor: usize,
    ) -> Result<Vec<PairwiseAlignment>, AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        let mut parts = Vec::new();

        while db_cursor < database.len() && q_cursor < query.len() {
            let db_len = self.chunk_size.min(database.len() - db_cursor);
            let q_len = self.chunk_size.min(query.len() - q_cursor);
            let last = db_cursor + db_len == database.len() || q_cursor + q_len == query.len();
            let overlap = if last { 0 } else { self.overlap };

            let result = self.chunk_aligner(BoundaryMode::Extend3Prime, overlap)?.extend(
                &Window::new(database, db_cursor, db_len)?,
                &Window::new(query, q_cursor, q_len)?,
            )?;
            let Some(mut part) = result.alignment else {
                break;
            };
            part.shift(db_cursor, q_cursor);
            log::trace!(
                "3' chunk at ({}, {}) reached ({}, {}), score {}",
                db_cursor,
                q_cursor,
                part.end_database,
                part.end_query,
                part.score
            );
            db_cursor = part.end_database;
            q_cursor = part.end_query;
            parts.push(part);

            if result.end_of_extension || last {
                break;
            }
        }
        Ok(parts)
    }

    // Chunks walking left from the seed start, nearest first.
    fn extend_5prime<D, Q>(
        &self,
        database: &D,
        query: &Q,
        seed: Seed,
    ) -> Result<Vec<PairwiseAlignment>, AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        let mut parts = Vec::new();
        let mut db_cursor = seed.database_pos;
        let mut q_cursor = seed.query_pos;

        while db_cursor > 0 && q_cursor > 0 {
            let db_start = db_cursor - self.chunk_size.min(db_cursor);
            let q_start = q_cursor - self.chunk_size.min(q_cursor);
            let last = db_start == 0 || q_start == 0;
            let overlap = if last { 0 } else { self.overlap };

            let result = self.chunk_aligner(BoundaryMode::Extend5Prime, overlap)?.extend(
                &Window::new(database, db_start, db_cursor - db_start)?,
                &Window::new(query, q_start, q_cursor - q_start)?,
            )?;
            let Some(mut part) = result.alignment else {
                break;
            };
            part.shift(db_start, q_start);
            log::trace!(
                "5' chunk ending at ({}, {}) reached ({}, {}), score {}",
                db_cursor,
                q_cursor,
                part.start_database,
                part.start_query,
                part.score
            );
            db_cursor = part.start_database - 1;
            q_cursor = part.start_query - 1;
            parts.push(part);

            if result.end_of_extension || last {
                break;
            }
        }
        Ok(parts)
    }
}

fn prepend(stitched: &mut PairwiseAlignment, part: &PairwiseAlignment) {
    stitched.score += part.score;
    stitched.start_database = part.start_database;
    stitched.start_query = part.start_query;
    stitched.aligned_database.splice(0..0, part.aligned_database.iter().copied());
    stitched.aligned_query.splice(0..0, part.aligned_query.iter().copied());
    stitched.operations.splice(0..0, part.operations.iter().copied());
}

fn append(stitched: &mut PairwiseAlignment, part: &PairwiseAlignment) {
    stitched.score += part.score;
    stitched.end_database = part.end_database;
    stitched.end_query = part.end_query;
    stitched.aligned_database.extend_from_slice(&part.aligned_database);
    stitched.aligned_query.extend_from_slice(&part.aligned_query);
    stitched.operations.extend_from_slice(&part.operations);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScoreParams;

    fn simple() -> ScoreParams {
        ScoreParams::new(1.0, -1.0, 5.0, 1.0).unwrap()
    }

    #[test]
    fn window_reads_through_offset() {
        let window = Window::new(b"ACGTACGT".as_slice(), 2, 3).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window.char_at(0), b'G');
        assert_eq!(window.start(), 2);
        assert!(Window::new(b"ACGT".as_slice(), 2, 3).is_err());
    }

    #[test]
    fn identical_sequences_extend_to_full_length() {
        let sequence = b"ACGTTGCAAGCTTACGGATC";
        let extender = SeedExtender::new(simple())
            .with_chunk_size(5)
            .with_overlap(2);
        let alignment = extender
            .extend(sequence, sequence, Seed::new(8, 8, 4))
            .unwrap();
        assert_eq!(alignment.score, 20.0);
        assert_eq!((alignment.start_database, alignment.end_database), (1, 20));
        assert_eq!((alignment.start_query, alignment.end_query), (1, 20));
        assert_eq!(alignment.aligned_database, sequence.to_vec());
    }

    #[test]
    fn divergent_flanks_keep_only_the_seed() {
        let extender = SeedExtender::new(simple()).with_chunk_size(8).with_overlap(2);
        let alignment = extender
            .extend(b"TTTTACGTACGTAAAA", b"CCCCACGTACGTGGGG", Seed::new(4, 4, 8))
            .unwrap();
        assert_eq!(alignment.score, 8.0);
        assert_eq!((alignment.start_database, alignment.end_database), (5, 12));
        assert_eq!(alignment.aligned_query, b"ACGTACGT");
    }

    #[test]
    fn invalid_seeds_are_rejected() {
        let extender = SeedExtender::new(simple());
        assert!(matches!(
            extender.extend(b"ACGT", b"ACGT", Seed::new(0, 0, 0)),
            Err(AlignerError::InvalidParameter(_))
        ));
        assert!(matches!(
            extender.extend(b"ACGT", b"ACGT", Seed::new(2, 0, 3)),
            Err(AlignerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn upstream_chunks_stitch_in_sequence_order() {
        let sequence = b"GATTACAGGCTTAACCGTAGCATGCAAGTCCTAGGATCCA";
        let extender = SeedExtender::new(simple()).with_chunk_size(8).with_overlap(2);
        let alignment = extender
            .extend(sequence, sequence, Seed::new(30, 30, 4))
            .unwrap();
        assert_eq!(alignment.score, 40.0);
        assert_eq!((alignment.start_database, alignment.end_database), (1, 40));
        assert_eq!((alignment.start_query, alignment.end_query), (1, 40));
        assert_eq!(alignment.aligned_database, sequence.to_vec());
        assert_eq!(alignment.aligned_query, sequence.to_vec());
    }

    #[test]
    fn overflowing_ranges_are_rejected() {
        assert!(Window::new(b"ACGT".as_slice(), usize::MAX, 2).is_err());
        let extender = SeedExtender::new(simple());
        assert!(matches!(
            extender.extend(b"ACGT", b"ACGT", Seed::new(usize::MAX, 0, 2)),
            Err(AlignerError::InvalidParameter(_))
        ));
        assert!(matches!(
            extender.extend(b"ACGT", b"ACGT", Seed::new(0, 1, usize::MAX)),
            Err(AlignerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn overlap_must_fit_in_chunk() {
        let extender = SeedExtender::new(simple()).with_chunk_size(4).with_overlap(4);
        assert!(extender
            .extend(b"ACGTACGT", b"ACGTACGT", Seed::new(2, 2, 2))
            .is_err());
    }
}
