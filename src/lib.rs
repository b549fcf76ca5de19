//! Pairwise nucleotide alignment with affine and homopolymer-aware gaps.
//!
//! The crate fills a dynamic-programming matrix with the Gotoh affine-gap
//! recurrence, optionally with position-dependent gap-open costs derived from
//! homopolymer runs (454-style error model), and reconstructs the best path
//! into a [`PairwiseAlignment`]. Three boundary modes are supported: free local
//! alignment and anchored extension toward the 3′ or 5′ end of a seed.
//!
//! ```
//! use gotoh_aligner::{Aligner, ScoreParams};
//!
//! let scoring = ScoreParams::new(1.0, -1.0, 5.0, 1.0).unwrap();
//! let aligner = Aligner::new(scoring);
//! let alignment = aligner.align(b"ACGT", b"ACGT").unwrap().unwrap();
//! assert_eq!(alignment.score, 4.0);
//! assert_eq!((alignment.start_database, alignment.end_database), (1, 4));
//! ```

use thiserror::Error;

pub mod alignment_mode;
pub mod batch;
pub mod config;
mod engine;
pub mod extension;
pub mod gap_model;
pub mod homopolymer;
pub mod matrix;
pub mod naive;
pub mod scoring;
pub mod traceback;

pub use crate::alignment_mode::{AlignmentParams, BoundaryMode, GapModelKind};
pub use crate::batch::BatchAligner;
pub use crate::config::AlignerConfig;
pub use crate::extension::{Seed, SeedExtender, Window};
pub use crate::gap_model::{GapModel, HomopolymerGaps, UniformGaps};
pub use crate::homopolymer::HomopolymerGapProfile;
pub use crate::matrix::{AlignmentMatrix, Cell, Move, PredecessorCell};
pub use crate::naive::ReferenceAligner;
pub use crate::scoring::{Position, ScoringModel};
pub use crate::traceback::{ExtensionResult, PairwiseAlignment, TracebackOperation};

// DNA scoring parameters. The gap-open value is the cost of the first gap
// position; every further position costs the extension value.
pub const DNA_MATCH: f32 = 1.0;
pub const DNA_MISMATCH: f32 = -3.0;
pub const DNA_GAP_OPEN: f32 = 5.0;
pub const DNA_GAP_EXT: f32 = 2.0;

/// Symbol written into aligned sequences for a gap column.
pub const GAP_SYMBOL: u8 = b'-';

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Traceback error: {0}")]
    TracebackError(String),
    #[error("Worker error: {0}")]
    WorkerError(String),
}

/// Immutable, random-access, 0-indexed character sequence.
pub trait SequenceView {
    fn len(&self) -> usize;

    /// Character at `index`, valid for `0 <= index < len()`.
    fn char_at(&self, index: usize) -> u8;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SequenceView for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn char_at(&self, index: usize) -> u8 {
        self[index]
    }
}

impl<const N: usize> SequenceView for [u8; N] {
    fn len(&self) -> usize {
        N
    }

    fn char_at(&self, index: usize) -> u8 {
        self[index]
    }
}

impl SequenceView for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn char_at(&self, index: usize) -> u8 {
        self[index]
    }
}

impl SequenceView for str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn char_at(&self, index: usize) -> u8 {
        self.as_bytes()[index]
    }
}

impl SequenceView for String {
    fn len(&self) -> usize {
        String::len(self)
    }

    fn char_at(&self, index: usize) -> u8 {
        self.as_bytes()[index]
    }
}

/// Owned nucleotide sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    data: Vec<u8>,
}

impl Sequence {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<&str> for Sequence {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<Vec<u8>> for Sequence {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl SequenceView for Sequence {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn char_at(&self, index: usize) -> u8 {
        self.data[index]
    }
}

// Match/mismatch scoring with affine gaps, the crate's concrete ScoringModel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreParams {
    pub match_score: f32,
    pub mismatch: f32,
    pub gap_open: f32,
    pub gap_ext: f32,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            match_score: DNA_MATCH,
            mismatch: DNA_MISMATCH,
            gap_open: DNA_GAP_OPEN,
            gap_ext: DNA_GAP_EXT,
        }
    }
}

impl ScoreParams {
    pub fn new(
        match_score: f32,
        mismatch: f32,
        gap_open: f32,
        gap_ext: f32,
    ) -> Result<Self, AlignerError> {
        let params = Self {
            match_score,
            mismatch,
            gap_open,
            gap_ext,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), AlignerError> {
        let values = [self.match_score, self.mismatch, self.gap_open, self.gap_ext];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AlignerError::InvalidParameter(format!(
                "scores must be finite: {:?}",
                self
            )));
        }
        if self.gap_ext < 0.0 {
            return Err(AlignerError::InvalidParameter(
                "Gap extension penalty cannot be negative".to_string(),
            ));
        }
        if self.gap_open < self.gap_ext {
            return Err(AlignerError::InvalidParameter(format!(
                "Gap open penalty {} is smaller than the extension penalty {}",
                self.gap_open, self.gap_ext
            )));
        }
        Ok(())
    }
}

/// One configurable alignment engine: a scoring model plus a gap model and a
/// boundary mode.
#[derive(Debug, Clone)]
pub struct Aligner<S: ScoringModel> {
    scoring: S,
    params: AlignmentParams,
}

impl<S: ScoringModel> Aligner<S> {
    pub fn new(scoring: S) -> Self {
        Self {
            scoring,
            params: AlignmentParams::default(),
        }
    }

    pub fn with_params(scoring: S, params: AlignmentParams) -> Result<Self, AlignerError> {
        params.validate()?;
        Ok(Self { scoring, params })
    }

    pub fn with_alignment_mode(mut self, mode: BoundaryMode) -> Self {
        self.params.mode = mode;
        self
    }

    pub fn with_gap_model(mut self, gap_model: GapModelKind) -> Self {
        self.params.gap_model = gap_model;
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.params.overlap = overlap;
        self
    }

    pub fn with_boundary_cross_penalty(mut self, penalty: f32) -> Result<Self, AlignerError> {
        if !penalty.is_finite() || penalty < 0.0 {
            return Err(AlignerError::InvalidParameter(format!(
                "Boundary cross penalty must be a non-negative number, got {}",
                penalty
            )));
        }
        self.params.boundary_cross_penalty = Some(penalty);
        Ok(self)
    }

    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    pub fn params(&self) -> &AlignmentParams {
        &self.params
    }

    /// Align `database` against `query` under the configured mode.
    ///
    /// Returns `Ok(None)` when no alignment was found. For the anchored modes
    /// the end-of-extension flag is dropped; use [`Aligner::extend`] to read it.
    pub fn align<D, Q>(
        &self,
        database: &D,
        query: &Q,
    ) -> Result<Option<PairwiseAlignment>, AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        Ok(self.run(database, query)?.alignment)
    }

    /// Run one anchored extension step (3′ or 5′, per the configured mode).
    pub fn extend<D, Q>(&self, database: &D, query: &Q) -> Result<ExtensionResult, AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        if self.params.mode == BoundaryMode::Local {
            return Err(AlignerError::InvalidParameter(
                "extend requires an anchored boundary mode".to_string(),
            ));
        }
        self.run(database, query)
    }

    fn run<D, Q>(&self, database: &D, query: &Q) -> Result<ExtensionResult, AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
    {
        check_sequences(database, query)?;
        match self.params.gap_model {
            GapModelKind::Uniform => {
                let gaps = UniformGaps::from_scoring(&self.scoring);
                self.run_with(database, query, &gaps)
            }
            GapModelKind::Homopolymer => {
                let gaps = HomopolymerGaps::derive(
                    database,
                    query,
                    &self.scoring,
                    Some(
                        self.params
                            .boundary_cross_penalty_or_default(self.scoring.gap_extend()),
                    ),
                );
                self.run_with(database, query, &gaps)
            }
        }
    }

    fn run_with<D, Q, G>(
        &self,
        database: &D,
        query: &Q,
        gaps: &G,
    ) -> Result<ExtensionResult, AlignerError>
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
        G: GapModel,
    {
        let mode = self.params.mode;
        log::debug!(
            "Filling {}x{} matrix ({:?}, {:?} gaps)",
            database.len() + 1,
            query.len() + 1,
            mode,
            self.params.gap_model
        );
        let filled = engine::fill(database, query, &self.scoring, gaps, mode);
        let traceback = traceback::Traceback::new(&filled.matrix, database, query, gaps);

        let result = match mode {
            BoundaryMode::Local => ExtensionResult {
                alignment: traceback.trace_local(filled.best)?,
                end_of_extension: true,
            },
            BoundaryMode::Extend3Prime => {
                traceback.trace_extend_3prime(filled.best, self.params.overlap)?
            }
            BoundaryMode::Extend5Prime => traceback.trace_extend_5prime(self.params.overlap)?,
        };

        match &result.alignment {
            Some(alignment) => log::debug!(
                "Alignment score {} (database {}-{}, query {}-{})",
                alignment.score,
                alignment.start_database,
                alignment.end_database,
                alignment.start_query,
                alignment.end_query
            ),
            None => log::debug!("No alignment found"),
        }
        Ok(result)
    }
}

/// Reject empty inputs before any matrix is allocated.
pub(crate) fn check_sequences<D, Q>(database: &D, query: &Q) -> Result<(), AlignerError>
where
    D: SequenceView + ?Sized,
    Q: SequenceView + ?Sized,
{
    if database.is_empty() {
        return Err(AlignerError::InvalidSequence(
            "database sequence must not be empty".to_string(),
        ));
    }
    if query.is_empty() {
        return Err(AlignerError::InvalidSequence(
            "query sequence must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> ScoreParams {
        ScoreParams::new(1.0, -1.0, 5.0, 1.0).unwrap()
    }

    #[test]
    fn score_params_validation() {
        assert!(ScoreParams::new(1.0, -1.0, 5.0, 1.0).is_ok());
        assert!(ScoreParams::new(1.0, -1.0, 1.0, 2.0).is_err());
        assert!(ScoreParams::new(1.0, -1.0, 5.0, -1.0).is_err());
        assert!(ScoreParams::new(f32::NAN, -1.0, 5.0, 1.0).is_err());
        assert!(ScoreParams::default().validate().is_ok());
    }

    #[test]
    fn sequence_views_agree() {
        let owned = Sequence::from("ACGT");
        assert_eq!(SequenceView::len(&owned), 4);
        assert_eq!(owned.char_at(2), b'G');
        assert_eq!(SequenceView::len("ACGT"), 4);
        assert_eq!("ACGT".char_at(3), b'T');
        assert_eq!(SequenceView::len(b"AC"), 2);
        assert!(SequenceView::is_empty(&Vec::<u8>::new()));
    }

    #[test]
    fn empty_sequences_are_rejected() {
        let aligner = Aligner::new(simple());
        let err = aligner.align(b"", b"ACGT").unwrap_err();
        assert!(matches!(err, AlignerError::InvalidSequence(_)));
        let err = aligner.align(b"ACGT", "").unwrap_err();
        assert!(matches!(err, AlignerError::InvalidSequence(_)));

        let anchored = Aligner::new(simple()).with_alignment_mode(BoundaryMode::Extend5Prime);
        assert!(matches!(
            anchored.extend(b"", b"A"),
            Err(AlignerError::InvalidSequence(_))
        ));
    }

    #[test]
    fn extend_requires_anchored_mode() {
        let aligner = Aligner::new(simple());
        assert!(matches!(
            aligner.extend(b"ACGT", b"ACGT"),
            Err(AlignerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn boundary_cross_penalty_must_be_non_negative() {
        assert!(Aligner::new(simple()).with_boundary_cross_penalty(-1.0).is_err());
        let aligner = Aligner::new(simple()).with_boundary_cross_penalty(3.0).unwrap();
        assert_eq!(aligner.params().boundary_cross_penalty, Some(3.0));
    }

    #[test]
    fn local_alignment_of_identical_sequences() {
        let aligner = Aligner::new(simple());
        let alignment = aligner.align(b"ACGT", b"ACGT").unwrap().unwrap();
        assert_eq!(alignment.score, 4.0);
        assert_eq!(alignment.aligned_database, b"ACGT");
        assert_eq!(alignment.aligned_query, b"ACGT");
        assert_eq!((alignment.start_query, alignment.end_query), (1, 4));
    }

    #[test]
    fn unrelated_sequences_have_no_alignment() {
        let aligner = Aligner::new(simple());
        assert!(aligner.align(b"AAAA", b"CCCC").unwrap().is_none());
    }
}
