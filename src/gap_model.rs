//! Gap-penalty providers plugged into the Gotoh engine.

use crate::homopolymer::HomopolymerGapProfile;
use crate::scoring::ScoringModel;
use crate::SequenceView;

/// Per-cell gap costs seen by the fill and the traceback.
///
/// The engine keeps a uniform track that always pays [`GapModel::default_open`]
/// and, for position-dependent models, a variable track that opens at
/// [`GapModel::open_at`] and pays the crossing penalties on every extension.
pub trait GapModel {
    fn default_open(&self) -> f32;

    fn extend(&self) -> f32;

    /// Gap-open cost for a gap whose first column is evaluated at cell `(i, j)`.
    fn open_at(&self, i: usize, j: usize) -> f32;

    /// Extra cost for extending a deletion from row `i - 1` into row `i`.
    fn database_crossing(&self, i: usize) -> f32;

    /// Extra cost for extending an insertion from column `j - 1` into column `j`.
    fn query_crossing(&self, j: usize) -> f32;

    /// False when the variable track would always equal the uniform one.
    fn is_position_dependent(&self) -> bool;
}

/// Classic affine gaps: the same open and extension cost everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformGaps {
    open: f32,
    extend: f32,
}

impl UniformGaps {
    pub fn new(open: f32, extend: f32) -> Self {
        Self { open, extend }
    }

    pub fn from_scoring<M: ScoringModel + ?Sized>(scoring: &M) -> Self {
        Self::new(scoring.gap_open(), scoring.gap_extend())
    }
}

impl GapModel for UniformGaps {
    fn default_open(&self) -> f32 {
        self.open
    }

    fn extend(&self) -> f32 {
        self.extend
    }

    fn open_at(&self, _i: usize, _j: usize) -> f32 {
        self.open
    }

    fn database_crossing(&self, _i: usize) -> f32 {
        0.0
    }

    fn query_crossing(&self, _j: usize) -> f32 {
        0.0
    }

    fn is_position_dependent(&self) -> bool {
        false
    }
}

/// Homopolymer-aware gaps for one database/query pair.
#[derive(Debug, Clone)]
pub struct HomopolymerGaps {
    database: HomopolymerGapProfile,
    query: HomopolymerGapProfile,
    open: f32,
    extend: f32,
    boundary_cross_penalty: f32,
}

impl HomopolymerGaps {
    /// Derive both profiles. An unset `boundary_cross_penalty` defaults to
    /// twice the gap-extension penalty.
    pub fn derive<D, Q, M>(
        database: &D,
        query: &Q,
        scoring: &M,
        boundary_cross_penalty: Option<f32>,
    ) -> Self
    where
        D: SequenceView + ?Sized,
        Q: SequenceView + ?Sized,
        M: ScoringModel + ?Sized,
    {
        Self {
            database: HomopolymerGapProfile::derive(database, scoring),
            query: HomopolymerGapProfile::derive(query, scoring),
            open: scoring.gap_open(),
            extend: scoring.gap_extend(),
            boundary_cross_penalty: boundary_cross_penalty
                .unwrap_or(2.0 * scoring.gap_extend()),
        }
    }

    pub fn database_profile(&self) -> &HomopolymerGapProfile {
        &self.database
    }

    pub fn query_profile(&self) -> &HomopolymerGapProfile {
        &self.query
    }

    pub fn boundary_cross_penalty(&self) -> f32 {
        self.boundary_cross_penalty
    }
}

impl GapModel for HomopolymerGaps {
    fn default_open(&self) -> f32 {
        self.open
    }

    fn extend(&self) -> f32 {
        self.extend
    }

    fn open_at(&self, i: usize, j: usize) -> f32 {
        self.database.gap_open_at(i).min(self.query.gap_open_at(j))
    }

    fn database_crossing(&self, i: usize) -> f32 {
        if i > 0 && self.database.is_run_boundary(i - 1) {
            self.boundary_cross_penalty
        } else {
            0.0
        }
    }

    fn query_crossing(&self, j: usize) -> f32 {
        if j > 0 && self.query.is_run_boundary(j - 1) {
            self.boundary_cross_penalty
        } else {
            0.0
        }
    }

    fn is_position_dependent(&self) -> bool {
        true
    }
}
