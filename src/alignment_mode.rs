use crate::AlignerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    Local,        // Smith-Waterman, free start and end
    Extend3Prime, // anchored at (0, 0), free growing end
    Extend5Prime, // anchored at (|database|, |query|), free start
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapModelKind {
    Uniform,     // default gap-open everywhere
    Homopolymer, // reduced gap-open inside runs of identical bases
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentParams {
    pub mode: BoundaryMode,
    pub gap_model: GapModelKind,
    /// Characters at a chunk's free edge that anchored modes never emit.
    pub overlap: usize,
    /// Extra cost for a homopolymer gap crossing a run boundary.
    /// Unset means twice the gap-extension penalty.
    pub boundary_cross_penalty: Option<f32>,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            mode: BoundaryMode::Local,
            gap_model: GapModelKind::Uniform,
            overlap: 0,
            boundary_cross_penalty: None,
        }
    }
}

impl AlignmentParams {
    pub fn validate(&self) -> Result<(), AlignerError> {
        if let Some(penalty) = self.boundary_cross_penalty {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err(AlignerError::InvalidParameter(format!(
                    "Boundary cross penalty must be a non-negative number, got {}",
                    penalty
                )));
            }
        }
        if self.mode == BoundaryMode::Local && self.overlap > 0 {
            log::warn!("Overlap {} is ignored in local mode", self.overlap);
        }
        Ok(())
    }

    /// Resolve the boundary cross penalty against a gap-extension penalty.
    pub fn boundary_cross_penalty_or_default(&self, gap_extend: f32) -> f32 {
        self.boundary_cross_penalty.unwrap_or(2.0 * gap_extend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_local_uniform() {
        let params = AlignmentParams::default();
        assert_eq!(params.mode, BoundaryMode::Local);
        assert_eq!(params.gap_model, GapModelKind::Uniform);
        assert_eq!(params.overlap, 0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn unset_penalty_defaults_to_twice_extension() {
        let params = AlignmentParams::default();
        assert_eq!(params.boundary_cross_penalty_or_default(1.5), 3.0);
        let params = AlignmentParams {
            boundary_cross_penalty: Some(0.5),
            ..AlignmentParams::default()
        };
        assert_eq!(params.boundary_cross_penalty_or_default(1.5), 0.5);
    }

    #[test]
    fn negative_penalty_is_rejected() {
        let params = AlignmentParams {
            boundary_cross_penalty: Some(-1.0),
            ..AlignmentParams::default()
        };
        assert!(params.validate().is_err());
    }
}
