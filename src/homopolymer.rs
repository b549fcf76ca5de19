//! Position-specific gap-open costs for homopolymer-prone sequencing data.
//!
//! Platforms such as 454 miscount the length of runs of identical bases, so a
//! one-base slip inside a long run is far more likely than a gap elsewhere.
//! The profile lowers the gap-open cost linearly along each run and records
//! where runs end so that gaps leaving a run can be penalized.

use crate::scoring::ScoringModel;
use crate::SequenceView;

/// Margin kept between the interior gap-open floor and the bounds it is
/// derived from.
pub const FLOOR_MARGIN: f32 = 0.1;

/// Gap-open costs and run-boundary flags for one sequence.
///
/// Both vectors are indexed by DP position `p` in `0..=len`, where `p` means
/// "after the first `p` characters". The character at 0-based index `p - 1`
/// owns position `p`.
#[derive(Debug, Clone, PartialEq)]
pub struct HomopolymerGapProfile {
    gap_open: Vec<f32>,
    run_boundary: Vec<bool>,
}

impl HomopolymerGapProfile {
    /// Scan `sequence` once and derive its profile.
    ///
    /// Within a run of length `L`, the character at offset `t` gets
    /// `gap_open - drop * t / (L - 1)` where `drop = gap_open - floor`, so the
    /// first character of every run keeps the default and the last one sits
    /// on the floor. Runs compare characters case-insensitively.
    pub fn derive<S, M>(sequence: &S, scoring: &M) -> Self
    where
        S: SequenceView + ?Sized,
        M: ScoringModel + ?Sized,
    {
        let len = sequence.len();
        let default = scoring.gap_open();
        let drop = (default - Self::interior_floor(scoring)).max(0.0);

        let mut gap_open = vec![default; len + 1];
        let mut run_boundary = vec![false; len + 1];

        let mut start = 0;
        while start < len {
            let base = sequence.char_at(start);
            let mut end = start + 1;
            while end < len && sequence.char_at(end).eq_ignore_ascii_case(&base) {
                end += 1;
            }

            let run_len = end - start;
            if run_len > 1 {
                let span = (run_len - 1) as f32;
                for offset in 1..run_len {
                    gap_open[start + offset + 1] = default - drop * offset as f32 / span;
                }
            }
            // Position `end` holds the run's last character; a different one follows.
            if end < len {
                run_boundary[end] = true;
            }
            start = end;
        }

        Self {
            gap_open,
            run_boundary,
        }
    }

    /// Lowest gap-open cost any run interior can reach:
    /// `max(gap_extend + 0.1, gap_open - (highest + |lowest| - 0.1))`.
    pub fn interior_floor<M: ScoringModel + ?Sized>(scoring: &M) -> f32 {
        let span = scoring.highest_score() + scoring.lowest_score().abs() - FLOOR_MARGIN;
        (scoring.gap_extend() + FLOOR_MARGIN).max(scoring.gap_open() - span)
    }

    /// Number of characters the profile was derived from.
    pub fn len(&self) -> usize {
        self.gap_open.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn gap_open_at(&self, position: usize) -> f32 {
        self.gap_open[position]
    }

    /// True when the character owning `position` is followed by a different one.
    pub fn is_run_boundary(&self, position: usize) -> bool {
        self.run_boundary[position]
    }

    pub fn gap_open(&self) -> &[f32] {
        &self.gap_open
    }

    pub fn run_boundaries(&self) -> &[bool] {
        &self.run_boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScoreParams;

    fn scoring() -> ScoreParams {
        ScoreParams::new(2.0, -1.0, 5.0, 1.0).unwrap()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn floor_uses_substitution_bounds() {
        // 5 - (2 + 1 - 0.1) = 2.1, above 1 + 0.1
        assert!(close(HomopolymerGapProfile::interior_floor(&scoring()), 2.1));
        // Wide substitution range pushes the floor down to gap_extend + 0.1.
        let wide = ScoreParams::new(5.0, -4.0, 5.0, 1.0).unwrap();
        assert!(close(HomopolymerGapProfile::interior_floor(&wide), 1.1));
    }

    #[test]
    fn run_decays_to_floor() {
        let profile = HomopolymerGapProfile::derive(b"AAAAATTT", &scoring());
        assert_eq!(profile.len(), 8);
        let expected = [5.0, 5.0, 4.275, 3.55, 2.825, 2.1, 5.0, 3.55, 2.1];
        for (p, want) in expected.iter().enumerate() {
            assert!(
                close(profile.gap_open_at(p), *want),
                "position {}: {} != {}",
                p,
                profile.gap_open_at(p),
                want
            );
        }
    }

    #[test]
    fn boundary_flags_precede_changes() {
        let profile = HomopolymerGapProfile::derive(b"AAAAATTT", &scoring());
        let flagged: Vec<usize> = (0..=8).filter(|&p| profile.is_run_boundary(p)).collect();
        assert_eq!(flagged, vec![5]);

        let profile = HomopolymerGapProfile::derive(b"ACGT", &scoring());
        let flagged: Vec<usize> = (0..=4).filter(|&p| profile.is_run_boundary(p)).collect();
        assert_eq!(flagged, vec![1, 2, 3]);
    }

    #[test]
    fn single_characters_keep_default() {
        let profile = HomopolymerGapProfile::derive(b"ACGTACGT", &scoring());
        assert!(profile.gap_open().iter().all(|&g| g == 5.0));
    }

    #[test]
    fn runs_are_case_insensitive() {
        let upper = HomopolymerGapProfile::derive(b"GGGG", &scoring());
        let mixed = HomopolymerGapProfile::derive(b"GgGg", &scoring());
        assert_eq!(upper, mixed);
    }

    #[test]
    fn floor_above_default_keeps_default() {
        // gap_extend + 0.1 exceeds gap_open, so nothing may decay.
        let flat = ScoreParams::new(1.0, -1.0, 1.0, 1.0).unwrap();
        let profile = HomopolymerGapProfile::derive(b"AAAA", &flat);
        assert!(profile.gap_open().iter().all(|&g| g == 1.0));
    }
}
