use std::str::FromStr;

use crate::alignment_mode::{AlignmentParams, BoundaryMode, GapModelKind};
use crate::batch::BatchAligner;
use crate::extension::{SeedExtender, DEFAULT_CHUNK_SIZE};
use crate::{Aligner, AlignerError, ScoreParams};

/// Everything needed to build an aligner, an extender or a batch pool.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignerConfig {
    pub scoring: ScoreParams,
    pub params: AlignmentParams,
    pub workers: usize,
    pub chunk_size: usize,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            scoring: ScoreParams::default(),
            params: AlignmentParams::default(),
            workers: 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl AlignerConfig {
    /// Apply `key=value` style options on top of the defaults.
    ///
    /// Recognized keys: `match`, `mismatch`, `gap-open`, `gap-extend`, `mode`
    /// (`local`, `3p`, `5p`), `gap-model` (`uniform`, `homopolymer`),
    /// `overlap`, `boundary-cross-penalty`, `workers`, `chunk-size`.
    pub fn from_options<I, K, V>(options: I) -> Result<Self, AlignerError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in options {
            config.set(key.as_ref(), value.as_ref())?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), AlignerError> {
        match key {
            "match" => self.scoring.match_score = parse(key, value)?,
            "mismatch" => self.scoring.mismatch = parse(key, value)?,
            "gap-open" => self.scoring.gap_open = parse(key, value)?,
            "gap-extend" => self.scoring.gap_ext = parse(key, value)?,
            "mode" => {
                self.params.mode = match value {
                    "local" => BoundaryMode::Local,
                    "3p" => BoundaryMode::Extend3Prime,
                    "5p" => BoundaryMode::Extend5Prime,
                    _ => return Err(bad_value(key, value)),
                }
            }
            "gap-model" => {
                self.params.gap_model = match value {
                    "uniform" => GapModelKind::Uniform,
                    "homopolymer" => GapModelKind::Homopolymer,
                    _ => return Err(bad_value(key, value)),
                }
            }
            "overlap" => self.params.overlap = parse(key, value)?,
            "boundary-cross-penalty" => {
                self.params.boundary_cross_penalty = Some(parse(key, value)?)
            }
            "workers" => self.workers = parse(key, value)?,
            "chunk-size" => self.chunk_size = parse(key, value)?,
            _ => {
                return Err(AlignerError::InvalidParameter(format!(
                    "Unknown option '{}'",
                    key
                )))
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AlignerError> {
        self.scoring.validate()?;
        self.params.validate()?;
        if self.workers == 0 {
            return Err(AlignerError::InvalidParameter(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.chunk_size <= self.params.overlap {
            return Err(AlignerError::InvalidParameter(format!(
                "chunk size {} must exceed overlap {}",
                self.chunk_size, self.params.overlap
            )));
        }
        Ok(())
    }

    pub fn build_aligner(&self) -> Result<Aligner<ScoreParams>, AlignerError> {
        self.scoring.validate()?;
        Aligner::with_params(self.scoring, self.params)
    }

    /// Seed extender sharing this configuration's scoring, gap model and
    /// overlap; the boundary mode is ignored.
    pub fn build_extender(&self) -> Result<SeedExtender<ScoreParams>, AlignerError> {
        self.validate()?;
        Ok(SeedExtender::new(self.scoring)
            .with_chunk_size(self.chunk_size)
            .with_overlap(self.params.overlap)
            .with_gap_model(self.params.gap_model)
            .with_boundary_cross_penalty(self.params.boundary_cross_penalty))
    }

    pub fn build_batch(&self) -> Result<BatchAligner, AlignerError> {
        BatchAligner::new(self.build_aligner()?, self.workers)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, AlignerError> {
    value.trim().parse().map_err(|_| bad_value(key, value))
}

fn bad_value(key: &str, value: &str) -> AlignerError {
    AlignerError::InvalidParameter(format!("Invalid value '{}' for option '{}'", value, key))
}
