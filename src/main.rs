use clap::{Parser, ValueEnum};
use gotoh_aligner::{
    AlignerConfig, AlignerError, BoundaryMode, GapModelKind, PairwiseAlignment, Seed, Sequence,
};

#[derive(Parser, Debug)]
#[command(name = "gotoh_aligner")]
#[command(about = "Pairwise nucleotide alignment with affine and homopolymer-aware gaps")]
#[command(version, allow_negative_numbers = true)]
struct Cli {
    /// Database (reference) sequence
    database: String,

    /// Query sequences; several are aligned on a worker pool
    #[arg(required = true)]
    queries: Vec<String>,

    /// Match score
    #[arg(long = "match")]
    match_score: Option<f32>,

    /// Mismatch score (usually negative)
    #[arg(long)]
    mismatch: Option<f32>,

    /// Gap-open penalty, subtracted once per gap
    #[arg(long)]
    gap_open: Option<f32>,

    /// Gap-extension penalty, subtracted per further gap column
    #[arg(long)]
    gap_extend: Option<f32>,

    /// Boundary mode
    #[arg(long, value_enum, default_value = "local")]
    mode: ModeArg,

    /// Gap model
    #[arg(long, value_enum, default_value = "uniform")]
    gap_model: GapModelArg,

    /// Characters at the free edge never emitted by anchored modes
    #[arg(long)]
    overlap: Option<usize>,

    /// Extra cost for a homopolymer gap leaving its run
    #[arg(long)]
    boundary_cross_penalty: Option<f32>,

    /// Worker threads used when there are several queries
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Window size for seed extension
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Extend this 0-based seed match in chunks instead of a single alignment
    #[arg(long, num_args = 3, value_names = ["DB_POS", "QUERY_POS", "LENGTH"])]
    seed: Option<Vec<usize>>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    Local,
    #[value(name = "3p")]
    ThreePrime,
    #[value(name = "5p")]
    FivePrime,
}

impl From<ModeArg> for BoundaryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Local => BoundaryMode::Local,
            ModeArg::ThreePrime => BoundaryMode::Extend3Prime,
            ModeArg::FivePrime => BoundaryMode::Extend5Prime,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum GapModelArg {
    Uniform,
    Homopolymer,
}

impl From<GapModelArg> for GapModelKind {
    fn from(gap_model: GapModelArg) -> Self {
        match gap_model {
            GapModelArg::Uniform => GapModelKind::Uniform,
            GapModelArg::Homopolymer => GapModelKind::Homopolymer,
        }
    }
}

impl Cli {
    fn config(&self) -> Result<AlignerConfig, AlignerError> {
        let mut config = AlignerConfig::default();
        if let Some(score) = self.match_score {
            config.scoring.match_score = score;
        }
        if let Some(score) = self.mismatch {
            config.scoring.mismatch = score;
        }
        if let Some(penalty) = self.gap_open {
            config.scoring.gap_open = penalty;
        }
        if let Some(penalty) = self.gap_extend {
            config.scoring.gap_ext = penalty;
        }
        config.params.mode = self.mode.into();
        config.params.gap_model = self.gap_model.into();
        if let Some(overlap) = self.overlap {
            config.params.overlap = overlap;
        }
        if self.boundary_cross_penalty.is_some() {
            config.params.boundary_cross_penalty = self.boundary_cross_penalty;
        }
        config.workers = self.workers;
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        config.validate()?;
        Ok(config)
    }

    fn seed(&self) -> Option<Seed> {
        match self.seed.as_deref() {
            Some(&[database_pos, query_pos, length]) => {
                Some(Seed::new(database_pos, query_pos, length))
            }
            _ => None,
        }
    }
}

fn report(alignment: Option<PairwiseAlignment>) {
    match alignment {
        Some(alignment) => println!("{}", alignment),
        None => println!("No alignment found"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.config()?;
    let database = Sequence::from(cli.database.as_str());
    let queries: Vec<Sequence> = cli.queries.iter().map(|q| Sequence::from(q.as_str())).collect();

    if let Some(seed) = cli.seed() {
        let extender = config.build_extender()?;
        for query in &queries {
            report(Some(extender.extend(&database, query, seed)?));
        }
        return Ok(());
    }

    if let [query] = queries.as_slice() {
        let aligner = config.build_aligner()?;
        let alignment = if config.params.mode == BoundaryMode::Local {
            aligner.align(&database, query)?
        } else {
            let result = aligner.extend(&database, query)?;
            println!("End of extension: {}", result.end_of_extension);
            result.alignment
        };
        report(alignment);
        return Ok(());
    }

    let mut batch = config.build_batch()?;
    let pairs = queries
        .into_iter()
        .map(|query| (database.clone(), query))
        .collect();
    for (index, alignment) in batch.align_all(pairs)?.into_iter().enumerate() {
        println!("Query {}:", index + 1);
        report(alignment);
    }

    Ok(())
}
