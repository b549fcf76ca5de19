use gotoh_aligner::{Aligner, BoundaryMode, GapModelKind, ReferenceAligner, ScoreParams, Sequence};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let scoring = ScoreParams::new(2.0, -1.0, 5.0, 1.0)?;
    let database = Sequence::new(b"CGAAAAATTTGCA");
    let query = Sequence::new(b"CGAAAATTTGCA");

    let reference = ReferenceAligner::new(scoring).align(&database, &query)?;
    println!(
        "Reference score: {:?}",
        reference.as_ref().map(|alignment| alignment.score)
    );

    for gap_model in [GapModelKind::Uniform, GapModelKind::Homopolymer] {
        let aligner = Aligner::new(scoring).with_gap_model(gap_model);
        match aligner.align(&database, &query)? {
            Some(alignment) => println!("Local, {:?} gaps\n{}\n", gap_model, alignment),
            None => println!("Local, {:?} gaps: no alignment\n", gap_model),
        }
    }

    for mode in [BoundaryMode::Extend3Prime, BoundaryMode::Extend5Prime] {
        let result = Aligner::new(scoring)
            .with_alignment_mode(mode)
            .with_overlap(2)
            .extend(&database, &query)?;
        println!("{:?}, end of extension: {}", mode, result.end_of_extension);
        if let Some(alignment) = result.alignment {
            println!("{}\n", alignment);
        }
    }

    Ok(())
}
