use gotoh_aligner::{AlignerConfig, Seed, Sequence};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AlignerConfig::from_options([
        ("match", "2"),
        ("mismatch", "-1"),
        ("gap-model", "homopolymer"),
        ("workers", "4"),
        ("chunk-size", "32"),
        ("overlap", "4"),
    ])?;

    let pairs = vec![
        (Sequence::from("ACGTACGTTTTGCA"), Sequence::from("ACGTACGTTTGCA")),
        (Sequence::from("GGTTAACCAAAT"), Sequence::from("GGTTAACTAAAT")),
        (Sequence::from("AAAAAAAA"), Sequence::from("CCCCCCCC")),
    ];

    let mut batch = config.build_batch()?;
    let results = batch.align_all(pairs)?;
    for (i, result) in results.iter().enumerate() {
        match result {
            Some(alignment) => println!("Pair {}\n{}\n", i, alignment),
            None => println!("Pair {}: no alignment\n", i),
        }
    }

    // Extend a seed through a long read in bounded chunks.
    let database = Sequence::from("TTGACCATGGCAAAAAGTCCATGACCTTAGGCATTTTGACGTACCAGT".repeat(4).as_str());
    let query = Sequence::from("TTGACCATGGCAAAAGTCCATGACCTTAGGCATTTTTGACGTACCAGT".repeat(4).as_str());
    let extender = config.build_extender()?;
    let alignment = extender.extend(&database, &query, Seed::new(96, 96, 8))?;
    println!("Seed extension\n{}", alignment);

    Ok(())
}
