use std::path::PathBuf;

use anyhow::Context as _;

use evoflock_evolution::{GenomeRanges, Population, Specimen};
use evoflock_store::{PopulationStore, RetryPolicy};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Topology of the persisted population to inspect
    #[arg(long, default_value = "4,16,2", value_delimiter = ',')]
    layers: Vec<usize>,
    /// Directory holding the shared population file
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let mut store = PopulationStore::new(&arg.data_dir, &arg.layers, RetryPolicy::default());
    let record = store.load().with_context(|| {
        format!(
            "no readable population snapshot at {}",
            store.path().display()
        )
    })?;
    anyhow::ensure!(
        !record.species.is_empty(),
        "snapshot at {} holds no specimens",
        store.path().display()
    );
    let specimens: Vec<Specimen> = record
        .species
        .into_iter()
        .map(Specimen::from_record)
        .collect();
    let capacity = specimens.len();
    let population = Population::new(specimens, capacity, GenomeRanges::default());

    println!("topology: {:?}", record.layers);
    println!("max fitness: {}", population.max_fitness());
    println!();
    println!("{}", population.report());
    Ok(())
}
