use std::path::PathBuf;

use chrono::Utc;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use evoflock_evolution::Specimen;
use evoflock_network::{EvoNet, NetworkConfig};
use evoflock_store::{PopulationStore, RetryPolicy};

use crate::{cart, schema::TrainedModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Network topology as comma-separated layer sizes
    #[arg(long, default_value = "4,16,2", value_delimiter = ',')]
    layers: Vec<usize>,
    /// Population slots
    #[arg(long, default_value_t = 8)]
    species_max: usize,
    /// Random lifeforms before tournament mode begins
    #[arg(long, default_value_t = 200)]
    warm_up: u32,
    /// Lifeforms to evaluate in this process
    #[arg(long, default_value_t = 2000)]
    lifeforms: u32,
    /// Directory holding the shared population file
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    /// Seed for a reproducible single-process run
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the exported model (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    anyhow::ensure!(
        arg.layers.first() == Some(&cart::INPUTS),
        "the cart task feeds {} inputs; the first layer must match",
        cart::INPUTS
    );
    anyhow::ensure!(
        arg.layers.last() == Some(&2),
        "the output layer must hold the two decision neurons"
    );
    match arg.seed {
        Some(seed) => run_with_rng(arg, &mut Pcg32::seed_from_u64(seed)),
        None => run_with_rng(arg, &mut rand::rng()),
    }
}

fn run_with_rng<R>(arg: &TrainArg, rng: &mut R) -> anyhow::Result<()>
where
    R: Rng,
{
    let mut config = NetworkConfig::new(arg.layers.clone());
    config.species_max = arg.species_max;
    config.warm_up_lifeforms = arg.warm_up;
    let store = PopulationStore::new(&arg.data_dir, &config.layers, RetryPolicy::default());
    let mut net = EvoNet::from_store_or_scratch(config, store, rng);

    for _ in 0..arg.lifeforms {
        let episode = cart::run_episode(&mut net, rng);
        net.finish_life(episode.score, episode.stage, rng);
    }

    eprintln!("Training finished.");
    eprintln!("  Lifeforms: {}", net.lifeforms_created());
    eprintln!("  Max fitness: {}", net.population().max_fitness());
    eprintln!();
    eprintln!("{}", net.population().report());

    let best = best_specimen(&net);
    let model = TrainedModel {
        name: "cart-centering".to_owned(),
        trained_at: Utc::now(),
        layers: arg.layers.clone(),
        fitness: best.fitness,
        specimen: best.to_record(),
    };
    Output::save_json(&model, arg.output.clone())?;
    if let Some(path) = &arg.output {
        eprintln!("Model saved to {}", path.display());
    }

    Ok(())
}

fn best_specimen(net: &EvoNet) -> &Specimen {
    net.population().slot(net.population().max_slot())
}
