use std::iter;

use rand::Rng;
use tracing::{debug, info, warn};

use evoflock_evolution::{Breeder, Population, PopulationRecord, Specimen};
use evoflock_store::PopulationStore;
use evoflock_tensor::Tensor;

use crate::config::NetworkConfig;

/// Logistic activation applied at every layer transition.
#[must_use]
pub fn sigmoid(n: f32) -> f32 {
    1.0 / (1.0 + (-n).exp())
}

/// One process's view of the cooperative evolutionary search.
///
/// The facade cycles through episodes: [`EvoNet::predict`] runs the forward
/// pass for the candidate under evaluation, and [`EvoNet::finish_life`]
/// folds the episode's fitness into the population, persists improvements,
/// and breeds the next candidate.
#[derive(Debug)]
pub struct EvoNet {
    config: NetworkConfig,
    population: Population,
    breeder: Breeder,
    current: Specimen,
    activations: Vec<Tensor>,
    input: Tensor,
    store: PopulationStore,
    lifeforms_created: i32,
    warm_up_remaining: u32,
    ready: bool,
}

impl EvoNet {
    /// Builds a network around an existing set of specimens.
    ///
    /// # Panics
    ///
    /// Panics if the topology has fewer than two layers or `specimens` is
    /// empty.
    #[must_use]
    pub fn new(
        config: NetworkConfig,
        specimens: Vec<Specimen>,
        warm_up_lifeforms: u32,
        store: PopulationStore,
    ) -> Self {
        assert!(
            config.layers.len() >= 2,
            "topology needs at least two layers"
        );
        let capacity = config.species_max.max(specimens.len());
        let population = Population::new(specimens, capacity, config.ranges);
        let breeder = Breeder::new(config.mutation_sequence.clone(), config.ranges);
        let current = population.slot(breeder.species_index()).clone();
        let input = Tensor::zeros(config.layers[0], 1);
        info!(
            layers = ?config.layers,
            species = population.len(),
            max_fitness = population.max_fitness(),
            warm_up = warm_up_lifeforms,
            "network ready"
        );
        Self {
            config,
            population,
            breeder,
            current,
            activations: Vec::new(),
            input,
            store,
            lifeforms_created: 0,
            warm_up_remaining: warm_up_lifeforms,
            ready: true,
        }
    }

    /// Loads the shared population for the configured topology, falling back
    /// to a single random specimen plus the configured warm-up when no
    /// usable snapshot exists.
    pub fn from_store_or_scratch<R>(
        config: NetworkConfig,
        mut store: PopulationStore,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        if let Some(record) = store.load() {
            if record.layers == config.layers && !record.species.is_empty() {
                let specimens: Vec<Specimen> =
                    record.species.into_iter().map(Specimen::from_record).collect();
                // a snapshot smaller than the configured capacity re-enters
                // warm-up until the remaining slots are filled
                let missing =
                    u32::try_from(config.species_max.saturating_sub(specimens.len()))
                        .unwrap_or(u32::MAX);
                return Self::new(config, specimens, missing, store);
            }
            warn!(
                snapshot_layers = ?record.layers,
                configured_layers = ?config.layers,
                "ignoring unusable population snapshot, starting from scratch"
            );
        }
        let specimen = Specimen::random(&config.layers, config.ranges, rng);
        let warm_up = config.warm_up_lifeforms;
        Self::new(config, vec![specimen], warm_up, store)
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Intermediate activations recorded by the last [`EvoNet::predict`]
    /// call, input layer first.
    #[must_use]
    pub fn activations(&self) -> &[Tensor] {
        &self.activations
    }

    #[must_use]
    pub fn lifeforms_created(&self) -> i32 {
        self.lifeforms_created
    }

    #[must_use]
    pub fn warm_up_remaining(&self) -> u32 {
        self.warm_up_remaining
    }

    /// Runs the forward pass for the current candidate and returns the two
    /// threshold decisions.
    ///
    /// # Panics
    ///
    /// Panics if `input` length differs from the input layer, if the
    /// lifecycle has not been (re-)armed, or if the output layer does not
    /// hold exactly two neurons.
    pub fn predict(&mut self, input: &[f32]) -> (bool, bool) {
        assert_eq!(
            input.len(),
            self.config.layers[0],
            "input length must match the input layer"
        );
        assert!(
            self.ready,
            "finish_life or next_life must arm the network before predict"
        );
        self.input.copy_from(input);

        let mut activations = Vec::with_capacity(self.config.layers.len());
        let mut activation = self.input.clone();
        activations.push(activation.clone());
        for (weights, biases) in iter::zip(&self.current.weights, &self.current.biases) {
            let z = &weights.dot(&activation) + biases;
            activation = z.apply(sigmoid);
            activations.push(activation.clone());
        }
        self.activations = activations;

        assert_eq!(
            activation.shape(),
            (2, 1),
            "output layer must hold exactly two decision neurons"
        );
        (activation.get(0, 0) > 0.5, activation.get(1, 0) > 0.5)
    }

    /// Completes one lifeform: synchronizes with sibling processes, folds
    /// the episode's fitness into the population, and breeds the next
    /// evaluation candidate. Negative fitness is clamped to 0.
    pub fn finish_life<R>(&mut self, fitness: i32, stage: i32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let fitness = fitness.max(0);
        self.lifeforms_created += 1;
        if self.lifeforms_created % 50 == 1 {
            info!(
                lifeform = self.lifeforms_created,
                "population state:\n{}",
                self.population.report()
            );
        }
        self.refresh_from_store();
        if self.warm_up_remaining > 0 {
            self.finish_warmup_life(fitness, stage, rng);
        } else {
            self.finish_tournament_life(fitness, stage, rng);
        }
        self.ready = true;
    }

    /// Re-arms evaluation without reporting a fitness.
    pub fn next_life(&mut self) {
        self.ready = true;
    }

    fn finish_warmup_life<R>(&mut self, fitness: i32, stage: i32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.warm_up_remaining -= 1;
        info!(
            lifeform = self.lifeforms_created,
            remaining = self.warm_up_remaining,
            fitness,
            "warm-up lifeform finished"
        );
        let next = Specimen::random(&self.config.layers, self.config.ranges, rng);
        let mut specimen = std::mem::replace(&mut self.current, next);
        specimen.fitness = fitness;
        specimen.historic_max_fitness = fitness;
        specimen.best_stage = stage;
        specimen.historic_stage = stage;
        specimen.first_parent = self.lifeforms_created;
        self.population.warmup_insert(specimen);
    }

    fn finish_tournament_life<R>(&mut self, fitness: i32, stage: i32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let zero_variance = self.breeder.variance() == 0.0;
        let slot = self.breeder.species_index();
        let outcome =
            self.population
                .tournament(slot, &self.current, fitness, stage, zero_variance);
        if outcome.should_persist() {
            let record = PopulationRecord::from_population(&self.config.layers, &self.population);
            // a failed write was already logged by the store; training
            // continues with the in-memory population
            let _ = self.store.write(&record);
        }
        self.current = self
            .breeder
            .next_candidate(&self.population, &self.config.layers, rng);
    }

    /// Adopts a newer snapshot written by a sibling process, wholesale, and
    /// re-derives the in-flight candidate from its refreshed slot.
    fn refresh_from_store(&mut self) {
        let Some(record) = self.store.read_if_newer() else {
            return;
        };
        if record.layers != self.config.layers || record.species.is_empty() {
            warn!(
                snapshot_layers = ?record.layers,
                "skipping unusable population snapshot"
            );
            return;
        }
        let specimens: Vec<Specimen> =
            record.species.into_iter().map(Specimen::from_record).collect();
        let capacity = self.population.capacity().max(specimens.len());
        let missing = u32::try_from(capacity - specimens.len()).unwrap_or(u32::MAX);
        self.population = Population::new(specimens, capacity, self.config.ranges);
        if missing > 0 && self.warm_up_remaining == 0 {
            self.warm_up_remaining = missing;
        }
        let slot = self.breeder.species_index().min(self.population.len() - 1);
        self.current = self.population.slot(slot).clone();
        debug!(
            species = self.population.len(),
            max_fitness = self.population.max_fitness(),
            "adopted newer shared population"
        );
    }
}
