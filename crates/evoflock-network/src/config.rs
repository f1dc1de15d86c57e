use evoflock_evolution::{DEFAULT_MUTATION_SEQUENCE, GenomeRanges};

/// Static parameters of one training run.
///
/// The topology is immutable for the lifetime of a run and also keys the
/// shared snapshot file, so two runs with identical layers cooperate on the
/// same persisted population.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Layer sizes, input layer first. The output layer carries the two
    /// decision neurons.
    pub layers: Vec<usize>,
    /// Fixed population capacity (one slot per lineage).
    pub species_max: usize,
    /// Random lifeforms evaluated before tournament mode begins when no
    /// snapshot could be loaded.
    pub warm_up_lifeforms: u32,
    /// Ascending mutation strengths walked per slot.
    pub mutation_sequence: Vec<f32>,
    /// Legal value ranges for weights and biases.
    pub ranges: GenomeRanges,
}

impl NetworkConfig {
    #[must_use]
    pub fn new(layers: Vec<usize>) -> Self {
        Self {
            layers,
            species_max: 8,
            warm_up_lifeforms: 2000,
            mutation_sequence: DEFAULT_MUTATION_SEQUENCE.to_vec(),
            ranges: GenomeRanges::default(),
        }
    }
}
