use std::iter;

use rand::Rng;
use tracing::info;

use evoflock_tensor::Tensor;

use crate::{
    population::Population,
    specimen::{GenomeRanges, Specimen, ValueRange, random_genome},
};

/// Default ascending mutation-strength sequence.
///
/// The leading 0 produces an exact clone of the slot occupant, which lets the
/// tournament re-measure a slot's fitness against pure episode noise.
pub const DEFAULT_MUTATION_SEQUENCE: [f32; 8] = [0.0, 0.000_3, 0.001, 0.003, 0.01, 0.03, 0.1, 0.3];

/// The two mutation operators the breeder alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreedingPhase {
    /// Blend the genome toward a fresh random genome, proportional to the
    /// mutation strength.
    AverageSum,
    /// Resample individual elements with probability equal to the mutation
    /// strength.
    NeuronReplacement,
}

impl BreedingPhase {
    #[must_use]
    fn flipped(self) -> Self {
        match self {
            Self::AverageSum => Self::NeuronReplacement,
            Self::NeuronReplacement => Self::AverageSum,
        }
    }
}

/// Schedules which population slot is challenged next, at what mutation
/// strength, and with which operator.
///
/// For each slot in turn the breeder walks the whole mutation sequence, then
/// moves to the next slot; once every slot has been swept it flips the
/// breeding phase and starts over.
#[derive(Debug, Clone)]
pub struct Breeder {
    sequence: Vec<f32>,
    mutation_index: usize,
    species_index: usize,
    phase: BreedingPhase,
    ranges: GenomeRanges,
}

impl Breeder {
    #[must_use]
    pub fn new(sequence: Vec<f32>, ranges: GenomeRanges) -> Self {
        assert!(!sequence.is_empty(), "mutation sequence must not be empty");
        Self {
            sequence,
            mutation_index: 0,
            species_index: 0,
            phase: BreedingPhase::AverageSum,
            ranges,
        }
    }

    /// The population slot the current candidate was bred from.
    #[must_use]
    pub fn species_index(&self) -> usize {
        self.species_index
    }

    #[must_use]
    pub fn phase(&self) -> BreedingPhase {
        self.phase
    }

    /// Mutation strength applied to the most recently bred candidate.
    #[must_use]
    pub fn variance(&self) -> f32 {
        self.sequence[self.mutation_index]
    }

    /// Rolls the schedule one step: next strength, then next slot, then the
    /// phase flip once all slots are swept.
    pub fn advance(&mut self, capacity: usize) {
        assert!(capacity >= 1, "population capacity must be at least 1");
        self.mutation_index += 1;
        if self.mutation_index < self.sequence.len() {
            return;
        }
        self.mutation_index = 0;
        self.species_index += 1;
        if self.species_index < capacity {
            return;
        }
        self.species_index = 0;
        self.phase = self.phase.flipped();
        info!(phase = ?self.phase, "breeding phase changed");
    }

    /// Advances the schedule and breeds the next evaluation candidate from
    /// the newly assigned slot.
    pub fn next_candidate<R>(
        &mut self,
        population: &Population,
        layers: &[usize],
        rng: &mut R,
    ) -> Specimen
    where
        R: Rng + ?Sized,
    {
        self.advance(population.capacity());
        let parent = population.slot(self.species_index);
        if self.mutation_index == 0 {
            info!(
                slot = self.species_index,
                family_factor = parent.family_factor,
                fitness = parent.fitness,
                "starting slot sweep"
            );
        }
        let variance = self.variance();
        let mut candidate = parent.clone();
        match self.phase {
            BreedingPhase::AverageSum => {
                let (fresh_weights, fresh_biases) = random_genome(layers, self.ranges, rng);
                for (old, fresh) in iter::zip(&mut candidate.weights, &fresh_weights) {
                    *old = blend(old, fresh, variance);
                }
                for (old, fresh) in iter::zip(&mut candidate.biases, &fresh_biases) {
                    *old = blend(old, fresh, variance);
                }
            }
            BreedingPhase::NeuronReplacement => {
                for weights in &mut candidate.weights {
                    resample_elements(weights, variance, self.ranges.weight, rng);
                }
                for biases in &mut candidate.biases {
                    resample_elements(biases, variance, self.ranges.bias, rng);
                }
            }
        }
        candidate
    }
}

/// Interpolates the genome toward random noise: `old * (1 - v) + fresh * v`.
fn blend(old: &Tensor, fresh: &Tensor, variance: f32) -> Tensor {
    &(old * (1.0 - variance)) + &(fresh * variance)
}

fn resample_elements<R>(tensor: &mut Tensor, probability: f32, range: ValueRange, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for x in 0..tensor.shape_x() {
        for y in 0..tensor.shape_y() {
            if rng.random_bool(f64::from(probability)) {
                tensor.set(x, y, range.sample(rng));
            }
        }
    }
}
