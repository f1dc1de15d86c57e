use serde::{Deserialize, Serialize};

use evoflock_tensor::{Tensor, TensorDto};

use crate::{population::Population, specimen::Specimen};

/// Persisted schema of one genome.
///
/// Equality is derived and exact; two records are the same only if every
/// float matches bit-for-bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecimenRecord {
    pub fitness: i32,
    pub historic_max_fitness: i32,
    pub historic_stage: i32,
    pub best_stage: i32,
    pub family_factor: i32,
    pub first_parent: i32,
    pub weights: Vec<TensorDto>,
    pub biases: Vec<TensorDto>,
}

/// Whole-population snapshot shared between cooperating processes.
///
/// The topology rides along so a reader can validate a snapshot against its
/// own configuration before adopting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub layers: Vec<usize>,
    pub species: Vec<SpecimenRecord>,
}

impl Specimen {
    #[must_use]
    pub fn to_record(&self) -> SpecimenRecord {
        SpecimenRecord {
            fitness: self.fitness,
            historic_max_fitness: self.historic_max_fitness,
            historic_stage: self.historic_stage,
            best_stage: self.best_stage,
            family_factor: self.family_factor,
            first_parent: self.first_parent,
            weights: self.weights.iter().map(Tensor::to_dto).collect(),
            biases: self.biases.iter().map(Tensor::to_dto).collect(),
        }
    }

    #[must_use]
    pub fn from_record(record: SpecimenRecord) -> Self {
        Self {
            fitness: record.fitness,
            historic_max_fitness: record.historic_max_fitness,
            historic_stage: record.historic_stage,
            best_stage: record.best_stage,
            family_factor: record.family_factor,
            first_parent: record.first_parent,
            weights: record.weights.into_iter().map(Tensor::from_dto).collect(),
            biases: record.biases.into_iter().map(Tensor::from_dto).collect(),
        }
    }
}

impl PopulationRecord {
    #[must_use]
    pub fn from_population(layers: &[usize], population: &Population) -> Self {
        Self {
            layers: layers.to_vec(),
            species: population
                .specimens()
                .iter()
                .map(Specimen::to_record)
                .collect(),
        }
    }
}
