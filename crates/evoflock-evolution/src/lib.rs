//! Evolutionary engine: species population, slot tournaments, and the
//! breeding schedule.
//!
//! The engine trains genomes without gradients. A fixed-capacity population
//! of [`Specimen`]s accumulates one lineage per slot; each finished episode
//! ("lifeform") either seeds the population during warm-up or challenges the
//! slot it was bred from. The [`Breeder`] walks an ascending sequence of
//! mutation strengths per slot and alternates between two mutation operators
//! once a full sweep of all slots completes, balancing exploitation against
//! exploration.
//!
//! # How a lifeform flows through the engine
//!
//! 1. The breeder clones a slot occupant and mutates it.
//! 2. An external environment evaluates the clone and reports an integer
//!    fitness.
//! 3. [`Population::tournament`] compares the clone against its parent slot;
//!    the winner occupies the slot.
//! 4. The breeder advances its schedule and produces the next candidate.
//!
//! Randomness is always injected through a caller-supplied [`rand::Rng`], so
//! runs are reproducible with a seeded generator.

pub use self::{
    breeder::{Breeder, BreedingPhase, DEFAULT_MUTATION_SEQUENCE},
    population::{Population, TournamentOutcome, WarmupOutcome},
    record::{PopulationRecord, SpecimenRecord},
    specimen::{GenomeRanges, Specimen, ValueRange, genetic_distance, random_genome},
};

mod breeder;
mod population;
mod record;
mod specimen;
