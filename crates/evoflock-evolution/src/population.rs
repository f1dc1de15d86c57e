use std::fmt::Write as _;

use tracing::{debug, info};

use crate::specimen::{GenomeRanges, Specimen, genetic_distance};

/// Outcome of inserting a warm-up lifeform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupOutcome {
    /// Appended to a population still below capacity.
    Added { slot: usize },
    /// Replaced the weakest occupant of a full population.
    Replaced { slot: usize, evicted_fitness: i32 },
    /// Weaker than every occupant of a full population.
    Discarded,
}

impl WarmupOutcome {
    #[must_use]
    pub fn slot(self) -> Option<usize> {
        match self {
            Self::Added { slot } | Self::Replaced { slot, .. } => Some(slot),
            Self::Discarded => None,
        }
    }
}

/// Outcome of a slot tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentOutcome {
    /// Candidate beat the slot occupant and now owns the slot. `landmark`
    /// marks an all-time record for the slot.
    Improved { landmark: bool },
    /// Candidate lost but tied the global maximum; observation only.
    MatchedGlobalMax,
    /// Candidate lost but tied its slot's fitness; observation only.
    MatchedSlotMax,
    /// An unmutated clone scored below its slot, so the slot's fitness was
    /// halved toward the candidate's to wash out lucky-outlier records.
    Damped,
    NoChange,
}

impl TournamentOutcome {
    /// Whether the population changed in a way worth persisting.
    #[must_use]
    pub fn should_persist(self) -> bool {
        matches!(self, Self::Improved { .. } | Self::Damped)
    }
}

/// Fixed-capacity ordered collection of specimens, one lineage per slot.
///
/// During warm-up the population grows by direct insertion; afterwards its
/// size is pinned at `capacity` and only slot contents change, via
/// [`Population::tournament`].
#[derive(Debug, Clone)]
pub struct Population {
    specimens: Vec<Specimen>,
    capacity: usize,
    ranges: GenomeRanges,
    max_fitness: i32,
    max_slot: usize,
}

impl Population {
    /// # Panics
    ///
    /// Panics if `specimens` is empty or exceeds `capacity`.
    #[must_use]
    pub fn new(specimens: Vec<Specimen>, capacity: usize, ranges: GenomeRanges) -> Self {
        assert!(capacity >= 1, "population capacity must be at least 1");
        assert!(
            !specimens.is_empty() && specimens.len() <= capacity,
            "population needs 1..={capacity} specimens, got {}",
            specimens.len()
        );
        let (max_slot, max_fitness) = specimens
            .iter()
            .enumerate()
            .map(|(slot, specimen)| (slot, specimen.fitness))
            .max_by_key(|(_, fitness)| *fitness)
            .unwrap();
        Self {
            specimens,
            capacity,
            ranges,
            max_fitness,
            max_slot,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specimens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specimens.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.specimens.len() == self.capacity
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn specimens(&self) -> &[Specimen] {
        &self.specimens
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> &Specimen {
        &self.specimens[index]
    }

    /// Highest fitness ever inserted or won in this population.
    #[must_use]
    pub fn max_fitness(&self) -> i32 {
        self.max_fitness
    }

    /// Slot holding the global record.
    #[must_use]
    pub fn max_slot(&self) -> usize {
        self.max_slot
    }

    /// Inserts a warm-up specimen: appends while below capacity, otherwise
    /// replaces the weakest occupant when the newcomer is at least as fit
    /// (ties replace, which keeps early diversity flowing).
    pub fn warmup_insert(&mut self, specimen: Specimen) -> WarmupOutcome {
        let fitness = specimen.fitness;
        let outcome = if self.specimens.len() < self.capacity {
            self.specimens.push(specimen);
            WarmupOutcome::Added {
                slot: self.specimens.len() - 1,
            }
        } else {
            let (weakest, weakest_fitness) = self
                .specimens
                .iter()
                .enumerate()
                .map(|(slot, occupant)| (slot, occupant.fitness))
                .min_by_key(|(_, fitness)| *fitness)
                .unwrap();
            if fitness >= weakest_fitness {
                self.specimens[weakest] = specimen;
                WarmupOutcome::Replaced {
                    slot: weakest,
                    evicted_fitness: weakest_fitness,
                }
            } else {
                WarmupOutcome::Discarded
            }
        };
        if let Some(slot) = outcome.slot() {
            if fitness > self.max_fitness {
                self.max_fitness = fitness;
                self.max_slot = slot;
                info!(fitness, slot, "new global maximum");
            } else if fitness == self.max_fitness {
                info!(fitness, "global maximum matched");
            }
        }
        outcome
    }

    /// Runs the tournament between a finished candidate and the slot it was
    /// bred from. `fitness` must already be clamped non-negative;
    /// `zero_variance` marks a candidate bred at mutation strength 0.
    ///
    /// # Panics
    ///
    /// Panics if the population is not full (warm-up must have ended) or if
    /// `slot` is out of range.
    pub fn tournament(
        &mut self,
        slot: usize,
        candidate: &Specimen,
        fitness: i32,
        stage: i32,
        zero_variance: bool,
    ) -> TournamentOutcome {
        assert!(
            self.is_full(),
            "population must be full once warm-up has ended: {}/{}",
            self.specimens.len(),
            self.capacity
        );
        assert!(fitness >= 0, "fitness must be clamped non-negative");
        let distance = genetic_distance(&self.specimens[slot], candidate, self.ranges);
        let factor = family_factor(fitness, distance);
        let occupant = &mut self.specimens[slot];
        if fitness > occupant.fitness {
            let landmark = fitness > occupant.historic_max_fitness;
            occupant.weights = candidate.weights.clone();
            occupant.biases = candidate.biases.clone();
            occupant.fitness = fitness;
            occupant.family_factor = factor;
            occupant.best_stage = stage;
            if landmark {
                occupant.historic_max_fitness = fitness;
                occupant.historic_stage = stage;
                info!(slot, fitness, stage, "landmark in slot history");
            }
            if fitness > self.max_fitness {
                self.max_fitness = fitness;
                self.max_slot = slot;
                info!(slot, fitness, distance, "new global maximum");
            } else {
                info!(slot, fitness, distance, "new slot maximum");
            }
            TournamentOutcome::Improved { landmark }
        } else if fitness == self.max_fitness {
            info!(slot, fitness, "global maximum matched");
            TournamentOutcome::MatchedGlobalMax
        } else if fitness == occupant.fitness {
            info!(slot, fitness, "slot maximum matched");
            TournamentOutcome::MatchedSlotMax
        } else if zero_variance {
            // an exact clone fell short, so the slot's record was at least
            // partly episode luck
            let before = occupant.fitness;
            occupant.fitness -= (occupant.fitness - fitness) / 2;
            info!(
                slot,
                fitness,
                before,
                after = occupant.fitness,
                "slot fitness damped toward candidate"
            );
            TournamentOutcome::Damped
        } else {
            debug!(
                slot,
                fitness,
                occupant = occupant.fitness,
                "candidate lost tournament"
            );
            TournamentOutcome::NoChange
        }
    }

    /// Renders the species stack and the pairwise genetic-distance matrix.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = String::from("species stack:\n");
        for (slot, specimen) in self.specimens.iter().enumerate() {
            let _ = writeln!(
                out,
                "{slot}| parent {} ... factor {} -> {}-{} / {}-{}",
                specimen.first_parent,
                specimen.family_factor,
                specimen.fitness,
                specimen.best_stage,
                specimen.historic_max_fitness,
                specimen.historic_stage,
            );
        }
        out.push_str("pairwise distance:\n");
        for i in 0..self.specimens.len() {
            let _ = write!(out, "{i}| ");
            for j in 0..self.specimens.len() {
                if i == j {
                    out.push_str("    --    ");
                } else {
                    let distance =
                        genetic_distance(&self.specimens[i], &self.specimens[j], self.ranges);
                    let _ = write!(out, "{:8.5}% ", distance * 100.0);
                }
            }
            out.push('\n');
        }
        out
    }
}

/// `floor(fitness * distance * ln(fitness))`, the lineage score combining
/// genetic novelty with raw performance. Zero when the logarithm is
/// undefined (fitness 0).
#[expect(clippy::cast_possible_truncation)]
fn family_factor(fitness: i32, distance: f64) -> i32 {
    if fitness <= 0 {
        return 0;
    }
    (f64::from(fitness) * distance * f64::from(fitness).ln()) as i32
}
