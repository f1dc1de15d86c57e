use std::iter;

use rand::Rng;

use evoflock_tensor::Tensor;

/// Closed interval of legal values for freshly drawn genome elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const UNIT: Self = Self {
        min: -1.0,
        max: 1.0,
    };

    #[must_use]
    pub fn width(self) -> f32 {
        self.max - self.min
    }

    pub fn sample<R>(self, rng: &mut R) -> f32
    where
        R: Rng + ?Sized,
    {
        rng.random_range(self.min..self.max)
    }
}

/// Legal ranges for weights and biases, used by every random draw and by the
/// genetic-distance normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenomeRanges {
    pub weight: ValueRange,
    pub bias: ValueRange,
}

impl Default for GenomeRanges {
    fn default() -> Self {
        Self {
            weight: ValueRange::UNIT,
            bias: ValueRange::UNIT,
        }
    }
}

/// One genome: a weight and bias tensor per layer transition, plus fitness
/// and lineage metadata.
///
/// For a topology `layers`, `weights[i]` has shape `(layers[i+1], layers[i])`
/// and `biases[i]` has shape `(layers[i+1], 1)`.
#[derive(Debug, Clone)]
pub struct Specimen {
    /// Current best fitness achieved by this lineage's occupant.
    pub fitness: i32,
    /// All-time fitness record of the slot, surviving later overwrites.
    pub historic_max_fitness: i32,
    /// Episode stage at which the historic record was set.
    pub historic_stage: i32,
    /// Episode stage of the current best fitness.
    pub best_stage: i32,
    /// Derived `floor(fitness * distance * ln(fitness))` score.
    pub family_factor: i32,
    /// Lifeform counter value that founded this lineage.
    pub first_parent: i32,
    pub weights: Vec<Tensor>,
    pub biases: Vec<Tensor>,
}

impl Specimen {
    /// Creates a fully random specimen for the given topology with zeroed
    /// metadata.
    pub fn random<R>(layers: &[usize], ranges: GenomeRanges, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let (weights, biases) = random_genome(layers, ranges, rng);
        Self {
            fitness: 0,
            historic_max_fitness: 0,
            historic_stage: 0,
            best_stage: 0,
            family_factor: 0,
            first_parent: 0,
            weights,
            biases,
        }
    }
}

/// Draws one full set of weight and bias tensors for the given topology,
/// uniform per element inside the configured ranges.
pub fn random_genome<R>(
    layers: &[usize],
    ranges: GenomeRanges,
    rng: &mut R,
) -> (Vec<Tensor>, Vec<Tensor>)
where
    R: Rng + ?Sized,
{
    assert!(layers.len() >= 2, "topology needs at least two layers");
    let mut weights = Vec::with_capacity(layers.len() - 1);
    let mut biases = Vec::with_capacity(layers.len() - 1);
    for pair in layers.windows(2) {
        let (input, output) = (pair[0], pair[1]);
        weights.push(random_tensor(output, input, ranges.weight, rng));
        biases.push(random_tensor(output, 1, ranges.bias, rng));
    }
    (weights, biases)
}

fn random_tensor<R>(shape_x: usize, shape_y: usize, range: ValueRange, rng: &mut R) -> Tensor
where
    R: Rng + ?Sized,
{
    let unit = Tensor::random(shape_x, shape_y, rng);
    &(&unit * range.width()) + range.min
}

/// Average per-element divergence between two genomes, normalized by the
/// legal value ranges and the average count of weight/bias tensor pairs.
///
/// Identical genomes score 0; independently drawn genomes land around 2/3.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn genetic_distance(lhs: &Specimen, rhs: &Specimen, ranges: GenomeRanges) -> f64 {
    assert_eq!(
        lhs.weights.len(),
        rhs.weights.len(),
        "genomes must share a topology"
    );
    assert_eq!(
        lhs.biases.len(),
        rhs.biases.len(),
        "genomes must share a topology"
    );
    let mut distance = 0.0f64;
    for (a, b) in iter::zip(&lhs.weights, &rhs.weights) {
        distance += f64::from(a.compare(b).sum_all())
            / a.total_cells() as f64
            / f64::from(ranges.weight.width());
    }
    for (a, b) in iter::zip(&lhs.biases, &rhs.biases) {
        distance += f64::from(a.compare(b).sum_all())
            / a.total_cells() as f64
            / f64::from(ranges.bias.width());
    }
    let pairs = (lhs.weights.len() + lhs.biases.len()) as f64 / 2.0;
    distance / pairs
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_genome_shapes_follow_topology() {
        let mut rng = Pcg32::seed_from_u64(1);
        let specimen = Specimen::random(&[3, 5, 2], GenomeRanges::default(), &mut rng);
        assert_eq!(specimen.weights.len(), 2);
        assert_eq!(specimen.biases.len(), 2);
        assert_eq!(specimen.weights[0].shape(), (5, 3));
        assert_eq!(specimen.biases[0].shape(), (5, 1));
        assert_eq!(specimen.weights[1].shape(), (2, 5));
        assert_eq!(specimen.biases[1].shape(), (2, 1));
    }

    #[test]
    fn test_random_genome_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(2);
        let ranges = GenomeRanges::default();
        let (weights, biases) = random_genome(&[4, 8, 2], ranges, &mut rng);
        for tensor in weights.iter().chain(&biases) {
            assert!(
                tensor
                    .buffer()
                    .iter()
                    .all(|v| (-1.0..1.0).contains(v)),
                "values must stay inside the configured range"
            );
        }
    }

    #[test]
    #[should_panic(expected = "at least two layers")]
    fn test_random_genome_rejects_degenerate_topology() {
        let mut rng = Pcg32::seed_from_u64(3);
        let _ = random_genome(&[4], GenomeRanges::default(), &mut rng);
    }

    #[test]
    fn test_distance_of_identical_genomes_is_zero() {
        let mut rng = Pcg32::seed_from_u64(4);
        let specimen = Specimen::random(&[2, 4, 2], GenomeRanges::default(), &mut rng);
        let distance = genetic_distance(&specimen, &specimen.clone(), GenomeRanges::default());
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn test_distance_is_symmetric_and_bounded() {
        let mut rng = Pcg32::seed_from_u64(5);
        let ranges = GenomeRanges::default();
        let a = Specimen::random(&[2, 4, 2], ranges, &mut rng);
        let b = Specimen::random(&[2, 4, 2], ranges, &mut rng);
        let ab = genetic_distance(&a, &b, ranges);
        let ba = genetic_distance(&b, &a, ranges);
        assert_eq!(ab, ba);
        // independent uniform draws on [-1, 1] diverge by 2/3 per element on
        // average, which normalizes to ~0.67
        assert!(ab > 0.3);
        assert!(ab < 1.0);
    }

    #[test]
    fn test_distance_of_opposite_extremes_hits_maximum() {
        let ranges = GenomeRanges::default();
        let lows = Specimen {
            fitness: 0,
            historic_max_fitness: 0,
            historic_stage: 0,
            best_stage: 0,
            family_factor: 0,
            first_parent: 0,
            weights: vec![evoflock_tensor::Tensor::from_buffer(2, 2, vec![-1.0; 4])],
            biases: vec![evoflock_tensor::Tensor::from_buffer(2, 1, vec![-1.0; 2])],
        };
        let mut highs = lows.clone();
        highs.weights[0].copy_from(&[1.0; 4]);
        highs.biases[0].copy_from(&[1.0; 2]);
        // every element diverges by the full range width; weights and biases
        // each contribute 1.0 after the average-pair-count normalization
        let distance = genetic_distance(&lows, &highs, ranges);
        assert!((distance - 2.0).abs() < 1e-6);
    }
}
