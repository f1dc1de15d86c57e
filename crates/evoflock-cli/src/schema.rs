use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evoflock_evolution::SpecimenRecord;

/// Exported training artifact: the best specimen of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub layers: Vec<usize>,
    pub fitness: i32,
    pub specimen: SpecimenRecord,
}
