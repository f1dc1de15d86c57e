use serde::{Deserialize, Serialize};

/// Serializable snapshot of a [`Tensor`](crate::Tensor).
///
/// Equality is derived and therefore exact per element. Persisted genomes are
/// compared bit-for-bit, never with an epsilon tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorDto {
    pub shape_x: usize,
    pub shape_y: usize,
    pub buffer: Vec<f32>,
}
