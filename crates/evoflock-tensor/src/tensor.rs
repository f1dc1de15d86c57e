use std::{
    iter,
    ops::{Add, Div, Mul, Sub},
};

use rand::Rng;

use crate::dto::TensorDto;

/// Dense 2-D buffer of `f32` values.
///
/// Element `(x, y)` lives at linear offset `x + y * shape_x`. The shape is
/// fixed at construction and the buffer length always equals
/// `shape_x * shape_y`. Tensors are value-like: every operation returns a new
/// tensor; the only in-place mutations are [`Tensor::set`] and
/// [`Tensor::copy_from`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape_x: usize,
    shape_y: usize,
    buffer: Vec<f32>,
}

impl Tensor {
    #[must_use]
    pub fn zeros(shape_x: usize, shape_y: usize) -> Self {
        Self {
            shape_x,
            shape_y,
            buffer: vec![0.0; shape_x * shape_y],
        }
    }

    /// Wraps an existing buffer laid out as `x + y * shape_x`.
    #[must_use]
    pub fn from_buffer(shape_x: usize, shape_y: usize, buffer: Vec<f32>) -> Self {
        assert_eq!(
            buffer.len(),
            shape_x * shape_y,
            "buffer length must match shape ({shape_x}, {shape_y})"
        );
        Self {
            shape_x,
            shape_y,
            buffer,
        }
    }

    /// Creates a tensor with every element drawn uniformly from `[0, 1)`.
    #[must_use]
    pub fn random<R>(shape_x: usize, shape_y: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let buffer = (0..shape_x * shape_y).map(|_| rng.random()).collect();
        Self {
            shape_x,
            shape_y,
            buffer,
        }
    }

    #[must_use]
    pub fn shape_x(&self) -> usize {
        self.shape_x
    }

    #[must_use]
    pub fn shape_y(&self) -> usize {
        self.shape_y
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.shape_x, self.shape_y)
    }

    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.shape_x * self.shape_y
    }

    #[must_use]
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.shape_x, "x index {x} out of range {}", self.shape_x);
        assert!(y < self.shape_y, "y index {y} out of range {}", self.shape_y);
        self.buffer[x + y * self.shape_x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        assert!(x < self.shape_x, "x index {x} out of range {}", self.shape_x);
        assert!(y < self.shape_y, "y index {y} out of range {}", self.shape_y);
        self.buffer[x + y * self.shape_x] = value;
    }

    /// Overwrites the whole buffer in place with exactly-matching length.
    pub fn copy_from(&mut self, values: &[f32]) {
        assert_eq!(
            values.len(),
            self.buffer.len(),
            "value count must match shape ({}, {})",
            self.shape_x,
            self.shape_y
        );
        self.buffer.copy_from_slice(values);
    }

    /// Matrix product `self · rhs`, shape `(self.shape_x, rhs.shape_y)`.
    ///
    /// The output buffer is linearized with the output's own row count,
    /// exactly like every other tensor in this crate.
    #[must_use]
    pub fn dot(&self, rhs: &Tensor) -> Tensor {
        assert_eq!(
            self.shape_y, rhs.shape_x,
            "inner dimensions must agree: ({}, {}) · ({}, {})",
            self.shape_x, self.shape_y, rhs.shape_x, rhs.shape_y
        );
        let n = self.shape_x;
        let m = self.shape_y;
        let p = rhs.shape_y;
        let mut result = Tensor::zeros(n, p);
        for i in 0..n {
            for j in 0..p {
                let mut sum = 0.0;
                for k in 0..m {
                    sum += self.buffer[i + k * n] * rhs.buffer[k + j * m];
                }
                result.buffer[i + j * n] = sum;
            }
        }
        result
    }

    /// Elementwise absolute difference, `max(a, b) - min(a, b)`.
    #[must_use]
    pub fn compare(&self, rhs: &Tensor) -> Tensor {
        self.zip_with(rhs, |a, b| f32::max(a, b) - f32::min(a, b))
    }

    /// Elementwise map into a new tensor.
    #[must_use]
    pub fn apply<F>(&self, f: F) -> Tensor
    where
        F: Fn(f32) -> f32,
    {
        Tensor {
            shape_x: self.shape_x,
            shape_y: self.shape_y,
            buffer: self.buffer.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Sum of all elements, accumulated in `f64`.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn sum_all(&self) -> f32 {
        self.buffer.iter().map(|v| f64::from(*v)).sum::<f64>() as f32
    }

    #[must_use]
    pub fn broadcast_sum(&self, rhs: &Tensor) -> Tensor {
        self.broadcast_op(rhs, |a, b| a + b)
    }

    #[must_use]
    pub fn broadcast_sub(&self, rhs: &Tensor) -> Tensor {
        self.broadcast_op(rhs, |a, b| a - b)
    }

    #[must_use]
    pub fn broadcast_mul(&self, rhs: &Tensor) -> Tensor {
        self.broadcast_op(rhs, |a, b| a * b)
    }

    #[must_use]
    pub fn broadcast_div(&self, rhs: &Tensor) -> Tensor {
        self.broadcast_op(rhs, |a, b| a / b)
    }

    #[must_use]
    pub fn to_dto(&self) -> TensorDto {
        TensorDto {
            shape_x: self.shape_x,
            shape_y: self.shape_y,
            buffer: self.buffer.clone(),
        }
    }

    #[must_use]
    pub fn from_dto(dto: TensorDto) -> Self {
        Self::from_buffer(dto.shape_x, dto.shape_y, dto.buffer)
    }

    fn zip_with<F>(&self, rhs: &Tensor, f: F) -> Tensor
    where
        F: Fn(f32, f32) -> f32,
    {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "shape mismatch: {:?} vs {:?}",
            self.shape(),
            rhs.shape()
        );
        Tensor {
            shape_x: self.shape_x,
            shape_y: self.shape_y,
            buffer: iter::zip(&self.buffer, &rhs.buffer)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        }
    }

    fn scalar_op<F>(&self, n: f32, f: F) -> Tensor
    where
        F: Fn(f32, f32) -> f32,
    {
        self.apply(|v| f(v, n))
    }

    /// The right-hand tensor must match exactly one axis of `self` and be of
    /// size 1 on the other; it is then broadcast along the non-matching axis.
    fn broadcast_op<F>(&self, rhs: &Tensor, f: F) -> Tensor
    where
        F: Fn(f32, f32) -> f32,
    {
        let rows_match = self.shape_x == rhs.shape_x;
        let columns_match = self.shape_y == rhs.shape_y;
        assert!(
            rows_match != columns_match,
            "shape mismatch: broadcast needs exactly one matching axis, got {:?} vs {:?}",
            self.shape(),
            rhs.shape()
        );
        let mut result = self.clone();
        if rows_match {
            assert_eq!(
                rhs.shape_y, 1,
                "shape mismatch: broadcast operand must be a single column, got {:?}",
                rhs.shape()
            );
            for x in 0..self.shape_x {
                for y in 0..self.shape_y {
                    let i = x + y * self.shape_x;
                    result.buffer[i] = f(result.buffer[i], rhs.buffer[x]);
                }
            }
        } else {
            assert_eq!(
                rhs.shape_x, 1,
                "shape mismatch: broadcast operand must be a single row, got {:?}",
                rhs.shape()
            );
            for x in 0..self.shape_x {
                for y in 0..self.shape_y {
                    let i = x + y * self.shape_x;
                    result.buffer[i] = f(result.buffer[i], rhs.buffer[y]);
                }
            }
        }
        result
    }
}

impl Add<&Tensor> for &Tensor {
    type Output = Tensor;

    fn add(self, rhs: &Tensor) -> Tensor {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub<&Tensor> for &Tensor {
    type Output = Tensor;

    fn sub(self, rhs: &Tensor) -> Tensor {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Add<f32> for &Tensor {
    type Output = Tensor;

    fn add(self, n: f32) -> Tensor {
        self.scalar_op(n, |a, b| a + b)
    }
}

impl Sub<f32> for &Tensor {
    type Output = Tensor;

    fn sub(self, n: f32) -> Tensor {
        self.scalar_op(n, |a, b| a - b)
    }
}

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, n: f32) -> Tensor {
        self.scalar_op(n, |a, b| a * b)
    }
}

impl Div<f32> for &Tensor {
    type Output = Tensor;

    fn div(self, n: f32) -> Tensor {
        self.scalar_op(n, |a, b| a / b)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_indexing_is_column_major() {
        let t = Tensor::from_buffer(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(t.get(0, 0), 1.0);
        assert_eq!(t.get(1, 0), 2.0);
        assert_eq!(t.get(0, 1), 3.0);
        assert_eq!(t.get(1, 2), 6.0);
    }

    #[test]
    fn test_set_then_get() {
        let mut t = Tensor::zeros(3, 2);
        t.set(2, 1, 7.5);
        assert_eq!(t.get(2, 1), 7.5);
        assert_eq!(t.sum_all(), 7.5);
    }

    #[test]
    #[should_panic(expected = "buffer length must match shape")]
    fn test_from_buffer_rejects_wrong_length() {
        let _ = Tensor::from_buffer(2, 2, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_dot_square_hand_values() {
        // [1 3; 2 4] · [5 7; 6 8] = [23 31; 34 46]
        let a = Tensor::from_buffer(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = Tensor::from_buffer(2, 2, vec![5.0, 6.0, 7.0, 8.0]);
        let c = a.dot(&b);
        assert_eq!(c.get(0, 0), 23.0);
        assert_eq!(c.get(1, 0), 34.0);
        assert_eq!(c.get(0, 1), 31.0);
        assert_eq!(c.get(1, 1), 46.0);
    }

    #[test]
    fn test_dot_rectangular_hand_values() {
        // (2, 3) · (3, 2) -> (2, 2); the rectangular case catches any
        // inconsistency between output shape and output linearization.
        let a = Tensor::from_buffer(2, 3, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        let b = Tensor::from_buffer(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = a.dot(&b);
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.get(0, 0), 1.0 * 7.0 + 2.0 * 8.0 + 3.0 * 9.0);
        assert_eq!(c.get(1, 0), 4.0 * 7.0 + 5.0 * 8.0 + 6.0 * 9.0);
        assert_eq!(c.get(0, 1), 1.0 * 10.0 + 2.0 * 11.0 + 3.0 * 12.0);
        assert_eq!(c.get(1, 1), 4.0 * 10.0 + 5.0 * 11.0 + 6.0 * 12.0);
    }

    #[test]
    fn test_dot_column_vector() {
        let w = Tensor::from_buffer(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let x = Tensor::from_buffer(2, 1, vec![10.0, 100.0]);
        let z = w.dot(&x);
        assert_eq!(z.shape(), (3, 1));
        assert_eq!(z.get(0, 0), 1.0 * 10.0 + 4.0 * 100.0);
        assert_eq!(z.get(1, 0), 2.0 * 10.0 + 5.0 * 100.0);
        assert_eq!(z.get(2, 0), 3.0 * 10.0 + 6.0 * 100.0);
    }

    #[test]
    #[should_panic(expected = "inner dimensions must agree")]
    fn test_dot_rejects_mismatched_inner_dimension() {
        let a = Tensor::zeros(2, 3);
        let b = Tensor::zeros(2, 2);
        let _ = a.dot(&b);
    }

    #[test]
    fn test_elementwise_add_sub() {
        let a = Tensor::from_buffer(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = Tensor::from_buffer(2, 2, vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!((&a + &b).buffer(), &[11.0, 22.0, 33.0, 44.0]);
        assert_eq!((&b - &a).buffer(), &[9.0, 18.0, 27.0, 36.0]);
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_elementwise_add_rejects_shape_mismatch() {
        let a = Tensor::zeros(2, 2);
        let b = Tensor::zeros(2, 3);
        let _ = &a + &b;
    }

    #[test]
    fn test_compare_is_absolute_difference() {
        let a = Tensor::from_buffer(2, 1, vec![1.0, 5.0]);
        let b = Tensor::from_buffer(2, 1, vec![4.0, 2.0]);
        assert_eq!(a.compare(&b).buffer(), &[3.0, 3.0]);
        assert_eq!(b.compare(&a).buffer(), &[3.0, 3.0]);
    }

    #[test]
    fn test_scalar_ops() {
        let a = Tensor::from_buffer(2, 1, vec![2.0, 4.0]);
        assert_eq!((&a + 1.0).buffer(), &[3.0, 5.0]);
        assert_eq!((&a - 1.0).buffer(), &[1.0, 3.0]);
        assert_eq!((&a * 3.0).buffer(), &[6.0, 12.0]);
        assert_eq!((&a / 2.0).buffer(), &[1.0, 2.0]);
    }

    #[test]
    fn test_apply() {
        let a = Tensor::from_buffer(2, 1, vec![-1.0, 2.0]);
        assert_eq!(a.apply(|v| v * v).buffer(), &[1.0, 4.0]);
    }

    #[test]
    fn test_broadcast_column_extends_along_y() {
        let a = Tensor::from_buffer(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let column = Tensor::from_buffer(2, 1, vec![10.0, 20.0]);
        let summed = a.broadcast_sum(&column);
        assert_eq!(summed.buffer(), &[11.0, 22.0, 13.0, 24.0, 15.0, 26.0]);
    }

    #[test]
    fn test_broadcast_row_extends_along_x() {
        let a = Tensor::from_buffer(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let row = Tensor::from_buffer(1, 3, vec![1.0, 2.0, 3.0]);
        let product = a.broadcast_mul(&row);
        assert_eq!(product.buffer(), &[1.0, 2.0, 6.0, 8.0, 15.0, 18.0]);
    }

    #[test]
    fn test_broadcast_sub_div() {
        let a = Tensor::from_buffer(2, 2, vec![2.0, 4.0, 6.0, 8.0]);
        let column = Tensor::from_buffer(2, 1, vec![1.0, 2.0]);
        assert_eq!(a.broadcast_sub(&column).buffer(), &[1.0, 2.0, 5.0, 6.0]);
        assert_eq!(a.broadcast_div(&column).buffer(), &[2.0, 2.0, 6.0, 4.0]);
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_broadcast_rejects_both_axes_matching() {
        let a = Tensor::zeros(2, 2);
        let b = Tensor::zeros(2, 2);
        let _ = a.broadcast_sum(&b);
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_broadcast_rejects_no_axis_matching() {
        let a = Tensor::zeros(2, 3);
        let b = Tensor::zeros(4, 1);
        let _ = a.broadcast_sum(&b);
    }

    #[test]
    #[should_panic(expected = "single column")]
    fn test_broadcast_rejects_wide_operand() {
        let a = Tensor::zeros(2, 3);
        let b = Tensor::zeros(2, 2);
        let _ = a.broadcast_sum(&b);
    }

    #[test]
    fn test_dto_round_trip_is_exact() {
        let mut rng = Pcg32::seed_from_u64(17);
        let t = Tensor::random(5, 3, &mut rng);
        let restored = Tensor::from_dto(t.to_dto());
        assert_eq!(t, restored);
    }

    #[test]
    fn test_dto_survives_json() {
        let mut rng = Pcg32::seed_from_u64(99);
        let t = Tensor::random(4, 4, &mut rng);
        let json = serde_json::to_string(&t.to_dto()).unwrap();
        let dto: TensorDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto, t.to_dto());
    }

    #[test]
    fn test_random_fills_unit_interval() {
        let mut rng = Pcg32::seed_from_u64(3);
        let t = Tensor::random(8, 8, &mut rng);
        assert!(t.buffer().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = Tensor::from_buffer(1, 1, vec![1.0]);
        let b = a.clone();
        a.set(0, 0, 2.0);
        assert_eq!(b.get(0, 0), 1.0);
    }
}
