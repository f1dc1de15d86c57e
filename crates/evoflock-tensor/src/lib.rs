//! Dense 2-D tensor primitive for the evolutionary trainer.
//!
//! This crate implements the minimal tensor algebra the breeding math and the
//! forward pass depend on: elementwise, scalar, broadcast, and matrix-multiply
//! operations with exact shape contracts. It is pure computation with no I/O.
//!
//! Shape violations are programming errors, not runtime conditions, and every
//! operation asserts its contract and panics on mismatch.

pub use self::{dto::TensorDto, tensor::Tensor};

mod dto;
mod tensor;
