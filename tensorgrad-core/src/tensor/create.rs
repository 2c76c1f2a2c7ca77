//! Builders for leaf tensors.

use crate::backend::default_backend;
use crate::error::TensorGradError;
use crate::storage::Storage;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

impl Tensor {
    /// Creates a new leaf tensor from row-major data and a shape on the default backend.
    ///
    /// # Errors
    /// Returns `TensorCreationError` if `data.len()` does not match the product of `shape`.
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, TensorGradError> {
        Ok(Tensor::from_storage(Storage::new(data, shape)?, default_backend()))
    }

    /// A one-element tensor of shape `[1]`.
    pub fn scalar(value: f64) -> Self {
        full(&[1], value)
    }
}

/// Creates a tensor of `shape` filled with `value`.
pub fn full(shape: &[usize], value: f64) -> Tensor {
    Tensor::from_storage(Storage::filled(value, shape), default_backend())
}

pub fn zeros(shape: &[usize]) -> Tensor {
    full(shape, 0.0)
}

pub fn ones(shape: &[usize]) -> Tensor {
    full(shape, 1.0)
}

/// Zeros with the shape and backend of `other`.
pub fn zeros_like(other: &Tensor) -> Tensor {
    Tensor::from_storage(Storage::filled(0.0, &other.shape()), other.backend())
}

/// Ones with the shape and backend of `other`.
pub fn ones_like(other: &Tensor) -> Tensor {
    Tensor::from_storage(Storage::filled(1.0, &other.shape()), other.backend())
}

/// Uniform samples in `[0, 1)`.
pub fn rand<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Tensor {
    let numel = shape.iter().product();
    let data = (0..numel).map(|_| rng.gen::<f64>()).collect();
    Tensor::from_storage(Storage::from_contiguous(data, shape.to_vec()), default_backend())
}

/// Standard normal samples.
pub fn randn<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Tensor {
    let numel = shape.iter().product();
    let data = (0..numel).map(|_| StandardNormal.sample(rng)).collect();
    Tensor::from_storage(Storage::from_contiguous(data, shape.to_vec()), default_backend())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
