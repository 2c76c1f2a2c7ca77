//! Strided tensor storage.
//!
//! `Storage` is the raw value carried by every tensor node: a shared, immutable
//! `f64` buffer plus the shape/strides/offset needed to interpret it. View-level
//! operations (`permute`, `view`) share the buffer and only rewrite metadata.

use crate::error::TensorGradError;
use rand::Rng;
use std::sync::Arc;

pub mod utils;

use utils::{calculate_strides, index_to_coord, validate_permutation};

#[derive(Debug, Clone)]
pub struct Storage {
    /// Wrapped in Arc so views share the buffer instead of copying it.
    pub(crate) buffer: Arc<Vec<f64>>,
    pub(crate) shape: Vec<usize>,
    pub(crate) strides: Vec<usize>,
    pub(crate) offset: usize,
}

impl Storage {
    /// Creates a contiguous storage from row-major data.
    ///
    /// # Errors
    /// Returns `TensorCreationError` if `data.len()` does not match the product of `shape`.
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, TensorGradError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(TensorGradError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Self::from_contiguous(data, shape))
    }

    /// Creates a contiguous storage of `shape` filled with `value`.
    pub fn filled(value: f64, shape: &[usize]) -> Self {
        let numel = shape.iter().product();
        Self::from_contiguous(vec![value; numel], shape.to_vec())
    }

    // Caller guarantees data.len() == numel(shape).
    pub(crate) fn from_contiguous(data: Vec<f64>, shape: Vec<usize>) -> Self {
        let strides = calculate_strides(&shape);
        Storage {
            buffer: Arc::new(data),
            shape,
            strides,
            offset: 0,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Checks if the storage is laid out in row-major (C) order without gaps.
    /// Dimensions of size 1 are ignored, their stride is irrelevant.
    pub fn is_contiguous(&self) -> bool {
        let mut current_stride = 1;
        for i in (0..self.shape.len()).rev() {
            let dim = self.shape[i];
            if dim == 0 {
                return true;
            }
            if dim != 1 {
                if self.strides[i] != current_stride {
                    return false;
                }
                current_stride *= dim;
            }
        }
        true
    }

    /// Buffer position of `coord`. The coordinate must be in bounds.
    pub(crate) fn position(&self, coord: &[usize]) -> usize {
        self.offset
            + coord
                .iter()
                .zip(self.strides.iter())
                .map(|(c, s)| c * s)
                .sum::<usize>()
    }

    /// Returns the element at `index`.
    pub fn get(&self, index: &[usize]) -> Result<f64, TensorGradError> {
        let in_bounds = index.len() == self.shape.len()
            && index.iter().zip(self.shape.iter()).all(|(i, d)| i < d);
        if !in_bounds {
            return Err(TensorGradError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }
        Ok(self.buffer[self.position(index)])
    }

    /// Copies the elements out in logical row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        let numel = self.numel();
        if self.is_contiguous() {
            return self.buffer[self.offset..self.offset + numel].to_vec();
        }
        (0..numel)
            .map(|i| self.buffer[self.position(&index_to_coord(i, &self.shape))])
            .collect()
    }

    /// Reorders axes without copying: output axis `i` is input axis `order[i]`.
    pub fn permute(&self, order: &[usize]) -> Result<Storage, TensorGradError> {
        validate_permutation(self.rank(), order)?;
        Ok(Storage {
            buffer: Arc::clone(&self.buffer),
            shape: order.iter().map(|&d| self.shape[d]).collect(),
            strides: order.iter().map(|&d| self.strides[d]).collect(),
            offset: self.offset,
        })
    }

    /// Reinterprets a contiguous buffer under a new shape without copying.
    ///
    /// # Errors
    /// * `ContiguityViolation` if the storage is not contiguous.
    /// * `ShapeMismatch` if the element counts differ.
    pub fn view(&self, shape: &[usize]) -> Result<Storage, TensorGradError> {
        if !self.is_contiguous() {
            return Err(TensorGradError::ContiguityViolation {
                operation: "view".to_string(),
                shape: self.shape.clone(),
                strides: self.strides.clone(),
            });
        }
        let new_numel: usize = shape.iter().product();
        if new_numel != self.numel() {
            return Err(TensorGradError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: shape.to_vec(),
                operation: "view (numel mismatch)".to_string(),
            });
        }
        Ok(Storage {
            buffer: Arc::clone(&self.buffer),
            shape: shape.to_vec(),
            strides: calculate_strides(shape),
            offset: self.offset,
        })
    }

    /// Returns a contiguous copy with the element at `index` replaced.
    pub fn with_element(&self, index: &[usize], value: f64) -> Result<Storage, TensorGradError> {
        // Validates the index.
        self.get(index)?;
        let mut data = self.to_vec();
        let flat = index
            .iter()
            .zip(calculate_strides(&self.shape))
            .map(|(i, s)| i * s)
            .sum::<usize>();
        data[flat] = value;
        Ok(Self::from_contiguous(data, self.shape.clone()))
    }

    /// Picks a uniformly random valid index, or `None` for an empty storage.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec<usize>> {
        if self.numel() == 0 {
            return None;
        }
        Some(self.shape.iter().map(|&d| rng.gen_range(0..d)).collect())
    }

    /// Iterates over every valid index in row-major order.
    pub fn indices(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.numel()).map(move |i| index_to_coord(i, &self.shape))
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
