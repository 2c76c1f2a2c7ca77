// src/tensor/traits.rs

use crate::autograd::Function;
use crate::tensor::Tensor;
use std::fmt::{self, Debug};
use std::sync::Arc;

impl Clone for Tensor {
    /// Shallow clone: a new handle to the same node.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

const DEBUG_PREVIEW: usize = 8;

impl Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let td = self.read_data();
        let values = td.storage.to_vec();
        write!(
            f,
            "Tensor(shape={:?}, requires_grad={}, op={}, data=",
            td.storage.shape(),
            td.requires_grad,
            td.history.as_ref().map_or("leaf", |h| h.op().name()),
        )?;
        if values.len() <= DEBUG_PREVIEW {
            write!(f, "{:?})", values)
        } else {
            write!(f, "{:?} ... ~{} elements)", &values[..DEBUG_PREVIEW], values.len())
        }
    }
}

impl PartialEq for Tensor {
    /// Tensors are equal when they have the same shape and values.
    /// Autograd metadata is not compared.
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        let a = self.read_data();
        let b = other.read_data();
        a.storage.shape() == b.storage.shape() && a.storage.to_vec() == b.storage.to_vec()
    }
}
