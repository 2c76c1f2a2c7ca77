// src/tensor/mod.rs

use crate::autograd::graph::NodeId;
use crate::autograd::History;
use crate::backend::TensorBackend;
use crate::error::TensorGradError;
use crate::storage::Storage;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod autograd_methods;
pub mod create;
mod ops_methods;
mod traits;

/// A node of the computation graph: a value plus its autograd metadata.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** several consumer edges can reference the same node,
///     and clones are cheap.
/// 2.  **Interior Mutability:** the gradient slot can be filled through a shared
///     reference during backward.
///
/// Every operation allocates a new node; no operation rewrites an existing
/// node's storage.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    pub(crate) fn from_parts(
        storage: Storage,
        backend: Arc<dyn TensorBackend>,
        requires_grad: bool,
        history: Option<Arc<History>>,
    ) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(TensorData::new(
                storage,
                backend,
                requires_grad,
                history,
            ))),
        }
    }

    /// Wraps an existing storage as an untracked leaf.
    pub fn from_storage(storage: Storage, backend: Arc<dyn TensorBackend>) -> Self {
        Self::from_parts(storage, backend, false, None)
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// A poisoned lock is recovered: the only writes are whole-field
    /// replacements, so the data is never left half-updated.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Identity of this node, shared by all clones of the handle.
    pub fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().storage.shape().to_vec()
    }

    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    pub fn is_contiguous(&self) -> bool {
        self.read_data().storage.is_contiguous()
    }

    /// Returns the underlying storage (shares the buffer).
    pub fn storage(&self) -> Storage {
        self.read_data().storage.clone()
    }

    pub fn backend(&self) -> Arc<dyn TensorBackend> {
        Arc::clone(&self.read_data().backend)
    }

    /// Elements in logical row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.read_data().storage.to_vec()
    }

    pub fn get(&self, index: &[usize]) -> Result<f64, TensorGradError> {
        self.read_data().storage.get(index)
    }

    /// The value of a single-element tensor.
    pub fn item(&self) -> Result<f64, TensorGradError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(TensorGradError::ShapeMismatch {
                expected: vec![1],
                actual: guard.storage.shape().to_vec(),
                operation: "item".to_string(),
            });
        }
        Ok(guard.storage.to_vec()[0])
    }

    /// Returns a leaf sharing this tensor's storage but bound to another backend.
    /// `requires_grad` carries over; history does not.
    pub fn with_backend(&self, backend: Arc<dyn TensorBackend>) -> Tensor {
        let guard = self.read_data();
        Self::from_parts(guard.storage.clone(), backend, guard.requires_grad, None)
    }
}
