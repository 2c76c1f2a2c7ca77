// src/tensor_data.rs
use crate::autograd::History;
use crate::backend::TensorBackend;
use crate::storage::Storage;
use crate::tensor::Tensor;
use std::sync::Arc;

/// Internal state of one node in the computation graph.
///
/// Wrapped in `Arc<RwLock<TensorData>>` by [`Tensor`]. The storage, backend and
/// history never change after construction; only `grad` (written by the
/// backward engine) and `requires_grad` on leaves are mutable.
#[derive(Debug)]
pub struct TensorData {
    /// The value. Opaque to the autograd core beyond shape and contiguity.
    pub(crate) storage: Storage,
    /// Kernels used for every operation consuming this node.
    pub(crate) backend: Arc<dyn TensorBackend>,
    /// If true, operations involving this tensor are tracked in the graph.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient, populated by backward on leaves.
    pub(crate) grad: Option<Tensor>,
    /// Edge to the producing operation. `None` for leaves and constants.
    pub(crate) history: Option<Arc<History>>,
}

impl TensorData {
    pub(crate) fn new(
        storage: Storage,
        backend: Arc<dyn TensorBackend>,
        requires_grad: bool,
        history: Option<Arc<History>>,
    ) -> Self {
        TensorData {
            storage,
            backend,
            requires_grad,
            grad: None,
            history,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn numel(&self) -> usize {
        self.storage.numel()
    }
}
