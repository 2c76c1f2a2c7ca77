use crate::autograd::backward::run_backward;
use crate::autograd::{Context, Function, History, Op};
use crate::backend::TensorBackend;
use crate::error::TensorGradError;
use crate::storage::Storage;
use crate::tensor::Tensor;
use std::sync::Arc;

impl Tensor {
    /// Checks if this tensor requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag on a leaf tensor.
    ///
    /// # Errors
    /// Returns `RequiresGradOnNonLeaf` if the tensor was produced by an operation.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), TensorGradError> {
        let mut guard = self.write_data();
        if guard.history.is_some() {
            return Err(TensorGradError::RequiresGradOnNonLeaf);
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// True for tensors not produced by a tracked operation.
    pub fn is_leaf(&self) -> bool {
        self.read_data().history.is_none()
    }

    /// Returns the edge to the producing operation, if any.
    pub fn history(&self) -> Option<Arc<History>> {
        self.read_data().history.clone()
    }

    /// Returns a clone of the gradient tensor, if it exists.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    pub fn zero_grad(&self) {
        self.write_data().grad = None;
    }

    /// A new leaf sharing this tensor's storage, cut off from the graph.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        Tensor::from_parts(guard.storage.clone(), Arc::clone(&guard.backend), false, None)
    }

    /// Adds `grad` into the gradient slot, creating it on first deposit.
    pub(crate) fn accumulate_grad(&self, grad: Storage) -> Result<(), TensorGradError> {
        let mut guard = self.write_data();
        if grad.shape() != guard.storage.shape() {
            return Err(TensorGradError::ShapeMismatch {
                expected: guard.storage.shape().to_vec(),
                actual: grad.shape().to_vec(),
                operation: "accumulate_grad".to_string(),
            });
        }
        let backend = Arc::clone(&guard.backend);
        let summed = match guard.grad.as_ref() {
            Some(existing) => backend.zip(&|a, b| a + b, &existing.storage(), &grad)?,
            None => grad,
        };
        guard.grad = Some(Tensor::from_storage(summed, backend));
        Ok(())
    }

    /// Applies `op` to `inputs`, building the output node.
    ///
    /// The output requires grad when any input does; only then is a history
    /// edge attached and the context allowed to keep saved values. The output
    /// uses the first input's backend.
    pub fn apply(op: Op, inputs: &[&Tensor]) -> Result<Tensor, TensorGradError> {
        if inputs.len() != op.arity() {
            return Err(TensorGradError::ArityMismatch {
                operation: op.name().to_string(),
                expected: op.arity(),
                actual: inputs.len(),
            });
        }
        let backend = inputs[0].backend();
        let requires_grad = inputs.iter().any(|t| t.requires_grad());

        let storages: Vec<Storage> = inputs.iter().map(|t| t.storage()).collect();
        let storage_refs: Vec<&Storage> = storages.iter().collect();
        let mut ctx = Context::new(!requires_grad);
        let output = op.forward(&mut ctx, backend.as_ref(), &storage_refs)?;
        log::trace!(
            "apply: {} {:?} (tracked: {})",
            op.name(),
            output.shape(),
            requires_grad
        );

        let history = requires_grad.then(|| {
            Arc::new(History {
                op,
                ctx,
                inputs: inputs.iter().map(|&t| t.clone()).collect(),
            })
        });
        Ok(Tensor::from_parts(output, backend, requires_grad, history))
    }

    /// Computes gradients of this single-element tensor with respect to every
    /// leaf that requires grad, depositing them in the leaves' `grad` slots.
    ///
    /// # Errors
    /// * `RequiresGradNotMet` if this tensor does not require grad.
    /// * `BackwardNonScalar` if it holds more than one element.
    /// * Any error raised by an operation's backward.
    pub fn backward(&self) -> Result<(), TensorGradError> {
        if !self.requires_grad() {
            return Err(TensorGradError::RequiresGradNotMet);
        }
        if self.numel() != 1 {
            return Err(TensorGradError::BackwardNonScalar);
        }
        let seed = Storage::filled(1.0, &self.shape());
        self.backward_with_grad_storage(seed)
    }

    /// Like [`Tensor::backward`], seeded with an explicit dL/d`self` of this
    /// tensor's shape.
    pub fn backward_with_grad(&self, grad: &Tensor) -> Result<(), TensorGradError> {
        if !self.requires_grad() {
            return Err(TensorGradError::RequiresGradNotMet);
        }
        let expected = self.shape();
        if grad.shape() != expected {
            return Err(TensorGradError::ShapeMismatch {
                expected,
                actual: grad.shape(),
                operation: "backward_with_grad".to_string(),
            });
        }
        self.backward_with_grad_storage(grad.storage())
    }

    fn backward_with_grad_storage(&self, seed: Storage) -> Result<(), TensorGradError> {
        if self.is_leaf() {
            log::warn!("backward called on a leaf tensor; the seed becomes its gradient");
        }
        run_backward(self, seed)
    }
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
