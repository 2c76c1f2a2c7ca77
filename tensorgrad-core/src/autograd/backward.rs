//! The backward engine.
//!
//! Gradients of intermediate nodes live in a map for the duration of one run and
//! are dropped afterwards; only leaves that require grad receive a deposit in
//! their `grad` slot.

use super::function::Function;
use super::graph::{topological_sort, NodeId};
use crate::backend::TensorBackend;
use crate::error::TensorGradError;
use crate::storage::Storage;
use crate::tensor::Tensor;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Sums `grad` over the dimensions that broadcasting expanded so that it
/// matches `target`.
///
/// Leading dimensions missing from `target` are summed away, as are dimensions
/// where `target` has size 1 and `grad` does not.
pub fn reduce_to_shape(
    backend: &dyn TensorBackend,
    grad: Storage,
    target: &[usize],
) -> Result<Storage, TensorGradError> {
    if grad.shape() == target {
        return Ok(grad);
    }
    let mismatch = || TensorGradError::ShapeMismatch {
        expected: target.to_vec(),
        actual: grad.shape().to_vec(),
        operation: "reduce_to_shape".to_string(),
    };
    let rank_diff = grad.rank().checked_sub(target.len()).ok_or_else(mismatch)?;

    let mut reduced = grad.clone();
    for dim in 0..grad.rank() {
        let collapse = if dim < rank_diff {
            true
        } else {
            let wanted = target[dim - rank_diff];
            if wanted == grad.shape()[dim] {
                false
            } else if wanted == 1 {
                true
            } else {
                return Err(mismatch());
            }
        };
        if collapse {
            reduced = backend.reduce(&|acc, x| acc + x, &reduced, dim, 0.0)?;
        }
    }

    if !reduced.is_contiguous() {
        reduced = backend.map(&|x| x, &reduced);
    }
    reduced.view(target)
}

/// Propagates `seed` (dL/d`root`) through the graph behind `root`.
pub(crate) fn run_backward(root: &Tensor, seed: Storage) -> Result<(), TensorGradError> {
    let sorted = topological_sort(root);
    log::debug!("backward: {} node(s) reachable from root", sorted.len());

    let mut grads: HashMap<NodeId, Storage> = HashMap::new();
    grads.insert(root.node_id(), seed);

    for node in &sorted {
        // Nothing flowed here (every path to it went through non-tracking nodes).
        let Some(grad) = grads.remove(&node.node_id()) else {
            continue;
        };

        let Some(history) = node.history() else {
            if node.requires_grad() {
                node.accumulate_grad(grad)?;
            }
            continue;
        };

        let backend = node.backend();
        let input_grads = history
            .op
            .backward(&history.ctx, backend.as_ref(), &grad)?
            .into_vec();
        log::trace!(
            "backward: {} -> {} input gradient(s)",
            history.op.name(),
            input_grads.len()
        );
        if input_grads.len() != history.inputs.len() {
            return Err(TensorGradError::ArityMismatch {
                operation: history.op.name().to_string(),
                expected: history.inputs.len(),
                actual: input_grads.len(),
            });
        }

        for (input, input_grad) in history.inputs.iter().zip(input_grads) {
            if !input.requires_grad() {
                continue;
            }
            let input_grad = reduce_to_shape(backend.as_ref(), input_grad, &input.shape())?;
            match grads.entry(input.node_id()) {
                Entry::Occupied(mut slot) => {
                    let summed = backend.zip(&|a, b| a + b, slot.get(), &input_grad)?;
                    slot.insert(summed);
                }
                Entry::Vacant(slot) => {
                    slot.insert(input_grad);
                }
            }
        }
    }

    log::debug!("backward: done");
    Ok(())
}

#[cfg(test)]
#[path = "backward_test.rs"]
mod tests;
