use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::collections::HashSet;
use std::sync::RwLock;

/// Node identity: the address of the shared `TensorData`, stable across `Tensor` clones.
pub type NodeId = *const RwLock<TensorData>;

/// Orders every node reachable from `root` through history edges so that each
/// node comes after all of its consumers. `root` is first.
///
/// Depth-first post-order, reversed. Each node appears once no matter how many
/// consumers reference it. Uses an explicit stack so long chains cannot overflow.
pub fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut sorted = Vec::new();
    // (node, children already pushed)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            sorted.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let history = node.history();
        stack.push((node, true));
        if let Some(history) = history {
            for input in history.inputs().iter().rev() {
                if !visited.contains(&input.node_id()) {
                    stack.push((input.clone(), false));
                }
            }
        }
    }

    sorted.reverse();
    sorted
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
