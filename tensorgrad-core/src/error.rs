use thiserror::Error;

/// Custom error type for the tensorgrad engine.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum TensorGradError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Operation {operation} requires a contiguous tensor, got shape {shape:?} with strides {strides:?}")]
    ContiguityViolation {
        operation: String,
        shape: Vec<usize>,
        strides: Vec<usize>,
    },

    #[error("Invalid permutation: dims {dims:?} are not a valid permutation for rank {rank}")]
    InvalidPermutation { dims: Vec<usize>, rank: usize },

    #[error("Invalid axis {axis} for tensor of rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Operation {operation} expects {expected} input(s), got {actual}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    /// Saved backward state does not match what the variant stored in forward.
    /// Only reachable through an internal defect.
    #[error("Saved state for {operation} does not match: expected {expected}, found {found}")]
    SavedStateArity {
        operation: String,
        expected: String,
        found: String,
    },

    #[error("Operation {0} is not differentiable")]
    NotDifferentiable(String),

    #[error("Backward called on non-scalar tensor without explicit gradient.")]
    BackwardNonScalar,

    #[error("Operation requires tensor to require grad, but it doesn't.")]
    RequiresGradNotMet,

    #[error("requires_grad can only be changed on leaf tensors.")]
    RequiresGradOnNonLeaf,
}
