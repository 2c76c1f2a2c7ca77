//! A reverse-mode automatic differentiation engine over strided `f64` tensors.
//!
//! Every [`Tensor`] is a graph node; operations from the closed [`Op`] table
//! record a [`History`](autograd::History) edge when any input requires grad,
//! and [`Tensor::backward`] walks those edges in reverse topological order to
//! deposit gradients on the leaves.

pub mod autograd;
pub mod backend;
pub mod error;
pub mod storage;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

pub use autograd::grad_check::{check_grad, check_grad_exhaustive, GradCheckConfig, GradCheckError};
pub use autograd::{Function, Op};
pub use backend::{default_backend, CpuBackend, TensorBackend};
pub use error::TensorGradError;
pub use storage::Storage;
pub use tensor::Tensor;
