//! # Primitive backend (`backend`)
//!
//! The autograd core never touches buffers directly. Every forward and backward
//! transform is expressed through the four primitives of [`TensorBackend`]:
//!
//! - `map`: elementwise unary transform, same shape as the input.
//! - `zip`: elementwise binary transform with broadcasting (trailing alignment,
//!   size-1 dimensions expand).
//! - `reduce`: folds one dimension down to size 1.
//! - `matrix_multiply`: batched product over the trailing two dimensions,
//!   broadcasting the leading batch dimensions like `zip`.
//!
//! [`CpuBackend`] is the reference implementation used by default. Alternative
//! (vectorized, accelerated) backends plug in through `Tensor::with_backend`.

use crate::error::TensorGradError;
use crate::storage::Storage;
use std::fmt::Debug;
use std::sync::Arc;

pub mod cpu;

pub use cpu::CpuBackend;

pub trait TensorBackend: Debug + Send + Sync {
    /// Short identifier used in log output.
    fn name(&self) -> &'static str;

    fn map(&self, f: &dyn Fn(f64) -> f64, a: &Storage) -> Storage;

    fn zip(
        &self,
        f: &dyn Fn(f64, f64) -> f64,
        a: &Storage,
        b: &Storage,
    ) -> Result<Storage, TensorGradError>;

    /// Collapses `dim` to size 1 by folding with `f`, starting from `start`.
    fn reduce(
        &self,
        f: &dyn Fn(f64, f64) -> f64,
        a: &Storage,
        dim: usize,
        start: f64,
    ) -> Result<Storage, TensorGradError>;

    fn matrix_multiply(&self, a: &Storage, b: &Storage) -> Result<Storage, TensorGradError>;
}

/// Returns the backend used by tensor builders unless another one is requested.
pub fn default_backend() -> Arc<dyn TensorBackend> {
    Arc::new(CpuBackend)
}
