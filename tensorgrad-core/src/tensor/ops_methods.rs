//! Method surface of `Tensor`. Each method routes through [`Tensor::apply`];
//! composite methods (`sub`, `div`, `gt`, `mean`) chain primitives.

use crate::autograd::Op;
use crate::error::TensorGradError;
use crate::storage::Storage;
use crate::tensor::Tensor;

impl Tensor {
    pub fn neg(&self) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Neg, &[self])
    }

    /// Elementwise reciprocal.
    pub fn inv(&self) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Inv, &[self])
    }

    pub fn add(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Add, &[self, other])
    }

    pub fn sub(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        self.add(&other.neg()?)
    }

    pub fn mul(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Mul, &[self, other])
    }

    pub fn div(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        self.mul(&other.inv()?)
    }

    pub fn sigmoid(&self) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Sigmoid, &[self])
    }

    pub fn relu(&self) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Relu, &[self])
    }

    /// Natural logarithm.
    pub fn log(&self) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Log, &[self])
    }

    pub fn exp(&self) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Exp, &[self])
    }

    /// Sums over `dims`, keeping each reduced dimension at size 1.
    /// With `None`, sums every element into a tensor of shape `[1]`.
    ///
    /// # Errors
    /// `InvalidAxis` if any dim is out of range.
    pub fn sum(&self, dims: Option<&[usize]>) -> Result<Tensor, TensorGradError> {
        Tensor::apply(
            Op::Sum {
                dims: dims.map(<[usize]>::to_vec),
            },
            &[self],
        )
    }

    /// Arithmetic mean over `dims` (or all elements), same shape rules as [`Tensor::sum`].
    pub fn mean(&self, dims: Option<&[usize]>) -> Result<Tensor, TensorGradError> {
        let summed = self.sum(dims)?;
        let shape = self.shape();
        let count: usize = match dims {
            None => shape.iter().product(),
            Some(dims) => {
                let mut unique = dims.to_vec();
                unique.sort_unstable();
                unique.dedup();
                unique.iter().map(|&d| shape[d]).product()
            }
        };
        let scale = Tensor::from_storage(
            Storage::filled(1.0 / count as f64, &[1]),
            self.backend(),
        );
        summed.mul(&scale)
    }

    /// 1.0 where every element along `dim` (or overall) is non-zero, else 0.0.
    /// Not differentiable.
    pub fn all(&self, dim: Option<usize>) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::All { dim }, &[self])
    }

    pub fn lt(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Lt, &[self, other])
    }

    pub fn gt(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        other.lt(self)
    }

    pub fn eq(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::Eq, &[self, other])
    }

    /// 1.0 where `|self - other| < 1e-2`.
    pub fn is_close(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::IsClose, &[self, other])
    }

    /// Reorders dimensions. Shares storage with `self`.
    pub fn permute(&self, order: &[usize]) -> Result<Tensor, TensorGradError> {
        Tensor::apply(
            Op::Permute {
                order: order.to_vec(),
            },
            &[self],
        )
    }

    /// Swaps the last two dimensions.
    pub fn transpose(&self) -> Result<Tensor, TensorGradError> {
        let rank = self.shape().len();
        if rank < 2 {
            return Err(TensorGradError::InvalidAxis { axis: 1, rank });
        }
        let mut order: Vec<usize> = (0..rank).collect();
        order.swap(rank - 2, rank - 1);
        self.permute(&order)
    }

    /// Reinterprets a contiguous tensor with a new shape of equal element count.
    ///
    /// # Errors
    /// `ContiguityViolation` for non-contiguous input (call [`Tensor::contiguous`]
    /// first), `ShapeMismatch` if the element counts differ.
    pub fn view(&self, shape: &[usize]) -> Result<Tensor, TensorGradError> {
        Tensor::apply(
            Op::View {
                shape: shape.to_vec(),
            },
            &[self],
        )
    }

    /// Returns `self` when already contiguous, otherwise a tracked contiguous copy.
    pub fn contiguous(&self) -> Result<Tensor, TensorGradError> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }
        Tensor::apply(Op::Copy, &[self])
    }

    /// Batched matrix product over the last two dimensions.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        Tensor::apply(Op::MatMul, &[self, other])
    }
}
