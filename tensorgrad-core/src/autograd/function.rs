//! The closed table of differentiable primitives.
//!
//! Every variant of [`Op`] pairs a forward transform on raw storages with the
//! backward transform that maps the output gradient to one gradient per input.
//! Non-tensor parameters (reduction dims, permutation order, target shape) live
//! in the variant itself, so they never appear as differentiable inputs.
//!
//! Backward results may have the broadcast output shape rather than the input
//! shape (e.g. `Mul` with a row vector); the engine sums them back down.

use super::context::{Context, SavedValue};
use crate::backend::TensorBackend;
use crate::error::TensorGradError;
use crate::storage::utils::inverse_permutation;
use crate::storage::Storage;

/// Absolute threshold used by `IsClose`.
pub const IS_CLOSE_TOLERANCE: f64 = 1e-2;

/// Exactly one gradient per tensor input of the operation.
#[derive(Debug, Clone)]
pub enum Gradients {
    Unary(Storage),
    Binary(Storage, Storage),
}

impl Gradients {
    pub fn len(&self) -> usize {
        match self {
            Gradients::Unary(_) => 1,
            Gradients::Binary(..) => 2,
        }
    }

    pub fn into_vec(self) -> Vec<Storage> {
        match self {
            Gradients::Unary(g) => vec![g],
            Gradients::Binary(a, b) => vec![a, b],
        }
    }
}

/// Forward/backward capability shared by every primitive.
pub trait Function {
    fn name(&self) -> &'static str;

    /// Number of tensor inputs the operation consumes.
    fn arity(&self) -> usize;

    /// Computes the output from raw input values, saving into `ctx` whatever
    /// `backward` will need.
    fn forward(
        &self,
        ctx: &mut Context,
        backend: &dyn TensorBackend,
        inputs: &[&Storage],
    ) -> Result<Storage, TensorGradError>;

    /// Maps dL/dOutput to dL/dInput for each input, in input order.
    fn backward(
        &self,
        ctx: &Context,
        backend: &dyn TensorBackend,
        grad_output: &Storage,
    ) -> Result<Gradients, TensorGradError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Neg,
    Inv,
    Add,
    Mul,
    Sigmoid,
    Relu,
    Log,
    Exp,
    /// Sum over `dims` (kept at size 1), or over the flattened tensor when `None`.
    Sum { dims: Option<Vec<usize>> },
    /// Logical AND over `dim`, or over the flattened tensor when `None`.
    All { dim: Option<usize> },
    Lt,
    Eq,
    IsClose,
    Permute { order: Vec<usize> },
    View { shape: Vec<usize> },
    /// Identity that materializes a contiguous copy.
    Copy,
    MatMul,
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn indicator(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn contiguous(backend: &dyn TensorBackend, s: &Storage) -> Storage {
    if s.is_contiguous() {
        s.clone()
    } else {
        backend.map(&|x| x, s)
    }
}

fn flatten(backend: &dyn TensorBackend, s: &Storage) -> Result<Storage, TensorGradError> {
    contiguous(backend, s).view(&[s.numel()])
}

/// Swaps the last two axes (view only).
fn transpose_last(s: &Storage) -> Result<Storage, TensorGradError> {
    let rank = s.rank();
    let mut order: Vec<usize> = (0..rank).collect();
    if rank >= 2 {
        order.swap(rank - 2, rank - 1);
    }
    s.permute(&order)
}

/// Broadcasts `grad` up to `shape`.
fn expand_to(
    backend: &dyn TensorBackend,
    grad: &Storage,
    shape: &[usize],
) -> Result<Storage, TensorGradError> {
    let expanded = backend.zip(&|_, g| g, &Storage::filled(0.0, shape), grad)?;
    if expanded.shape() == shape {
        Ok(expanded)
    } else {
        expanded.view(shape)
    }
}

fn sorted_dims(dims: &[usize], rank: usize) -> Result<Vec<usize>, TensorGradError> {
    let mut processed = dims.to_vec();
    if let Some(&axis) = processed.iter().find(|&&d| d >= rank) {
        return Err(TensorGradError::InvalidAxis { axis, rank });
    }
    processed.sort_unstable();
    processed.dedup();
    Ok(processed)
}

impl Op {
    fn check_arity(&self, inputs: &[&Storage]) -> Result<(), TensorGradError> {
        if inputs.len() != self.arity() {
            return Err(TensorGradError::ArityMismatch {
                operation: self.name().to_string(),
                expected: self.arity(),
                actual: inputs.len(),
            });
        }
        Ok(())
    }
}

impl Function for Op {
    fn name(&self) -> &'static str {
        match self {
            Op::Neg => "neg",
            Op::Inv => "inv",
            Op::Add => "add",
            Op::Mul => "mul",
            Op::Sigmoid => "sigmoid",
            Op::Relu => "relu",
            Op::Log => "log",
            Op::Exp => "exp",
            Op::Sum { .. } => "sum",
            Op::All { .. } => "all",
            Op::Lt => "lt",
            Op::Eq => "eq",
            Op::IsClose => "is_close",
            Op::Permute { .. } => "permute",
            Op::View { .. } => "view",
            Op::Copy => "copy",
            Op::MatMul => "matmul",
        }
    }

    fn arity(&self) -> usize {
        match self {
            Op::Add | Op::Mul | Op::Lt | Op::Eq | Op::IsClose | Op::MatMul => 2,
            _ => 1,
        }
    }

    fn forward(
        &self,
        ctx: &mut Context,
        backend: &dyn TensorBackend,
        inputs: &[&Storage],
    ) -> Result<Storage, TensorGradError> {
        self.check_arity(inputs)?;
        let a = inputs[0];

        match self {
            Op::Neg => Ok(backend.map(&|x| -x, a)),
            Op::Inv => {
                ctx.save_for_backward([SavedValue::Storage(a.clone())]);
                Ok(backend.map(&|x| 1.0 / x, a))
            }
            Op::Add => backend.zip(&|x, y| x + y, a, inputs[1]),
            Op::Mul => {
                let b = inputs[1];
                ctx.save_for_backward([SavedValue::Storage(a.clone()), SavedValue::Storage(b.clone())]);
                backend.zip(&|x, y| x * y, a, b)
            }
            Op::Sigmoid => {
                let out = backend.map(&sigmoid, a);
                ctx.save_for_backward([SavedValue::Storage(out.clone())]);
                Ok(out)
            }
            Op::Relu => {
                ctx.save_for_backward([SavedValue::Storage(a.clone())]);
                Ok(backend.map(&|x| if x > 0.0 { x } else { 0.0 }, a))
            }
            Op::Log => {
                ctx.save_for_backward([SavedValue::Storage(a.clone())]);
                Ok(backend.map(&f64::ln, a))
            }
            Op::Exp => {
                let out = backend.map(&f64::exp, a);
                ctx.save_for_backward([SavedValue::Storage(out.clone())]);
                Ok(out)
            }
            Op::Sum { dims } => {
                ctx.save_for_backward([SavedValue::Shape(a.shape().to_vec())]);
                match dims {
                    None => backend.reduce(&|acc, x| acc + x, &flatten(backend, a)?, 0, 0.0),
                    Some(dims) => {
                        let mut result = a.clone();
                        for dim in sorted_dims(dims, a.rank())? {
                            result = backend.reduce(&|acc, x| acc + x, &result, dim, 0.0)?;
                        }
                        Ok(result)
                    }
                }
            }
            Op::All { dim } => {
                let and = |acc: f64, x: f64| indicator(acc != 0.0 && x != 0.0);
                match dim {
                    None => backend.reduce(&and, &flatten(backend, a)?, 0, 1.0),
                    Some(dim) => backend.reduce(&and, a, *dim, 1.0),
                }
            }
            Op::Lt | Op::Eq | Op::IsClose => {
                let b = inputs[1];
                ctx.save_for_backward([
                    SavedValue::Shape(a.shape().to_vec()),
                    SavedValue::Shape(b.shape().to_vec()),
                ]);
                match self {
                    Op::Lt => backend.zip(&|x, y| indicator(x < y), a, b),
                    Op::Eq => backend.zip(&|x, y| indicator(x == y), a, b),
                    _ => backend.zip(&|x, y| indicator((x - y).abs() < IS_CLOSE_TOLERANCE), a, b),
                }
            }
            Op::Permute { order } => {
                let out = a.permute(order)?;
                ctx.save_for_backward([SavedValue::Order(order.clone())]);
                Ok(out)
            }
            Op::View { shape } => {
                let out = a.view(shape)?;
                ctx.save_for_backward([SavedValue::Shape(a.shape().to_vec())]);
                Ok(out)
            }
            Op::Copy => Ok(backend.map(&|x| x, a)),
            Op::MatMul => {
                let b = inputs[1];
                ctx.save_for_backward([SavedValue::Storage(a.clone()), SavedValue::Storage(b.clone())]);
                backend.matrix_multiply(a, b)
            }
        }
    }

    fn backward(
        &self,
        ctx: &Context,
        backend: &dyn TensorBackend,
        grad_output: &Storage,
    ) -> Result<Gradients, TensorGradError> {
        let name = self.name();
        let g = grad_output;

        let grads = match self {
            Op::Neg => Gradients::Unary(backend.map(&|x| -x, g)),
            Op::Inv => {
                let a = ctx.storage(name, 0)?;
                Gradients::Unary(backend.zip(&|x, d| d * (-1.0 / (x * x)), a, g)?)
            }
            Op::Add => Gradients::Binary(g.clone(), g.clone()),
            Op::Mul => {
                let a = ctx.storage(name, 0)?;
                let b = ctx.storage(name, 1)?;
                Gradients::Binary(
                    backend.zip(&|d, y| d * y, g, b)?,
                    backend.zip(&|d, x| d * x, g, a)?,
                )
            }
            Op::Sigmoid => {
                let out = ctx.storage(name, 0)?;
                Gradients::Unary(backend.zip(&|s, d| d * s * (1.0 - s), out, g)?)
            }
            Op::Relu => {
                let a = ctx.storage(name, 0)?;
                Gradients::Unary(backend.zip(&|x, d| if x > 0.0 { d } else { 0.0 }, a, g)?)
            }
            Op::Log => {
                let a = ctx.storage(name, 0)?;
                Gradients::Unary(backend.zip(&|x, d| d / x, a, g)?)
            }
            Op::Exp => {
                let out = ctx.storage(name, 0)?;
                Gradients::Unary(backend.zip(&|e, d| d * e, out, g)?)
            }
            Op::Sum { .. } => {
                let input_shape = ctx.shape(name, 0)?;
                Gradients::Unary(expand_to(backend, g, input_shape)?)
            }
            Op::All { .. } => return Err(TensorGradError::NotDifferentiable(name.to_string())),
            Op::Lt | Op::Eq | Op::IsClose => {
                // Comparisons carry no signal; zeros follow each input's own shape.
                let a_shape = ctx.shape(name, 0)?;
                let b_shape = ctx.shape(name, 1)?;
                Gradients::Binary(Storage::filled(0.0, a_shape), Storage::filled(0.0, b_shape))
            }
            Op::Permute { .. } => {
                let order = ctx.order(name, 0)?;
                Gradients::Unary(g.permute(&inverse_permutation(order))?)
            }
            Op::View { .. } => {
                let original = ctx.shape(name, 0)?;
                Gradients::Unary(contiguous(backend, g).view(original)?)
            }
            Op::Copy => Gradients::Unary(g.clone()),
            Op::MatMul => {
                let a = ctx.storage(name, 0)?;
                let b = ctx.storage(name, 1)?;
                Gradients::Binary(
                    backend.matrix_multiply(g, &transpose_last(b)?)?,
                    backend.matrix_multiply(&transpose_last(a)?, g)?,
                )
            }
        };
        Ok(grads)
    }
}

#[cfg(test)]
#[path = "function_test.rs"]
mod tests;
