//! Central-difference validation of the backward engine.

use crate::error::TensorGradError;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

/// Tunables for [`check_grad`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Half-width of the central difference.
    pub epsilon: f64,
    pub rtol: f64,
    pub atol: f64,
    /// Seeds the index sampler so failures reproduce.
    pub seed: u64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        GradCheckConfig {
            epsilon: 1e-6,
            rtol: 1e-2,
            atol: 1e-2,
            seed: 10,
        }
    }
}

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Derivative check failed for function {function}.\nInputs: {inputs}\nReceived derivative {analytic} for argument {arg} at index {index:?}, but numerical derivative is {numeric}.")]
    GradientMismatch {
        function: String,
        inputs: String,
        arg: usize,
        index: Vec<usize>,
        analytic: f64,
        numeric: f64,
    },

    #[error("Input {arg} requires grad but has no gradient after backward.")]
    MissingGradient { arg: usize },

    #[error("Tensor error during gradient check: {0}")]
    Tensor(#[from] TensorGradError),
}

/// Estimates d(sum f(inputs)) / d(inputs[arg][index]) by central difference.
///
/// Perturbed copies are untracked, so this never touches the inputs' graph state.
pub fn grad_central_difference<F>(
    f: &F,
    inputs: &[Tensor],
    arg: usize,
    index: &[usize],
    epsilon: f64,
) -> Result<f64, TensorGradError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorGradError>,
{
    let target = inputs.get(arg).ok_or(TensorGradError::IndexOutOfBounds {
        index: vec![arg],
        shape: vec![inputs.len()],
    })?;
    let storage = target.storage();
    let value = storage.get(index)?;

    let evaluate = |x: f64| -> Result<f64, TensorGradError> {
        let perturbed = Tensor::from_storage(storage.with_element(index, x)?, target.backend());
        let args: Vec<Tensor> = inputs
            .iter()
            .enumerate()
            .map(|(i, t)| if i == arg { perturbed.clone() } else { t.detach() })
            .collect();
        f(&args)?.sum(None)?.item()
    };

    let plus = evaluate(value + epsilon)?;
    let minus = evaluate(value - epsilon)?;
    Ok((plus - minus) / (2.0 * epsilon))
}

fn allclose(analytic: f64, numeric: f64, config: &GradCheckConfig) -> bool {
    (analytic - numeric).abs() <= config.atol + config.rtol * numeric.abs()
}

/// Runs `f(inputs).sum().backward()` after marking every input as requiring
/// grad, leaving the analytic gradients in the inputs' `grad` slots.
fn analytic_pass<F>(f: &F, inputs: &[Tensor]) -> Result<(), TensorGradError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorGradError>,
{
    for input in inputs {
        input.set_requires_grad(true)?;
        input.zero_grad();
    }
    f(inputs)?.sum(None)?.backward()
}

fn compare_at<F>(
    name: &str,
    f: &F,
    inputs: &[Tensor],
    arg: usize,
    index: Vec<usize>,
    config: &GradCheckConfig,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorGradError>,
{
    let grad = inputs[arg]
        .grad()
        .ok_or(GradCheckError::MissingGradient { arg })?;
    let analytic = grad.get(&index)?;
    let numeric = grad_central_difference(f, inputs, arg, &index, config.epsilon)?;
    log::trace!(
        "grad_check {}: arg {} index {:?} analytic={} numeric={}",
        name,
        arg,
        index,
        analytic,
        numeric
    );
    if !allclose(analytic, numeric, config) {
        return Err(GradCheckError::GradientMismatch {
            function: name.to_string(),
            inputs: format!("{:?}", inputs),
            arg,
            index,
            analytic,
            numeric,
        });
    }
    Ok(())
}

/// Compares the engine's gradients with central differences at one sampled
/// index per input.
///
/// Inputs must be leaves; they are switched to `requires_grad` and their
/// gradients are reset before the check. The sampled indices depend only on
/// `config.seed` and the input shapes.
pub fn check_grad<F>(
    name: &str,
    f: F,
    inputs: &[Tensor],
    config: &GradCheckConfig,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorGradError>,
{
    analytic_pass(&f, inputs)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    for (arg, input) in inputs.iter().enumerate() {
        let Some(index) = input.storage().sample(&mut rng) else {
            continue;
        };
        compare_at(name, &f, inputs, arg, index, config)?;
    }
    log::debug!("grad_check {}: passed", name);
    Ok(())
}

/// Like [`check_grad`], but checks every element of every input.
pub fn check_grad_exhaustive<F>(
    name: &str,
    f: F,
    inputs: &[Tensor],
    config: &GradCheckConfig,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorGradError>,
{
    analytic_pass(&f, inputs)?;
    for (arg, input) in inputs.iter().enumerate() {
        let indices: Vec<Vec<usize>> = input.storage().indices().collect();
        for index in indices {
            compare_at(name, &f, inputs, arg, index, config)?;
        }
    }
    log::debug!("grad_check {} (exhaustive): passed", name);
    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
