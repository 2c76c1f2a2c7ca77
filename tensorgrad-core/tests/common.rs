use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tensorgrad_core::Tensor;

// Used from several test crates; each only uses some of these helpers.
#[allow(dead_code)]
pub fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

#[allow(dead_code)]
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Uniform values in `[low, high)`.
#[allow(dead_code)]
pub fn random_tensor(rng: &mut StdRng, shape: &[usize], low: f64, high: f64) -> Tensor {
    let numel = shape.iter().product();
    let data = (0..numel).map(|_| rng.gen_range(low..high)).collect();
    create_test_tensor(data, shape.to_vec())
}

/// Values of magnitude in `[0.1, 1)` with random sign, clear of kinks at zero.
#[allow(dead_code)]
pub fn random_nonzero_tensor(rng: &mut StdRng, shape: &[usize]) -> Tensor {
    let numel = shape.iter().product();
    let data = (0..numel)
        .map(|_| {
            let magnitude = rng.gen_range(0.1..1.0);
            if rng.gen_bool(0.5) {
                magnitude
            } else {
                -magnitude
            }
        })
        .collect();
    create_test_tensor(data, shape.to_vec())
}
