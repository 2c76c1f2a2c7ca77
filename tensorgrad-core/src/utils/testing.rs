use crate::tensor::Tensor;

/// Checks if a tensor matches an expected shape and data within `tolerance`.
/// Panics with the first offending element otherwise.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data = actual.to_vec();
    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Helper to create a tensor for testing purposes.
#[cfg(test)]
pub(crate) fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Failed to create test tensor")
}

/// Helper to create a leaf tensor that requires gradient.
#[cfg(test)]
pub(crate) fn create_test_tensor_with_grad(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    let tensor = Tensor::new(data, shape).expect("Failed to create test tensor with grad");
    tensor
        .set_requires_grad(true)
        .expect("Leaf tensor should accept requires_grad");
    tensor
}
