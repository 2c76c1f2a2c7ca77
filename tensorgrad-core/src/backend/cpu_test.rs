use super::*;

fn storage(data: Vec<f64>, shape: Vec<usize>) -> Storage {
    Storage::new(data, shape).expect("Failed to create test storage")
}

#[test]
fn test_map_preserves_shape_and_materializes() {
    let s = storage(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let t = s.permute(&[1, 0]).unwrap();
    let out = CpuBackend.map(&|x| x * 10.0, &t);
    assert_eq!(out.shape(), &[2, 2]);
    assert!(out.is_contiguous());
    assert_eq!(out.to_vec(), vec![10.0, 30.0, 20.0, 40.0]);
}

#[test]
fn test_zip_broadcasting() {
    let matrix = storage(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let row = storage(vec![10.0, 20.0], vec![1, 2]);
    let out = CpuBackend.zip(&|a, b| a + b, &matrix, &row).unwrap();
    assert_eq!(out.shape(), &[2, 2]);
    assert_eq!(out.to_vec(), vec![11.0, 22.0, 13.0, 24.0]);

    let column = storage(vec![1.0, 2.0], vec![2, 1]);
    let vector = storage(vec![1.0, 2.0, 3.0], vec![3]);
    let out = CpuBackend.zip(&|a, b| a * b, &column, &vector).unwrap();
    assert_eq!(out.shape(), &[2, 3]);
    assert_eq!(out.to_vec(), vec![1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
}

#[test]
fn test_zip_shape_error() {
    let a = storage(vec![1.0, 2.0], vec![2]);
    let b = storage(vec![1.0, 2.0, 3.0], vec![3]);
    let result = CpuBackend.zip(&|x, y| x + y, &a, &b);
    assert!(matches!(result, Err(TensorGradError::BroadcastError { .. })));
}

#[test]
fn test_reduce_keeps_dim() {
    let s = storage(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let rows = CpuBackend.reduce(&|acc, x| acc + x, &s, 1, 0.0).unwrap();
    assert_eq!(rows.shape(), &[2, 1]);
    assert_eq!(rows.to_vec(), vec![6.0, 15.0]);

    let cols = CpuBackend.reduce(&|acc, x| acc * x, &s, 0, 1.0).unwrap();
    assert_eq!(cols.shape(), &[1, 3]);
    assert_eq!(cols.to_vec(), vec![4.0, 10.0, 18.0]);

    assert!(matches!(
        CpuBackend.reduce(&|acc, x| acc + x, &s, 2, 0.0),
        Err(TensorGradError::InvalidAxis { axis: 2, rank: 2 })
    ));
}

#[test]
fn test_matrix_multiply_square_and_non_square() {
    let a = storage(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = storage(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]);
    let out = CpuBackend.matrix_multiply(&a, &b).unwrap();
    assert_eq!(out.to_vec(), vec![19.0, 22.0, 43.0, 50.0]);

    let a = storage(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let b = storage(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], vec![3, 2]);
    let out = CpuBackend.matrix_multiply(&a, &b).unwrap();
    assert_eq!(out.shape(), &[2, 2]);
    assert_eq!(out.to_vec(), vec![58.0, 64.0, 139.0, 154.0]);
}

#[test]
fn test_matrix_multiply_transposed_view() {
    let a = storage(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let a_t = a.permute(&[1, 0]).unwrap();
    let identity = storage(vec![1.0, 0.0, 0.0, 1.0], vec![2, 2]);
    let out = CpuBackend.matrix_multiply(&a_t, &identity).unwrap();
    assert_eq!(out.to_vec(), vec![1.0, 3.0, 2.0, 4.0]);
}

#[test]
fn test_matrix_multiply_batch_broadcast() {
    let a = storage((0..8).map(|x| x as f64).collect(), vec![2, 2, 2]);
    let b = storage(vec![1.0, 0.0, 0.0, 1.0], vec![2, 2]);
    let out = CpuBackend.matrix_multiply(&a, &b).unwrap();
    assert_eq!(out.shape(), &[2, 2, 2]);
    assert_eq!(out.to_vec(), a.to_vec());
}

#[test]
fn test_matrix_multiply_shape_errors() {
    let a = storage(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = storage(vec![5.0, 6.0, 7.0], vec![3, 1]);
    match CpuBackend.matrix_multiply(&a, &b) {
        Err(TensorGradError::ShapeMismatch { operation, .. }) => {
            assert_eq!(operation, "matrix_multiply (inner dim)")
        }
        other => panic!("Expected inner dim ShapeMismatch, got {:?}", other),
    }

    let v = storage(vec![1.0, 2.0], vec![2]);
    match CpuBackend.matrix_multiply(&a, &v) {
        Err(TensorGradError::ShapeMismatch { operation, .. }) => {
            assert_eq!(operation, "matrix_multiply (rank check)")
        }
        other => panic!("Expected rank ShapeMismatch, got {:?}", other),
    }
}
