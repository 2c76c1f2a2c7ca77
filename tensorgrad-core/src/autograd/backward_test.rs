use super::*;
use crate::backend::CpuBackend;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

fn storage(data: Vec<f64>, shape: Vec<usize>) -> Storage {
    Storage::new(data, shape).expect("Failed to create test storage")
}

#[test]
fn test_reduce_to_shape_identity() {
    let g = storage(vec![1.0, 2.0], vec![2]);
    let out = reduce_to_shape(&CpuBackend, g, &[2]).unwrap();
    assert_eq!(out.to_vec(), vec![1.0, 2.0]);
}

#[test]
fn test_reduce_to_shape_leading_and_unit_dims() {
    let g = storage((1..=6).map(|x| x as f64).collect(), vec![2, 3]);

    let row = reduce_to_shape(&CpuBackend, g.clone(), &[3]).unwrap();
    assert_eq!(row.shape(), &[3]);
    assert_eq!(row.to_vec(), vec![5.0, 7.0, 9.0]);

    let column = reduce_to_shape(&CpuBackend, g.clone(), &[2, 1]).unwrap();
    assert_eq!(column.shape(), &[2, 1]);
    assert_eq!(column.to_vec(), vec![6.0, 15.0]);

    let scalar = reduce_to_shape(&CpuBackend, g, &[1]).unwrap();
    assert_eq!(scalar.shape(), &[1]);
    assert_eq!(scalar.to_vec(), vec![21.0]);
}

#[test]
fn test_reduce_to_shape_incompatible() {
    let g = storage(vec![0.0; 6], vec![2, 3]);
    assert!(matches!(
        reduce_to_shape(&CpuBackend, g.clone(), &[2]),
        Err(TensorGradError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        reduce_to_shape(&CpuBackend, g, &[1, 2, 3, 4]),
        Err(TensorGradError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_shared_node_accumulates() {
    // y = x * x, dy/dx = 2x
    let x = create_test_tensor_with_grad(vec![3.0], vec![1]);
    let y = x.mul(&x).unwrap();
    y.backward().unwrap();
    check_tensor_near(&x.grad().unwrap(), &[1], &[6.0], 1e-12);
}

#[test]
fn test_diamond_graph() {
    // z = exp(x) * exp(x) + x, dz/dx = 2 exp(2x) + 1
    let x = create_test_tensor_with_grad(vec![0.5], vec![1]);
    let e = x.exp().unwrap();
    let z = e.mul(&e).unwrap().add(&x).unwrap();
    z.backward().unwrap();
    let expected = 2.0 * (1.0f64).exp() + 1.0;
    check_tensor_near(&x.grad().unwrap(), &[1], &[expected], 1e-9);
}

#[test]
fn test_broadcast_gradient_is_reduced() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let b = create_test_tensor_with_grad(vec![10.0, 20.0, 30.0], vec![3]);
    let c = create_test_tensor_with_grad(vec![2.0], vec![1]);
    let out = a.add(&b).unwrap().mul(&c).unwrap().sum(None).unwrap();
    out.backward().unwrap();

    check_tensor_near(&a.grad().unwrap(), &[2, 3], &[2.0; 6], 1e-12);
    check_tensor_near(&b.grad().unwrap(), &[3], &[4.0, 4.0, 4.0], 1e-12);
    // sum(a + b) = 21 + 2 * 60
    check_tensor_near(&c.grad().unwrap(), &[1], &[141.0], 1e-9);
}

#[test]
fn test_non_requiring_inputs_get_nothing() {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let w = create_test_tensor(vec![3.0, 4.0], vec![2]);
    let y = x.mul(&w).unwrap();
    y.sum(None).unwrap().backward().unwrap();

    check_tensor_near(&x.grad().unwrap(), &[2], &[3.0, 4.0], 1e-12);
    assert!(w.grad().is_none());
    // Intermediate nodes keep no gradient.
    assert!(y.grad().is_none());
}

#[test]
fn test_gradients_accumulate_until_zero_grad() {
    let x = create_test_tensor_with_grad(vec![1.0, -1.0], vec![2]);
    let loss = x.mul(&x).unwrap().sum(None).unwrap();
    loss.backward().unwrap();
    loss.backward().unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2], &[4.0, -4.0], 1e-12);

    x.zero_grad();
    assert!(x.grad().is_none());
    loss.backward().unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2], &[2.0, -2.0], 1e-12);
}

#[test]
fn test_comparisons_give_zero_gradients() {
    let a = create_test_tensor_with_grad(vec![1.0, 5.0, 3.0], vec![3]);
    let b = create_test_tensor_with_grad(vec![2.0], vec![1]);
    let out = a.lt(&b).unwrap().sum(None).unwrap();
    out.backward().unwrap();
    check_tensor_near(&a.grad().unwrap(), &[3], &[0.0; 3], 0.0);
    check_tensor_near(&b.grad().unwrap(), &[1], &[0.0], 0.0);
}

#[test]
fn test_all_is_not_differentiable() {
    let a = create_test_tensor_with_grad(vec![1.0, 1.0], vec![2]);
    let out = a.all(None).unwrap();
    assert_eq!(
        out.backward(),
        Err(TensorGradError::NotDifferentiable("all".to_string()))
    );
}

#[test]
fn test_explicit_seed() {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let y = x.mul(&x).unwrap();
    let seed = create_test_tensor(vec![1.0, 0.5], vec![2]);
    y.backward_with_grad(&seed).unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2], &[2.0, 2.0], 1e-12);
}
