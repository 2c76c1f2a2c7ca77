use super::*;
use crate::utils::testing::create_test_tensor_with_grad;

fn position(sorted: &[Tensor], node: &Tensor) -> usize {
    sorted
        .iter()
        .position(|t| t.node_id() == node.node_id())
        .expect("node missing from sort")
}

#[test]
fn test_single_leaf() {
    let x = create_test_tensor_with_grad(vec![1.0], vec![1]);
    let sorted = topological_sort(&x);
    assert_eq!(sorted.len(), 1);
    assert_eq!(sorted[0].node_id(), x.node_id());
}

#[test]
fn test_consumers_precede_inputs() {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let y = x.mul(&x).unwrap();
    let z = y.add(&x).unwrap();
    let w = z.exp().unwrap();

    let sorted = topological_sort(&w);
    assert_eq!(sorted.len(), 4);
    assert_eq!(sorted[0].node_id(), w.node_id());
    assert!(position(&sorted, &z) < position(&sorted, &y));
    assert!(position(&sorted, &y) < position(&sorted, &x));
    assert!(position(&sorted, &z) < position(&sorted, &x));
}

#[test]
fn test_diamond_visits_shared_node_once() {
    let x = create_test_tensor_with_grad(vec![0.5], vec![1]);
    let a = x.exp().unwrap();
    let b = a.neg().unwrap();
    let c = a.sigmoid().unwrap();
    let d = b.mul(&c).unwrap();

    let sorted = topological_sort(&d);
    assert_eq!(sorted.len(), 5);
    let pos_a = position(&sorted, &a);
    assert!(position(&sorted, &b) < pos_a);
    assert!(position(&sorted, &c) < pos_a);
    assert!(pos_a < position(&sorted, &x));
}

#[test]
fn test_untracked_inputs_are_not_followed() {
    let x = create_test_tensor_with_grad(vec![1.0], vec![1]);
    let constant = crate::tensor::create::full(&[1], 2.0);
    let y = constant.exp().unwrap();
    let z = x.mul(&y).unwrap();

    let sorted = topological_sort(&z);
    // `y` was built without tracking, so it is a leaf here.
    assert_eq!(sorted.len(), 3);
    assert!(y.history().is_none());
    assert!(sorted.iter().all(|t| t.node_id() != constant.node_id()));
}

#[test]
fn test_long_chain() {
    let x = create_test_tensor_with_grad(vec![1.0], vec![1]);
    let mut y = x.clone();
    for _ in 0..200 {
        y = y.neg().unwrap();
    }
    let sorted = topological_sort(&y);
    assert_eq!(sorted.len(), 201);
    assert_eq!(sorted[200].node_id(), x.node_id());
}
