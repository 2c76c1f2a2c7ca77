use super::*;
use crate::error::TensorGradError;

#[test]
fn test_calculate_strides() {
    assert_eq!(calculate_strides(&[2, 3]), vec![3, 1]);
    assert_eq!(calculate_strides(&[2, 2, 2]), vec![4, 2, 1]);
    assert_eq!(calculate_strides(&[5]), vec![1]);
    assert!(calculate_strides(&[]).is_empty());
}

#[test]
fn test_broadcast_shapes_compatible() {
    assert_eq!(broadcast_shapes(&[2, 3], &[3]).unwrap(), vec![2, 3]);
    assert_eq!(broadcast_shapes(&[2, 1], &[1, 4]).unwrap(), vec![2, 4]);
    assert_eq!(broadcast_shapes(&[4, 1, 3], &[2, 1]).unwrap(), vec![4, 2, 3]);
    assert_eq!(broadcast_shapes(&[1], &[3, 3]).unwrap(), vec![3, 3]);
}

#[test]
fn test_broadcast_shapes_incompatible() {
    let result = broadcast_shapes(&[2, 3], &[2, 2]);
    assert_eq!(
        result,
        Err(TensorGradError::BroadcastError {
            shape1: vec![2, 3],
            shape2: vec![2, 2],
        })
    );
}

#[test]
fn test_index_to_coord() {
    assert_eq!(index_to_coord(0, &[2, 3]), vec![0, 0]);
    assert_eq!(index_to_coord(4, &[2, 3]), vec![1, 1]);
    assert_eq!(index_to_coord(23, &[2, 3, 4]), vec![1, 2, 3]);
}

#[test]
fn test_broadcast_index() {
    assert_eq!(broadcast_index(&[1, 2], &[3]), vec![2]);
    assert_eq!(broadcast_index(&[1, 2], &[1, 3]), vec![0, 2]);
    assert_eq!(broadcast_index(&[1, 2], &[2, 1]), vec![1, 0]);
}

#[test]
fn test_validate_permutation() {
    assert!(validate_permutation(3, &[2, 0, 1]).is_ok());
    assert!(matches!(
        validate_permutation(2, &[0, 0]),
        Err(TensorGradError::InvalidPermutation { .. })
    ));
    assert!(validate_permutation(2, &[0, 2]).is_err());
    assert!(validate_permutation(2, &[0]).is_err());
}

#[test]
fn test_inverse_permutation() {
    let order = [2, 0, 1];
    let inverse = inverse_permutation(&order);
    assert_eq!(inverse, vec![1, 2, 0]);
    assert_eq!(inverse_permutation(&inverse), order.to_vec());
}
