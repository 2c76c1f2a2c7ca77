use crate::error::TensorGradError;
use std::cmp::max;

/// Calculates the strides for a given shape.
/// Strides represent the number of elements to skip in the flattened data array
/// to move one step along each dimension.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Determines the output shape resulting from broadcasting two input shapes.
///
/// Follows NumPy/PyTorch broadcasting rules:
/// 1. If the shapes have different numbers of dimensions, prepend 1s to the shorter shape.
/// 2. Compare dimensions element-wise from right to left.
/// 3. Dimensions are compatible if they are equal, or one of them is 1.
/// 4. The resulting dimension size is the other dimension when one of them is 1.
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>, TensorGradError> {
    let rank_a = shape_a.len();
    let rank_b = shape_b.len();
    let max_rank = max(rank_a, rank_b);
    let mut result_shape = vec![0; max_rank];

    for i in 0..max_rank {
        let dim_a = if i < rank_a { shape_a[rank_a - 1 - i] } else { 1 };
        let dim_b = if i < rank_b { shape_b[rank_b - 1 - i] } else { 1 };

        result_shape[max_rank - 1 - i] = if dim_a == dim_b || dim_b == 1 {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else {
            return Err(TensorGradError::BroadcastError {
                shape1: shape_a.to_vec(),
                shape2: shape_b.to_vec(),
            });
        };
    }
    Ok(result_shape)
}

/// Converts a row-major linear index into a coordinate for `shape`.
pub fn index_to_coord(index: usize, shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0; shape.len()];
    let mut remaining = index;
    for i in (0..shape.len()).rev() {
        let dim = shape[i];
        if dim == 0 {
            return coord;
        }
        coord[i] = remaining % dim;
        remaining /= dim;
    }
    coord
}

/// Maps a coordinate of a broadcast output back onto an operand of `operand_shape`.
///
/// Leading output dimensions the operand does not have are dropped, and dimensions
/// where the operand has size 1 are pinned to 0.
pub fn broadcast_index(out_coord: &[usize], operand_shape: &[usize]) -> Vec<usize> {
    let rank_diff = out_coord.len().saturating_sub(operand_shape.len());
    operand_shape
        .iter()
        .enumerate()
        .map(|(i, &dim)| if dim == 1 { 0 } else { out_coord[rank_diff + i] })
        .collect()
}

/// Checks that `dims` is a permutation of `0..rank`.
pub fn validate_permutation(rank: usize, dims: &[usize]) -> Result<(), TensorGradError> {
    let invalid = || TensorGradError::InvalidPermutation {
        dims: dims.to_vec(),
        rank,
    };
    if dims.len() != rank {
        return Err(invalid());
    }
    let mut seen = vec![false; rank];
    for &d in dims {
        if d >= rank || seen[d] {
            return Err(invalid());
        }
        seen[d] = true;
    }
    Ok(())
}

/// Returns the permutation that undoes `order`.
pub fn inverse_permutation(order: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; order.len()];
    for (i, &axis) in order.iter().enumerate() {
        inverse[axis] = i;
    }
    inverse
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
