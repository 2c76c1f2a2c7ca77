use super::TensorBackend;
use crate::error::TensorGradError;
use crate::storage::utils::{broadcast_index, broadcast_shapes, index_to_coord};
use crate::storage::Storage;

/// Straightforward strided-loop kernels on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl TensorBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn map(&self, f: &dyn Fn(f64) -> f64, a: &Storage) -> Storage {
        let data = a.to_vec().into_iter().map(f).collect();
        Storage::from_contiguous(data, a.shape.clone())
    }

    fn zip(
        &self,
        f: &dyn Fn(f64, f64) -> f64,
        a: &Storage,
        b: &Storage,
    ) -> Result<Storage, TensorGradError> {
        let output_shape = broadcast_shapes(&a.shape, &b.shape)?;
        let numel: usize = output_shape.iter().product();
        let mut result = Vec::with_capacity(numel);

        for i in 0..numel {
            let out_coord = index_to_coord(i, &output_shape);
            let val_a = a.buffer[a.position(&broadcast_index(&out_coord, &a.shape))];
            let val_b = b.buffer[b.position(&broadcast_index(&out_coord, &b.shape))];
            result.push(f(val_a, val_b));
        }

        Ok(Storage::from_contiguous(result, output_shape))
    }

    fn reduce(
        &self,
        f: &dyn Fn(f64, f64) -> f64,
        a: &Storage,
        dim: usize,
        start: f64,
    ) -> Result<Storage, TensorGradError> {
        if dim >= a.rank() {
            return Err(TensorGradError::InvalidAxis {
                axis: dim,
                rank: a.rank(),
            });
        }
        let mut output_shape = a.shape.clone();
        output_shape[dim] = 1;
        let numel: usize = output_shape.iter().product();
        let mut result = Vec::with_capacity(numel);

        for i in 0..numel {
            let mut coord = index_to_coord(i, &output_shape);
            let mut acc = start;
            for j in 0..a.shape[dim] {
                coord[dim] = j;
                acc = f(acc, a.buffer[a.position(&coord)]);
            }
            result.push(acc);
        }

        Ok(Storage::from_contiguous(result, output_shape))
    }

    fn matrix_multiply(&self, a: &Storage, b: &Storage) -> Result<Storage, TensorGradError> {
        if a.rank() < 2 || b.rank() < 2 {
            return Err(TensorGradError::ShapeMismatch {
                expected: vec![2],
                actual: vec![a.rank().min(b.rank())],
                operation: "matrix_multiply (rank check)".to_string(),
            });
        }
        let (a_batch, a_mat) = a.shape.split_at(a.rank() - 2);
        let (b_batch, b_mat) = b.shape.split_at(b.rank() - 2);
        let (m, k) = (a_mat[0], a_mat[1]);
        let (k_b, n) = (b_mat[0], b_mat[1]);
        if k != k_b {
            return Err(TensorGradError::ShapeMismatch {
                expected: vec![k],
                actual: vec![k_b],
                operation: "matrix_multiply (inner dim)".to_string(),
            });
        }

        let batch_shape = broadcast_shapes(a_batch, b_batch)?;
        let mut output_shape = batch_shape.clone();
        output_shape.extend([m, n]);
        let numel: usize = output_shape.iter().product();
        let mut result = Vec::with_capacity(numel);

        let rank = output_shape.len();
        for i in 0..numel {
            let out_coord = index_to_coord(i, &output_shape);
            let (batch, rc) = out_coord.split_at(rank - 2);
            let (row, col) = (rc[0], rc[1]);

            let mut a_coord = broadcast_index(batch, a_batch);
            a_coord.extend([row, 0]);
            let mut b_coord = broadcast_index(batch, b_batch);
            b_coord.extend([0, col]);
            let a_last = a_coord.len() - 1;
            let b_inner = b_coord.len() - 2;

            let mut acc = 0.0;
            for p in 0..k {
                a_coord[a_last] = p;
                b_coord[b_inner] = p;
                acc += a.buffer[a.position(&a_coord)] * b.buffer[b.position(&b_coord)];
            }
            result.push(acc);
        }

        Ok(Storage::from_contiguous(result, output_shape))
    }
}

#[cfg(test)]
#[path = "cpu_test.rs"]
mod tests;
