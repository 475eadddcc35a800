#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(r: usize, c: usize) -> Self {
        Matrix {
            rows: r,
            cols: c,
            data: vec![0.0; r * c],
        }
    }

    pub fn from_vec(r: usize, c: usize, v: Vec<f32>) -> Self {
        assert_eq!(v.len(), r * c);
        Matrix {
            rows: r,
            cols: c,
            data: v,
        }
    }

    pub fn get(&self, r: usize, c: usize) -> f32 {
        self.data[r * self.cols + c]
    }

    pub fn set(&mut self, r: usize, c: usize, v: f32) {
        self.data[r * self.cols + c] = v;
    }

    /// Borrow row `r` as a slice.
    pub fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [f32] {
        let cols = self.cols;
        &mut self.data[r * cols..(r + 1) * cols]
    }

    pub fn matmul(a: &Matrix, b: &Matrix) -> Matrix {
        assert_eq!(a.cols, b.rows);
        let mut out = vec![0.0; a.rows * b.cols];
        for i in 0..a.rows {
            let a_row = &a.data[i * a.cols..(i + 1) * a.cols];
            for k in 0..a.cols {
                let a_val = a_row[k];
                let b_row = &b.data[k * b.cols..(k + 1) * b.cols];
                for j in 0..b.cols {
                    out[i * b.cols + j] += a_val * b_row[j];
                }
            }
        }
        Matrix::from_vec(a.rows, b.cols, out)
    }

    pub fn add(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.rows, other.rows);
        assert_eq!(self.cols, other.cols);
        let v = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a + b)
            .collect();
        Matrix::from_vec(self.rows, self.cols, v)
    }

    /// Add a `1 x cols` row vector to every row.
    pub fn add_row(&self, bias: &Matrix) -> Matrix {
        assert_eq!(bias.rows, 1);
        assert_eq!(bias.cols, self.cols);
        let mut out = self.clone();
        for r in 0..out.rows {
            for (v, b) in out.row_mut(r).iter_mut().zip(bias.data.iter()) {
                *v += b;
            }
        }
        out
    }

    pub fn map_inplace<F: Fn(f32) -> f32>(&mut self, f: F) {
        for v in self.data.iter_mut() {
            *v = f(*v);
        }
    }

    /// Elementwise product.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.rows, other.rows);
        assert_eq!(self.cols, other.cols);
        let v = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .collect();
        Matrix::from_vec(self.rows, self.cols, v)
    }

    /// Copy of the column range `start..start + len`.
    pub fn columns(&self, start: usize, len: usize) -> Matrix {
        assert!(start + len <= self.cols);
        let mut v = Vec::with_capacity(self.rows * len);
        for r in 0..self.rows {
            v.extend_from_slice(&self.row(r)[start..start + len]);
        }
        Matrix::from_vec(self.rows, len, v)
    }

    pub fn exp(&self) -> Matrix {
        let mut out = self.clone();
        out.map_inplace(f32::exp);
        out
    }

    /// Row-wise log-softmax, shifted by the row maximum so large logits
    /// cannot overflow.
    pub fn log_softmax(&self) -> Matrix {
        let mut out = self.clone();
        for r in 0..out.rows {
            let row = out.row_mut(r);
            let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let sum: f32 = row.iter().map(|v| (v - max).exp()).sum();
            let log_z = max + sum.ln();
            for v in row.iter_mut() {
                *v -= log_z;
            }
        }
        out
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matmul_small() {
        let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = Matrix::from_vec(3, 1, vec![1.0, 0.0, -1.0]);
        let c = Matrix::matmul(&a, &b);
        assert_eq!(c.data, vec![-2.0, -2.0]);
    }

    #[test]
    fn add_row_broadcasts_bias() {
        let m = Matrix::zeros(2, 2);
        let b = Matrix::from_vec(1, 2, vec![0.5, -1.0]);
        assert_eq!(m.add_row(&b).data, vec![0.5, -1.0, 0.5, -1.0]);
    }

    #[test]
    fn log_softmax_rows_sum_to_one() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 1000.0, 0.0, -1000.0]);
        let ls = m.log_softmax();
        for r in 0..ls.rows {
            let sum: f32 = ls.row(r).iter().map(|v| v.exp()).sum();
            assert!((sum - 1.0).abs() < 1e-6);
            assert!(ls.row(r).iter().all(|v| v.is_finite() || *v == f32::NEG_INFINITY));
        }
    }

    #[test]
    fn columns_slices_block() {
        let m = Matrix::from_vec(2, 4, (0..8).map(|v| v as f32).collect());
        let c = m.columns(1, 2);
        assert_eq!(c.data, vec![1.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-7);
    }
}
