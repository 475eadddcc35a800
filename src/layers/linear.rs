use rand::Rng;

use super::reset_uniform;
use crate::math::Matrix;

// Affine projection `x W + b`. The weight is stored `in_dim x out_dim` so a
// batch of row vectors multiplies it directly, and the bias is a single row
// broadcast over the batch.

pub struct Linear {
    pub w: Matrix,
    pub b: Matrix,
}

impl Linear {
    pub fn new(in_dim: usize, out_dim: usize) -> Self {
        Self {
            w: Matrix::zeros(in_dim, out_dim),
            b: Matrix::zeros(1, out_dim),
        }
    }

    pub fn forward(&self, x: &Matrix) -> Matrix {
        Matrix::matmul(x, &self.w).add_row(&self.b)
    }

    pub fn reset_parameters<R: Rng + ?Sized>(&mut self, bound: f32, rng: &mut R) {
        reset_uniform(&mut self.w, bound, rng);
        reset_uniform(&mut self.b, bound, rng);
    }

    pub fn parameters(&self) -> Vec<(&'static str, &Matrix)> {
        vec![("weight", &self.w), ("bias", &self.b)]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        vec![&mut self.w, &mut self.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn forward_applies_weight_and_bias() {
        let mut lin = Linear::new(2, 2);
        lin.w = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        lin.b = Matrix::from_vec(1, 2, vec![0.5, -0.5]);
        let x = Matrix::from_vec(1, 2, vec![1.0, 1.0]);
        assert_eq!(lin.forward(&x).data, vec![4.5, 5.5]);
    }

    #[test]
    fn reset_covers_weight_and_bias() {
        let mut lin = Linear::new(3, 2);
        lin.reset_parameters(0.05, &mut StdRng::seed_from_u64(6));
        for (name, p) in lin.parameters() {
            assert!(p.data.iter().all(|&v| v != 0.0 && v.abs() <= 0.05), "{name}");
        }
    }
}
