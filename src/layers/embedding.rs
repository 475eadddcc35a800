use rand::Rng;

use super::reset_uniform;
use crate::error::GeneratorError;
use crate::math::Matrix;

/// Embedding layer: maps token ids to dense rows of a `vocab_size x dim`
/// table.
pub struct Embedding {
    pub weight: Matrix,
}

impl Embedding {
    /// Zero-filled table; call [`Embedding::reset_parameters`] to draw it.
    pub fn new(vocab_size: usize, dim: usize) -> Self {
        Self {
            weight: Matrix::zeros(vocab_size, dim),
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.weight.rows
    }

    pub fn dim(&self) -> usize {
        self.weight.cols
    }

    /// Gather one table row per token. Output is `tokens.len() x dim`.
    pub fn forward(&self, tokens: &[usize]) -> Result<Matrix, GeneratorError> {
        let mut out = Matrix::zeros(tokens.len(), self.dim());
        for (i, &tok) in tokens.iter().enumerate() {
            if tok >= self.vocab_size() {
                return Err(GeneratorError::TokenOutOfRange {
                    token: tok,
                    vocab_size: self.vocab_size(),
                });
            }
            out.row_mut(i).copy_from_slice(self.weight.row(tok));
        }
        Ok(out)
    }

    pub fn reset_parameters<R: Rng + ?Sized>(&mut self, bound: f32, rng: &mut R) {
        reset_uniform(&mut self.weight, bound, rng);
    }

    pub fn parameters(&self) -> Vec<(&'static str, &Matrix)> {
        vec![("weight", &self.weight)]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        vec![&mut self.weight]
    }
}
