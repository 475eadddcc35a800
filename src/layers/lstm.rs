use rand::Rng;

use super::reset_uniform;
use crate::math::{sigmoid, Matrix};

/// Single-layer, single-direction LSTM.
///
/// Gate pre-activations for all four gates are computed in one product
/// against `hidden_dim * 4` wide matrices, laid out as input, forget, cell
/// and output blocks:
///
/// ```text
/// gates = x W_ih + b_ih + h W_hh + b_hh
/// i, f, o = sigmoid(..)    g = tanh(..)
/// c' = f * c + i * g
/// h' = o * tanh(c')
/// ```
pub struct Lstm {
    pub weight_ih: Matrix,
    pub weight_hh: Matrix,
    pub bias_ih: Matrix,
    pub bias_hh: Matrix,
    hidden_dim: usize,
}

impl Lstm {
    /// Zero-filled weights and biases.
    pub fn new(input_dim: usize, hidden_dim: usize) -> Self {
        let gates = 4 * hidden_dim;
        Self {
            weight_ih: Matrix::zeros(input_dim, gates),
            weight_hh: Matrix::zeros(hidden_dim, gates),
            bias_ih: Matrix::zeros(1, gates),
            bias_hh: Matrix::zeros(1, gates),
            hidden_dim,
        }
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Advance every sequence in the batch by one position.
    ///
    /// `x_t` is `batch x input_dim`; `h_prev` and `c_prev` are
    /// `batch x hidden_dim`. Returns the new `(h, c)`.
    pub fn cell(&self, x_t: &Matrix, h_prev: &Matrix, c_prev: &Matrix) -> (Matrix, Matrix) {
        let gates = Matrix::matmul(x_t, &self.weight_ih)
            .add_row(&self.bias_ih)
            .add(&Matrix::matmul(h_prev, &self.weight_hh).add_row(&self.bias_hh));
        let hd = self.hidden_dim;
        let mut i = gates.columns(0, hd);
        let mut f = gates.columns(hd, hd);
        let mut g = gates.columns(2 * hd, hd);
        let mut o = gates.columns(3 * hd, hd);
        i.map_inplace(sigmoid);
        f.map_inplace(sigmoid);
        g.map_inplace(f32::tanh);
        o.map_inplace(sigmoid);
        let c = f.hadamard(c_prev).add(&i.hadamard(&g));
        let mut tanh_c = c.clone();
        tanh_c.map_inplace(f32::tanh);
        let h = o.hadamard(&tanh_c);
        (h, c)
    }

    /// Run the cell over a whole batch-major sequence. `xs[t]` holds the
    /// inputs of position `t`. Returns the hidden output of every position
    /// and the final `(h, c)`.
    pub fn forward(&self, xs: &[Matrix], h0: Matrix, c0: Matrix) -> (Vec<Matrix>, Matrix, Matrix) {
        let mut h = h0;
        let mut c = c0;
        let mut outs = Vec::with_capacity(xs.len());
        for x_t in xs {
            let (h_t, c_t) = self.cell(x_t, &h, &c);
            outs.push(h_t.clone());
            h = h_t;
            c = c_t;
        }
        (outs, h, c)
    }

    pub fn reset_parameters<R: Rng + ?Sized>(&mut self, bound: f32, rng: &mut R) {
        for p in self.parameters_mut() {
            reset_uniform(p, bound, rng);
        }
    }

    pub fn parameters(&self) -> Vec<(&'static str, &Matrix)> {
        vec![
            ("weight_ih_l0", &self.weight_ih),
            ("weight_hh_l0", &self.weight_hh),
            ("bias_ih_l0", &self.bias_ih),
            ("bias_hh_l0", &self.bias_hh),
        ]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        vec![
            &mut self.weight_ih,
            &mut self.weight_hh,
            &mut self.bias_ih,
            &mut self.bias_hh,
        ]
    }
}
