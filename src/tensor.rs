use crate::math::Matrix;

/// N-dimensional tensor backed by a flat `Vec<f32>`.
///
/// Most of the crate works on the 2-D [`Matrix`]; the tensor exists for
/// values whose rank matters to callers, such as the `(layers, batch,
/// hidden)` recurrent state.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    /// Tensor elements in row-major order.
    pub data: Vec<f32>,
    /// Sizes for each dimension.
    pub shape: Vec<usize>,
}

impl Tensor {
    /// Take ownership of a [`Matrix`] while recording its two dimensional
    /// shape.
    pub fn from_matrix(m: Matrix) -> Self {
        Tensor {
            shape: vec![m.rows, m.cols],
            data: m.data,
        }
    }

    /// Create a tensor of zeros with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len: usize = shape.iter().product();
        Tensor {
            data: vec![0.0; len],
            shape,
        }
    }

    /// Change the view of the underlying data without modifying order.
    /// The new shape must contain the same number of elements.
    pub fn reshape(&mut self, new_shape: Vec<usize>) {
        assert_eq!(self.data.len(), new_shape.iter().product::<usize>());
        self.shape = new_shape;
    }

    /// Collapse every leading dimension into rows, keeping the last one as
    /// columns. A `(1, b, h)` tensor becomes a `b x h` matrix.
    pub fn to_matrix(&self) -> Matrix {
        let cols = self.shape.last().copied().unwrap_or(0);
        let rows = if cols == 0 { 0 } else { self.data.len() / cols };
        Matrix::from_vec(rows, cols, self.data.clone())
    }
}
