pub mod embedding;
pub mod linear;
pub mod lstm;

pub use embedding::Embedding;
pub use linear::Linear;
pub use lstm::Lstm;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::math::Matrix;

/// Overwrite every element of `m` independently from
/// `Uniform[-bound, bound]`.
pub fn reset_uniform<R: Rng + ?Sized>(m: &mut Matrix, bound: f32, rng: &mut R) {
    let dist = Uniform::new_inclusive(-bound, bound);
    for v in m.data.iter_mut() {
        *v = dist.sample(rng);
    }
}
