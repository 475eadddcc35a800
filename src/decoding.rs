use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::GeneratorError;
use crate::math::Matrix;

/// Draw one column index per row of `log_probs`, with probability
/// proportional to the exponentiated row.
pub fn sample_categorical<R: Rng + ?Sized>(
    log_probs: &Matrix,
    rng: &mut R,
) -> Result<Vec<usize>, GeneratorError> {
    let probs = log_probs.exp();
    let mut out = Vec::with_capacity(probs.rows);
    for r in 0..probs.rows {
        let dist = WeightedIndex::<f32>::new(probs.row(r))
            .map_err(|_| GeneratorError::InvalidDistribution { row: r })?;
        out.push(dist.sample(rng));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn one_hot_rows_are_always_drawn() {
        let mut rng = StdRng::seed_from_u64(9);
        let lp = Matrix::from_vec(
            2,
            3,
            vec![f32::NEG_INFINITY, 0.0, f32::NEG_INFINITY, 0.0, f32::NEG_INFINITY, f32::NEG_INFINITY],
        );
        for _ in 0..20 {
            assert_eq!(sample_categorical(&lp, &mut rng).unwrap(), vec![1, 0]);
        }
    }

    #[test]
    fn draws_follow_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        let lp = Matrix::from_vec(1, 2, vec![0.9f32.ln(), 0.1f32.ln()]);
        let n = 4000;
        let zeros = (0..n)
            .filter(|_| sample_categorical(&lp, &mut rng).unwrap()[0] == 0)
            .count();
        let frac = zeros as f32 / n as f32;
        assert!((frac - 0.9).abs() < 0.03, "fraction {frac}");
    }

    #[test]
    fn massless_row_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let lp = Matrix::from_vec(1, 2, vec![f32::NEG_INFINITY, f32::NEG_INFINITY]);
        assert_eq!(
            sample_categorical(&lp, &mut rng).unwrap_err(),
            GeneratorError::InvalidDistribution { row: 0 }
        );
    }
}
