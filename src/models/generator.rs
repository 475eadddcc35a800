use rand::Rng;

use crate::config::GeneratorConfig;
use crate::decoding::sample_categorical;
use crate::device::Device;
use crate::error::GeneratorError;
use crate::layers::{Embedding, Linear, Lstm};
use crate::math::Matrix;
use crate::rng::{rng_from_env, rng_from_seed};
use crate::tensor::Tensor;
use crate::tokens::{TokenBatch, START_TOKEN};

/// Half-width of the uniform distribution every parameter is drawn from.
pub const INIT_RANGE: f32 = 0.05;

/// Hidden and cell state of the recurrent layer for one batch.
///
/// Both tensors have shape `(1, batch_size, hidden_dim)`. The state is a
/// plain value: [`Generator::step`] consumes one and returns the next.
#[derive(Clone, Debug, PartialEq)]
pub struct LstmState {
    pub h: Tensor,
    pub c: Tensor,
    pub device: Device,
}

impl LstmState {
    pub fn zeros(batch_size: usize, hidden_dim: usize, device: Device) -> Self {
        Self {
            h: Tensor::zeros(vec![1, batch_size, hidden_dim]),
            c: Tensor::zeros(vec![1, batch_size, hidden_dim]),
            device,
        }
    }

    fn from_matrices(h: Matrix, c: Matrix, device: Device) -> Self {
        let shape = vec![1, h.rows, h.cols];
        let mut h = Tensor::from_matrix(h);
        let mut c = Tensor::from_matrix(c);
        h.reshape(shape.clone());
        c.reshape(shape);
        Self { h, c, device }
    }

    pub fn batch_size(&self) -> usize {
        self.h.shape.get(1).copied().unwrap_or(0)
    }
}

/// LSTM token generator: embedding, one recurrent layer, a projection to
/// vocabulary logits and a log-softmax.
pub struct Generator {
    embed: Embedding,
    lstm: Lstm,
    fc: Linear,
    device: Device,
}

impl Generator {
    /// Build a generator whose parameters are drawn from a stream seeded by
    /// the `SEED` environment variable.
    pub fn new(
        vocab_size: usize,
        embedding_dim: usize,
        hidden_dim: usize,
        use_cuda: bool,
    ) -> Result<Self, GeneratorError> {
        let mut rng = rng_from_env();
        Self::with_rng(vocab_size, embedding_dim, hidden_dim, use_cuda, &mut rng)
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let mut rng = rng_from_seed(config.seed);
        Self::with_rng(
            config.vocab_size,
            config.embedding_dim,
            config.hidden_dim,
            config.use_cuda,
            &mut rng,
        )
    }

    pub fn with_rng<R: Rng + ?Sized>(
        vocab_size: usize,
        embedding_dim: usize,
        hidden_dim: usize,
        use_cuda: bool,
        rng: &mut R,
    ) -> Result<Self, GeneratorError> {
        for (name, value) in [
            ("vocab_size", vocab_size),
            ("embedding_dim", embedding_dim),
            ("hidden_dim", hidden_dim),
        ] {
            if value == 0 {
                return Err(GeneratorError::InvalidDimension { name, value });
            }
        }
        let device = Device::from_use_cuda(use_cuda);
        if !device.is_available() {
            return Err(GeneratorError::DeviceUnavailable(device));
        }

        let mut generator = Self {
            embed: Embedding::new(vocab_size, embedding_dim),
            lstm: Lstm::new(embedding_dim, hidden_dim),
            fc: Linear::new(hidden_dim, vocab_size),
            device,
        };
        generator.init_params(rng);
        log::info!(
            "generator: vocab {} embedding {} hidden {} ({} parameters) on {}",
            vocab_size,
            embedding_dim,
            hidden_dim,
            generator.num_parameters(),
            device
        );
        Ok(generator)
    }

    pub fn vocab_size(&self) -> usize {
        self.embed.vocab_size()
    }

    pub fn embedding_dim(&self) -> usize {
        self.embed.dim()
    }

    pub fn hidden_dim(&self) -> usize {
        self.lstm.hidden_dim()
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Log-probabilities over the vocabulary for every position of `x`.
    ///
    /// Starts from zero state and feeds the given tokens (teacher forcing).
    /// The result has `batch_size * seq_len` rows; row `b * seq_len + t`
    /// belongs to sequence `b`, position `t`.
    pub fn forward(&self, x: &TokenBatch) -> Result<Matrix, GeneratorError> {
        let (batch_size, seq_len) = x.shape();
        log::debug!("forward over batch {} x {}", batch_size, seq_len);
        let state = self.init_hidden(batch_size);
        let mut xs = Vec::with_capacity(seq_len);
        for t in 0..seq_len {
            xs.push(self.embed.forward(&x.column(t))?);
        }
        let (outs, _, _) = self.lstm.forward(&xs, state.h.to_matrix(), state.c.to_matrix());

        let mut hidden = Matrix::zeros(batch_size * seq_len, self.hidden_dim());
        for (t, h_t) in outs.iter().enumerate() {
            for b in 0..batch_size {
                hidden.row_mut(b * seq_len + t).copy_from_slice(h_t.row(b));
            }
        }
        Ok(self.project(&hidden))
    }

    /// Advance every sequence by one token. `x` holds one token per
    /// sequence. Returns `batch_size x vocab_size` log-probabilities and the
    /// state to pass into the next call.
    pub fn step(&self, x: &[usize], state: LstmState) -> Result<(Matrix, LstmState), GeneratorError> {
        self.check_state(&state, x.len())?;
        let emb = self.embed.forward(x)?;
        let (h, c) = self.lstm.cell(&emb, &state.h.to_matrix(), &state.c.to_matrix());
        let out = self.project(&h);
        Ok((out, LstmState::from_matrices(h, c, self.device)))
    }

    /// Sample `batch_size` sequences of exactly `seq_len` tokens.
    ///
    /// Without a prefix every sequence starts from [`START_TOKEN`] and each
    /// drawn token is fed back as the next input.
    ///
    /// With a prefix the given tokens are fed and recorded unchanged. After
    /// the prefix a token is drawn from the last distribution; each further
    /// position records the previously drawn token, feeds it and draws the
    /// next one. The last draw is not recorded.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        seq_len: usize,
        prefix: Option<&TokenBatch>,
        rng: &mut R,
    ) -> Result<TokenBatch, GeneratorError> {
        let mut columns: Vec<Vec<usize>> = Vec::with_capacity(seq_len);
        let mut state = self.init_hidden(batch_size);

        match prefix {
            None => {
                log::debug!("sampling {} sequences of length {}", batch_size, seq_len);
                let mut x = vec![START_TOKEN; batch_size];
                for _ in 0..seq_len {
                    let (out, next) = self.step(&x, state)?;
                    state = next;
                    x = sample_categorical(&out, rng)?;
                    columns.push(x.clone());
                }
            }
            Some(prefix) => {
                let given_len = prefix.seq_len();
                if prefix.batch_size() != batch_size {
                    return Err(GeneratorError::BatchSizeMismatch {
                        expected: batch_size,
                        found: prefix.batch_size(),
                    });
                }
                if given_len == 0 {
                    return Err(GeneratorError::EmptyPrefix);
                }
                if given_len > seq_len {
                    return Err(GeneratorError::PrefixTooLong { given_len, seq_len });
                }
                log::debug!(
                    "sampling {} sequences of length {} after a prefix of {}",
                    batch_size,
                    seq_len,
                    given_len
                );

                let mut last = None;
                for t in 0..given_len {
                    let col = prefix.column(t);
                    let (out, next) = self.step(&col, state)?;
                    state = next;
                    last = Some(out);
                    columns.push(col);
                }
                let out = last.ok_or(GeneratorError::EmptyPrefix)?;
                let mut x = sample_categorical(&out, rng)?;
                for _ in given_len..seq_len {
                    columns.push(x.clone());
                    let (out, next) = self.step(&x, state)?;
                    state = next;
                    x = sample_categorical(&out, rng)?;
                }
            }
        }

        if columns.is_empty() {
            return TokenBatch::new(batch_size, 0, Vec::new());
        }
        TokenBatch::from_columns(&columns)
    }

    /// Log-probability of each target token under teacher forcing on `x`.
    /// Returns a `batch_size x seq_len` matrix.
    pub fn score(&self, x: &TokenBatch, targets: &TokenBatch) -> Result<Matrix, GeneratorError> {
        let (batch_size, seq_len) = x.shape();
        if targets.batch_size() != batch_size {
            return Err(GeneratorError::BatchSizeMismatch {
                expected: batch_size,
                found: targets.batch_size(),
            });
        }
        if targets.seq_len() != seq_len {
            return Err(GeneratorError::SeqLenMismatch {
                expected: seq_len,
                found: targets.seq_len(),
            });
        }
        if let Some(token) = targets.max_token().filter(|&t| t >= self.vocab_size()) {
            return Err(GeneratorError::TokenOutOfRange {
                token,
                vocab_size: self.vocab_size(),
            });
        }

        let log_probs = self.forward(x)?;
        let mut out = Matrix::zeros(batch_size, seq_len);
        for b in 0..batch_size {
            for t in 0..seq_len {
                out.set(b, t, log_probs.get(b * seq_len + t, targets.get(b, t)));
            }
        }
        Ok(out)
    }

    /// Fresh zero state for `batch_size` sequences on this generator's device.
    pub fn init_hidden(&self, batch_size: usize) -> LstmState {
        LstmState::zeros(batch_size, self.hidden_dim(), self.device)
    }

    /// Redraw every parameter element from `Uniform[-INIT_RANGE, INIT_RANGE]`.
    /// Layers are drawn in [`Generator::parameters`] order.
    pub fn init_params<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.embed.reset_parameters(INIT_RANGE, rng);
        self.lstm.reset_parameters(INIT_RANGE, rng);
        self.fc.reset_parameters(INIT_RANGE, rng);
    }

    /// Named parameters in a stable order.
    pub fn parameters(&self) -> Vec<(String, &Matrix)> {
        let mut params = Vec::new();
        for (prefix, group) in [
            ("embed", self.embed.parameters()),
            ("lstm", self.lstm.parameters()),
            ("fc", self.fc.parameters()),
        ] {
            for (name, p) in group {
                params.push((format!("{}.{}", prefix, name), p));
            }
        }
        params
    }

    /// Mutable parameters in the same order as [`Generator::parameters`].
    pub fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        let mut params = self.embed.parameters_mut();
        params.extend(self.lstm.parameters_mut());
        params.extend(self.fc.parameters_mut());
        params
    }

    pub fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|(_, p)| p.data.len()).sum()
    }

    fn project(&self, hidden: &Matrix) -> Matrix {
        self.fc.forward(hidden).log_softmax()
    }

    fn check_state(&self, state: &LstmState, batch_size: usize) -> Result<(), GeneratorError> {
        if state.device != self.device {
            return Err(GeneratorError::DeviceMismatch {
                expected: self.device,
                found: state.device,
            });
        }
        let expected = [1, batch_size, self.hidden_dim()];
        for t in [&state.h, &state.c] {
            if t.shape[..] != expected[..] {
                return Err(GeneratorError::StateShape {
                    expected,
                    found: t.shape.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn small() -> Generator {
        let mut rng = StdRng::seed_from_u64(42);
        Generator::with_rng(10, 4, 8, false, &mut rng).unwrap()
    }

    #[test]
    fn parameter_names_and_shapes() {
        let g = small();
        let shapes: Vec<(String, usize, usize)> = g
            .parameters()
            .into_iter()
            .map(|(n, p)| (n, p.rows, p.cols))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ("embed.weight".to_string(), 10, 4),
                ("lstm.weight_ih_l0".to_string(), 4, 32),
                ("lstm.weight_hh_l0".to_string(), 8, 32),
                ("lstm.bias_ih_l0".to_string(), 1, 32),
                ("lstm.bias_hh_l0".to_string(), 1, 32),
                ("fc.weight".to_string(), 8, 10),
                ("fc.bias".to_string(), 1, 10),
            ]
        );
        assert_eq!(g.num_parameters(), 40 + 128 + 256 + 32 + 32 + 80 + 10);
    }

    #[test]
    fn construction_draws_parameters_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let built = Generator::with_rng(10, 4, 8, false, &mut rng).unwrap();

        let mut replay = Generator {
            embed: Embedding::new(10, 4),
            lstm: Lstm::new(4, 8),
            fc: Linear::new(8, 10),
            device: Device::Cpu,
        };
        replay.init_params(&mut StdRng::seed_from_u64(42));
        for ((name, a), (_, b)) in built.parameters().iter().zip(replay.parameters().iter()) {
            assert_eq!(a, b, "{name}");
        }
    }

    #[test]
    fn mutable_parameters_follow_named_order() {
        let mut g = small();
        for (i, p) in g.parameters_mut().into_iter().enumerate() {
            p.map_inplace(|_| i as f32);
        }
        for (i, (name, p)) in g.parameters().iter().enumerate() {
            assert!(p.data.iter().all(|&v| v == i as f32), "{name}");
        }
    }

    #[test]
    fn init_hidden_shape() {
        let g = small();
        let s = g.init_hidden(3);
        assert_eq!(s.h.shape, vec![1, 3, 8]);
        assert_eq!(s.c.shape, vec![1, 3, 8]);
        assert_eq!(s.batch_size(), 3);
        assert!(s.h.data.iter().chain(s.c.data.iter()).all(|&v| v == 0.0));
    }

    #[test]
    fn step_rejects_state_for_other_batch() {
        let g = small();
        let state = g.init_hidden(2);
        let err = g.step(&[1, 2, 3], state).unwrap_err();
        assert_eq!(
            err,
            GeneratorError::StateShape {
                expected: [1, 3, 8],
                found: vec![1, 2, 8]
            }
        );
    }

    #[test]
    fn step_rejects_state_from_other_device() {
        let g = small();
        let state = LstmState::zeros(1, 8, Device::Cuda);
        assert_eq!(
            g.step(&[1], state).unwrap_err(),
            GeneratorError::DeviceMismatch {
                expected: Device::Cpu,
                found: Device::Cuda
            }
        );
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Generator::with_rng(10, 0, 8, false, &mut rng).err(),
            Some(GeneratorError::InvalidDimension {
                name: "embedding_dim",
                value: 0
            })
        );
    }

    #[test]
    fn empty_sample_keeps_batch_size() {
        let g = small();
        let mut rng = StdRng::seed_from_u64(0);
        let out = g.sample(3, 0, None, &mut rng).unwrap();
        assert_eq!(out.shape(), (3, 0));
    }
}
