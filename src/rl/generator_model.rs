use super::Model;
use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::math::Matrix;
use crate::models::Generator;
use crate::tokens::TokenBatch;

/// Exposes a [`Generator`] as an RL [`Model`].
///
/// The action space is the vocabulary: the policy picks the next token.
/// Observations are token batches and the output is the generator's
/// per-position log-probabilities.
pub struct GeneratorAsRLModel {
    generator: Generator,
}

impl GeneratorAsRLModel {
    pub fn new(
        vocab_size: usize,
        g_emb_dim: usize,
        g_hidden_dim: usize,
        use_cuda: bool,
    ) -> Result<Self, GeneratorError> {
        Ok(Self {
            generator: Generator::new(vocab_size, g_emb_dim, g_hidden_dim, use_cuda)?,
        })
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        Ok(Self {
            generator: Generator::from_config(config)?,
        })
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut Generator {
        &mut self.generator
    }

    pub fn into_generator(self) -> Generator {
        self.generator
    }
}

impl From<Generator> for GeneratorAsRLModel {
    fn from(generator: Generator) -> Self {
        Self { generator }
    }
}

impl Model for GeneratorAsRLModel {
    type Obs = TokenBatch;
    type Output = Matrix;
    type Error = GeneratorError;

    fn forward(&self, obs: &TokenBatch) -> Result<Matrix, GeneratorError> {
        self.generator.forward(obs)
    }
}
