use serde::{Deserialize, Serialize};
use std::fs;

use crate::device::Device;

/// Generator dimensions and placement loaded from a TOML or JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of distinct token ids, `0..vocab_size`.
    pub vocab_size: usize,
    /// Width of each token embedding.
    pub embedding_dim: usize,
    /// Width of the LSTM hidden and cell vectors.
    pub hidden_dim: usize,
    /// Place the generator on CUDA instead of the CPU.
    pub use_cuda: bool,
    /// Seed for parameter initialisation and sampling. Falls back to the
    /// `SEED` environment variable when absent.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            vocab_size: 5000,
            embedding_dim: 32,
            hidden_dim: 32,
            use_cuda: false,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from the given path.  Supports TOML or JSON based on
    /// the file extension. Returns `None` if reading or parsing fails.
    pub fn from_path(path: &str) -> Option<Self> {
        let Ok(content) = fs::read_to_string(path) else {
            log::warn!("could not read generator config {}", path);
            return None;
        };
        let parsed = if path.ends_with(".json") {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };
        match parsed {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                log::warn!("could not parse generator config {}: {}", path, e);
                None
            }
        }
    }

    pub fn device(&self) -> Device {
        Device::from_use_cuda(self.use_cuda)
    }
}
