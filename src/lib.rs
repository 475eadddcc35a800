pub mod config;
pub mod decoding;
pub mod device;
pub mod error;
pub mod layers;
pub mod math;
pub mod models;
pub mod rl;
pub mod rng;
pub mod tensor;
pub mod tokens;

pub use config::GeneratorConfig;
pub use error::GeneratorError;
pub use models::{Generator, LstmState};
pub use rl::{GeneratorAsRLModel, Model};
pub use tokens::TokenBatch;
