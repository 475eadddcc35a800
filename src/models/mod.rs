pub mod generator;

pub use generator::{Generator, LstmState, INIT_RANGE};
