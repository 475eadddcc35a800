pub mod generator_model;

pub use generator_model::GeneratorAsRLModel;

/// A policy network as seen by a reinforcement learning algorithm.
///
/// The algorithm only needs to turn an observation into an action
/// distribution; how the network computes it stays behind this trait.
pub trait Model {
    /// Observation type fed to the policy.
    type Obs: ?Sized;
    /// Action distribution produced for an observation.
    type Output;
    type Error;

    fn forward(&self, obs: &Self::Obs) -> Result<Self::Output, Self::Error>;
}
