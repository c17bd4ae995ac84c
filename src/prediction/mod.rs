// Next-day price prediction
pub mod artifact;
pub mod regression;

pub use artifact::{load_artifact, save_artifact, ModelArtifact};
pub use regression::{training_pairs, RegressionModel};
