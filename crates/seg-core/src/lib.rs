pub mod artifact;
pub mod config;
pub mod constants;
pub mod error;

pub use artifact::ModelTrainerArtifact;
pub use config::{ModelTrainerConfig, TrainerSettings, TrainingPipelineConfig};
pub use error::{ConfigError, Result};
