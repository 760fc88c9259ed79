pub mod error;
pub mod tool;
pub mod train;

pub use error::{AppError, TrainerError};
pub use tool::{OutputLayout, TrainingTool};
pub use train::ModelTrainer;
