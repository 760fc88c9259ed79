use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Output record of the model trainer stage, read by the stages after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTrainerArtifact {
    trained_model_file_path: PathBuf,
}

impl ModelTrainerArtifact {
    pub fn new(trained_model_file_path: impl Into<PathBuf>) -> Self {
        Self {
            trained_model_file_path: trained_model_file_path.into(),
        }
    }

    pub fn trained_model_file_path(&self) -> &Path {
        &self.trained_model_file_path
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ModelTrainerArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ModelTrainerArtifact(trained_model_file_path={})",
            self.trained_model_file_path.display()
        )
    }
}
