use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid run name {0:?}: must be a non-empty single path component")]
    InvalidRunName(String),

    #[error("invalid pretrained weight name {0:?}: must be a file name in the working directory")]
    InvalidWeightName(String),

    #[error("epoch count must be greater than zero")]
    ZeroEpochs,

    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
