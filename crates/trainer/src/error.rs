use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Ways a single training invocation can fail.
#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("expected trained model at {path:?}, but not found")]
    MissingOutput { path: PathBuf },

    #[error("failed to {action} {path:?}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch training tool {program:?}: {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("training tool {program:?} failed ({status})")]
    TrainingFailed { program: String, status: ExitStatus },
}

/// A [`TrainerError`] together with the invocation it happened in.
#[derive(Error, Debug)]
#[error("{stage} failed for run {run_name:?}: {kind}")]
pub struct AppError {
    stage: &'static str,
    run_name: String,
    #[source]
    kind: TrainerError,
}

impl AppError {
    pub fn new(stage: &'static str, run_name: impl Into<String>, kind: TrainerError) -> Self {
        Self {
            stage,
            run_name: run_name.into(),
            kind,
        }
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn kind(&self) -> &TrainerError {
        &self.kind
    }

    pub fn into_kind(self) -> TrainerError {
        self.kind
    }
}

pub type Result<T> = std::result::Result<T, TrainerError>;
