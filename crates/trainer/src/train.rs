use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use seg_core::constants::TRAINED_WEIGHT_FILE;
use seg_core::{ModelTrainerArtifact, ModelTrainerConfig};

use crate::error::{AppError, Result, TrainerError};
use crate::tool::TrainingTool;

const STAGE: &str = "model trainer";

/// Drives one run of the external training tool and collects its weights.
pub struct ModelTrainer {
    config: ModelTrainerConfig,
    tool: TrainingTool,
}

impl ModelTrainer {
    pub fn new(config: ModelTrainerConfig, tool: TrainingTool) -> Self {
        Self { config, tool }
    }

    pub fn config(&self) -> &ModelTrainerConfig {
        &self.config
    }

    pub fn tool(&self) -> &TrainingTool {
        &self.tool
    }

    /// Trains, moves `best.pt` into the destination directory and removes the
    /// tool's temporary output.
    ///
    /// Cleanup only happens once the trained weights were found and moved; a
    /// failed lookup leaves `runs/` and the pretrained weights in place.
    pub fn run(&self) -> std::result::Result<ModelTrainerArtifact, AppError> {
        info!("Entered run method of ModelTrainer");
        let artifact = self
            .train_and_collect()
            .map_err(|e| AppError::new(STAGE, self.config.run_name(), e))?;
        info!("Exited run method of ModelTrainer");
        info!("Model trainer artifact: {artifact}");
        Ok(artifact)
    }

    fn train_and_collect(&self) -> Result<ModelTrainerArtifact> {
        self.launch()?;

        let run_name = self.config.run_name();
        let src_model = self.tool.best_weights(run_name);
        debug!("Looking for trained weights at {}", src_model.display());
        if !src_model.exists() {
            return Err(TrainerError::MissingOutput { path: src_model });
        }

        let dest_dir = self.config.model_trainer_dir();
        let dest_model = dest_dir.join(TRAINED_WEIGHT_FILE);
        fs::create_dir_all(dest_dir).map_err(fs_error("create directory", dest_dir))?;
        fs::rename(&src_model, &dest_model)
            .map_err(fs_error("move trained weights to", &dest_model))?;
        info!("Moved {} to {}", src_model.display(), dest_model.display());

        self.cleanup();

        Ok(ModelTrainerArtifact::new(dest_model))
    }

    fn launch(&self) -> Result<()> {
        info!("Starting segmentation training...");
        debug!("Running {}", self.tool.command_line(&self.config));

        let status = self
            .tool
            .command(&self.config)
            .status()
            .map_err(|source| TrainerError::ProcessLaunch {
                program: self.tool.program().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(TrainerError::TrainingFailed {
                program: self.tool.program().to_string(),
                status,
            });
        }
        info!("Training tool finished with {status}");
        Ok(())
    }

    /// Best effort: failures are logged and the run still succeeds.
    fn cleanup(&self) {
        let runs_root = self.tool.runs_root();
        if let Err(e) = remove_if_exists(&runs_root, |p| fs::remove_dir_all(p)) {
            warn!("Could not remove {}: {e}", runs_root.display());
        }

        let pretrained = self.tool.pretrained_weights(&self.config);
        if let Err(e) = remove_if_exists(&pretrained, |p| fs::remove_file(p)) {
            warn!("Could not remove {}: {e}", pretrained.display());
        }
    }
}

fn remove_if_exists(path: &Path, remove: impl FnOnce(&Path) -> io::Result<()>) -> io::Result<()> {
    match remove(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn fs_error(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> TrainerError {
    let path: PathBuf = path.to_path_buf();
    move |source| TrainerError::Filesystem {
        action,
        path,
        source,
    }
}
