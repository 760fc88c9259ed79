use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    ARTIFACTS_DIR, DEFAULT_RUN_NAME, MODEL_TRAINER_DIR_NAME, MODEL_TRAINER_NO_EPOCHS,
    MODEL_TRAINER_PRETRAINED_WEIGHT_NAME,
};
use crate::error::{ConfigError, Result};

/// Root of the artifact tree shared by all pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPipelineConfig {
    pub artifacts_dir: PathBuf,
}

impl Default for TrainingPipelineConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from(ARTIFACTS_DIR),
        }
    }
}

impl TrainingPipelineConfig {
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
        }
    }

    /// Directory the model trainer stage writes its weights into.
    pub fn model_trainer_dir(&self) -> PathBuf {
        self.artifacts_dir.join(MODEL_TRAINER_DIR_NAME)
    }
}

/// Inputs of one training invocation. Validated on construction and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawModelTrainerConfig")]
pub struct ModelTrainerConfig {
    /// Names the tool's output subdirectory, so it must be one path component.
    run_name: String,
    /// Pretrained checkpoint, looked up (and later removed) in the working directory.
    weight_name: String,
    no_epochs: NonZeroUsize,
    /// Destination directory for the trained weights.
    model_trainer_dir: PathBuf,
}

#[derive(Deserialize)]
struct RawModelTrainerConfig {
    run_name: String,
    weight_name: String,
    no_epochs: usize,
    model_trainer_dir: PathBuf,
}

impl TryFrom<RawModelTrainerConfig> for ModelTrainerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawModelTrainerConfig) -> Result<Self> {
        let epochs = NonZeroUsize::new(raw.no_epochs).ok_or(ConfigError::ZeroEpochs)?;
        Self::new(raw.run_name, raw.weight_name, epochs, raw.model_trainer_dir)
    }
}

impl ModelTrainerConfig {
    pub fn new(
        run_name: impl Into<String>,
        weight_name: impl Into<String>,
        no_epochs: NonZeroUsize,
        model_trainer_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let run_name = run_name.into();
        if !is_single_component(&run_name) {
            return Err(ConfigError::InvalidRunName(run_name));
        }
        let weight_name = weight_name.into();
        if !is_single_component(&weight_name) {
            return Err(ConfigError::InvalidWeightName(weight_name));
        }

        Ok(Self {
            run_name,
            weight_name,
            no_epochs,
            model_trainer_dir: model_trainer_dir.into(),
        })
    }

    /// Pipeline defaults: `yolov8s-seg.pt`, one epoch, `<artifacts>/model_trainer`.
    pub fn from_pipeline(pipeline: &TrainingPipelineConfig, run_name: impl Into<String>) -> Result<Self> {
        let epochs = NonZeroUsize::new(MODEL_TRAINER_NO_EPOCHS).ok_or(ConfigError::ZeroEpochs)?;
        Self::new(
            run_name,
            MODEL_TRAINER_PRETRAINED_WEIGHT_NAME,
            epochs,
            pipeline.model_trainer_dir(),
        )
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn weight_name(&self) -> &str {
        &self.weight_name
    }

    pub fn no_epochs(&self) -> NonZeroUsize {
        self.no_epochs
    }

    pub fn model_trainer_dir(&self) -> &Path {
        &self.model_trainer_dir
    }
}

fn is_single_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Optional overrides read from a YAML file. Anything left out falls back to
/// the pipeline defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerSettings {
    pub artifacts_dir: Option<PathBuf>,
    pub run_name: Option<String>,
    pub weight_name: Option<String>,
    pub epochs: Option<usize>,
    /// Training tool executable, `yolo` when unset.
    pub program: Option<String>,
    /// Arguments placed before the generated ones, e.g. `["-m", "ultralytics"]`.
    pub program_args: Vec<String>,
    pub work_dir: Option<PathBuf>,
}

impl TrainerSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Like [`TrainerSettings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn pipeline(&self) -> TrainingPipelineConfig {
        self.artifacts_dir
            .as_ref()
            .map(TrainingPipelineConfig::new)
            .unwrap_or_default()
    }

    pub fn trainer_config(&self) -> Result<ModelTrainerConfig> {
        let epochs = self.epochs.unwrap_or(MODEL_TRAINER_NO_EPOCHS);
        let epochs = NonZeroUsize::new(epochs).ok_or(ConfigError::ZeroEpochs)?;
        ModelTrainerConfig::new(
            self.run_name.as_deref().unwrap_or(DEFAULT_RUN_NAME),
            self.weight_name
                .as_deref()
                .unwrap_or(MODEL_TRAINER_PRETRAINED_WEIGHT_NAME),
            epochs,
            self.pipeline().model_trainer_dir(),
        )
    }
}
