//! Fixed names shared by the training pipeline stages.

/// Root directory for every stage's output.
pub const ARTIFACTS_DIR: &str = "artifacts";

pub const MODEL_TRAINER_DIR_NAME: &str = "model_trainer";

/// Pretrained segmentation checkpoint the training tool starts from.
pub const MODEL_TRAINER_PRETRAINED_WEIGHT_NAME: &str = "yolov8s-seg.pt";

pub const MODEL_TRAINER_NO_EPOCHS: usize = 1;

/// Dataset descriptor the training tool reads, relative to its working directory.
pub const DATASET_DESCRIPTOR: &str = "data.yaml";

pub const IMAGE_SIZE: u32 = 640;

/// Name of the best checkpoint, both in the tool's output and at the destination.
pub const TRAINED_WEIGHT_FILE: &str = "best.pt";

/// Run name the training tool uses when none is given.
pub const DEFAULT_RUN_NAME: &str = "train";
