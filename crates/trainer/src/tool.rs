//! Description of the external segmentation training tool: how to call it and
//! where it leaves its results.

use std::path::{Path, PathBuf};
use std::process::Command;

use seg_core::constants::{DATASET_DESCRIPTOR, IMAGE_SIZE, TRAINED_WEIGHT_FILE};
use seg_core::ModelTrainerConfig;

/// Directory structure the tool writes under its working directory:
/// `<runs_dir>/<task_dir>/<run name>/<weights_dir>/<weight_file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub runs_dir: PathBuf,
    pub task_dir: PathBuf,
    pub weights_dir: PathBuf,
    pub weight_file: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("runs"),
            task_dir: PathBuf::from("segment"),
            weights_dir: PathBuf::from("weights"),
            weight_file: PathBuf::from(TRAINED_WEIGHT_FILE),
        }
    }
}

impl OutputLayout {
    /// Temporary tree removed after a successful run.
    pub fn runs_root(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.runs_dir)
    }

    pub fn run_dir(&self, work_dir: &Path, run_name: &str) -> PathBuf {
        self.runs_root(work_dir).join(&self.task_dir).join(run_name)
    }

    pub fn best_weights(&self, work_dir: &Path, run_name: &str) -> PathBuf {
        self.run_dir(work_dir, run_name)
            .join(&self.weights_dir)
            .join(&self.weight_file)
    }
}

/// The training executable plus the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingTool {
    program: String,
    prefix_args: Vec<String>,
    work_dir: PathBuf,
    layout: OutputLayout,
}

impl Default for TrainingTool {
    fn default() -> Self {
        Self::new("yolo")
    }
}

impl TrainingTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
            work_dir: PathBuf::from("."),
            layout: OutputLayout::default(),
        }
    }

    /// Arguments inserted before the generated `key=value` list.
    pub fn with_prefix_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Generated arguments, in the order they are passed.
    pub fn arguments(&self, config: &ModelTrainerConfig) -> Vec<String> {
        vec![
            "task=segment".to_string(),
            "mode=train".to_string(),
            format!("model={}", config.weight_name()),
            format!("data={DATASET_DESCRIPTOR}"),
            format!("epochs={}", config.no_epochs()),
            format!("imgsz={IMAGE_SIZE}"),
            "save=true".to_string(),
            format!("name={}", config.run_name()),
        ]
    }

    pub fn command(&self, config: &ModelTrainerConfig) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.prefix_args)
            .args(self.arguments(config))
            .current_dir(&self.work_dir);
        command
    }

    /// Shell-like rendering for logs.
    pub fn command_line(&self, config: &ModelTrainerConfig) -> String {
        std::iter::once(self.program.clone())
            .chain(self.prefix_args.iter().cloned())
            .chain(self.arguments(config))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn best_weights(&self, run_name: &str) -> PathBuf {
        self.layout.best_weights(&self.work_dir, run_name)
    }

    pub fn runs_root(&self) -> PathBuf {
        self.layout.runs_root(&self.work_dir)
    }

    pub fn pretrained_weights(&self, config: &ModelTrainerConfig) -> PathBuf {
        self.work_dir.join(config.weight_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::num::NonZeroUsize;

    fn config() -> ModelTrainerConfig {
        ModelTrainerConfig::new(
            "exp7",
            "yolov8s-seg.pt",
            NonZeroUsize::new(25).unwrap(),
            "artifacts/model_trainer",
        )
        .unwrap()
    }

    #[test]
    fn arguments_follow_cli_contract() {
        let args = TrainingTool::default().arguments(&config());
        assert_eq!(
            args,
            [
                "task=segment",
                "mode=train",
                "model=yolov8s-seg.pt",
                "data=data.yaml",
                "epochs=25",
                "imgsz=640",
                "save=true",
                "name=exp7",
            ]
        );
    }

    #[test]
    fn command_includes_prefix_and_work_dir() {
        let tool = TrainingTool::new("python")
            .with_prefix_args(["-m", "ultralytics"])
            .with_work_dir("/data/cells");
        let command = tool.command(&config());

        assert_eq!(command.get_program(), "python");
        let args: Vec<OsString> = command.get_args().map(OsString::from).collect();
        assert_eq!(args[..3], [OsString::from("-m"), "ultralytics".into(), "task=segment".into()]);
        assert_eq!(args.len(), 10);
        assert_eq!(command.get_current_dir(), Some(Path::new("/data/cells")));
        assert!(tool
            .command_line(&config())
            .starts_with("python -m ultralytics task=segment mode=train"));
    }

    #[test]
    fn default_layout_paths() {
        let tool = TrainingTool::default().with_work_dir("work");
        assert_eq!(
            tool.best_weights("exp7"),
            Path::new("work/runs/segment/exp7/weights/best.pt")
        );
        assert_eq!(tool.runs_root(), Path::new("work/runs"));
        assert_eq!(
            tool.pretrained_weights(&config()),
            Path::new("work/yolov8s-seg.pt")
        );
    }

    #[test]
    fn custom_layout_moves_lookup() {
        let layout = OutputLayout {
            task_dir: PathBuf::from("detect"),
            weight_file: PathBuf::from("last.pt"),
            ..OutputLayout::default()
        };
        let tool = TrainingTool::default().with_layout(layout);
        assert_eq!(
            tool.best_weights("r"),
            Path::new("./runs/detect/r/weights/last.pt")
        );
    }
}
