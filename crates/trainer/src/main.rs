use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use seg_core::{ModelTrainerArtifact, ModelTrainerConfig, TrainerSettings};
use trainer::{ModelTrainer, TrainingTool};

/// Train a segmentation model with the YOLO CLI and collect its best weights.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML settings file; skipped when it does not exist
    #[arg(short, long, default_value = "configs/trainer_config.yaml")]
    config: PathBuf,

    /// Name of the training run (one path component)
    #[arg(short, long)]
    run_name: Option<String>,

    /// Pretrained weight file in the working directory
    #[arg(short, long)]
    weights: Option<String>,

    /// Number of training epochs
    #[arg(short, long)]
    epochs: Option<usize>,

    /// Root of the artifact tree
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Training tool executable
    #[arg(long)]
    program: Option<String>,

    /// Directory the training tool runs in
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Also write the artifact record as JSON to this path
    #[arg(long)]
    artifact_out: Option<PathBuf>,

    /// Print the training command and exit
    #[arg(long)]
    print_command: bool,
}

impl Cli {
    fn settings(&self) -> Result<TrainerSettings> {
        let mut settings = TrainerSettings::load_or_default(&self.config)
            .with_context(|| format!("Failed to load settings from {:?}", self.config))?;

        if let Some(run_name) = &self.run_name {
            settings.run_name = Some(run_name.clone());
        }
        if let Some(weights) = &self.weights {
            settings.weight_name = Some(weights.clone());
        }
        if let Some(epochs) = self.epochs {
            settings.epochs = Some(epochs);
        }
        if let Some(dir) = &self.artifacts_dir {
            settings.artifacts_dir = Some(dir.clone());
        }
        if let Some(program) = &self.program {
            settings.program = Some(program.clone());
            settings.program_args.clear();
        }
        if let Some(dir) = &self.work_dir {
            settings.work_dir = Some(dir.clone());
        }
        Ok(settings)
    }
}

fn build_tool(settings: &TrainerSettings) -> TrainingTool {
    let tool = match &settings.program {
        Some(program) => TrainingTool::new(program.as_str()),
        None => TrainingTool::default(),
    };
    let tool = tool.with_prefix_args(settings.program_args.iter().cloned());
    match &settings.work_dir {
        Some(dir) => tool.with_work_dir(dir),
        None => tool,
    }
}

fn log_command_line(tool: &TrainingTool, config: &ModelTrainerConfig) -> String {
    let command_line = tool.command_line(config);
    info!("Training command: {command_line}");
    command_line
}

fn write_artifact(artifact: &ModelTrainerArtifact, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, artifact.to_json()?)?;
    info!("Wrote artifact record to {:?}", path);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = cli.settings()?;
    let config = settings.trainer_config().context("Invalid trainer configuration")?;
    let tool = build_tool(&settings);

    if cli.print_command {
        println!("{}", log_command_line(&tool, &config));
        return Ok(());
    }

    let trainer = ModelTrainer::new(config, tool);
    let artifact = trainer.run()?;

    println!("{}", artifact.to_json()?);
    if let Some(path) = &cli.artifact_out {
        write_artifact(&artifact, path).context("Failed to save artifact record")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SETTINGS: &str = "\
artifacts_dir: from-yaml/artifacts
run_name: yaml-run
weight_name: yaml.pt
epochs: 4
program: python
program_args: [\"-m\", \"ultralytics\"]
work_dir: yaml-work
";

    fn settings_file(dir: &TempDir) -> String {
        let path = dir.path().join("trainer_config.yaml");
        fs::write(&path, SETTINGS).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn yaml_values_apply_without_flags() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from(["seg-train", "--config", &settings_file(&dir)]);
        let settings = cli.settings().unwrap();

        let config = settings.trainer_config().unwrap();
        assert_eq!(config.run_name(), "yaml-run");
        assert_eq!(config.weight_name(), "yaml.pt");
        assert_eq!(config.no_epochs().get(), 4);

        let tool = build_tool(&settings);
        assert_eq!(tool.program(), "python");
        assert_eq!(tool.work_dir(), Path::new("yaml-work"));
        assert!(tool
            .command_line(&config)
            .starts_with("python -m ultralytics task=segment"));
    }

    #[test]
    fn flags_override_yaml() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from([
            "seg-train",
            "--config",
            &settings_file(&dir),
            "--run-name",
            "flag-run",
            "--weights",
            "flag.pt",
            "--epochs",
            "9",
            "--artifacts-dir",
            "flag-artifacts",
            "--work-dir",
            "flag-work",
        ]);
        let settings = cli.settings().unwrap();
        let config = settings.trainer_config().unwrap();

        assert_eq!(config.run_name(), "flag-run");
        assert_eq!(config.weight_name(), "flag.pt");
        assert_eq!(config.no_epochs().get(), 9);
        assert_eq!(
            config.model_trainer_dir(),
            Path::new("flag-artifacts").join("model_trainer")
        );
        // program_args survive when --program is not given
        assert_eq!(settings.program_args, ["-m", "ultralytics"]);
        assert_eq!(build_tool(&settings).work_dir(), Path::new("flag-work"));
    }

    #[test]
    fn program_flag_drops_yaml_prefix_args() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from([
            "seg-train",
            "--config",
            &settings_file(&dir),
            "--program",
            "yolo",
        ]);
        let settings = cli.settings().unwrap();
        assert!(settings.program_args.is_empty());

        let config = settings.trainer_config().unwrap();
        let tool = build_tool(&settings);
        assert_eq!(tool.program(), "yolo");
        assert!(tool
            .command_line(&config)
            .starts_with("yolo task=segment mode=train"));
    }

    #[test]
    fn print_command_renders_full_invocation() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from([
            "seg-train",
            "--config",
            &settings_file(&dir),
            "--print-command",
        ]);
        assert!(cli.print_command);

        let settings = cli.settings().unwrap();
        let config = settings.trainer_config().unwrap();
        assert_eq!(
            log_command_line(&build_tool(&settings), &config),
            "python -m ultralytics task=segment mode=train model=yaml.pt data=data.yaml \
             epochs=4 imgsz=640 save=true name=yaml-run"
        );
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent.yaml");
        let cli = Cli::parse_from(["seg-train", "--config", absent.to_str().unwrap()]);
        let settings = cli.settings().unwrap();

        let tool = build_tool(&settings);
        assert_eq!(tool.program(), "yolo");
        assert_eq!(tool.work_dir(), Path::new("."));
        assert_eq!(settings.trainer_config().unwrap().run_name(), "train");
    }

    #[test]
    fn artifact_record_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records").join("stage").join("trainer.json");
        let artifact = ModelTrainerArtifact::new("artifacts/model_trainer/best.pt");

        write_artifact(&artifact, &path).unwrap();

        let back: ModelTrainerArtifact =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, artifact);
    }
}
