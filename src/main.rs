use anyhow::Result;
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use competency_import::logging::init_logging;
use competency_import::{Mode, Pipeline, PipelineConfig, Stage};

#[derive(Parser, Debug)]
#[command(name = "competency-import")]
#[command(about = "Convert the CS2023 knowledge-area workbook into an Artemis competency import file")]
#[command(group(ArgGroup::new("mode").args(["verify", "finalize", "step"]).multiple(false)))]
struct Cli {
    /// Only re-check the error file after fixing it by hand
    #[arg(short = 'V', long)]
    verify: bool,

    /// Re-check the error file, then write the import file
    #[arg(short = 'F', long)]
    finalize: bool,

    /// Run a single step (or all of them)
    #[arg(short = 'S', long, value_enum)]
    step: Option<StepArg>,

    /// Directory holding the workbook, data/ and run_info.json
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// TOML file overriding paths, column names and limits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not copy stage outputs into data/previous_runs/
    #[arg(long)]
    no_backup: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum StepArg {
    ExcelToRaw,
    RawToClean,
    MarkErrors,
    Verify,
    ConvertToArtemis,
    All,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.verify {
            return Mode::VerifyOnly;
        }
        if self.finalize {
            return Mode::Finalize;
        }
        match self.step {
            None | Some(StepArg::All) => Mode::All,
            Some(StepArg::ExcelToRaw) => Mode::Step(Stage::ExcelToRaw),
            Some(StepArg::RawToClean) => Mode::Step(Stage::RawToClean),
            Some(StepArg::MarkErrors) => Mode::Step(Stage::MarkErrors),
            Some(StepArg::Verify) => Mode::Step(Stage::Verify),
            Some(StepArg::ConvertToArtemis) => Mode::Step(Stage::ConvertToArtemis),
        }
    }

    fn load_config(&self) -> Result<PipelineConfig> {
        let config = match &self.config {
            Some(path) => PipelineConfig::from_toml_file(&self.base_dir, path)?,
            None => PipelineConfig::new(&self.base_dir),
        };

        if self.no_backup {
            Ok(config.with_backups(false))
        } else {
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.load_config()?;
    let mode = cli.mode();

    let mut pipeline = Pipeline::start(&config)?;
    info!(
        "Run {} in {}: {:?}",
        pipeline.run_number(),
        config.base_dir.display(),
        mode
    );
    pipeline.run(&mode.stages())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_runs_everything() {
        let cli = Cli::try_parse_from(["competency-import"]).unwrap();

        assert_eq!(cli.mode(), Mode::All);
        assert_eq!(cli.base_dir, PathBuf::from("."));
    }

    #[test]
    fn test_short_flags_select_mode() {
        let verify = Cli::try_parse_from(["competency-import", "-V"]).unwrap();
        let finalize = Cli::try_parse_from(["competency-import", "-F"]).unwrap();
        let step = Cli::try_parse_from(["competency-import", "-S", "mark_errors"]).unwrap();

        assert_eq!(verify.mode(), Mode::VerifyOnly);
        assert_eq!(finalize.mode(), Mode::Finalize);
        assert_eq!(step.mode(), Mode::Step(Stage::MarkErrors));
    }

    #[test]
    fn test_step_all_is_full_run() {
        let cli = Cli::try_parse_from(["competency-import", "--step", "all"]).unwrap();

        assert_eq!(cli.mode(), Mode::All);
    }

    #[test]
    fn test_modes_are_mutually_exclusive() {
        assert!(Cli::try_parse_from(["competency-import", "-V", "-F"]).is_err());
        assert!(
            Cli::try_parse_from(["competency-import", "--finalize", "--step", "verify"]).is_err()
        );
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(Cli::try_parse_from(["competency-import", "-S", "cleanup"]).is_err());
    }
}
