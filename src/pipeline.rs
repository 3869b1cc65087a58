// 🚚 Pipeline - runs the five stages against the record store
//
// excel_to_raw → raw_to_clean → mark_errors → (manual fixes) → verify → convert_to_artemis
//
// Each stage checks its preconditions before touching anything: it refuses to
// overwrite its own output and aborts on missing input. Completed stages are
// recorded in run_info.json together with digests of what they wrote.

use crate::aggregator::RowAggregator;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::exporter::{self, CategoryExporter};
use crate::normalizer::FieldNormalizer;
use crate::record::{AnnotatedRecord, CleanRecord, KnowledgeAreaGroup, RawRecord};
use crate::reverify::ReverificationEngine;
use crate::source::{check_sheets, open_source};
use crate::state::{RunInfo, Stage};
use crate::store::RecordStore;
use crate::validator::{Partition, Validator};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Output file (relative path) → sha256
type StageOutputs = BTreeMap<String, String>;

// ============================================================================
// MODE
// ============================================================================

/// Which stages one invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Re-check the error file only
    VerifyOnly,
    /// Re-check, then build the import file
    Finalize,
    /// Exactly one stage
    Step(Stage),
    /// All five stages in order
    All,
}

impl Mode {
    pub fn stages(&self) -> Vec<Stage> {
        match self {
            Mode::VerifyOnly => vec![Stage::Verify],
            Mode::Finalize => vec![Stage::Verify, Stage::ConvertToArtemis],
            Mode::Step(stage) => vec![*stage],
            Mode::All => Stage::ALL.to_vec(),
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    store: RecordStore,
    run_info: RunInfo,
}

impl<'a> Pipeline<'a> {
    /// Bump the run counter and prepare this run's backup folder
    pub fn start(config: &'a PipelineConfig) -> Result<Self> {
        let store = RecordStore::new(&config.base_dir);

        let mut run_info: RunInfo = if store.exists(&config.paths.run_info) {
            store.load(&config.paths.run_info)?
        } else {
            warn!(
                "{} not found, starting a fresh run counter",
                config.paths.run_info.display()
            );
            RunInfo::default()
        };
        let run = run_info.begin_run();
        store.write(&config.paths.run_info, &run_info)?;

        let store = if config.do_backups {
            let backup_dir = config
                .resolve(&config.paths.previous_runs_dir)
                .join(run.to_string());
            fs::create_dir_all(&backup_dir)
                .with_context(|| format!("Failed to create backup directory: {:?}", backup_dir))?;
            store.with_backup_dir(backup_dir)
        } else {
            store
        };

        info!(run, "pipeline run started");

        Ok(Pipeline {
            config,
            store,
            run_info,
        })
    }

    pub fn run_number(&self) -> u64 {
        self.run_info.number
    }

    pub fn run_info(&self) -> &RunInfo {
        &self.run_info
    }

    /// Run the stages in order, stopping at the first failure
    pub fn run(&mut self, stages: &[Stage]) -> Result<()> {
        for stage in stages {
            self.run_stage(*stage)?;
        }
        Ok(())
    }

    pub fn run_stage(&mut self, stage: Stage) -> Result<()> {
        info!("Starting {}", stage.description());

        let result = match stage {
            Stage::ExcelToRaw => self.excel_to_raw(),
            Stage::RawToClean => self.raw_to_clean(),
            Stage::MarkErrors => self.mark_errors(),
            Stage::Verify => self.verify(),
            Stage::ConvertToArtemis => self.convert_to_artemis(),
        };

        match result {
            Ok(Some(outputs)) => {
                self.run_info.mark_completed(stage, outputs);
                self.store.write(&self.config.paths.run_info, &self.run_info)?;
                info!("Finished {}", stage.description());
                Ok(())
            }
            Ok(None) => {
                info!("Skipped {}", stage.description());
                Ok(())
            }
            Err(e) => {
                error!("Canceled {}", stage.description());
                Err(e)
            }
        }
    }

    // ========================================================================
    // STAGES
    // ========================================================================

    fn excel_to_raw(&self) -> Result<Option<StageOutputs>> {
        let paths = &self.config.paths;
        self.ensure_absent(Stage::ExcelToRaw, &paths.raw_records)?;

        let source = open_source(&self.config.resolve(&paths.workbook))?;
        let sheets = source.load_sheets()?;
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        info!("Loaded {} sheets from {}: {:?}", sheets.len(), source.describe(), names);

        let issues = check_sheets(&sheets, &self.config.columns, &self.config.knowledge_areas);
        if !issues.is_empty() {
            for issue in &issues {
                error!("{}", issue);
            }
            return Err(PipelineError::SheetLayout(issues).into());
        }
        info!("All sheets are ok. Continuing...");

        let raw = RowAggregator::new(&self.config.columns).aggregate_all(&sheets);

        let mut outputs = StageOutputs::new();
        self.save(&paths.raw_records, &raw, &mut outputs)?;
        info!(
            "Saved {} (raw) competencies to {}",
            raw.len(),
            paths.raw_records.display()
        );

        Ok(Some(outputs))
    }

    fn raw_to_clean(&self) -> Result<Option<StageOutputs>> {
        let paths = &self.config.paths;
        self.ensure_absent(Stage::RawToClean, &paths.clean_records)?;

        let raw: Vec<RawRecord> = self.load_audited(&paths.raw_records)?;
        let clean = FieldNormalizer::new(&self.config.columns).normalize_all(&raw)?;

        let mut outputs = StageOutputs::new();
        self.save(&paths.clean_records, &clean, &mut outputs)?;
        info!(
            "Saved {} (clean) competencies to {}",
            clean.len(),
            paths.clean_records.display()
        );

        Ok(Some(outputs))
    }

    fn mark_errors(&self) -> Result<Option<StageOutputs>> {
        let paths = &self.config.paths;
        self.ensure_absent(Stage::MarkErrors, &paths.correct_records)?;
        self.ensure_absent(Stage::MarkErrors, &paths.error_records)?;

        let clean: Vec<CleanRecord> = self.load_audited(&paths.clean_records)?;
        info!("Loaded {} competencies", clean.len());

        let partition = Validator::new(self.config).mark_errors(clean);
        self.log_error_summary(&partition);

        let outputs = self.save_partition(&partition)?;
        Ok(Some(outputs))
    }

    fn verify(&self) -> Result<Option<StageOutputs>> {
        let paths = &self.config.paths;
        if !self.store.is_usable(&paths.error_records) {
            info!(
                "Error competencies file {} is empty or does not exist, nothing to verify",
                paths.error_records.display()
            );
            return Ok(None);
        }

        let rejected: Vec<AnnotatedRecord> = self.load_audited(&paths.error_records)?;
        let accepted: Vec<CleanRecord> = self.load_audited(&paths.correct_records)?;
        info!(
            "Loaded {} (correct) and {} (error) competencies",
            accepted.len(),
            rejected.len()
        );

        let engine = ReverificationEngine::new(Validator::new(self.config));
        let result = engine.reverify(rejected, accepted);
        info!(
            "Corrected {} competencies, {} competencies with errors remain",
            result.corrected,
            result.partition.rejected.len()
        );
        self.log_error_summary(&result.partition);

        let outputs = self.save_partition(&result.partition)?;
        Ok(Some(outputs))
    }

    fn convert_to_artemis(&self) -> Result<Option<StageOutputs>> {
        let paths = &self.config.paths;
        self.ensure_absent(Stage::ConvertToArtemis, &paths.final_records)?;

        let remaining = if self.store.is_usable(&paths.error_records) {
            let rejected: Vec<AnnotatedRecord> = self.load_audited(&paths.error_records)?;
            rejected.len()
        } else {
            warn!(
                "No error competencies found for file {}. Continuing...",
                paths.error_records.display()
            );
            0
        };

        exporter::ensure_complete(remaining).with_context(|| {
            format!(
                "Please fix all errors in the file {} and run again with --finalize \
                 (or --verify to see how many errors have been fixed)",
                paths.error_records.display()
            )
        })?;

        let accepted: Vec<CleanRecord> = self.load_audited(&paths.correct_records)?;
        info!(
            "Loaded {} competencies from {}",
            accepted.len(),
            paths.correct_records.display()
        );

        let exporter = CategoryExporter::new(&self.config.knowledge_areas, &self.config.taxonomy);
        let groups: Vec<KnowledgeAreaGroup> = exporter.export(&accepted, remaining)?;
        let exported: usize = groups.iter().map(|g| g.competencies.len()).sum();

        let mut outputs = StageOutputs::new();
        self.save(&paths.final_records, &groups, &mut outputs)?;
        info!(
            "Saved {} knowledge areas with {} competencies to {}",
            groups.len(),
            exported,
            paths.final_records.display()
        );

        Ok(Some(outputs))
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    /// A stage never overwrites its own output; the operator moves it away to rerun
    fn ensure_absent(&self, stage: Stage, relative: &Path) -> Result<()> {
        if self.store.exists(relative) {
            return Err(PipelineError::OutputExists {
                stage,
                path: relative.to_path_buf(),
            }
            .into());
        }

        if let Some(completion) = self.run_info.completed.get(&stage) {
            info!(
                "{} already completed in run {} but its output was moved away, running it again",
                stage, completion.run
            );
        }
        Ok(())
    }

    /// Load a stage file, noting whether it changed since the pipeline wrote it
    fn load_audited<T: DeserializeOwned>(&self, relative: &Path) -> Result<T> {
        if self.changed_since_written(relative)? {
            let key = relative.display();
            if relative == self.config.paths.error_records.as_path() {
                info!("{} was edited since the last run", key);
            } else {
                warn!("{} changed outside the pipeline since it was written", key);
            }
        }

        self.store.load(relative)
    }

    /// Digest on disk differs from the one recorded when a stage wrote the file
    fn changed_since_written(&self, relative: &Path) -> Result<bool> {
        let key = relative.display().to_string();
        let Some(recorded) = self.run_info.recorded_digest(&key) else {
            return Ok(false);
        };

        Ok(self
            .store
            .digest(relative)?
            .is_some_and(|current| current != recorded))
    }

    fn save<T: Serialize>(
        &self,
        relative: &Path,
        value: &T,
        outputs: &mut StageOutputs,
    ) -> Result<()> {
        let digest = self.store.write_and_backup(relative, value)?;
        outputs.insert(relative.display().to_string(), digest);
        Ok(())
    }

    /// Both partition files land together or not at all
    fn save_partition(&self, partition: &Partition) -> Result<StageOutputs> {
        let paths = &self.config.paths;
        let files = [
            (
                paths.correct_records.as_path(),
                RecordStore::encode(&partition.accepted)?,
            ),
            (
                paths.error_records.as_path(),
                RecordStore::encode(&partition.rejected)?,
            ),
        ];

        let digests = self.store.write_all_and_backup(&files)?;
        let outputs: StageOutputs = files
            .iter()
            .zip(digests)
            .map(|((relative, _), digest)| (relative.display().to_string(), digest))
            .collect();

        info!(
            "Saved {} (correct) competencies to {}",
            partition.accepted.len(),
            paths.correct_records.display()
        );
        info!(
            "Saved {} (error) competencies to {}",
            partition.rejected.len(),
            paths.error_records.display()
        );

        Ok(outputs)
    }

    fn log_error_summary(&self, partition: &Partition) {
        for (kind, count) in partition.error_summary() {
            info!("  {}: {}", kind, count);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ErrorKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str = "KU,Topic,Skill Level,new_in_next_row\n";

    fn workspace(sheets: &[(&str, &str)]) -> (TempDir, PipelineConfig) {
        let dir = tempfile::tempdir().unwrap();
        let sheet_dir = dir.path().join("sheets");
        fs::create_dir_all(&sheet_dir).unwrap();
        for (name, rows) in sheets {
            let content = format!("{}{}", HEADER, rows);
            fs::write(sheet_dir.join(format!("{}.csv", name)), content).unwrap();
        }

        let mut config = PipelineConfig::new(dir.path()).with_backups(false);
        config.paths.workbook = PathBuf::from("sheets");
        (dir, config)
    }

    fn two_sheet_workspace() -> (TempDir, PipelineConfig) {
        workspace(&[
            (
                "SE",
                "Testing,Unit tests,Apply,new_in_next_row\n\
                 Requirements,Elicitation,Explain,new_in_next_row\n\
                 Design,Patterns,Evaluate,new_in_next_row\n",
            ),
            ("AI", "Search,Heuristics,Bogus,new_in_next_row\n"),
        ])
    }

    fn read_json<T: DeserializeOwned>(config: &PipelineConfig, relative: &Path) -> T {
        let content = fs::read_to_string(config.resolve(relative)).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    fn pipeline_error(err: &anyhow::Error) -> &PipelineError {
        err.downcast_ref::<PipelineError>().unwrap()
    }

    #[test]
    fn test_mode_stages() {
        assert_eq!(Mode::VerifyOnly.stages(), vec![Stage::Verify]);
        assert_eq!(
            Mode::Finalize.stages(),
            vec![Stage::Verify, Stage::ConvertToArtemis]
        );
        assert_eq!(Mode::Step(Stage::MarkErrors).stages(), vec![Stage::MarkErrors]);
        assert_eq!(Mode::All.stages().len(), 5);
    }

    #[test]
    fn test_end_to_end_with_manual_fix() {
        let (_dir, config) = two_sheet_workspace();
        let paths = &config.paths;

        let mut pipeline = Pipeline::start(&config).unwrap();
        pipeline
            .run(&[Stage::ExcelToRaw, Stage::RawToClean, Stage::MarkErrors])
            .unwrap();

        let accepted: Vec<CleanRecord> = read_json(&config, &paths.correct_records);
        let mut rejected: Vec<AnnotatedRecord> = read_json(&config, &paths.error_records);
        assert_eq!(accepted.len(), 3);
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].tags().contains(ErrorKind::WrongTaxonomy));
        assert_eq!(rejected[0].record.knowledge_area, "AI");

        // Operator fixes the error file by hand
        rejected[0].record.taxonomy = "Apply".to_string();
        fs::write(
            config.resolve(&paths.error_records),
            serde_json::to_string_pretty(&rejected).unwrap(),
        )
        .unwrap();

        let mut pipeline = Pipeline::start(&config).unwrap();
        assert_eq!(pipeline.run_number(), 2);
        pipeline.run(&Mode::Finalize.stages()).unwrap();

        let accepted: Vec<CleanRecord> = read_json(&config, &paths.correct_records);
        let rejected: Vec<AnnotatedRecord> = read_json(&config, &paths.error_records);
        assert_eq!(accepted.len(), 4);
        assert!(rejected.is_empty());
        assert_eq!(accepted[0].title, "Search");

        let groups: Vec<KnowledgeAreaGroup> = read_json(&config, &paths.final_records);
        assert_eq!(groups.len(), 17);
        assert_eq!(groups[0].title, "Artificial Intelligence");
        assert_eq!(groups[0].competencies.len(), 1);
        assert_eq!(groups[0].competencies[0].taxonomy, "APPLY");
        let se = groups.iter().find(|g| g.title == "Software Engineering").unwrap();
        assert_eq!(se.competencies.len(), 3);
        let total: usize = groups.iter().map(|g| g.competencies.len()).sum();
        assert_eq!(total, 4);

        assert!(pipeline.run_info().is_completed(Stage::ConvertToArtemis));
        let run_info: RunInfo = read_json(&config, &paths.run_info);
        assert_eq!(run_info.number, 2);
        assert_eq!(run_info.completed[&Stage::MarkErrors].run, 1);
        assert_eq!(run_info.completed[&Stage::Verify].run, 2);
    }

    #[test]
    fn test_export_gate_writes_nothing() {
        let (_dir, config) = two_sheet_workspace();
        let mut pipeline = Pipeline::start(&config).unwrap();
        pipeline
            .run(&[Stage::ExcelToRaw, Stage::RawToClean, Stage::MarkErrors])
            .unwrap();

        let err = pipeline.run_stage(Stage::ConvertToArtemis).unwrap_err();

        assert!(matches!(
            pipeline_error(&err),
            PipelineError::ValidationIncomplete { count: 1 }
        ));
        assert!(err.to_string().contains("3_error_competencies.json"));
        assert!(!config.resolve(&config.paths.final_records).exists());
        assert!(!pipeline.run_info().is_completed(Stage::ConvertToArtemis));
    }

    #[test]
    fn test_full_run_stops_at_export_gate() {
        let (_dir, config) = two_sheet_workspace();
        let mut pipeline = Pipeline::start(&config).unwrap();

        let err = pipeline.run(&Mode::All.stages()).unwrap_err();

        assert!(matches!(
            pipeline_error(&err),
            PipelineError::ValidationIncomplete { .. }
        ));
        assert!(pipeline.run_info().is_completed(Stage::Verify));
    }

    #[test]
    fn test_stage_refuses_to_overwrite_output() {
        let (_dir, config) = two_sheet_workspace();
        let mut pipeline = Pipeline::start(&config).unwrap();
        pipeline.run_stage(Stage::ExcelToRaw).unwrap();
        let before = fs::read_to_string(config.resolve(&config.paths.raw_records)).unwrap();

        let err = pipeline.run_stage(Stage::ExcelToRaw).unwrap_err();

        assert!(matches!(
            pipeline_error(&err),
            PipelineError::OutputExists { stage: Stage::ExcelToRaw, .. }
        ));
        let after = fs::read_to_string(config.resolve(&config.paths.raw_records)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_bad_sheets_abort_without_raw_file() {
        let (_dir, config) = workspace(&[
            ("SE", "Testing,Unit tests,Apply,new_in_next_row\n"),
            ("Cooking", "Soup,Stock,Apply,new_in_next_row\n"),
        ]);
        let mut pipeline = Pipeline::start(&config).unwrap();

        let err = pipeline.run_stage(Stage::ExcelToRaw).unwrap_err();

        match pipeline_error(&err) {
            PipelineError::SheetLayout(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].sheet, "Cooking");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!config.resolve(&config.paths.raw_records).exists());
    }

    #[test]
    fn test_missing_input_is_reported() {
        let (_dir, config) = two_sheet_workspace();
        let mut pipeline = Pipeline::start(&config).unwrap();

        let err = pipeline.run_stage(Stage::RawToClean).unwrap_err();

        assert!(matches!(pipeline_error(&err), PipelineError::InputUnusable(_)));
        assert!(!config.resolve(&config.paths.clean_records).exists());
    }

    #[test]
    fn test_verify_without_error_file_is_a_no_op() {
        let (_dir, config) = two_sheet_workspace();
        let mut pipeline = Pipeline::start(&config).unwrap();

        pipeline.run_stage(Stage::Verify).unwrap();

        assert!(!pipeline.run_info().is_completed(Stage::Verify));
        assert!(!config.resolve(&config.paths.correct_records).exists());
    }

    #[test]
    fn test_backups_go_to_run_folder() {
        let (dir, config) = two_sheet_workspace();
        let config = config.with_backups(true);

        let mut pipeline = Pipeline::start(&config).unwrap();
        pipeline.run_stage(Stage::ExcelToRaw).unwrap();

        let backup = dir
            .path()
            .join("data/previous_runs/1/backup_1_raw_competencies.json");
        assert!(backup.is_file());
        // run_info itself is not backed up
        assert!(!dir.path().join("data/previous_runs/1/backup_run_info.json").exists());
    }

    #[test]
    fn test_failed_partition_write_keeps_both_files() {
        let (dir, config) = two_sheet_workspace();
        let paths = &config.paths;
        let mut pipeline = Pipeline::start(&config).unwrap();
        pipeline
            .run(&[Stage::ExcelToRaw, Stage::RawToClean, Stage::MarkErrors])
            .unwrap();

        let mut rejected: Vec<AnnotatedRecord> = read_json(&config, &paths.error_records);
        rejected[0].record.taxonomy = "Apply".to_string();
        fs::write(
            config.resolve(&paths.error_records),
            serde_json::to_string_pretty(&rejected).unwrap(),
        )
        .unwrap();

        // The error file is the second one written; block its temp file
        let blocker = dir.path().join("data/.3_error_competencies.json.tmp");
        fs::create_dir_all(&blocker).unwrap();

        assert!(pipeline.run_stage(Stage::Verify).is_err());

        let accepted: Vec<CleanRecord> = read_json(&config, &paths.correct_records);
        let still_rejected: Vec<AnnotatedRecord> = read_json(&config, &paths.error_records);
        assert_eq!(accepted.len(), 3);
        assert_eq!(still_rejected, rejected);
        assert!(!dir.path().join("data/.3_correct_competencies.json.tmp").exists());
        assert!(!pipeline.run_info().is_completed(Stage::Verify));

        fs::remove_dir(&blocker).unwrap();
        pipeline.run_stage(Stage::Verify).unwrap();

        let accepted: Vec<CleanRecord> = read_json(&config, &paths.correct_records);
        let rejected: Vec<AnnotatedRecord> = read_json(&config, &paths.error_records);
        assert_eq!(accepted.len(), 4);
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_export_without_error_file() {
        let (_dir, config) = two_sheet_workspace();
        let paths = &config.paths;
        let mut pipeline = Pipeline::start(&config).unwrap();
        pipeline
            .run(&[Stage::ExcelToRaw, Stage::RawToClean, Stage::MarkErrors])
            .unwrap();
        fs::remove_file(config.resolve(&paths.error_records)).unwrap();

        pipeline.run_stage(Stage::ConvertToArtemis).unwrap();

        let groups: Vec<KnowledgeAreaGroup> = read_json(&config, &paths.final_records);
        let total: usize = groups.iter().map(|g| g.competencies.len()).sum();
        assert_eq!(groups.len(), 17);
        assert_eq!(total, 3);
        assert!(pipeline.run_info().is_completed(Stage::ConvertToArtemis));
    }

    #[test]
    fn test_full_run_with_empty_error_file_exports() {
        let (_dir, config) = workspace(&[(
            "SE",
            "Testing,Unit tests,Apply,new_in_next_row\n\
             Design,Patterns,Develop,new_in_next_row\n",
        )]);
        let paths = &config.paths;
        let mut pipeline = Pipeline::start(&config).unwrap();

        pipeline.run(&Mode::All.stages()).unwrap();

        let errors = fs::read_to_string(config.resolve(&paths.error_records)).unwrap();
        assert_eq!(errors, "[]");
        let groups: Vec<KnowledgeAreaGroup> = read_json(&config, &paths.final_records);
        let se = groups.iter().find(|g| g.title == "Software Engineering").unwrap();
        let taxonomies: Vec<&str> = se.competencies.iter().map(|c| c.taxonomy.as_str()).collect();
        assert_eq!(taxonomies, vec!["APPLY", "CREATE"]);
    }

    #[test]
    fn test_recorded_digests_track_stage_files() {
        let (_dir, config) = two_sheet_workspace();
        let paths = &config.paths;
        let mut pipeline = Pipeline::start(&config).unwrap();
        pipeline.run_stage(Stage::ExcelToRaw).unwrap();

        let run_info: RunInfo = read_json(&config, &paths.run_info);
        let key = paths.raw_records.display().to_string();
        let on_disk = pipeline.store.digest(&paths.raw_records).unwrap();
        assert_eq!(run_info.recorded_digest(&key), on_disk.as_deref());
        assert!(!pipeline.changed_since_written(&paths.raw_records).unwrap());

        // Same records, different formatting
        let raw: Vec<RawRecord> = read_json(&config, &paths.raw_records);
        fs::write(
            config.resolve(&paths.raw_records),
            serde_json::to_string(&raw).unwrap(),
        )
        .unwrap();
        assert!(pipeline.changed_since_written(&paths.raw_records).unwrap());

        pipeline.run_stage(Stage::RawToClean).unwrap();

        let clean: Vec<CleanRecord> = read_json(&config, &paths.clean_records);
        assert_eq!(clean.len(), 4);
        let run_info: RunInfo = read_json(&config, &paths.run_info);
        let clean_key = paths.clean_records.display().to_string();
        let clean_digest = pipeline.store.digest(&paths.clean_records).unwrap();
        assert_eq!(run_info.recorded_digest(&clean_key), clean_digest.as_deref());
        assert!(!pipeline.changed_since_written(&paths.clean_records).unwrap());
    }
}
