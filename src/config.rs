// ⚙️ Pipeline configuration
//
// Built once at startup and passed by reference to every stage. Defaults
// reproduce the CS2023 → Artemis setup; an optional TOML file overrides
// paths, column names and limits.

use crate::error::PipelineError;
use crate::knowledge_area::KnowledgeAreaRegistry;
use crate::taxonomy::TaxonomyMapping;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// FILE LAYOUT
// ============================================================================

/// All paths are relative to `PipelineConfig::base_dir`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub workbook: PathBuf,
    pub previous_runs_dir: PathBuf,
    pub raw_records: PathBuf,
    pub clean_records: PathBuf,
    pub correct_records: PathBuf,
    pub error_records: PathBuf,
    pub final_records: PathBuf,
    pub run_info: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        let data = Path::new("data");
        PathConfig {
            workbook: PathBuf::from("CS2023_Knowledge_Areas.xlsm"),
            previous_runs_dir: data.join("previous_runs"),
            raw_records: data.join("1_raw_competencies.json"),
            clean_records: data.join("2_clean_competencies.json"),
            correct_records: data.join("3_correct_competencies.json"),
            error_records: data.join("3_error_competencies.json"),
            final_records: PathBuf::from("competencies_for_import.json"),
            run_info: PathBuf::from("run_info.json"),
        }
    }
}

// ============================================================================
// SHEET COLUMNS
// ============================================================================

/// Raw column names as they appear in the workbook and the raw records file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub title: String,
    pub description: String,
    pub taxonomy: String,
    /// Continuation marker column
    pub new_object: String,
    /// Cell value in `new_object` that closes the current record
    pub new_object_marker: String,
    /// Added by the aggregator, never read from a sheet
    pub knowledge_area: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            title: "KU".to_string(),
            description: "Topic".to_string(),
            taxonomy: "Skill Level".to_string(),
            new_object: "new_in_next_row".to_string(),
            new_object_marker: "new_in_next_row".to_string(),
            knowledge_area: "KA".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Columns every worksheet must provide
    pub fn required_sheet_columns(&self) -> [&str; 4] {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.taxonomy.as_str(),
            self.new_object.as_str(),
        ]
    }
}

// ============================================================================
// VALIDATION LIMITS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub max_title_length: usize,
    pub max_description_length: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        LimitConfig {
            max_title_length: 255,
            max_description_length: 2000,
        }
    }
}

// ============================================================================
// TOML OVERRIDES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ConfigFile {
    do_backups: bool,
    paths: PathConfig,
    columns: ColumnConfig,
    limits: LimitConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            do_backups: true,
            paths: PathConfig::default(),
            columns: ColumnConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

// ============================================================================
// PIPELINE CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Every relative path resolves against this directory
    pub base_dir: PathBuf,

    /// Copy every stage output into `previous_runs/<run>/`
    pub do_backups: bool,

    pub paths: PathConfig,
    pub columns: ColumnConfig,
    pub limits: LimitConfig,
    pub knowledge_areas: KnowledgeAreaRegistry,
    pub taxonomy: TaxonomyMapping,
}

impl PipelineConfig {
    /// Default configuration rooted at `base_dir`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        PipelineConfig::from_file_config(base_dir.as_ref(), ConfigFile::default())
    }

    /// Defaults overridden by a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(base_dir: P, config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        PipelineConfig::from_toml_str(base_dir, &content)
            .with_context(|| format!("Invalid config file: {:?}", config_path))
    }

    pub fn from_toml_str<P: AsRef<Path>>(base_dir: P, content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config = PipelineConfig::from_file_config(base_dir.as_ref(), file);
        config.check()?;
        Ok(config)
    }

    fn from_file_config(base_dir: &Path, file: ConfigFile) -> Self {
        PipelineConfig {
            base_dir: base_dir.to_path_buf(),
            do_backups: file.do_backups,
            paths: file.paths,
            columns: file.columns,
            limits: file.limits,
            knowledge_areas: KnowledgeAreaRegistry::with_defaults(),
            taxonomy: TaxonomyMapping::with_defaults(),
        }
    }

    pub fn with_backups(mut self, do_backups: bool) -> Self {
        self.do_backups = do_backups;
        self
    }

    /// Resolve a configured relative path against the base directory
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.base_dir.join(relative)
    }

    fn check(&self) -> Result<(), PipelineError> {
        let columns = &self.columns;
        let mut names = vec![
            columns.title.as_str(),
            columns.description.as_str(),
            columns.taxonomy.as_str(),
            columns.new_object.as_str(),
            columns.knowledge_area.as_str(),
        ];

        if names.iter().any(|name| name.is_empty()) {
            return Err(PipelineError::Config(
                "column names must not be empty".to_string(),
            ));
        }

        names.sort_unstable();
        names.dedup();
        if names.len() != 5 {
            return Err(PipelineError::Config(
                "column names must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
