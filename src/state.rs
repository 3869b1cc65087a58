// ⏱️ Run state - run counter plus an explicit record of completed stages
//
// Persisted as run_info.json next to the workbook:
// { "number": 7, "completed": { "mark_errors": { "run": 7, "completed_at": ..., "outputs": {...} } } }

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// STAGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ExcelToRaw,
    RawToClean,
    MarkErrors,
    Verify,
    ConvertToArtemis,
}

impl Stage {
    /// Pipeline order
    pub const ALL: [Stage; 5] = [
        Stage::ExcelToRaw,
        Stage::RawToClean,
        Stage::MarkErrors,
        Stage::Verify,
        Stage::ConvertToArtemis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ExcelToRaw => "excel_to_raw",
            Stage::RawToClean => "raw_to_clean",
            Stage::MarkErrors => "mark_errors",
            Stage::Verify => "verify",
            Stage::ConvertToArtemis => "convert_to_artemis",
        }
    }

    /// Banner text for logs
    pub fn description(&self) -> &'static str {
        match self {
            Stage::ExcelToRaw => "conversion excel -> raw competencies",
            Stage::RawToClean => "conversion raw -> clean competencies",
            Stage::MarkErrors => "error marking",
            Stage::Verify => "verification",
            Stage::ConvertToArtemis => "conversion to Artemis import file",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RUN INFO
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCompletion {
    /// Run number that completed the stage
    pub run: u64,
    pub completed_at: DateTime<Utc>,
    /// Output file (relative path) → sha256 of what was written
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Incremented once per invocation; names the backup folder
    pub number: u64,

    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub completed: BTreeMap<Stage, StageCompletion>,
}

impl RunInfo {
    /// Start a new run and return its number
    pub fn begin_run(&mut self) -> u64 {
        self.number += 1;
        self.number
    }

    pub fn mark_completed(&mut self, stage: Stage, outputs: BTreeMap<String, String>) {
        self.completed.insert(
            stage,
            StageCompletion {
                run: self.number,
                completed_at: Utc::now(),
                outputs,
            },
        );
    }

    pub fn is_completed(&self, stage: Stage) -> bool {
        self.completed.contains_key(&stage)
    }

    /// Latest digest recorded for an output file, across all stages
    pub fn recorded_digest(&self, file: &str) -> Option<&str> {
        self.completed
            .values()
            .filter_map(|completion| {
                completion
                    .outputs
                    .get(file)
                    .map(|digest| (completion.completed_at, digest))
            })
            .max_by_key(|(completed_at, _)| *completed_at)
            .map(|(_, digest)| digest.as_str())
    }
}

// ============================================================================
// TESTS
// ============================================================================
