// Typed pipeline failures
// Everything an operator can act on gets its own variant; I/O and JSON problems
// travel as anyhow errors with file context instead.

use crate::source::SheetIssue;
use crate::state::Stage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Stage output is already on disk; the operator has to move it to rerun
    #[error("{} already exists! Move it away if you want to run step `{stage}` again", .path.display())]
    OutputExists { stage: Stage, path: PathBuf },

    #[error("file {} is empty or does not exist", .0.display())]
    InputUnusable(PathBuf),

    #[error("workbook does not match the expected layout:\n{}", format_issues(.0))]
    SheetLayout(Vec<SheetIssue>),

    /// Raw record lacks a column the normalizer maps; aggregation and mapping are out of sync
    #[error("raw record is missing field `{0}`")]
    MissingField(String),

    #[error("{count} competencies with errors still exist")]
    ValidationIncomplete { count: usize },

    #[error("unsupported workbook source: {}", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("config error: {0}")]
    Config(String),
}

fn format_issues(issues: &[SheetIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, PipelineError>;
