// 📥 Workbook sources
// One worksheet per knowledge area, read into plain rows of named cells.
//
// Two backends behind one trait:
// - SpreadsheetWorkbook: .xlsx / .xlsm / .xlsb / .xls / .ods via calamine
// - CsvDirectory: a folder of `<sheet name>.csv` files (exported workbooks, fixtures)

use crate::config::ColumnConfig;
use crate::error::PipelineError;
use crate::knowledge_area::KnowledgeAreaRegistry;
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One data row; absent (null or blank) cells are simply not stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    cells: BTreeMap<String, String>,
}

impl SourceRow {
    pub fn new() -> Self {
        SourceRow::default()
    }

    /// Builder: set a cell; empty strings count as absent
    pub fn with_cell(mut self, column: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.cells.insert(column.to_string(), value.to_string());
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,

    /// Header row, in sheet order
    pub columns: Vec<String>,

    pub rows: Vec<SourceRow>,
}

impl Sheet {
    pub fn new(name: &str, columns: &[&str], rows: Vec<SourceRow>) -> Self {
        Sheet {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Build a sheet from a cell grid whose first row is the header
    pub fn from_grid(name: &str, grid: Vec<Vec<Option<String>>>) -> Self {
        let mut grid = grid.into_iter();
        let header: Vec<Option<String>> = grid.next().unwrap_or_default();

        let rows = grid
            .map(|cells| {
                let mut row = SourceRow::new();
                for (column, cell) in header.iter().zip(cells) {
                    if let (Some(column), Some(value)) = (column, cell) {
                        row = row.with_cell(column, &value);
                    }
                }
                row
            })
            .collect();

        Sheet {
            name: name.to_string(),
            columns: header.into_iter().flatten().collect(),
            rows,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

// ============================================================================
// LAYOUT CHECK
// ============================================================================

/// Everything wrong with one worksheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetIssue {
    pub sheet: String,
    pub missing_columns: Vec<String>,
    /// Sheet name is neither a knowledge-area code nor a display name
    pub unknown_name: bool,
}

impl fmt::Display for SheetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut problems = Vec::new();
        if !self.missing_columns.is_empty() {
            problems.push(format!("is missing columns {:?}", self.missing_columns));
        }
        if self.unknown_name {
            problems.push("has a name that is not a known knowledge area".to_string());
        }
        write!(f, "sheet \"{}\" {}", self.sheet, problems.join(" and "))
    }
}

/// Check every sheet and report all offenders, not just the first
pub fn check_sheets(
    sheets: &[Sheet],
    columns: &ColumnConfig,
    knowledge_areas: &KnowledgeAreaRegistry,
) -> Vec<SheetIssue> {
    sheets
        .iter()
        .filter_map(|sheet| {
            let missing_columns: Vec<String> = columns
                .required_sheet_columns()
                .iter()
                .filter(|column| !sheet.has_column(column))
                .map(|column| column.to_string())
                .collect();
            let unknown_name = !knowledge_areas.is_allowed(&sheet.name);

            if missing_columns.is_empty() && !unknown_name {
                None
            } else {
                Some(SheetIssue {
                    sheet: sheet.name.clone(),
                    missing_columns,
                    unknown_name,
                })
            }
        })
        .collect()
}

// ============================================================================
// SOURCE TRAIT + FACTORY
// ============================================================================

pub trait WorkbookSource {
    /// All worksheets in workbook order
    fn load_sheets(&self) -> Result<Vec<Sheet>>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// Pick a backend from the path: directories are CSV folders, files go by extension
pub fn open_source(path: &Path) -> Result<Box<dyn WorkbookSource>> {
    if !path.exists() {
        return Err(PipelineError::InputUnusable(path.to_path_buf()).into());
    }

    if path.is_dir() {
        return Ok(Box::new(CsvDirectory::new(path)));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(SpreadsheetWorkbook::new(path))),
        _ => Err(PipelineError::UnsupportedSource(path.to_path_buf()).into()),
    }
}

// ============================================================================
// SPREADSHEET WORKBOOK (calamine)
// ============================================================================

pub struct SpreadsheetWorkbook {
    path: PathBuf,
}

impl SpreadsheetWorkbook {
    pub fn new(path: &Path) -> Self {
        SpreadsheetWorkbook {
            path: path.to_path_buf(),
        }
    }
}

impl WorkbookSource for SpreadsheetWorkbook {
    fn load_sheets(&self) -> Result<Vec<Sheet>> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| anyhow!("Failed to open workbook {}: {}", self.path.display(), e))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| anyhow!("Failed to read sheet \"{}\": {}", name, e))?;

            let grid = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();

            let sheet = Sheet::from_grid(&name, grid);
            debug!(sheet = %sheet.name, rows = sheet.rows.len(), "loaded worksheet");
            sheets.push(sheet);
        }

        Ok(sheets)
    }

    fn describe(&self) -> String {
        format!("workbook {}", self.path.display())
    }
}

/// Blank cells are absent, everything else is rendered as text
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// CSV DIRECTORY
// ============================================================================

pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: &Path) -> Self {
        CsvDirectory {
            dir: dir.to_path_buf(),
        }
    }

    fn sheet_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list sheet directory: {:?}", self.dir))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if path.is_file() && is_csv {
                files.push(path);
            }
        }

        // read_dir order is platform dependent
        files.sort();
        Ok(files)
    }

    fn read_sheet(path: &Path) -> Result<Sheet> {
        let name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Sheet file has no usable name: {:?}", path))?
            .to_string();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open sheet file: {:?}", path))?;

        let mut grid = Vec::new();
        for (line_num, result) in reader.records().enumerate() {
            let record = result.with_context(|| {
                format!("Failed to parse CSV line {} in {:?}", line_num + 1, path)
            })?;

            let cells = record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            grid.push(cells);
        }

        Ok(Sheet::from_grid(&name, grid))
    }
}

impl WorkbookSource for CsvDirectory {
    fn load_sheets(&self) -> Result<Vec<Sheet>> {
        self.sheet_files()?
            .iter()
            .map(|path| CsvDirectory::read_sheet(path))
            .collect()
    }

    fn describe(&self) -> String {
        format!("sheet directory {}", self.dir.display())
    }
}

// ============================================================================
// TESTS
// ============================================================================
