// 🧩 Row Aggregator - rebuilds logical records from sheet rows
//
// A knowledge unit usually spans several physical rows (one per paragraph of the
// topic text, or one per skill level). Rows accumulate until a row carries the
// "new object" marker; that row closes the record.

use crate::config::ColumnConfig;
use crate::record::RawRecord;
use crate::source::Sheet;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub struct RowAggregator<'a> {
    columns: &'a ColumnConfig,
}

impl<'a> RowAggregator<'a> {
    pub fn new(columns: &'a ColumnConfig) -> Self {
        RowAggregator { columns }
    }

    /// Aggregate every sheet, concatenating records in sheet order
    ///
    /// The sheet name is the knowledge area of all its records.
    pub fn aggregate_all(&self, sheets: &[Sheet]) -> Vec<RawRecord> {
        sheets
            .iter()
            .flat_map(|sheet| self.aggregate_sheet(sheet, &sheet.name))
            .collect()
    }

    pub fn aggregate_sheet(&self, sheet: &Sheet, knowledge_area: &str) -> Vec<RawRecord> {
        // Every column except the marker is carried into the record
        let tracked: Vec<&str> = sheet
            .columns
            .iter()
            .map(String::as_str)
            .filter(|column| *column != self.columns.new_object)
            .collect();

        let mut records = Vec::new();
        let mut current = empty_fields(&tracked);
        let mut last = empty_fields(&tracked);

        for row in &sheet.rows {
            for column in &tracked {
                if let Some(value) = row.get(column) {
                    if let Some(text) = current.get_mut(*column) {
                        text.push_str(value);
                        text.push('\n');
                    }
                }
            }

            if row.get(&self.columns.new_object) == Some(self.columns.new_object_marker.as_str()) {
                let record = self.finish_record(&current, &last, knowledge_area);
                last = current
                    .keys()
                    .map(|column| {
                        let value = record.get(column).unwrap_or_default().to_string();
                        (column.clone(), value)
                    })
                    .collect();
                records.push(record);
                current = empty_fields(&tracked);
            }
        }

        if current.values().any(|text| !text.is_empty()) {
            warn!(
                sheet = %sheet.name,
                "rows after the last continuation marker were ignored"
            );
        }
        debug!(sheet = %sheet.name, records = records.len(), "aggregated sheet");

        records
    }

    /// Trim, back-fill empty fields from the previous record, attach the knowledge area
    fn finish_record(
        &self,
        current: &BTreeMap<String, String>,
        last: &BTreeMap<String, String>,
        knowledge_area: &str,
    ) -> RawRecord {
        let mut record = RawRecord::new();

        for (column, text) in current {
            let trimmed = text.trim();
            let value = if trimmed.is_empty() {
                last.get(column).cloned().unwrap_or_default()
            } else {
                trimmed.to_string()
            };
            record.insert(column, value);
        }

        record.insert(&self.columns.knowledge_area, knowledge_area.to_string());
        record
    }
}

fn empty_fields(columns: &[&str]) -> BTreeMap<String, String> {
    columns
        .iter()
        .map(|column| (column.to_string(), String::new()))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
