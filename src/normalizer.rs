// Field Normalizer: raw sheet columns → clean record fields

use crate::config::ColumnConfig;
use crate::error::{PipelineError, Result};
use crate::record::{CleanRecord, RawRecord};

/// Word exports leave non-breaking spaces behind
const NBSP: char = '\u{a0}';

pub struct FieldNormalizer<'a> {
    columns: &'a ColumnConfig,
}

impl<'a> FieldNormalizer<'a> {
    pub fn new(columns: &'a ColumnConfig) -> Self {
        FieldNormalizer { columns }
    }

    /// Keep the four mapped columns, drop everything else, strip NBSP
    pub fn normalize(&self, raw: &RawRecord) -> Result<CleanRecord> {
        Ok(CleanRecord {
            title: self.field(raw, &self.columns.title)?,
            description: self.field(raw, &self.columns.description)?,
            taxonomy: self.field(raw, &self.columns.taxonomy)?,
            knowledge_area: self.field(raw, &self.columns.knowledge_area)?,
        })
    }

    pub fn normalize_all(&self, raws: &[RawRecord]) -> Result<Vec<CleanRecord>> {
        raws.iter().map(|raw| self.normalize(raw)).collect()
    }

    fn field(&self, raw: &RawRecord, column: &str) -> Result<String> {
        raw.get(column)
            .map(|value| value.replace(NBSP, ""))
            .ok_or_else(|| PipelineError::MissingField(column.to_string()))
    }
}
