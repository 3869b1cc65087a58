// 📄 Competency records, one type per pipeline stage
//
// raw (sheet columns) → clean (renamed fields) → verdict / annotated (validation)
// → final (Artemis shape, grouped by knowledge area)

use crate::taxonomy::TaxonomyMapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RAW RECORD (stage 1 output)
// ============================================================================

/// Column name → accumulated cell text
///
/// Keeps every tracked sheet column, not only the mapped ones; the normalizer
/// decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        RawRecord::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn insert(&mut self, column: &str, value: String) {
        self.fields.insert(column.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawRecord {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// CLEAN RECORD (stage 2 output, accepted partition)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub title: String,
    pub description: String,
    pub taxonomy: String,

    /// Knowledge area code or display name
    #[serde(rename = "knowledgeArea")]
    pub knowledge_area: String,
}

impl CleanRecord {
    pub fn new(title: &str, description: &str, taxonomy: &str, knowledge_area: &str) -> Self {
        CleanRecord {
            title: title.to_string(),
            description: description.to_string(),
            taxonomy: taxonomy.to_string(),
            knowledge_area: knowledge_area.to_string(),
        }
    }

    /// Artemis shape: taxonomy translated, knowledge area dropped (it becomes the group)
    pub fn into_final(self, taxonomy: &TaxonomyMapping) -> FinalRecord {
        FinalRecord {
            taxonomy: taxonomy.to_target(&self.taxonomy),
            title: self.title,
            description: self.description,
        }
    }
}

// ============================================================================
// ERROR KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Same title as the neighbouring record
    DuplicateTitle,
    /// Title spans several lines, usually a missing continuation marker
    MultipleTitles,
    TitleTooLong,
    DescriptionTooLong,
    WrongTaxonomy,
    WrongKnowledgeArea,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::DuplicateTitle,
        ErrorKind::MultipleTitles,
        ErrorKind::TitleTooLong,
        ErrorKind::DescriptionTooLong,
        ErrorKind::WrongTaxonomy,
        ErrorKind::WrongKnowledgeArea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DuplicateTitle => "DUPLICATE_TITLE",
            ErrorKind::MultipleTitles => "MULTIPLE_TITLES",
            ErrorKind::TitleTooLong => "TITLE_TOO_LONG",
            ErrorKind::DescriptionTooLong => "DESCRIPTION_TOO_LONG",
            ErrorKind::WrongTaxonomy => "WRONG_TAXONOMY",
            ErrorKind::WrongKnowledgeArea => "WRONG_KNOWLEDGE_AREA",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown error tag: {}", s))
    }
}

// ============================================================================
// ERROR TAGS
// ============================================================================

/// Insertion-ordered set of error kinds attached to one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTags(Vec<ErrorKind>);

impl ErrorTags {
    pub fn new() -> Self {
        ErrorTags::default()
    }

    /// Add a tag; tagging twice is a no-op
    pub fn insert(&mut self, kind: ErrorKind) {
        if !self.0.contains(&kind) {
            self.0.push(kind);
        }
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.0.iter().copied()
    }

    /// Parse a persisted error field
    ///
    /// Empty segments (older files carry a leading comma) and unknown tags are skipped.
    pub fn parse(field: &str) -> Self {
        let mut tags = ErrorTags::new();
        for kind in field
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| segment.parse::<ErrorKind>().ok())
        {
            tags.insert(kind);
        }
        tags
    }
}

impl fmt::Display for ErrorTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ErrorKind::as_str)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

// ============================================================================
// VERDICT / ANNOTATED RECORD
// ============================================================================

/// Validation outcome for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(CleanRecord),
    Rejected(CleanRecord, ErrorTags),
}

impl Verdict {
    /// Tags decide the variant: no tags means accepted
    pub fn from_tags(record: CleanRecord, tags: ErrorTags) -> Self {
        if tags.is_empty() {
            Verdict::Accepted(record)
        } else {
            Verdict::Rejected(record, tags)
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }

    pub fn tags(&self) -> Option<&ErrorTags> {
        match self {
            Verdict::Accepted(_) => None,
            Verdict::Rejected(_, tags) => Some(tags),
        }
    }
}

/// Persisted shape of the error file: a clean record plus its error field
///
/// Operators edit this file by hand, so it stays a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub record: CleanRecord,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnnotatedRecord {
    pub fn tags(&self) -> ErrorTags {
        self.error.as_deref().map(ErrorTags::parse).unwrap_or_default()
    }

    /// Drop the error field, ready for another validation pass
    pub fn into_clean(self) -> CleanRecord {
        self.record
    }
}

impl From<Verdict> for AnnotatedRecord {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted(record) => AnnotatedRecord {
                record,
                error: None,
            },
            Verdict::Rejected(record, tags) => AnnotatedRecord {
                record,
                error: Some(tags.to_string()),
            },
        }
    }
}

// ============================================================================
// FINAL SHAPE (Artemis import)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRecord {
    pub title: String,
    pub description: String,
    pub taxonomy: String,
}

/// One knowledge area in the import file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeAreaGroup {
    /// Display name of the area
    pub title: String,
    pub description: String,
    pub competencies: Vec<FinalRecord>,
}

impl KnowledgeAreaGroup {
    pub fn new(title: &str) -> Self {
        KnowledgeAreaGroup {
            title: title.to_string(),
            description: String::new(),
            competencies: Vec::new(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
