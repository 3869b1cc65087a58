// ✅ Validator / Error Tagger
//
// Two passes over an ordered sequence of clean records:
// 1. Duplicate titles between neighbours (adjacency only, not a global set)
// 2. Per-record field constraints (line breaks, lengths, vocabularies)
//
// Records with any tag go to the rejected partition and are fixed by hand.

use crate::config::{LimitConfig, PipelineConfig};
use crate::knowledge_area::KnowledgeAreaRegistry;
use crate::record::{AnnotatedRecord, CleanRecord, ErrorKind, ErrorTags, Verdict};
use crate::taxonomy::TaxonomyMapping;
use std::collections::BTreeMap;

// ============================================================================
// PARTITION
// ============================================================================

/// Accepted and rejected records, each in original relative order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub accepted: Vec<CleanRecord>,
    pub rejected: Vec<AnnotatedRecord>,
}

impl Partition {
    pub fn from_verdicts(verdicts: Vec<Verdict>) -> Self {
        let mut partition = Partition::default();
        for verdict in verdicts {
            match verdict {
                Verdict::Accepted(record) => partition.accepted.push(record),
                rejected @ Verdict::Rejected(..) => partition.rejected.push(rejected.into()),
            }
        }
        partition
    }

    /// How many rejected records carry each error kind
    pub fn error_summary(&self) -> BTreeMap<ErrorKind, usize> {
        let mut summary = BTreeMap::new();
        for record in &self.rejected {
            for kind in record.tags().iter() {
                *summary.entry(kind).or_insert(0) += 1;
            }
        }
        summary
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

pub struct Validator<'a> {
    knowledge_areas: &'a KnowledgeAreaRegistry,
    taxonomy: &'a TaxonomyMapping,
    limits: LimitConfig,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Validator {
            knowledge_areas: &config.knowledge_areas,
            taxonomy: &config.taxonomy,
            limits: config.limits,
        }
    }

    /// Validate in order and split into accepted / rejected
    pub fn mark_errors(&self, records: Vec<CleanRecord>) -> Partition {
        Partition::from_verdicts(self.validate(records))
    }

    /// One verdict per record, same order as the input
    pub fn validate(&self, records: Vec<CleanRecord>) -> Vec<Verdict> {
        let mut tags = vec![ErrorTags::new(); records.len()];

        // Pass 1: neighbours with the same title are both tagged
        for i in 1..records.len() {
            if records[i].title == records[i - 1].title {
                tags[i - 1].insert(ErrorKind::DuplicateTitle);
                tags[i].insert(ErrorKind::DuplicateTitle);
            }
        }

        // Pass 2: field constraints, each record on its own
        records
            .into_iter()
            .zip(tags)
            .map(|(record, mut record_tags)| {
                self.check_fields(&record, &mut record_tags);
                Verdict::from_tags(record, record_tags)
            })
            .collect()
    }

    fn check_fields(&self, record: &CleanRecord, tags: &mut ErrorTags) {
        // A line break in the title means two records were merged
        if record.title.contains('\n') {
            tags.insert(ErrorKind::MultipleTitles);
        }

        if record.title.chars().count() > self.limits.max_title_length {
            tags.insert(ErrorKind::TitleTooLong);
        }

        if record.description.chars().count() > self.limits.max_description_length {
            tags.insert(ErrorKind::DescriptionTooLong);
        }

        if !self.taxonomy.is_allowed(&record.taxonomy) {
            tags.insert(ErrorKind::WrongTaxonomy);
        }

        if !self.knowledge_areas.is_allowed(&record.knowledge_area) {
            tags.insert(ErrorKind::WrongKnowledgeArea);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
