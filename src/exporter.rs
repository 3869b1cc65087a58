// 📦 Category Grouping Exporter - accepted records → Artemis import file
//
// One group per knowledge area, in registry order. Records match a group by
// code or display name, lose their knowledge area and get their taxonomy
// translated into the Artemis vocabulary.

use crate::error::{PipelineError, Result};
use crate::knowledge_area::KnowledgeAreaRegistry;
use crate::record::{CleanRecord, KnowledgeAreaGroup};
use crate::taxonomy::TaxonomyMapping;
use tracing::{info, warn};

pub struct CategoryExporter<'a> {
    knowledge_areas: &'a KnowledgeAreaRegistry,
    taxonomy: &'a TaxonomyMapping,
}

impl<'a> CategoryExporter<'a> {
    pub fn new(knowledge_areas: &'a KnowledgeAreaRegistry, taxonomy: &'a TaxonomyMapping) -> Self {
        CategoryExporter {
            knowledge_areas,
            taxonomy,
        }
    }

    /// Build the import groups
    ///
    /// Refuses while any rejected record remains. Records matching no knowledge
    /// area cannot pass validation; if one slips through it is left out.
    pub fn export(
        &self,
        accepted: &[CleanRecord],
        remaining_errors: usize,
    ) -> Result<Vec<KnowledgeAreaGroup>> {
        ensure_complete(remaining_errors)?;

        let mut groups = Vec::with_capacity(self.knowledge_areas.len());
        let mut exported = 0;

        for area in self.knowledge_areas.areas() {
            let mut group = KnowledgeAreaGroup::new(&area.title);
            group.competencies = accepted
                .iter()
                .filter(|record| area.matches(&record.knowledge_area))
                .map(|record| record.clone().into_final(self.taxonomy))
                .collect();

            info!(
                "Saving knowledge area \"{}\" with {} competencies",
                group.title,
                group.competencies.len()
            );
            exported += group.competencies.len();
            groups.push(group);
        }

        let dropped = accepted.len().saturating_sub(exported);
        if dropped > 0 {
            warn!(dropped, "competencies matched no knowledge area and were left out");
        }

        Ok(groups)
    }
}

/// Export gate: nothing may be exported while rejected records remain
pub fn ensure_complete(remaining_errors: usize) -> Result<()> {
    if remaining_errors > 0 {
        return Err(PipelineError::ValidationIncomplete {
            count: remaining_errors,
        });
    }
    Ok(())
}
