// Taxonomy vocabularies: CS2023 skill levels → Artemis taxonomies

/// Target vocabulary accepted by the Artemis import
pub const ARTEMIS_TAXONOMIES: [&str; 6] = [
    "REMEMBER",
    "UNDERSTAND",
    "APPLY",
    "ANALYZE",
    "EVALUATE",
    "CREATE",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyMapping {
    /// source value → target value, e.g. "Apply" → "APPLY"
    mapping: Vec<(String, String)>,
    targets: Vec<String>,
}

impl TaxonomyMapping {
    pub fn new(mapping: Vec<(String, String)>, targets: Vec<String>) -> Self {
        TaxonomyMapping { mapping, targets }
    }

    pub fn with_defaults() -> Self {
        let mapping = [
            ("Explain", "UNDERSTAND"),
            ("Apply", "APPLY"),
            ("Evaluate", "EVALUATE"),
            ("Develop", "CREATE"),
        ];

        TaxonomyMapping::new(
            mapping
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            ARTEMIS_TAXONOMIES.iter().map(|t| t.to_string()).collect(),
        )
    }

    /// Allowed values are the source vocabulary plus the target vocabulary
    pub fn is_allowed(&self, value: &str) -> bool {
        self.mapping.iter().any(|(from, _)| from == value)
            || self.targets.iter().any(|target| target == value)
    }

    /// Translate into the target vocabulary; unmapped values pass through unchanged
    /// (some sheets already use the target form)
    pub fn to_target(&self, value: &str) -> String {
        self.mapping
            .iter()
            .find(|(from, _)| from == value)
            .map(|(_, to)| to.clone())
            .unwrap_or_else(|| value.to_string())
    }
}

impl Default for TaxonomyMapping {
    fn default() -> Self {
        Self::with_defaults()
    }
}
