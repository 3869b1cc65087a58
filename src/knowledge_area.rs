// 🏷️ Knowledge Areas - the fixed CS2023 curriculum table
//
// A knowledge area is identified interchangeably by its short code ("SE") or its
// display name ("Software Engineering"). Worksheet names use the code because the
// full titles do not fit; the import file uses the display name.

use serde::{Deserialize, Serialize};

// ============================================================================
// KNOWLEDGE AREA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeArea {
    /// Short code, e.g. "SEC"
    pub code: String,

    /// Display name, e.g. "Security"
    pub title: String,
}

impl KnowledgeArea {
    pub fn new(code: &str, title: &str) -> Self {
        KnowledgeArea {
            code: code.to_string(),
            title: title.to_string(),
        }
    }

    /// True if `value` names this area by code or by title
    pub fn matches(&self, value: &str) -> bool {
        value == self.code || value == self.title
    }
}

// ============================================================================
// KNOWLEDGE AREA REGISTRY
// ============================================================================

/// Ordered code → title table
///
/// Order matters: the exporter emits one group per entry in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeAreaRegistry {
    areas: Vec<KnowledgeArea>,
}

impl KnowledgeAreaRegistry {
    pub fn new(areas: Vec<KnowledgeArea>) -> Self {
        KnowledgeAreaRegistry { areas }
    }

    /// The 17 CS2023 knowledge areas
    pub fn with_defaults() -> Self {
        let areas = [
            ("AI", "Artificial Intelligence"),
            ("AL", "Algorithmic Foundations"),
            ("AR", "Architecture and Organization"),
            ("DM", "Data Management"),
            ("FPL", "Foundations of Programming Languages"),
            ("GIT", "Graphics and Interactive Techniques"),
            ("HCI", "Human-Computer Interaction"),
            ("MSF", "Mathematical and Statistical Foundations"),
            ("NC", "Networking and Communication"),
            ("OS", "Operating Systems"),
            ("PDC", "Parallel and Distributed Computing"),
            ("SDF", "Software Development Fundamentals"),
            ("SE", "Software Engineering"),
            ("SEC", "Security"),
            ("SEP", "Society, Ethics, and the Profession"),
            ("SF", "Systems Fundamentals"),
            ("SPD", "Specialized Platform Development"),
        ];

        KnowledgeAreaRegistry::new(
            areas
                .iter()
                .map(|(code, title)| KnowledgeArea::new(code, title))
                .collect(),
        )
    }

    pub fn areas(&self) -> &[KnowledgeArea] {
        &self.areas
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Look up an area by code or display name
    pub fn find(&self, value: &str) -> Option<&KnowledgeArea> {
        self.areas.iter().find(|area| area.matches(value))
    }

    /// Allowed values are the union of codes and display names
    pub fn is_allowed(&self, value: &str) -> bool {
        self.find(value).is_some()
    }
}

impl Default for KnowledgeAreaRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================
