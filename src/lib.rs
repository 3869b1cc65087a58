// Competency Import - Core Library
// Workbook → raw → clean → correct/error → Artemis import file

pub mod aggregator;
pub mod config;
pub mod error;
pub mod exporter;
pub mod knowledge_area;
pub mod logging;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod reverify;
pub mod source;
pub mod state;
pub mod store;
pub mod taxonomy;
pub mod validator;

// Re-export commonly used types
pub use aggregator::RowAggregator;
pub use config::{ColumnConfig, LimitConfig, PathConfig, PipelineConfig};
pub use error::PipelineError;
pub use exporter::CategoryExporter;
pub use knowledge_area::{KnowledgeArea, KnowledgeAreaRegistry};
pub use normalizer::FieldNormalizer;
pub use pipeline::{Mode, Pipeline};
pub use record::{
    AnnotatedRecord, CleanRecord, ErrorKind, ErrorTags, FinalRecord, KnowledgeAreaGroup,
    RawRecord, Verdict,
};
pub use reverify::{Reverification, ReverificationEngine};
pub use source::{
    check_sheets, open_source, CsvDirectory, Sheet, SheetIssue, SourceRow, SpreadsheetWorkbook,
    WorkbookSource,
};
pub use state::{RunInfo, Stage, StageCompletion};
pub use store::RecordStore;
pub use taxonomy::{TaxonomyMapping, ARTEMIS_TAXONOMIES};
pub use validator::{Partition, Validator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
