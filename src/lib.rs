// Report Taxonomy - Core Library
// Schema registry, date normalization, filtering and export for multi-type business reports

pub mod taxonomy;   // Report types, subtypes, statuses
pub mod error;      // Typed errors for every layer
pub mod dates;      // Date normalizer - one canonical date
pub mod schema;     // Schema registry - field sets per report kind
pub mod record;     // Records, drafts, submission validation
pub mod filter;     // Filter engine - AND-composed criteria
pub mod export;     // Export projector + CSV/PDF writers
pub mod sync;       // Sync boundary - store client + session
pub mod documents;  // Attachment storage
pub mod config;     // TOML configuration

// Re-export commonly used types
pub use taxonomy::{
    EmployeePeriod, OemSheet, ReportKind, ReportStatus, ReportSubtype, ReportType,
};
pub use error::{
    DateNormalizationError, RecordError, TaxonomyError, ValidationError, ValidationResult,
};
pub use dates::{
    normalize, normalize_value, CanonicalDate, DateFallback, DateInput, DisplayFormat,
};
pub use schema::{
    ColumnDescriptor, ColumnFormat, FieldDescriptor, FieldKind, ReportSchema,
    SchemaGap, SchemaRegistry, SchemaResolution,
};
pub use record::{FieldValue, RawRecord, Record, ReportDraft, ValidatedDraft};
pub use filter::{filter, filter_with, CriteriaError, FilterCriteria, FilterParams};
pub use export::{
    file_name, project, CsvWriter, ExportFormat, ExportProjector, PdfDocument, PdfWriter, Table,
};
pub use sync::{
    FetchOutcome, FetchTicket, InMemorySyncClient, ReportSession, SubmitError, SyncClient,
};
pub use documents::{DocumentKey, DocumentStore, LocalDocumentStore};
pub use config::ReportConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
