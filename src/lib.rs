//! Spreadsheet ingestion and duplicate reconciliation for customer imports.
//!
//! Uploaded workbook bytes (xlsx, legacy xls, or csv) are decoded, cleaned
//! and typed into a [`ParsedTable`], and the resulting rows are classified
//! against both the rest of the file and a tenant's existing customer
//! registry. Every call is a pure function of its arguments; the only
//! external collaborator is the [`CustomerDirectory`] port.

pub mod domain;
pub mod infra;
pub mod usecase;

pub use domain::entities::customer::{CustomerRecord, FieldMapping};
pub use domain::entities::matching::{
    DatabaseMatch, MatchResult, MatchType, ReconciliationReport, ReconciliationSummary,
};
pub use domain::entities::table::{
    CellValue, ColumnProfile, ParseOptions, ParsedTable, RowRecord, SheetInfo, Workbook,
};
pub use domain::fieldtype::{detect_field_type, FieldType};
pub use domain::fingerprint::{column_fingerprint, file_hash};
pub use domain::header::HeaderPatternLibrary;
pub use domain::normalize::normalize_for_comparison;
pub use domain::similarity::similarity;
pub use usecase::ports::directory::{CustomerDirectory, DirectoryError, TenantId};
pub use usecase::services::import_service::ImportService;
pub use usecase::services::parse_service::{parse, parse_with_library, parse_workbook, ParseError};
pub use usecase::services::reconcile_service::analyze;
