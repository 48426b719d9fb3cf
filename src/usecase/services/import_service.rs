use std::sync::Arc;

use tracing::info;

use crate::domain::entities::customer::{CustomerRecord, FieldMapping};
use crate::domain::entities::matching::ReconciliationReport;
use crate::domain::entities::table::{ParseOptions, ParsedTable};
use crate::domain::header::HeaderPatternLibrary;
use crate::usecase::ports::directory::{CustomerDirectory, DirectoryError, TenantId};
use crate::usecase::services::parse_service::{parse_with_library, ParseError};
use crate::usecase::services::reconcile_service::analyze;

/// Front door for the import pipeline: parsing uploads and reconciling the
/// parsed rows against a tenant's existing customer registry.
pub struct ImportService {
    directory: Arc<dyn CustomerDirectory>,
    patterns: HeaderPatternLibrary,
}

impl ImportService {
    pub fn new(directory: Arc<dyn CustomerDirectory>) -> Self {
        Self {
            directory,
            patterns: HeaderPatternLibrary::default(),
        }
    }

    /// Swap in a locale-specific header pattern library.
    pub fn with_patterns(directory: Arc<dyn CustomerDirectory>, patterns: HeaderPatternLibrary) -> Self {
        Self { directory, patterns }
    }

    pub fn parse(&self, bytes: &[u8], options: &ParseOptions) -> Result<ParsedTable, ParseError> {
        parse_with_library(bytes, options, &self.patterns)
    }

    /// Map parsed rows through a field mapping and classify each against the
    /// rest of the file and the tenant's existing records.
    pub fn reconcile(
        &self,
        tenant: &TenantId,
        table: &ParsedTable,
        mapping: &FieldMapping,
    ) -> Result<ReconciliationReport, DirectoryError> {
        let incoming: Vec<CustomerRecord> = table
            .rows
            .iter()
            .map(|row| CustomerRecord::from_row(row, mapping))
            .collect();
        self.reconcile_records(tenant, &incoming)
    }

    pub fn reconcile_records(
        &self,
        tenant: &TenantId,
        incoming: &[CustomerRecord],
    ) -> Result<ReconciliationReport, DirectoryError> {
        let existing = self.directory.fetch_existing_records(tenant)?;
        info!(
            tenant = %tenant.0,
            incoming = incoming.len(),
            existing = existing.len(),
            "reconciling import"
        );
        Ok(analyze(incoming, &existing))
    }
}
