use crate::domain::entities::customer::CustomerRecord;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(pub String);

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        TenantId(value)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        TenantId(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    Message(String),
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Read-only, tenant-scoped listing of existing customers. The database
/// duplicate scan returns the first match in the order this port yields
/// records, so implementations must present a stable, meaningful order
/// (most-recently-updated first is the expected convention).
pub trait CustomerDirectory: Send + Sync {
    fn fetch_existing_records(&self, tenant: &TenantId) -> Result<Vec<CustomerRecord>, DirectoryError>;
}
