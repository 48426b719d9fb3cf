pub mod import_service;
pub mod parse_service;
pub mod reconcile_service;
