use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Partial,
    Email,
    Phone,
    ExactInFile,
    FuzzySameLocation,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub is_duplicate: bool,
    pub score: f64,
    pub matched_fields: Vec<String>,
    pub match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_row: Option<usize>,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            is_duplicate: false,
            score: 0.0,
            matched_fields: Vec::new(),
            match_type: MatchType::None,
            matched_row: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseMatch {
    pub existing_id: Option<String>,
    pub existing_navn: Option<String>,
    pub existing_adresse: Option<String>,
    pub score: f64,
    pub matched_fields: Vec<String>,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    pub total_rows: usize,
    pub duplicates_in_file: usize,
    pub duplicates_in_database: usize,
    pub unique_new: usize,
    pub to_update: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub in_file: BTreeMap<usize, MatchResult>,
    pub in_database: BTreeMap<usize, DatabaseMatch>,
    pub summary: ReconciliationSummary,
}
