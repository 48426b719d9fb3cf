use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::domain::entities::customer::CustomerRecord;
use crate::domain::entities::matching::{
    DatabaseMatch, MatchResult, MatchType, ReconciliationReport, ReconciliationSummary,
};
use crate::domain::normalize::normalize_for_comparison;
use crate::domain::similarity::similarity;

const FUZZY_NAME_THRESHOLD: f64 = 0.9;
const FUZZY_ADDRESS_THRESHOLD: f64 = 0.8;
const EMAIL_SCORE: f64 = 0.95;
const PHONE_SCORE: f64 = 0.9;
const MIN_PHONE_DIGITS: usize = 8;

fn normalized(field: Option<&str>) -> String {
    field.map(normalize_for_comparison).unwrap_or_default()
}

fn phone_digits(field: Option<&str>) -> String {
    field
        .unwrap_or_default()
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .collect()
}

fn result(match_type: MatchType, score: f64, fields: &[&str]) -> MatchResult {
    MatchResult {
        is_duplicate: true,
        score,
        matched_fields: fields.iter().map(|f| f.to_string()).collect(),
        match_type,
        matched_row: None,
    }
}

/// Ordered matching cascade between two customer-shaped records; the first
/// rule that fires wins. Missing fields fail their branch and fall through,
/// never error.
pub fn compare_records(a: &CustomerRecord, b: &CustomerRecord) -> MatchResult {
    let name_a = normalized(a.navn.as_deref());
    let name_b = normalized(b.navn.as_deref());
    let addr_a = normalized(a.adresse.as_deref());
    let addr_b = normalized(b.adresse.as_deref());

    let names_equal = !name_a.is_empty() && name_a == name_b;
    let addresses_equal = !addr_a.is_empty() && addr_a == addr_b;

    if names_equal && addresses_equal {
        return result(MatchType::Exact, 1.0, &["navn", "adresse"]);
    }

    if !name_a.is_empty() && !name_b.is_empty() && !addr_a.is_empty() && !addr_b.is_empty() {
        let name_score = similarity(&name_a, &name_b);
        let addr_score = similarity(&addr_a, &addr_b);
        if name_score >= FUZZY_NAME_THRESHOLD && addr_score >= FUZZY_NAME_THRESHOLD {
            return result(
                MatchType::Fuzzy,
                (name_score + addr_score) / 2.0,
                &["navn", "adresse"],
            );
        }
        if names_equal && addr_score >= FUZZY_ADDRESS_THRESHOLD {
            return result(MatchType::Partial, addr_score, &["navn", "adresse"]);
        }
    }

    if let (Some(email_a), Some(email_b)) = (a.epost.as_deref(), b.epost.as_deref()) {
        let email_a = email_a.trim();
        let email_b = email_b.trim();
        if !email_a.is_empty() && email_a.eq_ignore_ascii_case(email_b) {
            return result(MatchType::Email, EMAIL_SCORE, &["epost"]);
        }
    }

    let phone_a = phone_digits(a.telefon.as_deref());
    let phone_b = phone_digits(b.telefon.as_deref());
    if phone_a.len() >= MIN_PHONE_DIGITS && phone_a == phone_b {
        return result(MatchType::Phone, PHONE_SCORE, &["telefon"]);
    }

    MatchResult::none()
}

/// Single forward scan marking repeated rows within the upload itself. The
/// first row holding a given normalized name|address key is the canonical
/// original; every later row with the same key points back at it. File
/// internal duplicates come from repeated exports and are expected to match
/// exactly, so this pass never invokes the fuzzy cascade.
pub fn find_duplicates_in_file(rows: &[CustomerRecord]) -> BTreeMap<usize, MatchResult> {
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates = BTreeMap::new();

    for (index, row) in rows.iter().enumerate() {
        let name = normalized(row.navn.as_deref());
        let address = normalized(row.adresse.as_deref());
        if name.is_empty() && address.is_empty() {
            continue;
        }
        let key = format!("{name}|{address}");
        match first_seen.get(&key) {
            Some(&original) => {
                debug!(row = index, original, "exact duplicate within file");
                let mut hit = result(MatchType::ExactInFile, 1.0, &["navn", "adresse"]);
                hit.matched_row = Some(original);
                duplicates.insert(index, hit);
            }
            None => {
                first_seen.insert(key, index);
            }
        }
    }

    duplicates
}

/// Linear scan over the tenant's existing records, returning the first hit.
/// Relies on the directory port presenting records in a stable, meaningful
/// order (see `CustomerDirectory`).
pub fn find_duplicate_in_database(
    row: &CustomerRecord,
    existing_records: &[CustomerRecord],
) -> Option<DatabaseMatch> {
    let name = normalized(row.navn.as_deref());
    let address = normalized(row.adresse.as_deref());
    let locality = normalized(row.poststed.as_deref());
    let email = row.epost.as_deref().map(str::trim).unwrap_or_default();
    let phone = phone_digits(row.telefon.as_deref());

    for existing in existing_records {
        let existing_name = normalized(existing.navn.as_deref());
        let existing_address = normalized(existing.adresse.as_deref());

        let hit = if !name.is_empty() && name == existing_name && !address.is_empty()
            && address == existing_address
        {
            Some((MatchType::Exact, 1.0, vec!["navn", "adresse"]))
        } else if !name.is_empty() && !existing_name.is_empty() && !locality.is_empty() {
            let name_score = similarity(&name, &existing_name);
            let existing_locality = normalized(existing.poststed.as_deref());
            if name_score >= FUZZY_NAME_THRESHOLD && locality == existing_locality {
                Some((MatchType::FuzzySameLocation, name_score, vec!["navn", "poststed"]))
            } else {
                None
            }
        } else {
            None
        };

        let hit = hit.or_else(|| {
            let existing_email = existing.epost.as_deref().map(str::trim).unwrap_or_default();
            if !email.is_empty() && email.eq_ignore_ascii_case(existing_email) {
                return Some((MatchType::Email, EMAIL_SCORE, vec!["epost"]));
            }
            let existing_phone = phone_digits(existing.telefon.as_deref());
            if phone.len() >= MIN_PHONE_DIGITS && phone == existing_phone {
                return Some((MatchType::Phone, PHONE_SCORE, vec!["telefon"]));
            }
            None
        });

        if let Some((match_type, score, fields)) = hit {
            return Some(DatabaseMatch {
                existing_id: existing.id.clone(),
                existing_navn: existing.navn.clone(),
                existing_adresse: existing.adresse.clone(),
                score,
                matched_fields: fields.into_iter().map(|f| f.to_string()).collect(),
                match_type,
            });
        }
    }

    None
}

/// Classify every parsed row as in-file duplicate, database duplicate or
/// unique new record. Rows flagged within the file are never also evaluated
/// against the database; their canonical sibling carries that
/// responsibility, so nothing is double-counted into `to_update`.
pub fn analyze(
    rows: &[CustomerRecord],
    existing_records: &[CustomerRecord],
) -> ReconciliationReport {
    let in_file = find_duplicates_in_file(rows);

    let mut in_database = BTreeMap::new();
    for (index, row) in rows.iter().enumerate() {
        if in_file.contains_key(&index) {
            continue;
        }
        if let Some(hit) = find_duplicate_in_database(row, existing_records) {
            debug!(row = index, match_type = ?hit.match_type, "duplicate against directory");
            in_database.insert(index, hit);
        }
    }

    let total_rows = rows.len();
    let duplicates_in_file = in_file.len();
    let duplicates_in_database = in_database.len();
    let unique_new = total_rows - duplicates_in_file - duplicates_in_database;

    info!(
        total_rows,
        duplicates_in_file, duplicates_in_database, unique_new, "reconciliation complete"
    );

    ReconciliationReport {
        in_file,
        in_database,
        summary: ReconciliationSummary {
            total_rows,
            duplicates_in_file,
            duplicates_in_database,
            unique_new,
            to_update: duplicates_in_database,
        },
    }
}
