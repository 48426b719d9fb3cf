use sha2::{Digest, Sha256};

const FINGERPRINT_LEN: usize = 16;

/// Order-independent digest of a header set. Lower-case, trim, collapse
/// internal whitespace runs, sort, join and hash, so re-exports with
/// reordered columns are still recognized as the same file shape.
pub fn column_fingerprint(headers: &[String]) -> String {
    let mut tokens: Vec<String> = headers
        .iter()
        .map(|header| {
            header
                .trim()
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
        })
        .collect();
    tokens.sort();

    let mut hasher = Sha256::new();
    hasher.update(tokens.join("|").as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Content digest of the raw upload bytes.
pub fn file_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let a = column_fingerprint(&headers(&["Navn", "Adresse"]));
        let b = column_fingerprint(&headers(&["Adresse", "Navn"]));
        assert_eq!(a, b, "reordered columns should fingerprint identically");
    }

    #[test]
    fn fingerprint_ignores_case_and_whitespace_runs() {
        let a = column_fingerprint(&headers(&["Post  nummer", "navn"]));
        let b = column_fingerprint(&headers(&["post nummer", "NAVN"]));
        assert_eq!(a, b);
    }

    #[test]
    fn different_header_sets_differ() {
        let a = column_fingerprint(&headers(&["Navn", "Adresse"]));
        let b = column_fingerprint(&headers(&["Navn", "Telefon"]));
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_is_truncated_for_storage() {
        let digest = column_fingerprint(&headers(&["Navn"]));
        assert_eq!(digest.len(), FINGERPRINT_LEN);
    }

    #[test]
    fn file_hash_is_deterministic() {
        assert_eq!(file_hash(b"abc"), file_hash(b"abc"));
        assert_ne!(file_hash(b"abc"), file_hash(b"abd"));
    }
}
