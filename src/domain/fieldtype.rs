use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Email,
    Phone,
    Postnummer,
    Date,
    Integer,
    Number,
    Boolean,
    String,
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

const BOOLEAN_TOKENS: [&str; 9] = ["ja", "nei", "yes", "no", "true", "false", "1", "0", "x"];

/// Guess the semantic type of a column from its non-null sample values.
/// Ordered cascade, not majority vote: every value must match a pattern for
/// that type to be assigned, otherwise fall through. Descriptive metadata
/// only; never alters the parsed value.
pub fn detect_field_type(values: &[String]) -> FieldType {
    if values.is_empty() {
        return FieldType::String;
    }
    if values.iter().all(|v| is_email(v)) {
        return FieldType::Email;
    }
    if values.iter().all(|v| is_phone(v)) {
        return FieldType::Phone;
    }
    if values.iter().all(|v| is_postnummer(v)) {
        return FieldType::Postnummer;
    }
    if values.iter().all(|v| is_date_literal(v)) {
        return FieldType::Date;
    }
    if values.iter().all(|v| is_integer(v)) {
        return FieldType::Integer;
    }
    if values.iter().all(|v| is_number(v)) {
        return FieldType::Number;
    }
    if values.iter().all(|v| is_boolean_token(v)) {
        return FieldType::Boolean;
    }
    FieldType::String
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Eight or more digits once spacing, punctuation and a leading country
/// prefix marker are stripped. Date literals collapse to the same 8-digit
/// shape and must be ruled out before counting.
pub fn is_phone(value: &str) -> bool {
    if is_date_literal(value) {
        return false;
    }
    let digits: String = value
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '.' | '(' | ')' | '/'))
        .collect();
    digits.len() >= 8 && digits.len() <= 15 && digits.chars().all(|ch| ch.is_ascii_digit())
}

pub fn is_postnummer(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.len() == 4 && trimmed.chars().all(|ch| ch.is_ascii_digit())
}

pub fn is_date_literal(value: &str) -> bool {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(trimmed, format).is_ok())
}

fn is_integer(value: &str) -> bool {
    value.trim().parse::<i64>().is_ok()
}

fn is_number(value: &str) -> bool {
    value.trim().replace(',', ".").parse::<f64>().is_ok()
}

fn is_boolean_token(value: &str) -> bool {
    let token = value.trim().to_lowercase();
    token.is_empty() || BOOLEAN_TOKENS.contains(&token.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_sample_defaults_to_string() {
        assert_eq!(detect_field_type(&[]), FieldType::String);
    }

    #[test]
    fn uniform_emails_detected() {
        let sample = values(&["ola@example.no", "kari.hansen@firma.no"]);
        assert_eq!(detect_field_type(&sample), FieldType::Email);
    }

    #[test]
    fn phone_numbers_with_mixed_formatting_detected() {
        let sample = values(&["+47 912 34 567", "22 33 44 55", "912-34-567"]);
        assert_eq!(detect_field_type(&sample), FieldType::Phone);
    }

    #[test]
    fn four_digit_postal_codes_detected() {
        let sample = values(&["0150", "7030"]);
        assert_eq!(detect_field_type(&sample), FieldType::Postnummer);
    }

    #[test]
    fn mixed_date_and_text_falls_through_to_string() {
        let sample = values(&["2023-01-01", "not-a-date"]);
        assert_eq!(detect_field_type(&sample), FieldType::String);
    }

    #[test]
    fn several_date_formats_accepted() {
        let sample = values(&["2023-01-01", "17.05.2023", "01/12/2023"]);
        assert_eq!(detect_field_type(&sample), FieldType::Date);
    }

    #[test]
    fn date_literals_never_pass_the_phone_check() {
        assert!(!is_phone("2023-01-01"));
        assert!(!is_phone("17.05.2023"));
        assert!(!is_phone("01/12/2023"));
        assert!(is_phone("912 34 567"));
    }

    #[test]
    fn integers_win_over_decimal_numbers() {
        assert_eq!(detect_field_type(&values(&["1", "42", "-7"])), FieldType::Integer);
        assert_eq!(detect_field_type(&values(&["1,5", "2.25"])), FieldType::Number);
    }

    #[test]
    fn boolean_tokens_detected_when_not_all_numeric() {
        let sample = values(&["ja", "nei", "x", ""]);
        assert_eq!(detect_field_type(&sample), FieldType::Boolean);
    }
}
