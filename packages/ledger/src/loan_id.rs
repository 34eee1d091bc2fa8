//! Canonical loan identifiers for display: `LOAN` followed by at least three digits.
//!
//! Stored IDs are whatever the application flow wrote at the time (plain
//! numbers, prefixed strings, or nothing). Normalisation happens when loans
//! are read for listing; the stored value is never rewritten.

use std::fmt::Display;

use store::Loan;

pub const DEFAULT_PREFIX: &str = "LOAN";

/// `7` → `LOAN007`, `"LOAN012"` → `"LOAN012"`, `"L-42"` → `LOAN042`.
pub fn normalize_loan_id(raw: impl Display) -> String {
    normalize_loan_id_with(&raw.to_string(), DEFAULT_PREFIX)
}

/// As [`normalize_loan_id`] with a configurable prefix.
pub fn normalize_loan_id_with(raw: &str, prefix: &str) -> String {
    if raw.starts_with(prefix) {
        return raw.to_string();
    }
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    format!("{prefix}{digits:0>3}")
}

/// Display ID of the loan at `position` (0-based) in its member's list.
/// Loans without a stored ID are numbered by position.
pub fn display_loan_id(loan: &Loan, position: usize, prefix: &str) -> String {
    match loan.loan_id.as_deref() {
        Some(id) => normalize_loan_id_with(id, prefix),
        None => normalize_loan_id_with(&(position + 1).to_string(), prefix),
    }
}

/// Number carried by a `LOAN7`, `LOAN007` or `7` style id. Other shapes have none.
pub fn loan_number(id: &str, prefix: &str) -> Option<u64> {
    let digits = id.trim();
    let digits = digits.strip_prefix(prefix).unwrap_or(digits);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whether two ids name the same loan: equal once normalised, or carrying
/// the same loan number (`LOAN7` and `7`).
pub fn same_loan_id(a: &str, b: &str, prefix: &str) -> bool {
    if normalize_loan_id_with(a.trim(), prefix) == normalize_loan_id_with(b.trim(), prefix) {
        return true;
    }
    matches!(
        (loan_number(a, prefix), loan_number(b, prefix)),
        (Some(x), Some(y)) if x == y
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_are_padded() {
        assert_eq!(normalize_loan_id(7), "LOAN007");
        assert_eq!(normalize_loan_id(1234), "LOAN1234");
        assert_eq!(normalize_loan_id("42"), "LOAN042");
    }

    #[test]
    fn test_canonical_ids_pass_through() {
        assert_eq!(normalize_loan_id("LOAN012"), "LOAN012");
        assert_eq!(normalize_loan_id("LOAN7"), "LOAN7");
    }

    #[test]
    fn test_non_digits_are_stripped() {
        assert_eq!(normalize_loan_id("L-42"), "LOAN042");
        assert_eq!(normalize_loan_id("loan-9"), "LOAN009");
        assert_eq!(normalize_loan_id(""), "LOAN000");
    }

    #[test]
    fn test_missing_id_uses_position() {
        let loan = Loan::default();
        assert_eq!(display_loan_id(&loan, 1, DEFAULT_PREFIX), "LOAN002");

        let loan = Loan {
            loan_id: Some("5".into()),
            ..Default::default()
        };
        assert_eq!(display_loan_id(&loan, 1, DEFAULT_PREFIX), "LOAN005");
    }

    #[test]
    fn test_short_stored_ids_match_by_number() {
        assert_eq!(loan_number("LOAN7", DEFAULT_PREFIX), Some(7));
        assert_eq!(loan_number("007", DEFAULT_PREFIX), Some(7));
        assert_eq!(loan_number("L-42", DEFAULT_PREFIX), None);
        assert_eq!(loan_number("LOAN", DEFAULT_PREFIX), None);

        assert!(same_loan_id("LOAN7", "7", DEFAULT_PREFIX));
        assert!(same_loan_id("LOAN7", "LOAN007", DEFAULT_PREFIX));
        assert!(same_loan_id("L-42", "LOAN042", DEFAULT_PREFIX));
        assert!(!same_loan_id("LOAN7", "LOAN070", DEFAULT_PREFIX));
    }
}
