//! Pure validation rules for names, surnames, and passwords.
//!
//! Handlers are written as a sequence of these checks followed by a state
//! transition; none of them touch shared state.

use crate::config::LimitsConfig;
use crate::error::RejectKind;

/// Display-case a name: first character uppercased, the rest lowercased.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Case-fold a name into its identity key.
pub fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Reject blank (empty after trimming) input.
pub fn validate_non_blank(s: &str, kind: RejectKind) -> Result<(), RejectKind> {
    if s.trim().is_empty() { Err(kind) } else { Ok(()) }
}

/// Reject names with characters outside the permitted set, or over length.
pub fn validate_name_charset(s: &str, limits: &LimitsConfig) -> Result<(), RejectKind> {
    if s.chars().count() > limits.max_name_len {
        return Err(RejectKind::NameInvalid);
    }
    if s.chars().any(|c| !limits.name_chars.contains(c)) {
        return Err(RejectKind::NameInvalid);
    }
    Ok(())
}

/// Reject surnames containing any character from the reserved set.
pub fn validate_surname_charset(s: &str, limits: &LimitsConfig) -> Result<(), RejectKind> {
    if s.chars().count() > limits.max_name_len {
        return Err(RejectKind::SurnameInvalid);
    }
    if s.chars().any(|c| limits.surname_reserved.contains(c)) {
        return Err(RejectKind::SurnameInvalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    #[test]
    fn capitalize_normalizes_case() {
        assert_eq!(capitalize("alice"), "Alice");
        assert_eq!(capitalize("ALICE"), "Alice");
        assert_eq!(capitalize("aLiCe"), "Alice");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn fold_is_lowercase() {
        assert_eq!(fold("Alice"), "alice");
        assert_eq!(fold("NEW"), "new");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(
            validate_non_blank("   ", RejectKind::NameBlank),
            Err(RejectKind::NameBlank)
        );
        assert!(validate_non_blank("x", RejectKind::NameBlank).is_ok());
    }

    #[test]
    fn name_charset_rejects_outsiders() {
        assert!(validate_name_charset("Alice", &limits()).is_ok());
        assert_eq!(
            validate_name_charset("Al1ce", &limits()),
            Err(RejectKind::NameInvalid)
        );
        assert_eq!(
            validate_name_charset("Al ice", &limits()),
            Err(RejectKind::NameInvalid)
        );
    }

    #[test]
    fn name_over_max_length_is_rejected() {
        let long = "a".repeat(limits().max_name_len + 1);
        assert_eq!(
            validate_name_charset(&long, &limits()),
            Err(RejectKind::NameInvalid)
        );
    }

    #[test]
    fn surname_rejects_reserved_characters() {
        assert!(validate_surname_charset("Stone", &limits()).is_ok());
        assert!(validate_surname_charset("李", &limits()).is_ok());
        for c in ["St@ne", "Sto;ne", "Stone!"] {
            assert_eq!(
                validate_surname_charset(c, &limits()),
                Err(RejectKind::SurnameInvalid),
                "{c} should be rejected"
            );
        }
    }
}
