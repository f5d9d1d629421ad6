//! Field validation for the entry form.
//!
//! Pure: a draft maps to a field → message table, empty iff the draft is
//! valid. The client runs this for inline errors and the server runs it
//! again before persisting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const CAB_OUT_MIN: i64 = 1;
pub const CAB_OUT_MAX: i64 = 100;
pub const BLOCK_MIN: i64 = 0;
pub const BLOCK_MAX: i64 = 25;

/// The three user-supplied fields of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryField {
    Number,
    CabOut,
    Block,
}

/// Raw form input before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub number: String,
    pub cab_out: String,
    pub block: String,
}

pub type ValidationErrors = BTreeMap<EntryField, String>;

/// Validate a draft. Returns an empty map iff the draft is valid.
pub fn validate(draft: &EntryDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.number.is_empty() {
        errors.insert(EntryField::Number, "Number is required".to_string());
    } else if !draft.number.chars().all(|c| c.is_ascii_digit()) {
        errors.insert(EntryField::Number, "Must be a valid number".to_string());
    }

    if draft.cab_out.is_empty() {
        errors.insert(EntryField::CabOut, "Cab Out is required".to_string());
    } else if !in_range(&draft.cab_out, CAB_OUT_MIN, CAB_OUT_MAX) {
        errors.insert(
            EntryField::CabOut,
            format!("Cab Out must be a number between {CAB_OUT_MIN} and {CAB_OUT_MAX}"),
        );
    }

    if draft.block.is_empty() {
        errors.insert(EntryField::Block, "Block is required".to_string());
    } else if !in_range(&draft.block, BLOCK_MIN, BLOCK_MAX) {
        errors.insert(
            EntryField::Block,
            format!("Block must be a number between {BLOCK_MIN} and {BLOCK_MAX}"),
        );
    }

    errors
}

fn in_range(input: &str, min: i64, max: i64) -> bool {
    input
        .parse::<i64>()
        .map(|value| (min..=max).contains(&value))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(number: &str, cab_out: &str, block: &str) -> EntryDraft {
        EntryDraft {
            number: number.to_string(),
            cab_out: cab_out.to_string(),
            block: block.to_string(),
        }
    }

    #[test]
    fn valid_draft_has_no_errors() {
        assert!(validate(&draft("123", "50", "10")).is_empty());
        // Range boundaries are inclusive.
        assert!(validate(&draft("0", "1", "0")).is_empty());
        assert!(validate(&draft("007", "100", "25")).is_empty());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = validate(&EntryDraft::default());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[&EntryField::Number], "Number is required");
        assert_eq!(errors[&EntryField::CabOut], "Cab Out is required");
        assert_eq!(errors[&EntryField::Block], "Block is required");
    }

    #[test]
    fn number_must_be_digits_only() {
        assert!(validate(&draft("12a", "50", "10")).contains_key(&EntryField::Number));
        assert!(validate(&draft("-12", "50", "10")).contains_key(&EntryField::Number));
        assert!(validate(&draft("1 2", "50", "10")).contains_key(&EntryField::Number));
    }

    #[test]
    fn cab_out_range_is_one_to_hundred() {
        assert!(validate(&draft("1", "0", "10")).contains_key(&EntryField::CabOut));
        assert!(validate(&draft("1", "101", "10")).contains_key(&EntryField::CabOut));
        assert!(validate(&draft("1", "abc", "10")).contains_key(&EntryField::CabOut));
        assert!(!validate(&draft("1", "1", "10")).contains_key(&EntryField::CabOut));
        assert!(!validate(&draft("1", "100", "10")).contains_key(&EntryField::CabOut));
    }

    #[test]
    fn block_range_is_zero_to_twenty_five() {
        assert!(validate(&draft("1", "50", "-1")).contains_key(&EntryField::Block));
        assert!(validate(&draft("1", "50", "26")).contains_key(&EntryField::Block));
        assert!(!validate(&draft("1", "50", "0")).contains_key(&EntryField::Block));
        assert!(!validate(&draft("1", "50", "25")).contains_key(&EntryField::Block));
    }
}
