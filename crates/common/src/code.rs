//! Sequential, human-readable entity codes (`CUS0001`, `ORD0042`, ...).
//!
//! The next code for a prefix is derived from the codes that already exist:
//! the highest numeric suffix plus one, zero-padded to at least
//! [`MIN_DIGITS`] digits. Codes whose suffix is not a plain run of ASCII
//! digits are ignored.
//!
//! This is a read-then-decide computation. Two callers that scan the same
//! snapshot compute the same code, so stores must call [`next_code`] while
//! holding whatever serializes their inserts for that prefix (a write lock,
//! an advisory transaction lock) and keep the code column unique.

use serde::{Deserialize, Serialize};

/// Minimum number of digits in a rendered code. Wider numbers are never truncated.
pub const MIN_DIGITS: usize = 4;

/// The entity type a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodePrefix {
    Customer,
    Order,
    Payment,
    Supplier,
}

impl CodePrefix {
    /// Returns the literal prefix, e.g. `"ORD"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            CodePrefix::Customer => "CUS",
            CodePrefix::Order => "ORD",
            CodePrefix::Payment => "PAY",
            CodePrefix::Supplier => "SUP",
        }
    }
}

impl std::fmt::Display for CodePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts the numeric part of `code` if it carries `prefix`.
pub fn parse_sequence(prefix: CodePrefix, code: &str) -> Option<u64> {
    let digits = code.strip_prefix(prefix.as_str())?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Renders `sequence` under `prefix`, zero-padded to [`MIN_DIGITS`].
pub fn format_code(prefix: CodePrefix, sequence: u64) -> String {
    format!("{}{:0width$}", prefix.as_str(), sequence, width = MIN_DIGITS)
}

/// Computes the code following the highest existing one for `prefix`.
///
/// Returns `<prefix>0001` when no existing code carries the prefix.
pub fn next_code<'a, I>(prefix: CodePrefix, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(|code| parse_sequence(prefix, code))
        .max()
        .unwrap_or(0);
    format_code(prefix, max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_code_is_0001() {
        assert_eq!(next_code(CodePrefix::Order, []), "ORD0001");
        assert_eq!(next_code(CodePrefix::Customer, []), "CUS0001");
    }

    #[test]
    fn increments_the_maximum_not_the_count() {
        let existing = ["ORD0001", "ORD0009", "ORD0003"];
        assert_eq!(next_code(CodePrefix::Order, existing), "ORD0010");
    }

    #[test]
    fn ignores_other_prefixes_and_garbage_suffixes() {
        let existing = ["PAY0500", "ORD00x2", "ORD", "ORD+12", "ORD0002"];
        assert_eq!(next_code(CodePrefix::Order, existing), "ORD0003");
    }

    #[test]
    fn width_grows_past_four_digits() {
        assert_eq!(next_code(CodePrefix::Payment, ["PAY9999"]), "PAY10000");
        assert_eq!(format_code(CodePrefix::Supplier, 123456), "SUP123456");
    }

    #[test]
    fn sequential_calls_are_strictly_increasing() {
        let mut codes: Vec<String> = Vec::new();
        for _ in 0..25 {
            let next = next_code(CodePrefix::Order, codes.iter().map(String::as_str));
            codes.push(next);
        }

        for pair in codes.windows(2) {
            let a = parse_sequence(CodePrefix::Order, &pair[0]).unwrap();
            let b = parse_sequence(CodePrefix::Order, &pair[1]).unwrap();
            assert!(b > a);
        }
        assert!(codes.iter().all(|c| c.len() >= 3 + MIN_DIGITS));
        assert_eq!(codes.last().unwrap(), "ORD0025");
    }

    #[test]
    fn parse_sequence_requires_the_prefix() {
        assert_eq!(parse_sequence(CodePrefix::Customer, "CUS0042"), Some(42));
        assert_eq!(parse_sequence(CodePrefix::Customer, "ORD0042"), None);
    }
}
