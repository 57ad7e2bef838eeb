//! Canonical symbol identity.
//!
//! Every comparison between a name written in an EBL document and a name
//! declared in a dictionary goes through [`canon`]: ASCII letters, digits and
//! underscores survive, everything else is dropped, and the result is
//! lowercased. `Pay-Ment!`, `PAYMENT` and `payment` are the same symbol.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonicalize a symbol name.
///
/// Pure, total and idempotent: `canon(&canon(s)) == canon(s)`.
pub fn canon(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A symbol name already in canonical form.
///
/// The only way to build one is through [`CanonicalName::new`], so a value of
/// this type always satisfies `canon(name.as_str()) == name.as_str()`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CanonicalName(String);

impl CanonicalName {
    pub fn new(raw: &str) -> Self {
        Self(canon(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when canonicalization removed every character.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for CanonicalName {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for CanonicalName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<CanonicalName> for String {
    fn from(name: CanonicalName) -> Self {
        name.0
    }
}

impl Borrow<str> for CanonicalName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case::already_canonical("payment", "payment")]
    #[case::mixed_case("PaymentProcessor", "paymentprocessor")]
    #[case::punctuation("Pay-Ment!", "payment")]
    #[case::underscore_kept("DO_Report", "do_report")]
    #[case::spaces("Compliance Officer", "complianceofficer")]
    #[case::digits("Tier2Analyst", "tier2analyst")]
    #[case::non_ascii("Zahlungsprüfer", "zahlungsprfer")]
    #[case::empty("", "")]
    #[case::all_stripped("!@#", "")]
    fn canon_cases(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canon(raw), expected);
    }

    #[test]
    fn canonical_name_equality_ignores_case_and_punctuation() {
        assert_eq!(CanonicalName::new("Pay-Ment!"), CanonicalName::new("payment"));
        assert_ne!(CanonicalName::new("pay_ment"), CanonicalName::new("payment"));
    }

    #[test]
    fn canonical_name_borrows_as_str() {
        let mut set = std::collections::BTreeSet::new();
        set.insert(CanonicalName::new("Transfer"));
        assert!(set.contains("transfer"));
        assert!(!set.contains("Transfer"));
    }

    #[test]
    fn deserialize_canonicalizes() {
        let name: CanonicalName = serde_json::from_str("\"Know-Your-Customer\"").expect("valid json");
        assert_eq!(name.as_str(), "knowyourcustomer");
    }

    proptest! {
        #[test]
        fn canon_is_idempotent(s in ".*") {
            let once = canon(&s);
            prop_assert_eq!(canon(&once), once);
        }

        #[test]
        fn canon_ignores_ascii_case(s in "[A-Za-z0-9_ .-]*") {
            prop_assert_eq!(canon(&s.to_ascii_uppercase()), canon(&s.to_ascii_lowercase()));
        }

        #[test]
        fn canon_output_is_word_chars(s in ".*") {
            prop_assert!(canon(&s).chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }
    }
}
