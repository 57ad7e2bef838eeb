//! Toggles for the supplemental checks.

use serde::{Deserialize, Serialize};

/// Which optional checks the validator runs.
///
/// The permission and vocabulary checks always run. These switches only
/// cover the checks that go beyond them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ValidatorOptions {
    /// Warn when a relationship endpoint names nothing the document or the
    /// dictionary knows about.
    pub check_relationship_endpoints: bool,
    /// Warn when rule descriptions, triggers or report queries mention a
    /// reserved keyword.
    pub check_free_text: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            check_relationship_endpoints: true,
            check_free_text: true,
        }
    }
}

impl ValidatorOptions {
    /// Every check enabled.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Only the always-on checks.
    pub fn lenient() -> Self {
        Self {
            check_relationship_endpoints: false,
            check_free_text: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let opts = ValidatorOptions::default();
        assert!(opts.check_relationship_endpoints);
        assert!(opts.check_free_text);
    }

    #[test]
    fn lenient_disables_supplemental_checks() {
        let opts = ValidatorOptions::lenient();
        assert!(!opts.check_relationship_endpoints);
        assert!(!opts.check_free_text);
        assert_eq!(ValidatorOptions::strict(), ValidatorOptions::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let opts: ValidatorOptions = serde_json::from_str(r#"{ "check-free-text": false }"#).expect("valid");
        assert!(opts.check_relationship_endpoints);
        assert!(!opts.check_free_text);
    }
}
