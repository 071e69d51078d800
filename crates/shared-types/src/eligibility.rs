//! Per-program eligibility outcome

use crate::program::ProgramKind;
use serde::{Deserialize, Serialize};

/// Class of check that produced an exclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckClass {
    ZoningMatch,
    NumericThreshold,
    SiteExclusion,
    ProtectedHousing,
    Commitment,
}

/// How an unreported flag was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFlagPolicy {
    /// A documented heuristic suggested a likely value; verify manually
    Heuristic,
    /// Treated as passing; verify before filing
    AssumedClear,
}

/// A reason the program cannot be used on this parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub class: CheckClass,
    /// e.g. "Gov. Code § 65852.21(a)(6)"
    pub citation: String,
    pub message: String,
}

/// Non-fatal finding attached to an eligibility result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityWarning {
    /// Parcel field the warning is about
    pub field: String,
    /// Set when the warning stems from an unreported flag
    pub policy: Option<UnknownFlagPolicy>,
    pub message: String,
}

/// Result of gating one program against one parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub program: ProgramKind,
    pub eligible: bool,
    pub reasons: Vec<String>,
    pub exclusions: Vec<Exclusion>,
    pub warnings: Vec<EligibilityWarning>,
}

impl EligibilityResult {
    /// Start an eligible result with nothing recorded
    pub fn new(program: ProgramKind) -> Self {
        Self {
            program,
            eligible: true,
            reasons: Vec::new(),
            exclusions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn pass(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    /// Record an exclusion; the result can never become eligible again
    pub fn exclude(&mut self, class: CheckClass, citation: &str, message: impl Into<String>) {
        self.eligible = false;
        self.exclusions.push(Exclusion {
            class,
            citation: citation.to_string(),
            message: message.into(),
        });
    }

    pub fn warn(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push(EligibilityWarning {
            field: field.to_string(),
            policy: None,
            message: message.into(),
        });
    }

    /// Record how an unreported flag was resolved
    pub fn verify(&mut self, field: &str, policy: UnknownFlagPolicy, message: impl Into<String>) {
        self.warnings.push(EligibilityWarning {
            field: field.to_string(),
            policy: Some(policy),
            message: message.into(),
        });
    }

    pub fn has_exclusion(&self, class: CheckClass) -> bool {
        self.exclusions.iter().any(|e| e.class == class)
    }

    pub fn exclusion_messages(&self) -> Vec<&str> {
        self.exclusions.iter().map(|e| e.message.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_makes_result_ineligible() {
        let mut result = EligibilityResult::new(ProgramKind::Sb9Duplex);
        assert!(result.eligible);

        result.pass("Single-family zone");
        result.exclude(CheckClass::SiteExclusion, "Gov. Code § 65913.4(a)(6)(E)", "Wetlands");

        assert!(!result.eligible);
        assert!(result.has_exclusion(CheckClass::SiteExclusion));
        assert!(!result.has_exclusion(CheckClass::ZoningMatch));
        assert_eq!(result.exclusion_messages(), vec!["Wetlands"]);
    }

    #[test]
    fn test_warnings_do_not_affect_eligibility() {
        let mut result = EligibilityResult::new(ProgramKind::Sb35);
        result.warn("zoning_code", "Qualified condition present");
        result.verify("wetlands", UnknownFlagPolicy::AssumedClear, "Not reported");

        assert!(result.eligible);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].policy, None);
        assert_eq!(result.warnings[1].policy, Some(UnknownFlagPolicy::AssumedClear));
    }
}
