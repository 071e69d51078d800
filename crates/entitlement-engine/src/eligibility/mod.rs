//! Generic eligibility gating
//!
//! Every program declares an [`EligibilityCriteria`] and the single
//! [`EligibilityEvaluator`] runs it. Checks run in a fixed order:
//! 1. Zoning match - hard gate; failure short-circuits everything else
//! 2. Numeric thresholds - boundary-inclusive
//! 3. Site exclusions - every applicable exclusion is reported
//! 4. Protected housing - accumulated, except confirmed rent control ends
//!    the tenancy checks
//! 5. Labor and owner commitments
//!
//! An unreported flag never excludes a parcel on its own. It either trips a
//! documented heuristic (warning) or is assumed clear (verification note).

pub mod commitments;
pub mod site;
pub mod tenancy;

pub use commitments::CommitmentRules;
pub use site::SiteFactor;
pub use tenancy::TenancyRules;

use crate::config::EngineConfig;
use crate::standards::trim_number;
use shared_types::{
    CheckClass, EligibilityResult, ParcelContext, ProgramKind, UnknownFlagPolicy,
};
use tracing::debug;

/// Zoning-class requirement for a program
#[derive(Debug, Clone, Copy)]
pub struct ZoningGate {
    /// Human-readable requirement, e.g. "a single-family residential zone"
    pub requirement: &'static str,
    pub citation: &'static str,
    pub matches: fn(&ParcelContext) -> bool,
}

/// Inclusive numeric bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    AtMost(f64),
    Within(f64, f64),
}

impl Bound {
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Bound::AtLeast(min) => value >= min,
            Bound::AtMost(max) => value <= max,
            Bound::Within(min, max) => value >= min && value <= max,
        }
    }

    pub fn describe(&self, unit: &str) -> String {
        match *self {
            Bound::AtLeast(min) => format!("at least {}", quantity(min, unit)),
            Bound::AtMost(max) => format!("at most {}", quantity(max, unit)),
            Bound::Within(min, max) if min == max => format!("exactly {}", quantity(min, unit)),
            Bound::Within(min, max) => {
                format!("between {} and {}", trim_number(min), quantity(max, unit))
            }
        }
    }
}

/// "2,400 sq ft" style rendering; no trailing space for unitless values
fn quantity(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        trim_number(value)
    } else {
        format!("{} {}", trim_number(value), unit)
    }
}

/// What to do when a threshold's input is not reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenMissing {
    /// Pass with a verification note
    AssumeClear,
    /// The value is a required input for the program
    Exclude,
    /// No finding here; the scenario builder decides
    Deferred,
}

/// One numeric threshold check
#[derive(Debug, Clone, Copy)]
pub struct Threshold {
    /// Parcel field the value comes from, for warnings
    pub field: &'static str,
    pub label: &'static str,
    /// Named requirement, e.g. "minimum lot size"
    pub requirement: &'static str,
    pub unit: &'static str,
    pub citation: &'static str,
    pub value: fn(&ParcelContext) -> Option<f64>,
    pub bound: Bound,
    pub when_missing: WhenMissing,
}

/// Declarative eligibility rules for one program
#[derive(Debug, Clone)]
pub struct EligibilityCriteria {
    pub program: ProgramKind,
    pub zoning: ZoningGate,
    pub thresholds: Vec<Threshold>,
    pub site_exclusions: Vec<SiteFactor>,
    /// Citation used for every site exclusion
    pub site_citation: &'static str,
    pub tenancy: Option<TenancyRules>,
    pub commitments: Option<CommitmentRules>,
}

impl EligibilityCriteria {
    /// Criteria with only a zoning gate
    pub fn zoning_only(program: ProgramKind, zoning: ZoningGate) -> Self {
        Self {
            program,
            zoning,
            thresholds: Vec::new(),
            site_exclusions: Vec::new(),
            site_citation: "",
            tenancy: None,
            commitments: None,
        }
    }
}

/// Runs one program's criteria against a parcel
pub struct EligibilityEvaluator<'a> {
    criteria: EligibilityCriteria,
    config: &'a EngineConfig,
}

impl<'a> EligibilityEvaluator<'a> {
    pub fn new(criteria: EligibilityCriteria, config: &'a EngineConfig) -> Self {
        Self { criteria, config }
    }

    /// Pure and deterministic: the same parcel always yields the same result
    pub fn evaluate(&self, parcel: &ParcelContext) -> EligibilityResult {
        let criteria = &self.criteria;
        let mut result = EligibilityResult::new(criteria.program);

        // 1. Zoning gate
        let gate = &criteria.zoning;
        if !(gate.matches)(parcel) {
            result.exclude(
                CheckClass::ZoningMatch,
                gate.citation,
                format!(
                    "Zoning '{}' is not {}",
                    parcel.zoning_code, gate.requirement
                ),
            );
            debug!(program = %criteria.program, zone = %parcel.zoning_code, "zoning gate failed");
            return result;
        }
        result.pass(format!("Zoning '{}' is {}", parcel.zoning_code, gate.requirement));

        // 2. Numeric thresholds
        for threshold in &criteria.thresholds {
            check_threshold(threshold, parcel, &mut result);
        }

        // 3. Site exclusions
        site::check_site_exclusions(
            &criteria.site_exclusions,
            criteria.site_citation,
            parcel,
            &mut result,
        );

        // 4. Protected housing
        if let Some(rules) = &criteria.tenancy {
            tenancy::check_protected_housing(rules, parcel, &self.config.rent_control, &mut result);
        }

        // 5. Commitments
        if let Some(rules) = &criteria.commitments {
            commitments::check_commitments(
                rules,
                parcel,
                self.config.labor.skilled_workforce_unit_threshold,
                &mut result,
            );
        }

        debug!(
            program = %criteria.program,
            eligible = result.eligible,
            exclusions = result.exclusions.len(),
            warnings = result.warnings.len(),
            "eligibility evaluated"
        );
        result
    }
}

fn check_threshold(threshold: &Threshold, parcel: &ParcelContext, result: &mut EligibilityResult) {
    let bound = threshold.bound.describe(threshold.unit);

    match (threshold.value)(parcel).filter(|v| v.is_finite()) {
        Some(value) if threshold.bound.contains(value) => {
            result.pass(format!(
                "{} of {} meets {} ({})",
                threshold.label,
                quantity(value, threshold.unit),
                threshold.requirement,
                bound
            ));
        }
        Some(value) => {
            result.exclude(
                CheckClass::NumericThreshold,
                threshold.citation,
                format!(
                    "{} of {} fails {} ({})",
                    threshold.label,
                    quantity(value, threshold.unit),
                    threshold.requirement,
                    bound
                ),
            );
        }
        None => match threshold.when_missing {
            WhenMissing::AssumeClear => result.verify(
                threshold.field,
                UnknownFlagPolicy::AssumedClear,
                format!(
                    "{} not reported; {} ({}) assumed met pending verification",
                    threshold.label, threshold.requirement, bound
                ),
            ),
            WhenMissing::Exclude => result.exclude(
                CheckClass::NumericThreshold,
                threshold.citation,
                format!(
                    "{} not reported; {} ({}) cannot be confirmed",
                    threshold.label, threshold.requirement, bound
                ),
            ),
            WhenMissing::Deferred => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parcel;

    fn single_family(p: &ParcelContext) -> bool {
        p.zoning_code.starts_with("R1")
    }

    fn lot_area(p: &ParcelContext) -> Option<f64> {
        Some(p.lot_area_sqft)
    }

    fn row_width(p: &ParcelContext) -> Option<f64> {
        p.street_row_width_ft
    }

    fn criteria() -> EligibilityCriteria {
        let mut criteria = EligibilityCriteria::zoning_only(
            ProgramKind::Sb9Duplex,
            ZoningGate {
                requirement: "a single-family zone",
                citation: "test",
                matches: single_family,
            },
        );
        criteria.thresholds.push(Threshold {
            field: "lot_area_sqft",
            label: "Lot area",
            requirement: "minimum lot size",
            unit: "sq ft",
            citation: "test",
            value: lot_area,
            bound: Bound::AtLeast(2_000.0),
            when_missing: WhenMissing::Exclude,
        });
        criteria.site_exclusions = vec![SiteFactor::Wetlands, SiteFactor::FloodZone];
        criteria.site_citation = "test";
        criteria
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(Bound::AtLeast(2_400.0).contains(2_400.0));
        assert!(!Bound::AtLeast(2_400.0).contains(2_399.99));
        assert!(Bound::AtMost(20.0).contains(20.0));
        assert!(Bound::Within(70.0, 150.0).contains(70.0));
        assert!(Bound::Within(70.0, 150.0).contains(150.0));
        assert!(!Bound::Within(70.0, 150.0).contains(150.5));
    }

    #[test]
    fn test_zoning_gate_short_circuits() {
        let config = EngineConfig::default();
        let mut p = parcel("R3-1", 1_000.0);
        p.wetlands = Some(true);

        let result = EligibilityEvaluator::new(criteria(), &config).evaluate(&p);
        assert!(!result.eligible);
        assert_eq!(result.exclusions.len(), 1);
        assert_eq!(result.exclusions[0].class, CheckClass::ZoningMatch);
    }

    #[test]
    fn test_accumulates_all_failures_after_gate() {
        let config = EngineConfig::default();
        let mut p = parcel("R1-1", 1_500.0);
        p.wetlands = Some(true);
        p.flood_zone = Some(true);

        let result = EligibilityEvaluator::new(criteria(), &config).evaluate(&p);
        assert!(!result.eligible);
        assert_eq!(result.exclusions.len(), 3);
        assert!(result.exclusion_messages()[0].contains("minimum lot size"));
    }

    #[test]
    fn test_clean_parcel_is_eligible() {
        let config = EngineConfig::default();
        let result = EligibilityEvaluator::new(criteria(), &config).evaluate(&parcel("R1-1", 6_000.0));
        assert!(result.eligible);
        assert!(result.warnings.is_empty());
        assert!(result.reasons.len() >= 2);
    }

    #[test]
    fn test_missing_threshold_value_policies() {
        let config = EngineConfig::default();
        let mut clear = criteria();
        clear.thresholds = vec![Threshold {
            field: "street_row_width_ft",
            label: "Street width",
            requirement: "corridor width",
            unit: "ft",
            citation: "test",
            value: row_width,
            bound: Bound::Within(70.0, 150.0),
            when_missing: WhenMissing::AssumeClear,
        }];

        let result = EligibilityEvaluator::new(clear.clone(), &config).evaluate(&parcel("R1-1", 6_000.0));
        assert!(result.eligible);
        assert_eq!(result.warnings[0].policy, Some(UnknownFlagPolicy::AssumedClear));

        clear.thresholds[0].when_missing = WhenMissing::Exclude;
        let result = EligibilityEvaluator::new(clear.clone(), &config).evaluate(&parcel("R1-1", 6_000.0));
        assert!(!result.eligible);
        assert!(result.has_exclusion(CheckClass::NumericThreshold));

        clear.thresholds[0].when_missing = WhenMissing::Deferred;
        let result = EligibilityEvaluator::new(clear, &config).evaluate(&parcel("R1-1", 6_000.0));
        assert!(result.eligible);
        assert!(result.warnings.is_empty());
    }
}
