//! State Density Bonus program rule
//!
//! Gates the parcel, builds the base zoning scenario, and hands it to the
//! [`DensityBonusCalculator`].

use super::{base_zoning, zone_class, BuildOutcome, ScenarioParams};
use crate::density_bonus::{BonusOutcome, DensityBonusCalculator};
use crate::eligibility::{Bound, EligibilityCriteria, Threshold, WhenMissing, ZoningGate};
use crate::error::Result;
use crate::standards::base_standards;
use shared_types::{ParcelContext, ProgramKind};

/// § 65915(i): housing developments of five or more units
pub const MIN_BASE_UNITS: u32 = 5;

fn residential_or_commercial(parcel: &ParcelContext) -> bool {
    zone_class(parcel)
        .map(|class| class.is_residential() || class.is_commercial())
        .unwrap_or(false)
}

fn base_units(parcel: &ParcelContext) -> Option<f64> {
    base_standards(parcel)
        .ok()
        .map(|standards| f64::from(standards.max_units))
}

fn affordability(parcel: &ParcelContext) -> Option<f64> {
    parcel.affordability_pct
}

pub fn criteria() -> EligibilityCriteria {
    EligibilityCriteria {
        program: ProgramKind::DensityBonus,
        zoning: ZoningGate {
            requirement: "a zone permitting residential use",
            citation: "Gov. Code § 65915(i)",
            matches: residential_or_commercial,
        },
        thresholds: vec![
            Threshold {
                field: "lot_area_sqft",
                label: "Base density",
                requirement: "housing development minimum",
                unit: "units",
                citation: "Gov. Code § 65915(i)",
                value: base_units,
                bound: Bound::AtLeast(f64::from(MIN_BASE_UNITS)),
                when_missing: WhenMissing::Exclude,
            },
            Threshold {
                field: "affordability_pct",
                label: "Affordable set-aside",
                requirement: "affordability commitment",
                unit: "%",
                citation: "Gov. Code § 65915(b)(1)",
                value: affordability,
                bound: Bound::Within(0.0, 100.0),
                when_missing: WhenMissing::Exclude,
            },
        ],
        site_exclusions: Vec::new(),
        site_citation: "",
        tenancy: None,
        commitments: None,
    }
}

pub fn build(parcel: &ParcelContext, params: &ScenarioParams<'_>) -> Result<BuildOutcome> {
    let standards = base_standards(parcel)?;
    let base = base_zoning::scenario_from(&standards);

    match DensityBonusCalculator::new(params.income_limits).apply(&base, standards.parking_per_unit, parcel) {
        BonusOutcome::Granted { scenario, warnings } => Ok(BuildOutcome::Built { scenario, warnings }),
        BonusOutcome::Suppressed { reason } => Ok(BuildOutcome::not_applicable(reason)),
        BonusOutcome::Rejected { reason } => Ok(BuildOutcome::not_applicable(format!(
            "Bonus track rejected: {}",
            reason
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::eligibility::EligibilityEvaluator;
    use crate::lookup::NoLookup;
    use crate::test_support::parcel;
    use shared_types::{CheckClass, IncomeCategory};

    #[test]
    fn test_requires_five_base_units() {
        let config = EngineConfig::default();
        let mut p = parcel("R3-1", 3_200.0);
        p.affordability_pct = Some(15.0);
        let result = EligibilityEvaluator::new(criteria(), &config).evaluate(&p);
        assert!(result.has_exclusion(CheckClass::NumericThreshold));

        p.lot_area_sqft = 4_000.0;
        let result = EligibilityEvaluator::new(criteria(), &config).evaluate(&p);
        assert!(result.eligible);
    }

    #[test]
    fn test_requires_affordability() {
        let config = EngineConfig::default();
        let result = EligibilityEvaluator::new(criteria(), &config).evaluate(&parcel("R3-1", 8_000.0));
        assert!(!result.eligible);
    }

    #[test]
    fn test_build_wraps_calculator() {
        let config = EngineConfig::default();
        let params = ScenarioParams {
            config: &config,
            affordability: &NoLookup,
            income_limits: &NoLookup,
        };
        let mut p = parcel("R3-1", 8_000.0);
        p.affordability_pct = Some(10.0);
        p.income_category = Some(IncomeCategory::VeryLow);

        match build(&p, &params).unwrap() {
            BuildOutcome::Built { scenario, .. } => {
                assert_eq!(scenario.program, ProgramKind::DensityBonus);
                assert_eq!(scenario.max_units, 13);
            }
            other => panic!("expected scenario, got {:?}", other),
        }
    }
}
