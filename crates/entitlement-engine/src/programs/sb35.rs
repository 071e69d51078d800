//! SB 35 (2017) streamlined ministerial approval
//!
//! Gov. Code § 65913.4. Available in jurisdictions behind on their RHNA
//! progress. The share of units that must be affordable depends on the
//! jurisdiction (10% or 50%) and comes from the affordability lookup; when
//! the lookup has no answer the stricter 50% is assumed.

use super::{affordable_units, zone_class, BuildOutcome, ScenarioParams};
use crate::eligibility::commitments::projected_units;
use crate::eligibility::site::{SiteFactor, STREAMLINING_SITE_FACTORS};
use crate::eligibility::{
    Bound, CommitmentRules, EligibilityCriteria, TenancyRules, Threshold, WhenMissing, ZoningGate,
};
use crate::error::{EngineError, Result};
use crate::lookup::LookupOutcome;
use crate::standards::{base_standards, trim_number};
use shared_types::{DevelopmentScenario, ParcelContext, ProgramKind, SetbackSide};
use tracing::{debug, warn};

pub const MIN_UNITS: u32 = 2;

/// SB 35 caps required parking at one space per unit
pub const MAX_PARKING_PER_UNIT: f64 = 1.0;

fn residential_or_mixed_use(parcel: &ParcelContext) -> bool {
    zone_class(parcel)
        .map(|class| class.is_residential() || class.is_commercial())
        .unwrap_or(false)
}

/// Base zoning density, used to project a unit count
pub(crate) fn base_density(parcel: &ParcelContext) -> Option<f64> {
    base_standards(parcel)
        .ok()
        .and_then(|standards| standards.density_units_per_acre)
}

fn projected(parcel: &ParcelContext) -> Option<f64> {
    projected_units(parcel, Some(base_density)).map(f64::from)
}

pub fn criteria() -> EligibilityCriteria {
    let mut site_exclusions = STREAMLINING_SITE_FACTORS.to_vec();
    site_exclusions.push(SiteFactor::NonUrbanSite);

    EligibilityCriteria {
        program: ProgramKind::Sb35,
        zoning: ZoningGate {
            requirement: "a zone permitting residential or residential mixed use",
            citation: "Gov. Code § 65913.4(a)(2)(C)",
            matches: residential_or_mixed_use,
        },
        thresholds: vec![Threshold {
            field: "proposed_units",
            label: "Projected unit count",
            requirement: "multifamily minimum",
            unit: "units",
            citation: "Gov. Code § 65913.4(a)(1)",
            value: projected,
            bound: Bound::AtLeast(f64::from(MIN_UNITS)),
            when_missing: WhenMissing::AssumeClear,
        }],
        site_exclusions,
        site_citation: "Gov. Code § 65913.4(a)(6)",
        tenancy: Some(TenancyRules {
            citation: "Gov. Code § 65913.4(a)(7)",
            ellis_lookback_years: Some(10),
            tenancy_lookback_years: Some(10),
            deed_restriction: false,
            prior_lot_split: false,
        }),
        commitments: Some(CommitmentRules::labor("Gov. Code § 65913.4(a)(8)", base_density)),
    }
}

pub fn build(parcel: &ParcelContext, params: &ScenarioParams<'_>) -> Result<BuildOutcome> {
    let base = base_standards(parcel)?;
    if base.max_units < MIN_UNITS {
        return Ok(BuildOutcome::not_applicable(format!(
            "Base zoning allows {} unit(s); SB 35 requires at least {}",
            base.max_units, MIN_UNITS
        )));
    }

    let default_pct = params.config.sb35.default_affordability_pct;
    let mut warnings = Vec::new();
    let (pct, source) = match params
        .affordability
        .sb35_affordability_pct(&parcel.jurisdiction, &parcel.county)
    {
        LookupOutcome::Found(pct) => {
            debug!(jurisdiction = %parcel.jurisdiction, pct, "SB 35 affordability from lookup");
            (pct, format!("{} requirement for {}", pct_label(pct), parcel.jurisdiction))
        }
        LookupOutcome::NotFound => (
            default_pct,
            format!(
                "No affordability data for {}; conservative {} default assumed",
                parcel.jurisdiction,
                pct_label(default_pct)
            ),
        ),
        LookupOutcome::Unavailable(reason) => {
            warn!(%reason, "SB 35 affordability lookup unavailable");
            warnings.push(
                EngineError::LookupUnavailable(format!("SB 35 affordability ({})", reason)).to_string(),
            );
            (
                default_pct,
                format!("Affordability lookup unavailable; conservative {} default assumed", pct_label(default_pct)),
            )
        }
    };

    let mut scenario = DevelopmentScenario::new(
        "SB 35 Streamlined",
        ProgramKind::Sb35,
        "Gov. Code § 65913.4 (SB 35)",
    );
    scenario.max_units = base.max_units;
    scenario.max_building_area_sqft = base.max_building_area_sqft;
    scenario.max_height_ft = base.max_height_ft;
    scenario.max_stories = base.max_stories;
    scenario.affordable_units_required = affordable_units(base.max_units, pct);
    scenario.parking_required =
        super::parking_spaces(base.max_units, base.parking_per_unit.min(MAX_PARKING_PER_UNIT));
    scenario.lot_coverage_pct = base.lot_coverage_pct;
    scenario.setbacks.insert(SetbackSide::Front, base.front_setback_ft);
    scenario.setbacks.insert(SetbackSide::Side, base.side_setback_ft);
    scenario.setbacks.insert(SetbackSide::Rear, base.rear_setback_ft);

    scenario.notes.push(source);
    scenario.notes.push(format!(
        "{} of {} units must be affordable to households at or below 80% AMI",
        scenario.affordable_units_required, scenario.max_units
    ));
    scenario
        .notes
        .push("Ministerial approval: no CEQA review; decision due within 90-180 days".to_string());

    Ok(BuildOutcome::Built { scenario, warnings })
}

fn pct_label(pct: f64) -> String {
    format!("{}%", trim_number(pct))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::eligibility::EligibilityEvaluator;
    use crate::lookup::{AffordabilityLookup, NoLookup, StaticAffordabilityTable};
    use crate::test_support::parcel;
    use shared_types::CheckClass;

    struct Outage;

    impl AffordabilityLookup for Outage {
        fn sb35_affordability_pct(&self, _: &str, _: &str) -> LookupOutcome<f64> {
            LookupOutcome::Unavailable("timeout".to_string())
        }
    }

    fn build_with(affordability: &dyn AffordabilityLookup) -> (DevelopmentScenario, Vec<String>) {
        let config = EngineConfig::default();
        let params = ScenarioParams {
            config: &config,
            affordability,
            income_limits: &NoLookup,
        };
        match build(&parcel("R3-1", 8_000.0), &params).unwrap() {
            BuildOutcome::Built { scenario, warnings } => (scenario, warnings),
            other => panic!("expected scenario, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_lookup_uses_conservative_default() {
        let (s, warnings) = build_with(&NoLookup);
        assert_eq!(s.max_units, 10);
        assert_eq!(s.affordable_units_required, 5);
        assert!(warnings.is_empty());
        assert!(s.notes[0].contains("conservative 50%"));
    }

    #[test]
    fn test_lookup_value_is_used() {
        let mut table = StaticAffordabilityTable::new();
        table.insert("Los Angeles", "Los Angeles", 10.0);
        let (s, _) = build_with(&table);
        assert_eq!(s.affordable_units_required, 1);
    }

    #[test]
    fn test_outage_becomes_warning() {
        let (s, warnings) = build_with(&Outage);
        assert_eq!(s.affordable_units_required, 5);
        assert_eq!(warnings, vec!["Lookup unavailable: SB 35 affordability (timeout)".to_string()]);
    }

    #[test]
    fn test_non_urban_site_excluded() {
        let config = EngineConfig::default();
        let mut p = parcel("R3-1", 8_000.0);
        p.is_urban_infill = Some(false);
        let result = EligibilityEvaluator::new(criteria(), &config).evaluate(&p);
        assert!(result.has_exclusion(CheckClass::SiteExclusion));
    }

    #[test]
    fn test_single_unit_parcel_not_applicable() {
        let config = EngineConfig::default();
        let params = ScenarioParams {
            config: &config,
            affordability: &NoLookup,
            income_limits: &NoLookup,
        };
        let outcome = build(&parcel("R1-1", 6_000.0), &params).unwrap();
        assert!(matches!(outcome, BuildOutcome::NotApplicable { .. }));
    }
}
