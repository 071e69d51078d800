//! Accessory dwelling units
//!
//! Gov. Code § 66314 et seq. (formerly § 65852.2). Ministerial in every
//! residential zone.
//! - Single-family lot: one ADU plus one junior ADU
//! - Multifamily lot: conversions of non-livable space (25% of existing
//!   units, at least one) plus two detached ADUs

use super::{parking_spaces, zone_class, BuildOutcome};
use crate::eligibility::{EligibilityCriteria, ZoningGate};
use crate::error::Result;
use crate::standards::{base_standards, trim_number};
use shared_types::{DevelopmentScenario, ParcelContext, ProgramKind, SetbackSide};

/// Detached ADU height guaranteed by § 66321(b)(4)
pub const DETACHED_HEIGHT_FT: f64 = 16.0;
/// Within 1/2 mile of major transit
pub const DETACHED_HEIGHT_NEAR_TRANSIT_FT: f64 = 18.0;
pub const ADU_SIDE_REAR_SETBACK_FT: f64 = 4.0;
pub const DETACHED_ADU_MAX_SQFT: f64 = 1_200.0;
pub const JADU_MAX_SQFT: f64 = 500.0;
/// Detached ADUs on a multifamily lot; matches the 800 sq ft state guarantee
pub const MULTIFAMILY_DETACHED_SQFT: f64 = 800.0;
pub const MULTIFAMILY_DETACHED_COUNT: u32 = 2;

fn residential_zone(parcel: &ParcelContext) -> bool {
    zone_class(parcel)
        .map(|class| class.is_residential())
        .unwrap_or(false)
}

pub fn criteria() -> EligibilityCriteria {
    EligibilityCriteria::zoning_only(
        ProgramKind::Adu,
        ZoningGate {
            requirement: "a zone permitting residential use",
            citation: "Gov. Code § 66314(a)",
            matches: residential_zone,
        },
    )
}

/// Multifamily conversion allowance: 25% of existing units, at least one
pub fn conversion_allowance(existing_units: u32) -> u32 {
    if existing_units == 0 {
        0
    } else {
        (existing_units / 4).max(1)
    }
}

pub fn build(parcel: &ParcelContext) -> Result<BuildOutcome> {
    let base = base_standards(parcel)?;
    let detached_height = if parcel.near_major_transit {
        DETACHED_HEIGHT_NEAR_TRANSIT_FT
    } else {
        DETACHED_HEIGHT_FT
    };

    let (name, added_units, added_sqft, breakdown) = if base.zone.class.is_single_family() {
        (
            "ADU + JADU",
            2,
            DETACHED_ADU_MAX_SQFT + JADU_MAX_SQFT,
            format!(
                "One detached ADU up to {} sq ft and one JADU up to {} sq ft",
                trim_number(DETACHED_ADU_MAX_SQFT),
                trim_number(JADU_MAX_SQFT)
            ),
        )
    } else {
        let conversions = conversion_allowance(parcel.existing_units);
        (
            "Multifamily ADUs",
            conversions + MULTIFAMILY_DETACHED_COUNT,
            f64::from(MULTIFAMILY_DETACHED_COUNT) * MULTIFAMILY_DETACHED_SQFT,
            format!(
                "{} conversion ADU(s) in non-livable space and {} detached ADUs",
                conversions, MULTIFAMILY_DETACHED_COUNT
            ),
        )
    };

    let mut scenario = DevelopmentScenario::new(name, ProgramKind::Adu, "Gov. Code § 66314 et seq.");
    scenario.max_units = base.max_units + added_units;
    scenario.max_building_area_sqft = base.max_building_area_sqft + added_sqft;
    scenario.max_height_ft = base.max_height_ft;
    scenario.max_stories = base.max_stories;
    // Primary units per zone ratio; one space per ADU
    scenario.parking_required = parking_spaces(base.max_units, base.parking_per_unit) + added_units;
    scenario.lot_coverage_pct = base.lot_coverage_pct;
    scenario.setbacks.insert(SetbackSide::Front, base.front_setback_ft);
    scenario.setbacks.insert(SetbackSide::Side, ADU_SIDE_REAR_SETBACK_FT);
    scenario.setbacks.insert(SetbackSide::Rear, ADU_SIDE_REAR_SETBACK_FT);

    scenario.notes.push(breakdown);
    scenario.notes.push(format!(
        "Detached ADU height limit: {} ft",
        trim_number(detached_height)
    ));
    scenario
        .notes
        .push("ADU side and rear setbacks: 4 ft; primary structure follows base zoning".to_string());
    if parcel.in_coastal_zone {
        scenario
            .notes
            .push("Coastal zone: ADU approval may require a coastal development permit".to_string());
    }

    Ok(BuildOutcome::built(scenario))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::eligibility::EligibilityEvaluator;
    use crate::test_support::parcel;

    fn built(p: &ParcelContext) -> DevelopmentScenario {
        match build(p).unwrap() {
            BuildOutcome::Built { scenario, .. } => scenario,
            other => panic!("expected scenario, got {:?}", other),
        }
    }

    #[test]
    fn test_single_family_adds_adu_and_jadu() {
        let s = built(&parcel("R1-1", 6_000.0));
        assert_eq!(s.max_units, 3);
        assert_eq!(s.name, "ADU + JADU");
        assert!(s.has_note("Detached ADU height limit: 16 ft"));
    }

    #[test]
    fn test_multifamily_conversions() {
        assert_eq!(conversion_allowance(0), 0);
        assert_eq!(conversion_allowance(3), 1);
        assert_eq!(conversion_allowance(8), 2);

        let mut p = parcel("R3-1", 8_000.0);
        p.existing_units = 8;
        let s = built(&p);
        // 10 base + 2 conversions + 2 detached
        assert_eq!(s.max_units, 14);
    }

    #[test]
    fn test_transit_height() {
        let mut p = parcel("R1-1", 6_000.0);
        p.near_major_transit = true;
        assert!(built(&p).has_note("Detached ADU height limit: 18 ft"));
    }

    #[test]
    fn test_commercial_zone_ineligible() {
        let config = EngineConfig::default();
        let result = EligibilityEvaluator::new(criteria(), &config).evaluate(&parcel("C2-1", 6_000.0));
        assert!(!result.eligible);
    }
}
