//! District plan overlay tiers
//!
//! One registered program per tier. A tier scenario exists only when the
//! parcel is designated that tier, sits in a classified plan district, and
//! the (district, tier, size class) row exists in the tier table. An
//! unreported tier never excludes; it leaves every tier unbuilt with one
//! verification note on tier 1.

use super::{affordable_units, parking_spaces, BuildOutcome, AVERAGE_UNIT_SQFT};
use crate::eligibility::site::SiteFactor;
use crate::config::EngineConfig;
use crate::eligibility::{
    Bound, EligibilityCriteria, EligibilityEvaluator, TenancyRules, Threshold, WhenMissing,
    ZoningGate,
};
use crate::error::Result;
use crate::standards::tiers::{tier_min_affordable_pct, PLAN_OVERLAY_CODE};
use crate::standards::{
    base_standards, classify_district, tier_standards, trim_number, DistrictClassification,
    SizeClass, StandardsFloor,
};
use shared_types::{
    DevelopmentScenario, EligibilityResult, ParcelContext, ProgramKind, SetbackSide,
    UnknownFlagPolicy,
};

const CITATION: &str = "Community Plan Implementation Overlay";

fn in_plan_area(parcel: &ParcelContext) -> bool {
    classify_district(parcel).in_plan_area()
}

fn designated_tier(parcel: &ParcelContext) -> Option<f64> {
    parcel.overlay_tier.map(f64::from)
}

pub fn criteria(tier: u8) -> EligibilityCriteria {
    EligibilityCriteria {
        program: ProgramKind::PlanOverlay { tier },
        zoning: ZoningGate {
            requirement: "inside the community plan overlay area",
            citation: CITATION,
            matches: in_plan_area,
        },
        thresholds: vec![Threshold {
            field: "overlay_tier",
            label: "Overlay tier designation",
            requirement: "tier designation",
            unit: "",
            citation: CITATION,
            value: designated_tier,
            bound: Bound::Within(f64::from(tier), f64::from(tier)),
            when_missing: WhenMissing::Deferred,
        }],
        site_exclusions: vec![SiteFactor::HistoricResource],
        site_citation: CITATION,
        tenancy: Some(TenancyRules::rent_control(CITATION)),
        commitments: None,
    }
}

pub fn is_eligible(tier: u8, parcel: &ParcelContext, config: &EngineConfig) -> EligibilityResult {
    let mut result = EligibilityEvaluator::new(criteria(tier), config).evaluate(parcel);
    if tier == 1 && result.eligible && parcel.overlay_tier.is_none() {
        result.verify(
            "overlay_tier",
            UnknownFlagPolicy::AssumedClear,
            "Overlay tier designation not reported; no tier scenario is built until it is verified",
        );
    }
    result
}

pub fn build(tier: u8, parcel: &ParcelContext) -> Result<BuildOutcome> {
    match parcel.overlay_tier {
        Some(designated) if designated == tier => {}
        Some(designated) => {
            return Ok(BuildOutcome::not_applicable(format!(
                "Parcel is designated tier {}",
                designated
            )))
        }
        None => {
            return Ok(BuildOutcome::not_applicable(
                "Overlay tier designation not reported",
            ))
        }
    }

    let district = match classify_district(parcel) {
        DistrictClassification::Classified { district, .. } => district,
        DistrictClassification::Conflict { by_prefix, by_overlay } => {
            return Ok(BuildOutcome::not_applicable(format!(
                "Zoning prefix places the parcel in the {} district but overlay code says {}; \
                 district cannot be determined",
                by_prefix.label(),
                by_overlay.label()
            )))
        }
        DistrictClassification::Unclassified => {
            return Ok(BuildOutcome::not_applicable(format!(
                "Parcel is not in a {} district",
                PLAN_OVERLAY_CODE
            )))
        }
    };

    let size = SizeClass::for_lot(parcel.lot_area_sqft);
    let standards = match tier_standards(district, tier, size) {
        Some(standards) => standards,
        None => {
            return Ok(BuildOutcome::not_applicable(format!(
                "Tier {} is not defined for {} {:?} lots",
                tier,
                district.label(),
                size
            )))
        }
    };
    let base = base_standards(parcel)?;

    let far = StandardsFloor::new(standards.far, Some(base.far));
    let area = far.resolved * parcel.lot_area_sqft;
    let units = ((area / AVERAGE_UNIT_SQFT).floor() as u32).max(base.max_units);

    let mut scenario = DevelopmentScenario::new(
        format!("{} Tier {}", district.label(), tier),
        ProgramKind::PlanOverlay { tier },
        format!("{} ({} district)", CITATION, district.label()),
    );
    scenario.max_units = units;
    scenario.max_building_area_sqft = area;
    scenario.max_height_ft = standards.max_height_ft.max(base.max_height_ft);
    scenario.max_stories = standards.max_stories.max(base.max_stories);
    scenario.affordable_units_required = affordable_units(units, standards.min_affordable_pct);
    scenario.parking_required = parking_spaces(units, base.parking_per_unit);
    scenario.lot_coverage_pct = base.lot_coverage_pct;
    scenario.setbacks.insert(SetbackSide::Front, base.front_setback_ft);
    scenario.setbacks.insert(SetbackSide::Side, base.side_setback_ft);
    scenario.setbacks.insert(SetbackSide::Rear, base.rear_setback_ft);

    scenario.notes.push(format!(
        "FAR {} from the tier table (base zoning allows {})",
        trim_number(far.resolved),
        trim_number(base.far)
    ));
    scenario.notes.push(format!(
        "At least {}% of units restricted to lower-income households",
        trim_number(standards.min_affordable_pct)
    ));
    match parcel.affordability_pct {
        Some(pct) if pct < standards.min_affordable_pct => scenario.notes.push(format!(
            "Proposed {}% set-aside is below the tier minimum",
            trim_number(pct)
        )),
        None => scenario
            .notes
            .push("Affordable set-aside not reported; tier minimum assumed".to_string()),
        _ => {}
    }
    if let Some(lowest) = tier_min_affordable_pct(tier).filter(|l| *l < standards.min_affordable_pct) {
        scenario.notes.push(format!(
            "Other districts allow tier {} at {}%",
            tier,
            trim_number(lowest)
        ));
    }

    Ok(BuildOutcome::built(scenario))
}
