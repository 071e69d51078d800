//! SB 9 (2021) - two-unit developments and urban lot splits
//!
//! Gov. Code § 65852.21 (two units on a single-family lot) and § 66411.7
//! (split into two lots, each of which may then carry two units).
//!
//! Local standards apply unless they would preclude two units of at least
//! 800 sq ft each. Side and rear setbacks may not exceed 4 ft; the front
//! setback is left to the local ordinance.

use super::{zone_class, BuildOutcome};
use crate::eligibility::site::SB9_SITE_FACTORS;
use crate::eligibility::{
    Bound, CommitmentRules, EligibilityCriteria, TenancyRules, Threshold, WhenMissing, ZoningGate,
};
use crate::error::Result;
use crate::standards::{base_standards, trim_number, StandardsFloor};
use shared_types::{DevelopmentScenario, ParcelContext, ProgramKind, SetbackSide};

/// § 65852.21(b)(2)(B): local standards cannot shrink units below this
pub const MIN_UNIT_SQFT: f64 = 800.0;

/// SB 9 side and rear setback ceiling
pub const MAX_SIDE_REAR_SETBACK_FT: f64 = 4.0;

pub const DUPLEX_MIN_LOT_SQFT: f64 = 2_000.0;

/// Two resulting lots of at least 1,200 sq ft each
pub const LOT_SPLIT_MIN_LOT_SQFT: f64 = 2_400.0;

pub const LOT_SPLIT_MIN_RESULTING_LOT_SQFT: f64 = 1_200.0;

// ============================================================================
// Eligibility
// ============================================================================

fn single_family_zone(parcel: &ParcelContext) -> bool {
    zone_class(parcel)
        .map(|class| class.is_single_family())
        .unwrap_or(false)
}

fn lot_area(parcel: &ParcelContext) -> Option<f64> {
    Some(parcel.lot_area_sqft)
}

fn min_lot_threshold(min_sqft: f64, citation: &'static str) -> Threshold {
    Threshold {
        field: "lot_area_sqft",
        label: "Lot area",
        requirement: "minimum lot size",
        unit: "sq ft",
        citation,
        value: lot_area,
        bound: Bound::AtLeast(min_sqft),
        when_missing: WhenMissing::Exclude,
    }
}

pub fn duplex_criteria() -> EligibilityCriteria {
    EligibilityCriteria {
        program: ProgramKind::Sb9Duplex,
        zoning: ZoningGate {
            requirement: "a single-family residential zone",
            citation: "Gov. Code § 65852.21(a)",
            matches: single_family_zone,
        },
        thresholds: vec![min_lot_threshold(DUPLEX_MIN_LOT_SQFT, "Gov. Code § 65852.21(a)")],
        site_exclusions: SB9_SITE_FACTORS.to_vec(),
        site_citation: "Gov. Code § 65852.21(a)(2)",
        tenancy: Some(TenancyRules {
            citation: "Gov. Code § 65852.21(a)(3)-(4)",
            ellis_lookback_years: Some(15),
            tenancy_lookback_years: Some(3),
            deed_restriction: true,
            prior_lot_split: false,
        }),
        commitments: None,
    }
}

pub fn lot_split_criteria() -> EligibilityCriteria {
    EligibilityCriteria {
        program: ProgramKind::Sb9LotSplit,
        zoning: ZoningGate {
            requirement: "a single-family residential zone",
            citation: "Gov. Code § 66411.7(a)(3)(A)",
            matches: single_family_zone,
        },
        thresholds: vec![min_lot_threshold(LOT_SPLIT_MIN_LOT_SQFT, "Gov. Code § 66411.7(a)(1)")],
        site_exclusions: SB9_SITE_FACTORS.to_vec(),
        site_citation: "Gov. Code § 66411.7(a)(3)(C)",
        tenancy: Some(TenancyRules {
            citation: "Gov. Code § 66411.7(a)(3)(D)",
            ellis_lookback_years: Some(15),
            tenancy_lookback_years: Some(3),
            deed_restriction: true,
            prior_lot_split: true,
        }),
        commitments: Some(CommitmentRules {
            citation: "Gov. Code § 66411.7(g)(1)",
            prevailing_wage: false,
            skilled_workforce: false,
            owner_occupancy: true,
            density_floor: None,
        }),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

fn sb9_scenario(
    parcel: &ParcelContext,
    name: &str,
    program: ProgramKind,
    legal_basis: &str,
    units: u32,
) -> Result<DevelopmentScenario> {
    let base = base_standards(parcel)?;
    let area = StandardsFloor::new(MIN_UNIT_SQFT * f64::from(units), Some(base.max_building_area_sqft));

    let mut scenario = DevelopmentScenario::new(name, program, legal_basis);
    scenario.max_units = units;
    scenario.max_building_area_sqft = area.resolved;
    scenario.max_height_ft = base.max_height_ft;
    scenario.max_stories = base.max_stories;
    // One space per unit, waived near transit by post-processing
    scenario.parking_required = units;
    scenario.lot_coverage_pct = base.lot_coverage_pct;
    scenario.setbacks.insert(SetbackSide::Side, MAX_SIDE_REAR_SETBACK_FT);
    scenario.setbacks.insert(SetbackSide::Rear, MAX_SIDE_REAR_SETBACK_FT);

    scenario.notes.push(area.describe("Floor area", "sq ft"));
    scenario.notes.push(format!(
        "Side and rear setbacks limited to {} ft; front setback per local zoning",
        trim_number(MAX_SIDE_REAR_SETBACK_FT)
    ));
    Ok(scenario)
}

pub fn build_duplex(parcel: &ParcelContext) -> Result<BuildOutcome> {
    let scenario = sb9_scenario(
        parcel,
        "SB 9 Duplex (2 units)",
        ProgramKind::Sb9Duplex,
        "Gov. Code § 65852.21 (SB 9)",
        2,
    )?;
    Ok(BuildOutcome::built(scenario))
}

pub fn build_lot_split(parcel: &ParcelContext) -> Result<BuildOutcome> {
    let resulting_lot = parcel.lot_area_sqft / 2.0;
    if resulting_lot < LOT_SPLIT_MIN_RESULTING_LOT_SQFT {
        return Ok(BuildOutcome::not_applicable(format!(
            "An even split yields {} sq ft lots, below the {} sq ft minimum",
            trim_number(resulting_lot),
            trim_number(LOT_SPLIT_MIN_RESULTING_LOT_SQFT)
        )));
    }

    let mut scenario = sb9_scenario(
        parcel,
        "SB 9 Lot Split with Duplexes (4 units)",
        ProgramKind::Sb9LotSplit,
        "Gov. Code §§ 66411.7, 65852.21 (SB 9)",
        4,
    )?;
    scenario.notes.push(format!(
        "Split into two lots of about {} sq ft each (each at least 40% of the original)",
        trim_number(resulting_lot.floor())
    ));
    scenario.notes.push(
        "Applicant must sign an affidavit to occupy one unit as a principal residence for 3 years"
            .to_string(),
    );
    Ok(BuildOutcome::built(scenario))
}
