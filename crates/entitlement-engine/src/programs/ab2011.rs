//! AB 2011 (2022) - housing on commercial corridors
//!
//! Gov. Code § 65912.100 et seq. Residential use is allowed by right on
//! commercially zoned parcels fronting a corridor 70-150 ft wide. Density
//! and height floors depend on the corridor width, with a higher transit
//! floor for parcels near a major transit stop outside the coastal zone.

use super::{affordable_units, parking_spaces, zone_class, BuildOutcome, AVERAGE_UNIT_SQFT};
use crate::eligibility::site::STREAMLINING_SITE_FACTORS;
use crate::eligibility::{
    Bound, CommitmentRules, EligibilityCriteria, TenancyRules, Threshold, WhenMissing, ZoningGate,
};
use crate::error::Result;
use crate::standards::{base_standards, stories_for_height, trim_number, StandardsFloor};
use serde::{Deserialize, Serialize};
use shared_types::{DevelopmentScenario, ParcelContext, ProgramKind, SetbackSide, Tenure};

pub const MIN_CORRIDOR_WIDTH_FT: f64 = 70.0;
pub const WIDE_CORRIDOR_WIDTH_FT: f64 = 100.0;
pub const MAX_CORRIDOR_WIDTH_FT: f64 = 150.0;
pub const MAX_LOT_ACRES: f64 = 20.0;

/// § 65912.113: rental projects
pub const RENTAL_AFFORDABLE_PCT: f64 = 15.0;
/// § 65912.113: for-sale projects
pub const FOR_SALE_AFFORDABLE_PCT: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorridorClass {
    /// 70 ft up to (not including) 100 ft
    Narrow,
    /// 100 ft through 150 ft
    Wide,
    /// Within 1/2 mile of a major transit stop, outside the coastal zone
    TransitPriority,
}

impl CorridorClass {
    pub fn label(&self) -> &'static str {
        match self {
            CorridorClass::Narrow => "Narrow Corridor",
            CorridorClass::Wide => "Wide Corridor",
            CorridorClass::TransitPriority => "Transit Priority",
        }
    }
}

/// State floors for one corridor class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorStandards {
    pub class: CorridorClass,
    pub density_units_per_acre: f64,
    pub height_ft: f64,
}

/// Classify a corridor; `None` when the width is unknown or out of range
/// and the transit override does not apply
pub fn corridor_standards(
    row_width_ft: Option<f64>,
    near_major_transit: bool,
    in_coastal_zone: bool,
) -> Option<CorridorStandards> {
    let standards = |class, density_units_per_acre, height_ft| CorridorStandards {
        class,
        density_units_per_acre,
        height_ft,
    };

    if near_major_transit && !in_coastal_zone {
        return Some(standards(CorridorClass::TransitPriority, 80.0, 65.0));
    }

    match row_width_ft.filter(|w| w.is_finite()) {
        Some(w) if (MIN_CORRIDOR_WIDTH_FT..WIDE_CORRIDOR_WIDTH_FT).contains(&w) => {
            Some(standards(CorridorClass::Narrow, 40.0, 35.0))
        }
        Some(w) if (WIDE_CORRIDOR_WIDTH_FT..=MAX_CORRIDOR_WIDTH_FT).contains(&w) => {
            Some(standards(CorridorClass::Wide, 60.0, 45.0))
        }
        _ => None,
    }
}

// ============================================================================
// Eligibility
// ============================================================================

fn commercial_zone(parcel: &ParcelContext) -> bool {
    zone_class(parcel)
        .map(|class| class.is_commercial())
        .unwrap_or(false)
}

fn row_width(parcel: &ParcelContext) -> Option<f64> {
    parcel.street_row_width_ft
}

fn lot_acres(parcel: &ParcelContext) -> Option<f64> {
    Some(parcel.lot_area_acres())
}

fn corridor_density(parcel: &ParcelContext) -> Option<f64> {
    corridor_standards(
        parcel.street_row_width_ft,
        parcel.near_major_transit,
        parcel.in_coastal_zone,
    )
    .map(|c| c.density_units_per_acre)
}

pub fn criteria() -> EligibilityCriteria {
    EligibilityCriteria {
        program: ProgramKind::Ab2011,
        zoning: ZoningGate {
            requirement: "a zone where office, retail, or parking is a principally permitted use",
            citation: "Gov. Code § 65912.111(a)",
            matches: commercial_zone,
        },
        thresholds: vec![
            Threshold {
                field: "street_row_width_ft",
                label: "Street right-of-way width",
                requirement: "commercial corridor width",
                unit: "ft",
                citation: "Gov. Code § 65912.111(b)",
                value: row_width,
                bound: Bound::Within(MIN_CORRIDOR_WIDTH_FT, MAX_CORRIDOR_WIDTH_FT),
                when_missing: WhenMissing::AssumeClear,
            },
            Threshold {
                field: "lot_area_sqft",
                label: "Lot area",
                requirement: "maximum site size",
                unit: "acres",
                citation: "Gov. Code § 65912.111(c)",
                value: lot_acres,
                bound: Bound::AtMost(MAX_LOT_ACRES),
                when_missing: WhenMissing::Exclude,
            },
        ],
        site_exclusions: STREAMLINING_SITE_FACTORS.to_vec(),
        site_citation: "Gov. Code § 65912.111(e)",
        tenancy: Some(TenancyRules {
            citation: "Gov. Code § 65912.111(d)",
            ellis_lookback_years: Some(15),
            tenancy_lookback_years: Some(10),
            deed_restriction: true,
            prior_lot_split: false,
        }),
        commitments: Some(CommitmentRules::labor("Gov. Code § 65912.130", corridor_density)),
    }
}

// ============================================================================
// Scenario
// ============================================================================

pub fn build(parcel: &ParcelContext) -> Result<BuildOutcome> {
    let corridor = match corridor_standards(
        parcel.street_row_width_ft,
        parcel.near_major_transit,
        parcel.in_coastal_zone,
    ) {
        Some(corridor) => corridor,
        None => {
            return Ok(BuildOutcome::not_applicable(
                "Corridor class cannot be determined from the street right-of-way width",
            ))
        }
    };
    let base = base_standards(parcel)?;

    let density = StandardsFloor::new(corridor.density_units_per_acre, base.density_units_per_acre);
    let height = StandardsFloor::new(corridor.height_ft, Some(base.max_height_ft));
    let units = ((density.resolved * parcel.lot_area_acres()).floor() as u32).max(1);

    let (affordable_pct, tenure_note) = match parcel.tenure {
        Tenure::Rental => (RENTAL_AFFORDABLE_PCT, None),
        Tenure::ForSale => (FOR_SALE_AFFORDABLE_PCT, None),
        Tenure::Unknown => (
            FOR_SALE_AFFORDABLE_PCT,
            Some(format!(
                "Tenure not reported; stricter for-sale {}% set-aside assumed (rental requires {}%)",
                trim_number(FOR_SALE_AFFORDABLE_PCT),
                trim_number(RENTAL_AFFORDABLE_PCT)
            )),
        ),
    };

    let mut scenario = DevelopmentScenario::new(
        format!("AB 2011 {}", corridor.class.label()),
        ProgramKind::Ab2011,
        "Gov. Code § 65912.100 et seq. (AB 2011)",
    );
    scenario.max_units = units;
    scenario.max_height_ft = height.resolved;
    scenario.max_stories = base.max_stories.max(stories_for_height(height.resolved));
    scenario.max_building_area_sqft = base
        .max_building_area_sqft
        .max(f64::from(units) * AVERAGE_UNIT_SQFT);
    scenario.affordable_units_required = affordable_units(units, affordable_pct);
    scenario.parking_required = parking_spaces(units, base.parking_per_unit);
    scenario.lot_coverage_pct = base.lot_coverage_pct;
    scenario.setbacks.insert(SetbackSide::Front, base.front_setback_ft);
    scenario.setbacks.insert(SetbackSide::Side, base.side_setback_ft);
    scenario.setbacks.insert(SetbackSide::Rear, base.rear_setback_ft);

    scenario.notes.push(format!("{} classification", corridor.class.label()));
    scenario.notes.push(density.describe("Density", "du/ac"));
    scenario.notes.push(height.describe("Height", "ft"));
    if let Some(note) = tenure_note {
        scenario.notes.push(note);
    }

    Ok(BuildOutcome::built(scenario))
}
