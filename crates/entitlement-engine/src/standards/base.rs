//! Base zone standards table
//!
//! Local layer: what the zoning ordinance allows with no state program
//! applied. Values follow the common charter-city pattern (density by lot
//! area per unit, height by zone and height district, commercial FAR by
//! height district). Parcel-level local overrides replace table values.

use super::{stories_for_height, trim_number};
use crate::error::{EngineError, Result};
use crate::zoning::{ZoneClass, ZoneCode};
use serde::{Deserialize, Serialize};
use shared_types::{ParcelContext, SQFT_PER_ACRE};

/// Residential density rule for a zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    /// One dwelling per lot regardless of area
    OnePerLot,
    /// One dwelling per this many sq ft of lot area
    LotAreaPerUnit(f64),
    /// Residential use not permitted
    NotPermitted,
}

/// One row of the zone table
#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoneRow {
    density: Density,
    height_ft: f64,
    stories: u32,
    /// `None` means the height district sets FAR
    far: Option<f64>,
    front_setback_ft: f64,
    side_setback_ft: f64,
    rear_setback_ft: f64,
    lot_coverage_pct: f64,
    parking_per_unit: f64,
}

fn zone_row(class: ZoneClass) -> ZoneRow {
    let row = |density, height_ft, stories, far, setbacks: (f64, f64, f64), coverage, parking| ZoneRow {
        density,
        height_ft,
        stories,
        far,
        front_setback_ft: setbacks.0,
        side_setback_ft: setbacks.1,
        rear_setback_ft: setbacks.2,
        lot_coverage_pct: coverage,
        parking_per_unit: parking,
    };

    match class {
        ZoneClass::Re => row(Density::OnePerLot, 36.0, 2, Some(0.40), (25.0, 10.0, 25.0), 40.0, 2.0),
        ZoneClass::Rs => row(Density::OnePerLot, 33.0, 2, Some(0.45), (25.0, 5.0, 20.0), 45.0, 2.0),
        ZoneClass::R1 => row(Density::OnePerLot, 33.0, 2, Some(0.45), (20.0, 5.0, 15.0), 50.0, 2.0),
        ZoneClass::R2 => row(Density::LotAreaPerUnit(2_500.0), 33.0, 2, Some(3.0), (20.0, 5.0, 15.0), 50.0, 2.0),
        ZoneClass::Rd(k) => row(Density::LotAreaPerUnit(k * 1_000.0), 45.0, 3, Some(3.0), (15.0, 5.0, 15.0), 50.0, 2.0),
        ZoneClass::R3 => row(Density::LotAreaPerUnit(800.0), 45.0, 4, Some(3.0), (15.0, 5.0, 15.0), 60.0, 1.5),
        ZoneClass::R4 => row(Density::LotAreaPerUnit(400.0), 85.0, 6, Some(3.0), (15.0, 5.0, 15.0), 65.0, 1.5),
        ZoneClass::R5 => row(Density::LotAreaPerUnit(200.0), 150.0, 12, Some(3.0), (15.0, 5.0, 15.0), 70.0, 1.25),
        ZoneClass::C1 => row(Density::LotAreaPerUnit(800.0), 45.0, 3, None, (0.0, 0.0, 15.0), 80.0, 1.5),
        ZoneClass::C2 => row(Density::LotAreaPerUnit(400.0), 75.0, 6, None, (0.0, 0.0, 15.0), 90.0, 1.5),
        ZoneClass::C4 => row(Density::LotAreaPerUnit(400.0), 75.0, 6, None, (0.0, 0.0, 15.0), 90.0, 1.5),
        ZoneClass::Cm => row(Density::LotAreaPerUnit(800.0), 45.0, 3, None, (0.0, 0.0, 15.0), 90.0, 1.5),
        ZoneClass::M => row(Density::NotPermitted, 45.0, 3, None, (0.0, 0.0, 0.0), 90.0, 0.0),
    }
}

/// Base standards resolved for one parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStandards {
    pub zone: ZoneCode,
    pub density: Density,
    pub max_units: u32,
    /// Density expressed per acre, when the zone has a per-unit density
    pub density_units_per_acre: Option<f64>,
    pub max_height_ft: f64,
    pub max_stories: u32,
    pub far: f64,
    pub max_building_area_sqft: f64,
    pub front_setback_ft: f64,
    pub side_setback_ft: f64,
    pub rear_setback_ft: f64,
    pub lot_coverage_pct: f64,
    pub parking_per_unit: f64,
    /// How each value was derived, in evaluation order
    pub notes: Vec<String>,
}

/// Look up and resolve the base zone standards for a parcel
pub fn base_standards(parcel: &ParcelContext) -> Result<BaseStandards> {
    if !parcel.lot_area_sqft.is_finite() || parcel.lot_area_sqft <= 0.0 {
        return Err(EngineError::InvalidParcel(format!(
            "lot_area_sqft must be positive (found {})",
            parcel.lot_area_sqft
        )));
    }

    let zone = ZoneCode::parse(&parcel.zoning_code)
        .ok_or_else(|| EngineError::UnrecognizedZone(parcel.zoning_code.clone()))?;
    let row = zone_row(zone.class);
    let mut notes = Vec::new();

    // Height: zone table, capped by height district, replaced by a local override
    let mut max_height_ft = row.height_ft;
    let mut max_stories = row.stories;
    if let Some(cap) = zone.height_district.and_then(|hd| hd.height_cap_ft()) {
        if cap < max_height_ft {
            max_height_ft = cap;
            max_stories = max_stories.min(stories_for_height(cap));
            notes.push(format!("Height district caps height at {} ft", trim_number(cap)));
        }
    }
    if let Some(local) = valid(parcel.local_max_height_ft) {
        max_height_ft = local;
        max_stories = stories_for_height(local);
        notes.push(format!("Local height limit of {} ft applied", trim_number(local)));
    }

    // FAR: zone table or height district, replaced by a local override
    let mut far = row.far.unwrap_or_else(|| {
        zone.height_district
            .map(|hd| hd.commercial_far())
            .unwrap_or(1.5)
    });
    if let Some(local) = valid(parcel.local_max_far) {
        far = local;
        notes.push(format!("Local FAR of {} applied", trim_number(local)));
    }

    // Density
    let (max_units, mut density_units_per_acre) = match row.density {
        Density::OnePerLot => (1, None),
        Density::LotAreaPerUnit(area) => (
            ((parcel.lot_area_sqft / area).floor() as u32).max(1),
            Some(SQFT_PER_ACRE / area),
        ),
        Density::NotPermitted => {
            notes.push(format!("{} zone does not permit residential use", zone.class.code()));
            (0, None)
        }
    };
    let local_density = valid(parcel.local_density_units_per_acre)
        .filter(|_| row.density != Density::NotPermitted);
    let max_units = match local_density {
        Some(du_ac) => {
            density_units_per_acre = Some(du_ac);
            notes.push(format!("Local density of {} du/ac applied", trim_number(du_ac)));
            ((du_ac * parcel.lot_area_acres()).floor() as u32).max(1)
        }
        None => max_units,
    };

    Ok(BaseStandards {
        density: row.density,
        max_units,
        density_units_per_acre,
        max_height_ft,
        max_stories,
        far,
        max_building_area_sqft: far * parcel.lot_area_sqft,
        front_setback_ft: row.front_setback_ft,
        side_setback_ft: row.side_setback_ft,
        rear_setback_ft: row.rear_setback_ft,
        lot_coverage_pct: row.lot_coverage_pct,
        parking_per_unit: row.parking_per_unit,
        notes,
        zone,
    })
}

fn valid(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}
