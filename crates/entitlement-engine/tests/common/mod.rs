//! Shared parcel fixtures for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use entitlement_engine::{EngineConfig, ScenarioComposer};
use shared_types::ParcelContext;

pub fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

/// Parcel with every site and tenancy flag reported clear
pub fn clean_parcel(zoning_code: &str, lot_area_sqft: f64) -> ParcelContext {
    let mut p = ParcelContext::new(
        "5432-010-017",
        "Los Angeles",
        "Los Angeles",
        zoning_code,
        lot_area_sqft,
        evaluation_date(),
    );
    p.is_urban_infill = Some(true);
    for flag in [
        &mut p.prime_farmland,
        &mut p.wetlands,
        &mut p.earthquake_fault_zone,
        &mut p.very_high_fire_severity,
        &mut p.flood_zone,
        &mut p.historic_resource,
        &mut p.hazardous_waste_site,
        &mut p.conservation_easement,
        &mut p.rent_controlled_units,
        &mut p.ellis_act_withdrawal,
        &mut p.tenant_occupied_recently,
        &mut p.deed_restricted_affordable,
        &mut p.prior_sb9_lot_split,
    ] {
        *flag = Some(false);
    }
    p.prevailing_wage_commitment = Some(true);
    p.skilled_workforce_commitment = Some(true);
    p.owner_occupancy_affidavit = Some(true);
    p
}

pub fn composer() -> ScenarioComposer {
    ScenarioComposer::from_config(EngineConfig::default())
}

/// Path to a fixture under tests/fixtures
pub fn fixture(name: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
