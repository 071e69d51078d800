//! Parcel fixtures shared by unit tests

use chrono::NaiveDate;
use shared_types::ParcelContext;

/// A clean parcel: every site and tenancy flag reported clear, infill,
/// labor commitments made, evaluated on a fixed date
pub(crate) fn parcel(zoning_code: &str, lot_area_sqft: f64) -> ParcelContext {
    let evaluation_date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let mut p = ParcelContext::new(
        "5432-010-017",
        "Los Angeles",
        "Los Angeles",
        zoning_code,
        lot_area_sqft,
        evaluation_date,
    );

    p.is_urban_infill = Some(true);
    p.prime_farmland = Some(false);
    p.wetlands = Some(false);
    p.earthquake_fault_zone = Some(false);
    p.very_high_fire_severity = Some(false);
    p.flood_zone = Some(false);
    p.historic_resource = Some(false);
    p.hazardous_waste_site = Some(false);
    p.conservation_easement = Some(false);

    p.rent_controlled_units = Some(false);
    p.ellis_act_withdrawal = Some(false);
    p.tenant_occupied_recently = Some(false);
    p.deed_restricted_affordable = Some(false);
    p.prior_sb9_lot_split = Some(false);

    p.prevailing_wage_commitment = Some(true);
    p.skilled_workforce_commitment = Some(true);
    p.owner_occupancy_affidavit = Some(true);
    p
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
