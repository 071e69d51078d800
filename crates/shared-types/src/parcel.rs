//! Parcel input record
//!
//! A `ParcelContext` is assembled once per request by the calling layer and
//! is read-only for the rest of the evaluation. Site and tenancy flags are
//! tri-state: `Some(true)` confirmed, `Some(false)` confirmed clear, `None`
//! not reported. Unknown flags are never treated as exclusions by the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Square feet in one acre
pub const SQFT_PER_ACRE: f64 = 43_560.0;

/// Income category used by affordability commitments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeCategory {
    /// Households at or below 50% AMI
    VeryLow,
    /// Households at or below 80% AMI
    Low,
    /// Households at or below 120% AMI
    Moderate,
}

impl IncomeCategory {
    /// AMI percentage that defines the category ceiling
    pub fn ami_pct(&self) -> u32 {
        match self {
            IncomeCategory::VeryLow => 50,
            IncomeCategory::Low => 80,
            IncomeCategory::Moderate => 120,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IncomeCategory::VeryLow => "very low income",
            IncomeCategory::Low => "low income",
            IncomeCategory::Moderate => "moderate income",
        }
    }
}

/// Ownership structure of the proposed project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenure {
    Rental,
    ForSale,
    #[default]
    Unknown,
}

/// Immutable description of one parcel and the project intent for it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelContext {
    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------
    /// Assessor parcel number
    pub apn: String,
    /// City or unincorporated county name
    pub jurisdiction: String,
    pub county: String,
    /// As-of date for every look-back window (Ellis Act, tenancy)
    pub evaluation_date: NaiveDate,

    // ------------------------------------------------------------------
    // Zoning
    // ------------------------------------------------------------------
    /// Full zoning string, e.g. "R1-1", "[Q]C2-1VL-CPIO"
    pub zoning_code: String,
    #[serde(default)]
    pub general_plan_designation: Option<String>,
    #[serde(default)]
    pub overlay_codes: Vec<String>,
    /// Plan-overlay tier designation (1-based)
    #[serde(default)]
    pub overlay_tier: Option<u8>,
    /// Locally adopted height limit, when it differs from the zone table
    #[serde(default)]
    pub local_max_height_ft: Option<f64>,
    #[serde(default)]
    pub local_max_far: Option<f64>,
    #[serde(default)]
    pub local_density_units_per_acre: Option<f64>,

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------
    pub lot_area_sqft: f64,
    #[serde(default)]
    pub lot_width_ft: Option<f64>,
    #[serde(default)]
    pub lot_depth_ft: Option<f64>,
    /// Right-of-way width of the street the parcel fronts
    #[serde(default)]
    pub street_row_width_ft: Option<f64>,

    // ------------------------------------------------------------------
    // Existing conditions
    // ------------------------------------------------------------------
    #[serde(default)]
    pub existing_units: u32,
    #[serde(default)]
    pub existing_building_sqft: Option<f64>,
    #[serde(default)]
    pub year_built: Option<u32>,

    // ------------------------------------------------------------------
    // Project intent
    // ------------------------------------------------------------------
    #[serde(default)]
    pub proposed_units: Option<u32>,
    #[serde(default)]
    pub avg_bedrooms_per_unit: Option<f64>,
    /// Share of units restricted as affordable, 0-100
    #[serde(default)]
    pub affordability_pct: Option<f64>,
    #[serde(default)]
    pub income_category: Option<IncomeCategory>,
    #[serde(default)]
    pub tenure: Tenure,
    #[serde(default)]
    pub prevailing_wage_commitment: Option<bool>,
    #[serde(default)]
    pub skilled_workforce_commitment: Option<bool>,
    /// SB 9 lot split: owner intends to occupy one unit for three years
    #[serde(default)]
    pub owner_occupancy_affidavit: Option<bool>,

    // ------------------------------------------------------------------
    // Location
    // ------------------------------------------------------------------
    /// Within one-half mile of a major transit stop
    #[serde(default)]
    pub near_major_transit: bool,
    #[serde(default)]
    pub in_coastal_zone: bool,
    #[serde(default)]
    pub is_urban_infill: Option<bool>,

    // ------------------------------------------------------------------
    // Site flags
    // ------------------------------------------------------------------
    #[serde(default)]
    pub prime_farmland: Option<bool>,
    #[serde(default)]
    pub wetlands: Option<bool>,
    /// Alquist-Priolo earthquake fault zone
    #[serde(default)]
    pub earthquake_fault_zone: Option<bool>,
    #[serde(default)]
    pub very_high_fire_severity: Option<bool>,
    /// FEMA special flood hazard area
    #[serde(default)]
    pub flood_zone: Option<bool>,
    #[serde(default)]
    pub historic_resource: Option<bool>,
    #[serde(default)]
    pub hazardous_waste_site: Option<bool>,
    #[serde(default)]
    pub conservation_easement: Option<bool>,

    // ------------------------------------------------------------------
    // Protected housing
    // ------------------------------------------------------------------
    #[serde(default)]
    pub rent_controlled_units: Option<bool>,
    #[serde(default)]
    pub ellis_act_withdrawal: Option<bool>,
    #[serde(default)]
    pub ellis_act_withdrawal_date: Option<NaiveDate>,
    #[serde(default)]
    pub tenant_occupied_recently: Option<bool>,
    #[serde(default)]
    pub last_tenant_occupancy: Option<NaiveDate>,
    #[serde(default)]
    pub deed_restricted_affordable: Option<bool>,
    #[serde(default)]
    pub prior_sb9_lot_split: Option<bool>,
}

impl ParcelContext {
    /// Create a parcel with every optional flag unreported
    pub fn new(
        apn: &str,
        jurisdiction: &str,
        county: &str,
        zoning_code: &str,
        lot_area_sqft: f64,
        evaluation_date: NaiveDate,
    ) -> Self {
        Self {
            apn: apn.to_string(),
            jurisdiction: jurisdiction.to_string(),
            county: county.to_string(),
            zoning_code: zoning_code.to_string(),
            lot_area_sqft,
            evaluation_date,
            ..Default::default()
        }
    }

    pub fn lot_area_acres(&self) -> f64 {
        self.lot_area_sqft / SQFT_PER_ACRE
    }

    /// Case-insensitive substring match against the overlay code list
    pub fn has_overlay(&self, needle: &str) -> bool {
        let needle = needle.to_uppercase();
        self.overlay_codes
            .iter()
            .any(|code| code.to_uppercase().contains(&needle))
    }

    /// Case-insensitive whole-code match against the overlay code list
    pub fn has_overlay_code(&self, code: &str) -> bool {
        self.overlay_codes
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(code))
    }

    /// List malformed input fields
    ///
    /// Problems are returned rather than raised so the caller can surface
    /// them as warnings and keep evaluating unaffected programs.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.zoning_code.trim().is_empty() {
            problems.push("zoning_code is empty".to_string());
        }
        if !self.lot_area_sqft.is_finite() || self.lot_area_sqft <= 0.0 {
            problems.push(format!(
                "lot_area_sqft must be a positive number (found {})",
                self.lot_area_sqft
            ));
        }
        if let Some(pct) = self.affordability_pct {
            if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
                problems.push(format!(
                    "affordability_pct must be between 0 and 100 (found {})",
                    pct
                ));
            }
        }
        if let Some(width) = self.street_row_width_ft {
            if !width.is_finite() || width <= 0.0 {
                problems.push(format!(
                    "street_row_width_ft must be positive (found {})",
                    width
                ));
            }
        }
        if self.overlay_tier == Some(0) {
            problems.push("overlay_tier is 1-based; 0 is not a valid tier".to_string());
        }
        if let Some(bedrooms) = self.avg_bedrooms_per_unit {
            if !bedrooms.is_finite() || bedrooms < 0.0 {
                problems.push(format!(
                    "avg_bedrooms_per_unit must be zero or more (found {})",
                    bedrooms
                ));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_new_leaves_flags_unreported() {
        let parcel = ParcelContext::new("123", "Los Angeles", "Los Angeles", "R1-1", 6000.0, date());
        assert_eq!(parcel.wetlands, None);
        assert_eq!(parcel.rent_controlled_units, None);
        assert_eq!(parcel.tenure, Tenure::Unknown);
        assert!(!parcel.near_major_transit);
    }

    #[test]
    fn test_lot_area_acres() {
        let parcel = ParcelContext::new("1", "X", "Y", "C2-1", SQFT_PER_ACRE * 2.0, date());
        assert!((parcel.lot_area_acres() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_has_overlay_is_case_insensitive_substring() {
        let mut parcel = ParcelContext::new("1", "X", "Y", "C2-1", 5000.0, date());
        parcel.overlay_codes = vec!["cpio-cc".to_string(), "HPOZ".to_string()];
        assert!(parcel.has_overlay("CPIO"));
        assert!(parcel.has_overlay("hpoz"));
        assert!(!parcel.has_overlay("VHFHSZ"));
    }

    #[test]
    fn test_has_overlay_code_matches_whole_codes() {
        let mut parcel = ParcelContext::new("1", "X", "Y", "C2-1", 5000.0, date());
        parcel.overlay_codes = vec![" cpio-cc ".to_string(), "CPIO-RCX".to_string()];
        assert!(parcel.has_overlay_code("CPIO-CC"));
        assert!(!parcel.has_overlay_code("CPIO-RC"));
        assert!(!parcel.has_overlay_code("CPIO"));
    }

    #[test]
    fn test_validate_flags_bad_inputs() {
        let mut parcel = ParcelContext::new("1", "X", "Y", "", -5.0, date());
        parcel.affordability_pct = Some(140.0);
        parcel.overlay_tier = Some(0);

        let problems = parcel.validate();
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("lot_area_sqft")));
        assert!(problems.iter().any(|p| p.contains("affordability_pct")));
    }

    #[test]
    fn test_validate_accepts_clean_parcel() {
        let parcel = ParcelContext::new("1", "X", "Y", "R3-1", 7500.0, date());
        assert!(parcel.validate().is_empty());
    }

    #[test]
    fn test_deserializes_with_optional_fields_missing() {
        let json = r#"{
            "apn": "5432-001-010",
            "jurisdiction": "Los Angeles",
            "county": "Los Angeles",
            "evaluation_date": "2025-03-01",
            "zoning_code": "R1-1",
            "lot_area_sqft": 6000.0
        }"#;
        let parcel: ParcelContext = serde_json::from_str(json).unwrap();
        assert_eq!(parcel.existing_units, 0);
        assert!(parcel.overlay_codes.is_empty());
        assert_eq!(parcel.income_category, None);
    }
}
