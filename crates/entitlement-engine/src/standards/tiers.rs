//! District plan overlay tiers
//!
//! A plan overlay (community plan implementation overlay, "CPIO") divides its
//! area into districts and grants FAR/height by tier and lot size class.
//! Lookups are exact-match only: a (district, tier, size class) triple that
//! is not in the table means the tier does not apply to the parcel. There is
//! no interpolation between rows.

use crate::zoning::{ZoneClass, ZoneCode};
use serde::{Deserialize, Serialize};
use shared_types::ParcelContext;

/// Overlay code that marks a parcel as inside the plan area
pub const PLAN_OVERLAY_CODE: &str = "CPIO";

/// Lots at or above this area use the large-lot rows
pub const LARGE_LOT_SQFT: f64 = 12_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanDistrict {
    RegionalCenter,
    CommercialCorridor,
    TransitNode,
}

impl PlanDistrict {
    pub fn label(&self) -> &'static str {
        match self {
            PlanDistrict::RegionalCenter => "Regional Center",
            PlanDistrict::CommercialCorridor => "Commercial Corridor",
            PlanDistrict::TransitNode => "Transit Node",
        }
    }

    /// Overlay code fragment that names the district, e.g. "CPIO-RC"
    fn overlay_marker(&self) -> &'static str {
        match self {
            PlanDistrict::RegionalCenter => "CPIO-RC",
            PlanDistrict::CommercialCorridor => "CPIO-CC",
            PlanDistrict::TransitNode => "CPIO-TN",
        }
    }

    /// District implied by the zone class alone
    fn from_zone_prefix(class: ZoneClass) -> Option<Self> {
        match class {
            ZoneClass::C4 => Some(PlanDistrict::RegionalCenter),
            ZoneClass::C1 | ZoneClass::C2 => Some(PlanDistrict::CommercialCorridor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Standard,
    Large,
}

impl SizeClass {
    pub fn for_lot(lot_area_sqft: f64) -> Self {
        if lot_area_sqft >= LARGE_LOT_SQFT {
            SizeClass::Large
        } else {
            SizeClass::Standard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    ZoningPrefix,
    OverlayCode,
    /// Both signals present and in agreement
    Both,
}

/// Outcome of placing a parcel in a plan district
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DistrictClassification {
    /// Parcel is outside the plan area or matches no district
    Unclassified,
    Classified {
        district: PlanDistrict,
        source: ClassificationSource,
    },
    /// Zoning prefix and overlay code name different districts
    Conflict {
        by_prefix: PlanDistrict,
        by_overlay: PlanDistrict,
    },
}

impl DistrictClassification {
    pub fn district(&self) -> Option<PlanDistrict> {
        match self {
            DistrictClassification::Classified { district, .. } => Some(*district),
            _ => None,
        }
    }

    pub fn in_plan_area(&self) -> bool {
        !matches!(self, DistrictClassification::Unclassified)
    }
}

/// Place a parcel in a plan district
///
/// Only parcels inside the plan area (a "CPIO" zoning suffix or overlay code)
/// are classified. The zoning prefix wins when both signals agree. When they
/// disagree there is no defined tie-break, so the conflict is returned for the
/// caller to surface.
pub fn classify_district(parcel: &ParcelContext) -> DistrictClassification {
    let zone = ZoneCode::parse(&parcel.zoning_code);
    let in_plan_area = parcel.has_overlay(PLAN_OVERLAY_CODE)
        || zone
            .as_ref()
            .map(|z| z.has_suffix(PLAN_OVERLAY_CODE))
            .unwrap_or(false);
    if !in_plan_area {
        return DistrictClassification::Unclassified;
    }

    let by_prefix = zone.and_then(|z| PlanDistrict::from_zone_prefix(z.class));
    let by_overlay = [
        PlanDistrict::RegionalCenter,
        PlanDistrict::CommercialCorridor,
        PlanDistrict::TransitNode,
    ]
    .into_iter()
    .find(|d| parcel.has_overlay_code(d.overlay_marker()));

    match (by_prefix, by_overlay) {
        (Some(p), Some(o)) if p == o => DistrictClassification::Classified {
            district: p,
            source: ClassificationSource::Both,
        },
        (Some(p), Some(o)) => DistrictClassification::Conflict {
            by_prefix: p,
            by_overlay: o,
        },
        (Some(p), None) => DistrictClassification::Classified {
            district: p,
            source: ClassificationSource::ZoningPrefix,
        },
        (None, Some(o)) => DistrictClassification::Classified {
            district: o,
            source: ClassificationSource::OverlayCode,
        },
        (None, None) => DistrictClassification::Unclassified,
    }
}

/// Standards granted by one tier row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierStandards {
    pub far: f64,
    pub max_height_ft: f64,
    pub max_stories: u32,
    /// Minimum share of units restricted to lower-income households
    pub min_affordable_pct: f64,
}

const fn tier(far: f64, max_height_ft: f64, max_stories: u32, min_affordable_pct: f64) -> TierStandards {
    TierStandards {
        far,
        max_height_ft,
        max_stories,
        min_affordable_pct,
    }
}

/// (district, tier, size class) -> standards
///
/// Transit Node tier 3 is defined for large lots only.
const TIER_TABLE: &[(PlanDistrict, u8, SizeClass, TierStandards)] = &[
    (PlanDistrict::RegionalCenter, 1, SizeClass::Standard, tier(3.0, 75.0, 6, 10.0)),
    (PlanDistrict::RegionalCenter, 1, SizeClass::Large, tier(3.5, 85.0, 7, 10.0)),
    (PlanDistrict::RegionalCenter, 2, SizeClass::Standard, tier(4.0, 85.0, 7, 15.0)),
    (PlanDistrict::RegionalCenter, 2, SizeClass::Large, tier(4.5, 95.0, 8, 15.0)),
    (PlanDistrict::RegionalCenter, 3, SizeClass::Standard, tier(4.5, 95.0, 8, 20.0)),
    (PlanDistrict::RegionalCenter, 3, SizeClass::Large, tier(6.0, 120.0, 10, 20.0)),
    (PlanDistrict::CommercialCorridor, 1, SizeClass::Standard, tier(2.0, 45.0, 4, 10.0)),
    (PlanDistrict::CommercialCorridor, 1, SizeClass::Large, tier(2.5, 55.0, 5, 10.0)),
    (PlanDistrict::CommercialCorridor, 2, SizeClass::Standard, tier(3.0, 56.0, 5, 15.0)),
    (PlanDistrict::CommercialCorridor, 2, SizeClass::Large, tier(3.25, 60.0, 5, 15.0)),
    (PlanDistrict::CommercialCorridor, 3, SizeClass::Standard, tier(3.5, 65.0, 6, 20.0)),
    (PlanDistrict::CommercialCorridor, 3, SizeClass::Large, tier(3.75, 75.0, 6, 20.0)),
    (PlanDistrict::TransitNode, 1, SizeClass::Standard, tier(3.0, 65.0, 6, 10.0)),
    (PlanDistrict::TransitNode, 1, SizeClass::Large, tier(3.5, 75.0, 6, 10.0)),
    (PlanDistrict::TransitNode, 2, SizeClass::Standard, tier(4.0, 75.0, 6, 15.0)),
    (PlanDistrict::TransitNode, 2, SizeClass::Large, tier(4.25, 85.0, 7, 15.0)),
    (PlanDistrict::TransitNode, 3, SizeClass::Large, tier(5.0, 110.0, 9, 20.0)),
];

/// Highest tier number present in the table
pub const MAX_TIER: u8 = 3;

/// Exact-match tier lookup; `None` means "not applicable"
pub fn tier_standards(district: PlanDistrict, tier: u8, size: SizeClass) -> Option<TierStandards> {
    TIER_TABLE
        .iter()
        .find(|(d, t, s, _)| *d == district && *t == tier && *s == size)
        .map(|(_, _, _, standards)| *standards)
}

/// Lowest affordability share any row of a tier asks for
pub fn tier_min_affordable_pct(tier: u8) -> Option<f64> {
    TIER_TABLE
        .iter()
        .filter(|(_, t, _, _)| *t == tier)
        .map(|(_, _, _, s)| s.min_affordable_pct)
        .reduce(f64::min)
}
