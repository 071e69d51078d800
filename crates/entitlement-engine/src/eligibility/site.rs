//! Categorical site exclusions
//!
//! Each factor is checked independently and every applicable one is
//! reported. Factors follow the Gov. Code 65913.4(a)(6) list that SB 9 and
//! AB 2011 incorporate by reference.

use shared_types::{CheckClass, EligibilityResult, ParcelContext, UnknownFlagPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteFactor {
    PrimeFarmland,
    Wetlands,
    EarthquakeFaultZone,
    VeryHighFireSeverity,
    FloodZone,
    HistoricResource,
    HazardousWasteSite,
    ConservationEasement,
    /// SB 35 requires an urban infill site
    NonUrbanSite,
}

/// Factors shared by SB 9 duplex and lot split
pub const SB9_SITE_FACTORS: &[SiteFactor] = &[
    SiteFactor::PrimeFarmland,
    SiteFactor::Wetlands,
    SiteFactor::EarthquakeFaultZone,
    SiteFactor::VeryHighFireSeverity,
    SiteFactor::FloodZone,
    SiteFactor::HistoricResource,
    SiteFactor::HazardousWasteSite,
];

/// Full 65913.4(a)(6) list used by SB 35 and AB 2011
pub const STREAMLINING_SITE_FACTORS: &[SiteFactor] = &[
    SiteFactor::PrimeFarmland,
    SiteFactor::Wetlands,
    SiteFactor::EarthquakeFaultZone,
    SiteFactor::VeryHighFireSeverity,
    SiteFactor::FloodZone,
    SiteFactor::HistoricResource,
    SiteFactor::HazardousWasteSite,
    SiteFactor::ConservationEasement,
];

impl SiteFactor {
    /// Parcel field the factor reads
    pub fn field(&self) -> &'static str {
        match self {
            SiteFactor::PrimeFarmland => "prime_farmland",
            SiteFactor::Wetlands => "wetlands",
            SiteFactor::EarthquakeFaultZone => "earthquake_fault_zone",
            SiteFactor::VeryHighFireSeverity => "very_high_fire_severity",
            SiteFactor::FloodZone => "flood_zone",
            SiteFactor::HistoricResource => "historic_resource",
            SiteFactor::HazardousWasteSite => "hazardous_waste_site",
            SiteFactor::ConservationEasement => "conservation_easement",
            SiteFactor::NonUrbanSite => "is_urban_infill",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SiteFactor::PrimeFarmland => "prime farmland or farmland of statewide importance",
            SiteFactor::Wetlands => "wetlands",
            SiteFactor::EarthquakeFaultZone => "an Alquist-Priolo earthquake fault zone",
            SiteFactor::VeryHighFireSeverity => "a very high fire hazard severity zone",
            SiteFactor::FloodZone => "a special flood hazard area",
            SiteFactor::HistoricResource => "a historic property or historic district",
            SiteFactor::HazardousWasteSite => "a listed hazardous waste site",
            SiteFactor::ConservationEasement => "land under a conservation easement",
            SiteFactor::NonUrbanSite => "a site outside an urbanized area",
        }
    }

    /// `Some(true)` means the exclusion applies
    fn reported(&self, parcel: &ParcelContext) -> Option<bool> {
        match self {
            SiteFactor::PrimeFarmland => parcel.prime_farmland,
            SiteFactor::Wetlands => parcel.wetlands,
            SiteFactor::EarthquakeFaultZone => parcel.earthquake_fault_zone,
            SiteFactor::VeryHighFireSeverity => parcel.very_high_fire_severity,
            SiteFactor::FloodZone => parcel.flood_zone,
            SiteFactor::HistoricResource => parcel.historic_resource,
            SiteFactor::HazardousWasteSite => parcel.hazardous_waste_site,
            SiteFactor::ConservationEasement => parcel.conservation_easement,
            SiteFactor::NonUrbanSite => parcel.is_urban_infill.map(|infill| !infill),
        }
    }

    /// Overlay codes that hint the factor applies
    fn overlay_hints(&self) -> &'static [&'static str] {
        match self {
            SiteFactor::VeryHighFireSeverity => &["VHFHSZ", "FIRE"],
            SiteFactor::FloodZone => &["SFHA", "FLOOD"],
            SiteFactor::HistoricResource => &["HPOZ", "HISTORIC"],
            SiteFactor::EarthquakeFaultZone => &["APFZ", "FAULT"],
            _ => &[],
        }
    }
}

/// Check every factor; all applicable exclusions are recorded
pub fn check_site_exclusions(
    factors: &[SiteFactor],
    citation: &str,
    parcel: &ParcelContext,
    result: &mut EligibilityResult,
) {
    for factor in factors {
        match factor.reported(parcel) {
            Some(true) => {
                result.exclude(
                    CheckClass::SiteExclusion,
                    citation,
                    format!("Site is {}", factor.label()),
                );
            }
            Some(false) => {}
            None => match factor
                .overlay_hints()
                .iter()
                .find(|hint| parcel.has_overlay(hint))
            {
                Some(hint) => result.verify(
                    factor.field(),
                    UnknownFlagPolicy::Heuristic,
                    format!(
                        "Overlay code {} suggests the site may be {}; verify before relying on this program",
                        hint,
                        factor.label()
                    ),
                ),
                None => result.verify(
                    factor.field(),
                    UnknownFlagPolicy::AssumedClear,
                    format!(
                        "Not reported whether the site is {}; assumed clear pending verification",
                        factor.label()
                    ),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parcel;
    use shared_types::ProgramKind;

    #[test]
    fn test_all_exclusions_enumerated() {
        let mut p = parcel("R1-1", 6_000.0);
        p.prime_farmland = Some(true);
        p.wetlands = Some(true);
        p.historic_resource = Some(true);

        let mut result = EligibilityResult::new(ProgramKind::Sb35);
        check_site_exclusions(STREAMLINING_SITE_FACTORS, "§ 65913.4(a)(6)", &p, &mut result);

        assert!(!result.eligible);
        assert_eq!(result.exclusions.len(), 3);
        assert!(result.exclusions.iter().all(|e| e.class == CheckClass::SiteExclusion));
    }

    #[test]
    fn test_unknown_flag_never_excludes() {
        let mut p = parcel("R1-1", 6_000.0);
        p.wetlands = None;

        let mut result = EligibilityResult::new(ProgramKind::Sb9Duplex);
        check_site_exclusions(SB9_SITE_FACTORS, "§ 65852.21(a)(2)", &p, &mut result);

        assert!(result.eligible);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "wetlands");
        assert_eq!(result.warnings[0].policy, Some(UnknownFlagPolicy::AssumedClear));
    }

    #[test]
    fn test_overlay_hint_triggers_heuristic_warning() {
        let mut p = parcel("R1-1", 6_000.0);
        p.very_high_fire_severity = None;
        p.overlay_codes = vec!["VHFHSZ".to_string()];

        let mut result = EligibilityResult::new(ProgramKind::Sb9Duplex);
        check_site_exclusions(SB9_SITE_FACTORS, "§ 65852.21(a)(2)", &p, &mut result);

        assert!(result.eligible);
        assert_eq!(result.warnings[0].policy, Some(UnknownFlagPolicy::Heuristic));
        assert!(result.warnings[0].message.contains("VHFHSZ"));
    }

    #[test]
    fn test_non_urban_site() {
        let mut p = parcel("R3-1", 6_000.0);
        p.is_urban_infill = Some(false);

        let mut result = EligibilityResult::new(ProgramKind::Sb35);
        check_site_exclusions(&[SiteFactor::NonUrbanSite], "§ 65913.4(a)(2)", &p, &mut result);
        assert!(!result.eligible);
    }
}
