//! Protected-housing and tenancy exclusions
//!
//! Order matters only once: confirmed rent-controlled units are dispositive,
//! so the remaining tenancy checks are skipped. Everything else accumulates.
//! Look-back windows are measured back from the parcel's evaluation date.

use crate::config::RentControlSettings;
use chrono::{Months, NaiveDate};
use shared_types::{CheckClass, EligibilityResult, ParcelContext, UnknownFlagPolicy};

/// Which protected-housing checks a program applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenancyRules {
    pub citation: &'static str,
    /// Ellis Act withdrawal look-back, in years
    pub ellis_lookback_years: Option<u32>,
    /// Tenant occupancy look-back, in years
    pub tenancy_lookback_years: Option<u32>,
    pub deed_restriction: bool,
    /// SB 9: the parcel must not itself come from an SB 9 split
    pub prior_lot_split: bool,
}

impl TenancyRules {
    /// Rent control only
    pub fn rent_control(citation: &'static str) -> Self {
        Self {
            citation,
            ellis_lookback_years: None,
            tenancy_lookback_years: None,
            deed_restriction: false,
            prior_lot_split: false,
        }
    }
}

/// True when `date` falls inside the `years` look-back ending at `as_of`
pub fn within_lookback(date: NaiveDate, as_of: NaiveDate, years: u32) -> bool {
    match as_of.checked_sub_months(Months::new(years.saturating_mul(12))) {
        Some(start) => date >= start,
        None => true,
    }
}

pub fn check_protected_housing(
    rules: &TenancyRules,
    parcel: &ParcelContext,
    settings: &RentControlSettings,
    result: &mut EligibilityResult,
) {
    // Rent control
    match parcel.rent_controlled_units {
        Some(true) => {
            result.exclude(
                CheckClass::ProtectedHousing,
                rules.citation,
                "Site contains units subject to rent or price control",
            );
            result.pass("Remaining tenancy checks skipped: rent-control exclusion is dispositive");
            return;
        }
        Some(false) => result.pass("No rent-controlled units on site"),
        None if settings.likely_rent_controlled(parcel) => result.verify(
            "rent_controlled_units",
            UnknownFlagPolicy::Heuristic,
            format!(
                "Likely rent-controlled: {} existing units built {} in {}; verify with the rent stabilization registry",
                parcel.existing_units,
                parcel
                    .year_built
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "before the cutoff".to_string()),
                parcel.jurisdiction
            ),
        ),
        None => result.verify(
            "rent_controlled_units",
            UnknownFlagPolicy::AssumedClear,
            "Rent-control status not reported; assumed clear pending verification",
        ),
    }

    if let Some(years) = rules.ellis_lookback_years {
        check_ellis_act(years, rules.citation, parcel, result);
    }
    if let Some(years) = rules.tenancy_lookback_years {
        check_recent_tenancy(years, rules.citation, parcel, result);
    }
    if rules.deed_restriction {
        check_flag(
            parcel.deed_restricted_affordable,
            "deed_restricted_affordable",
            "Site contains deed-restricted affordable housing",
            "No deed-restricted affordable units on site",
            "Deed restriction status not reported; assumed clear pending title review",
            rules.citation,
            result,
        );
    }
    if rules.prior_lot_split {
        check_flag(
            parcel.prior_sb9_lot_split,
            "prior_sb9_lot_split",
            "Parcel was created by a prior SB 9 urban lot split",
            "Parcel was not created by a prior SB 9 lot split",
            "Prior SB 9 lot split not reported; assumed clear pending parcel map review",
            rules.citation,
            result,
        );
    }
}

fn check_ellis_act(years: u32, citation: &str, parcel: &ParcelContext, result: &mut EligibilityResult) {
    let as_of = parcel.evaluation_date;
    match (parcel.ellis_act_withdrawal, parcel.ellis_act_withdrawal_date) {
        (Some(false), _) => result.pass("No Ellis Act withdrawal on record"),
        (_, Some(date)) if within_lookback(date, as_of, years) => result.exclude(
            CheckClass::ProtectedHousing,
            citation,
            format!(
                "Units withdrawn from rental under the Ellis Act on {}, within the {}-year look-back",
                date, years
            ),
        ),
        (_, Some(date)) => result.pass(format!(
            "Ellis Act withdrawal on {} is outside the {}-year look-back",
            date, years
        )),
        (Some(true), None) => result.verify(
            "ellis_act_withdrawal_date",
            UnknownFlagPolicy::Heuristic,
            format!(
                "Ellis Act withdrawal reported without a date; confirm it is more than {} years old",
                years
            ),
        ),
        (None, None) => result.verify(
            "ellis_act_withdrawal",
            UnknownFlagPolicy::AssumedClear,
            "Ellis Act history not reported; assumed clear pending verification",
        ),
    }
}

fn check_recent_tenancy(years: u32, citation: &str, parcel: &ParcelContext, result: &mut EligibilityResult) {
    let as_of = parcel.evaluation_date;
    match (parcel.tenant_occupied_recently, parcel.last_tenant_occupancy) {
        (Some(false), _) => result.pass("No tenant occupancy in the look-back window"),
        (_, Some(date)) if within_lookback(date, as_of, years) => result.exclude(
            CheckClass::ProtectedHousing,
            citation,
            format!(
                "Site was tenant-occupied on {}, within the {}-year look-back",
                date, years
            ),
        ),
        (_, Some(date)) => result.pass(format!(
            "Last tenant occupancy on {} is outside the {}-year look-back",
            date, years
        )),
        (Some(true), None) => result.exclude(
            CheckClass::ProtectedHousing,
            citation,
            format!("Site was tenant-occupied within the {}-year look-back", years),
        ),
        (None, None) if parcel.existing_units > 0 => result.verify(
            "tenant_occupied_recently",
            UnknownFlagPolicy::Heuristic,
            format!(
                "Probable tenancy: {} existing unit(s) on site; verify rental history for the last {} years",
                parcel.existing_units, years
            ),
        ),
        (None, None) => result.verify(
            "tenant_occupied_recently",
            UnknownFlagPolicy::AssumedClear,
            "Tenancy history not reported and no existing units; assumed clear",
        ),
    }
}

fn check_flag(
    flag: Option<bool>,
    field: &str,
    excluded: &str,
    clear: &str,
    unknown: &str,
    citation: &str,
    result: &mut EligibilityResult,
) {
    match flag {
        Some(true) => result.exclude(CheckClass::ProtectedHousing, citation, excluded),
        Some(false) => result.pass(clear),
        None => result.verify(field, UnknownFlagPolicy::AssumedClear, unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, parcel};
    use shared_types::ProgramKind;

    fn sb9_rules() -> TenancyRules {
        TenancyRules {
            citation: "§ 65852.21(a)(3)",
            ellis_lookback_years: Some(15),
            tenancy_lookback_years: Some(3),
            deed_restriction: true,
            prior_lot_split: false,
        }
    }

    fn run(p: &ParcelContext) -> EligibilityResult {
        let mut result = EligibilityResult::new(ProgramKind::Sb9Duplex);
        check_protected_housing(&sb9_rules(), p, &RentControlSettings::default(), &mut result);
        result
    }

    #[test]
    fn test_lookback_boundary() {
        let as_of = date(2025, 1, 15);
        assert!(within_lookback(date(2010, 1, 15), as_of, 15));
        assert!(!within_lookback(date(2010, 1, 14), as_of, 15));
        assert!(within_lookback(date(2026, 1, 1), as_of, 3));
    }

    #[test]
    fn test_confirmed_rent_control_short_circuits() {
        let mut p = parcel("R1-1", 6_000.0);
        p.rent_controlled_units = Some(true);
        p.deed_restricted_affordable = Some(true);
        p.tenant_occupied_recently = Some(true);

        let result = run(&p);
        assert!(!result.eligible);
        assert_eq!(result.exclusions.len(), 1);
    }

    #[test]
    fn test_other_tenancy_exclusions_accumulate() {
        let mut p = parcel("R1-1", 6_000.0);
        p.ellis_act_withdrawal = Some(true);
        p.ellis_act_withdrawal_date = Some(date(2015, 6, 1));
        p.tenant_occupied_recently = Some(true);
        p.deed_restricted_affordable = Some(true);

        let result = run(&p);
        assert_eq!(result.exclusions.len(), 3);
    }

    #[test]
    fn test_old_ellis_withdrawal_passes() {
        let mut p = parcel("R1-1", 6_000.0);
        p.ellis_act_withdrawal = Some(true);
        p.ellis_act_withdrawal_date = Some(date(2005, 6, 1));

        let result = run(&p);
        assert!(result.eligible);
    }

    #[test]
    fn test_rent_control_heuristic_warns() {
        let mut p = parcel("R1-1", 6_000.0);
        p.rent_controlled_units = None;
        p.year_built = Some(1955);
        p.existing_units = 2;

        let result = run(&p);
        assert!(result.eligible);
        let warning = result
            .warnings
            .iter()
            .find(|w| w.field == "rent_controlled_units")
            .unwrap();
        assert_eq!(warning.policy, Some(UnknownFlagPolicy::Heuristic));
        assert!(warning.message.starts_with("Likely rent-controlled"));
    }

    #[test]
    fn test_probable_tenancy_warning() {
        let mut p = parcel("R1-1", 6_000.0);
        p.tenant_occupied_recently = None;
        p.existing_units = 1;

        let result = run(&p);
        assert!(result.eligible);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.starts_with("Probable tenancy")));
    }
}
