//! Labor and owner commitments
//!
//! Prevailing wage is always required when a program asks for it. A skilled
//! and trained workforce is required once the projected unit count reaches
//! the configured threshold. The projection is the proposed unit count when
//! given, otherwise the program's density floor times lot acreage.

use shared_types::{CheckClass, EligibilityResult, ParcelContext, UnknownFlagPolicy};

#[derive(Debug, Clone, Copy)]
pub struct CommitmentRules {
    pub citation: &'static str,
    pub prevailing_wage: bool,
    pub skilled_workforce: bool,
    /// SB 9 lot split: applicant intends to occupy one unit for 3 years
    pub owner_occupancy: bool,
    /// Units per acre used to project a unit count when none is proposed
    pub density_floor: Option<fn(&ParcelContext) -> Option<f64>>,
}

impl CommitmentRules {
    /// Prevailing wage plus skilled workforce above the threshold
    pub fn labor(citation: &'static str, density_floor: fn(&ParcelContext) -> Option<f64>) -> Self {
        Self {
            citation,
            prevailing_wage: true,
            skilled_workforce: true,
            owner_occupancy: false,
            density_floor: Some(density_floor),
        }
    }
}

/// Proposed units, or density floor x acreage rounded down
pub fn projected_units(
    parcel: &ParcelContext,
    density_floor: Option<fn(&ParcelContext) -> Option<f64>>,
) -> Option<u32> {
    parcel.proposed_units.or_else(|| {
        density_floor
            .and_then(|floor| floor(parcel))
            .filter(|du_ac| du_ac.is_finite() && *du_ac > 0.0)
            .map(|du_ac| (du_ac * parcel.lot_area_acres()).floor() as u32)
    })
}

pub fn check_commitments(
    rules: &CommitmentRules,
    parcel: &ParcelContext,
    skilled_workforce_threshold: u32,
    result: &mut EligibilityResult,
) {
    if rules.prevailing_wage {
        check_commitment(
            parcel.prevailing_wage_commitment,
            "prevailing_wage_commitment",
            "prevailing wages",
            rules.citation,
            result,
        );
    }

    if rules.skilled_workforce {
        match projected_units(parcel, rules.density_floor) {
            Some(units) if units >= skilled_workforce_threshold => {
                result.pass(format!(
                    "Projected {} units meets the {}-unit skilled workforce threshold",
                    units, skilled_workforce_threshold
                ));
                check_commitment(
                    parcel.skilled_workforce_commitment,
                    "skilled_workforce_commitment",
                    "a skilled and trained workforce",
                    rules.citation,
                    result,
                );
            }
            Some(units) => result.pass(format!(
                "Projected {} units is below the {}-unit skilled workforce threshold",
                units, skilled_workforce_threshold
            )),
            None => result.verify(
                "proposed_units",
                UnknownFlagPolicy::AssumedClear,
                format!(
                    "Unit count could not be projected; a skilled and trained workforce is required at {} or more units",
                    skilled_workforce_threshold
                ),
            ),
        }
    }

    if rules.owner_occupancy {
        check_commitment(
            parcel.owner_occupancy_affidavit,
            "owner_occupancy_affidavit",
            "an owner-occupancy affidavit",
            rules.citation,
            result,
        );
    }
}

fn check_commitment(
    flag: Option<bool>,
    field: &str,
    what: &str,
    citation: &str,
    result: &mut EligibilityResult,
) {
    match flag {
        Some(true) => result.pass(format!("Applicant commits to {}", what)),
        Some(false) => result.exclude(
            CheckClass::Commitment,
            citation,
            format!("Applicant declined to commit to {}", what),
        ),
        None => result.verify(
            field,
            UnknownFlagPolicy::AssumedClear,
            format!("Commitment to {} not yet recorded; required at application", what),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parcel;
    use shared_types::{ProgramKind, SQFT_PER_ACRE};

    fn thirty_per_acre(_: &ParcelContext) -> Option<f64> {
        Some(30.0)
    }

    fn rules() -> CommitmentRules {
        CommitmentRules::labor("§ 65913.4(a)(8)", thirty_per_acre)
    }

    #[test]
    fn test_projection_prefers_proposed_units() {
        let mut p = parcel("R3-1", 2.0 * SQFT_PER_ACRE);
        assert_eq!(projected_units(&p, Some(thirty_per_acre)), Some(60));
        p.proposed_units = Some(12);
        assert_eq!(projected_units(&p, Some(thirty_per_acre)), Some(12));
        p.proposed_units = None;
        assert_eq!(projected_units(&p, None), None);
    }

    #[test]
    fn test_skilled_workforce_required_at_threshold() {
        let mut p = parcel("R3-1", 2.0 * SQFT_PER_ACRE);
        p.skilled_workforce_commitment = Some(false);

        let mut result = EligibilityResult::new(ProgramKind::Sb35);
        check_commitments(&rules(), &p, 50, &mut result);
        assert!(!result.eligible);
        assert!(result.has_exclusion(CheckClass::Commitment));

        p.proposed_units = Some(49);
        let mut result = EligibilityResult::new(ProgramKind::Sb35);
        check_commitments(&rules(), &p, 50, &mut result);
        assert!(result.eligible);
    }

    #[test]
    fn test_prevailing_wage_always_required() {
        let mut p = parcel("R3-1", 5_000.0);
        p.prevailing_wage_commitment = Some(false);

        let mut result = EligibilityResult::new(ProgramKind::Ab2011);
        check_commitments(&rules(), &p, 50, &mut result);
        assert!(!result.eligible);
    }

    #[test]
    fn test_unrecorded_commitment_is_a_note() {
        let mut p = parcel("R3-1", 5_000.0);
        p.prevailing_wage_commitment = None;

        let mut result = EligibilityResult::new(ProgramKind::Ab2011);
        check_commitments(&rules(), &p, 50, &mut result);
        assert!(result.eligible);
        assert_eq!(result.warnings[0].field, "prevailing_wage_commitment");
    }
}
