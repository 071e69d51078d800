//! Base zoning scenario
//!
//! Always computed and always included. An unrecognized zone or an unusable
//! lot area still yields a status-quo scenario so the recommendation pool is
//! never empty.

use super::{parking_spaces, BuildOutcome};
use crate::error::{EngineError, Result};
use crate::standards::{base_standards, BaseStandards};
use shared_types::{DevelopmentScenario, ParcelContext, ProgramKind, SetbackSide};
use tracing::warn;

pub const SCENARIO_NAME: &str = "Base Zoning";

pub fn build(parcel: &ParcelContext) -> Result<BuildOutcome> {
    let standards = match base_standards(parcel) {
        Ok(standards) => standards,
        Err(EngineError::UnrecognizedZone(code)) => {
            warn!(zone = %code, "unrecognized zone; base zoning limited to existing conditions");
            return Ok(BuildOutcome::Built {
                scenario: status_quo(parcel, &code),
                warnings: vec![format!(
                    "Zoning code '{}' not recognized; base zoning reflects existing conditions only",
                    code
                )],
            });
        }
        Err(EngineError::InvalidParcel(problem)) => {
            warn!(%problem, "invalid parcel; base zoning limited to existing conditions");
            return Ok(BuildOutcome::Built {
                scenario: status_quo(parcel, &parcel.zoning_code),
                warnings: vec![format!(
                    "Standards cannot be computed ({}); base zoning reflects existing conditions only",
                    problem
                )],
            });
        }
        Err(e) => return Err(e),
    };

    Ok(BuildOutcome::built(scenario_from(&standards)))
}

/// Base zoning scenario for already-resolved standards
pub fn scenario_from(standards: &BaseStandards) -> DevelopmentScenario {
    let mut scenario = DevelopmentScenario::new(
        SCENARIO_NAME,
        ProgramKind::BaseZoning,
        format!("Local zoning ordinance ({} zone)", standards.zone.class.code()),
    );
    scenario.max_units = standards.max_units;
    scenario.max_building_area_sqft = standards.max_building_area_sqft;
    scenario.max_height_ft = standards.max_height_ft;
    scenario.max_stories = standards.max_stories;
    scenario.parking_required = parking_spaces(standards.max_units, standards.parking_per_unit);
    scenario.lot_coverage_pct = standards.lot_coverage_pct;
    scenario.setbacks.insert(SetbackSide::Front, standards.front_setback_ft);
    scenario.setbacks.insert(SetbackSide::Side, standards.side_setback_ft);
    scenario.setbacks.insert(SetbackSide::Rear, standards.rear_setback_ft);
    scenario.notes = standards.notes.clone();

    if standards.zone.is_conditioned() {
        scenario.notes.push(format!(
            "Zone carries [{}] conditions; confirm the ordinance that imposed them",
            standards.zone.conditions.join("][")
        ));
    }

    scenario
}

fn status_quo(parcel: &ParcelContext, code: &str) -> DevelopmentScenario {
    let mut scenario = DevelopmentScenario::new(
        SCENARIO_NAME,
        ProgramKind::BaseZoning,
        format!("Local zoning ordinance ('{}' zone, standards unknown)", code),
    );
    scenario.max_units = parcel.existing_units;
    scenario.max_building_area_sqft = parcel.existing_building_sqft.unwrap_or(0.0).max(0.0);
    scenario.notes.push("Standards unknown; scenario reflects existing conditions".to_string());
    scenario
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parcel;

    fn scenario(outcome: BuildOutcome) -> (DevelopmentScenario, Vec<String>) {
        match outcome {
            BuildOutcome::Built { scenario, warnings } => (scenario, warnings),
            other => panic!("expected scenario, got {:?}", other),
        }
    }

    #[test]
    fn test_builds_from_zone_table() {
        let (s, warnings) = scenario(build(&parcel("R3-1", 7_500.0)).unwrap());
        assert!(warnings.is_empty());
        assert_eq!(s.max_units, 9);
        assert_eq!(s.parking_required, 14);
        assert_eq!(s.setback(SetbackSide::Front), Some(15.0));
        assert!(s.invariant_violations().is_empty());
    }

    #[test]
    fn test_unknown_zone_falls_back_to_existing_conditions() {
        let mut p = parcel("OS-1XL", 7_500.0);
        p.existing_units = 1;
        let (s, warnings) = scenario(build(&p).unwrap());
        assert_eq!(s.max_units, 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_conditions_are_noted() {
        let (s, _) = scenario(build(&parcel("[Q]R3-1", 7_500.0)).unwrap());
        assert!(s.notes.iter().any(|n| n.contains("[Q]")));
    }

    #[test]
    fn test_invalid_lot_area_falls_back_to_existing_conditions() {
        for lot in [0.0, -1.0, f64::NAN] {
            let mut p = parcel("R3-1", lot);
            p.existing_units = 2;
            let (s, warnings) = scenario(build(&p).unwrap());
            assert_eq!(s.max_units, 2);
            assert!(s.invariant_violations().is_empty());
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].contains("lot_area_sqft"));
        }
    }
}
