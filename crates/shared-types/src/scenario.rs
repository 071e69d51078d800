//! Development scenario produced by a program rule

use crate::program::ProgramKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Side of the lot a setback applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetbackSide {
    Front,
    Side,
    Rear,
}

/// One legally supportable way to develop the parcel
///
/// Built by exactly one program rule. The composer runs the universal
/// post-processing passes and after that the scenario is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentScenario {
    pub name: String,
    pub program: ProgramKind,
    /// Statute or ordinance the scenario relies on
    pub legal_basis: String,
    pub max_units: u32,
    pub max_building_area_sqft: f64,
    pub max_height_ft: f64,
    pub max_stories: u32,
    /// Off-street parking spaces
    pub parking_required: u32,
    pub affordable_units_required: u32,
    /// Only the sides the program sets; absent sides follow the base zone
    pub setbacks: BTreeMap<SetbackSide, f64>,
    pub lot_coverage_pct: f64,
    pub notes: Vec<String>,
    pub concessions: Vec<String>,
    pub waivers: Vec<String>,
}

impl DevelopmentScenario {
    pub fn new(name: impl Into<String>, program: ProgramKind, legal_basis: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program,
            legal_basis: legal_basis.into(),
            max_units: 0,
            max_building_area_sqft: 0.0,
            max_height_ft: 0.0,
            max_stories: 0,
            parking_required: 0,
            affordable_units_required: 0,
            setbacks: BTreeMap::new(),
            lot_coverage_pct: 0.0,
            notes: Vec::new(),
            concessions: Vec::new(),
            waivers: Vec::new(),
        }
    }

    pub fn setback(&self, side: SetbackSide) -> Option<f64> {
        self.setbacks.get(&side).copied()
    }

    pub fn has_note(&self, note: &str) -> bool {
        self.notes.iter().any(|n| n == note)
    }

    /// Net change in unit count against what is on the site today
    pub fn net_new_units(&self, existing_units: u32) -> i64 {
        i64::from(self.max_units) - i64::from(existing_units)
    }

    /// List every data-model invariant the scenario breaks
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.affordable_units_required > self.max_units {
            violations.push(format!(
                "affordable_units_required ({}) exceeds max_units ({})",
                self.affordable_units_required, self.max_units
            ));
        }
        if !(0.0..=100.0).contains(&self.lot_coverage_pct) {
            violations.push(format!(
                "lot_coverage_pct ({}) is outside 0-100",
                self.lot_coverage_pct
            ));
        }
        for (label, value) in [
            ("max_building_area_sqft", self.max_building_area_sqft),
            ("max_height_ft", self.max_height_ft),
        ] {
            if !value.is_finite() || value < 0.0 {
                violations.push(format!("{} ({}) must be a non-negative number", label, value));
            }
        }
        for (side, distance) in &self.setbacks {
            if !distance.is_finite() || *distance < 0.0 {
                violations.push(format!("{:?} setback ({}) must be non-negative", side, distance));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scenario_is_empty_and_valid() {
        let scenario = DevelopmentScenario::new("Base", ProgramKind::BaseZoning, "LAMC 12.08");
        assert_eq!(scenario.max_units, 0);
        assert!(scenario.setbacks.is_empty());
        assert!(scenario.invariant_violations().is_empty());
    }

    #[test]
    fn test_detects_affordable_units_over_total() {
        let mut scenario = DevelopmentScenario::new("X", ProgramKind::Sb35, "Gov. Code § 65913.4");
        scenario.max_units = 4;
        scenario.affordable_units_required = 5;
        let violations = scenario.invariant_violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("affordable_units_required"));
    }

    #[test]
    fn test_detects_coverage_and_negative_dimensions() {
        let mut scenario = DevelopmentScenario::new("X", ProgramKind::Adu, "Gov. Code § 66314");
        scenario.lot_coverage_pct = 120.0;
        scenario.max_height_ft = f64::NAN;
        scenario.setbacks.insert(SetbackSide::Rear, -4.0);
        assert_eq!(scenario.invariant_violations().len(), 3);
    }

    #[test]
    fn test_net_new_units_can_be_negative() {
        let mut scenario = DevelopmentScenario::new("X", ProgramKind::BaseZoning, "LAMC");
        scenario.max_units = 2;
        assert_eq!(scenario.net_new_units(5), -3);
        assert_eq!(scenario.net_new_units(0), 2);
    }

    #[test]
    fn test_setbacks_iterate_front_side_rear() {
        let mut scenario = DevelopmentScenario::new("X", ProgramKind::Sb9Duplex, "Gov. Code § 65852.21");
        scenario.setbacks.insert(SetbackSide::Rear, 4.0);
        scenario.setbacks.insert(SetbackSide::Front, 20.0);
        scenario.setbacks.insert(SetbackSide::Side, 4.0);
        let sides: Vec<_> = scenario.setbacks.keys().copied().collect();
        assert_eq!(sides, vec![SetbackSide::Front, SetbackSide::Side, SetbackSide::Rear]);
    }
}
