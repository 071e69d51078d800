//! Numeric development standards
//!
//! Two layers feed every scenario:
//! 1. Local - the zone table in [`base`] plus parcel-level overrides
//! 2. State - statutory floors that local values may exceed but never undercut
//!
//! [`resolve`] is the single precedence rule between them. District plan
//! overlays carry their own exact-match tables in [`tiers`].

pub mod base;
pub mod tiers;

pub use base::{base_standards, BaseStandards, Density};
pub use tiers::{
    classify_district, tier_standards, ClassificationSource, DistrictClassification,
    PlanDistrict, SizeClass, TierStandards,
};

use serde::{Deserialize, Serialize};

/// Typical story height used to convert height limits into story counts
pub const STORY_HEIGHT_FT: f64 = 11.0;

/// Resolve a local standard against a state floor
///
/// The result is `max(local, state_floor)`. A missing, non-positive, or
/// non-finite local value defers to the state floor.
pub fn resolve(local: Option<f64>, state_floor: f64) -> f64 {
    match local {
        Some(value) if value.is_finite() && value > 0.0 => value.max(state_floor),
        _ => state_floor,
    }
}

/// Which layer set the resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Governing {
    Local,
    State,
}

/// A resolved standard with both inputs kept for the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardsFloor {
    pub state_minimum: f64,
    pub local_value: Option<f64>,
    pub resolved: f64,
}

impl StandardsFloor {
    pub fn new(state_minimum: f64, local_value: Option<f64>) -> Self {
        Self {
            state_minimum,
            local_value,
            resolved: resolve(local_value, state_minimum),
        }
    }

    /// Ties go to the state floor, since the statute guarantees that value
    pub fn governed_by(&self) -> Governing {
        if self.resolved > self.state_minimum {
            Governing::Local
        } else {
            Governing::State
        }
    }

    /// One-line explanation for scenario notes, e.g.
    /// "Height: 75 ft (local standard exceeds 35 ft state floor)"
    pub fn describe(&self, label: &str, unit: &str) -> String {
        match (self.governed_by(), self.local_value) {
            (Governing::Local, _) => format!(
                "{}: {} {} (local standard exceeds {} {} state floor)",
                label,
                trim_number(self.resolved),
                unit,
                trim_number(self.state_minimum),
                unit
            ),
            (Governing::State, Some(local)) if local.is_finite() && local > 0.0 => format!(
                "{}: {} {} (state floor overrides local {} {})",
                label,
                trim_number(self.resolved),
                unit,
                trim_number(local),
                unit
            ),
            (Governing::State, _) => format!(
                "{}: {} {} (state floor; no valid local standard)",
                label,
                trim_number(self.resolved),
                unit
            ),
        }
    }
}

/// Convert a height limit into whole stories, never fewer than one
pub fn stories_for_height(height_ft: f64) -> u32 {
    ((height_ft / STORY_HEIGHT_FT).floor() as u32).max(1)
}

/// Format a number without a trailing ".0" for whole values
pub(crate) fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
