//! Closed set of housing programs the engine knows how to evaluate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One housing-law program
///
/// Every scenario carries the kind that built it, so cross-program logic
/// matches on this tag instead of inspecting legal-basis text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgramKind {
    /// Local zoning with no state overlay
    BaseZoning,
    /// SB 9 two-unit development on a single-family lot
    Sb9Duplex,
    /// SB 9 urban lot split with two units on each resulting lot
    Sb9LotSplit,
    /// SB 35 streamlined ministerial approval
    Sb35,
    /// AB 2011 residential development on commercial corridors
    Ab2011,
    /// Accessory and junior accessory dwelling units
    Adu,
    /// State Density Bonus Law
    DensityBonus,
    /// District plan overlay, one program per tier
    PlanOverlay { tier: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown program: {0}")]
pub struct UnknownProgram(pub String);

impl ProgramKind {
    /// Human-readable program name
    pub fn name(&self) -> String {
        match self {
            ProgramKind::BaseZoning => "Base Zoning".to_string(),
            ProgramKind::Sb9Duplex => "SB 9 Two-Unit Development".to_string(),
            ProgramKind::Sb9LotSplit => "SB 9 Urban Lot Split".to_string(),
            ProgramKind::Sb35 => "SB 35 Streamlined Ministerial Approval".to_string(),
            ProgramKind::Ab2011 => "AB 2011 Commercial Corridor Housing".to_string(),
            ProgramKind::Adu => "ADU / JADU".to_string(),
            ProgramKind::DensityBonus => "State Density Bonus".to_string(),
            ProgramKind::PlanOverlay { tier } => format!("Plan Overlay Tier {}", tier),
        }
    }

    /// Stable machine key, also accepted by `FromStr`
    pub fn key(&self) -> String {
        match self {
            ProgramKind::BaseZoning => "base_zoning".to_string(),
            ProgramKind::Sb9Duplex => "sb9_duplex".to_string(),
            ProgramKind::Sb9LotSplit => "sb9_lot_split".to_string(),
            ProgramKind::Sb35 => "sb35".to_string(),
            ProgramKind::Ab2011 => "ab2011".to_string(),
            ProgramKind::Adu => "adu".to_string(),
            ProgramKind::DensityBonus => "density_bonus".to_string(),
            ProgramKind::PlanOverlay { tier } => format!("plan_overlay_tier_{}", tier),
        }
    }

    pub fn is_sb9(&self) -> bool {
        matches!(self, ProgramKind::Sb9Duplex | ProgramKind::Sb9LotSplit)
    }

    /// State statutes that override conflicting local standards
    pub fn is_state_law(&self) -> bool {
        !matches!(
            self,
            ProgramKind::BaseZoning | ProgramKind::PlanOverlay { .. }
        )
    }
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ProgramKind {
    type Err = UnknownProgram;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "base_zoning" | "base" => Ok(ProgramKind::BaseZoning),
            "sb9_duplex" => Ok(ProgramKind::Sb9Duplex),
            "sb9_lot_split" => Ok(ProgramKind::Sb9LotSplit),
            "sb35" => Ok(ProgramKind::Sb35),
            "ab2011" => Ok(ProgramKind::Ab2011),
            "adu" => Ok(ProgramKind::Adu),
            "density_bonus" => Ok(ProgramKind::DensityBonus),
            other => other
                .strip_prefix("plan_overlay_tier_")
                .and_then(|tier| tier.parse::<u8>().ok())
                .filter(|tier| *tier > 0)
                .map(|tier| ProgramKind::PlanOverlay { tier })
                .ok_or_else(|| UnknownProgram(s.to_string())),
        }
    }
}
