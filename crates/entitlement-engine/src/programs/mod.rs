//! Program rules
//!
//! Each program exposes the same two pure operations through
//! [`ProgramRule`]: gate the parcel, then build a scenario. The set of
//! programs is closed; [`REGISTERED_PROGRAMS`] fixes both membership and the
//! order the composer runs them in.

pub mod ab2011;
pub mod adu;
pub mod base_zoning;
pub mod density_bonus;
pub mod overlay;
pub mod sb35;
pub mod sb9;

use crate::config::EngineConfig;
use crate::eligibility::{EligibilityCriteria, EligibilityEvaluator};
use crate::error::Result;
use crate::lookup::{AffordabilityLookup, IncomeLimitLookup};
use crate::zoning::{ZoneClass, ZoneCode};
use shared_types::{DevelopmentScenario, EligibilityResult, ParcelContext, ProgramKind};

/// Typical gross floor area per dwelling, used to turn FAR into unit counts
pub const AVERAGE_UNIT_SQFT: f64 = 850.0;

/// Every program the composer knows about, in evaluation order
pub const REGISTERED_PROGRAMS: [ProgramKind; 10] = [
    ProgramKind::BaseZoning,
    ProgramKind::Sb9Duplex,
    ProgramKind::Sb9LotSplit,
    ProgramKind::Sb35,
    ProgramKind::Ab2011,
    ProgramKind::Adu,
    ProgramKind::DensityBonus,
    ProgramKind::PlanOverlay { tier: 1 },
    ProgramKind::PlanOverlay { tier: 2 },
    ProgramKind::PlanOverlay { tier: 3 },
];

/// Collaborators and settings available while building scenarios
pub struct ScenarioParams<'a> {
    pub config: &'a EngineConfig,
    pub affordability: &'a dyn AffordabilityLookup,
    pub income_limits: &'a dyn IncomeLimitLookup,
}

/// Result of asking an eligible program for its scenario
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Built {
        scenario: DevelopmentScenario,
        /// Collaborator problems to surface on the response
        warnings: Vec<String>,
    },
    /// Eligible, but the program has nothing to offer this parcel
    NotApplicable { reason: String },
}

impl BuildOutcome {
    pub fn built(scenario: DevelopmentScenario) -> Self {
        BuildOutcome::Built {
            scenario,
            warnings: Vec::new(),
        }
    }

    pub fn not_applicable(reason: impl Into<String>) -> Self {
        BuildOutcome::NotApplicable {
            reason: reason.into(),
        }
    }
}

/// The eligibility/build pair every program carries
pub trait ProgramRule {
    /// Declarative gate; `None` means the program has no gate
    fn criteria(&self) -> Option<EligibilityCriteria>;

    fn is_eligible(&self, parcel: &ParcelContext, config: &EngineConfig) -> EligibilityResult;

    /// Only called for eligible parcels
    fn build_scenario(&self, parcel: &ParcelContext, params: &ScenarioParams<'_>) -> Result<BuildOutcome>;
}

impl ProgramRule for ProgramKind {
    fn criteria(&self) -> Option<EligibilityCriteria> {
        match *self {
            ProgramKind::BaseZoning => None,
            ProgramKind::Sb9Duplex => Some(sb9::duplex_criteria()),
            ProgramKind::Sb9LotSplit => Some(sb9::lot_split_criteria()),
            ProgramKind::Sb35 => Some(sb35::criteria()),
            ProgramKind::Ab2011 => Some(ab2011::criteria()),
            ProgramKind::Adu => Some(adu::criteria()),
            ProgramKind::DensityBonus => Some(density_bonus::criteria()),
            ProgramKind::PlanOverlay { tier } => Some(overlay::criteria(tier)),
        }
    }

    fn is_eligible(&self, parcel: &ParcelContext, config: &EngineConfig) -> EligibilityResult {
        if let ProgramKind::PlanOverlay { tier } = *self {
            return overlay::is_eligible(tier, parcel, config);
        }
        match self.criteria() {
            Some(criteria) => EligibilityEvaluator::new(criteria, config).evaluate(parcel),
            None => {
                let mut result = EligibilityResult::new(*self);
                result.pass("Base zoning applies to every parcel");
                result
            }
        }
    }

    fn build_scenario(&self, parcel: &ParcelContext, params: &ScenarioParams<'_>) -> Result<BuildOutcome> {
        match *self {
            ProgramKind::BaseZoning => base_zoning::build(parcel),
            ProgramKind::Sb9Duplex => sb9::build_duplex(parcel),
            ProgramKind::Sb9LotSplit => sb9::build_lot_split(parcel),
            ProgramKind::Sb35 => sb35::build(parcel, params),
            ProgramKind::Ab2011 => ab2011::build(parcel),
            ProgramKind::Adu => adu::build(parcel),
            ProgramKind::DensityBonus => density_bonus::build(parcel, params),
            ProgramKind::PlanOverlay { tier } => overlay::build(tier, parcel),
        }
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Zone class of the parcel, if the code parses
pub(crate) fn zone_class(parcel: &ParcelContext) -> Option<ZoneClass> {
    ZoneCode::parse(&parcel.zoning_code).map(|z| z.class)
}

/// Whole parking spaces for a unit count and ratio
pub(crate) fn parking_spaces(units: u32, ratio: f64) -> u32 {
    if ratio <= 0.0 || !ratio.is_finite() {
        return 0;
    }
    (f64::from(units) * ratio).ceil() as u32
}

/// Affordable units for a percentage, rounded up and capped at the total
pub(crate) fn affordable_units(units: u32, pct: f64) -> u32 {
    if pct <= 0.0 || !pct.is_finite() {
        return 0;
    }
    ((f64::from(units) * pct / 100.0).ceil() as u32).min(units)
}
