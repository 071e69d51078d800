//! Parcel entitlement engine
//!
//! Determines which California housing programs a parcel qualifies for and
//! what each one allows: base zoning, SB 9, SB 35, AB 2011, ADU/JADU, the
//! State Density Bonus, and district plan overlay tiers.
//!
//! ```no_run
//! use entitlement_engine::{EngineConfig, ScenarioComposer};
//! # fn run(parcel: shared_types::ParcelContext) {
//! let composer = ScenarioComposer::from_config(EngineConfig::default());
//! let report = composer.compose(&parcel);
//! println!("{}", report.to_text());
//! # }
//! ```

pub mod composer;
pub mod config;
pub mod density_bonus;
pub mod eligibility;
pub mod error;
pub mod lookup;
pub mod postprocess;
pub mod programs;
pub mod recommend;
pub mod standards;
pub mod zoning;

#[cfg(test)]
mod test_support;

pub use composer::ScenarioComposer;
pub use config::EngineConfig;
pub use density_bonus::{BonusOutcome, DensityBonusCalculator};
pub use eligibility::{EligibilityCriteria, EligibilityEvaluator};
pub use error::{EngineError, Result};
pub use lookup::{
    AffordabilityLookup, IncomeLimitLookup, LookupOutcome, NoLookup, StaticAffordabilityTable,
    StaticIncomeLimits,
};
pub use programs::{BuildOutcome, ProgramRule, ScenarioParams, REGISTERED_PROGRAMS};
pub use recommend::RecommendationSelector;
pub use standards::{base_standards, resolve, BaseStandards, StandardsFloor};
