//! Scenario composer
//!
//! Runs every registered program against one parcel, post-processes the
//! resulting scenarios, and assembles the [`AnalysisReport`].

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::lookup::{
    AffordabilityLookup, IncomeLimitLookup, StaticAffordabilityTable, StaticIncomeLimits,
};
use crate::postprocess::apply_universal;
use crate::programs::{BuildOutcome, ProgramRule, ScenarioParams, REGISTERED_PROGRAMS};
use crate::recommend::RecommendationSelector;
use shared_types::{
    AnalysisReport, DevelopmentScenario, EligibilityResult, ParcelContext, ProgramKind,
    ProgramOutcome, ProgramStatus, UnknownFlagPolicy,
};
use tracing::{debug, info, instrument, warn};

/// Entry point for parcel analysis
///
/// Lookup collaborators are injected at construction and only read.
pub struct ScenarioComposer {
    config: EngineConfig,
    affordability: Box<dyn AffordabilityLookup>,
    income_limits: Box<dyn IncomeLimitLookup>,
}

impl ScenarioComposer {
    pub fn new(
        config: EngineConfig,
        affordability: Box<dyn AffordabilityLookup>,
        income_limits: Box<dyn IncomeLimitLookup>,
    ) -> Self {
        Self {
            config,
            affordability,
            income_limits,
        }
    }

    /// Composer backed by the static tables carried in the config
    pub fn from_config(config: EngineConfig) -> Self {
        let affordability = StaticAffordabilityTable::from_rows(&config.affordability);
        let income_limits = StaticIncomeLimits::from_rows(&config.income_limits);
        Self::new(config, Box::new(affordability), Box::new(income_limits))
    }

    /// Evaluate every registered program against the parcel
    #[instrument(skip(self, parcel), fields(apn = %parcel.apn))]
    pub fn compose(&self, parcel: &ParcelContext) -> AnalysisReport {
        let mut warnings: Vec<String> = parcel
            .validate()
            .into_iter()
            .map(|problem| EngineError::InvalidParcel(problem).to_string())
            .collect();
        for problem in &warnings {
            warn!(%problem, "parcel input problem");
        }

        let params = ScenarioParams {
            config: &self.config,
            affordability: self.affordability.as_ref(),
            income_limits: self.income_limits.as_ref(),
        };

        let mut scenarios = Vec::new();
        let mut program_outcomes = Vec::with_capacity(REGISTERED_PROGRAMS.len());

        for program in REGISTERED_PROGRAMS {
            if !self.config.is_enabled(program) {
                debug!(program = %program.key(), "disabled by config");
                program_outcomes.push(ProgramOutcome {
                    program,
                    status: ProgramStatus::Disabled,
                    eligibility: None,
                });
                continue;
            }

            let eligibility = program.is_eligible(parcel, &self.config);
            surface_heuristics(&eligibility, &mut warnings);

            let status = if !eligibility.eligible {
                debug!(
                    program = %program.key(),
                    exclusions = eligibility.exclusions.len(),
                    "ineligible"
                );
                ProgramStatus::Ineligible
            } else {
                self.run_build(program, parcel, &params, &mut scenarios, &mut warnings)
            };

            program_outcomes.push(ProgramOutcome {
                program,
                status,
                eligibility: Some(eligibility),
            });
        }

        let mut applicable_programs: Vec<String> = Vec::new();
        for scenario in &scenarios {
            let name = scenario.program.name();
            if !applicable_programs.contains(&name) {
                applicable_programs.push(name);
            }
        }

        let recommendation = RecommendationSelector::select(&scenarios);
        warnings.extend(RecommendationSelector::interaction_warnings(parcel, &scenarios));

        info!(
            scenarios = scenarios.len(),
            warnings = warnings.len(),
            recommended = recommendation.as_ref().map(|r| r.scenario_name.as_str()).unwrap_or("none"),
            "analysis complete"
        );

        AnalysisReport {
            apn: parcel.apn.clone(),
            applicable_programs,
            scenarios,
            program_outcomes,
            warnings,
            recommendation,
        }
    }

    fn run_build(
        &self,
        program: ProgramKind,
        parcel: &ParcelContext,
        params: &ScenarioParams<'_>,
        scenarios: &mut Vec<DevelopmentScenario>,
        warnings: &mut Vec<String>,
    ) -> ProgramStatus {
        match program.build_scenario(parcel, params) {
            Ok(BuildOutcome::Built {
                scenario,
                warnings: build_warnings,
            }) => {
                warnings.extend(build_warnings);
                let scenario = apply_universal(scenario, parcel);
                match check_invariants(&scenario) {
                    Ok(()) => {
                        let status = ProgramStatus::ScenarioBuilt {
                            scenario_name: scenario.name.clone(),
                        };
                        debug!(program = %program.key(), units = scenario.max_units, "scenario built");
                        scenarios.push(scenario);
                        status
                    }
                    Err(e) => {
                        warn!(program = %program.key(), error = %e, "scenario dropped");
                        warnings.push(e.to_string());
                        ProgramStatus::Failed { error: e.to_string() }
                    }
                }
            }
            Ok(BuildOutcome::NotApplicable { reason }) => {
                debug!(program = %program.key(), %reason, "not applicable");
                if program == ProgramKind::BaseZoning {
                    warnings.push(format!("{}: {}", program.name(), reason));
                }
                ProgramStatus::NotApplicable { reason }
            }
            Err(e) => {
                warn!(program = %program.key(), error = %e, "program failed");
                warnings.push(format!("{}: {}", program.name(), e));
                ProgramStatus::Failed { error: e.to_string() }
            }
        }
    }
}

/// First broken invariant, as an engine error
fn check_invariants(scenario: &DevelopmentScenario) -> Result<(), EngineError> {
    match scenario.invariant_violations().into_iter().next() {
        Some(reason) => Err(EngineError::InvariantViolation {
            scenario: scenario.name.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Heuristic guesses go on the response so they are verified by hand
fn surface_heuristics(eligibility: &EligibilityResult, warnings: &mut Vec<String>) {
    for warning in &eligibility.warnings {
        if warning.policy != Some(UnknownFlagPolicy::Heuristic) {
            continue;
        }
        let message = format!("{}: {}", eligibility.program.name(), warning.message);
        if !warnings.contains(&message) {
            warnings.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{LookupOutcome, NoLookup};
    use crate::test_support::parcel;
    use pretty_assertions::assert_eq;

    struct Outage;

    impl AffordabilityLookup for Outage {
        fn sb35_affordability_pct(&self, _jurisdiction: &str, _county: &str) -> LookupOutcome<f64> {
            LookupOutcome::Unavailable("connection refused".to_string())
        }
    }

    fn composer() -> ScenarioComposer {
        ScenarioComposer::from_config(EngineConfig::default())
    }

    fn status(report: &AnalysisReport, program: ProgramKind) -> ProgramStatus {
        report.outcome(program).map(|o| o.status.clone()).unwrap()
    }

    #[test]
    fn test_single_family_lot_yields_base_sb9_and_adu() {
        let report = composer().compose(&parcel("R1-1", 6_000.0));

        let programs: Vec<ProgramKind> = report.scenarios.iter().map(|s| s.program).collect();
        assert_eq!(
            programs,
            vec![
                ProgramKind::BaseZoning,
                ProgramKind::Sb9Duplex,
                ProgramKind::Sb9LotSplit,
                ProgramKind::Adu,
            ]
        );
        let rec = report.recommendation.as_ref().unwrap();
        assert_eq!(rec.program, ProgramKind::Sb9LotSplit);
        assert_eq!(rec.max_units, 4);
        assert_eq!(status(&report, ProgramKind::Ab2011), ProgramStatus::Ineligible);
        assert!(matches!(
            status(&report, ProgramKind::Sb35),
            ProgramStatus::NotApplicable { .. }
        ));
    }

    #[test]
    fn test_every_scenario_is_post_processed() {
        let mut p = parcel("R1-1", 6_000.0);
        p.near_major_transit = true;
        let report = composer().compose(&p);
        for scenario in &report.scenarios {
            assert_eq!(scenario.parking_required, 0, "{}", scenario.name);
            assert!(scenario.notes[0].starts_with("Existing conditions:"));
        }
    }

    #[test]
    fn test_disabled_program_is_not_ineligible() {
        let mut config = EngineConfig::default();
        config.programs.sb9 = false;
        let report = ScenarioComposer::from_config(config).compose(&parcel("R1-1", 6_000.0));

        for program in [ProgramKind::Sb9Duplex, ProgramKind::Sb9LotSplit] {
            let outcome = report.outcome(program).unwrap();
            assert_eq!(outcome.status, ProgramStatus::Disabled);
            assert!(outcome.eligibility.is_none());
        }
        assert!(!report.scenarios.iter().any(|s| s.program.is_sb9()));
        assert_eq!(report.recommendation.unwrap().program, ProgramKind::Adu);
    }

    #[test]
    fn test_unrecognized_zone_keeps_base_zoning() {
        let report = composer().compose(&parcel("XYZ-9", 6_000.0));
        assert_eq!(report.scenarios.len(), 1);
        assert_eq!(report.scenarios[0].program, ProgramKind::BaseZoning);
        assert!(report.warnings.iter().any(|w| w.contains("XYZ-9")));
    }

    #[test]
    fn test_unusable_lot_area_keeps_base_zoning() {
        for lot in [0.0, -50.0, f64::NAN] {
            let mut p = parcel("R1-1", lot);
            p.existing_units = 1;
            let report = composer().compose(&p);

            assert!(matches!(
                status(&report, ProgramKind::BaseZoning),
                ProgramStatus::ScenarioBuilt { .. }
            ));
            assert!(report.scenarios.iter().any(|s| s.program == ProgramKind::BaseZoning));
            assert!(report.recommendation.is_some());
            assert!(report.warnings.iter().any(|w| w.contains("lot_area_sqft")));
        }
    }

    #[test]
    fn test_invalid_input_becomes_warning() {
        let mut p = parcel("R1-1", 6_000.0);
        p.affordability_pct = Some(140.0);
        let report = composer().compose(&p);
        assert!(report.warnings.iter().any(|w| w.starts_with("Invalid parcel input")));
        assert!(!report.scenarios.is_empty());
    }

    #[test]
    fn test_lookup_outage_does_not_block_other_programs() {
        let composer = ScenarioComposer::new(EngineConfig::default(), Box::new(Outage), Box::new(NoLookup));
        let report = composer.compose(&parcel("R3-1", 10_000.0));

        assert!(matches!(
            status(&report, ProgramKind::Sb35),
            ProgramStatus::ScenarioBuilt { .. }
        ));
        assert!(report.warnings.iter().any(|w| w.contains("connection refused")));
        assert!(report.scenarios.iter().any(|s| s.program == ProgramKind::BaseZoning));
    }

    #[test]
    fn test_applicable_programs_are_unique_names() {
        let report = composer().compose(&parcel("R1-1", 6_000.0));
        assert_eq!(
            report.applicable_programs,
            vec![
                "Base Zoning".to_string(),
                "SB 9 Two-Unit Development".to_string(),
                "SB 9 Urban Lot Split".to_string(),
                "ADU / JADU".to_string(),
            ]
        );
    }

    #[test]
    fn test_composition_is_deterministic() {
        let p = parcel("C2-1", 20_000.0);
        assert_eq!(composer().compose(&p), composer().compose(&p));
    }
}
