//! Scenario ranking and cross-program interaction warnings

use crate::standards::classify_district;
use shared_types::{DevelopmentScenario, ParcelContext, ProgramKind, Recommendation};

pub struct RecommendationSelector;

impl RecommendationSelector {
    /// The scenario with the most units; ties go to the first one seen
    pub fn select(scenarios: &[DevelopmentScenario]) -> Option<Recommendation> {
        let best = scenarios.iter().fold(None::<&DevelopmentScenario>, |best, s| match best {
            Some(b) if b.max_units >= s.max_units => Some(b),
            _ => Some(s),
        })?;

        let base_units = scenarios
            .iter()
            .find(|s| s.program == ProgramKind::BaseZoning)
            .map(|s| s.max_units);

        let reason = match base_units {
            Some(base) if best.program == ProgramKind::BaseZoning => format!(
                "No program exceeds base zoning's {} unit(s) across {} scenario(s)",
                base,
                scenarios.len()
            ),
            Some(base) => format!(
                "Highest unit count ({}) across {} scenario(s), {} more than base zoning under {}",
                best.max_units,
                scenarios.len(),
                best.max_units.saturating_sub(base),
                best.legal_basis
            ),
            None => format!(
                "Highest unit count ({}) across {} scenario(s) under {}",
                best.max_units,
                scenarios.len(),
                best.legal_basis
            ),
        };

        Some(Recommendation {
            scenario_name: best.name.clone(),
            program: best.program,
            max_units: best.max_units,
            reason,
        })
    }

    /// Warnings about how the generated scenarios interact
    pub fn interaction_warnings(parcel: &ParcelContext, scenarios: &[DevelopmentScenario]) -> Vec<String> {
        let mut warnings = Vec::new();
        let has = |predicate: fn(&ProgramKind) -> bool| scenarios.iter().any(|s| predicate(&s.program));
        let state_law: Vec<&str> = scenarios
            .iter()
            .filter(|s| s.program.is_state_law())
            .map(|s| s.name.as_str())
            .collect();

        let classification = classify_district(parcel);
        if classification.in_plan_area() && !state_law.is_empty() {
            warnings.push(format!(
                "Parcel is inside a community plan overlay; state-law scenarios ({}) preempt \
                 conflicting overlay standards, but objective overlay design standards still apply",
                state_law.join(", ")
            ));
        }
        if classification.in_plan_area() && classification.district().is_none() {
            warnings.push(
                "Zoning prefix and overlay code name different plan districts; \
                 overlay tier scenarios were not generated"
                    .to_string(),
            );
        }

        let overlay = has(|k| matches!(k, ProgramKind::PlanOverlay { .. }));
        if overlay && has(|k| *k == ProgramKind::DensityBonus) {
            warnings.push(
                "Density bonus is computed from base zoning; stacking it on overlay tier standards \
                 requires confirming the tier counts as base density"
                    .to_string(),
            );
        }
        if has(|k| *k == ProgramKind::Sb35) && has(|k| *k == ProgramKind::Ab2011) {
            warnings.push(
                "SB 35 and AB 2011 both offer ministerial approval; one application can use only one path"
                    .to_string(),
            );
        }
        if has(|k| *k == ProgramKind::Sb9LotSplit) && has(|k| *k == ProgramKind::Adu) {
            warnings.push(
                "An SB 9 lot split caps each resulting lot at two units including ADUs and JADUs; \
                 the ADU scenario cannot be combined with the split"
                    .to_string(),
            );
        }
        if parcel.in_coastal_zone && !state_law.is_empty() {
            warnings.push(
                "Parcel is in the coastal zone; a coastal development permit is still required \
                 for state-law scenarios"
                    .to_string(),
            );
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parcel;

    fn scenario(name: &str, program: ProgramKind, units: u32) -> DevelopmentScenario {
        let mut s = DevelopmentScenario::new(name, program, "test basis");
        s.max_units = units;
        s
    }

    #[test]
    fn test_selects_global_maximum() {
        let scenarios = vec![
            scenario("Base Zoning", ProgramKind::BaseZoning, 1),
            scenario("SB 9 Duplex", ProgramKind::Sb9Duplex, 2),
            scenario("SB 9 Lot Split", ProgramKind::Sb9LotSplit, 4),
            scenario("ADU + JADU", ProgramKind::Adu, 3),
        ];
        let rec = RecommendationSelector::select(&scenarios).unwrap();
        assert_eq!(rec.scenario_name, "SB 9 Lot Split");
        assert_eq!(rec.max_units, 4);
        assert!(rec.reason.contains("3 more than base zoning"));
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let scenarios = vec![
            scenario("Base Zoning", ProgramKind::BaseZoning, 4),
            scenario("SB 9 Lot Split", ProgramKind::Sb9LotSplit, 4),
        ];
        let rec = RecommendationSelector::select(&scenarios).unwrap();
        assert_eq!(rec.program, ProgramKind::BaseZoning);
        assert!(rec.reason.starts_with("No program exceeds base zoning"));
    }

    #[test]
    fn test_empty_pool() {
        assert!(RecommendationSelector::select(&[]).is_none());
    }

    #[test]
    fn test_interaction_warnings() {
        let mut p = parcel("C2-1", 10_000.0);
        p.in_coastal_zone = true;
        p.overlay_codes = vec!["CPIO".to_string()];
        let scenarios = vec![
            scenario("Base Zoning", ProgramKind::BaseZoning, 25),
            scenario("SB 35", ProgramKind::Sb35, 25),
            scenario("AB 2011", ProgramKind::Ab2011, 40),
            scenario("Tier 1", ProgramKind::PlanOverlay { tier: 1 }, 30),
            scenario("Bonus", ProgramKind::DensityBonus, 30),
        ];

        let warnings = RecommendationSelector::interaction_warnings(&p, &scenarios);
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].contains("SB 35, AB 2011, Bonus"));
        assert!(warnings.iter().any(|w| w.contains("coastal development permit")));
    }

    #[test]
    fn test_no_warnings_for_base_only() {
        let warnings = RecommendationSelector::interaction_warnings(
            &parcel("R1-1", 6_000.0),
            &[scenario("Base Zoning", ProgramKind::BaseZoning, 1)],
        );
        assert!(warnings.is_empty());
    }
}
