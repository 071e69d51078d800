//! Response envelope returned to the calling layer

use crate::eligibility::EligibilityResult;
use crate::program::ProgramKind;
use crate::scenario::DevelopmentScenario;
use serde::{Deserialize, Serialize};

/// What happened to one registered program during an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgramStatus {
    /// Turned off by configuration; never evaluated
    Disabled,
    Ineligible,
    /// Eligible, but the program has no standards for this parcel
    NotApplicable { reason: String },
    ScenarioBuilt { scenario_name: String },
    /// The program raised an error; other programs were unaffected
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramOutcome {
    pub program: ProgramKind,
    pub status: ProgramStatus,
    /// Absent only for disabled programs
    pub eligibility: Option<EligibilityResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub scenario_name: String,
    pub program: ProgramKind,
    pub max_units: u32,
    pub reason: String,
}

/// Complete answer for one parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub apn: String,
    /// Names of programs that produced at least one scenario
    pub applicable_programs: Vec<String>,
    pub scenarios: Vec<DevelopmentScenario>,
    pub program_outcomes: Vec<ProgramOutcome>,
    pub warnings: Vec<String>,
    pub recommendation: Option<Recommendation>,
}

impl AnalysisReport {
    pub fn scenario(&self, name: &str) -> Option<&DevelopmentScenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn outcome(&self, program: ProgramKind) -> Option<&ProgramOutcome> {
        self.program_outcomes.iter().find(|o| o.program == program)
    }

    /// Render a short plain-text summary
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Parcel Analysis: {}\n", self.apn));
        output.push_str(&"=".repeat(60));
        output.push_str("\n\n");

        if let Some(rec) = &self.recommendation {
            output.push_str(&format!(
                "Recommended: {} ({} units)\n    {}\n\n",
                rec.scenario_name, rec.max_units, rec.reason
            ));
        }

        output.push_str("Scenarios:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for scenario in &self.scenarios {
            output.push_str(&format!(
                "{:>4} units  {:>6.0} ft  {}  [{}]\n",
                scenario.max_units, scenario.max_height_ft, scenario.name, scenario.legal_basis
            ));
        }

        if !self.warnings.is_empty() {
            output.push_str("\nWarnings:\n");
            output.push_str(&"-".repeat(40));
            output.push('\n');
            for warning in &self.warnings {
                output.push_str(&format!("⚠ {}\n", warning));
            }
        }

        output
    }
}
