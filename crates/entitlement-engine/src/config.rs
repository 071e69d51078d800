//! Engine configuration
//!
//! TOML-based configuration for program feature flags, conservative
//! defaults, unknown-flag heuristics, and optional static lookup tables.
//! Every section has defaults, so an empty file is a valid configuration.

use crate::error::EngineError;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use shared_types::{ParcelContext, ProgramKind};
use std::fs;
use std::path::Path;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which programs the composer runs
    pub programs: ProgramToggles,
    pub sb35: Sb35Settings,
    pub labor: LaborSettings,
    /// Heuristic used when a parcel's rent-control status is unreported
    pub rent_control: RentControlSettings,
    /// Static SB 35 affordability rows keyed by (jurisdiction, county)
    pub affordability: Vec<AffordabilityRow>,
    /// Static income limit rows keyed by (county, AMI %, household size)
    pub income_limits: Vec<IncomeLimitRow>,
}

/// Feature flags per program family; base zoning always runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramToggles {
    pub sb9: bool,
    pub sb35: bool,
    pub ab2011: bool,
    pub adu: bool,
    pub density_bonus: bool,
    pub plan_overlay: bool,
}

impl Default for ProgramToggles {
    fn default() -> Self {
        Self {
            sb9: true,
            sb35: true,
            ab2011: true,
            adu: true,
            density_bonus: true,
            plan_overlay: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sb35Settings {
    /// Used when the jurisdiction lookup has no row; 50% is the stricter of
    /// the two statutory tiers
    pub default_affordability_pct: f64,
}

impl Default for Sb35Settings {
    fn default() -> Self {
        Self {
            default_affordability_pct: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaborSettings {
    /// Projected unit count at which a skilled and trained workforce is required
    pub skilled_workforce_unit_threshold: u32,
}

impl Default for LaborSettings {
    fn default() -> Self {
        Self {
            skilled_workforce_unit_threshold: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentControlSettings {
    /// Jurisdictions with a local rent stabilization ordinance
    pub jurisdictions: Vec<String>,
    /// Buildings built in or before this year are presumed covered
    pub year_built_cutoff: u32,
}

impl Default for RentControlSettings {
    fn default() -> Self {
        Self {
            jurisdictions: [
                "Los Angeles",
                "San Francisco",
                "Oakland",
                "Berkeley",
                "Santa Monica",
                "West Hollywood",
                "San Jose",
                "Beverly Hills",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            year_built_cutoff: 1978,
        }
    }
}

impl RentControlSettings {
    /// Heuristic: multi-unit, pre-cutoff building in a rent-control city
    pub fn likely_rent_controlled(&self, parcel: &ParcelContext) -> bool {
        let listed = self
            .jurisdictions
            .iter()
            .any(|j| j.eq_ignore_ascii_case(parcel.jurisdiction.trim()));
        let old_enough = parcel
            .year_built
            .map(|year| year <= self.year_built_cutoff)
            .unwrap_or(false);

        listed && old_enough && parcel.existing_units >= 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityRow {
    pub jurisdiction: String,
    pub county: String,
    pub affordability_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeLimitRow {
    pub county: String,
    pub ami_pct: u32,
    pub household_size: u8,
    /// Annual household income ceiling in dollars
    pub annual_income: f64,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or a value is out of range.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    ///
    /// ```
    /// use entitlement_engine::config::EngineConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = EngineConfig::from_str(r#"
    ///     [programs]
    ///     ab2011 = false
    ///
    ///     [sb35]
    ///     default_affordability_pct = 50.0
    /// "#)?;
    /// assert!(!config.programs.ab2011);
    /// assert!(config.programs.sb9);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(s).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no statute could produce
    pub fn validate(&self) -> anyhow::Result<()> {
        let pct = self.sb35.default_affordability_pct;
        if !(0.0..=100.0).contains(&pct) {
            bail!("sb35.default_affordability_pct must be between 0 and 100 (found {})", pct);
        }
        if self.labor.skilled_workforce_unit_threshold == 0 {
            bail!("labor.skilled_workforce_unit_threshold must be at least 1");
        }
        for row in &self.affordability {
            if !(0.0..=100.0).contains(&row.affordability_pct) {
                bail!(
                    "affordability row for {}/{} has an out-of-range percentage ({})",
                    row.jurisdiction,
                    row.county,
                    row.affordability_pct
                );
            }
        }
        for row in &self.income_limits {
            if row.household_size == 0 || !row.annual_income.is_finite() || row.annual_income <= 0.0 {
                bail!(
                    "income limit row for {} ({}% AMI) has an invalid household size or income",
                    row.county,
                    row.ami_pct
                );
            }
        }
        Ok(())
    }

    /// Whether the composer should run a program
    pub fn is_enabled(&self, program: ProgramKind) -> bool {
        match program {
            ProgramKind::BaseZoning => true,
            ProgramKind::Sb9Duplex | ProgramKind::Sb9LotSplit => self.programs.sb9,
            ProgramKind::Sb35 => self.programs.sb35,
            ProgramKind::Ab2011 => self.programs.ab2011,
            ProgramKind::Adu => self.programs.adu,
            ProgramKind::DensityBonus => self.programs.density_bonus,
            ProgramKind::PlanOverlay { .. } => self.programs.plan_overlay,
        }
    }

    /// Turn off every program family not named in `keys`
    ///
    /// Keys use the `ProgramKind` key format ("sb35", "sb9_lot_split", ...).
    /// Naming either SB 9 track enables the SB 9 family.
    pub fn restrict_to(&mut self, keys: &[String]) -> Result<(), EngineError> {
        let kinds = keys
            .iter()
            .map(|k| k.parse::<ProgramKind>())
            .collect::<Result<Vec<_>, _>>()?;

        self.programs = ProgramToggles {
            sb9: kinds.iter().any(|k| k.is_sb9()),
            sb35: kinds.contains(&ProgramKind::Sb35),
            ab2011: kinds.contains(&ProgramKind::Ab2011),
            adu: kinds.contains(&ProgramKind::Adu),
            density_bonus: kinds.contains(&ProgramKind::DensityBonus),
            plan_overlay: kinds
                .iter()
                .any(|k| matches!(k, ProgramKind::PlanOverlay { .. })),
        };
        Ok(())
    }
}
