//! Lookup collaborators
//!
//! Jurisdiction-dependent numbers (SB 35 affordability tier, county income
//! limits) live outside the engine. Callers resolve them ahead of time and
//! hand the engine a side-effect-free lookup. A lookup may answer
//! "not found" or report an outage; neither aborts evaluation.

use crate::config::{AffordabilityRow, IncomeLimitRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answer from a lookup collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum LookupOutcome<T> {
    Found(T),
    NotFound,
    /// The collaborator could not answer at all
    Unavailable(String),
}

/// SB 35 affordability share by jurisdiction
///
/// Jurisdictions that met their above-moderate RHNA progress owe 50%;
/// those that did not owe 10%.
pub trait AffordabilityLookup {
    fn sb35_affordability_pct(&self, jurisdiction: &str, county: &str) -> LookupOutcome<f64>;
}

/// Annual income ceiling by county, AMI percentage, and household size
pub trait IncomeLimitLookup {
    fn income_limit(&self, county: &str, ami_pct: u32, household_size: u8) -> LookupOutcome<f64>;
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

/// In-memory affordability table
#[derive(Debug, Clone, Default)]
pub struct StaticAffordabilityTable {
    rows: BTreeMap<(String, String), f64>,
}

impl StaticAffordabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: &[AffordabilityRow]) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert(&row.jurisdiction, &row.county, row.affordability_pct);
        }
        table
    }

    pub fn insert(&mut self, jurisdiction: &str, county: &str, pct: f64) {
        self.rows.insert((normalize(jurisdiction), normalize(county)), pct);
    }
}

impl AffordabilityLookup for StaticAffordabilityTable {
    fn sb35_affordability_pct(&self, jurisdiction: &str, county: &str) -> LookupOutcome<f64> {
        match self.rows.get(&(normalize(jurisdiction), normalize(county))) {
            Some(pct) => LookupOutcome::Found(*pct),
            None => LookupOutcome::NotFound,
        }
    }
}

/// In-memory income limit table
#[derive(Debug, Clone, Default)]
pub struct StaticIncomeLimits {
    rows: BTreeMap<(String, u32, u8), f64>,
}

impl StaticIncomeLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: &[IncomeLimitRow]) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert(&row.county, row.ami_pct, row.household_size, row.annual_income);
        }
        table
    }

    pub fn insert(&mut self, county: &str, ami_pct: u32, household_size: u8, annual_income: f64) {
        self.rows
            .insert((normalize(county), ami_pct, household_size), annual_income);
    }
}

impl IncomeLimitLookup for StaticIncomeLimits {
    fn income_limit(&self, county: &str, ami_pct: u32, household_size: u8) -> LookupOutcome<f64> {
        match self.rows.get(&(normalize(county), ami_pct, household_size)) {
            Some(limit) => LookupOutcome::Found(*limit),
            None => LookupOutcome::NotFound,
        }
    }
}

/// A collaborator with no data; every lookup is "not found"
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl AffordabilityLookup for NoLookup {
    fn sb35_affordability_pct(&self, _jurisdiction: &str, _county: &str) -> LookupOutcome<f64> {
        LookupOutcome::NotFound
    }
}

impl IncomeLimitLookup for NoLookup {
    fn income_limit(&self, _county: &str, _ami_pct: u32, _household_size: u8) -> LookupOutcome<f64> {
        LookupOutcome::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affordability_keys_are_case_insensitive() {
        let mut table = StaticAffordabilityTable::new();
        table.insert("Los Angeles", "Los Angeles", 10.0);

        assert_eq!(
            table.sb35_affordability_pct(" los angeles", "LOS ANGELES"),
            LookupOutcome::Found(10.0)
        );
        assert_eq!(
            table.sb35_affordability_pct("Pasadena", "Los Angeles"),
            LookupOutcome::NotFound
        );
    }

    #[test]
    fn test_tables_load_from_config_rows() {
        let rows = vec![IncomeLimitRow {
            county: "Alameda".to_string(),
            ami_pct: 80,
            household_size: 4,
            annual_income: 134_000.0,
        }];
        let limits = StaticIncomeLimits::from_rows(&rows);

        assert_eq!(limits.income_limit("alameda", 80, 4), LookupOutcome::Found(134_000.0));
        assert_eq!(limits.income_limit("alameda", 80, 3), LookupOutcome::NotFound);
    }

    #[test]
    fn test_no_lookup_never_finds() {
        assert_eq!(NoLookup.sb35_affordability_pct("Oakland", "Alameda"), LookupOutcome::NotFound);
        assert_eq!(NoLookup.income_limit("Alameda", 50, 2), LookupOutcome::NotFound);
    }
}
