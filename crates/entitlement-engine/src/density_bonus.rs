//! State Density Bonus Law calculator
//!
//! Gov. Code § 65915. The bonus and the number of incentives/concessions are
//! independent step functions of the affordable share. Brackets are never
//! interpolated: the highest bracket the project reaches wins.
//!
//! Concessions are applied cumulatively, in order:
//! 1. +11 ft height and one story
//! 2. -0.5 parking spaces per unit
//! 3. Side and rear setbacks reduced 20%
//! 4. +20% floor area and +22 ft height (100% affordable only)
//!
//! Parking follows § 65915(p): the lowest of the base ratio, the bedroom
//! cap, the income cap, and any concession discount. Transit-adjacent
//! projects provide no parking at all.

use crate::error::EngineError;
use crate::lookup::{IncomeLimitLookup, LookupOutcome};
use crate::programs::{affordable_units, parking_spaces, AVERAGE_UNIT_SQFT};
use crate::standards::{trim_number, STORY_HEIGHT_FT};
use serde::{Deserialize, Serialize};
use shared_types::{
    DevelopmentScenario, IncomeCategory, ParcelContext, ProgramKind, SetbackSide, Tenure,
};
use tracing::debug;

pub const FULLY_AFFORDABLE_PCT: f64 = 100.0;
pub const FULLY_AFFORDABLE_BONUS_PCT: f64 = 80.0;
pub const MAX_CONCESSIONS: u32 = 4;

pub const CONCESSION_HEIGHT_FT: f64 = 11.0;
pub const CONCESSION_PARKING_DISCOUNT: f64 = 0.5;
pub const CONCESSION_SETBACK_FACTOR: f64 = 0.8;
pub const CONCESSION_AREA_FACTOR: f64 = 1.2;
pub const CONCESSION_EXTRA_HEIGHT_FT: f64 = 22.0;

/// Spaces per unit for very low and low income projects
pub const LOWER_INCOME_PARKING_CAP: f64 = 0.5;

/// (minimum affordable %, bonus %) per income category
const VERY_LOW_BRACKETS: &[(f64, f64)] = &[(5.0, 20.0), (10.0, 35.0), (15.0, 50.0)];
const LOW_BRACKETS: &[(f64, f64)] = &[(10.0, 20.0), (17.0, 35.0), (24.0, 50.0)];
const MODERATE_BRACKETS: &[(f64, f64)] = &[(10.0, 5.0), (20.0, 15.0), (30.0, 25.0), (44.0, 50.0)];

fn brackets(category: IncomeCategory) -> &'static [(f64, f64)] {
    match category {
        IncomeCategory::VeryLow => VERY_LOW_BRACKETS,
        IncomeCategory::Low => LOW_BRACKETS,
        IncomeCategory::Moderate => MODERATE_BRACKETS,
    }
}

fn is_fully_affordable(pct: f64) -> bool {
    pct >= FULLY_AFFORDABLE_PCT
}

/// Result of applying the bonus to a base scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BonusOutcome {
    Granted {
        scenario: DevelopmentScenario,
        warnings: Vec<String>,
    },
    /// The bonus rounds to zero units
    Suppressed { reason: String },
    /// A track precondition fails
    Rejected { reason: String },
}

pub struct DensityBonusCalculator<'a> {
    income_limits: &'a dyn IncomeLimitLookup,
}

impl<'a> DensityBonusCalculator<'a> {
    pub fn new(income_limits: &'a dyn IncomeLimitLookup) -> Self {
        Self { income_limits }
    }

    /// Bonus percentage for the highest bracket reached
    pub fn bonus_percentage(affordability_pct: f64, category: Option<IncomeCategory>) -> f64 {
        if is_fully_affordable(affordability_pct) {
            return FULLY_AFFORDABLE_BONUS_PCT;
        }
        category
            .and_then(|c| {
                brackets(c)
                    .iter()
                    .rev()
                    .find(|(min, _)| affordability_pct >= *min)
            })
            .map(|(_, bonus)| *bonus)
            .unwrap_or(0.0)
    }

    /// Index of the highest bracket reached (1-3), or 4 when fully affordable
    pub fn concession_count(affordability_pct: f64, category: Option<IncomeCategory>) -> u32 {
        if is_fully_affordable(affordability_pct) {
            return MAX_CONCESSIONS;
        }
        category
            .map(|c| {
                brackets(c)
                    .iter()
                    .filter(|(min, _)| affordability_pct >= *min)
                    .count() as u32
            })
            .unwrap_or(0)
            .min(3)
    }

    pub fn bonus_units(base_units: u32, bonus_pct: f64) -> u32 {
        (f64::from(base_units) * bonus_pct / 100.0).floor() as u32
    }

    /// § 65915(p)(1) cap by bedroom count; `None` when bedrooms are unknown
    pub fn bedroom_parking_cap(avg_bedrooms: Option<f64>) -> Option<f64> {
        avg_bedrooms
            .filter(|b| b.is_finite() && *b >= 0.0)
            .map(|b| match b.ceil() as u32 {
                0 | 1 => 1.0,
                2 | 3 => 1.5,
                _ => 2.5,
            })
    }

    pub fn income_parking_cap(category: Option<IncomeCategory>) -> Option<f64> {
        match category {
            Some(IncomeCategory::VeryLow) | Some(IncomeCategory::Low) => Some(LOWER_INCOME_PARKING_CAP),
            _ => None,
        }
    }

    /// Final spaces-per-unit ratio
    pub fn parking_ratio(
        base_ratio: f64,
        avg_bedrooms: Option<f64>,
        category: Option<IncomeCategory>,
        concessions: u32,
        near_major_transit: bool,
    ) -> f64 {
        if near_major_transit {
            return 0.0;
        }
        let concession_discount = (concessions >= 2).then(|| base_ratio - CONCESSION_PARKING_DISCOUNT);

        [
            Self::bedroom_parking_cap(avg_bedrooms),
            Self::income_parking_cap(category),
            concession_discount,
        ]
        .into_iter()
        .flatten()
        .fold(base_ratio, f64::min)
        .max(0.0)
    }

    /// Apply the bonus to a base zoning scenario
    pub fn apply(
        &self,
        base: &DevelopmentScenario,
        base_parking_ratio: f64,
        parcel: &ParcelContext,
    ) -> BonusOutcome {
        let pct = match parcel.affordability_pct.filter(|p| p.is_finite()) {
            Some(pct) => pct.clamp(0.0, 100.0),
            None => {
                return BonusOutcome::Suppressed {
                    reason: "No affordable set-aside proposed".to_string(),
                }
            }
        };
        let category = parcel.income_category;

        if category == Some(IncomeCategory::Moderate) && parcel.tenure == Tenure::Rental {
            return BonusOutcome::Rejected {
                reason: "Moderate-income density bonus is limited to for-sale projects".to_string(),
            };
        }
        if category.is_none() && !is_fully_affordable(pct) {
            return BonusOutcome::Suppressed {
                reason: "Income category of the affordable units not reported".to_string(),
            };
        }

        let bonus_pct = Self::bonus_percentage(pct, category);
        let bonus_units = Self::bonus_units(base.max_units, bonus_pct);
        if bonus_units == 0 {
            return BonusOutcome::Suppressed {
                reason: format!(
                    "{}% affordable yields a {}% bonus, which adds no units to a {}-unit base",
                    trim_number(pct),
                    trim_number(bonus_pct),
                    base.max_units
                ),
            };
        }
        let concessions = Self::concession_count(pct, category);
        debug!(pct, bonus_pct, bonus_units, concessions, "density bonus granted");

        let mut scenario = base.clone();
        scenario.name = format!("Density Bonus (+{}%)", trim_number(bonus_pct));
        scenario.program = ProgramKind::DensityBonus;
        scenario.legal_basis = "Gov. Code § 65915 (State Density Bonus Law)".to_string();
        scenario.max_units = base.max_units + bonus_units;
        scenario.affordable_units_required = affordable_units(base.max_units, pct);
        scenario.notes.push(format!(
            "{} base units + {} bonus units ({}% bonus at {}% affordable)",
            base.max_units,
            bonus_units,
            trim_number(bonus_pct),
            trim_number(pct)
        ));

        // Concessions, cumulative and in order
        if concessions >= 1 {
            scenario.max_height_ft += CONCESSION_HEIGHT_FT;
            scenario.max_stories += 1;
            scenario
                .concessions
                .push("Concession 1: +11 ft height and one additional story".to_string());
        }
        if concessions >= 2 {
            scenario
                .concessions
                .push("Concession 2: parking reduced by 0.5 spaces per unit".to_string());
        }
        if concessions >= 3 {
            for side in [SetbackSide::Side, SetbackSide::Rear] {
                if let Some(distance) = scenario.setbacks.get_mut(&side) {
                    *distance *= CONCESSION_SETBACK_FACTOR;
                }
            }
            scenario
                .concessions
                .push("Concession 3: side and rear setbacks reduced 20%".to_string());
        }
        if concessions >= 4 {
            scenario.max_building_area_sqft *= CONCESSION_AREA_FACTOR;
            scenario.max_height_ft += CONCESSION_EXTRA_HEIGHT_FT;
            scenario
                .concessions
                .push("Concession 4: +20% floor area and +22 ft height".to_string());
        }

        let ratio = Self::parking_ratio(
            base_parking_ratio,
            parcel.avg_bedrooms_per_unit,
            category,
            concessions,
            parcel.near_major_transit,
        );
        scenario.parking_required = parking_spaces(scenario.max_units, ratio);
        scenario
            .notes
            .push(format!("Parking ratio: {} spaces per unit", trim_number(ratio)));
        if Self::bedroom_parking_cap(parcel.avg_bedrooms_per_unit).is_none() && !parcel.near_major_transit {
            scenario
                .notes
                .push("Bedroom mix not reported; bedroom parking cap not applied".to_string());
        }

        self.add_waivers(&mut scenario, parcel);

        if category == Some(IncomeCategory::Moderate) && parcel.tenure == Tenure::Unknown {
            scenario.notes.push(
                "Moderate-income bonus requires a for-sale project; verify tenure".to_string(),
            );
        }

        let warnings = self.annotate_income_limit(&mut scenario, parcel, category);
        BonusOutcome::Granted { scenario, warnings }
    }

    /// Waive any standard the bonus building cannot physically meet
    fn add_waivers(&self, scenario: &mut DevelopmentScenario, parcel: &ParcelContext) {
        let needed_area = f64::from(scenario.max_units) * AVERAGE_UNIT_SQFT;
        if needed_area > scenario.max_building_area_sqft {
            scenario.waivers.push(format!(
                "Floor area: {} sq ft needed for {} units exceeds {} sq ft allowed",
                trim_number(needed_area.round()),
                scenario.max_units,
                trim_number(scenario.max_building_area_sqft.round())
            ));
            scenario.max_building_area_sqft = needed_area;
        }

        let footprint = parcel.lot_area_sqft * scenario.lot_coverage_pct / 100.0;
        if footprint > 0.0 {
            let needed_stories = (needed_area / footprint).ceil() as u32;
            if needed_stories > scenario.max_stories {
                scenario.waivers.push(format!(
                    "Height: {} stories needed at {}% lot coverage exceeds {} stories allowed",
                    needed_stories,
                    trim_number(scenario.lot_coverage_pct),
                    scenario.max_stories
                ));
                scenario.max_stories = needed_stories;
                scenario.max_height_ft = scenario
                    .max_height_ft
                    .max(f64::from(needed_stories) * STORY_HEIGHT_FT);
            }
        }
    }

    fn annotate_income_limit(
        &self,
        scenario: &mut DevelopmentScenario,
        parcel: &ParcelContext,
        category: Option<IncomeCategory>,
    ) -> Vec<String> {
        let category = category.unwrap_or(IncomeCategory::Low);
        let household_size = parcel
            .avg_bedrooms_per_unit
            .filter(|b| b.is_finite() && *b >= 0.0)
            .map(|b| (b.round() as u8).saturating_add(1))
            .unwrap_or(3);

        match self
            .income_limits
            .income_limit(&parcel.county, category.ami_pct(), household_size)
        {
            LookupOutcome::Found(limit) => {
                scenario.notes.push(format!(
                    "Income limit, {} ({}% AMI, household of {}): ${}",
                    category.label(),
                    category.ami_pct(),
                    household_size,
                    trim_number(limit.round())
                ));
                Vec::new()
            }
            LookupOutcome::NotFound => {
                scenario.notes.push(format!(
                    "Income limit for {} County at {}% AMI not available",
                    parcel.county,
                    category.ami_pct()
                ));
                Vec::new()
            }
            LookupOutcome::Unavailable(reason) => {
                scenario
                    .notes
                    .push("Income limit lookup unavailable; limits not shown".to_string());
                vec![EngineError::LookupUnavailable(format!("income limits ({})", reason)).to_string()]
            }
        }
    }
}
