//! Zoning code parsing
//!
//! Zone strings follow the "class - height district - suffixes" layout used
//! by most California charter cities:
//!
//! - `R1-1`            single-family, height district 1
//! - `RD1.5-1XL`       restricted density, 1,500 sq ft per unit, extra-limited height
//! - `[Q]C2-1VL-CPIO`  qualified commercial, very-limited height, plan overlay suffix
//!
//! Bracketed or parenthesized prefixes (`[Q]`, `(T)`) mark qualified or
//! tentative conditions and are kept so callers can warn about them.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Qualified / tentative condition prefixes such as "[Q]" or "(T)(Q)"
    static ref CONDITION_PREFIX_PATTERN: Regex =
        Regex::new(r"^\s*((?:[\[(][A-Z]+[\])]\s*)+)").unwrap();

    /// Zone class token: letters, then an optional numeric part ("RD1.5", "C2", "RS")
    static ref ZONE_CLASS_PATTERN: Regex =
        Regex::new(r"^([A-Z]+)(\d+(?:\.\d+)?)?$").unwrap();

    /// Height district token: "1", "1L", "1VL", "1XL", "2", ...
    static ref HEIGHT_DISTRICT_PATTERN: Regex =
        Regex::new(r"^(\d)(L|VL|XL|SS)?$").unwrap();
}

/// Zone class families the standards table knows about
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneClass {
    /// Residential estate
    Re,
    /// Suburban single-family
    Rs,
    /// One-family
    R1,
    /// Two-family
    R2,
    /// Restricted density multifamily; payload is lot area per unit in thousands of sq ft
    Rd(f64),
    R3,
    R4,
    R5,
    /// Limited commercial
    C1,
    /// Commercial
    C2,
    /// Commercial (regional)
    C4,
    /// Commercial manufacturing
    Cm,
    /// Industrial
    M,
}

impl ZoneClass {
    pub fn code(&self) -> String {
        match self {
            ZoneClass::Re => "RE".to_string(),
            ZoneClass::Rs => "RS".to_string(),
            ZoneClass::R1 => "R1".to_string(),
            ZoneClass::R2 => "R2".to_string(),
            ZoneClass::Rd(k) => format!("RD{}", k),
            ZoneClass::R3 => "R3".to_string(),
            ZoneClass::R4 => "R4".to_string(),
            ZoneClass::R5 => "R5".to_string(),
            ZoneClass::C1 => "C1".to_string(),
            ZoneClass::C2 => "C2".to_string(),
            ZoneClass::C4 => "C4".to_string(),
            ZoneClass::Cm => "CM".to_string(),
            ZoneClass::M => "M".to_string(),
        }
    }

    pub fn is_single_family(&self) -> bool {
        matches!(self, ZoneClass::Re | ZoneClass::Rs | ZoneClass::R1)
    }

    pub fn is_residential(&self) -> bool {
        matches!(
            self,
            ZoneClass::Re
                | ZoneClass::Rs
                | ZoneClass::R1
                | ZoneClass::R2
                | ZoneClass::Rd(_)
                | ZoneClass::R3
                | ZoneClass::R4
                | ZoneClass::R5
        )
    }

    pub fn is_multifamily(&self) -> bool {
        self.is_residential() && !self.is_single_family()
    }

    /// Zones where office, retail, or parking is a principally permitted use
    pub fn is_commercial(&self) -> bool {
        matches!(
            self,
            ZoneClass::C1 | ZoneClass::C2 | ZoneClass::C4 | ZoneClass::Cm
        )
    }
}

/// Height district designation following the zone class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightDistrict {
    One,
    /// Limited: 75 ft
    OneL,
    /// Very limited: 45 ft
    OneVl,
    /// Extra limited: 30 ft
    OneXl,
    /// Special sign / small-scale: 30 ft
    OneSs,
    Two,
    Three,
    Four,
}

impl HeightDistrict {
    /// Height cap imposed by the district, if any
    pub fn height_cap_ft(&self) -> Option<f64> {
        match self {
            HeightDistrict::OneL => Some(75.0),
            HeightDistrict::OneVl => Some(45.0),
            HeightDistrict::OneXl | HeightDistrict::OneSs => Some(30.0),
            _ => None,
        }
    }

    /// Commercial floor area ratio for the district
    pub fn commercial_far(&self) -> f64 {
        match self {
            HeightDistrict::Two => 6.0,
            HeightDistrict::Three => 10.0,
            HeightDistrict::Four => 13.0,
            _ => 1.5,
        }
    }
}

/// Parsed zoning string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCode {
    pub raw: String,
    pub class: ZoneClass,
    pub height_district: Option<HeightDistrict>,
    /// "[Q]", "(T)" and similar prefixes, without brackets
    pub conditions: Vec<String>,
    /// Trailing overlay suffixes such as "CPIO", "HPOZ", "O"
    pub suffixes: Vec<String>,
}

impl ZoneCode {
    /// Parse a zoning string; `None` when the class is not recognized
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();

        let (conditions, rest) = match CONDITION_PREFIX_PATTERN.captures(&upper) {
            Some(caps) => {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let consumed = caps.get(0).map(|m| m.end()).unwrap_or_default();
                let conditions = prefix
                    .split(|c: char| c == ']' || c == ')')
                    .map(|c| c.trim_matches(|ch: char| ch == '[' || ch == '(' || ch.is_whitespace()))
                    .filter(|c| !c.is_empty())
                    .map(|c| c.to_string())
                    .collect();
                (conditions, upper[consumed..].trim().to_string())
            }
            None => (Vec::new(), upper.clone()),
        };

        let mut tokens = rest.split('-').map(str::trim).filter(|t| !t.is_empty());
        let class = parse_class(tokens.next()?)?;

        let mut height_district = None;
        let mut suffixes = Vec::new();
        for token in tokens {
            match (height_district, parse_height_district(token)) {
                (None, Some(hd)) if suffixes.is_empty() => height_district = Some(hd),
                _ => suffixes.push(token.to_string()),
            }
        }

        Some(Self {
            raw: raw.trim().to_string(),
            class,
            height_district,
            conditions,
            suffixes,
        })
    }

    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.suffixes.iter().any(|s| s.eq_ignore_ascii_case(suffix))
    }

    /// Qualified ("Q") or development-limitation ("D") conditions attached
    pub fn is_conditioned(&self) -> bool {
        !self.conditions.is_empty()
    }
}

fn parse_class(token: &str) -> Option<ZoneClass> {
    let caps = ZONE_CLASS_PATTERN.captures(token)?;
    let letters = caps.get(1)?.as_str();
    let number = caps.get(2).map(|m| m.as_str());

    match (letters, number) {
        ("RE", _) => Some(ZoneClass::Re),
        ("RS", _) => Some(ZoneClass::Rs),
        ("R", Some("1")) => Some(ZoneClass::R1),
        ("R", Some("2")) => Some(ZoneClass::R2),
        ("R", Some("3")) => Some(ZoneClass::R3),
        ("R", Some("4")) => Some(ZoneClass::R4),
        ("R", Some("5")) => Some(ZoneClass::R5),
        ("RD", Some(n)) => n.parse::<f64>().ok().filter(|k| *k > 0.0).map(ZoneClass::Rd),
        ("C", Some("1")) | ("CR", _) => Some(ZoneClass::C1),
        ("C", Some("2")) => Some(ZoneClass::C2),
        ("C", Some("4")) => Some(ZoneClass::C4),
        ("CM", _) => Some(ZoneClass::Cm),
        ("M", Some(_)) | ("MR", _) => Some(ZoneClass::M),
        _ => None,
    }
}

fn parse_height_district(token: &str) -> Option<HeightDistrict> {
    let caps = HEIGHT_DISTRICT_PATTERN.captures(token)?;
    let digit = caps.get(1)?.as_str();
    let modifier = caps.get(2).map(|m| m.as_str());

    match (digit, modifier) {
        ("1", None) => Some(HeightDistrict::One),
        ("1", Some("L")) => Some(HeightDistrict::OneL),
        ("1", Some("VL")) => Some(HeightDistrict::OneVl),
        ("1", Some("XL")) => Some(HeightDistrict::OneXl),
        ("1", Some("SS")) => Some(HeightDistrict::OneSs),
        ("2", None) => Some(HeightDistrict::Two),
        ("3", None) => Some(HeightDistrict::Three),
        ("4", None) => Some(HeightDistrict::Four),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_simple_single_family() {
        let zone = ZoneCode::parse("R1-1").unwrap();
        assert_eq!(zone.class, ZoneClass::R1);
        assert_eq!(zone.height_district, Some(HeightDistrict::One));
        assert!(zone.suffixes.is_empty());
        assert!(zone.class.is_single_family());
    }

    #[test]
    fn test_parses_restricted_density() {
        let zone = ZoneCode::parse("RD1.5-1XL").unwrap();
        assert_eq!(zone.class, ZoneClass::Rd(1.5));
        assert_eq!(zone.height_district, Some(HeightDistrict::OneXl));
        assert!(zone.class.is_multifamily());
    }

    #[test]
    fn test_parses_conditions_and_suffixes() {
        let zone = ZoneCode::parse("[Q]C2-1VL-CPIO").unwrap();
        assert_eq!(zone.class, ZoneClass::C2);
        assert_eq!(zone.conditions, vec!["Q".to_string()]);
        assert_eq!(zone.height_district, Some(HeightDistrict::OneVl));
        assert!(zone.has_suffix("cpio"));
        assert!(zone.is_conditioned());
    }

    #[test]
    fn test_parses_multiple_conditions() {
        let zone = ZoneCode::parse("(T)(Q)R3-1").unwrap();
        assert_eq!(zone.conditions, vec!["T".to_string(), "Q".to_string()]);
        assert_eq!(zone.class, ZoneClass::R3);
    }

    #[test]
    fn test_lowercase_and_missing_height_district() {
        let zone = ZoneCode::parse("  c4 ").unwrap();
        assert_eq!(zone.class, ZoneClass::C4);
        assert_eq!(zone.height_district, None);
    }

    #[test]
    fn test_rejects_unknown_class() {
        assert!(ZoneCode::parse("OS-1XL").is_none());
        assert!(ZoneCode::parse("").is_none());
        assert!(ZoneCode::parse("RD0-1").is_none());
    }

    #[test]
    fn test_zone_families() {
        assert!(ZoneClass::C2.is_commercial());
        assert!(!ZoneClass::R1.is_commercial());
        assert!(!ZoneClass::M.is_residential());
    }

    #[test]
    fn test_height_district_caps() {
        assert_eq!(HeightDistrict::OneVl.height_cap_ft(), Some(45.0));
        assert_eq!(HeightDistrict::One.height_cap_ft(), None);
        assert_eq!(HeightDistrict::Two.commercial_far(), 6.0);
    }
}
