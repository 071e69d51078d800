//! Universal scenario transforms
//!
//! Applied exactly once, by the composer, to every scenario regardless of
//! the program that built it. Both transforms are idempotent.

use shared_types::{DevelopmentScenario, ParcelContext};

/// Note appended when parking is eliminated near transit
pub const TRANSIT_PARKING_NOTE: &str =
    "Parking not required: within 1/2 mile of a major transit stop (Gov. Code § 65863.2, AB 2097)";

/// Every existing-unit note starts with this
pub const EXISTING_UNITS_PREFIX: &str = "Existing conditions:";

pub const NONCONFORMING_PREFIX: &str = "Nonconforming use:";

/// Zero parking for transit-adjacent parcels
pub fn apply_transit_parking(mut scenario: DevelopmentScenario, parcel: &ParcelContext) -> DevelopmentScenario {
    if parcel.near_major_transit {
        scenario.parking_required = 0;
        if !scenario.has_note(TRANSIT_PARKING_NOTE) {
            scenario.notes.push(TRANSIT_PARKING_NOTE.to_string());
        }
    }
    scenario
}

/// Compare the scenario to what is on the site today
///
/// Inserts the comparison at note position 0 and, when existing units
/// exceed the scenario's capacity, a nonconforming-use warning at position 1.
/// Existing units beyond capacity are assumed not to be grandfathered.
pub fn annotate_existing_units(mut scenario: DevelopmentScenario, parcel: &ParcelContext) -> DevelopmentScenario {
    let already_annotated = scenario
        .notes
        .first()
        .map(|n| n.starts_with(EXISTING_UNITS_PREFIX))
        .unwrap_or(false);
    if already_annotated {
        return scenario;
    }

    let existing = parcel.existing_units;
    let net = scenario.net_new_units(existing);
    let summary = if existing == 0 {
        format!(
            "{} vacant site; scenario allows {} unit(s)",
            EXISTING_UNITS_PREFIX, scenario.max_units
        )
    } else {
        format!(
            "{} {} existing unit(s); scenario allows {} ({:+} net)",
            EXISTING_UNITS_PREFIX, existing, scenario.max_units, net
        )
    };
    scenario.notes.insert(0, summary);

    if net < 0 {
        scenario.notes.insert(
            1,
            format!(
                "{} {} existing units exceed the {} allowed; rebuilding would lose {} unit(s)",
                NONCONFORMING_PREFIX,
                existing,
                scenario.max_units,
                -net
            ),
        );
    }
    scenario
}

/// Both transforms, in order
pub fn apply_universal(scenario: DevelopmentScenario, parcel: &ParcelContext) -> DevelopmentScenario {
    annotate_existing_units(apply_transit_parking(scenario, parcel), parcel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parcel;
    use pretty_assertions::assert_eq;
    use shared_types::ProgramKind;

    fn scenario(units: u32, parking: u32) -> DevelopmentScenario {
        let mut s = DevelopmentScenario::new("Test", ProgramKind::BaseZoning, "test");
        s.max_units = units;
        s.parking_required = parking;
        s.notes.push("Program note".to_string());
        s
    }

    #[test]
    fn test_transit_override_is_idempotent() {
        let mut p = parcel("R3-1", 8_000.0);
        p.near_major_transit = true;

        let once = apply_transit_parking(scenario(10, 15), &p);
        let twice = apply_transit_parking(once.clone(), &p);

        assert_eq!(once.parking_required, 0);
        assert_eq!(twice, once);
        assert_eq!(twice.notes.iter().filter(|n| *n == TRANSIT_PARKING_NOTE).count(), 1);
    }

    #[test]
    fn test_transit_override_leaves_other_parcels_alone() {
        let s = apply_transit_parking(scenario(10, 15), &parcel("R3-1", 8_000.0));
        assert_eq!(s.parking_required, 15);
        assert!(!s.has_note(TRANSIT_PARKING_NOTE));
    }

    #[test]
    fn test_existing_units_note_is_first() {
        let mut p = parcel("R3-1", 8_000.0);
        p.existing_units = 4;
        let s = annotate_existing_units(scenario(10, 15), &p);
        assert_eq!(s.notes[0], "Existing conditions: 4 existing unit(s); scenario allows 10 (+6 net)");
        assert_eq!(s.notes[1], "Program note");
    }

    #[test]
    fn test_nonconforming_note_is_second() {
        let mut p = parcel("R1-1", 8_000.0);
        p.existing_units = 3;
        let s = annotate_existing_units(scenario(1, 2), &p);
        assert!(s.notes[0].starts_with(EXISTING_UNITS_PREFIX));
        assert!(s.notes[1].starts_with(NONCONFORMING_PREFIX));
        assert_eq!(s.notes[2], "Program note");
    }

    #[test]
    fn test_universal_transforms_are_idempotent() {
        let mut p = parcel("R1-1", 8_000.0);
        p.existing_units = 3;
        p.near_major_transit = true;
        let once = apply_universal(scenario(1, 2), &p);
        let twice = apply_universal(once.clone(), &p);
        assert_eq!(twice, once);
    }
}
