//! Party-control classification for a single year.
//!
//! A party "controls" government under a `ControlDefinition` when it holds the
//! White House and a majority in every chamber the definition names. Anything
//! else, including a chamber tie under the strict rule, is split control.

use tracing::warn;

use crate::domain::{
    Chamber, ChamberSeats, ControlDefinition, ControlLabel, FiscalYearRecord, IntegrityMode, MajorityRule, Party,
};
use crate::error::ValidationError;

/// Label for one record plus any integrity faults tolerated while computing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub label: ControlLabel,
    /// Non-fatal faults (only populated under `IntegrityMode::Report`).
    pub faults: Vec<ValidationError>,
}

/// Pure classifier; holds only the majority and integrity policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    pub majority: MajorityRule,
    pub integrity: IntegrityMode,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            majority: MajorityRule::Strict,
            integrity: IntegrityMode::Strict,
        }
    }
}

impl Classifier {
    pub fn new(majority: MajorityRule, integrity: IntegrityMode) -> Self {
        Self { majority, integrity }
    }

    /// Classify one record under `definition`.
    ///
    /// Errors with `MissingChamber` when the record lacks a required chamber,
    /// `MissingField` when `MajorityRule::Recorded` has no flag to read, and
    /// `SeatSumMismatch` under `IntegrityMode::Strict`.
    pub fn classify(
        &self,
        record: &FiscalYearRecord,
        definition: ControlDefinition,
    ) -> Result<Classification, ValidationError> {
        let mut faults = Vec::new();
        let mut rep_everywhere = true;
        let mut dem_everywhere = true;

        for &chamber in definition.chambers() {
            let seats = record.chamber(chamber).ok_or(ValidationError::MissingChamber {
                year: record.year,
                chamber,
            })?;

            if !seats.seat_sum_matches() {
                let fault = ValidationError::SeatSumMismatch {
                    year: record.year,
                    chamber,
                    dem: seats.dem,
                    rep: seats.rep,
                    other: seats.other,
                    total: seats.total,
                };
                match self.integrity {
                    IntegrityMode::Strict => return Err(fault),
                    IntegrityMode::Report => {
                        warn!(year = record.year, %chamber, "{fault}");
                        faults.push(fault);
                    }
                }
            }

            let dem = holds_majority(seats, Party::Democrat, self.majority)
                .ok_or_else(|| missing_flag(record.year, chamber))?;
            let rep = holds_majority(seats, Party::Republican, self.majority)
                .ok_or_else(|| missing_flag(record.year, chamber))?;

            dem_everywhere &= dem;
            rep_everywhere &= rep;
        }

        let label = match record.president_party {
            Party::Republican if rep_everywhere => ControlLabel::Republican,
            Party::Democrat if dem_everywhere => ControlLabel::Democrat,
            _ => ControlLabel::Split,
        };

        Ok(Classification { label, faults })
    }

    /// Classify and keep only the label.
    pub fn label(
        &self,
        record: &FiscalYearRecord,
        definition: ControlDefinition,
    ) -> Result<ControlLabel, ValidationError> {
        self.classify(record, definition).map(|c| c.label)
    }
}

/// Whether `party` holds a majority of `seats` under `rule`.
///
/// Returns `None` only for `MajorityRule::Recorded` when no flag was recorded.
/// An empty chamber (`total == 0`) has no majority under the seat-count rules.
pub fn holds_majority(seats: &ChamberSeats, party: Party, rule: MajorityRule) -> Option<bool> {
    let held = u64::from(match party {
        Party::Democrat => seats.dem,
        Party::Republican => seats.rep,
    });
    let total = u64::from(seats.total);

    // Compare 2*held against total to keep the House's 217.5 midpoint exact.
    match rule {
        MajorityRule::Strict => Some(total > 0 && 2 * held > total),
        MajorityRule::AtLeastHalf => Some(total > 0 && 2 * held >= total),
        MajorityRule::Recorded => {
            let dem = seats.dem_majority_recorded?;
            Some(match party {
                Party::Democrat => dem,
                Party::Republican => !dem,
            })
        }
    }
}

fn missing_flag(year: i32, chamber: Chamber) -> ValidationError {
    let field = match chamber {
        Chamber::Senate => "dem_senate_maj",
        Chamber::House => "dem_house_maj",
    };
    ValidationError::MissingField { year, field }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::FiscalValues;
    use proptest::prelude::*;

    pub(crate) fn record(year: i32, party: Party, senate_dem: u32, house_dem: u32) -> FiscalYearRecord {
        FiscalYearRecord {
            year,
            president: None,
            president_party: party,
            fiscal: FiscalValues::default(),
            senate: Some(ChamberSeats::new(senate_dem, 100 - senate_dem, 0, 100)),
            house: Some(ChamberSeats::new(house_dem, 435 - house_dem, 0, 435)),
        }
    }

    #[test]
    fn republican_president_with_both_chambers_is_republican_control() {
        let r = record(1954, Party::Republican, 40, 190);
        let c = Classifier::default();
        assert_eq!(c.label(&r, ControlDefinition::Full).unwrap(), ControlLabel::Republican);
        // House is ignored under the Senate-only definition.
        assert_eq!(c.label(&r, ControlDefinition::Senate).unwrap(), ControlLabel::Republican);
    }

    #[test]
    fn democrat_president_without_senate_majority_is_split() {
        let r = record(1995, Party::Democrat, 48, 250);
        let c = Classifier::default();
        assert_eq!(c.label(&r, ControlDefinition::Senate).unwrap(), ControlLabel::Split);
        assert_eq!(c.label(&r, ControlDefinition::House).unwrap(), ControlLabel::Democrat);
        assert_eq!(c.label(&r, ControlDefinition::Full).unwrap(), ControlLabel::Split);
    }

    #[test]
    fn strict_majority_boundaries() {
        let rule = MajorityRule::Strict;
        let senate_50 = ChamberSeats::new(50, 50, 0, 100);
        let senate_51 = ChamberSeats::new(51, 49, 0, 100);
        assert_eq!(holds_majority(&senate_50, Party::Democrat, rule), Some(false));
        assert_eq!(holds_majority(&senate_50, Party::Republican, rule), Some(false));
        assert_eq!(holds_majority(&senate_51, Party::Democrat, rule), Some(true));

        let house_217 = ChamberSeats::new(217, 218, 0, 435);
        let house_218 = ChamberSeats::new(218, 217, 0, 435);
        assert_eq!(holds_majority(&house_217, Party::Democrat, rule), Some(false));
        assert_eq!(holds_majority(&house_217, Party::Republican, rule), Some(true));
        assert_eq!(holds_majority(&house_218, Party::Democrat, rule), Some(true));
    }

    #[test]
    fn evenly_split_senate_falls_to_split_under_strict_rule() {
        let r = record(2001, Party::Republican, 50, 200);
        let c = Classifier::default();
        assert_eq!(c.label(&r, ControlDefinition::Senate).unwrap(), ControlLabel::Split);
        assert_eq!(c.label(&r, ControlDefinition::Full).unwrap(), ControlLabel::Split);
    }

    #[test]
    fn at_least_half_rule_gives_tie_to_the_president() {
        let c = Classifier::new(MajorityRule::AtLeastHalf, IntegrityMode::Strict);
        let seats = ChamberSeats::new(50, 50, 0, 100);
        assert_eq!(holds_majority(&seats, Party::Democrat, MajorityRule::AtLeastHalf), Some(true));

        let dem = record(2021, Party::Democrat, 50, 222);
        assert_eq!(c.label(&dem, ControlDefinition::Full).unwrap(), ControlLabel::Democrat);
        let rep = record(2001, Party::Republican, 50, 212);
        assert_eq!(c.label(&rep, ControlDefinition::Senate).unwrap(), ControlLabel::Republican);
    }

    #[test]
    fn recorded_rule_uses_flags_and_negates_for_republicans() {
        let c = Classifier::new(MajorityRule::Recorded, IntegrityMode::Strict);
        let mut r = record(2001, Party::Republican, 50, 212);
        r.senate = r.senate.map(|s| s.with_recorded_majority(false));
        r.house = r.house.map(|s| s.with_recorded_majority(false));
        assert_eq!(c.label(&r, ControlDefinition::Full).unwrap(), ControlLabel::Republican);

        r.senate = r.senate.map(|s| s.with_recorded_majority(true));
        assert_eq!(c.label(&r, ControlDefinition::Full).unwrap(), ControlLabel::Split);
        assert_eq!(c.label(&r, ControlDefinition::House).unwrap(), ControlLabel::Republican);
    }

    #[test]
    fn recorded_rule_without_flag_is_missing_field() {
        let c = Classifier::new(MajorityRule::Recorded, IntegrityMode::Strict);
        let r = record(1980, Party::Democrat, 58, 277);
        let err = c.classify(&r, ControlDefinition::House).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                year: 1980,
                field: "dem_house_maj"
            }
        );
    }

    #[test]
    fn missing_chamber_is_a_configuration_fault() {
        let mut r = record(1930, Party::Republican, 40, 200);
        r.house = None;
        let c = Classifier::default();
        assert_eq!(c.label(&r, ControlDefinition::Senate).unwrap(), ControlLabel::Republican);
        let err = c.classify(&r, ControlDefinition::Full).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingChamber {
                year: 1930,
                chamber: Chamber::House
            }
        );
    }

    #[test]
    fn seat_sum_mismatch_strict_vs_report() {
        let mut r = record(1975, Party::Republican, 60, 291);
        r.senate = Some(ChamberSeats::new(60, 38, 0, 100));

        let strict = Classifier::default();
        assert!(matches!(
            strict.classify(&r, ControlDefinition::Senate),
            Err(ValidationError::SeatSumMismatch { year: 1975, .. })
        ));

        let lenient = Classifier::new(MajorityRule::Strict, IntegrityMode::Report);
        let out = lenient.classify(&r, ControlDefinition::Senate).unwrap();
        assert_eq!(out.label, ControlLabel::Split);
        assert_eq!(out.faults.len(), 1);

        // A clean record reports no faults.
        let clean = lenient.classify(&record(1975, Party::Republican, 60, 291), ControlDefinition::Full).unwrap();
        assert!(clean.faults.is_empty());
    }

    fn arb_record() -> impl Strategy<Value = FiscalYearRecord> {
        (1900i32..2100, any::<bool>(), 0u32..=100, 0u32..=435, 0u32..=5, 0u32..=5).prop_map(
            |(year, rep_pres, sen_dem, house_dem, sen_other, house_other)| {
                let sen_other = sen_other.min(100 - sen_dem);
                let house_other = house_other.min(435 - house_dem);
                FiscalYearRecord {
                    year,
                    president: None,
                    president_party: if rep_pres { Party::Republican } else { Party::Democrat },
                    fiscal: FiscalValues::default(),
                    senate: Some(ChamberSeats::new(sen_dem, 100 - sen_dem - sen_other, sen_other, 100)),
                    house: Some(ChamberSeats::new(house_dem, 435 - house_dem - house_other, house_other, 435)),
                }
            },
        )
    }

    fn arb_definition() -> impl Strategy<Value = ControlDefinition> {
        prop::sample::select(ControlDefinition::ALL.to_vec())
    }

    fn arb_rule() -> impl Strategy<Value = MajorityRule> {
        prop::sample::select(vec![MajorityRule::Strict, MajorityRule::AtLeastHalf])
    }

    proptest! {
        #[test]
        fn classification_is_total_and_deterministic(r in arb_record(), def in arb_definition(), rule in arb_rule()) {
            let c = Classifier::new(rule, IntegrityMode::Strict);
            let first = c.label(&r, def);
            prop_assert!(first.is_ok());
            prop_assert_eq!(first, c.label(&r, def));
        }

        #[test]
        fn control_label_matches_president_party(r in arb_record(), def in arb_definition()) {
            let label = Classifier::default().label(&r, def).unwrap();
            match (label, r.president_party) {
                (ControlLabel::Republican, Party::Democrat) | (ControlLabel::Democrat, Party::Republican) => {
                    prop_assert!(false, "label {label:?} contradicts president party");
                }
                _ => {}
            }
        }
    }
}
