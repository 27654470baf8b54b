//! Level progression rules.
//!
//! A student's next level comes from their current level, the outcome of this
//! session's assessment and their age. Age-driven track switches (parent and
//! tot into preschool, preschool into the numbered swimmer track at five) are
//! checked before the outcome-driven table.

use crate::error::ProgressionError;
use crate::models::Outcome;

/// Version tag of the canonical progression table below.
pub const RULE_TABLE_VERSION: &str = "2025.1";

/// Marker staff prepend to level cells they edited by hand.
pub const EDIT_MARKER: &str = "Ed: ";

const PARENT_AND_TOT: &str = "Parent & Tot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    ParentAndTot1,
    ParentAndTot2,
    ParentAndTot3,
    Preschool1,
    Preschool2,
    Preschool3,
    Preschool4,
    Preschool5,
    Swimmer1,
    Swimmer2,
    Swimmer3,
    Swimmer4,
    Swimmer5,
    Swimmer6,
    SwimPatrolRookie,
    SwimPatrolRanger,
    SwimPatrolStar,
    BronzeMedallion,
    Teen1,
    Teen2,
    Teen3,
    TeenFitness,
    Adult1,
    Adult2,
    Adult3,
    AdultFitness,
    Private,
    AdaptedPrivate,
}

impl Level {
    pub const ALL: [Level; 28] = [
        Level::ParentAndTot1,
        Level::ParentAndTot2,
        Level::ParentAndTot3,
        Level::Preschool1,
        Level::Preschool2,
        Level::Preschool3,
        Level::Preschool4,
        Level::Preschool5,
        Level::Swimmer1,
        Level::Swimmer2,
        Level::Swimmer3,
        Level::Swimmer4,
        Level::Swimmer5,
        Level::Swimmer6,
        Level::SwimPatrolRookie,
        Level::SwimPatrolRanger,
        Level::SwimPatrolStar,
        Level::BronzeMedallion,
        Level::Teen1,
        Level::Teen2,
        Level::Teen3,
        Level::TeenFitness,
        Level::Adult1,
        Level::Adult2,
        Level::Adult3,
        Level::AdultFitness,
        Level::Private,
        Level::AdaptedPrivate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::ParentAndTot1 => "Parent & Tot 1",
            Level::ParentAndTot2 => "Parent & Tot 2",
            Level::ParentAndTot3 => "Parent & Tot 3",
            Level::Preschool1 => "Preschool 1",
            Level::Preschool2 => "Preschool 2",
            Level::Preschool3 => "Preschool 3",
            Level::Preschool4 => "Preschool 4",
            Level::Preschool5 => "Preschool 5",
            Level::Swimmer1 => "Swimmer 1",
            Level::Swimmer2 => "Swimmer 2",
            Level::Swimmer3 => "Swimmer 3",
            Level::Swimmer4 => "Swimmer 4",
            Level::Swimmer5 => "Swimmer 5",
            Level::Swimmer6 => "Swimmer 6",
            Level::SwimPatrolRookie => "Swim Patrol Rookie",
            Level::SwimPatrolRanger => "Swim Patrol Ranger",
            Level::SwimPatrolStar => "Swim Patrol Star",
            Level::BronzeMedallion => "Bronze Medallion",
            Level::Teen1 => "Teen 1",
            Level::Teen2 => "Teen 2",
            Level::Teen3 => "Teen 3",
            Level::TeenFitness => "Teen Fitness",
            Level::Adult1 => "Adult 1",
            Level::Adult2 => "Adult 2",
            Level::Adult3 => "Adult 3",
            Level::AdultFitness => "Adult Fitness",
            Level::Private => "Private",
            Level::AdaptedPrivate => "Adapted Private",
        }
    }

    pub fn from_name(name: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.as_str() == name)
    }

    /// Successor on a pass. Total over the vocabulary: levels that only move
    /// by age, and terminal levels, map to themselves. Preschool 5 maps to its
    /// pass branch; its fail branch is handled in [`next_level`].
    pub fn successor(self) -> Level {
        match self {
            Level::ParentAndTot1 | Level::ParentAndTot2 | Level::ParentAndTot3 => self,
            Level::Preschool1 | Level::Preschool2 | Level::Preschool3 => Level::Swimmer1,
            Level::Preschool4 => Level::Swimmer2,
            Level::Preschool5 => Level::Swimmer3,
            Level::Swimmer1 => Level::Swimmer2,
            Level::Swimmer2 => Level::Swimmer3,
            Level::Swimmer3 => Level::Swimmer4,
            Level::Swimmer4 => Level::Swimmer5,
            Level::Swimmer5 => Level::Swimmer6,
            Level::Swimmer6 => Level::SwimPatrolRookie,
            Level::SwimPatrolRookie => Level::SwimPatrolRanger,
            Level::SwimPatrolRanger => Level::SwimPatrolStar,
            Level::SwimPatrolStar => Level::BronzeMedallion,
            Level::BronzeMedallion => self,
            Level::Teen1 => Level::Teen2,
            Level::Teen2 => Level::Teen3,
            Level::Teen3 => Level::TeenFitness,
            Level::TeenFitness => self,
            Level::Adult1 => Level::Adult2,
            Level::Adult2 => Level::Adult3,
            Level::Adult3 => Level::AdultFitness,
            Level::AdultFitness => self,
            Level::Private | Level::AdaptedPrivate => self,
        }
    }

    fn is_preschool(self) -> bool {
        matches!(
            self,
            Level::Preschool1
                | Level::Preschool2
                | Level::Preschool3
                | Level::Preschool4
                | Level::Preschool5
        )
    }
}

/// Strips any leading edit markers and surrounding whitespace. A cell left
/// holding only the marker (trailing space trimmed by the sheet or not) is empty.
pub fn strip_edit_marker(level: &str) -> &str {
    let mut level = level.trim_start();
    while let Some(rest) = level.strip_prefix(EDIT_MARKER) {
        level = rest.trim_start();
    }
    let level = level.trim_end();
    if level == EDIT_MARKER.trim_end() {
        return "";
    }
    level
}

pub fn coerce_pass_fail(raw: &str) -> Result<Outcome, ProgressionError> {
    match parse_whole_number(raw) {
        Some(0) => Ok(Outcome::Fail),
        Some(1) => Ok(Outcome::Pass),
        _ => Err(ProgressionError::InvalidPassFail(raw.to_string())),
    }
}

pub fn outcome_from_int(pass_fail: i64) -> Result<Outcome, ProgressionError> {
    match pass_fail {
        0 => Ok(Outcome::Fail),
        1 => Ok(Outcome::Pass),
        other => Err(ProgressionError::InvalidPassFail(other.to_string())),
    }
}

/// Lenient: anything that is not a number counts as age 0. Fractions truncate.
pub fn coerce_age(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(age) = raw.parse::<i64>() {
        return age;
    }
    match raw.parse::<f64>() {
        Ok(age) if age.is_finite() => age.trunc() as i64,
        _ => 0,
    }
}

fn parse_whole_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

/// Resolves the next level from raw inputs. `pass_fail` must be 0 or 1.
pub fn resolve(current_level: &str, pass_fail: i64, age: i64) -> Result<String, ProgressionError> {
    let level = strip_edit_marker(current_level);
    if level.is_empty() {
        return Err(ProgressionError::EmptyLevel);
    }
    let outcome = outcome_from_int(pass_fail)?;
    Ok(next_level(level, outcome, age))
}

/// Applies the progression rules to an already stripped, non-empty level.
pub fn next_level(level: &str, outcome: Outcome, age: i64) -> String {
    let known = Level::from_name(level);

    if age == 5 {
        if let Some(preschool) = known.filter(|l| l.is_preschool()) {
            return age_five_track(preschool, outcome).as_str().to_string();
        }
    }

    match (known, age) {
        (Some(Level::ParentAndTot1), 1) => return Level::ParentAndTot2.as_str().to_string(),
        (Some(Level::ParentAndTot2), 2) => return Level::ParentAndTot3.as_str().to_string(),
        _ => {}
    }

    if level.starts_with(PARENT_AND_TOT) && age > 3 {
        return Level::Preschool1.as_str().to_string();
    }

    if known == Some(Level::Preschool5) {
        return preschool_five(outcome).as_str().to_string();
    }

    match (known, outcome) {
        (Some(level), Outcome::Pass) => level.successor().as_str().to_string(),
        _ => level.to_string(),
    }
}

/// Students turning five leave preschool for the swimmer track whatever the
/// outcome; a pass in Preschool 3 or 5 skips one extra step.
fn age_five_track(preschool: Level, outcome: Outcome) -> Level {
    match (preschool, outcome) {
        (Level::Preschool1 | Level::Preschool2, _) => Level::Swimmer1,
        (Level::Preschool3, Outcome::Pass) => Level::Swimmer2,
        (Level::Preschool3, Outcome::Fail) => Level::Swimmer1,
        (Level::Preschool4, _) => Level::Swimmer2,
        (Level::Preschool5, outcome) => preschool_five(outcome),
        (other, _) => other,
    }
}

fn preschool_five(outcome: Outcome) -> Level {
    match outcome {
        Outcome::Pass => Level::Swimmer3,
        Outcome::Fail => Level::Swimmer2,
    }
}

/// Instructor first name(s) from a monitor cell such as `"Smith, John"` or
/// `"Smith, John, Doe, Jane"`.
pub fn extract_instructor_name(monitor: &str) -> String {
    let parts: Vec<&str> = monitor.split(", ").collect();
    if parts.len() > 3 {
        return format!("{} & {}", parts[1], parts[3]);
    }
    if parts.len() > 1 {
        return parts[1].to_string();
    }
    monitor.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_follows_table_for_every_level() {
        for level in Level::ALL {
            let next = resolve(level.as_str(), 1, 3).unwrap();
            assert_eq!(next, level.successor().as_str(), "level {}", level.as_str());
            assert_eq!(resolve(level.as_str(), 1, 3).unwrap(), next);
        }
    }

    #[test]
    fn fail_stays_in_place() {
        for level in Level::ALL.into_iter().filter(|l| *l != Level::Preschool5) {
            assert_eq!(resolve(level.as_str(), 0, 3).unwrap(), level.as_str());
        }
    }

    #[test]
    fn preschool_five_branches_on_outcome() {
        assert_eq!(resolve("Preschool 5", 1, 5).unwrap(), "Swimmer 3");
        assert_eq!(resolve("Preschool 5", 0, 5).unwrap(), "Swimmer 2");
        assert_eq!(resolve("Preschool 5", 1, 7).unwrap(), "Swimmer 3");
        assert_eq!(resolve("Preschool 5", 0, 7).unwrap(), "Swimmer 2");
    }

    #[test]
    fn five_year_olds_switch_to_swimmer_track() {
        assert_eq!(resolve("Preschool 1", 0, 5).unwrap(), "Swimmer 1");
        assert_eq!(resolve("Preschool 2", 0, 5).unwrap(), "Swimmer 1");
        assert_eq!(resolve("Preschool 3", 1, 5).unwrap(), "Swimmer 2");
        assert_eq!(resolve("Preschool 3", 0, 5).unwrap(), "Swimmer 1");
        assert_eq!(resolve("Preschool 4", 0, 5).unwrap(), "Swimmer 2");
        // Outside the override Preschool 3 follows the plain table.
        assert_eq!(resolve("Preschool 3", 1, 4).unwrap(), "Swimmer 1");
        assert_eq!(resolve("Swimmer 2", 0, 5).unwrap(), "Swimmer 2");
    }

    #[test]
    fn parent_and_tot_moves_by_age() {
        assert_eq!(resolve("Parent & Tot 1", 0, 1).unwrap(), "Parent & Tot 2");
        assert_eq!(resolve("Parent & Tot 1", 1, 1).unwrap(), "Parent & Tot 2");
        assert_eq!(resolve("Parent & Tot 2", 0, 2).unwrap(), "Parent & Tot 3");
        assert_eq!(resolve("Parent & Tot 2", 0, 4).unwrap(), "Preschool 1");
        assert_eq!(resolve("Parent & Tot 3", 1, 3).unwrap(), "Parent & Tot 3");
        assert_eq!(resolve("Parent & Tot 9", 0, 6).unwrap(), "Preschool 1");
    }

    #[test]
    fn edit_marker_is_ignored() {
        assert_eq!(
            resolve("Ed: Swimmer 1", 1, 10).unwrap(),
            resolve("Swimmer 1", 1, 10).unwrap()
        );
        assert_eq!(strip_edit_marker(strip_edit_marker("Ed: Teen 2")), "Teen 2");
        assert_eq!(strip_edit_marker("Ed: Ed: Teen 2"), "Teen 2");
        assert_eq!(strip_edit_marker("  Ed: Swimmer 4 "), "Swimmer 4");
        assert_eq!(strip_edit_marker("Ed: "), "");
        assert_eq!(strip_edit_marker("Ed:"), "");
        assert_eq!(strip_edit_marker("Ed: Ed:"), "");
    }

    #[test]
    fn unknown_levels_stay() {
        assert_eq!(resolve("Aquafit", 1, 40).unwrap(), "Aquafit");
        assert_eq!(resolve("Private", 1, 12).unwrap(), "Private");
        assert_eq!(resolve("Adapted Private", 1, 12).unwrap(), "Adapted Private");
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(resolve("", 1, 6), Err(ProgressionError::EmptyLevel));
        assert_eq!(resolve("Ed: ", 1, 6), Err(ProgressionError::EmptyLevel));
        assert!(matches!(
            resolve("Preschool 5", 2, 6),
            Err(ProgressionError::InvalidPassFail(_))
        ));
        assert!(coerce_pass_fail("").is_err());
        assert!(coerce_pass_fail("yes").is_err());
        assert!(coerce_pass_fail("0.5").is_err());
        assert_eq!(coerce_pass_fail(" 1 "), Ok(Outcome::Pass));
        assert_eq!(coerce_pass_fail("0.0"), Ok(Outcome::Fail));
    }

    #[test]
    fn age_coercion_is_lenient() {
        assert_eq!(coerce_age("7"), 7);
        assert_eq!(coerce_age(" 5.9 "), 5);
        assert_eq!(coerce_age(""), 0);
        assert_eq!(coerce_age("five"), 0);
    }

    #[test]
    fn instructor_names() {
        assert_eq!(extract_instructor_name("Smith, John"), "John");
        assert_eq!(extract_instructor_name("Smith, John, Doe, Jane"), "John & Jane");
        assert_eq!(extract_instructor_name("SoloName"), "SoloName");
        assert_eq!(extract_instructor_name("Smith, John, Doe"), "John");
    }
}
