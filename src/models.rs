use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One roster row exactly as the sheet holds it. Nothing is coerced yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Current Level")]
    pub current_level: String,
    #[serde(rename = "Pass/Fail")]
    pub pass_fail: String,
    #[serde(rename = "Age", default)]
    pub age: String,
    #[serde(rename = "Monitor", default)]
    pub monitor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fail,
    Pass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub name: String,
    pub current_level: String,
    pub outcome: Outcome,
    pub age: i64,
    pub monitor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub student: StudentRecord,
    pub instructor_name: String,
    pub next_level: String,
}

/// Lesson day; each day is its own tab in a pre-registration sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Wednesday,
    Friday,
    Saturday,
    Sunday,
    Other,
}

impl Day {
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Wednesday => "Wednesday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
            Day::Other => "Other",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
