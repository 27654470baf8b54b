use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::allocator::Page;
use crate::models::{Day, ResolvedRecord};
use crate::progression::RULE_TABLE_VERSION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSummary {
    pub next_level: String,
    pub count: usize,
    pub advanced: usize,
}

pub fn summarize_by_level(records: &[ResolvedRecord]) -> Vec<LevelSummary> {
    let mut map: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

    for record in records {
        let entry = map.entry(record.next_level.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if record.next_level != record.student.current_level {
            entry.1 += 1;
        }
    }

    let mut summaries: Vec<LevelSummary> = map
        .into_iter()
        .map(|(next_level, (count, advanced))| LevelSummary {
            next_level: next_level.to_string(),
            count,
            advanced,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}

pub fn build_report(
    sheet_name: &str,
    day: Day,
    generated_on: NaiveDate,
    records: &[ResolvedRecord],
    pages: &[Page],
) -> String {
    let summaries = summarize_by_level(records);
    let mut per_instructor: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *per_instructor.entry(record.instructor_name.as_str()).or_default() += 1;
    }

    let mut output = String::new();

    let _ = writeln!(output, "# Next Level Report");
    let _ = writeln!(
        output,
        "Generated for {} ({}) on {} using rule table {}",
        sheet_name, day, generated_on, RULE_TABLE_VERSION
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Next Levels");

    if summaries.is_empty() {
        let _ = writeln!(output, "No students on this roster.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} students ({} moving up)",
                summary.next_level, summary.count, summary.advanced
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Instructors");

    if per_instructor.is_empty() {
        let _ = writeln!(output, "No instructors on this roster.");
    } else {
        for (instructor, count) in per_instructor.iter() {
            let _ = writeln!(output, "- {}: {} students", instructor, count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pages");

    if pages.is_empty() {
        let _ = writeln!(output, "No pages allocated.");
    } else {
        for page in pages.iter() {
            let _ = writeln!(output, "### {} ({})", page.title(), page.instructors().join(", "));
            for placement in page.placements.iter() {
                let _ = writeln!(
                    output,
                    "- slot {}: {} ({} -> {}) with {}",
                    placement.slot.index() + 1,
                    placement.record.student.name,
                    placement.record.student.current_level,
                    placement.record.next_level,
                    placement.record.instructor_name
                );
            }
        }
    }

    output
}
