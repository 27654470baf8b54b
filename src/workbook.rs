//! Templated workbook output.
//!
//! A workbook is a JSON document holding named sheets of `cell -> text`. The
//! first sheet of the template is the page layout: it is copied once per
//! allocated page, filled, and dropped from the saved result.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocator::Page;
use crate::error::OutputWriteError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub title: String,
    #[serde(default)]
    pub cells: BTreeMap<String, String>,
}

impl Sheet {
    pub fn set(&mut self, cell: &str, value: &str) {
        self.cells.insert(cell.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn load(path: &Path) -> Result<Self, OutputWriteError> {
        let raw = fs::read_to_string(path).map_err(|source| OutputWriteError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| OutputWriteError::TemplateFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes through a sibling temporary file so a failed save never leaves a
    /// half-written destination.
    pub fn save(&self, path: &Path) -> Result<(), OutputWriteError> {
        let encoded = serde_json::to_string_pretty(self)?;
        let staging = staging_path(path);
        let destination_error = |source| OutputWriteError::Destination {
            path: path.to_path_buf(),
            source,
        };

        fs::write(&staging, encoded).map_err(destination_error)?;
        if let Err(source) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(destination_error(source));
        }
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Fills one copy of the template page per allocated page.
pub fn render(template: &Workbook, pages: &[Page]) -> Result<Workbook, OutputWriteError> {
    let (layout, rest) = template
        .sheets
        .split_first()
        .ok_or_else(|| OutputWriteError::EmptyTemplate(PathBuf::new()))?;

    let mut output = Workbook {
        sheets: rest.to_vec(),
    };

    for page in pages {
        let mut sheet = layout.clone();
        sheet.title = unique_title(&output, page.title());
        for placement in &page.placements {
            let cells = placement.slot.cells();
            sheet.set(cells.name, &placement.record.student.name);
            sheet.set(cells.level, &placement.record.next_level);
            sheet.set(cells.instructor, &placement.record.instructor_name);
        }
        debug!(sheet = %sheet.title, filled = page.placements.len(), "page rendered");
        output.sheets.push(sheet);
    }

    Ok(output)
}

/// Appends ` (2)`, ` (3)`, ... until no sheet in `workbook` has the title.
fn unique_title(workbook: &Workbook, title: String) -> String {
    let taken = |candidate: &str| workbook.sheets.iter().any(|sheet| sheet.title == candidate);
    if !taken(&title) {
        return title;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{title} ({n})");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Loads the template, renders every page and saves the result in one step.
pub fn write_report(
    pages: &[Page],
    template_path: &Path,
    destination: &Path,
) -> Result<usize, OutputWriteError> {
    let template = Workbook::load(template_path)?;
    if template.sheets.is_empty() {
        return Err(OutputWriteError::EmptyTemplate(template_path.to_path_buf()));
    }
    let output = render(&template, pages)?;
    output.save(destination)?;
    info!(pages = pages.len(), destination = %destination.display(), "workbook saved");
    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{allocate, Paging};
    use crate::models::{Outcome, ResolvedRecord, StudentRecord};

    fn record(name: &str, instructor: &str, next_level: &str) -> ResolvedRecord {
        ResolvedRecord {
            student: StudentRecord {
                name: name.to_string(),
                current_level: "Swimmer 3".to_string(),
                outcome: Outcome::Pass,
                age: 9,
                monitor: instructor.to_string(),
            },
            instructor_name: instructor.to_string(),
            next_level: next_level.to_string(),
        }
    }

    fn sheet<'a>(workbook: &'a Workbook, title: &str) -> Option<&'a Sheet> {
        workbook.sheets.iter().find(|sheet| sheet.title == title)
    }

    fn template() -> Workbook {
        let mut layout = Sheet {
            title: "Template".to_string(),
            cells: BTreeMap::new(),
        };
        layout.set("A1", "Progress Card");
        layout.set("C26", "");
        Workbook {
            sheets: vec![
                layout,
                Sheet {
                    title: "Notes".to_string(),
                    cells: BTreeMap::new(),
                },
            ],
        }
    }

    #[test]
    fn renders_one_sheet_per_page_without_template() {
        let records: Vec<ResolvedRecord> = (0..5)
            .map(|i| record(&format!("Student {i}"), "Maya", "Swimmer 4"))
            .collect();
        let pages = allocate(&records, Paging::Continuous);
        let output = render(&template(), &pages).unwrap();

        let titles: Vec<&str> = output.sheets.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Notes", "Sheet 1", "Sheet 2"]);
        assert!(sheet(&output, "Template").is_none());

        let first = sheet(&output, "Sheet 1").unwrap();
        assert_eq!(first.cells["A1"], "Progress Card");
        assert_eq!(first.cells["C8"], "Student 0");
        assert_eq!(first.cells["D10"], "Swimmer 4");
        assert_eq!(first.cells["D12"], "Maya");
        assert_eq!(first.cells["C62"], "Student 3");

        let second = sheet(&output, "Sheet 2").unwrap();
        assert_eq!(second.cells["C8"], "Student 4");
        assert_eq!(second.cells["C26"], "");
        assert!(!second.cells.contains_key("D28"));
    }

    #[test]
    fn write_report_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("template.json");
        let destination = dir.path().join("out.json");
        fs::write(&template_path, serde_json::to_string(&template()).unwrap()).unwrap();

        let pages = allocate(&[record("Avery", "Tom", "Swimmer 2")], Paging::Continuous);
        let written = write_report(&pages, &template_path, &destination).unwrap();

        assert_eq!(written, 1);
        let saved = Workbook::load(&destination).unwrap();
        assert_eq!(sheet(&saved, "Sheet 1").unwrap().cells["C8"], "Avery");
        assert!(!staging_path(&destination).exists());
    }

    #[test]
    fn rejects_missing_or_empty_template() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.json");

        let missing = write_report(&[], &dir.path().join("nope.json"), &destination);
        assert!(matches!(missing, Err(OutputWriteError::TemplateRead { .. })));

        let empty_path = dir.path().join("empty.json");
        fs::write(&empty_path, r#"{"sheets": []}"#).unwrap();
        let empty = write_report(&[], &empty_path, &destination);
        assert!(matches!(empty, Err(OutputWriteError::EmptyTemplate(_))));
        assert!(!destination.exists());
    }

    #[test]
    fn unwritable_destination_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("missing-dir").join("out.json");
        let result = template().save(&destination);
        assert!(matches!(result, Err(OutputWriteError::Destination { .. })));
    }

    #[test]
    fn page_titles_do_not_clash_with_kept_sheets() {
        let mut workbook = template();
        for title in ["Sheet 1", "Sheet 1 (2)"] {
            workbook.sheets.push(Sheet {
                title: title.to_string(),
                cells: BTreeMap::new(),
            });
        }
        let records: Vec<ResolvedRecord> = (0..5)
            .map(|i| record(&format!("Student {i}"), "Maya", "Swimmer 4"))
            .collect();
        let output = render(&workbook, &allocate(&records, Paging::Continuous)).unwrap();

        let titles: Vec<&str> = output.sheets.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Notes", "Sheet 1", "Sheet 1 (2)", "Sheet 1 (3)", "Sheet 2"]);
        assert!(sheet(&output, "Sheet 1").unwrap().cells.is_empty());
        assert_eq!(sheet(&output, "Sheet 1 (3)").unwrap().cells["C8"], "Student 0");
    }
}
