use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::ResolvedRecord;

pub const SLOTS_PER_PAGE: usize = 4;

/// Cell coordinates one slot writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCells {
    pub name: &'static str,
    pub level: &'static str,
    pub instructor: &'static str,
}

pub const SLOT_LAYOUT: [SlotCells; SLOTS_PER_PAGE] = [
    SlotCells { name: "C8", level: "D10", instructor: "D12" },
    SlotCells { name: "C26", level: "D28", instructor: "D30" },
    SlotCells { name: "C44", level: "D46", instructor: "D48" },
    SlotCells { name: "C62", level: "D64", instructor: "D66" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot(usize);

impl Slot {
    pub fn index(self) -> usize {
        self.0
    }

    pub fn cells(self) -> SlotCells {
        SLOT_LAYOUT[self.0]
    }
}

/// Whether a new instructor group may continue on a partly filled page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Paging {
    #[default]
    Continuous,
    FreshPagePerInstructor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub slot: Slot,
    pub record: ResolvedRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub placements: Vec<Placement>,
}

impl Page {
    pub fn title(&self) -> String {
        format!("Sheet {}", self.index + 1)
    }

    /// Distinct instructors on this page, in slot order.
    pub fn instructors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for placement in &self.placements {
            let name = placement.record.instructor_name.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Page and slot of the record at `position` in grouped order, continuous paging.
pub fn placement(position: usize) -> (usize, Slot) {
    (position / SLOTS_PER_PAGE, Slot(position % SLOTS_PER_PAGE))
}

/// Groups records by instructor (lexicographic) and fills pages four slots at
/// a time. Records keep their input order inside a group.
pub fn allocate(records: &[ResolvedRecord], paging: Paging) -> Vec<Page> {
    let mut groups: BTreeMap<&str, Vec<&ResolvedRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.instructor_name.as_str())
            .or_default()
            .push(record);
    }

    let mut pages: Vec<Page> = Vec::new();
    let mut slot = 0usize;
    let mut position = 0usize;

    for (_, group) in groups {
        if paging == Paging::FreshPagePerInstructor {
            slot = 0;
        }
        for record in group {
            if slot == 0 {
                pages.push(Page {
                    index: pages.len(),
                    placements: Vec::with_capacity(SLOTS_PER_PAGE),
                });
            }
            if let Some(page) = pages.last_mut() {
                page.placements.push(Placement {
                    slot: Slot(slot),
                    record: record.clone(),
                });
            }
            if paging == Paging::Continuous {
                debug_assert_eq!(placement(position), (pages.len() - 1, Slot(slot)));
            }
            slot = (slot + 1) % SLOTS_PER_PAGE;
            position += 1;
        }
    }

    pages
}
