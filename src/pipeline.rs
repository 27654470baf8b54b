use tracing::{debug, warn};

use crate::error::{PipelineError, ProgressionError, RecordFailure};
use crate::models::{ResolvedRecord, RosterRow, StudentRecord};
use crate::progression;

pub fn to_student(row: &RosterRow) -> Result<StudentRecord, ProgressionError> {
    let name = row.name.trim();
    if name.is_empty() {
        return Err(ProgressionError::EmptyName);
    }
    let current_level = progression::strip_edit_marker(&row.current_level);
    if current_level.is_empty() {
        return Err(ProgressionError::EmptyLevel);
    }

    Ok(StudentRecord {
        name: name.to_string(),
        current_level: current_level.to_string(),
        outcome: progression::coerce_pass_fail(&row.pass_fail)?,
        age: progression::coerce_age(&row.age),
        monitor: row.monitor.clone(),
    })
}

pub fn resolve_student(student: StudentRecord) -> ResolvedRecord {
    let next_level = progression::next_level(&student.current_level, student.outcome, student.age);
    let instructor_name = progression::extract_instructor_name(&student.monitor);
    ResolvedRecord {
        student,
        instructor_name,
        next_level,
    }
}

/// Resolves every row. Any invalid row fails the whole batch, after all rows
/// have been checked so the operator sees every problem at once.
pub fn resolve_rows(rows: &[RosterRow]) -> Result<Vec<ResolvedRecord>, PipelineError> {
    let mut resolved = Vec::with_capacity(rows.len());
    let mut failures = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match to_student(row) {
            Ok(student) => {
                let record = resolve_student(student);
                debug!(
                    name = %record.student.name,
                    from = %record.student.current_level,
                    to = %record.next_level,
                    "resolved"
                );
                resolved.push(record);
            }
            Err(error) => {
                warn!(row = index + 1, name = %row.name, %error, "invalid roster row");
                failures.push(RecordFailure {
                    row: index + 1,
                    name: row.name.clone(),
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(resolved)
    } else {
        Err(PipelineError::InvalidRecords(failures))
    }
}
