use std::path::{Path, PathBuf};

use sqlx::PgPool;
use tracing::info;

use crate::db;
use crate::error::FetchError;
use crate::models::{Day, RosterRow};

/// Where roster rows come from.
pub enum RosterSource {
    Database(PgPool),
    Csv(PathBuf),
}

impl RosterSource {
    pub async fn fetch_rows(&self, sheet_name: &str, day: Day) -> Result<Vec<RosterRow>, FetchError> {
        let rows = match self {
            RosterSource::Database(pool) => db::fetch_rows(pool, sheet_name, day).await?,
            RosterSource::Csv(path) => {
                let rows = read_csv_rows(path)?;
                if rows.is_empty() {
                    return Err(FetchError::NotFound {
                        sheet: path.display().to_string(),
                        day: day.to_string(),
                    });
                }
                rows
            }
        };
        info!(sheet = sheet_name, %day, rows = rows.len(), "roster fetched");
        Ok(rows)
    }
}

/// Reads a roster export with `Name`, `Current Level`, `Pass/Fail`, `Age` and
/// `Monitor` columns. Cells are kept as text.
pub fn read_csv_rows(path: &Path) -> Result<Vec<RosterRow>, FetchError> {
    let csv_error = |source| FetchError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_error)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<RosterRow>() {
        rows.push(result.map_err(csv_error)?);
    }
    Ok(rows)
}
