use std::path::PathBuf;

use thiserror::Error;

/// A single roster field that could not be turned into a valid value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("current level is empty")]
    EmptyLevel,

    #[error("pass/fail value {0:?} is not 0 or 1")]
    InvalidPassFail(String),

    #[error("student name is empty")]
    EmptyName,
}

/// The roster could not be read from its source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no roster rows for sheet {sheet:?} on {day}")]
    NotFound { sheet: String, day: String },

    #[error("roster database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("roster CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// The output document could not be produced or persisted.
#[derive(Error, Debug)]
pub enum OutputWriteError {
    #[error("cannot read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template {path} is not a valid workbook: {source}")]
    TemplateFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("template {0} has no sheets")]
    EmptyTemplate(PathBuf),

    #[error("cannot write {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode workbook: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One roster row that failed validation, with its 1-based row number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub row: usize,
    pub name: String,
    pub error: ProgressionError,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{} roster row(s) are invalid; nothing was written", .0.len())]
    InvalidRecords(Vec<RecordFailure>),
}
