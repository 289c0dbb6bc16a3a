use std::path::PathBuf;

use uuid::Uuid;

/// Errors surfaced by site-planner operations.
///
/// Validation variants carry the user-facing message shown next to the
/// command that triggered them; the I/O variants wrap the underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("start date {start} is after due date {due}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        due: chrono::NaiveDate,
    },

    #[error("progress must be between 0 and 100, got {0}")]
    InvalidProgress(u8),

    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("task id prefix '{0}' is ambiguous")]
    AmbiguousTaskId(String),

    #[error("employee {0} not found")]
    EmployeeNotFound(Uuid),

    #[error("{kind} '{name}' is still referenced by {tasks} task(s) and {employees} employee(s)")]
    InUse {
        kind: &'static str,
        name: String,
        tasks: usize,
        employees: usize,
    },

    #[error("invalid access key")]
    InvalidAccessKey,

    #[error("read-only session: an access key is required to make changes")]
    ReadOnly,

    #[error("nothing to export: no tasks match")]
    NothingToExport,

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Settings(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
