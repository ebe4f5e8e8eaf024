// Domain errors surfaced to callers of the query layer.
// File and parse failures stay in anyhow with context (see sources.rs).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WageError {
    #[error("Unknown wage level: {input} (expected 1-4 or \"Level N\")")]
    UnknownWageLevel { input: String },

    #[error("Invalid county reference row {line}: {reason}")]
    InvalidCountyRow { line: usize, reason: String },

    #[error(
        "County detail over all job roles covers {rows} rows (limit {limit}); pick a job role or use state detail"
    )]
    CountyLimitExceeded { rows: usize, limit: usize },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type WageResult<T> = Result<T, WageError>;
