use thiserror::Error;

/// Faults raised by the report pipeline itself, as opposed to I/O or CSV
/// parse failures which are wrapped with `anyhow` context where they occur.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Column '{0}' not found in header")]
    MissingColumn(String),
    #[error("Row {line} has {found} field(s) but column '{column}' is at position {position}")]
    ShortRow {
        line: usize,
        column: String,
        position: usize,
        found: usize,
    },
    #[error("Row {line} column '{column}': '{value}' is not an integer")]
    InvalidInteger {
        line: usize,
        column: String,
        value: String,
    },
    #[error("Expected {expected} distinct team(s) but found {found}")]
    UnexpectedTeamCount { expected: usize, found: usize },
    #[error("Shooting totals for '{country}' exceed the supported integer range")]
    TotalOverflow { country: String },
}
