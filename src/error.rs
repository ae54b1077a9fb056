use thiserror::Error;

/// Errors surfaced by the bank store.
///
/// Duplicate swift codes are deliberately not represented here: inserting an
/// existing code is a no-op, not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("swift code not found")]
    NotFound,

    /// The code is too short to carry an institution prefix. Returned instead
    /// of letting a short code turn into a wildcard prefix match.
    #[error("invalid swift code: {0:?}")]
    InvalidCode(String),

    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

/// Errors from the bulk CSV ingestion step. All of these are fatal to
/// startup seeding.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot open swift code source {path}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The header row is missing, or does not declare a required column.
    #[error("source file is missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("row at line {line} has fewer columns than the header declares")]
    MalformedRow { line: u64 },

    #[error("failed reading source rows")]
    Read(#[from] csv::Error),
}
