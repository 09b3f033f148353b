use thiserror::Error;

/// Errors that abort a run before any update is sent.
/// Per-row problems are `update::rows::RowError` and never surface here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
