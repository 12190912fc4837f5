use thiserror::Error;

/// Failures that stop the smoke test before it can report an outcome.
///
/// Transport failures are not listed here: they are printed and turned into an exit code.
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to initialize logger: {0}")]
    Logger(String),
}
