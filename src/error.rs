use thiserror::Error;

/// Errors surfaced by compression and decompression.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A copy command points before the start of the decoded output.
    #[error(
        "corrupt back-reference in command {command}: distance {distance} (length {length}) with only {available} bytes decoded"
    )]
    CorruptBackReference {
        command: usize,
        distance: usize,
        length: usize,
        available: usize,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Tree-backed output disagreed with a reference computation.
    #[error("verification failed: {0}")]
    Verification(String),
}

pub type Result<T> = std::result::Result<T, Error>;
