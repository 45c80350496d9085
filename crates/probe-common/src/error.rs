//! Error types for gridprobe operations.

use thiserror::Error;

/// Result type alias using ProbeError.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Primary error type for probe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    // === Configuration errors (fatal before any I/O) ===
    #[error("Result set must be empty at the start of a probe call")]
    DirtyResultState,

    #[error("No input files were given")]
    NoInputFiles,

    #[error("Cannot open input file: {0}")]
    CannotOpen(String),

    // === Per-file data errors ===
    #[error("Malformed point file line {line}: {reason}")]
    BadPointLine { line: usize, reason: String },

    #[error("Invalid grid definition: {0}")]
    InvalidGrid(String),

    #[error("Failed to unpack message: {0}")]
    UnpackFailed(String),

    #[error("Invalid cube index: {0}")]
    CubeFormat(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Return code used by the legacy probe interface, for the errors that
    /// had one (-1 dirty result state, -2 no input files, -3 cannot open).
    pub fn legacy_code(&self) -> Option<i32> {
        match self {
            ProbeError::DirtyResultState => Some(-1),
            ProbeError::NoInputFiles => Some(-2),
            ProbeError::CannotOpen(_) => Some(-3),
            _ => None,
        }
    }

    /// True for errors that abort the whole probe call rather than the
    /// current file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProbeError::DirtyResultState | ProbeError::NoInputFiles
        )
    }
}
