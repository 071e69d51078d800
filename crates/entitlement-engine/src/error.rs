use shared_types::UnknownProgram;
use thiserror::Error;

/// Genuine failures inside the engine
///
/// Business outcomes (ineligible, not applicable, no data) are never errors.
/// The composer converts every `EngineError` into a response warning so one
/// program's failure never blocks the others.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid parcel input: {0}")]
    InvalidParcel(String),

    #[error("Unrecognized zoning code: {0}")]
    UnrecognizedZone(String),

    #[error("Lookup unavailable: {0}")]
    LookupUnavailable(String),

    #[error("Scenario '{scenario}' violates invariant: {reason}")]
    InvariantViolation { scenario: String, reason: String },

    #[error(transparent)]
    UnknownProgram(#[from] UnknownProgram),
}

pub type Result<T> = std::result::Result<T, EngineError>;
