use sd_core::{CoreError, LineId, SectorId};

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised outside the per-tic path: construction, validation, and
/// persistence. Ticking itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Geometry could not be built or restored.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A raw behavior number does not name a known behavior.
    #[error("unknown {family} behavior: {value}")]
    UnknownBehavior {
        /// The behavior family being decoded.
        family: &'static str,
        /// The rejected raw value.
        value: i32,
    },

    /// An activation parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested sector index does not exist.
    #[error("sector not found: {0}")]
    SectorNotFound(SectorId),

    /// The requested line index does not exist.
    #[error("line not found: {0}")]
    LineNotFound(LineId),
}
