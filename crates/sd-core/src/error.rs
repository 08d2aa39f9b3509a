use crate::line::LineId;
use crate::sector::SectorId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or loading level geometry.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested sector index does not exist.
    #[error("sector not found: {0}")]
    SectorNotFound(SectorId),

    /// The requested line index does not exist.
    #[error("line not found: {0}")]
    LineNotFound(LineId),

    /// A line references a sector that does not exist.
    #[error("line {line} references missing sector {sector}")]
    DanglingSector {
        /// The offending line.
        line: LineId,
        /// The sector index it references.
        sector: SectorId,
    },

    /// A sector's floor is above its ceiling.
    #[error("sector {0} has its floor above its ceiling")]
    InvertedSector(SectorId),

    /// The level file could not be parsed.
    #[error("invalid level data: {0}")]
    Parse(#[from] serde_json::Error),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
