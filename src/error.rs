//! Error types shared by the tracker core and the integration layer.

use std::fmt;

/// Why a single detection was refused by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDetectionReason {
    /// One of the coordinates or the score is NaN or infinite.
    NonFinite,
    /// `x_max <= x_min`.
    NonPositiveWidth,
    /// `y_max <= y_min`.
    NonPositiveHeight,
    /// Confidence outside `[0, 1]`.
    ScoreOutOfRange,
}

impl fmt::Display for InvalidDetectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NonFinite => "non-finite coordinate or score",
            Self::NonPositiveWidth => "non-positive width",
            Self::NonPositiveHeight => "non-positive height",
            Self::ScoreOutOfRange => "score outside [0, 1]",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration rejected at construction time.
    #[error("invalid tracker configuration: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// A detection was skipped; the rest of the frame was still processed.
    #[error("invalid detection at index {index}: {reason}")]
    InvalidDetection {
        index: usize,
        reason: InvalidDetectionReason,
    },

    /// The motion model of a track lost positive-definiteness or produced
    /// non-finite values. The track is force-deleted.
    #[error("track {track_id} became numerically degenerate")]
    NumericalDegeneracy { track_id: u64 },

    /// Malformed line in a MOTChallenge text file.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
