//! Crate-wide error type.

use thiserror::Error;

/// Errors produced by the EDR processing core.
///
/// Every error is fatal to the observation being processed (see spec §7):
/// there is no retry path, and a caller that receives one should abort the
/// current observation and release its resources.
#[derive(Debug, Error)]
pub enum Error {
    /// A 4-character mode code did not match any known SS/RO entry.
    #[error("unknown mode code: {0:?}")]
    UnknownMode(String),

    /// The auxiliary file's size was not a multiple of 267 bytes, or a
    /// record failed validation (e.g. `EPHEMERIS_TIME` was NaN).
    #[error("corrupt auxiliary data: {0}")]
    CorruptAuxiliary(String),

    /// The science stream ended mid-record.
    #[error("truncated science stream at record {record_index}: expected {expected} bytes, got {got}")]
    TruncatedScienceStream {
        record_index: usize,
        expected: usize,
        got: usize,
    },

    /// The echo payload length did not match `3600 * bits_per_sample / 8`.
    #[error("malformed echo payload: expected {expected} bytes for {bits_per_sample}-bit samples, got {got}")]
    MalformedEchoPayload {
        expected: usize,
        bits_per_sample: u8,
        got: usize,
    },

    /// The requested calibration chirp file does not exist on disk.
    #[error("missing calibration file: {0}")]
    MissingCalibrationFile(String),

    /// An unrecognized chirp mode was requested.
    #[error("unsupported chirp mode: {0:?}")]
    UnsupportedChirpMode(String),

    /// `filter_type = inverse` was requested; only the matched filter is implemented.
    #[error("unsupported filter type: {0:?}")]
    UnsupportedFilterType(String),

    /// Wraps an underlying I/O failure.
    #[error("I/O failure: {0}")]
    IOFailure(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
