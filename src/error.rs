use std::io;
use thiserror::Error;

use crate::profile::{Profile, SizeSpec};
use crate::sniff::DetectedType;

/// Errors produced while acquiring, decoding, or converting a source image.
#[derive(Debug, Error)]
pub enum Error {
    /// The input stream failed with something other than end-of-data.
    #[error("failed to read input: {0}")]
    Acquisition(#[source] io::Error),
    /// No bytes were acquired, or no known signature matched them.
    #[error("insufficient input: no recognizable image data was received")]
    InsufficientInput,
    /// The input was recognized, but cannot be used as a raster source.
    #[error("unsupported source format: {0}")]
    UnsupportedFormat(DetectedType),
    /// The input matched a signature but could not be decoded.
    #[error("corrupt {kind} data: {reason}")]
    CorruptData {
        /// The type the data claimed to be.
        kind: DetectedType,
        /// What the decoder rejected.
        reason: String,
    },
    /// A planned size cannot be produced or packed for a profile.
    #[error("cannot plan {size} for {profile}: {reason}")]
    Plan {
        /// The profile whose container was rejected.
        profile: Profile,
        /// The offending size.
        size: SizeSpec,
        /// Why the size was rejected.
        reason: String,
    },
    /// A profile has no producible sizes at all.
    #[error("cannot plan {profile}: {reason}")]
    EmptyPlan {
        /// The profile that was left empty.
        profile: Profile,
        /// Why every size was dropped.
        reason: String,
    },
    /// The resampler rejected a size.
    #[error("failed to resize to {size}: {source}")]
    Resize {
        /// The requested size.
        size: SizeSpec,
        /// What the resampler reported.
        #[source]
        source: io::Error,
    },
    /// A resized image could not be encoded.
    #[error("failed to encode {size} as PNG: {source}")]
    Encode {
        /// The size being encoded.
        size: SizeSpec,
        /// The underlying encoder error.
        #[source]
        source: io::Error,
    },
    /// Serializing or writing an artifact failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
