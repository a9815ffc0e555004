use thiserror::Error;

/// Error type for canvas expansion operations
///
/// This error type covers every way the expansion pipeline can stop
/// without producing a canvas. Some of these are not failures from the
/// caller's point of view; see [`ExpandError::is_silent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// The source image has zero width or height
    ///
    /// There is nothing to place on the canvas, so no canvas is allocated.
    #[error("Source image is empty ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    /// All four expansion amounts are zero
    ///
    /// The result would be a copy of the source, so the pipeline
    /// short-circuits before allocating anything.
    #[error("No expansion requested")]
    NoExpansion,

    /// The expanded canvas cannot be represented
    ///
    /// This error occurs when the new dimensions, or the number of bytes
    /// needed to hold them, overflow.
    #[error("Expanded canvas is too large: {width}x{height} grown by {horizontal}x{vertical}")]
    CanvasTooLarge {
        /// Source width
        width: u32,
        /// Source height
        height: u32,
        /// `left + right`
        horizontal: u64,
        /// `top + bottom`
        vertical: u64,
    },

    /// Processing was cancelled at a checkpoint
    ///
    /// Partial output is discarded.
    #[error("Processing was cancelled")]
    Cancelled,
}

impl ExpandError {
    /// Returns `true` for outcomes that mean "nothing to do" rather than
    /// a failure. A processing job reports none of these as an error.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Self::EmptySource { .. } | Self::NoExpansion | Self::Cancelled
        )
    }
}

/// Error type for background job setup
#[derive(Debug, Error)]
pub enum JobError {
    /// The worker thread could not be started
    #[error("Failed to start the processing worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Error type for aspect-ratio driven expansion
///
/// The `Display` output of each variant is meant to be shown to the user
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmartExpansionError {
    /// The image has zero width or height, so it has no aspect ratio
    #[error("Image is empty, cannot compute an aspect ratio")]
    EmptyImage,

    /// The target ratio could not be parsed
    ///
    /// A ratio is two positive numbers separated by exactly one of
    /// `:`, `.`, `x` or `/`.
    #[error("Invalid target ratio \"{0}\": expected two positive numbers separated by ':', '.', 'x' or '/'")]
    InvalidRatio(String),

    /// Reaching the target ratio would need more than `u32::MAX` pixels
    /// on one axis
    #[error("Target ratio \"{0}\" needs an expansion that does not fit the image size limits")]
    ExpansionTooLarge(String),

    /// The distribution mode could not be parsed
    #[error("Unknown distribution \"{0}\": expected even, start or end")]
    UnknownDistribution(String),
}
