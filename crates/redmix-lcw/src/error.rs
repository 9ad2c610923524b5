//! Error types for the LCW codec.

use thiserror::Error;

/// Errors raised by a malformed LCW stream.
///
/// Every variant means the input is not a valid stream for the given output
/// capacity; the decoder never grows its buffer to accommodate it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input ended mid-command or without the end-of-stream marker.
    #[error("truncated LCW stream at input offset {position}")]
    Truncated { position: usize },

    /// A command would write past the end of the output buffer.
    #[error("LCW output overflow: need {needed} bytes, capacity is {capacity}")]
    OutputOverflow { needed: usize, capacity: usize },

    /// A relative copy reaches before the start of the output.
    #[error("LCW back-reference distance {distance} exceeds {written} bytes of output")]
    DistanceTooFar { distance: usize, written: usize },

    /// An absolute copy starts at output that has not been written yet.
    #[error("LCW copy source {source_pos} is not before output cursor {written}")]
    SourceNotWritten { source_pos: usize, written: usize },
}

/// Result type for LCW operations.
pub type Result<T> = std::result::Result<T, Error>;
