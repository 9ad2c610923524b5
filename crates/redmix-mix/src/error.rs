//! Error types for the MIX crate.

use thiserror::Error;

/// Errors that can occur when working with MIX archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error, including short reads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] redmix_common::Error),

    /// Malformed LCW payload.
    #[error("LCW error: {0}")]
    Lcw(#[from] redmix_lcw::Error),

    /// Entry count outside the accepted range.
    #[error("invalid entry count {0}: expected 1..={max}", max = crate::MAX_ENTRY_COUNT)]
    InvalidEntryCount(u16),

    /// Header is encrypted and this build cannot decrypt it.
    #[error("encrypted MIX headers are not supported by this build")]
    EncryptedArchiveUnsupported,

    /// The embedded key blob did not yield a plausible symmetric key.
    #[error("key recovery failed: {0}")]
    KeyRecovery(String),

    /// Caller passed malformed input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No entry matches the requested name.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The file could not be read.
    Io,
    /// The bytes are not a valid archive or payload.
    Format,
    /// Valid but unsupported input.
    Unsupported,
    /// Asymmetric key recovery produced implausible material.
    KeyRecovery,
    /// Caller error.
    InvalidInput,
    /// Name lookup missed.
    NotFound,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Common(_) | Error::Lcw(_) | Error::InvalidEntryCount(_) => ErrorKind::Format,
            Error::EncryptedArchiveUnsupported => ErrorKind::Unsupported,
            Error::KeyRecovery(_) => ErrorKind::KeyRecovery,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::EntryNotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Result type for MIX operations.
pub type Result<T> = std::result::Result<T, Error>;
