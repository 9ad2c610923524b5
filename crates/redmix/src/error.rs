//! Unified error for callers using more than one Redmix crate.

use thiserror::Error;

/// Any error from the Redmix crates.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Common(#[from] redmix_common::Error),

    #[error(transparent)]
    Lcw(#[from] redmix_lcw::Error),

    #[error(transparent)]
    Mix(#[from] redmix_mix::Error),
}

impl Error {
    /// Category of the error in MIX terms.
    pub fn kind(&self) -> redmix_mix::ErrorKind {
        match self {
            Error::Common(_) | Error::Lcw(_) => redmix_mix::ErrorKind::Format,
            Error::Mix(e) => e.kind(),
        }
    }
}

/// Result type for the facade.
pub type Result<T> = std::result::Result<T, Error>;
