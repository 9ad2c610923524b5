//! Open-time configuration.

use std::path::Path;

use redmix_common::KeyHash;

#[cfg(feature = "encryption")]
use crate::crypto::PublicKey;
use crate::{MixArchive, Result};

/// Settings used when opening a [`MixArchive`].
///
/// # Example
///
/// ```no_run
/// use redmix_mix::{KeyHash, OpenOptions};
///
/// let archive = OpenOptions::new()
///     .key_hash(KeyHash::RotateAdd)
///     .memory_map(true)
///     .open("CONQUER.MIX")?;
/// # Ok::<(), redmix_mix::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    key_hash: KeyHash,
    memory_map: bool,
    #[cfg(feature = "encryption")]
    public_key: Option<PublicKey>,
}

impl OpenOptions {
    /// Default settings: CRC keys, file-backed reads, Westwood public key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filename hash the archive's keys were built with.
    pub fn key_hash(mut self, key_hash: KeyHash) -> Self {
        self.key_hash = key_hash;
        self
    }

    /// Back the archive with a read-only memory map.
    pub fn memory_map(mut self, enabled: bool) -> Self {
        self.memory_map = enabled;
        self
    }

    /// Public key for unwrapping encrypted headers.
    #[cfg(feature = "encryption")]
    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    /// Open an archive with these settings.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<MixArchive> {
        MixArchive::open_with(path, self)
    }

    pub(crate) fn hash(&self) -> KeyHash {
        self.key_hash
    }

    pub(crate) fn mapped(&self) -> bool {
        self.memory_map
    }

    #[cfg(feature = "encryption")]
    pub(crate) fn public_key_override(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }
}
