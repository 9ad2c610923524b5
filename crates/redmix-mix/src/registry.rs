//! A set of mounted archives searched together.

use std::path::Path;

use redmix_common::KeyHash;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::entry::MixEntry;
use crate::options::OpenOptions;
use crate::{Error, MixArchive, Result};

/// Mounted archives in search order, plus an optional key → name map for
/// diagnostics.
///
/// Owned by whoever loads assets; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct ArchiveRegistry {
    archives: Vec<MixArchive>,
    names: FxHashMap<(KeyHash, i32), String>,
}

impl ArchiveRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and mount an archive with default options.
    pub fn mount<P: AsRef<Path>>(&mut self, path: P) -> Result<&MixArchive> {
        self.mount_with(path, &OpenOptions::default())
    }

    /// Open and mount an archive.
    pub fn mount_with<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: &OpenOptions,
    ) -> Result<&MixArchive> {
        let archive = options.open(path)?;
        Ok(self.insert(archive))
    }

    /// Mount an already opened archive. Later mounts are searched last.
    pub fn insert(&mut self, archive: MixArchive) -> &MixArchive {
        self.archives.push(archive);
        &self.archives[self.archives.len() - 1]
    }

    /// Unmount every archive opened from `path`. Returns whether any was.
    pub fn unmount<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        let before = self.archives.len();
        self.archives.retain(|archive| archive.path() != path);
        self.archives.len() != before
    }

    /// Number of mounted archives.
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Mounted archives in search order.
    pub fn archives(&self) -> &[MixArchive] {
        &self.archives
    }

    /// Find the first archive holding `name`.
    ///
    /// Each archive hashes the name with its own [`KeyHash`].
    pub fn find(&self, name: &str) -> Option<(&MixArchive, MixEntry)> {
        let hit = self
            .archives
            .iter()
            .find_map(|archive| archive.find_name(name).map(|entry| (archive, entry)));
        if let Some((archive, entry)) = &hit {
            trace!(name, archive = archive.name(), key = entry.key, "registry hit");
        }
        hit
    }

    /// Whether any mounted archive holds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Read `name` from the first archive holding it.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let (archive, entry) = self
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        archive.read_entry_bytes(&entry)
    }

    /// Remember a filename so its key can be shown by name later.
    pub fn register_name(&mut self, name: &str) {
        let upper = name.to_ascii_uppercase();
        for kind in KeyHash::ALL {
            self.names
                .insert((kind, kind.key_for(&upper)), upper.clone());
        }
    }

    /// Name previously registered for `key` under `key_hash`.
    pub fn lookup_name(&self, key_hash: KeyHash, key: i32) -> Option<&str> {
        self.names.get(&(key_hash, key)).map(String::as_str)
    }

    /// Registered name for an entry of `archive`.
    pub fn name_of(&self, archive: &MixArchive, entry: &MixEntry) -> Option<&str> {
        self.lookup_name(archive.key_hash(), entry.key)
    }
}
