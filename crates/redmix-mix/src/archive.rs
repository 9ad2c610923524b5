//! MIX archive handle.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use parking_lot::Mutex;
use redmix_common::KeyHash;
use tracing::{debug, warn};

use crate::entry::{FormatFlags, MixEntry};
use crate::header::{self, HeaderLayout};
use crate::options::OpenOptions;
use crate::{Error, Result};

/// Length of the SHA-1 digest that may trail the data region.
pub const DIGEST_SIZE: usize = 20;

/// Where entry bytes are read from.
enum Backing {
    /// Seek and read under a lock.
    File(Mutex<File>),
    /// Slice a read-only mapping.
    Mapped(Mmap),
}

/// An open MIX archive.
///
/// The entry table is parsed once and never changes. Reads are safe from
/// several threads: file-backed handles serialize seek+read behind a mutex,
/// mapped handles need no locking.
pub struct MixArchive {
    path: PathBuf,
    name: String,
    backing: Backing,
    file_len: u64,
    layout: HeaderLayout,
    flags: FormatFlags,
    entries: Vec<MixEntry>,
    data_region_offset: u64,
    total_data_size: u32,
    key_hash: KeyHash,
}

impl MixArchive {
    /// Open an archive with default [`OpenOptions`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    /// Open an archive with explicit options.
    ///
    /// All or nothing: any error leaves no handle behind.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        let index = header::read_index(&mut BufReader::new(&file), options)?;

        let data_end = index.data_region_offset + index.total_data_size as u64;
        if data_end > file_len {
            warn!(
                path = %path.display(),
                declared = index.total_data_size,
                file_len,
                "declared data size runs past end of file"
            );
        }

        let backing = if options.mapped() {
            Backing::Mapped(unsafe { Mmap::map(&file)? })
        } else {
            Backing::File(Mutex::new(file))
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        debug!(
            archive = %name,
            layout = index.layout.label(),
            entries = index.entries.len(),
            data_offset = index.data_region_offset,
            key_hash = options.hash().label(),
            "opened MIX archive"
        );

        Ok(Self {
            path: path.to_path_buf(),
            name,
            backing,
            file_len,
            layout: index.layout,
            flags: index.flags,
            entries: index.entries,
            data_region_offset: index.data_region_offset,
            total_data_size: index.total_data_size,
            key_hash: options.hash(),
        })
    }

    /// Path the archive was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the archive.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// All entries in signed key order.
    #[inline]
    pub fn entries(&self) -> &[MixEntry] {
        &self.entries
    }

    /// Iterate over entries in signed key order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &MixEntry> + '_ {
        self.entries.iter()
    }

    /// Get entry by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<MixEntry> {
        self.entries.get(index).copied()
    }

    #[inline]
    pub fn layout(&self) -> HeaderLayout {
        self.layout
    }

    #[inline]
    pub fn format_flags(&self) -> FormatFlags {
        self.flags
    }

    /// File offset where the data region begins.
    #[inline]
    pub fn data_region_offset(&self) -> u64 {
        self.data_region_offset
    }

    /// Data size declared by the header. Not used for bounds checks.
    #[inline]
    pub fn total_data_size(&self) -> u32 {
        self.total_data_size
    }

    /// Filename hash used for name lookups.
    #[inline]
    pub fn key_hash(&self) -> KeyHash {
        self.key_hash
    }

    /// Whether the handle reads through a memory map.
    #[inline]
    pub fn is_memory_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    /// Binary search for a key using signed comparison.
    pub fn find(&self, key: i32) -> Option<MixEntry> {
        self.entries
            .binary_search_by(|entry| entry.key.cmp(&key))
            .ok()
            .map(|index| self.entries[index])
    }

    /// Find an entry by filename.
    pub fn find_name(&self, name: &str) -> Option<MixEntry> {
        self.find(self.key_hash.key_for(name))
    }

    /// Whether an entry with this filename exists.
    pub fn contains(&self, name: &str) -> bool {
        self.find_name(name).is_some()
    }

    /// Read an entry's raw bytes.
    ///
    /// Does not decompress. A range past the end of the file fails this call
    /// with an `UnexpectedEof` I/O error; the handle stays usable.
    pub fn read_entry_bytes(&self, entry: &MixEntry) -> Result<Vec<u8>> {
        self.read_at(
            self.data_region_offset + entry.data_offset as u64,
            entry.data_size as u64,
        )
    }

    /// Read an entry by filename.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .find_name(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        self.read_entry_bytes(&entry)
    }

    /// Read an entry and LCW-decompress it into at most `capacity` bytes.
    pub fn read_decompressed(&self, entry: &MixEntry, capacity: usize) -> Result<Vec<u8>> {
        let raw = self.read_entry_bytes(entry)?;
        Ok(redmix_lcw::decompress(&raw, capacity)?)
    }

    /// Borrow an entry's bytes straight from the memory map.
    ///
    /// `None` for file-backed handles or out-of-range entries.
    pub fn entry_slice(&self, entry: &MixEntry) -> Option<&[u8]> {
        let Backing::Mapped(map) = &self.backing else {
            return None;
        };
        let start = usize::try_from(self.data_region_offset + entry.data_offset as u64).ok()?;
        let end = start.checked_add(entry.data_size as usize)?;
        map.get(start..end)
    }

    /// Read the SHA-1 digest stored after the data region, if flagged.
    ///
    /// The digest is returned as stored and is not verified.
    pub fn read_digest(&self) -> Result<Option<[u8; DIGEST_SIZE]>> {
        if !self.flags.has_digest {
            return Ok(None);
        }
        let offset = self.data_region_offset + self.total_data_size as u64;
        let bytes = self.read_at(offset, DIGEST_SIZE as u64)?;
        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&bytes);
        Ok(Some(digest))
    }

    /// Read many entries in parallel.
    #[cfg(feature = "parallel")]
    pub fn read_entries_parallel(&self, entries: &[MixEntry]) -> Vec<Result<Vec<u8>>> {
        use rayon::prelude::*;

        entries
            .par_iter()
            .map(|entry| self.read_entry_bytes(entry))
            .collect()
    }

    fn read_at(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let end = offset + len;
        if end > self.file_len {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "range {}..{} past end of {} ({} bytes)",
                    offset, end, self.name, self.file_len
                ),
            )));
        }

        match &self.backing {
            Backing::Mapped(map) => {
                // The map may be shorter than file_len if the file shrank.
                map.get(offset as usize..end as usize)
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| Error::Io(io::ErrorKind::UnexpectedEof.into()))
            }
            Backing::File(file) => {
                let mut buf = vec![0u8; len as usize];
                let mut file = file.lock();
                file.seek(SeekFrom::Start(offset))?;
                file.read_exact(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for MixArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixArchive")
            .field("path", &self.path)
            .field("layout", &self.layout)
            .field("entries", &self.entries.len())
            .field("data_region_offset", &self.data_region_offset)
            .field("memory_mapped", &self.is_memory_mapped())
            .finish()
    }
}
