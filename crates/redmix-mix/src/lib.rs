//! MIX archive reader for Westwood game files.
//!
//! A MIX file is a flat container: a small header, a table of 12-byte
//! records keyed by filename hash, then the data region. Three header layouts
//! exist:
//!
//! - Standard: `count: u16`, `total_size: u32`, `count` records.
//! - Extended: `00 00 flags` then a standard header. Flag bit 0 marks a
//!   trailing SHA-1 digest.
//! - Extended and encrypted (flag bit 1): an RSA-wrapped Blowfish key
//!   followed by the standard header encrypted with it (`encryption`
//!   feature).
//!
//! The record table is sorted by **signed** key and searched the same way.
//!
//! # Example
//!
//! ```no_run
//! use redmix_mix::MixArchive;
//!
//! let archive = MixArchive::open("LOCAL.MIX")?;
//!
//! for entry in archive.iter() {
//!     println!("{:08X}: {} bytes", entry.unsigned_key(), entry.data_size);
//! }
//!
//! if archive.contains("RULES.INI") {
//!     let rules = archive.read("RULES.INI")?;
//! }
//! # Ok::<(), redmix_mix::Error>(())
//! ```

mod archive;
mod entry;
mod error;
mod header;
mod options;
mod registry;

#[cfg(feature = "encryption")]
pub mod crypto;

pub use archive::{MixArchive, DIGEST_SIZE};
pub use entry::{FormatFlags, MixEntry};
pub use error::{Error, ErrorKind, Result};
pub use header::HeaderLayout;
pub use options::OpenOptions;
pub use redmix_common::KeyHash;
pub use registry::ArchiveRegistry;

/// Largest entry count accepted when opening an archive.
pub const MAX_ENTRY_COUNT: usize = 10_000;
