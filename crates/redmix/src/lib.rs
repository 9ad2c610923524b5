//! Redmix - Westwood MIX archive and LCW codec library.
//!
//! This crate provides a unified interface to the Redmix crates.
//!
//! # Crates
//!
//! - [`redmix_common`] - Binary reading and filename checksums
//! - [`redmix_lcw`] - LCW ("format 80") compression
//! - [`redmix_mix`] - MIX archives, header decryption and archive registry
//!
//! # Example
//!
//! ```no_run
//! use redmix::prelude::*;
//!
//! let mut registry = ArchiveRegistry::new();
//! registry.mount("CONQUER.MIX")?;
//! registry.mount("LOCAL.MIX")?;
//!
//! if let Some((archive, entry)) = registry.find("MOUSE.SHP") {
//!     let data = archive.read_entry_bytes(&entry)?;
//!     println!("{}: {} bytes", archive.name(), data.len());
//! }
//! # Ok::<(), redmix::Error>(())
//! ```

pub mod codec;
mod error;

pub use redmix_common as common;
pub use redmix_lcw as lcw;
pub use redmix_mix as mix;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use redmix_common::{checksum, checksum_for_lookup, BinaryReader, KeyHash};
    pub use redmix_lcw::{compress, decompress};
    pub use redmix_mix::{
        ArchiveRegistry, ErrorKind, FormatFlags, HeaderLayout, MixArchive, MixEntry, OpenOptions,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
