//! Common utilities for redmix.
//!
//! This crate provides the foundational pieces shared by the other redmix crates:
//!
//! - [`BinaryReader`] - Little-endian field reading from byte slices
//! - [`checksum`] - Filename checksums used as MIX lookup keys

mod error;
mod reader;

pub mod checksum;

pub use checksum::{
    checksum, checksum_for_lookup, rotate_add, rotate_add_for_lookup, Checksum, KeyHash,
};
pub use error::{Error, Result};
pub use reader::BinaryReader;
