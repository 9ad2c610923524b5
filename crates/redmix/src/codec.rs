//! Flat entry points for code that only needs hashing and LCW.
//!
//! These mirror the narrow surface game code consumes: hash raw bytes, hash a
//! filename, decompress into a fixed buffer, compress a buffer.

use redmix_common::KeyHash;

use crate::Result;

/// Hash raw bytes with the lookup checksum.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    redmix_common::checksum(data)
}

/// Hash a filename, uppercasing it first.
#[inline]
pub fn hash_name(name: &str) -> u32 {
    redmix_common::checksum_for_lookup(name)
}

/// Hash a filename with a chosen algorithm.
#[inline]
pub fn hash_name_with(name: &str, key_hash: KeyHash) -> u32 {
    key_hash.key_for(name) as u32
}

/// Decompress `src` into `dst`, returning the number of bytes written.
pub fn decompress(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    Ok(redmix_lcw::decompress_into(src, dst)?)
}

/// Compress `src` into a new buffer.
pub fn compress(src: &[u8]) -> Vec<u8> {
    redmix_lcw::compress(src)
}
