//! Header detection and index table parsing.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use redmix_common::BinaryReader;
use tracing::{debug, warn};

use crate::entry::{FormatFlags, MixEntry};
use crate::options::OpenOptions;
use crate::{Error, Result, MAX_ENTRY_COUNT};

/// Size of `count: u16` plus `total_size: u32`.
pub(crate) const STANDARD_HEADER_SIZE: usize = 6;

/// Size of the `00 00 flags` prefix.
pub(crate) const EXTENDED_PREFIX_SIZE: usize = 4;

/// Which header variant an archive uses. Resolved once during open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderLayout {
    /// `count`, `total_size`, then the table.
    Standard,
    /// `00 00 flags` prefix followed by a plain standard header.
    Extended,
    /// `00 00 flags` prefix, key blob, then an encrypted standard header.
    ExtendedEncrypted,
}

impl HeaderLayout {
    /// Short human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            HeaderLayout::Standard => "standard",
            HeaderLayout::Extended => "extended",
            HeaderLayout::ExtendedEncrypted => "extended+encrypted",
        }
    }
}

/// A fully parsed, sorted index.
#[derive(Debug)]
pub(crate) struct IndexTable {
    pub layout: HeaderLayout,
    pub flags: FormatFlags,
    pub total_data_size: u32,
    pub entries: Vec<MixEntry>,
    pub data_region_offset: u64,
}

/// Read the header from the start of `reader`.
pub(crate) fn read_index<R: Read>(reader: &mut R, options: &OpenOptions) -> Result<IndexTable> {
    let first = reader.read_u16::<LittleEndian>()?;

    let (layout, flags) = if first == 0 {
        let bits = reader.read_u16::<LittleEndian>()?;
        let flags = FormatFlags::from_extended(bits);
        if bits & !(FormatFlags::DIGEST | FormatFlags::ENCRYPTED) != 0 {
            debug!(bits, "ignoring unknown extended header flags");
        }
        let layout = if flags.is_encrypted {
            HeaderLayout::ExtendedEncrypted
        } else {
            HeaderLayout::Extended
        };
        (layout, flags)
    } else {
        (HeaderLayout::Standard, FormatFlags::STANDARD)
    };

    let (total_data_size, mut entries, header_len) = match layout {
        HeaderLayout::Standard => {
            let total = reader.read_u32::<LittleEndian>()?;
            let count = validate_count(first)?;
            let entries = read_entries(reader, count)?;
            (total, entries, STANDARD_HEADER_SIZE + entries_len(count))
        }
        HeaderLayout::Extended => {
            let mut header = [0u8; STANDARD_HEADER_SIZE];
            reader.read_exact(&mut header)?;
            let mut fields = BinaryReader::new(&header);
            let count = validate_count(fields.read_u16()?)?;
            let total = fields.read_u32()?;
            let entries = read_entries(reader, count)?;
            let len = EXTENDED_PREFIX_SIZE + STANDARD_HEADER_SIZE + entries_len(entries.len());
            (total, entries, len)
        }
        HeaderLayout::ExtendedEncrypted => {
            let (total, entries, len) = read_encrypted(reader, options)?;
            (total, entries, EXTENDED_PREFIX_SIZE + len)
        }
    };

    if sort_entries(&mut entries) {
        warn!(
            count = entries.len(),
            "entry table not in signed key order, re-sorted"
        );
    }

    Ok(IndexTable {
        layout,
        flags,
        total_data_size,
        entries,
        data_region_offset: header_len as u64,
    })
}

/// Reject counts outside `1..=MAX_ENTRY_COUNT` before allocating anything.
pub(crate) fn validate_count(count: u16) -> Result<usize> {
    if count == 0 || count as usize > MAX_ENTRY_COUNT {
        return Err(Error::InvalidEntryCount(count));
    }
    Ok(count as usize)
}

#[inline]
fn entries_len(count: usize) -> usize {
    count * MixEntry::SIZE
}

fn read_entries<R: Read>(reader: &mut R, count: usize) -> Result<Vec<MixEntry>> {
    let mut table = vec![0u8; entries_len(count)];
    reader.read_exact(&mut table)?;
    parse_entries(&table, count)
}

pub(crate) fn parse_entries(table: &[u8], count: usize) -> Result<Vec<MixEntry>> {
    let mut fields = BinaryReader::new(table);
    (0..count).map(|_| MixEntry::read(&mut fields)).collect()
}

/// Sort by signed key if needed. Returns whether the table was out of order.
///
/// The comparison is `i32` order: a key of `0x8000_0000` sorts before `0`.
pub(crate) fn sort_entries(entries: &mut [MixEntry]) -> bool {
    if entries.windows(2).all(|pair| pair[0].key <= pair[1].key) {
        return false;
    }
    entries.sort_by_key(|entry| entry.key);
    true
}

#[cfg(feature = "encryption")]
fn read_encrypted<R: Read>(
    reader: &mut R,
    options: &OpenOptions,
) -> Result<(u32, Vec<MixEntry>, usize)> {
    use crate::crypto::{padded_len, recover_symmetric_key, CipherKey, HeaderCipher, PublicKey};

    let public_key = match options.public_key_override() {
        Some(key) => key.clone(),
        None => PublicKey::westwood()?,
    };

    let mut blob = vec![0u8; public_key.blob_len(CipherKey::LEN)];
    reader.read_exact(&mut blob)?;
    let cipher = HeaderCipher::new(&recover_symmetric_key(&blob, &public_key)?)?;

    // The first block is enough to learn the count.
    let mut first = [0u8; 8];
    reader.read_exact(&mut first)?;
    cipher.decrypt_block(&mut first);
    let mut fields = BinaryReader::new(&first);
    let count = validate_count(fields.read_u16()?)?;
    let total = fields.read_u32()?;

    let padded = padded_len(STANDARD_HEADER_SIZE + entries_len(count));
    let mut rest = vec![0u8; padded - first.len()];
    reader.read_exact(&mut rest)?;
    cipher.decrypt_in_place(&mut rest)?;

    let mut table = Vec::with_capacity(padded - STANDARD_HEADER_SIZE);
    table.extend_from_slice(fields.remaining_bytes());
    table.extend_from_slice(&rest);
    let entries = parse_entries(&table, count)?;

    debug!(count, blob_len = blob.len(), "decrypted MIX header");
    Ok((total, entries, blob.len() + padded))
}

#[cfg(not(feature = "encryption"))]
fn read_encrypted<R: Read>(
    _reader: &mut R,
    _options: &OpenOptions,
) -> Result<(u32, Vec<MixEntry>, usize)> {
    Err(Error::EncryptedArchiveUnsupported)
}
