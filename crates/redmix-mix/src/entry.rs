//! Index table records.

use redmix_common::BinaryReader;

use crate::Result;

/// One file record inside a MIX container.
///
/// Archives store no filenames; `key` is the hash of the uppercased name.
/// The table is ordered by **signed** comparison of `key`, which is why it
/// is an `i32` rather than the `u32` the hash functions return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixEntry {
    /// Filename hash, compared as signed.
    pub key: i32,
    /// Offset from the start of the data region (not the file).
    pub data_offset: u32,
    /// Length of the raw, possibly compressed, payload.
    pub data_size: u32,
}

impl MixEntry {
    /// Size of one on-disk record.
    pub const SIZE: usize = 12;

    /// Create an entry.
    pub const fn new(key: i32, data_offset: u32, data_size: u32) -> Self {
        Self {
            key,
            data_offset,
            data_size,
        }
    }

    /// Decode one record field by field.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            key: reader.read_i32()?,
            data_offset: reader.read_u32()?,
            data_size: reader.read_u32()?,
        })
    }

    /// Encode as the 12-byte on-disk record.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.key.to_le_bytes());
        out[4..8].copy_from_slice(&self.data_offset.to_le_bytes());
        out[8..12].copy_from_slice(&self.data_size.to_le_bytes());
        out
    }

    /// The key as the unsigned value the hash functions produce.
    #[inline]
    pub fn unsigned_key(&self) -> u32 {
        self.key as u32
    }

    /// End of the payload relative to the data region.
    #[inline]
    pub fn data_end(&self) -> u64 {
        self.data_offset as u64 + self.data_size as u64
    }
}

/// Flags carried by the extended header prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FormatFlags {
    /// The file starts with the `00 00 flags` prefix.
    pub is_extended: bool,
    /// The standard header is Blowfish-encrypted.
    pub is_encrypted: bool,
    /// A 20-byte SHA-1 digest follows the data region.
    pub has_digest: bool,
}

impl FormatFlags {
    /// Bit 0 of the extended flags word.
    pub const DIGEST: u16 = 0x0001;
    /// Bit 1 of the extended flags word.
    pub const ENCRYPTED: u16 = 0x0002;

    /// Flags for a standard, prefix-less header.
    pub const STANDARD: Self = Self {
        is_extended: false,
        is_encrypted: false,
        has_digest: false,
    };

    /// Decode the extended flags word. Unknown bits are ignored.
    pub fn from_extended(bits: u16) -> Self {
        Self {
            is_extended: true,
            is_encrypted: bits & Self::ENCRYPTED != 0,
            has_digest: bits & Self::DIGEST != 0,
        }
    }

    /// Encode back to the extended flags word.
    pub fn bits(&self) -> u16 {
        let mut bits = 0;
        if self.has_digest {
            bits |= Self::DIGEST;
        }
        if self.is_encrypted {
            bits |= Self::ENCRYPTED;
        }
        bits
    }
}
