//! MIX fixture builder shared by the integration tests.

#![allow(dead_code)]

use std::io::Write;

use redmix_common::KeyHash;
use redmix_mix::MixEntry;
use tempfile::NamedTempFile;

/// Files to pack, in the order their payloads are laid out.
pub struct Fixture {
    pub files: Vec<(String, Vec<u8>)>,
    pub key_hash: KeyHash,
    pub digest: Option<[u8; 20]>,
    /// Leave the table in payload order instead of sorting it.
    pub unsorted: bool,
}

impl Fixture {
    pub fn new(files: &[(&str, &[u8])]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(name, data)| (name.to_string(), data.to_vec()))
                .collect(),
            key_hash: KeyHash::Crc32,
            digest: None,
            unsorted: false,
        }
    }

    pub fn entries(&self) -> Vec<MixEntry> {
        let mut offset = 0u32;
        let mut entries: Vec<MixEntry> = self
            .files
            .iter()
            .map(|(name, data)| {
                let entry = MixEntry::new(self.key_hash.key_for(name), offset, data.len() as u32);
                offset += data.len() as u32;
                entry
            })
            .collect();
        if !self.unsorted {
            entries.sort_by_key(|e| e.key);
        }
        entries
    }

    pub fn standard_header(&self) -> Vec<u8> {
        let entries = self.entries();
        let mut out = Vec::new();
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.data_len().to_le_bytes());
        for entry in &entries {
            out.extend_from_slice(&entry.to_bytes());
        }
        out
    }

    pub fn data_len(&self) -> u32 {
        self.files.iter().map(|(_, d)| d.len() as u32).sum()
    }

    pub fn data(&self) -> Vec<u8> {
        let mut out: Vec<u8> = self.files.iter().flat_map(|(_, d)| d.clone()).collect();
        if let Some(digest) = self.digest {
            out.extend_from_slice(&digest);
        }
        out
    }

    pub fn flags(&self) -> u16 {
        u16::from(self.digest.is_some())
    }

    pub fn standard(&self) -> Vec<u8> {
        [self.standard_header(), self.data()].concat()
    }

    pub fn extended(&self) -> Vec<u8> {
        let mut out = vec![0, 0];
        out.extend_from_slice(&self.flags().to_le_bytes());
        out.extend_from_slice(&self.standard_header());
        out.extend_from_slice(&self.data());
        out
    }

    /// Encrypted layout, wrapping `key` for a public key with exponent 1.
    #[cfg(feature = "encryption")]
    pub fn encrypted(&self, key: &redmix_mix::crypto::CipherKey) -> Vec<u8> {
        use redmix_mix::crypto::{padded_len, HeaderCipher};

        let public = identity_public_key();
        let mut out = vec![0, 0];
        out.extend_from_slice(&(self.flags() | 2).to_le_bytes());

        let plain = public.plain_block_size();
        let crypt = public.crypt_block_size();
        for chunk in key.as_bytes().chunks(plain) {
            let start = out.len();
            out.extend_from_slice(chunk);
            out.resize(start + crypt, 0);
        }

        let mut header = self.standard_header();
        header.resize(padded_len(header.len()), 0);
        HeaderCipher::new(key)
            .unwrap()
            .encrypt_in_place(&mut header)
            .unwrap();
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.data());
        out
    }
}

/// Westwood modulus with exponent 1, so key blobs are stored in the clear.
#[cfg(feature = "encryption")]
pub fn identity_public_key() -> redmix_mix::crypto::PublicKey {
    use redmix_mix::crypto::{BigUint, PublicKey};

    PublicKey::westwood()
        .unwrap()
        .with_exponent(BigUint::from(1u32))
}

#[cfg(feature = "encryption")]
pub fn test_cipher_key() -> redmix_mix::crypto::CipherKey {
    let mut bytes = [0u8; 56];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(29).wrapping_add(3);
    }
    redmix_mix::crypto::CipherKey::new(bytes)
}

pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// Five small files used by most tests.
pub fn sample() -> Fixture {
    Fixture::new(&[
        ("RULES.INI", b"[General]\nSpeed=5\n"),
        ("MOUSE.SHP", &[1, 2, 3, 4, 5, 6, 7, 8]),
        ("TEMPERAT.PAL", &[0x3F; 48]),
        ("SNOW.PAL", &[0x10; 48]),
        ("CONQUER.ENG", b"Hello"),
    ])
}
