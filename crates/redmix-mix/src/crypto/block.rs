//! Blowfish in ECB mode over independent 8-byte blocks.

use std::fmt;

use blowfish::Blowfish;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::{Error, Result};

/// Blowfish block size.
pub const BLOCK_SIZE: usize = 8;

/// A recovered header key.
///
/// Lives only for the duration of `open`; archives never retain it.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherKey([u8; CipherKey::LEN]);

impl CipherKey {
    /// Length of a MIX header key.
    pub const LEN: usize = 56;

    /// Wrap raw key bytes.
    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Copy a key out of a slice of exactly [`CipherKey::LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; Self::LEN] = bytes.try_into().map_err(|_| {
            Error::InvalidInput(format!(
                "cipher key must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Raw key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(..)")
    }
}

/// Keyed Blowfish instance used to decrypt a MIX header.
///
/// Standard big-endian Blowfish with no chaining between blocks.
#[derive(Clone)]
pub struct HeaderCipher {
    inner: Blowfish,
}

impl HeaderCipher {
    /// Key the cipher from a recovered header key.
    pub fn new(key: &CipherKey) -> Result<Self> {
        Self::with_key_bytes(key.as_bytes())
    }

    /// Key the cipher from 4 to 56 raw bytes.
    pub fn with_key_bytes(key: &[u8]) -> Result<Self> {
        let inner = <Blowfish as KeyInit>::new_from_slice(key).map_err(|_| {
            Error::InvalidInput(format!(
                "blowfish key must be 4..=56 bytes, got {}",
                key.len()
            ))
        })?;
        Ok(Self { inner })
    }

    /// Decrypt one block in place.
    #[inline]
    pub fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        self.inner.decrypt_block(GenericArray::from_mut_slice(block));
    }

    /// Encrypt one block in place.
    #[inline]
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        self.inner.encrypt_block(GenericArray::from_mut_slice(block));
    }

    /// Decrypt a whole number of blocks in place.
    pub fn decrypt_in_place(&self, data: &mut [u8]) -> Result<()> {
        check_len(data)?;
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            self.inner.decrypt_block(GenericArray::from_mut_slice(chunk));
        }
        Ok(())
    }

    /// Encrypt a whole number of blocks in place.
    pub fn encrypt_in_place(&self, data: &mut [u8]) -> Result<()> {
        check_len(data)?;
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            self.inner.encrypt_block(GenericArray::from_mut_slice(chunk));
        }
        Ok(())
    }
}

impl fmt::Debug for HeaderCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderCipher").finish_non_exhaustive()
    }
}

fn check_len(data: &[u8]) -> Result<()> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::InvalidInput(format!(
            "cipher input must be a multiple of {} bytes, got {}",
            BLOCK_SIZE,
            data.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_known_answers() {
        // Eric Young's reference vectors.
        let cipher = HeaderCipher::with_key_bytes(&[0u8; 8]).unwrap();
        let mut block = [0u8; 8];
        cipher.encrypt_block(&mut block);
        assert_eq!(block, [0x4E, 0xF9, 0x97, 0x45, 0x61, 0x98, 0xDD, 0x78]);

        let cipher = HeaderCipher::with_key_bytes(&[0xFF; 8]).unwrap();
        let mut block = [0xFF; 8];
        cipher.encrypt_block(&mut block);
        assert_eq!(block, [0x51, 0x86, 0x6F, 0xD5, 0xB8, 0x5E, 0xCB, 0x8A]);
        cipher.decrypt_block(&mut block);
        assert_eq!(block, [0xFF; 8]);
    }

    #[test]
    fn test_blocks_are_independent() {
        let key = CipherKey::new([7u8; CipherKey::LEN]);
        let cipher = HeaderCipher::new(&key).unwrap();
        let mut data = [0x5Au8; 16];
        cipher.encrypt_in_place(&mut data).unwrap();
        // ECB: equal plaintext blocks give equal ciphertext blocks.
        assert_eq!(data[..8], data[8..]);
        cipher.decrypt_in_place(&mut data).unwrap();
        assert_eq!(data, [0x5A; 16]);
    }

    #[test]
    fn test_rejects_partial_block() {
        let cipher = HeaderCipher::new(&CipherKey::new([1u8; CipherKey::LEN])).unwrap();
        let mut data = [0u8; 12];
        let err = cipher.decrypt_in_place(&mut data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        // Nothing was touched.
        assert_eq!(data, [0u8; 12]);
        assert!(cipher.encrypt_in_place(&mut []).is_ok());
    }

    #[test]
    fn test_key_length_limits() {
        assert!(HeaderCipher::with_key_bytes(&[1, 2, 3]).is_err());
        assert!(HeaderCipher::with_key_bytes(&[0u8; 57]).is_err());
        assert!(HeaderCipher::with_key_bytes(&[0u8; 4]).is_ok());
        assert!(CipherKey::from_slice(&[0u8; 55]).is_err());
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = CipherKey::new([0xAB; CipherKey::LEN]);
        assert_eq!(format!("{:?}", key), "CipherKey(..)");
    }

    proptest! {
        #[test]
        fn decrypt_inverts_encrypt(
            key in prop::collection::vec(any::<u8>(), 4..=56),
            block in any::<[u8; 8]>(),
        ) {
            let cipher = HeaderCipher::with_key_bytes(&key).unwrap();
            let mut work = block;
            cipher.encrypt_block(&mut work);
            cipher.decrypt_block(&mut work);
            prop_assert_eq!(work, block);
        }
    }
}
