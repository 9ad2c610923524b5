//! RSA public-key recovery of the header key.
//!
//! The key blob is a sequence of little-endian integers, one per cipher
//! block. Raising each to the public exponent modulo `n` yields a plain block
//! of `(bits(n) - 1) / 8` bytes; the concatenation, cut to 56 bytes, is the
//! Blowfish key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::BigUint;

use super::CipherKey;
use crate::{Error, Result};

/// Westwood's published public key: a DER `INTEGER` holding the modulus,
/// base64 encoded.
pub const WESTWOOD_PUBLIC_KEY: &str = "AihRvNoIbTn85FZRYNZRcT+i6KpU+maCsEqr3Q5q+LDB5tH7Tz2qQ38V";

/// Public exponent paired with [`WESTWOOD_PUBLIC_KEY`].
pub const DEFAULT_EXPONENT: u32 = 65537;

const DER_INTEGER: u8 = 0x02;

/// An RSA public key used to unwrap header keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    modulus: BigUint,
    exponent: BigUint,
}

impl PublicKey {
    /// Build a key from its modulus and exponent.
    ///
    /// The modulus must be wide enough for at least one plain byte per block.
    pub fn new(modulus: BigUint, exponent: BigUint) -> Result<Self> {
        if modulus.bits() < 9 {
            return Err(Error::InvalidInput(format!(
                "modulus of {} bits is too small",
                modulus.bits()
            )));
        }
        Ok(Self { modulus, exponent })
    }

    /// The built-in Westwood key.
    pub fn westwood() -> Result<Self> {
        Self::from_base64(WESTWOOD_PUBLIC_KEY)
    }

    /// Decode a base64 DER `INTEGER` modulus, with exponent 65537.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::InvalidInput(format!("public key is not base64: {}", e)))?;
        Self::from_der_integer(&bytes)
    }

    /// Decode a DER `INTEGER` (tag `0x02`, length, big-endian magnitude).
    pub fn from_der_integer(bytes: &[u8]) -> Result<Self> {
        let malformed = |what: &str| Error::InvalidInput(format!("public key: {}", what));

        let (&tag, rest) = bytes.split_first().ok_or_else(|| malformed("empty"))?;
        if tag != DER_INTEGER {
            return Err(malformed("expected INTEGER tag"));
        }
        let (&len_byte, rest) = rest.split_first().ok_or_else(|| malformed("missing length"))?;
        let (len, rest) = if len_byte & 0x80 == 0 {
            (len_byte as usize, rest)
        } else {
            let width = (len_byte & 0x7F) as usize;
            if width == 0 || width > 2 || rest.len() < width {
                return Err(malformed("bad long-form length"));
            }
            let len = rest[..width]
                .iter()
                .fold(0usize, |acc, &b| (acc << 8) | b as usize);
            (len, &rest[width..])
        };
        let magnitude = rest
            .get(..len)
            .ok_or_else(|| malformed("truncated modulus"))?;

        Self::new(
            BigUint::from_bytes_be(magnitude),
            BigUint::from(DEFAULT_EXPONENT),
        )
    }

    /// Replace the exponent.
    pub fn with_exponent(self, exponent: BigUint) -> Self {
        Self { exponent, ..self }
    }

    /// The modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The public exponent `e`.
    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    /// Bytes of plaintext carried per block.
    pub fn plain_block_size(&self) -> usize {
        (self.modulus.bits() - 1) / 8
    }

    /// Bytes of ciphertext per block.
    pub fn crypt_block_size(&self) -> usize {
        self.plain_block_size() + 1
    }

    /// On-disk size of a blob wrapping `key_len` bytes.
    pub fn blob_len(&self, key_len: usize) -> usize {
        let plain = self.plain_block_size();
        (key_len + plain - 1) / plain * self.crypt_block_size()
    }
}

/// Recover the Blowfish header key from an encrypted key blob.
///
/// Fails with [`Error::KeyRecovery`] when the blob has the wrong length, a
/// block is not below the modulus, a decrypted block overflows its plain
/// size, or the result is all zeros.
pub fn recover_symmetric_key(blob: &[u8], key: &PublicKey) -> Result<CipherKey> {
    let expected = key.blob_len(CipherKey::LEN);
    if blob.len() != expected {
        return Err(Error::KeyRecovery(format!(
            "key blob is {} bytes, expected {}",
            blob.len(),
            expected
        )));
    }

    let plain = key.plain_block_size();
    let crypt = key.crypt_block_size();
    let mut recovered = Vec::with_capacity(expected / crypt * plain);

    for (index, block) in blob.chunks_exact(crypt).enumerate() {
        let c = BigUint::from_bytes_le(block);
        if c >= key.modulus {
            return Err(Error::KeyRecovery(format!(
                "block {} is not below the modulus",
                index
            )));
        }
        let m = c.modpow(&key.exponent, &key.modulus).to_bytes_le();
        if m.len() > plain {
            return Err(Error::KeyRecovery(format!(
                "block {} decrypts to {} bytes, more than {}",
                index,
                m.len(),
                plain
            )));
        }
        let start = recovered.len();
        recovered.extend_from_slice(&m);
        recovered.resize(start + plain, 0);
    }

    let cipher_key = CipherKey::from_slice(&recovered[..CipherKey::LEN])?;
    if cipher_key.is_zero() {
        return Err(Error::KeyRecovery("recovered key is all zeros".into()));
    }
    Ok(cipher_key)
}
