//! Encrypted header support.
//!
//! An encrypted MIX header carries an 80-byte blob holding a 56-byte Blowfish
//! key, itself encrypted with Westwood's RSA private key. Opening the archive
//! recovers the Blowfish key with the public key ([`recover_symmetric_key`])
//! and then decrypts the standard header with [`HeaderCipher`].

mod block;
mod key;

pub use block::{CipherKey, HeaderCipher, BLOCK_SIZE};
pub use key::{recover_symmetric_key, PublicKey, DEFAULT_EXPONENT, WESTWOOD_PUBLIC_KEY};
pub use rsa::BigUint;

/// Round `len` up to a whole number of cipher blocks.
#[inline]
pub const fn padded_len(len: usize) -> usize {
    (len + BLOCK_SIZE - 1) / BLOCK_SIZE * BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(6 + 12), 24);
        assert_eq!(padded_len(6 + 5 * 12), 72);
        assert_eq!(padded_len(8), 8);
    }
}
