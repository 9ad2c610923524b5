//! Filename checksums used as MIX lookup keys.
//!
//! MIX archives store no filenames. Every entry is keyed by a 32-bit checksum
//! of the uppercased name, and lookups hash the requested name the same way.
//! These values are keys, not integrity checks.
//!
//! Two algorithms are provided:
//!
//! - [`checksum`]: reflected CRC-32 with a zero initial register
//!   and no final XOR. Leading zero bytes therefore do not change the result.
//! - [`rotate_add`]: the Westwood rotate-and-add checksum over little-endian
//!   32-bit words.
//!
//! [`KeyHash`] selects between them when an archive is opened.

use std::fmt;

/// Register value handed to `crc32fast`. Its hasher inverts on entry and
/// exit, so starting from `!0` and inverting the result gives a zero initial
/// register with no final XOR.
const CRC_INIT: u32 = 0xFFFF_FFFF;

#[inline]
fn crc_hasher() -> crc32fast::Hasher {
    crc32fast::Hasher::new_with_initial(CRC_INIT)
}

/// Compute the lookup checksum of raw bytes.
///
/// The register starts at zero and the result is not inverted.
#[inline]
pub fn checksum(data: &[u8]) -> u32 {
    let mut hasher = crc_hasher();
    hasher.update(data);
    !hasher.finalize()
}

/// Compute the lookup checksum of a filename.
///
/// The name is uppercased as ASCII first; bytes outside `a..=z` are hashed
/// unchanged.
pub fn checksum_for_lookup(name: impl AsRef<[u8]>) -> u32 {
    checksum(&name.as_ref().to_ascii_uppercase())
}

/// Compute the Westwood rotate-and-add checksum of raw bytes.
///
/// Input is consumed as little-endian 32-bit words; each word is added to the
/// accumulator after rotating it left by one bit. A trailing partial word is
/// zero-padded.
pub fn rotate_add(data: &[u8]) -> u32 {
    let mut hasher = Checksum::new(KeyHash::RotateAdd);
    hasher.update(data);
    hasher.finish()
}

/// Compute the rotate-and-add checksum of an ASCII-uppercased filename.
pub fn rotate_add_for_lookup(name: impl AsRef<[u8]>) -> u32 {
    rotate_add(&name.as_ref().to_ascii_uppercase())
}

/// The filename hash an archive's entry keys were built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyHash {
    /// Zero-initialised reflected CRC-32 ([`checksum`]).
    #[default]
    Crc32,
    /// Westwood rotate-and-add ([`rotate_add`]).
    RotateAdd,
}

impl KeyHash {
    /// Every supported algorithm.
    pub const ALL: [KeyHash; 2] = [KeyHash::Crc32, KeyHash::RotateAdd];

    /// Hash raw bytes with this algorithm.
    #[inline]
    pub fn hash(self, data: &[u8]) -> u32 {
        match self {
            KeyHash::Crc32 => checksum(data),
            KeyHash::RotateAdd => rotate_add(data),
        }
    }

    /// Compute the signed entry key for a filename.
    ///
    /// Entry tables are ordered by signed comparison, so the key is returned
    /// as the `i32` reinterpretation of the unsigned hash.
    #[inline]
    pub fn key_for(self, name: impl AsRef<[u8]>) -> i32 {
        self.hash(&name.as_ref().to_ascii_uppercase()) as i32
    }

    /// Short human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            KeyHash::Crc32 => "crc32",
            KeyHash::RotateAdd => "rotate-add",
        }
    }
}

/// Incremental checksum calculator.
///
/// Produces the same value as the one-shot functions regardless of how the
/// input is split across [`update`](Checksum::update) calls.
#[derive(Clone)]
pub struct Checksum {
    state: State,
}

#[derive(Clone)]
enum State {
    Crc32(crc32fast::Hasher),
    RotateAdd { acc: u32, staging: u32, index: u32 },
}

impl Checksum {
    /// Create a calculator for the given algorithm.
    pub fn new(kind: KeyHash) -> Self {
        let state = match kind {
            KeyHash::Crc32 => State::Crc32(crc_hasher()),
            KeyHash::RotateAdd => State::RotateAdd {
                acc: 0,
                staging: 0,
                index: 0,
            },
        };
        Self { state }
    }

    /// Algorithm this calculator uses.
    pub fn kind(&self) -> KeyHash {
        match self.state {
            State::Crc32(_) => KeyHash::Crc32,
            State::RotateAdd { .. } => KeyHash::RotateAdd,
        }
    }

    /// Feed more data.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            State::Crc32(hasher) => hasher.update(data),
            State::RotateAdd {
                acc,
                staging,
                index,
            } => {
                for &byte in data {
                    *staging |= (byte as u32) << (*index * 8);
                    *index += 1;
                    if *index == 4 {
                        *acc = acc.rotate_left(1).wrapping_add(*staging);
                        *staging = 0;
                        *index = 0;
                    }
                }
            }
        }
    }

    /// Current value, folding in any pending partial word.
    pub fn finish(&self) -> u32 {
        match &self.state {
            State::Crc32(hasher) => !hasher.clone().finalize(),
            State::RotateAdd {
                acc,
                staging,
                index,
            } => {
                if *index > 0 {
                    acc.rotate_left(1).wrapping_add(*staging)
                } else {
                    *acc
                }
            }
        }
    }

    /// Reset to the initial state, keeping the algorithm.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind());
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checksum")
            .field("kind", &self.kind())
            .field("value", &self.finish())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Bit-at-a-time reference for the zero-initialised reflected CRC.
    fn bitwise_crc(data: &[u8]) -> u32 {
        let mut crc = 0u32;
        for &byte in data {
            crc ^= byte as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xEDB8_8320
                } else {
                    crc >> 1
                };
            }
        }
        crc
    }

    #[test]
    fn test_single_byte_values() {
        // A single byte yields its table entry for the reflected polynomial.
        assert_eq!(checksum(&[0x00]), 0);
        assert_eq!(checksum(&[0x01]), 0x7707_3096);
        assert_eq!(checksum(&[0x80]), 0xEDB8_8320);
        assert_eq!(checksum(&[0xFF]), 0x2D02_EF8D);
    }

    #[test]
    fn test_matches_bitwise_reference() {
        for name in ["RULES.INI", "MOUSE.SHP", "", "A", "TEMPERAT.PAL"] {
            assert_eq!(checksum(name.as_bytes()), bitwise_crc(name.as_bytes()), "{}", name);
        }
    }

    #[test]
    fn test_zero_initial_register() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x01]), 0x7707_3096);
        // No initial inversion: leading zero bytes leave the register at zero.
        assert_eq!(checksum(&[0, 0, 0, 0x01]), checksum(&[0x01]));
    }

    #[test]
    fn test_linear_over_xor() {
        // Without init/xorout the CRC is linear for equal-length inputs.
        let a = b"MOUSE.SHP";
        let b = b"RULES.INI";
        let x: Vec<u8> = a.iter().zip(b.iter()).map(|(p, q)| p ^ q).collect();
        assert_eq!(checksum(&x), checksum(a) ^ checksum(b));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(checksum_for_lookup("A.B"), checksum_for_lookup("a.b"));
        assert_eq!(
            checksum_for_lookup("temperat.pal"),
            checksum_for_lookup("TeMpErAt.PaL")
        );
        assert_eq!(checksum_for_lookup("rules.ini"), checksum(b"RULES.INI"));
    }

    #[test]
    fn test_lookup_ignores_non_ascii_case() {
        // Only ASCII letters fold; other bytes pass through.
        assert_ne!(checksum_for_lookup("é.PAL"), checksum_for_lookup("É.PAL"));
    }

    #[test]
    fn test_common_names_distinct() {
        let names = [
            "RULES.INI",
            "MOUSE.SHP",
            "TEMPERAT.PAL",
            "SNOW.PAL",
            "CONQUER.MIX",
            "LOCAL.MIX",
            "PALETTE.PAL",
            "SHADOW.PAL",
        ];
        for kind in KeyHash::ALL {
            for (i, a) in names.iter().enumerate() {
                for b in &names[i + 1..] {
                    assert_ne!(kind.key_for(a), kind.key_for(b), "{:?}: {} vs {}", kind, a, b);
                }
            }
        }
    }

    #[test]
    fn test_rotate_add_words() {
        assert_eq!(rotate_add(&[]), 0);
        assert_eq!(rotate_add(b"A"), 0x41);
        assert_eq!(rotate_add(b"TEST"), u32::from_le_bytes(*b"TEST"));

        let first = u32::from_le_bytes(*b"TEST");
        let second = u32::from_le_bytes(*b"DATA");
        assert_eq!(
            rotate_add(b"TESTDATA"),
            first.rotate_left(1).wrapping_add(second)
        );

        // Partial trailing word is zero padded.
        let tail = u32::from_le_bytes([b'X', b'Y', 0, 0]);
        assert_eq!(rotate_add(b"TESTXY"), first.rotate_left(1).wrapping_add(tail));
    }

    #[test]
    fn test_key_for_is_signed_reinterpretation() {
        for kind in KeyHash::ALL {
            let unsigned = kind.hash(b"SPEECH.MIX");
            assert_eq!(kind.key_for("speech.mix"), unsigned as i32);
        }
        assert_eq!(KeyHash::default(), KeyHash::Crc32);
    }

    #[test]
    fn test_streaming_reset() {
        let mut hasher = Checksum::new(KeyHash::RotateAdd);
        hasher.update(b"garbage");
        hasher.reset();
        hasher.update(b"TEST");
        assert_eq!(hasher.finish(), rotate_add(b"TEST"));
    }

    proptest! {
        #[test]
        fn lookup_matches_uppercased(name in "[ -~]{0,40}") {
            prop_assert_eq!(
                checksum_for_lookup(&name),
                checksum_for_lookup(name.to_ascii_uppercase())
            );
            prop_assert_eq!(
                rotate_add_for_lookup(&name),
                rotate_add_for_lookup(name.to_ascii_uppercase())
            );
        }

        #[test]
        fn crc_matches_reference(data in prop::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(checksum(&data), bitwise_crc(&data));
        }

        #[test]
        fn streaming_matches_one_shot(
            data in prop::collection::vec(any::<u8>(), 0..200),
            split in 0usize..200,
        ) {
            let split = split.min(data.len());
            for kind in KeyHash::ALL {
                let mut hasher = Checksum::new(kind);
                hasher.update(&data[..split]);
                hasher.update(&data[split..]);
                prop_assert_eq!(hasher.finish(), kind.hash(&data));
            }
        }
    }
}
