//! LCW codec for Westwood game assets.
//!
//! LCW (also called "format 80") is a byte-oriented LZ77 variant. A stream is
//! a sequence of command bytes, each optionally followed by operands:
//!
//! | Command | Operands | Effect |
//! |---|---|---|
//! | `0CCCPPPP` | `u8` | copy `CCC + 3` bytes from 12-bit distance `PPPP..` behind the cursor |
//! | `0x80` | - | end of stream |
//! | `10NNNNNN` | `N` bytes | literal run of `N` (1..=63) bytes |
//! | `11CCCCCC` (`0xC0..=0xFD`) | `u16` | copy `C + 3` bytes from an absolute output position |
//! | `0xFE` | `u16`, `u8` | fill `count` bytes with a value |
//! | `0xFF` | `u16`, `u16` | copy `count` bytes from an absolute output position |
//!
//! Multi-byte operands are little-endian. Copies run byte by byte, so a
//! source range overlapping the bytes being written repeats a pattern.
//!
//! # Example
//!
//! ```
//! let data = b"ABABABABABABABAB-and-some-literals";
//! let packed = redmix_lcw::compress(data);
//! let unpacked = redmix_lcw::decompress(&packed, data.len())?;
//! assert_eq!(unpacked, data);
//! # Ok::<(), redmix_lcw::Error>(())
//! ```

mod decode;
mod encode;
mod error;

pub use decode::{decompress, decompress_into, decompress_with, Addressing};
pub use encode::{compress, max_compressed_size};
pub use error::{Error, Result};

/// End-of-stream command byte.
pub const END_OF_STREAM: u8 = 0x80;
