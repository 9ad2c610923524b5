//! LCW decoder.

use crate::{Error, Result, END_OF_STREAM};

/// How the `0xC0..=0xFD` and `0xFF` copy commands locate their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Addressing {
    /// Operand is a position from the start of the output.
    #[default]
    Absolute,
    /// Operand is a distance back from the output cursor.
    Relative,
}

/// Decompress an LCW stream into a freshly allocated buffer.
///
/// `capacity` is the expected decompressed size; a stream that tries to write
/// more fails with [`Error::OutputOverflow`]. The returned buffer is truncated
/// to the bytes actually produced.
pub fn decompress(input: &[u8], capacity: usize) -> Result<Vec<u8>> {
    decompress_with(input, capacity, Addressing::Absolute)
}

/// Decompress with an explicit addressing mode for the long copy forms.
pub fn decompress_with(input: &[u8], capacity: usize, addressing: Addressing) -> Result<Vec<u8>> {
    let mut output = vec![0u8; capacity];
    let written = Decoder::new(input, &mut output, addressing).run()?;
    output.truncate(written);
    Ok(output)
}

/// Decompress into a caller-provided buffer, returning the bytes written.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize> {
    Decoder::new(input, output, Addressing::Absolute).run()
}

struct Decoder<'a, 'b> {
    input: &'a [u8],
    src: usize,
    output: &'b mut [u8],
    dst: usize,
    addressing: Addressing,
}

impl<'a, 'b> Decoder<'a, 'b> {
    fn new(input: &'a [u8], output: &'b mut [u8], addressing: Addressing) -> Self {
        Self {
            input,
            src: 0,
            output,
            dst: 0,
            addressing,
        }
    }

    fn run(mut self) -> Result<usize> {
        loop {
            let cmd = self.next_u8()?;
            match cmd {
                0x00..=0x7F => {
                    let low = self.next_u8()?;
                    let count = (cmd >> 4) as usize + 3;
                    let distance = (((cmd & 0x0F) as usize) << 8) | low as usize;
                    let from = self.behind(distance)?;
                    self.copy(from, count)?;
                }
                END_OF_STREAM => return Ok(self.dst),
                0x81..=0xBF => {
                    let count = (cmd & 0x3F) as usize;
                    self.literal(count)?;
                }
                0xC0..=0xFD => {
                    let count = (cmd & 0x3F) as usize + 3;
                    let operand = self.next_u16()? as usize;
                    let from = self.source(operand)?;
                    self.copy(from, count)?;
                }
                0xFE => {
                    let count = self.next_u16()? as usize;
                    let value = self.next_u8()?;
                    self.fill(value, count)?;
                }
                0xFF => {
                    let count = self.next_u16()? as usize;
                    let operand = self.next_u16()? as usize;
                    let from = self.source(operand)?;
                    self.copy(from, count)?;
                }
            }
        }
    }

    #[inline]
    fn next_u8(&mut self) -> Result<u8> {
        let byte = *self
            .input
            .get(self.src)
            .ok_or(Error::Truncated { position: self.src })?;
        self.src += 1;
        Ok(byte)
    }

    #[inline]
    fn next_u16(&mut self) -> Result<u16> {
        let lo = self.next_u8()?;
        let hi = self.next_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn behind(&self, distance: usize) -> Result<usize> {
        if distance > self.dst {
            return Err(Error::DistanceTooFar {
                distance,
                written: self.dst,
            });
        }
        Ok(self.dst - distance)
    }

    fn source(&self, operand: usize) -> Result<usize> {
        match self.addressing {
            Addressing::Absolute => Ok(operand),
            Addressing::Relative => self.behind(operand),
        }
    }

    fn reserve(&self, count: usize) -> Result<()> {
        let needed = self.dst + count;
        if needed > self.output.len() {
            return Err(Error::OutputOverflow {
                needed,
                capacity: self.output.len(),
            });
        }
        Ok(())
    }

    fn literal(&mut self, count: usize) -> Result<()> {
        let end = self.src + count;
        if end > self.input.len() {
            return Err(Error::Truncated {
                position: self.input.len(),
            });
        }
        self.reserve(count)?;
        self.output[self.dst..self.dst + count].copy_from_slice(&self.input[self.src..end]);
        self.src = end;
        self.dst += count;
        Ok(())
    }

    fn fill(&mut self, value: u8, count: usize) -> Result<()> {
        self.reserve(count)?;
        self.output[self.dst..self.dst + count].fill(value);
        self.dst += count;
        Ok(())
    }

    fn copy(&mut self, from: usize, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if from >= self.dst {
            return Err(Error::SourceNotWritten {
                source_pos: from,
                written: self.dst,
            });
        }
        self.reserve(count)?;
        // Byte at a time: the source may overlap the bytes being produced.
        for i in 0..count {
            self.output[self.dst + i] = self.output[from + i];
        }
        self.dst += count;
        Ok(())
    }
}
