//! Greedy LCW encoder.
//!
//! The output is only guaranteed to round-trip through [`crate::decompress`];
//! it does not reproduce the byte stream of Westwood's own compressor.

use crate::END_OF_STREAM;

const MIN_MATCH: usize = 3;
const MAX_LITERAL_RUN: usize = 63;
const SHORT_MAX_LEN: usize = 10;
const SHORT_MAX_DISTANCE: usize = 0x0FFF;
const MEDIUM_MIN_LEN: usize = 4;
const MEDIUM_MAX_LEN: usize = 64;
const LONG_MIN_LEN: usize = 6;
const MAX_COUNT: usize = 0xFFFF;
const MAX_ABSOLUTE_POS: usize = 0xFFFF;
const FILL_MIN_LEN: usize = 5;

const HASH_BITS: u32 = 14;
const CHAIN_LIMIT: usize = 64;
const NONE: u32 = u32::MAX;

/// Worst-case size of [`compress`] output for `len` input bytes.
///
/// That is every byte as a literal, one command per 63 literals, plus the
/// end marker. No copy or fill is emitted unless it is at least as short.
pub const fn max_compressed_size(len: usize) -> usize {
    len + (len + MAX_LITERAL_RUN - 1) / MAX_LITERAL_RUN + 1
}

/// Compress a buffer into an LCW stream terminated by the end marker.
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut encoder = Encoder::new(input);
    encoder.run();
    encoder.out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    /// 2 bytes: 12-bit distance, 3..=10 bytes.
    Short { distance: usize, len: usize },
    /// 3 bytes: absolute position, 4..=64 bytes.
    Medium { from: usize, len: usize },
    /// 5 bytes: absolute position, up to 65535 bytes.
    Long { from: usize, len: usize },
}

impl Match {
    fn len(self) -> usize {
        match self {
            Match::Short { len, .. } | Match::Medium { len, .. } | Match::Long { len, .. } => len,
        }
    }

    /// Pick the cheapest encodable form for a match of `len` bytes at `from`.
    fn select(from: usize, pos: usize, len: usize) -> Option<Self> {
        let distance = pos - from;
        if distance <= SHORT_MAX_DISTANCE && (len <= SHORT_MAX_LEN || from > MAX_ABSOLUTE_POS) {
            let len = len.min(SHORT_MAX_LEN);
            return (len >= MIN_MATCH).then_some(Match::Short { distance, len });
        }
        if from > MAX_ABSOLUTE_POS {
            return None;
        }
        if len <= MEDIUM_MAX_LEN {
            (len >= MEDIUM_MIN_LEN).then_some(Match::Medium { from, len })
        } else {
            let len = len.min(MAX_COUNT);
            (len >= LONG_MIN_LEN).then_some(Match::Long { from, len })
        }
    }
}

struct Encoder<'a> {
    input: &'a [u8],
    out: Vec<u8>,
    head: Vec<u32>,
    prev: Vec<u32>,
    literal_start: usize,
}

impl<'a> Encoder<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            out: Vec::with_capacity(max_compressed_size(input.len())),
            head: vec![NONE; 1 << HASH_BITS],
            prev: vec![NONE; input.len()],
            literal_start: 0,
        }
    }

    fn run(&mut self) {
        let len = self.input.len();
        let mut pos = 0;

        while pos < len {
            let run = self.run_length(pos);
            let copy = self.find_match(pos);
            let copy_len = copy.map_or(0, Match::len);

            let consumed = if run >= FILL_MIN_LEN && run >= copy_len {
                self.flush_literals(pos);
                self.emit_fill(self.input[pos], run);
                Some(run)
            } else if let Some(copy) = copy {
                self.flush_literals(pos);
                self.emit_copy(copy);
                Some(copy_len)
            } else {
                None
            };

            match consumed {
                Some(n) => {
                    for p in pos..pos + n {
                        self.insert(p);
                    }
                    pos += n;
                    self.literal_start = pos;
                }
                None => {
                    self.insert(pos);
                    pos += 1;
                }
            }
        }

        self.flush_literals(len);
        self.out.push(END_OF_STREAM);
    }

    fn run_length(&self, pos: usize) -> usize {
        let value = self.input[pos];
        self.input[pos..]
            .iter()
            .take(MAX_COUNT)
            .take_while(|&&b| b == value)
            .count()
    }

    #[inline]
    fn hash(&self, pos: usize) -> Option<usize> {
        let window = self.input.get(pos..pos + MIN_MATCH)?;
        let key = u32::from_le_bytes([window[0], window[1], window[2], 0]);
        Some((key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize)
    }

    fn insert(&mut self, pos: usize) {
        if let Some(h) = self.hash(pos) {
            self.prev[pos] = self.head[h];
            self.head[h] = pos as u32;
        }
    }

    fn find_match(&self, pos: usize) -> Option<Match> {
        let h = self.hash(pos)?;
        let max_len = (self.input.len() - pos).min(MAX_COUNT);

        let mut best: Option<Match> = None;
        let mut candidate = self.head[h];
        let mut steps = 0;

        while candidate != NONE && steps < CHAIN_LIMIT {
            let from = candidate as usize;
            let len = self.input[from..]
                .iter()
                .zip(&self.input[pos..pos + max_len])
                .take_while(|(a, b)| a == b)
                .count();

            if let Some(copy) = Match::select(from, pos, len) {
                // Candidates come nearest first, so ties keep the shorter distance.
                if best.map_or(true, |b| copy.len() > b.len()) {
                    best = Some(copy);
                }
            }

            candidate = self.prev[from];
            steps += 1;
        }

        best
    }

    fn flush_literals(&mut self, end: usize) {
        let mut start = self.literal_start;
        while start < end {
            let n = (end - start).min(MAX_LITERAL_RUN);
            self.out.push(0x80 | n as u8);
            self.out.extend_from_slice(&self.input[start..start + n]);
            start += n;
        }
        self.literal_start = end;
    }

    fn emit_fill(&mut self, value: u8, count: usize) {
        self.out.push(0xFE);
        self.out.extend_from_slice(&(count as u16).to_le_bytes());
        self.out.push(value);
    }

    fn emit_copy(&mut self, copy: Match) {
        match copy {
            Match::Short { distance, len } => {
                self.out
                    .push((((len - MIN_MATCH) as u8) << 4) | (distance >> 8) as u8);
                self.out.push(distance as u8);
            }
            Match::Medium { from, len } => {
                self.out.push(0xC0 | (len - MIN_MATCH) as u8);
                self.out.extend_from_slice(&(from as u16).to_le_bytes());
            }
            Match::Long { from, len } => {
                self.out.push(0xFF);
                self.out.extend_from_slice(&(len as u16).to_le_bytes());
                self.out.extend_from_slice(&(from as u16).to_le_bytes());
            }
        }
    }
}
