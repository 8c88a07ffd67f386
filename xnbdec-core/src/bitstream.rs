//! Bit-level input for the LZX bitstream.
//!
//! LZX consumes its input as a sequence of 16-bit little-endian words and
//! reads bits most-significant-first within each word. [`BitReader`] models
//! that with a 32-bit accumulator: each refill injects one word at position
//! `16 - bits_left` counted from the top, so `peek_bits(k)` is always the top
//! `k` bits of the accumulator.
//!
//! Refills happen in 16-bit increments only, and a refill never occurs with
//! more than 16 bits already buffered, so the 32-bit accumulator supports
//! requests of up to 17 bits in a single `peek`/`read` (verbatim match
//! offsets in the largest position slots need exactly that).
//!
//! # Example
//!
//! ```
//! use xnbdec_core::bitstream::BitReader;
//! use std::io::Cursor;
//!
//! // The pair [0x34, 0x12] is the little-endian word 0x1234.
//! let mut reader = BitReader::new(Cursor::new(vec![0x34, 0x12]));
//! assert_eq!(reader.read_bits(4).unwrap(), 0x1);
//! assert_eq!(reader.read_bits(12).unwrap(), 0x234);
//! ```

use crate::error::{Result, XnbError};
use std::io::{self, Read};

/// A bit reader over 16-bit little-endian words, MSB-first within each word.
///
/// The accumulator is exactly 32 bits wide. Bits beyond `bits_left` are
/// always zero, which the Huffman tree walk relies on near end of stream.
#[derive(Debug)]
pub struct BitReader<R> {
    /// Underlying byte stream.
    reader: R,
    /// 32-bit accumulator; valid bits occupy the top `bits_left` positions.
    buffer: u32,
    /// Number of valid bits in the accumulator.
    bits_left: u8,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given byte stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_left: 0,
        }
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Raw accumulator value (valid bits at the top, zeros below).
    pub fn accumulator(&self) -> u32 {
        self.buffer
    }

    /// Number of valid bits currently buffered.
    pub fn bits_left(&self) -> u8 {
        self.bits_left
    }

    /// Drop any partially-consumed word so the next refill starts on a fresh
    /// byte boundary. Used after an uncompressed block.
    pub fn reinit(&mut self) {
        self.buffer = 0;
        self.bits_left = 0;
    }

    /// Pull one 16-bit word into the accumulator. Returns `false` once the
    /// stream is exhausted; a trailing odd byte is injected as 8 bits.
    fn refill(&mut self) -> Result<bool> {
        let mut pair = [0u8; 2];
        match read_full(&mut self.reader, &mut pair)? {
            0 => Ok(false),
            1 => {
                self.buffer |= u32::from(pair[0]) << (32 - 8 - self.bits_left);
                self.bits_left += 8;
                Ok(false)
            }
            _ => {
                let word = u32::from(u16::from_le_bytes(pair));
                self.buffer |= word << (32 - 16 - self.bits_left);
                self.bits_left += 16;
                Ok(true)
            }
        }
    }

    /// Refill until at least `count` bits are buffered, stopping quietly at
    /// end of input.
    fn fill_to(&mut self, count: u8) -> Result<()> {
        while self.bits_left < count {
            if !self.refill()? {
                break;
            }
        }
        Ok(())
    }

    /// Ensure at least `count` bits are available.
    pub fn ensure_bits(&mut self, count: u8) -> Result<()> {
        debug_assert!(count <= 17, "accumulator holds at most 17 requested bits");
        self.fill_to(count)?;
        if self.bits_left < count {
            return Err(XnbError::unexpected_eof(usize::from(count - self.bits_left)));
        }
        Ok(())
    }

    /// Top the accumulator up to a full 16-bit lookahead if input remains.
    ///
    /// Unlike [`ensure_bits`](Self::ensure_bits) this never fails at end of
    /// stream: the final symbols of a block may need fewer than 16 bits, and
    /// the missing low bits peek as zeros.
    pub fn prefetch(&mut self) -> Result<()> {
        self.fill_to(16)
    }

    /// Return the top `count` bits of the accumulator without consuming them.
    pub fn peek_bits(&self, count: u8) -> u32 {
        debug_assert!((1..=17).contains(&count));
        self.buffer >> (32 - count)
    }

    /// Discard the top `count` bits. The caller must have checked
    /// availability.
    pub fn remove_bits(&mut self, count: u8) {
        debug_assert!(count <= self.bits_left);
        self.buffer <<= count;
        self.bits_left -= count;
    }

    /// Read `count` bits. `read_bits(0)` returns 0 without touching the
    /// stream.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 17, "accumulator holds at most 17 requested bits");
        if count == 0 {
            return Ok(0);
        }
        self.ensure_bits(count)?;
        let value = self.peek_bits(count);
        self.remove_bits(count);
        Ok(value)
    }

    /// Read bytes directly from the underlying stream, bypassing the bit
    /// buffer. The accumulator must be empty (after [`reinit`](Self::reinit)).
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        debug_assert_eq!(self.bits_left, 0, "bit buffer not drained");
        let n = read_full(&mut self.reader, buf)?;
        if n < buf.len() {
            return Err(XnbError::unexpected_eof((buf.len() - n) * 8));
        }
        Ok(())
    }

    /// Skip one raw byte from the underlying stream, tolerating end of input.
    /// Used for the alignment pad after an odd-length uncompressed block.
    pub fn skip_byte(&mut self) -> Result<()> {
        let mut pad = [0u8; 1];
        read_full(&mut self.reader, &mut pad)?;
        Ok(())
    }
}

/// Read until `buf` is full or the stream ends; returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
