//! The LZX sliding window.
//!
//! A power-of-two circular buffer that serves both as the LZ77 dictionary
//! and as the staging area for output: decoded bytes land here first, and
//! each `decompress` call emits the last `output_len` bytes at the end.
//! LZX initializes the window to `0xDC` rather than zero.

use xnbdec_core::bitstream::BitReader;
use xnbdec_core::error::{Result, XnbError};
use std::io::{Read, Write};

/// Byte the window is initialized with.
const WINDOW_FILL: u8 = 0xDC;

/// Circular dictionary window.
#[derive(Debug)]
pub(crate) struct Window {
    buffer: Box<[u8]>,
    /// Capacity minus one; capacity is a power of two.
    mask: u32,
    /// Next write index.
    pos: u32,
}

impl Window {
    /// Create a window of `1 << bits` bytes.
    pub(crate) fn new(bits: u32) -> Self {
        let size = 1usize << bits;
        Self {
            buffer: vec![WINDOW_FILL; size].into_boxed_slice(),
            mask: (size - 1) as u32,
            pos: 0,
        }
    }

    pub(crate) fn size(&self) -> u32 {
        self.mask + 1
    }

    pub(crate) fn position(&self) -> u32 {
        self.pos
    }

    /// Append one literal.
    pub(crate) fn push(&mut self, byte: u8) {
        self.buffer[self.pos as usize] = byte;
        self.pos = (self.pos + 1) & self.mask;
    }

    /// Copy `length` bytes starting `offset` back from the write position.
    ///
    /// Source and destination advance byte by byte with independent
    /// wraparound, so a match may read bytes it is itself producing
    /// (the RLE case) or read through the window start.
    pub(crate) fn copy_match(&mut self, offset: u32, length: usize) {
        let mut src = self.pos.wrapping_sub(offset) & self.mask;
        for _ in 0..length {
            self.buffer[self.pos as usize] = self.buffer[src as usize];
            self.pos = (self.pos + 1) & self.mask;
            src = (src + 1) & self.mask;
        }
    }

    /// Read `length` raw bytes from the stream straight into the window.
    ///
    /// Uncompressed blocks bypass the bit reader; the run must fit before
    /// the window end.
    pub(crate) fn fill_from<R: Read>(
        &mut self,
        bits: &mut BitReader<R>,
        length: usize,
    ) -> Result<()> {
        let pos = self.pos as usize;
        let remaining = self.size() as usize - pos;
        if length > remaining {
            return Err(XnbError::window_overrun(length, remaining));
        }
        bits.read_bytes(&mut self.buffer[pos..pos + length])?;
        self.pos = (self.pos + length as u32) & self.mask;
        Ok(())
    }

    /// Write the last `count` bytes (ending at the current position,
    /// exclusive) to `output`, in two parts if the slice straddles the
    /// window end.
    pub(crate) fn emit_last<W: Write>(&self, count: usize, output: &mut W) -> Result<()> {
        debug_assert!(count <= self.size() as usize);
        let size = self.size() as usize;
        let pos = self.pos as usize;
        let start = if pos >= count {
            pos - count
        } else {
            size - (count - pos)
        };
        if start + count > size {
            let head = size - start;
            output.write_all(&self.buffer[start..])?;
            output.write_all(&self.buffer[..count - head])?;
        } else {
            output.write_all(&self.buffer[start..start + count])?;
        }
        Ok(())
    }
}
