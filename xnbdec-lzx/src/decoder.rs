//! The LZX block decoder.
//!
//! An [`LzxDecoder`] is a long-lived object: the sliding window, the three
//! recent-offset registers, and the main/length trees' code lengths all
//! survive across [`decompress`](LzxDecoder::decompress) calls, so a
//! multi-frame stream decodes by calling `decompress` once per frame against
//! the same decoder.
//!
//! Each block starts with a 3-bit type and a 24-bit byte count. VERBATIM
//! and ALIGNED blocks carry delta-updated Huffman trees and emit literals
//! and matches; UNCOMPRESSED blocks realign the bit reader and copy raw
//! bytes. Match offsets below three index the R0/R1/R2 least-recently-used
//! registers instead of encoding a distance.

use crate::huffman::{CanonicalTree, PretreeDecoder};
use crate::window::Window;
use xnbdec_core::bitstream::BitReader;
use xnbdec_core::error::{Result, XnbError};
use std::io::{Read, Write};

/// Smallest window exponent the format allows.
pub const MIN_WINDOW_BITS: u32 = 15;
/// Largest window exponent the format allows.
pub const MAX_WINDOW_BITS: u32 = 21;

/// Minimum match length.
pub const MIN_MATCH: u32 = 2;
/// Maximum match length.
pub const MAX_MATCH: u32 = 257;
/// Number of literal symbols in the main tree.
const NUM_CHARS: u32 = 256;
/// Match-length values encoded directly in the main element.
const NUM_PRIMARY_LENGTHS: u32 = 7;
/// Symbols in the secondary length tree.
const NUM_SECONDARY_LENGTHS: usize = 249;

const MAINTREE_MAX_SYMBOLS: usize = NUM_CHARS as usize + 50 * 8;
const MAINTREE_TABLE_BITS: u8 = 12;
const LENGTH_MAX_SYMBOLS: usize = NUM_SECONDARY_LENGTHS + 1;
const LENGTH_TABLE_BITS: u8 = 12;
const ALIGNED_NUM_ELEMENTS: usize = 8;
const ALIGNED_TABLE_BITS: u8 = 7;

/// Extra offset bits per position slot: 0,0,0,0,1,1,2,2,... capped at 17.
const EXTRA_BITS: [u8; 52] = {
    let mut eb = [0u8; 52];
    let mut i = 0;
    let mut j = 0u8;
    while i <= 50 {
        eb[i] = j;
        eb[i + 1] = j;
        if i != 0 && j < 17 {
            j += 1;
        }
        i += 2;
    }
    eb
};

/// Base offset per position slot: cumulative sums of `1 << EXTRA_BITS`.
const POSITION_BASE: [u32; 51] = {
    let mut pb = [0u32; 51];
    let mut i = 0;
    let mut acc = 0u32;
    while i <= 50 {
        pb[i] = acc;
        acc += 1 << EXTRA_BITS[i];
        i += 1;
    }
    pb
};

/// LZX block types as encoded in the 3-bit block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockType {
    /// No block decoded yet.
    Invalid,
    /// Huffman-coded block with verbatim offset bits.
    Verbatim,
    /// Huffman-coded block with an extra aligned-offset tree.
    Aligned,
    /// Raw bytes, byte-aligned in the stream.
    Uncompressed,
}

/// A streaming LZX decompressor.
pub struct LzxDecoder {
    window: Window,
    /// Recent match offsets, most recent first. Never below 1.
    r0: u32,
    r1: u32,
    r2: u32,
    /// Main tree alphabet size: 256 literals + 8 per position slot.
    main_elements: u16,
    /// The per-stream preamble is read once, on the first call.
    header_read: bool,
    block_type: BlockType,
    block_length: u32,
    block_remaining: u32,
    frames_read: u32,
    /// Intel E8 preprocessing state: tracked, never applied to output.
    intel_filesize: i32,
    intel_started: bool,
    pretree: PretreeDecoder,
    main_tree: CanonicalTree,
    length_tree: CanonicalTree,
    aligned_tree: CanonicalTree,
}

impl LzxDecoder {
    /// Create a decoder for a stream with a `1 << window_bits` byte window.
    ///
    /// `window_bits` must lie in 15..=21; XNB payloads use 16.
    pub fn new(window_bits: u32) -> Result<Self> {
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
            return Err(XnbError::unsupported_window(window_bits));
        }
        let position_slots = match window_bits {
            20 => 42,
            21 => 50,
            bits => bits << 1,
        };
        Ok(Self {
            window: Window::new(window_bits),
            r0: 1,
            r1: 1,
            r2: 1,
            main_elements: (NUM_CHARS + (position_slots << 3)) as u16,
            header_read: false,
            block_type: BlockType::Invalid,
            block_length: 0,
            block_remaining: 0,
            frames_read: 0,
            intel_filesize: 0,
            intel_started: false,
            pretree: PretreeDecoder::new(),
            main_tree: CanonicalTree::new(MAINTREE_MAX_SYMBOLS, MAINTREE_TABLE_BITS),
            length_tree: CanonicalTree::new(LENGTH_MAX_SYMBOLS, LENGTH_TABLE_BITS),
            aligned_tree: CanonicalTree::new(ALIGNED_NUM_ELEMENTS, ALIGNED_TABLE_BITS),
        })
    }

    /// Number of completed `decompress` calls.
    pub fn frames_read(&self) -> u32 {
        self.frames_read
    }

    /// The R0/R1/R2 recent-offset registers, most recent first.
    pub fn recent_offsets(&self) -> (u32, u32, u32) {
        (self.r0, self.r1, self.r2)
    }

    /// Decompress until `output_len` bytes have been produced.
    ///
    /// `input` must be positioned at the start of this frame's compressed
    /// bytes; each frame is a fresh byte-aligned bitstream, while window and
    /// tree state carry over. `input_len` is advisory and not consulted.
    /// On success exactly `output_len` bytes have been written to `output`.
    pub fn decompress<R: Read, W: Write>(
        &mut self,
        input: R,
        _input_len: usize,
        output: &mut W,
        output_len: usize,
    ) -> Result<()> {
        let mut bits = BitReader::new(input);
        let mut togo = output_len;

        if !self.header_read {
            if bits.read_bits(1)? != 0 {
                let hi = bits.read_bits(16)?;
                let lo = bits.read_bits(16)?;
                self.intel_filesize = ((hi << 16) | lo) as i32;
            }
            self.header_read = true;
        }

        while togo > 0 {
            if self.block_remaining == 0 {
                self.read_block_header(&mut bits)?;
            }

            let this_run = (self.block_remaining as usize).min(togo);
            togo -= this_run;
            self.block_remaining -= this_run as u32;

            match self.block_type {
                BlockType::Verbatim => self.decode_run(&mut bits, this_run, false)?,
                BlockType::Aligned => self.decode_run(&mut bits, this_run, true)?,
                BlockType::Uncompressed => self.window.fill_from(&mut bits, this_run)?,
                BlockType::Invalid => return Err(XnbError::invalid_block_type(0)),
            }
        }

        self.window.emit_last(output_len, output)?;
        self.frames_read += 1;
        Ok(())
    }

    /// Parse the next block header and rebuild whatever trees it carries.
    fn read_block_header<R: Read>(&mut self, bits: &mut BitReader<R>) -> Result<()> {
        // An odd-length uncompressed block is padded to a 16-bit boundary;
        // drop the pad byte and restart bit reading on a fresh word.
        if self.block_type == BlockType::Uncompressed {
            if self.block_length & 1 != 0 {
                bits.skip_byte()?;
            }
            bits.reinit();
        }

        let block_type = bits.read_bits(3)? as u8;
        let hi = bits.read_bits(16)?;
        let lo = bits.read_bits(8)?;
        self.block_length = (hi << 8) | lo;
        self.block_remaining = self.block_length;

        self.block_type = match block_type {
            1 => BlockType::Verbatim,
            2 => BlockType::Aligned,
            3 => BlockType::Uncompressed,
            other => return Err(XnbError::invalid_block_type(other)),
        };
        #[cfg(test)]
        eprintln!(
            "[block] type={:?} length={}",
            self.block_type, self.block_length
        );

        match self.block_type {
            BlockType::Aligned => {
                for i in 0..ALIGNED_NUM_ELEMENTS {
                    self.aligned_tree.lengths_mut()[i] = bits.read_bits(3)? as u8;
                }
                self.aligned_tree.rebuild()?;
                self.read_main_and_length_trees(bits)?;
            }
            BlockType::Verbatim => {
                self.read_main_and_length_trees(bits)?;
            }
            BlockType::Uncompressed => {
                self.intel_started = true;
                bits.reinit();
                let mut raw = [0u8; 12];
                bits.read_bytes(&mut raw)?;
                self.r0 = u32::from_le_bytes(raw[0..4].try_into().unwrap());
                self.r1 = u32::from_le_bytes(raw[4..8].try_into().unwrap());
                self.r2 = u32::from_le_bytes(raw[8..12].try_into().unwrap());
            }
            BlockType::Invalid => unreachable!(),
        }
        Ok(())
    }

    /// Delta-update and rebuild the main and length trees.
    fn read_main_and_length_trees<R: Read>(&mut self, bits: &mut BitReader<R>) -> Result<()> {
        let main_elements = usize::from(self.main_elements);
        self.pretree
            .read_lengths(bits, self.main_tree.lengths_mut(), 0, NUM_CHARS as usize)?;
        self.pretree.read_lengths(
            bits,
            self.main_tree.lengths_mut(),
            NUM_CHARS as usize,
            main_elements,
        )?;
        self.main_tree.rebuild()?;
        if self.main_tree.lengths()[0xE8] != 0 {
            self.intel_started = true;
        }

        self.pretree
            .read_lengths(bits, self.length_tree.lengths_mut(), 0, NUM_SECONDARY_LENGTHS)?;
        self.length_tree.rebuild()?;
        Ok(())
    }

    /// Emit `run` bytes of a VERBATIM or ALIGNED block into the window.
    fn decode_run<R: Read>(
        &mut self,
        bits: &mut BitReader<R>,
        run: usize,
        aligned: bool,
    ) -> Result<()> {
        // The final match of a block may overshoot; the loop condition is
        // checked before each symbol, not rebalanced after, so the counter
        // must be signed.
        let mut this_run = run as i64;
        while this_run > 0 {
            let main_element = u32::from(self.main_tree.read_symbol(bits)?);

            if main_element < NUM_CHARS {
                self.window.push(main_element as u8);
                this_run -= 1;
                continue;
            }

            let m = main_element - NUM_CHARS;
            let mut match_length = m & NUM_PRIMARY_LENGTHS;
            if match_length == NUM_PRIMARY_LENGTHS {
                match_length += u32::from(self.length_tree.read_symbol(bits)?);
            }
            match_length += MIN_MATCH;

            let slot = m >> 3;
            let match_offset = match slot {
                0 => self.r0,
                1 => {
                    std::mem::swap(&mut self.r0, &mut self.r1);
                    self.r0
                }
                2 => {
                    std::mem::swap(&mut self.r0, &mut self.r2);
                    self.r0
                }
                _ => {
                    let offset = if aligned {
                        self.read_aligned_offset(bits, slot)?
                    } else {
                        Self::read_verbatim_offset(bits, slot)?
                    };
                    self.r2 = self.r1;
                    self.r1 = self.r0;
                    self.r0 = offset;
                    offset
                }
            };

            self.window.copy_match(match_offset, match_length as usize);
            this_run -= i64::from(match_length);
        }
        Ok(())
    }

    /// Offset decode for ALIGNED blocks: the low three offset bits come
    /// from the aligned tree once the slot carries more than three extras.
    fn read_aligned_offset<R: Read>(
        &mut self,
        bits: &mut BitReader<R>,
        slot: u32,
    ) -> Result<u32> {
        let extra = EXTRA_BITS[slot as usize];
        let base = POSITION_BASE[slot as usize] - 2;
        let offset = if extra > 3 {
            let verbatim = bits.read_bits(extra - 3)?;
            let aligned = u32::from(self.aligned_tree.read_symbol(bits)?);
            base + (verbatim << 3) + aligned
        } else if extra == 3 {
            base + u32::from(self.aligned_tree.read_symbol(bits)?)
        } else if extra > 0 {
            base + bits.read_bits(extra)?
        } else {
            1
        };
        Ok(offset)
    }

    /// Offset decode for VERBATIM blocks. Slot 3 short-circuits to offset 1
    /// even though it nominally carries an extra bit; the reference decoder
    /// does the same.
    fn read_verbatim_offset<R: Read>(bits: &mut BitReader<R>, slot: u32) -> Result<u32> {
        if slot == 3 {
            return Ok(1);
        }
        let extra = EXTRA_BITS[slot as usize];
        Ok(POSITION_BASE[slot as usize] - 2 + bits.read_bits(extra)?)
    }
}

impl std::fmt::Debug for LzxDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LzxDecoder")
            .field("window_size", &self.window.size())
            .field("window_posn", &self.window.position())
            .field("recent_offsets", &(self.r0, self.r1, self.r2))
            .field("block_type", &self.block_type)
            .field("block_remaining", &self.block_remaining)
            .field("frames_read", &self.frames_read)
            .finish()
    }
}
