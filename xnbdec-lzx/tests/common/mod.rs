//! A minimal LZX stream writer for decoder tests.
//!
//! Produces syntactically valid single-frame or multi-frame LZX streams:
//! bits are packed MSB-first into 16-bit little-endian words, trees are
//! transmitted through the standard pretree delta coding, and match offsets
//! go through the position-slot encoding. Only what the tests need: the
//! caller picks code lengths and drives the LRU registers by hand.

/// Extra offset bits per position slot (mirrors the decoder's table).
pub fn extra_bits(slot: usize) -> u8 {
    match slot {
        0..=3 => 0,
        4..=35 => (slot / 2 - 1) as u8,
        _ => 17,
    }
}

/// Base formatted offset per position slot.
pub fn position_base(slot: usize) -> u32 {
    let mut base = 0u32;
    for s in 0..slot {
        base += 1 << extra_bits(s);
    }
    base
}

/// Find the position slot covering a formatted offset (`offset + 2`).
pub fn position_slot(formatted: u32) -> usize {
    let mut slot = 0;
    while position_base(slot + 1) <= formatted {
        slot += 1;
    }
    slot
}

/// Canonical code per symbol for a code-length vector, assigned the way the
/// decoder's table builder consumes them.
pub fn canonical_codes(lengths: &[u8]) -> Vec<u32> {
    let mut codes = vec![0u32; lengths.len()];
    let mut pos: u32 = 0;
    for bit_num in 1..=16u8 {
        for (sym, &len) in lengths.iter().enumerate() {
            if len == bit_num {
                codes[sym] = pos >> (16 - bit_num);
                pos += 1 << (16 - bit_num);
            }
        }
    }
    codes
}

/// Pretree used for every length pass the tests write: run codes and the
/// zero delta at 3 bits, all other deltas at 5 (a complete code).
pub const TEST_PRETREE: [u8; 20] = [
    3, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 3, 3, 3,
];

/// Length-tree lengths the tests share: symbols 0..=30 and 248 at five bits
/// (a complete code), so both short footers and the 257-byte match footer
/// are encodable. Only 249 lengths go on the wire.
pub fn test_length_lengths() -> Vec<u8> {
    let mut lens = vec![0u8; 249];
    for sym in 0..=30 {
        lens[sym] = 5;
    }
    lens[248] = 5;
    lens
}

/// Main-tree lengths: all 256 literals at nine bits plus exactly four match
/// symbols at three bits (Kraft-complete). Unused slots in `match_syms` can
/// name any distinct unused match element.
pub fn test_main_lengths(main_elements: usize, match_syms: [usize; 4]) -> Vec<u8> {
    let mut lens = vec![0u8; main_elements];
    for slot in lens.iter_mut().take(256) {
        *slot = 9;
    }
    for sym in match_syms {
        assert!(sym >= 256 && sym < main_elements);
        lens[sym] = 3;
    }
    lens
}

/// Main-tree lengths for literal-only blocks: 256 eight-bit codes fill the
/// code space exactly.
pub fn literal_only_main_lengths(main_elements: usize) -> Vec<u8> {
    let mut lens = vec![0u8; main_elements];
    for slot in lens.iter_mut().take(256) {
        *slot = 8;
    }
    lens
}

/// Bit sink producing the 16-bit little-endian word stream LZX reads.
pub struct StreamWriter {
    bytes: Vec<u8>,
    word: u16,
    filled: u8,
}

impl StreamWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            word: 0,
            filled: 0,
        }
    }

    /// Append `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        for bit in (0..count).rev() {
            self.word = (self.word << 1) | (((value >> bit) & 1) as u16);
            self.filled += 1;
            if self.filled == 16 {
                self.bytes.extend_from_slice(&self.word.to_le_bytes());
                self.word = 0;
                self.filled = 0;
            }
        }
    }

    /// Pad the current word with zero bits, as the encoder does before raw
    /// byte regions.
    pub fn align_word(&mut self) {
        if self.filled > 0 {
            let pad = 16 - self.filled;
            self.write_bits(0, pad);
        }
    }

    /// Append raw bytes. Only legal on a word boundary.
    pub fn write_raw(&mut self, data: &[u8]) {
        assert_eq!(self.filled, 0, "raw bytes must start word-aligned");
        self.bytes.extend_from_slice(data);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.align_word();
        self.bytes
    }
}

/// Stateful encoder: tracks the persistent main/length code lengths so
/// consecutive blocks (and frames) transmit correct deltas.
pub struct StreamEncoder {
    pub writer: StreamWriter,
    main_elements: usize,
    main_old: Vec<u8>,
    length_old: Vec<u8>,
    main_codes: Vec<u32>,
    main_lens: Vec<u8>,
    length_codes: Vec<u32>,
    length_lens: Vec<u8>,
    aligned_codes: Vec<u32>,
    aligned_lens: Vec<u8>,
}

impl StreamEncoder {
    pub fn new(main_elements: usize) -> Self {
        Self {
            writer: StreamWriter::new(),
            main_elements,
            main_old: vec![0; main_elements],
            length_old: vec![0; 249],
            main_codes: Vec::new(),
            main_lens: Vec::new(),
            length_codes: Vec::new(),
            length_lens: Vec::new(),
            aligned_codes: Vec::new(),
            aligned_lens: Vec::new(),
        }
    }

    /// The 1-bit "no Intel E8 header" stream preamble.
    pub fn write_stream_header(&mut self) {
        self.writer.write_bits(0, 1);
    }

    /// Start a new frame, keeping the persistent tree lengths.
    pub fn next_frame(&mut self) -> Vec<u8> {
        let writer = std::mem::replace(&mut self.writer, StreamWriter::new());
        writer.finish()
    }

    fn write_lengths_pass(writer: &mut StreamWriter, old: &[u8], new: &[u8]) {
        let codes = canonical_codes(&TEST_PRETREE);
        for &len in TEST_PRETREE.iter() {
            writer.write_bits(u32::from(len), 4);
        }
        let mut i = 0;
        while i < new.len() {
            if new[i] == 0 {
                let mut run = 0;
                while i + run < new.len() && new[i + run] == 0 {
                    run += 1;
                }
                if run >= 4 {
                    let mut rem = run;
                    while rem >= 20 {
                        let chunk = rem.min(51);
                        writer.write_bits(codes[18], TEST_PRETREE[18]);
                        writer.write_bits((chunk - 20) as u32, 5);
                        rem -= chunk;
                    }
                    while rem >= 4 {
                        let chunk = rem.min(19);
                        writer.write_bits(codes[17], TEST_PRETREE[17]);
                        writer.write_bits((chunk - 4) as u32, 4);
                        rem -= chunk;
                    }
                    i += run - rem;
                    for _ in 0..rem {
                        Self::write_delta(writer, &codes, old[i], 0);
                        i += 1;
                    }
                    continue;
                }
            }
            Self::write_delta(writer, &codes, old[i], new[i]);
            i += 1;
        }
    }

    fn write_delta(writer: &mut StreamWriter, codes: &[u32], old: u8, new: u8) {
        let z = (i32::from(old) - i32::from(new)).rem_euclid(17) as usize;
        writer.write_bits(codes[z], TEST_PRETREE[z]);
    }

    fn write_trees(&mut self, main_new: &[u8], length_new: &[u8]) {
        assert_eq!(main_new.len(), self.main_elements);
        Self::write_lengths_pass(&mut self.writer, &self.main_old[..256], &main_new[..256]);
        Self::write_lengths_pass(&mut self.writer, &self.main_old[256..], &main_new[256..]);
        Self::write_lengths_pass(&mut self.writer, &self.length_old, length_new);
        self.main_old.copy_from_slice(main_new);
        self.length_old.copy_from_slice(length_new);
        self.main_codes = canonical_codes(main_new);
        self.main_lens = main_new.to_vec();
        self.length_codes = canonical_codes(length_new);
        self.length_lens = length_new.to_vec();
    }

    fn write_block_header(&mut self, block_type: u32, block_length: u32) {
        self.writer.write_bits(block_type, 3);
        self.writer.write_bits(block_length >> 8, 16);
        self.writer.write_bits(block_length & 0xFF, 8);
    }

    /// VERBATIM block header plus tree passes.
    pub fn begin_verbatim_block(
        &mut self,
        block_length: u32,
        main_new: &[u8],
        length_new: &[u8],
    ) {
        self.write_block_header(1, block_length);
        self.write_trees(main_new, length_new);
    }

    /// ALIGNED block header: aligned tree lengths first, then the usual
    /// tree passes.
    pub fn begin_aligned_block(
        &mut self,
        block_length: u32,
        aligned_new: &[u8; 8],
        main_new: &[u8],
        length_new: &[u8],
    ) {
        self.write_block_header(2, block_length);
        for &len in aligned_new {
            self.writer.write_bits(u32::from(len), 3);
        }
        self.write_trees(main_new, length_new);
        self.aligned_codes = canonical_codes(aligned_new);
        self.aligned_lens = aligned_new.to_vec();
    }

    /// UNCOMPRESSED block: header, word alignment, new R0/R1/R2, raw data,
    /// and the pad byte when the length is odd.
    pub fn write_uncompressed_block(&mut self, r: (u32, u32, u32), data: &[u8]) {
        self.write_block_header(3, data.len() as u32);
        self.writer.align_word();
        self.writer.write_raw(&r.0.to_le_bytes());
        self.writer.write_raw(&r.1.to_le_bytes());
        self.writer.write_raw(&r.2.to_le_bytes());
        self.writer.write_raw(data);
        if data.len() % 2 == 1 {
            self.writer.write_raw(&[0]);
        }
    }

    pub fn literal(&mut self, byte: u8) {
        let sym = byte as usize;
        self.writer
            .write_bits(self.main_codes[sym], self.main_lens[sym]);
    }

    fn match_header(&mut self, sym: usize, length: u32) {
        assert!((2..=257).contains(&length));
        self.writer
            .write_bits(self.main_codes[sym], self.main_lens[sym]);
        if length - 2 >= 7 {
            let footer = (length - 2 - 7) as usize;
            self.writer
                .write_bits(self.length_codes[footer], self.length_lens[footer]);
        }
    }

    /// Match symbol for a slot/length pair.
    pub fn match_symbol(slot: usize, length: u32) -> usize {
        let header = (length - 2).min(7);
        256 + (slot << 3) + header as usize
    }

    /// Match against an absolute offset in a VERBATIM block.
    pub fn match_verbatim(&mut self, offset: u32, length: u32) {
        let formatted = offset + 2;
        let slot = position_slot(formatted);
        self.match_header(Self::match_symbol(slot, length), length);
        let verbatim = formatted - position_base(slot);
        // Slot 3 carries no offset bits: the decoder hardwires offset 1.
        if slot != 3 {
            self.writer.write_bits(verbatim, extra_bits(slot));
        }
    }

    /// Match against an absolute offset in an ALIGNED block.
    pub fn match_aligned(&mut self, offset: u32, length: u32) {
        let formatted = offset + 2;
        let slot = position_slot(formatted);
        self.match_header(Self::match_symbol(slot, length), length);
        let extra = extra_bits(slot);
        let v = formatted - position_base(slot);
        if extra > 3 {
            self.writer.write_bits(v >> 3, extra - 3);
            let sym = (v & 7) as usize;
            self.writer
                .write_bits(self.aligned_codes[sym], self.aligned_lens[sym]);
        } else if extra == 3 {
            let sym = v as usize;
            self.writer
                .write_bits(self.aligned_codes[sym], self.aligned_lens[sym]);
        } else if extra > 0 {
            self.writer.write_bits(v, extra);
        }
    }

    /// Match recalling one of the R0/R1/R2 registers (slots 0..=2).
    pub fn match_recent(&mut self, slot: usize, length: u32) {
        assert!(slot <= 2);
        self.match_header(Self::match_symbol(slot, length), length);
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.finish()
    }
}
