//! # xnbdec LZX
//!
//! LZX decompression for XNB content files.
//!
//! LZX is the dictionary coder the XNA content pipeline used for compressed
//! `.xnb` payloads: three block encodings (verbatim, aligned-offset,
//! uncompressed) over four canonical Huffman trees, a 32 KiB - 2 MiB sliding
//! window, and a three-deep LRU of recent match offsets. The decoder here is
//! bit-exact with the wire format.
//!
//! ## Example
//!
//! ```no_run
//! use xnbdec_lzx::LzxDecoder;
//! use std::io::Cursor;
//!
//! let compressed: Vec<u8> = std::fs::read("payload.lzx").unwrap();
//! let mut decoder = LzxDecoder::new(16).unwrap();
//! let mut decoded = Vec::new();
//! decoder
//!     .decompress(Cursor::new(&compressed), compressed.len(), &mut decoded, 4096)
//!     .unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decoder;
pub mod huffman;
mod window;

pub use decoder::{LzxDecoder, MAX_MATCH, MAX_WINDOW_BITS, MIN_MATCH, MIN_WINDOW_BITS};
pub use huffman::{CanonicalTree, PretreeDecoder};
