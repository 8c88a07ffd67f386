//! # xnbdec Core
//!
//! Core components for the xnbdec XNB content decoder.
//!
//! This crate provides the primitives the rest of the workspace builds on:
//!
//! - [`bitstream`]: the LZX bit reader (16-bit little-endian words, MSB-first)
//! - [`error`]: the shared [`XnbError`] type and [`Result`] alias
//!
//! ## Architecture
//!
//! The workspace is a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     xnbdec binary: info, extract, artifact export       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     XNB header, ContentReader, type-reader registry     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     LZX (Huffman + LZ77 sliding window)                 │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Primitives (this crate)                             │
//! │     BitReader, error types                              │
//! └─────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use error::{Result, XnbError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitReader;
    pub use crate::error::{Result, XnbError};
}
