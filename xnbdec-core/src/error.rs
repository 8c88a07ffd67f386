//! Error types for XNB decoding.
//!
//! This module provides one shared error type covering every failure mode in
//! the workspace: I/O errors, LZX bitstream corruption, and XNB container
//! validation errors.

use std::io;
use thiserror::Error;

/// The main error type for XNB decoding operations.
#[derive(Debug, Error)]
pub enum XnbError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Compressed input ran out mid-symbol or mid-bits.
    #[error("Unexpected end of input: expected {expected} more bits")]
    UnexpectedEof {
        /// Number of bits that were expected but not available.
        expected: usize,
    },

    /// LZX block header specifies a reserved block type.
    #[error("Invalid LZX block type: {value}")]
    InvalidBlockType {
        /// The 3-bit block type value found in the stream.
        value: u8,
    },

    /// Canonical Huffman code lengths overfill the lookup table, or a tree
    /// walk exhausted the 32-bit accumulator.
    #[error("Huffman table overrun")]
    TableOverrun,

    /// Code lengths leave unreachable codes yet some symbol has a non-zero
    /// length.
    #[error("Erroneous Huffman table: {assigned} of {slots} slots assigned")]
    ErroneousTable {
        /// Table slots covered by the supplied code lengths.
        assigned: usize,
        /// Total primary table slots.
        slots: usize,
    },

    /// An uncompressed LZX block would run past the window end.
    #[error("Window overrun: {needed} bytes requested, {remaining} before wrap")]
    WindowOverrun {
        /// Bytes the block wanted to write.
        needed: usize,
        /// Bytes left before the window boundary.
        remaining: usize,
    },

    /// LZX decoder constructed with an out-of-range window size.
    #[error("Unsupported window size: {bits} bits (must be 15-21)")]
    UnsupportedWindow {
        /// The rejected window exponent.
        bits: u32,
    },

    /// File does not start with the XNB magic bytes.
    #[error("Invalid XNB magic: expected \"XNB\", found {found:02x?}")]
    InvalidMagic {
        /// The bytes found where the magic was expected.
        found: [u8; 3],
    },

    /// Structurally invalid XNB header.
    #[error("Invalid XNB header: {message}")]
    InvalidHeader {
        /// Description of the header problem.
        message: String,
    },

    /// Content stream declares a type reader this decoder does not know.
    #[error("Unrecognized type reader: {name}")]
    UnknownTypeReader {
        /// Normalized .NET type name of the missing reader.
        name: String,
    },

    /// Object dispatch index points outside the declared reader table.
    #[error("Type reader index {index} out of bounds ({count} readers declared)")]
    TypeReaderIndex {
        /// The 7-bit-encoded index read from the stream.
        index: i32,
        /// Number of declared type readers.
        count: usize,
    },

    /// Asset payload cannot be exported in the requested form.
    #[error("Unsupported format: {what}")]
    UnsupportedFormat {
        /// Description of the unsupported format.
        what: String,
    },

    /// Content stream data violates the wire format.
    #[error("Malformed content data: {message}")]
    MalformedData {
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for XNB decoding operations.
pub type Result<T> = std::result::Result<T, XnbError>;

impl XnbError {
    /// Create an unexpected-EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid block type error.
    pub fn invalid_block_type(value: u8) -> Self {
        Self::InvalidBlockType { value }
    }

    /// Create an erroneous-table error.
    pub fn erroneous_table(assigned: usize, slots: usize) -> Self {
        Self::ErroneousTable { assigned, slots }
    }

    /// Create a window overrun error.
    pub fn window_overrun(needed: usize, remaining: usize) -> Self {
        Self::WindowOverrun { needed, remaining }
    }

    /// Create an unsupported window size error.
    pub fn unsupported_window(bits: u32) -> Self {
        Self::UnsupportedWindow { bits }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(found: [u8; 3]) -> Self {
        Self::InvalidMagic { found }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unknown type reader error.
    pub fn unknown_type_reader(name: impl Into<String>) -> Self {
        Self::UnknownTypeReader { name: name.into() }
    }

    /// Create a type reader index error.
    pub fn type_reader_index(index: i32, count: usize) -> Self {
        Self::TypeReaderIndex { index, count }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(what: impl Into<String>) -> Self {
        Self::UnsupportedFormat { what: what.into() }
    }

    /// Create a malformed data error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedData {
            message: message.into(),
        }
    }
}
