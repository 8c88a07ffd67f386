//! XNB file header.
//!
//! Every XNB file opens with a fixed 10-byte preamble: the `XNB` magic, a
//! target-platform byte, the format version, a flags byte, and the total
//! file size. A compressed file follows the header with a 32-bit
//! decompressed size before the LZX payload.

use byteorder::{LittleEndian, ReadBytesExt};
use xnbdec_core::error::{Result, XnbError};
use std::io::Read;

/// XNB magic bytes.
pub const MAGIC: [u8; 3] = *b"XNB";

/// Header flag: payload is LZX-compressed.
pub const FLAG_COMPRESSED: u8 = 0x80;
/// Header flag: content targets the HiDef graphics profile.
pub const FLAG_HIDEF: u8 = 0x01;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: u32 = 10;
/// Bytes occupied by the decompressed-size word in compressed files.
pub const COMPRESSED_SIZE_FIELD: u32 = 4;

/// Target platform, from the byte following the magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Desktop Windows (`w`).
    Windows,
    /// Windows Phone (`m`).
    Phone,
    /// Xbox 360 (`x`).
    Xbox,
    /// Any platform byte this decoder does not recognize.
    Unknown(u8),
}

impl Platform {
    /// Map the on-disk platform byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'w' => Self::Windows,
            b'm' => Self::Phone,
            b'x' => Self::Xbox,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windows => write!(f, "Windows"),
            Self::Phone => write!(f, "Windows Phone"),
            Self::Xbox => write!(f, "Xbox 360"),
            Self::Unknown(byte) => write!(f, "Unknown ({byte:#04x})"),
        }
    }
}

/// The fixed XNB preamble.
#[derive(Debug, Clone, Copy)]
pub struct XnbHeader {
    /// Target platform.
    pub platform: Platform,
    /// Format version; 5 is XNA Game Studio 4.0.
    pub version: u8,
    /// Flag bits.
    pub flags: u8,
    /// Total file size including this header.
    pub file_size: u32,
}

impl XnbHeader {
    /// Read and validate the header.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 3];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(XnbError::invalid_magic(magic));
        }
        let platform = Platform::from_byte(reader.read_u8()?);
        let version = reader.read_u8()?;
        let flags = reader.read_u8()?;
        let file_size = reader.read_u32::<LittleEndian>()?;
        Ok(Self {
            platform,
            version,
            flags,
            file_size,
        })
    }

    /// Whether the payload is LZX-compressed.
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    /// Whether the content targets the HiDef profile.
    pub fn is_hidef(&self) -> bool {
        self.flags & FLAG_HIDEF != 0
    }

    /// Length of the content region following the header.
    pub fn content_size(&self) -> u32 {
        let mut size = self.file_size.saturating_sub(HEADER_SIZE);
        if self.is_compressed() {
            size = size.saturating_sub(COMPRESSED_SIZE_FIELD);
        }
        size
    }
}
