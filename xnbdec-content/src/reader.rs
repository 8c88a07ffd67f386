//! The content stream reader.
//!
//! [`ContentReader`] is a little-endian binary cursor over the (possibly
//! decompressed) content region of an XNB file. It owns the declared
//! type-reader table and dispatches polymorphic objects through it.
//! [`read_xnb`] is the top-level entry point: header, optional LZX
//! decompression, reader table, primary asset.

use crate::asset::Asset;
use crate::header::{Platform, XnbHeader};
use crate::typereader::{prepare_type_name, resolve_reader, TypeReader};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use xnbdec_core::error::{Result, XnbError};
use xnbdec_lzx::LzxDecoder;

/// LZX window exponent used by every compressed XNB payload (64 KiB).
pub const XNB_WINDOW_BITS: u32 = 16;

/// A fully decoded XNB file.
#[derive(Debug)]
pub struct XnbFile {
    /// The file header.
    pub header: XnbHeader,
    /// Decompressed content size, for compressed files.
    pub decompressed_size: Option<u32>,
    /// The primary asset.
    pub asset: Asset,
}

/// Binary cursor over XNB content with the declared reader table.
#[derive(Debug)]
pub struct ContentReader<R> {
    reader: R,
    platform: Platform,
    version: u8,
    readers: Vec<TypeReader>,
    list_elements: Vec<TypeReader>,
}

impl<R: Read> ContentReader<R> {
    /// Wrap a content stream. Call
    /// [`init_type_readers`](Self::init_type_readers) before
    /// [`read_object`](Self::read_object).
    pub fn new(reader: R, platform: Platform, version: u8) -> Self {
        Self {
            reader,
            platform,
            version,
            readers: Vec::new(),
            list_elements: Vec::new(),
        }
    }

    /// Target platform from the file header.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Format version from the file header.
    pub fn version(&self) -> u8 {
        self.version
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.reader.read_u8()?)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(self.reader.read_i32::<LittleEndian>()?)
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32> {
        Ok(self.reader.read_f32::<LittleEndian>()?)
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a length-prefixed byte block; the length comes from the stream
    /// and must not be negative.
    pub(crate) fn read_byte_block(&mut self, length: i32, what: &str) -> Result<Vec<u8>> {
        if length < 0 {
            return Err(XnbError::malformed(format!("negative length for {what}")));
        }
        let mut buf = vec![0u8; length as usize];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a .NET 7-bit variable-length integer (at most five bytes).
    pub fn read_7bit_encoded_int(&mut self) -> Result<i32> {
        let mut result: i32 = 0;
        let mut shift = 0;
        for _ in 0..5 {
            let byte = self.read_u8()?;
            result |= i32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
        Err(XnbError::malformed("7-bit encoded integer too long"))
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_7bit_encoded_int()?;
        let bytes = self.read_byte_block(length, "string")?;
        String::from_utf8(bytes).map_err(|_| XnbError::malformed("string is not valid UTF-8"))
    }

    /// Read one UTF-8 encoded character.
    pub fn read_char(&mut self) -> Result<char> {
        let lead = self.read_u8()?;
        let extra = match lead {
            0x00..=0x7F => 0,
            0xC0..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF7 => 3,
            _ => return Err(XnbError::malformed("invalid UTF-8 lead byte in char")),
        };
        let mut buf = [lead, 0, 0, 0];
        self.reader.read_exact(&mut buf[1..=extra])?;
        std::str::from_utf8(&buf[..=extra])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or_else(|| XnbError::malformed("invalid UTF-8 sequence in char"))
    }

    /// Read the type-reader declarations: a 7-bit-encoded count, then a
    /// name string and an `i32` version per reader.
    pub fn init_type_readers(&mut self) -> Result<()> {
        let count = self.read_7bit_encoded_int()?;
        if count < 0 {
            return Err(XnbError::malformed("negative type reader count"));
        }
        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let raw = self.read_string()?;
            names.push(prepare_type_name(&raw));
            // Per-reader version; nothing dispatches on it.
            let _version = self.read_i32()?;
        }
        self.readers = names
            .iter()
            .map(|name| resolve_reader(name, &names, &mut self.list_elements))
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    /// Declared reader table.
    pub fn type_readers(&self) -> &[TypeReader] {
        &self.readers
    }

    /// Read one polymorphic object: a 7-bit-encoded reader index, 0 for
    /// null, `i` for reader `i - 1`.
    pub fn read_object(&mut self) -> Result<Asset> {
        let index = self.read_7bit_encoded_int()?;
        if index == 0 {
            return Ok(Asset::Null);
        }
        if index < 0 || index as usize > self.readers.len() {
            return Err(XnbError::type_reader_index(index, self.readers.len()));
        }
        let reader = self.readers[(index - 1) as usize];
        reader.read(self)
    }
}

/// Decode a complete XNB file from a reader.
pub fn read_xnb<R: Read>(mut reader: R) -> Result<XnbFile> {
    let header = XnbHeader::read(&mut reader)?;

    if header.is_compressed() {
        let decompressed_size = reader.read_u32::<LittleEndian>()?;
        let mut decoder = LzxDecoder::new(XNB_WINDOW_BITS)?;
        let mut payload = Vec::with_capacity(decompressed_size as usize);
        decoder.decompress(
            &mut reader,
            header.content_size() as usize,
            &mut payload,
            decompressed_size as usize,
        )?;
        let asset = read_content(Cursor::new(payload), &header)?;
        Ok(XnbFile {
            header,
            decompressed_size: Some(decompressed_size),
            asset,
        })
    } else {
        let asset = read_content(reader, &header)?;
        Ok(XnbFile {
            header,
            decompressed_size: None,
            asset,
        })
    }
}

/// Decode the primary asset of an XNB file.
pub fn read_asset<R: Read>(reader: R) -> Result<Asset> {
    Ok(read_xnb(reader)?.asset)
}

/// Decode the primary asset from an in-memory XNB file.
pub fn read_asset_bytes(bytes: &[u8]) -> Result<Asset> {
    read_asset(Cursor::new(bytes))
}

fn read_content<R: Read>(reader: R, header: &XnbHeader) -> Result<Asset> {
    let mut content = ContentReader::new(reader, header.platform, header.version);
    content.init_type_readers()?;
    content.read_object()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_reader(bytes: &[u8]) -> ContentReader<Cursor<Vec<u8>>> {
        ContentReader::new(Cursor::new(bytes.to_vec()), Platform::Windows, 5)
    }

    #[test]
    fn test_7bit_int_boundaries() {
        let cases: &[(&[u8], i32)] = &[
            (&[0x00], 0),
            (&[0x7F], 127),
            (&[0x80, 0x01], 128),
            (&[0xFF, 0x7F], 16_383),
            (&[0x80, 0x80, 0x01], 16_384),
            (&[0xFF, 0xFF, 0xFF, 0xFF, 0x07], i32::MAX),
        ];
        for (bytes, expected) in cases {
            let mut cr = content_reader(bytes);
            assert_eq!(cr.read_7bit_encoded_int().unwrap(), *expected);
        }
    }

    #[test]
    fn test_7bit_int_overlong_rejected() {
        let mut cr = content_reader(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert!(matches!(
            cr.read_7bit_encoded_int(),
            Err(XnbError::MalformedData { .. })
        ));
    }

    #[test]
    fn test_read_string() {
        let mut bytes = vec![5u8];
        bytes.extend_from_slice(b"hello");
        let mut cr = content_reader(&bytes);
        assert_eq!(cr.read_string().unwrap(), "hello");
    }

    #[test]
    fn test_read_multibyte_char() {
        let mut bytes = Vec::new();
        let mut buf = [0u8; 4];
        bytes.extend_from_slice('é'.encode_utf8(&mut buf).as_bytes());
        let mut cr = content_reader(&bytes);
        assert_eq!(cr.read_char().unwrap(), 'é');
    }

    #[test]
    fn test_read_object_null() {
        let mut cr = content_reader(&[0x00]);
        assert!(matches!(cr.read_object().unwrap(), Asset::Null));
    }

    #[test]
    fn test_read_object_index_out_of_bounds() {
        let mut cr = content_reader(&[0x02]);
        assert!(matches!(
            cr.read_object(),
            Err(XnbError::TypeReaderIndex { index: 2, count: 0 })
        ));
    }
}
