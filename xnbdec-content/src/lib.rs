//! # xnbdec Content
//!
//! XNB container parsing for the xnbdec decoder.
//!
//! An `.xnb` file is a 10-byte header, an optional LZX-compressed wrapper,
//! a table of .NET type-reader declarations, and one primary asset decoded
//! through that table. This crate provides:
//!
//! - [`header`]: the fixed preamble and its flags
//! - [`reader`]: the [`ContentReader`] binary cursor and [`read_xnb`] entry
//!   point (decompression included)
//! - [`typereader`]: reader-name normalization and the concrete readers
//! - [`asset`]: the decoded [`Asset`] model
//!
//! ## Example
//!
//! ```no_run
//! use xnbdec_content::read_asset;
//! use std::fs::File;
//!
//! let asset = read_asset(File::open("sprite.xnb").unwrap()).unwrap();
//! println!("decoded a {}", asset.kind());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod asset;
pub mod header;
pub mod reader;
pub mod typereader;

// Re-exports
pub use asset::{
    Asset, Effect, Rectangle, SoundEffect, SpriteFont, SurfaceFormat, Texture2D, Vector2, Vector3,
};
pub use header::{Platform, XnbHeader};
pub use reader::{read_asset, read_asset_bytes, read_xnb, ContentReader, XnbFile, XNB_WINDOW_BITS};
pub use typereader::TypeReader;
