//! The type-reader registry.
//!
//! XNB content opens with a table of .NET assembly-qualified reader class
//! names; objects in the stream dispatch through 1-based indexes into that
//! table. Names arrive decorated
//! (`..., Version=4.0.0.0, Culture=neutral, PublicKeyToken=...`) and
//! generic (`ListReader`1[[T, asm]]`), so they are normalized before
//! lookup.

use crate::asset::{Asset, Effect, Rectangle, SoundEffect, SpriteFont, SurfaceFormat, Texture2D,
    Vector2, Vector3};
use crate::reader::ContentReader;
use regex::Regex;
use std::io::Read;
use std::sync::OnceLock;
use xnbdec_core::error::{Result, XnbError};

const READER_NAMESPACE: &str = "Microsoft.Xna.Framework.Content.";
const LIST_READER_PREFIX: &str = "Microsoft.Xna.Framework.Content.ListReader";

/// A resolved type reader. `List` carries an index into the content
/// reader's element-reader table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeReader {
    /// `StringReader`.
    String,
    /// `Int32Reader`.
    Int32,
    /// `BooleanReader`.
    Boolean,
    /// `CharReader`.
    Char,
    /// `Vector2Reader`.
    Vector2,
    /// `Vector3Reader`.
    Vector3,
    /// `RectangleReader`.
    Rectangle,
    /// `EffectReader`.
    Effect,
    /// `Texture2DReader`.
    Texture2D,
    /// `SoundEffectReader`.
    SoundEffect,
    /// `SpriteFontReader`.
    SpriteFont,
    /// `ReflectiveReader`1`: declared but not decodable.
    Reflective,
    /// `ListReader`1`; the element reader is kept for declaration
    /// validation, elements themselves dispatch polymorphically.
    List {
        /// Index into [`ContentReader`]'s element-reader table.
        element: usize,
    },
}

/// Strip version/culture/token decorations and reduce generic arguments to
/// bare type names.
pub fn prepare_type_name(raw: &str) -> String {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    static GENERIC_ARG_RE: OnceLock<Regex> = OnceLock::new();
    static TRAILING_RE: OnceLock<Regex> = OnceLock::new();

    let version_re = VERSION_RE.get_or_init(|| {
        Regex::new(r", Version=[^,]+, Culture=[^,]+, PublicKeyToken=[^,]+").unwrap()
    });
    let generic_arg_re =
        GENERIC_ARG_RE.get_or_init(|| Regex::new(r"\[([^\[\]]+?),[^\]]+?\]").unwrap());
    let trailing_re = TRAILING_RE.get_or_init(|| Regex::new(r"(.+?),[^\]]+?$").unwrap());

    let mut name = version_re.replace_all(raw, "").into_owned();
    let nested = name.matches("[[").count();
    for _ in 0..nested {
        name = generic_arg_re.replace_all(&name, "[$1]").into_owned();
    }
    if name.contains("PublicKeyToken") {
        name = trailing_re.replace_all(&name, "$1").into_owned();
    }
    name
}

/// Split a prepared generic name into its base and argument list.
pub fn split_generic(name: &str) -> (&str, Vec<&str>) {
    let Some(start) = name.find("[[") else {
        return (name, Vec::new());
    };
    let Some(end) = name.rfind("]]") else {
        return (name, Vec::new());
    };
    let base = &name[..start];
    let args = name[start + 2..end].split("],[").collect();
    (base, args)
}

/// Reader for a non-generic reader class name. Built-in readers are often
/// written unqualified, but a trailing assembly name may survive
/// normalization; ignore it.
fn reader_for_class(base: &str) -> Option<TypeReader> {
    let base = base.split(',').next().unwrap_or(base).trim();
    let short = base.strip_prefix(READER_NAMESPACE)?;
    match short {
        "StringReader" => Some(TypeReader::String),
        "Int32Reader" => Some(TypeReader::Int32),
        "BooleanReader" => Some(TypeReader::Boolean),
        "CharReader" => Some(TypeReader::Char),
        "Vector2Reader" => Some(TypeReader::Vector2),
        "Vector3Reader" => Some(TypeReader::Vector3),
        "RectangleReader" => Some(TypeReader::Rectangle),
        "EffectReader" => Some(TypeReader::Effect),
        "Texture2DReader" => Some(TypeReader::Texture2D),
        "SoundEffectReader" => Some(TypeReader::SoundEffect),
        "SpriteFontReader" => Some(TypeReader::SpriteFont),
        "ReflectiveReader`1" => Some(TypeReader::Reflective),
        _ => None,
    }
}

/// Reader for a generic *element type* name (the `T` of `ListReader<T>`).
fn reader_for_element_type(type_name: &str) -> Option<TypeReader> {
    match type_name {
        "System.String" => Some(TypeReader::String),
        "System.Int32" => Some(TypeReader::Int32),
        "System.Boolean" => Some(TypeReader::Boolean),
        "System.Char" => Some(TypeReader::Char),
        "Microsoft.Xna.Framework.Vector2" => Some(TypeReader::Vector2),
        "Microsoft.Xna.Framework.Vector3" => Some(TypeReader::Vector3),
        "Microsoft.Xna.Framework.Rectangle" => Some(TypeReader::Rectangle),
        "Microsoft.Xna.Framework.Graphics.Texture2D" => Some(TypeReader::Texture2D),
        _ => None,
    }
}

/// Nesting bound for generic reader resolution; real content never comes
/// close, and it keeps mutually-referencing declarations from recursing.
const MAX_GENERIC_DEPTH: usize = 8;

/// Resolve one prepared reader name. List element readers land in
/// `elements`; unknown names fail declaration, as the reference parser does.
pub(crate) fn resolve_reader(
    prepared: &str,
    declared: &[String],
    elements: &mut Vec<TypeReader>,
) -> Result<TypeReader> {
    resolve_reader_at(prepared, declared, elements, 0)
}

fn resolve_reader_at(
    prepared: &str,
    declared: &[String],
    elements: &mut Vec<TypeReader>,
    depth: usize,
) -> Result<TypeReader> {
    if depth > MAX_GENERIC_DEPTH {
        return Err(XnbError::malformed("type reader declarations nest too deeply"));
    }
    let (base, args) = split_generic(prepared);
    if base.starts_with(LIST_READER_PREFIX) {
        if args.len() != 1 {
            return Err(XnbError::malformed(format!(
                "ListReader expects 1 generic argument, got {}",
                args.len()
            )));
        }
        let element = resolve_element(args[0], declared, elements, depth + 1)?;
        let index = elements.len();
        elements.push(element);
        return Ok(TypeReader::List { element: index });
    }
    reader_for_class(base).ok_or_else(|| XnbError::unknown_type_reader(base))
}

/// Resolve a list element: primitive element types map directly; anything
/// else must match another declared reader.
fn resolve_element(
    type_name: &str,
    declared: &[String],
    elements: &mut Vec<TypeReader>,
    depth: usize,
) -> Result<TypeReader> {
    if let Some(reader) = reader_for_element_type(type_name) {
        return Ok(reader);
    }
    let (base, _) = split_generic(type_name);
    for name in declared {
        let (declared_base, _) = split_generic(name);
        if name.as_str() == type_name || declared_base == base {
            return resolve_reader_at(name, declared, elements, depth + 1);
        }
    }
    Err(XnbError::unknown_type_reader(type_name))
}

impl TypeReader {
    /// Decode one value of this reader's content class.
    pub(crate) fn read<R: Read>(self, cr: &mut ContentReader<R>) -> Result<Asset> {
        match self {
            Self::String => Ok(Asset::String(cr.read_string()?)),
            Self::Int32 => Ok(Asset::Int32(cr.read_i32()?)),
            Self::Boolean => Ok(Asset::Boolean(cr.read_bool()?)),
            Self::Char => Ok(Asset::Char(cr.read_char()?)),
            Self::Vector2 => Ok(Asset::Vector2(Vector2 {
                x: cr.read_f32()?,
                y: cr.read_f32()?,
            })),
            Self::Vector3 => Ok(Asset::Vector3(read_vector3(cr)?)),
            Self::Rectangle => Ok(Asset::Rectangle(Rectangle {
                x: cr.read_i32()?,
                y: cr.read_i32()?,
                width: cr.read_i32()?,
                height: cr.read_i32()?,
            })),
            Self::Effect => {
                let length = cr.read_i32()?;
                Ok(Asset::Effect(Effect {
                    bytecode: cr.read_byte_block(length, "effect bytecode")?,
                }))
            }
            Self::Texture2D => Ok(Asset::Texture2D(read_texture(cr)?)),
            Self::SoundEffect => Ok(Asset::SoundEffect(read_sound_effect(cr)?)),
            Self::SpriteFont => Ok(Asset::SpriteFont(read_sprite_font(cr)?)),
            Self::Reflective => Err(XnbError::unsupported_format(
                "reflective type reader".to_string(),
            )),
            Self::List { .. } => {
                let count = cr.read_7bit_encoded_int()?;
                if count < 0 {
                    return Err(XnbError::malformed("negative list count"));
                }
                let mut items = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    items.push(cr.read_object()?);
                }
                Ok(Asset::List(items))
            }
        }
    }
}

fn read_vector3<R: Read>(cr: &mut ContentReader<R>) -> Result<Vector3> {
    Ok(Vector3 {
        x: cr.read_f32()?,
        y: cr.read_f32()?,
        z: cr.read_f32()?,
    })
}

fn read_texture<R: Read>(cr: &mut ContentReader<R>) -> Result<Texture2D> {
    let format = SurfaceFormat::from_i32(cr.read_i32()?);
    let width = cr.read_i32()?;
    let height = cr.read_i32()?;
    let level_count = cr.read_i32()?;
    if level_count < 0 {
        return Err(XnbError::malformed("negative mip level count"));
    }
    let mut mip_levels = Vec::with_capacity(level_count as usize);
    for _ in 0..level_count {
        let size = cr.read_i32()?;
        mip_levels.push(cr.read_byte_block(size, "texture mip data")?);
    }
    Ok(Texture2D {
        format,
        width,
        height,
        mip_levels,
    })
}

fn read_sound_effect<R: Read>(cr: &mut ContentReader<R>) -> Result<SoundEffect> {
    let format_size = cr.read_i32()?;
    let format = cr.read_byte_block(format_size, "sound format blob")?;
    let data_size = cr.read_i32()?;
    let data = cr.read_byte_block(data_size, "sound sample data")?;
    Ok(SoundEffect {
        format,
        data,
        loop_start: cr.read_i32()?,
        loop_length: cr.read_i32()?,
        duration_ms: cr.read_i32()?,
    })
}

fn read_sprite_font<R: Read>(cr: &mut ContentReader<R>) -> Result<SpriteFont> {
    let texture = match cr.read_object()? {
        Asset::Texture2D(texture) => texture,
        other => {
            return Err(XnbError::malformed(format!(
                "sprite font texture: expected Texture2D, found {}",
                other.kind()
            )))
        }
    };
    let glyphs = rectangle_list(cr.read_object()?, "glyph bounds")?;
    let cropping = rectangle_list(cr.read_object()?, "glyph cropping")?;
    let char_map = char_list(cr.read_object()?)?;
    let line_spacing = cr.read_i32()?;
    let spacing = cr.read_f32()?;
    let kerning = vector3_list(cr.read_object()?)?;
    let has_default = match cr.read_object()? {
        Asset::Boolean(value) => value,
        other => {
            return Err(XnbError::malformed(format!(
                "sprite font default-character flag: expected Boolean, found {}",
                other.kind()
            )))
        }
    };
    let default_character = if has_default {
        match cr.read_object()? {
            Asset::Char(c) => Some(c),
            other => {
                return Err(XnbError::malformed(format!(
                    "sprite font default character: expected Char, found {}",
                    other.kind()
                )))
            }
        }
    } else {
        None
    };
    Ok(SpriteFont {
        texture,
        glyphs,
        cropping,
        char_map,
        line_spacing,
        spacing,
        kerning,
        default_character,
    })
}

fn rectangle_list(asset: Asset, what: &str) -> Result<Vec<Rectangle>> {
    let items = expect_list(asset, what)?;
    items
        .into_iter()
        .map(|item| match item {
            Asset::Rectangle(rect) => Ok(rect),
            other => Err(XnbError::malformed(format!(
                "{what}: expected Rectangle, found {}",
                other.kind()
            ))),
        })
        .collect()
}

fn char_list(asset: Asset) -> Result<Vec<char>> {
    let items = expect_list(asset, "character map")?;
    items
        .into_iter()
        .map(|item| match item {
            Asset::Char(c) => Ok(c),
            other => Err(XnbError::malformed(format!(
                "character map: expected Char, found {}",
                other.kind()
            ))),
        })
        .collect()
}

fn vector3_list(asset: Asset) -> Result<Vec<Vector3>> {
    let items = expect_list(asset, "kerning table")?;
    items
        .into_iter()
        .map(|item| match item {
            Asset::Vector3(v) => Ok(v),
            other => Err(XnbError::malformed(format!(
                "kerning table: expected Vector3, found {}",
                other.kind()
            ))),
        })
        .collect()
}

fn expect_list(asset: Asset, what: &str) -> Result<Vec<Asset>> {
    match asset {
        Asset::List(items) => Ok(items),
        Asset::Null => Ok(Vec::new()),
        other => Err(XnbError::malformed(format!(
            "{what}: expected List, found {}",
            other.kind()
        ))),
    }
}
