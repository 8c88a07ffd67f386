//! Decoded asset model.
//!
//! [`Asset`] is the sum of every content class this decoder understands.
//! The structs mirror the XNA wire formats; payload bytes (texture mips,
//! shader bytecode, PCM data) are carried opaquely.

use serde::Serialize;

/// A 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vector2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

/// A 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vector3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

/// An integer rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rectangle {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// Texture pixel formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SurfaceFormat {
    /// 32-bit BGRA.
    Color,
    /// DXT1 block compression.
    Dxt1,
    /// DXT3 block compression.
    Dxt3,
    /// DXT5 block compression.
    Dxt5,
    /// Any format this decoder does not interpret.
    Unknown(i32),
}

impl SurfaceFormat {
    /// Map the on-disk format discriminant.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Color,
            4 => Self::Dxt1,
            5 => Self::Dxt3,
            6 => Self::Dxt5,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Color => write!(f, "Color"),
            Self::Dxt1 => write!(f, "Dxt1"),
            Self::Dxt3 => write!(f, "Dxt3"),
            Self::Dxt5 => write!(f, "Dxt5"),
            Self::Unknown(value) => write!(f, "Unknown({value})"),
        }
    }
}

/// A 2D texture with its mipmap chain.
#[derive(Debug, Clone, Serialize)]
pub struct Texture2D {
    /// Pixel format of every mip level.
    pub format: SurfaceFormat,
    /// Width of the top mip in pixels.
    pub width: i32,
    /// Height of the top mip in pixels.
    pub height: i32,
    /// Raw pixel data, one entry per mip level.
    #[serde(skip_serializing)]
    pub mip_levels: Vec<Vec<u8>>,
}

/// A compiled shader effect.
#[derive(Debug, Clone, Serialize)]
pub struct Effect {
    /// Opaque shader bytecode.
    #[serde(skip_serializing)]
    pub bytecode: Vec<u8>,
}

/// A sound effect: a WAVEFORMATEX blob plus sample data.
#[derive(Debug, Clone, Serialize)]
pub struct SoundEffect {
    /// Raw WAVEFORMATEX structure as stored in the file.
    #[serde(skip_serializing)]
    pub format: Vec<u8>,
    /// Raw sample data.
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
    /// Loop start in samples.
    pub loop_start: i32,
    /// Loop length in samples.
    pub loop_length: i32,
    /// Duration in milliseconds.
    pub duration_ms: i32,
}

/// A bitmap sprite font.
#[derive(Debug, Clone, Serialize)]
pub struct SpriteFont {
    /// The glyph atlas.
    #[serde(skip_serializing)]
    pub texture: Texture2D,
    /// Bounding rectangle per glyph in the atlas.
    pub glyphs: Vec<Rectangle>,
    /// Cropping rectangle per glyph.
    pub cropping: Vec<Rectangle>,
    /// Character each glyph renders.
    pub char_map: Vec<char>,
    /// Vertical advance between lines.
    pub line_spacing: i32,
    /// Horizontal padding between characters.
    pub spacing: f32,
    /// Per-glyph kerning: left bearing, width, right bearing.
    pub kerning: Vec<Vector3>,
    /// Substitute for characters missing from the map.
    pub default_character: Option<char>,
}

/// Any decoded XNB asset.
#[derive(Debug, Clone, Serialize)]
pub enum Asset {
    /// A null object reference.
    Null,
    /// A string.
    String(String),
    /// A 32-bit integer.
    Int32(i32),
    /// A boolean.
    Boolean(bool),
    /// A single character.
    Char(char),
    /// A 2D vector.
    Vector2(Vector2),
    /// A 3D vector.
    Vector3(Vector3),
    /// A rectangle.
    Rectangle(Rectangle),
    /// A homogeneous list of objects.
    List(Vec<Asset>),
    /// A compiled shader.
    Effect(Effect),
    /// A texture.
    Texture2D(Texture2D),
    /// A sound effect.
    SoundEffect(SoundEffect),
    /// A sprite font.
    SpriteFont(SpriteFont),
}

impl Asset {
    /// Human-readable name of the asset kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::String(_) => "String",
            Self::Int32(_) => "Int32",
            Self::Boolean(_) => "Boolean",
            Self::Char(_) => "Char",
            Self::Vector2(_) => "Vector2",
            Self::Vector3(_) => "Vector3",
            Self::Rectangle(_) => "Rectangle",
            Self::List(_) => "List",
            Self::Effect(_) => "Effect",
            Self::Texture2D(_) => "Texture2D",
            Self::SoundEffect(_) => "SoundEffect",
            Self::SpriteFont(_) => "SpriteFont",
        }
    }
}
