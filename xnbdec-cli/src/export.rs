//! Artifact writers: decoded assets to PNG/WAV/JSON bytes.

use image::codecs::png::PngEncoder;
use image::{ImageBuffer, RgbaImage};
use xnbdec_content::{SoundEffect, SpriteFont, SurfaceFormat, Texture2D};
use xnbdec_core::{Result, XnbError};

/// Encode the top mip of a texture as PNG. Only `Color` (32-bit BGRA)
/// surfaces are decoded; compressed formats are refused by name.
pub fn texture_to_png(texture: &Texture2D) -> Result<Vec<u8>> {
    if texture.format != SurfaceFormat::Color {
        return Err(XnbError::unsupported_format(format!(
            "{} surface (only Color textures export to PNG)",
            texture.format
        )));
    }
    let top_mip = texture
        .mip_levels
        .first()
        .ok_or_else(|| XnbError::malformed("texture has no mip levels"))?;

    let expected = texture.width as usize * texture.height as usize * 4;
    if top_mip.len() != expected {
        return Err(XnbError::malformed(format!(
            "texture data is {} bytes, expected {expected}",
            top_mip.len()
        )));
    }

    let rgba = bgra_to_rgba(top_mip);
    let img: RgbaImage =
        ImageBuffer::from_raw(texture.width as u32, texture.height as u32, rgba)
            .ok_or_else(|| XnbError::malformed("texture dimensions do not match data"))?;

    let mut png = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut png))
        .map_err(|e| XnbError::malformed(format!("PNG encoding failed: {e}")))?;
    Ok(png)
}

/// XNB `Color` surfaces store BGRA byte order.
fn bgra_to_rgba(bgra: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(bgra.len());
    for pixel in bgra.chunks_exact(4) {
        rgba.extend_from_slice(&[pixel[2], pixel[1], pixel[0], pixel[3]]);
    }
    rgba
}

/// Wrap a sound effect's stored WAVEFORMATEX and sample data in a RIFF
/// WAVE container.
pub fn sound_to_wav(sound: &SoundEffect) -> Vec<u8> {
    let fmt_len = sound.format.len() as u32;
    let data_len = sound.data.len() as u32;
    // RIFF size: "WAVE" + both chunk headers + both chunk bodies.
    let riff_size = 4 + (8 + fmt_len) + (8 + data_len);

    let mut wav = Vec::with_capacity(riff_size as usize + 8);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&riff_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&fmt_len.to_le_bytes());
    wav.extend_from_slice(&sound.format);
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(&sound.data);
    wav
}

/// Serialize sprite-font metrics (glyph tables, kerning, spacing) as JSON.
/// The atlas bitmap is exported separately as PNG.
pub fn font_to_json(font: &SpriteFont) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(font)
        .map_err(|e| XnbError::malformed(format!("JSON encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xnbdec_content::Texture2D;

    #[test]
    fn test_bgra_swizzle() {
        let bgra = [0x10, 0x20, 0x30, 0x40, 0xAA, 0xBB, 0xCC, 0xDD];
        assert_eq!(
            bgra_to_rgba(&bgra),
            vec![0x30, 0x20, 0x10, 0x40, 0xCC, 0xBB, 0xAA, 0xDD]
        );
    }

    #[test]
    fn test_wav_header_layout() {
        let sound = SoundEffect {
            format: vec![0u8; 16],
            data: vec![1, 2, 3, 4],
            loop_start: 0,
            loop_length: 0,
            duration_ms: 0,
        };
        let wav = sound_to_wav(&sound);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 4 + 24 + 12);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(wav[16..20].try_into().unwrap()), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 4);
        assert_eq!(&wav[44..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_non_color_texture_refused() {
        let texture = Texture2D {
            format: SurfaceFormat::Dxt5,
            width: 4,
            height: 4,
            mip_levels: vec![vec![0; 16]],
        };
        match texture_to_png(&texture) {
            Err(XnbError::UnsupportedFormat { what }) => assert!(what.contains("Dxt5")),
            other => panic!("expected unsupported format, got {other:?}"),
        }
    }

    #[test]
    fn test_color_texture_roundtrip() {
        let texture = Texture2D {
            format: SurfaceFormat::Color,
            width: 2,
            height: 1,
            mip_levels: vec![vec![0, 0, 255, 255, 255, 255, 255, 255]],
        };
        let png = texture_to_png(&texture).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
