//! Info command implementation.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use xnbdec_content::{read_xnb, Asset};

pub fn cmd_info(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let metadata = std::fs::metadata(file)?;
    let xnb = read_xnb(BufReader::new(File::open(file)?))?;

    println!("XNB Information");
    println!("===============");
    println!("File: {}", file.display());
    println!("Platform: {}", xnb.header.platform);
    println!("Format version: {}", xnb.header.version);
    println!(
        "Profile: {}",
        if xnb.header.is_hidef() { "HiDef" } else { "Reach" }
    );
    println!("Size: {} bytes", metadata.len());
    if let Some(size) = xnb.decompressed_size {
        println!("Compressed: yes (LZX, {size} bytes decompressed)");
    } else {
        println!("Compressed: no");
    }

    println!();
    println!("Asset: {}", xnb.asset.kind());
    match &xnb.asset {
        Asset::Texture2D(tex) => {
            println!("  Dimensions: {}x{}", tex.width, tex.height);
            println!("  Format: {}", tex.format);
            println!("  Mip levels: {}", tex.mip_levels.len());
        }
        Asset::SoundEffect(sound) => {
            println!("  Duration: {} ms", sound.duration_ms);
            println!("  Sample data: {} bytes", sound.data.len());
            if sound.loop_length > 0 {
                println!(
                    "  Loop: start {} length {}",
                    sound.loop_start, sound.loop_length
                );
            }
        }
        Asset::SpriteFont(font) => {
            println!("  Glyphs: {}", font.glyphs.len());
            println!(
                "  Atlas: {}x{} ({})",
                font.texture.width, font.texture.height, font.texture.format
            );
            println!("  Line spacing: {}", font.line_spacing);
            if let Some(c) = font.default_character {
                println!("  Default character: {c:?}");
            }
        }
        Asset::List(items) => {
            println!("  Elements: {}", items.len());
        }
        Asset::String(s) => {
            println!("  Value: {s:?}");
        }
        Asset::Effect(effect) => {
            println!("  Bytecode: {} bytes", effect.bytecode.len());
        }
        _ => {}
    }

    Ok(())
}
