//! Extract command implementation.

use crate::export::{font_to_json, sound_to_wav, texture_to_png};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use xnbdec_content::{read_xnb, Asset};

pub fn cmd_extract(
    file: &PathBuf,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let xnb = read_xnb(BufReader::new(File::open(file)?))?;

    let stem = file
        .file_stem()
        .ok_or("input path has no file name")?
        .to_string_lossy()
        .into_owned();
    let dir = match output {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.to_path_buf()
        }
        None => file.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };

    match &xnb.asset {
        Asset::Texture2D(tex) => {
            let path = dir.join(format!("{stem}.png"));
            std::fs::write(&path, texture_to_png(tex)?)?;
            println!("Saved texture to {}", path.display());
        }
        Asset::SoundEffect(sound) => {
            let path = dir.join(format!("{stem}.wav"));
            std::fs::write(&path, sound_to_wav(sound))?;
            println!("Saved sound to {}", path.display());
        }
        Asset::SpriteFont(font) => {
            let png_path = dir.join(format!("{stem}.png"));
            std::fs::write(&png_path, texture_to_png(&font.texture)?)?;
            println!("Saved font atlas to {}", png_path.display());

            let json_path = dir.join(format!("{stem}.json"));
            std::fs::write(&json_path, font_to_json(font)?)?;
            println!("Saved font metrics to {}", json_path.display());
        }
        other => {
            println!("Decoded a {} asset; no exporter for this kind", other.kind());
        }
    }

    Ok(())
}
