//! xnbdec CLI - XNB content decoder
//!
//! Decodes XNB content files (LZX-compressed or plain) and exports the
//! contained assets as ordinary files.

mod commands;
mod export;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xnbdec")]
#[command(author, version, about = "XNB content decoder")]
#[command(long_about = "
xnbdec decodes XNB content files produced by the XNA content pipeline,
including LZX-compressed payloads.

Examples:
  xnbdec info sprite.xnb
  xnbdec extract sprite.xnb
  xnbdec extract music.xnb -o assets/
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header and asset information
    #[command(alias = "i")]
    Info {
        /// XNB file to inspect
        file: PathBuf,
    },

    /// Decode an XNB file and export its asset
    #[command(alias = "x")]
    Extract {
        /// XNB file to decode
        file: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Info { file } => commands::cmd_info(file),
        Commands::Extract { file, output } => commands::cmd_extract(file, output.as_deref()),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
