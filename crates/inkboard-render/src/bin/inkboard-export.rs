//! Render the active page of a saved document to PNG.
//!
//! Usage: `inkboard-export <document.json> <out.png> [scale]`
//!
//! Set `INKBOARD_FONT` to a TTF/OTF file to render text with real glyphs.

use inkboard_core::shapes::FontFamily;
use inkboard_core::{Document, EditorConfig};
use inkboard_render::{export_png, ExportOptions, Painter};
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage: inkboard-export <document.json> <out.png> [scale]";

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        return Err(USAGE.into());
    };
    let scale = match args.next() {
        Some(arg) => arg
            .parse::<f64>()
            .map_err(|e| format!("invalid scale {arg:?}: {e}"))?,
        None => 1.0,
    };

    let document = Document::load(&input, &EditorConfig::default())?;
    let mut painter = Painter::new();
    if let Ok(font) = std::env::var("INKBOARD_FONT") {
        painter.fonts_mut().load(FontFamily::Sans, &font)?;
    }

    let options = ExportOptions {
        scale,
        ..ExportOptions::default()
    };
    let png_data = export_png(&mut painter, &document, &options)?;
    std::fs::write(&output, png_data)?;
    log::info!("Wrote {output}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
