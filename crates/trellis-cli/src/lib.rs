//! CLI logic for the Trellis diagram tool.
//!
//! Reads a diagram document, routes every connection and writes an SVG
//! preview.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::Path};

use log::info;

use trellis::{
    DiagramBuilder, TrellisError,
    export::{Exporter, svg::SvgExporter},
};

/// Run the Trellis CLI application
///
/// # Errors
///
/// Returns `TrellisError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or invalid diagram documents
pub fn run(args: &Args) -> Result<(), TrellisError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let diagram = builder.parse(&source)?;

    let exporter = SvgExporter::new(builder.config())?;
    exporter.export_diagram(&diagram, Path::new(&args.output))?;

    info!(
        output_file = args.output,
        nodes = diagram.len(),
        connections = diagram.connections().count();
        "SVG exported successfully"
    );

    Ok(())
}
