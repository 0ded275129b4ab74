//! Export of diagrams into viewable documents.
//!
//! # Available Backends
//!
//! - [`svg`] — static SVG preview via [`svg::SvgExporter`]

/// SVG export backend.
pub mod svg;

use std::path::Path;

use crate::{diagram::Diagram, error::TrellisError};

/// Abstraction for diagram export backends.
pub trait Exporter {
    /// Renders `diagram` and writes the result to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Io`] if writing fails and
    /// [`TrellisError::Export`] if the diagram cannot be rendered.
    fn export_diagram(&self, diagram: &Diagram, path: &Path) -> Result<(), TrellisError>;
}
