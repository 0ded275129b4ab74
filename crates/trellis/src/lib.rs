//! Trellis - Staff collaboration and org-chart diagrams.
//!
//! A diagram is a set of staff cards placed on an unbounded canvas, joined by
//! directed, styled connections. Each card owns its outgoing connections.
//! Connection paths are computed on demand by the [`routing::Router`] from
//! the current card positions, in one of five routing modes.
//!
//! # Pipeline
//!
//! ```text
//! NodeStore / DiagramDocument
//!     ↓ load
//! Diagram            (mutations: create, move, connect, remove)
//!     ↓ route
//! PathGeometry       (per connection)
//!     ↓ export
//! SVG
//! ```

pub mod config;
pub mod edit;
pub mod export;
pub mod model;
pub mod path;
pub mod placement;
pub mod routing;
pub mod store;

mod board;
mod diagram;
mod document;
mod error;

pub use trellis_core::{color, draw, geometry, identifier};

pub use board::Board;
pub use diagram::{ConnectionView, Diagram, RemovedNode, RoutedConnection};
pub use document::DiagramDocument;
pub use error::TrellisError;

use log::{debug, info};

use config::AppConfig;
use export::svg::SvgExporter;
use placement::Placement;

/// Builder for loading and rendering Trellis diagrams with one configuration.
///
/// # Examples
///
/// ```rust
/// use trellis::{DiagramBuilder, config::AppConfig};
///
/// let source = r#"
/// kind = "collaboration"
///
/// [[nodes]]
/// id = "lead"
/// name = "Ayu"
/// job_title = "Lead Auditor"
/// "#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let diagram = builder.parse(source).expect("valid document");
/// let svg = builder.render_svg(&diagram).expect("renders");
/// assert!(svg.contains("Lead Auditor"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Creates a [`Placement`] for new cards from the configured grid.
    pub fn placement(&self) -> Placement {
        Placement::new(self.config.placement().clone())
    }

    /// Parses a TOML diagram document into a [`Diagram`].
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Store`] for malformed TOML and
    /// [`TrellisError::Validation`] for invalid records.
    pub fn parse(&self, source: &str) -> Result<Diagram, TrellisError> {
        info!("Parsing diagram document");
        let diagram = DiagramDocument::from_toml(source)?.into_diagram()?;
        debug!(kind:% = diagram.kind(), nodes = diagram.len(); "Diagram parsed");
        Ok(diagram)
    }

    /// Renders `diagram` to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Config`] if the style configuration holds an
    /// invalid color.
    pub fn render_svg(&self, diagram: &Diagram) -> Result<String, TrellisError> {
        let exporter = SvgExporter::new(&self.config)?;
        let svg = exporter.render(diagram).to_string();
        info!(bytes = svg.len(); "SVG rendered successfully");
        Ok(svg)
    }
}
