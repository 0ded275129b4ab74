//! SVG rendering of staff diagrams.
//!
//! Cards are drawn first, connections on top. Every connection gets an
//! arrowhead at both ends; markers are defined once per color and shared.

use std::{fs::File, io::Write, path::Path};

use indexmap::IndexMap;
use log::{debug, error, info};
use svg::{Document, node::Text as SvgText, node::element as svg_element};

use trellis_core::{
    color::Color,
    draw::StrokeDefinition,
    geometry::{Bounds, Insets, Point},
};

use super::Exporter;
use crate::{
    config::AppConfig,
    diagram::{Diagram, RoutedConnection},
    error::TrellisError,
    model::StaffNode,
    routing::Router,
};

const CARD_FILL: &str = "white";
const CARD_BORDER: &str = "#cbd5e1";
const INACTIVE_OPACITY: f32 = 0.5;

/// Renders diagrams as SVG documents.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    router: Router,
    background: Option<Color>,
    connection_color: Color,
    line_width: f32,
    padding: f32,
}

impl SvgExporter {
    /// Creates an exporter from the router and style sections of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Config`] if a configured color is invalid.
    pub fn new(config: &AppConfig) -> Result<Self, TrellisError> {
        let style = config.style();
        Ok(Self {
            router: Router::new(config.router()),
            background: style.background_color().map_err(TrellisError::Config)?,
            connection_color: style.connection_color().map_err(TrellisError::Config)?,
            line_width: style.line_width(),
            padding: style.padding(),
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Renders `diagram` into an SVG document.
    pub fn render(&self, diagram: &Diagram) -> Document {
        let content = diagram
            .bounds(&self.router)
            .unwrap_or_else(|| Bounds::new_from_center(Point::default(), Default::default()));
        let view = content.add_padding(Insets::uniform(self.padding));
        let size = view.to_size();
        let origin = view.min_point();

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    origin.x(),
                    origin.y(),
                    size.width(),
                    size.height()
                ),
            )
            .set("width", size.width())
            .set("height", size.height());

        if let Some(background) = self.background {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("x", origin.x())
                    .set("y", origin.y())
                    .set("width", size.width())
                    .set("height", size.height())
                    .set("fill", &background)
                    .set("fill-opacity", background.alpha()),
            );
        }

        let mut cards = svg_element::Group::new().set("class", "cards");
        for node in diagram.nodes() {
            cards = cards.add(self.render_card(node));
        }

        let mut markers = MarkerDrawer::default();
        let mut connections = svg_element::Group::new().set("class", "connections");
        for routed in diagram.routed_connections(&self.router) {
            connections = connections.add(self.render_connection(&routed, &mut markers));
        }

        debug!(
            nodes = diagram.len(),
            markers = markers.len();
            "SVG document rendered"
        );
        doc.add(markers.draw_marker_definitions())
            .add(cards)
            .add(connections)
    }

    fn render_card(&self, node: &StaffNode) -> svg_element::Group {
        let bounds = self.router.card_bounds(node);
        let min = bounds.min_point();
        let center = bounds.center();
        let profile = node.profile();

        let mut group = svg_element::Group::new().set("id", node.id().to_string());
        if !profile.is_active() {
            group = group.set("opacity", INACTIVE_OPACITY);
        }

        let rect = svg_element::Rectangle::new()
            .set("x", min.x())
            .set("y", min.y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", 8.0)
            .set("fill", CARD_FILL)
            .set("stroke", CARD_BORDER)
            .set("stroke-width", 1.0);

        let name = svg_element::Text::new("")
            .set("x", center.x())
            .set("y", center.y() - 8.0)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", "sans-serif")
            .set("font-size", 14)
            .set("font-weight", "bold")
            .add(SvgText::new(profile.name()));

        let title = svg_element::Text::new("")
            .set("x", center.x())
            .set("y", center.y() + 14.0)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", "sans-serif")
            .set("font-size", 12)
            .set("fill", "#475569")
            .add(SvgText::new(profile.job_title()));

        group.add(rect).add(name).add(title)
    }

    fn render_connection(
        &self,
        routed: &RoutedConnection<'_>,
        markers: &mut MarkerDrawer,
    ) -> svg_element::Path {
        let style = routed.view.connection.style();
        let color = style.resolved_color(self.connection_color);
        let stroke = StrokeDefinition::new(color, self.line_width).with_line_type(style.line_type());

        let path = svg_element::Path::new()
            .set("d", routed.path.to_path_data())
            .set("fill", "none");
        let path = trellis_core::apply_stroke!(path, &stroke);

        let (start, end) = markers.register(color);
        path.set("marker-start", start).set("marker-end", end)
    }
}

impl Exporter for SvgExporter {
    fn export_diagram(&self, diagram: &Diagram, path: &Path) -> Result<(), TrellisError> {
        let doc = self.render(diagram);

        info!(path:? = path; "Creating SVG file");
        let mut file = File::create(path).map_err(|err| {
            error!(path:? = path, err:%; "Failed to create SVG file");
            err
        })?;
        write!(file, "{doc}").map_err(|err| {
            error!(path:? = path, err:%; "Failed to write SVG content");
            err
        })?;
        Ok(())
    }
}

/// Collects connection colors and emits one pair of arrowhead markers per
/// color.
#[derive(Debug, Default)]
struct MarkerDrawer {
    colors: IndexMap<String, Color>,
}

impl MarkerDrawer {
    /// Records `color` and returns the `marker-start` and `marker-end` references.
    fn register(&mut self, color: Color) -> (String, String) {
        let key = color.to_id_safe_string();
        let refs = (
            format!("url(#{})", Self::marker_start_id(&key)),
            format!("url(#{})", Self::marker_end_id(&key)),
        );
        self.colors.entry(key).or_insert(color);
        refs
    }

    fn len(&self) -> usize {
        self.colors.len()
    }

    fn marker_start_id(key: &str) -> String {
        format!("arrow-start-{key}")
    }

    fn marker_end_id(key: &str) -> String {
        format!("arrow-end-{key}")
    }

    fn draw_marker_definitions(&self) -> svg_element::Definitions {
        self.colors
            .iter()
            .fold(svg_element::Definitions::new(), |defs, (key, color)| {
                defs.add(Self::marker(
                    Self::marker_start_id(key),
                    *color,
                    1,
                    "M 10 0 L 0 5 L 10 10 z",
                ))
                .add(Self::marker(
                    Self::marker_end_id(key),
                    *color,
                    9,
                    "M 0 0 L 10 5 L 0 10 z",
                ))
            })
    }

    fn marker(id: String, color: Color, ref_x: i32, shape: &str) -> svg_element::Marker {
        svg_element::Marker::new()
            .set("id", id)
            .set("viewBox", "0 0 10 10")
            .set("refX", ref_x)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                svg_element::Path::new()
                    .set("d", shape)
                    .set("fill", &color)
                    .set("fill-opacity", color.alpha()),
            )
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::draw::LineType;

    use super::*;
    use crate::model::{
        ConnectionLabel, ConnectionStyle, DiagramKind, NodeId, Routing, StaffProfile,
    };

    fn sample() -> (Diagram, NodeId, NodeId) {
        let mut diagram = Diagram::new(DiagramKind::Collaboration);
        let a = diagram
            .create_node_at(StaffProfile::new("Ani", "Director"), Point::new(0.0, 0.0))
            .unwrap();
        let b = diagram
            .create_node_at(
                StaffProfile::new("Bayu", "Auditor").with_active(false),
                Point::new(300.0, 200.0),
            )
            .unwrap();
        (diagram, a, b)
    }

    #[test]
    fn test_render_cards_and_connections() {
        let (mut diagram, a, b) = sample();
        diagram
            .upsert_connection(
                a,
                b,
                ConnectionStyle::new()
                    .with_line_type(LineType::Dashed)
                    .with_label(ConnectionLabel::Reporting)
                    .with_routing(Routing::Orthogonal),
            )
            .unwrap();
        let exporter = SvgExporter::new(&AppConfig::default()).unwrap();

        let svg = exporter.render(&diagram).to_string();

        assert!(svg.contains("Ani"));
        assert!(svg.contains("Director"));
        assert!(svg.contains("Bayu"));
        assert!(svg.contains("opacity=\"0.5\""));
        assert!(svg.contains("stroke-dasharray=\"6,4\""));
        assert!(svg.contains("marker-start="));
        assert!(svg.contains("marker-end="));
        assert_eq!(svg.matches("<marker").count(), 2);
    }

    #[test]
    fn test_markers_shared_per_color() {
        let (mut diagram, a, b) = sample();
        let c = diagram
            .create_node_at(StaffProfile::new("Citra", "Analyst"), Point::new(-300.0, 200.0))
            .unwrap();
        diagram.upsert_connection(a, b, ConnectionStyle::new()).unwrap();
        diagram.upsert_connection(a, c, ConnectionStyle::new()).unwrap();
        diagram
            .upsert_connection(
                b,
                c,
                ConnectionStyle::new().with_label(ConnectionLabel::Dependency),
            )
            .unwrap();
        let exporter = SvgExporter::new(&AppConfig::default()).unwrap();

        let svg = exporter.render(&diagram).to_string();

        assert_eq!(svg.matches("<marker").count(), 4);
        assert_eq!(svg.matches("<path").count(), 3 + 4);
    }

    #[test]
    fn test_render_empty_diagram() {
        let exporter = SvgExporter::new(&AppConfig::default()).unwrap();
        let svg = exporter
            .render(&Diagram::new(DiagramKind::DivisionStructure))
            .to_string();

        assert!(svg.contains("viewBox=\"-40 -40 80 80\""));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_invalid_config_color() {
        let config: AppConfig = toml::from_str(
            r#"
            [style]
            background_color = "bogus"
            "#,
        )
        .unwrap();

        assert!(matches!(
            SvgExporter::new(&config),
            Err(TrellisError::Config(_))
        ));
    }

    #[test]
    fn test_export_writes_file() {
        let (diagram, _, _) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staff.svg");

        SvgExporter::new(&AppConfig::default())
            .unwrap()
            .export_diagram(&diagram, &path)
            .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("<svg"));
    }
}
