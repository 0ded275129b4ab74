//! Connection styling, routing modes and the persisted connection record.

use std::{fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use trellis_core::{color::Color, draw::LineType, geometry::Point, geometry::Side};

use super::NodeId;

/// Semantic meaning of a connection. Each label carries a default color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionLabel {
    Reporting,
    Collaboration,
    Communication,
    Dependency,
}

impl ConnectionLabel {
    /// Returns the color used when the connection carries no explicit override.
    pub fn default_color(self) -> Color {
        let hex = match self {
            Self::Reporting => "#2563eb",
            Self::Collaboration => "#16a34a",
            Self::Communication => "#f59e0b",
            Self::Dependency => "#dc2626",
        };
        Color::new(hex).expect("label colors are valid hex colors")
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Reporting => "reporting",
            Self::Collaboration => "collaboration",
            Self::Communication => "communication",
            Self::Dependency => "dependency",
        }
    }
}

impl FromStr for ConnectionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reporting" => Ok(Self::Reporting),
            "collaboration" => Ok(Self::Collaboration),
            "communication" => Ok(Self::Communication),
            "dependency" => Ok(Self::Dependency),
            _ => Err(format!(
                "invalid connection label `{s}`, valid values: reporting, collaboration, communication, dependency"
            )),
        }
    }
}

impl fmt::Display for ConnectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a routing algorithm, without its geometry.
///
/// # Variants
///
/// - `Straight`: A direct segment between anchors
/// - `Free`: A single quadratic curve bowing away from the straight line
/// - `Orthogonal`: Horizontal and vertical segments only ("siku")
/// - `Custom`: Segments through user-placed control points
/// - `OrgChart`: Drop to a shared bus line, travel along it, drop to the target
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingMode {
    #[default]
    Straight,
    Free,
    Orthogonal,
    Custom,
    OrgChart,
}

impl RoutingMode {
    /// Parses a stored or user supplied routing name, falling back to
    /// [`RoutingMode::Straight`] for anything unrecognized.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some(name) => name.parse().unwrap_or_else(|err: String| {
                debug!(routing = name, err:%; "Unknown routing mode, using straight");
                Self::Straight
            }),
            None => Self::Straight,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Free => "free",
            Self::Orthogonal => "orthogonal",
            Self::Custom => "custom",
            Self::OrgChart => "org-chart",
        }
    }
}

impl FromStr for RoutingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "straight" => Ok(Self::Straight),
            "free" | "curved" => Ok(Self::Free),
            "orthogonal" | "siku" => Ok(Self::Orthogonal),
            "custom" => Ok(Self::Custom),
            "org-chart" | "orgchart" | "org_chart" => Ok(Self::OrgChart),
            _ => Err(format!("invalid routing mode `{s}`")),
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing algorithm together with the geometry only it uses.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Routing {
    #[default]
    Straight,
    Free,
    Orthogonal,
    /// Path through the control points, in order.
    Custom { control_points: Vec<Point> },
    /// Distance from the source anchor to the bus line. `None` or zero
    /// places the bus halfway between the anchors.
    OrgChart { vertical_offset: Option<f32> },
}

impl Routing {
    /// Returns the routing mode of this routing.
    pub fn mode(&self) -> RoutingMode {
        match self {
            Self::Straight => RoutingMode::Straight,
            Self::Free => RoutingMode::Free,
            Self::Orthogonal => RoutingMode::Orthogonal,
            Self::Custom { .. } => RoutingMode::Custom,
            Self::OrgChart { .. } => RoutingMode::OrgChart,
        }
    }

    /// Builds a routing from a mode plus the geometry fields a flat record
    /// carries. Fields that do not belong to `mode` are dropped.
    pub fn from_parts(
        mode: RoutingMode,
        control_points: Vec<Point>,
        vertical_offset: Option<f32>,
    ) -> Self {
        match mode {
            RoutingMode::Straight => Self::Straight,
            RoutingMode::Free => Self::Free,
            RoutingMode::Orthogonal => Self::Orthogonal,
            RoutingMode::Custom => Self::Custom { control_points },
            RoutingMode::OrgChart => Self::OrgChart { vertical_offset },
        }
    }
}

/// Visual style and routing of a connection.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectionStyle {
    line_type: LineType,
    label: Option<ConnectionLabel>,
    color: Option<Color>,
    from_connector: Option<Side>,
    to_connector: Option<Side>,
    routing: Routing,
}

impl ConnectionStyle {
    /// Creates a solid, unlabeled, straight style.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn with_label(mut self, label: ConnectionLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_from_connector(mut self, side: Side) -> Self {
        self.from_connector = Some(side);
        self
    }

    pub fn with_to_connector(mut self, side: Side) -> Self {
        self.to_connector = Some(side);
        self
    }

    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing;
        self
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn label(&self) -> Option<ConnectionLabel> {
        self.label
    }

    /// Returns the explicit color override, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn from_connector(&self) -> Option<Side> {
        self.from_connector
    }

    pub fn to_connector(&self) -> Option<Side> {
        self.to_connector
    }

    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    /// Color to draw with: the override, else the label's default, else `fallback`.
    pub fn resolved_color(&self, fallback: Color) -> Color {
        self.color
            .or_else(|| self.label.map(ConnectionLabel::default_color))
            .unwrap_or(fallback)
    }
}

/// A directed connection, owned by its source node.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    target: NodeId,
    style: ConnectionStyle,
}

impl Connection {
    pub fn new(target: NodeId, style: ConnectionStyle) -> Self {
        Self { target, style }
    }

    /// Returns the id of the node this connection points at.
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn style(&self) -> &ConnectionStyle {
        &self.style
    }

    /// Converts the connection into its flat persisted form.
    pub fn to_record(&self) -> ConnectionRecord {
        let style = &self.style;
        let (control_points, vertical_offset) = match style.routing() {
            Routing::Custom { control_points } => (control_points.clone(), None),
            Routing::OrgChart { vertical_offset } => (Vec::new(), *vertical_offset),
            _ => (Vec::new(), None),
        };

        ConnectionRecord {
            target: self.target,
            line_type: style.line_type,
            label: style.label,
            color: style.color,
            routing: Some(style.routing.mode().to_string()),
            control_points,
            from_connector: style.from_connector,
            to_connector: style.to_connector,
            vertical_offset,
        }
    }
}

impl From<ConnectionRecord> for Connection {
    fn from(record: ConnectionRecord) -> Self {
        let mode = RoutingMode::parse_or_default(record.routing.as_deref());
        let style = ConnectionStyle {
            line_type: record.line_type,
            label: record.label,
            color: record.color,
            from_connector: record.from_connector,
            to_connector: record.to_connector,
            routing: Routing::from_parts(mode, record.control_points, record.vertical_offset),
        };
        Self::new(record.target, style)
    }
}

/// Flat persisted form of a [`Connection`].
///
/// Every routing field exists on every record; [`Connection::from`] keeps only
/// the ones matching `routing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub target: NodeId,
    #[serde(default)]
    pub line_type: LineType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<ConnectionLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_connector: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_connector: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_offset: Option<f32>,
}

impl ConnectionRecord {
    /// Creates a record with default styling pointing at `target`.
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            line_type: LineType::default(),
            label: None,
            color: None,
            routing: None,
            control_points: Vec::new(),
            from_connector: None,
            to_connector: None,
            vertical_offset: None,
        }
    }
}
