//! Stroke and line-type definitions.
//!
//! Exported types:
//! - [`LineType`]: The line pattern of a connection (solid, dashed, dotted)
//! - [`StrokeCap`]: How line endpoints are rendered (butt, round)
//! - [`StrokeDefinition`]: Color, width, line type and cap of a stroke
//! - [`apply_stroke!`](crate::apply_stroke!): Macro for applying stroke attributes to SVG elements
//!
//! # SVG Attribute Mapping
//!
//! | Rust Property | SVG Attribute | Example Values |
//! |--------------|---------------|----------------|
//! | `color` | `stroke`, `stroke-opacity` | `"#000000"`, `0.5` |
//! | `width` | `stroke-width` | `2.0` |
//! | `line_type` | `stroke-dasharray` | `"6,4"`, `"2,3"` |
//! | `cap` | `stroke-linecap` | `"butt"`, `"round"` |
//!
//! ```
//! use trellis_core::draw::{LineType, StrokeDefinition};
//! use trellis_core::color::Color;
//! use svg::node::element as svg_element;
//!
//! let stroke = StrokeDefinition::new(Color::new("#3b82f6").unwrap(), 2.0)
//!     .with_line_type(LineType::Dashed);
//! let path = svg_element::Path::new().set("d", "M 0 0 L 10 0");
//! let path = trellis_core::apply_stroke!(path, &stroke);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// The line pattern used to draw a connection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    /// Solid continuous line (default)
    #[default]
    Solid,
    /// Dashed line (6px dash, 4px gap)
    Dashed,
    /// Dotted line (2px dot, 3px gap)
    Dotted,
}

impl LineType {
    /// Returns the SVG dasharray value for this line type, or None for solid lines
    pub fn to_svg_value(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6,4"),
            Self::Dotted => Some("2,3"),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

impl FromStr for LineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            _ => Err(format!(
                "invalid line type `{s}`, valid values: solid, dashed, dotted"
            )),
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defines how line endpoints are rendered.
///
/// Maps directly to SVG `stroke-linecap` attribute values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    /// Flat cap at the exact endpoint (SVG default)
    #[default]
    Butt,
    /// Rounded cap extending beyond the endpoint by half the stroke width
    Round,
}

impl StrokeCap {
    /// Returns the SVG stroke-linecap value
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
        }
    }
}

/// A stroke definition for rendering connection lines and card borders.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    line_type: LineType,
    cap: StrokeCap,
}

impl StrokeDefinition {
    /// Creates a new solid stroke with the given color and width.
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }

    /// Returns a copy using the given line type.
    ///
    /// Dotted lines switch to round caps so the dots render as dots.
    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        if line_type == LineType::Dotted {
            self.cap = StrokeCap::Round;
        }
        self
    }

    /// Returns the stroke color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the stroke width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the line type.
    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    /// Returns the stroke cap style.
    pub fn cap(&self) -> StrokeCap {
        self.cap
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 1.0,
            line_type: LineType::default(),
            cap: StrokeCap::default(),
        }
    }
}

/// Apply all stroke attributes to an SVG element.
///
/// Sets color, opacity, width, line cap and the dash pattern (if not solid).
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let mut elem = $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width())
            .set("stroke-linecap", $stroke.cap().to_svg_value());

        if let Some(dasharray) = $stroke.line_type().to_svg_value() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}
