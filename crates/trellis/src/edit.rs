//! Raw connection-dialog input and its conversion into a [`ConnectionStyle`].
//!
//! Every field is the text a user typed or picked. Blank fields mean "not
//! set". Colors, sides, labels and offsets are checked strictly; the routing
//! mode is not, and anything unrecognized routes straight.

use std::str::FromStr;

use trellis_core::{
    color::Color,
    draw::LineType,
    geometry::{Point, Side},
};

use crate::{
    error::TrellisError,
    model::{ConnectionLabel, ConnectionStyle, Routing, RoutingMode},
};

/// Unvalidated input of the connection edit dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionEdit {
    pub line_type: String,
    pub label: String,
    pub color: String,
    pub routing: String,
    pub control_points: Vec<Point>,
    pub vertical_offset: String,
    pub from_connector: String,
    pub to_connector: String,
}

impl ConnectionEdit {
    /// Pre-fills the dialog from an existing style.
    pub fn from_style(style: &ConnectionStyle) -> Self {
        let (control_points, vertical_offset) = match style.routing() {
            Routing::Custom { control_points } => (control_points.clone(), String::new()),
            Routing::OrgChart {
                vertical_offset: Some(offset),
            } => (Vec::new(), offset.to_string()),
            _ => (Vec::new(), String::new()),
        };

        Self {
            line_type: style.line_type().to_string(),
            label: style.label().map(|l| l.to_string()).unwrap_or_default(),
            color: style.color().map(|c| c.to_string()).unwrap_or_default(),
            routing: style.routing().mode().to_string(),
            control_points,
            vertical_offset,
            from_connector: side_text(style.from_connector()),
            to_connector: side_text(style.to_connector()),
        }
    }

    /// Builds the style described by the input.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Validation`] naming the first field that
    /// cannot be parsed.
    pub fn into_style(self) -> Result<ConnectionStyle, TrellisError> {
        let mut style = ConnectionStyle::new();

        if let Some(line_type) = parse_field::<LineType>(&self.line_type, "line type")? {
            style = style.with_line_type(line_type);
        }
        if let Some(label) = parse_field::<ConnectionLabel>(&self.label, "label")? {
            style = style.with_label(label);
        }
        if let Some(color) = parse_field::<Color>(&self.color, "color")? {
            style = style.with_color(color);
        }
        if let Some(side) = parse_field::<Side>(&self.from_connector, "source connector")? {
            style = style.with_from_connector(side);
        }
        if let Some(side) = parse_field::<Side>(&self.to_connector, "target connector")? {
            style = style.with_to_connector(side);
        }

        let vertical_offset = parse_field::<f32>(&self.vertical_offset, "vertical offset")?;
        let mode = RoutingMode::parse_or_default(non_blank(&self.routing));
        let routing = Routing::from_parts(mode, self.control_points, vertical_offset);

        Ok(style.with_routing(routing))
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn parse_field<T>(value: &str, field: &str) -> Result<Option<T>, TrellisError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_blank(value)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|err| TrellisError::validation(format!("invalid {field}: {err}")))
        })
        .transpose()
}

fn side_text(side: Option<Side>) -> String {
    side.map(|s| s.to_string()).unwrap_or_default()
}
