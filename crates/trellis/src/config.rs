//! Configuration types for Trellis diagrams.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field has a default, so partial files are fine.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`RouterConfig`] - Card size and curve strength used by the router.
//! - [`PlacementConfig`] - Grid and jitter used to place new cards.
//! - [`StyleConfig`] - Colors and line widths used by the SVG exporter.
//!
//! # Example
//!
//! ```
//! # use trellis::config::AppConfig;
//! let config: AppConfig = toml::from_str("[router]\ncurvature = 0.4").unwrap();
//! assert_eq!(config.router().curvature(), 0.4);
//! assert_eq!(config.router().card_size().width(), 180.0);
//! ```

use serde::Deserialize;

use trellis_core::{color::Color, geometry::Size};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    router: RouterConfig,

    #[serde(default)]
    placement: PlacementConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(router: RouterConfig, placement: PlacementConfig, style: StyleConfig) -> Self {
        Self {
            router,
            placement,
            style,
        }
    }

    pub fn router(&self) -> &RouterConfig {
        &self.router
    }

    pub fn placement(&self) -> &PlacementConfig {
        &self.placement
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Geometry settings for [`Router`](crate::routing::Router).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Width of a staff card.
    card_width: f32,

    /// Height of a staff card.
    card_height: f32,

    /// Perpendicular offset of a free curve's control point, as a fraction
    /// of the distance between anchors.
    curvature: f32,
}

impl RouterConfig {
    pub fn new(card_size: Size, curvature: f32) -> Self {
        Self {
            card_width: card_size.width(),
            card_height: card_size.height(),
            curvature,
        }
    }

    pub fn card_size(&self) -> Size {
        Size::new(self.card_width, self.card_height)
    }

    pub fn curvature(&self) -> f32 {
        self.curvature
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            card_width: 180.0,
            card_height: 90.0,
            curvature: 0.25,
        }
    }
}

/// Settings for the jittered grid used to place new cards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Number of grid columns before wrapping to the next row.
    columns: usize,

    /// Horizontal distance between grid cells.
    cell_width: f32,

    /// Vertical distance between grid cells.
    cell_height: f32,

    /// Maximum random displacement from the cell center, in each axis.
    jitter: f32,
}

impl PlacementConfig {
    pub fn new(columns: usize, cell_size: Size, jitter: f32) -> Self {
        Self {
            columns,
            cell_width: cell_size.width(),
            cell_height: cell_size.height(),
            jitter,
        }
    }

    /// Returns the column count, never less than one.
    pub fn columns(&self) -> usize {
        self.columns.max(1)
    }

    pub fn cell_size(&self) -> Size {
        Size::new(self.cell_width, self.cell_height)
    }

    /// Returns the jitter; negative or non-finite values disable it.
    pub fn jitter(&self) -> f32 {
        if self.jitter.is_finite() {
            self.jitter.max(0.0)
        } else {
            0.0
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            cell_width: 240.0,
            cell_height: 160.0,
            jitter: 40.0,
        }
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Color fields are kept as strings and parsed on access, so a bad color is
/// reported when it is first used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Background color of the canvas.
    background_color: Option<String>,

    /// Color of connections without a label or explicit color.
    connection_color: Option<String>,

    /// Stroke width of connection lines.
    line_width: f32,

    /// Empty space around the outermost cards.
    padding: f32,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_optional_color(self.background_color.as_deref(), "background")
    }

    /// Returns the fallback connection [`Color`], defaulting to slate gray.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn connection_color(&self) -> Result<Color, String> {
        Ok(
            parse_optional_color(self.connection_color.as_deref(), "connection")?
                .unwrap_or_else(|| Color::new("#64748b").expect("slate gray is a valid color")),
        )
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            connection_color: None,
            line_width: 2.0,
            padding: 40.0,
        }
    }
}

fn parse_optional_color(value: Option<&str>, what: &str) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {what} color in config: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.router().card_size(), Size::new(180.0, 90.0));
        assert_eq!(config.router().curvature(), 0.25);
        assert_eq!(config.placement().columns(), 4);
        assert_eq!(config.style().background_color(), Ok(None));
        assert!(config.style().connection_color().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r##"
            [placement]
            columns = 0
            jitter = -5

            [style]
            background_color = "#fafafa"
            "##,
        )
        .unwrap();

        assert_eq!(config.placement().columns(), 1);
        assert_eq!(config.placement().jitter(), 0.0);
        assert_eq!(config.placement().cell_size(), Size::new(240.0, 160.0));
        assert!(config.style().background_color().unwrap().is_some());
        assert_eq!(config.style().line_width(), 2.0);
    }

    #[test]
    fn test_non_finite_jitter_disabled() {
        let config: AppConfig = toml::from_str("[placement]\njitter = inf\n").unwrap();
        assert_eq!(config.placement().jitter(), 0.0);

        let config: AppConfig = toml::from_str("[placement]\njitter = nan\n").unwrap();
        assert_eq!(config.placement().jitter(), 0.0);
    }

    #[test]
    fn test_invalid_color_reported_on_access() {
        let config: AppConfig = toml::from_str(
            r#"
            [style]
            connection_color = "not-a-color"
            "#,
        )
        .unwrap();

        let err = config.style().connection_color().unwrap_err();
        assert!(err.contains("Invalid connection color"));
    }
}
