//! Connection routing.
//!
//! [`Router::compute_path`] turns a connection and the current positions of
//! its two nodes into a [`PathGeometry`]. It is a pure function of its
//! inputs: nothing is cached, so moving a card only requires routing again.
//!
//! # Anchors
//!
//! A connection leaves its source at the source anchor and arrives at the
//! target anchor. An anchor is the card center, or the midpoint of the card
//! side named by the connection's `from_connector` / `to_connector`.
//!
//! # Routing modes
//!
//! ```text
//!  straight      free          orthogonal     org-chart
//!
//!  A             A             A              A
//!   \             )            |              |
//!    \           (             └───┐      ┌───┴───┐
//!     B         B                  B      B       C
//! ```
//!
//! - **Straight**: one line between anchors.
//! - **Free**: one quadratic curve whose control point sits on the
//!   perpendicular through the midpoint, `curvature` × distance away.
//! - **Orthogonal**: three axis-aligned legs with the middle leg halfway
//!   between the anchors. Horizontal-first when the cards are further apart
//!   in x than in y, vertical-first otherwise (ties go vertical). A left/right
//!   source connector forces horizontal-first, top/bottom vertical-first.
//!   Ends without a declared connector use the card side facing the other
//!   card along the first or last leg, not the card center. Legs that line
//!   up collapse into a single segment.
//! - **Custom**: straight lines through the control points, in order.
//! - **Org-chart**: drop from the source to a bus line, run along the bus,
//!   drop to the target. The bus is horizontal at `source.y + vertical_offset`
//!   unless the source connector is left/right, in which case it is vertical
//!   at `source.x + vertical_offset`. A missing or zero offset puts the bus
//!   halfway between the anchors.

use trellis_core::geometry::{Bounds, Point, Side, Size};

use crate::{
    config::RouterConfig,
    model::{Connection, Routing, StaffNode},
    path::PathGeometry,
};

/// Computes connection paths from node positions.
#[derive(Debug, Clone)]
pub struct Router {
    card_size: Size,
    curvature: f32,
}

impl Router {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            card_size: config.card_size(),
            curvature: config.curvature(),
        }
    }

    pub fn card_size(&self) -> Size {
        self.card_size
    }

    /// Returns the bounds of a node's card.
    pub fn card_bounds(&self, node: &StaffNode) -> Bounds {
        node.position().to_bounds(self.card_size)
    }

    /// Returns the anchor of `node`: its center, or the midpoint of `side`.
    pub fn anchor(&self, node: &StaffNode, side: Option<Side>) -> Point {
        match side {
            Some(side) => self.card_bounds(node).side_midpoint(side),
            None => node.position(),
        }
    }

    /// Computes the path of `connection` from `from` to `to`.
    ///
    /// `to` is expected to be the node `connection` targets; this is not
    /// checked, so callers can preview a connection before saving it.
    pub fn compute_path(
        &self,
        connection: &Connection,
        from: &StaffNode,
        to: &StaffNode,
    ) -> PathGeometry {
        let style = connection.style();
        let start = self.anchor(from, style.from_connector());
        let end = self.anchor(to, style.to_connector());

        match style.routing() {
            Routing::Straight => PathGeometry::polyline(&[start, end]),
            Routing::Free => self.free_path(start, end),
            Routing::Orthogonal => self.orthogonal_path(connection, from, to),
            Routing::Custom { control_points } => {
                let mut points = Vec::with_capacity(control_points.len() + 2);
                points.push(start);
                points.extend_from_slice(control_points);
                points.push(end);
                PathGeometry::polyline(&points)
            }
            Routing::OrgChart { vertical_offset } => {
                let vertical_bus = style.from_connector().is_some_and(Side::is_horizontal);
                org_chart_path(start, end, *vertical_offset, vertical_bus)
            }
        }
    }

    /// Routes an orthogonal connection. Without a declared connector the
    /// path leaves and enters through the card sides facing each other
    /// along its first and last legs, so it never crosses its own cards.
    fn orthogonal_path(
        &self,
        connection: &Connection,
        from: &StaffNode,
        to: &StaffNode,
    ) -> PathGeometry {
        let style = connection.style();
        let delta = to.position().sub_point(from.position());
        let horizontal_first = match style.from_connector() {
            Some(side) => side.is_horizontal(),
            None => delta.x().abs() > delta.y().abs(),
        };

        let (exit, entry) = facing_sides(delta, horizontal_first);
        let start = self.anchor(from, Some(style.from_connector().unwrap_or(exit)));
        let end = self.anchor(to, Some(style.to_connector().unwrap_or(entry)));
        orthogonal_legs(start, end, horizontal_first)
    }

    fn free_path(&self, start: Point, end: Point) -> PathGeometry {
        let bend = end.sub_point(start).perpendicular().scale(self.curvature);
        let control = start.midpoint(end).add_point(bend);
        PathGeometry::new(start).quad_to(control, end)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(&RouterConfig::default())
    }
}

/// Returns the source and target sides an orthogonal path leaves and enters
/// through, for a target `delta` away from the source.
fn facing_sides(delta: Point, horizontal_first: bool) -> (Side, Side) {
    match (horizontal_first, delta.x() >= 0.0, delta.y() >= 0.0) {
        (true, true, _) => (Side::Right, Side::Left),
        (true, false, _) => (Side::Left, Side::Right),
        (false, _, true) => (Side::Bottom, Side::Top),
        (false, _, false) => (Side::Top, Side::Bottom),
    }
}

fn orthogonal_legs(start: Point, end: Point, horizontal_first: bool) -> PathGeometry {
    let mid = start.midpoint(end);
    if horizontal_first {
        PathGeometry::polyline(&[
            start,
            start.with_x(mid.x()),
            end.with_x(mid.x()),
            end,
        ])
    } else {
        PathGeometry::polyline(&[
            start,
            start.with_y(mid.y()),
            end.with_y(mid.y()),
            end,
        ])
    }
}

fn org_chart_path(
    start: Point,
    end: Point,
    offset: Option<f32>,
    vertical_bus: bool,
) -> PathGeometry {
    let offset = offset.filter(|offset| *offset != 0.0);
    let mid = start.midpoint(end);
    if vertical_bus {
        let bus_x = offset.map_or(mid.x(), |offset| start.x() + offset);
        PathGeometry::polyline(&[start, start.with_x(bus_x), end.with_x(bus_x), end])
    } else {
        let bus_y = offset.map_or(mid.y(), |offset| start.y() + offset);
        PathGeometry::polyline(&[start, start.with_y(bus_y), end.with_y(bus_y), end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionStyle, NodeId, StaffProfile};
    use crate::path::PathSegment;

    fn node(id: &str, x: f32, y: f32) -> StaffNode {
        StaffNode::new(
            NodeId::new(id),
            StaffProfile::new(id, "Consultant"),
            Point::new(x, y),
        )
    }

    fn route(routing: Routing, from: &StaffNode, to: &StaffNode) -> PathGeometry {
        let connection = Connection::new(to.id(), ConnectionStyle::new().with_routing(routing));
        Router::default().compute_path(&connection, from, to)
    }

    #[test]
    fn test_straight_between_centers() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 100.0, 0.0);

        let path = route(Routing::Straight, &a, &b);

        assert_eq!(path.start(), Point::new(0.0, 0.0));
        assert_eq!(path.end(), Point::new(100.0, 0.0));
        assert_eq!(path.segments().len(), 1);
    }

    #[test]
    fn test_straight_uses_connector_sides() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 0.0, 300.0);
        let style = ConnectionStyle::new()
            .with_from_connector(Side::Bottom)
            .with_to_connector(Side::Top);
        let connection = Connection::new(b.id(), style);

        let path = Router::default().compute_path(&connection, &a, &b);

        assert_eq!(path.start(), Point::new(0.0, 45.0));
        assert_eq!(path.end(), Point::new(0.0, 255.0));
    }

    #[test]
    fn test_free_curve_bends_off_the_line() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 200.0, 0.0);

        let path = route(Routing::Free, &a, &b);

        assert!(path.is_curved());
        assert_eq!(path.start(), Point::new(0.0, 0.0));
        assert_eq!(path.end(), Point::new(200.0, 0.0));
        match path.segments() {
            [PathSegment::Quadratic { control, .. }] => {
                assert_eq!(control.x(), 100.0);
                assert_eq!(control.y().abs(), 50.0);
            }
            other => panic!("expected a single quadratic segment, got {other:?}"),
        }
    }

    #[test]
    fn test_orthogonal_is_axis_aligned() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 100.0, 100.0);

        let path = route(Routing::Orthogonal, &a, &b);

        assert!(path.is_axis_aligned());
        // Tie goes vertical first, out of the bottom and into the top.
        assert_eq!(path.start(), Point::new(0.0, 45.0));
        assert_eq!(path.end(), Point::new(100.0, 55.0));
        assert_eq!(path.vertices()[1], Point::new(0.0, 50.0));
    }

    #[test]
    fn test_orthogonal_horizontal_first_when_wider() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 400.0, 100.0);

        let path = route(Routing::Orthogonal, &a, &b);

        assert_eq!(
            path.vertices(),
            vec![
                Point::new(90.0, 0.0),
                Point::new(200.0, 0.0),
                Point::new(200.0, 100.0),
                Point::new(310.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_orthogonal_leaves_through_facing_side() {
        let a = node("a", 400.0, 100.0);
        let b = node("b", 0.0, 0.0);

        let path = route(Routing::Orthogonal, &a, &b);

        assert_eq!(path.start(), Point::new(310.0, 100.0));
        assert_eq!(path.end(), Point::new(90.0, 0.0));
        let source = Router::default().card_bounds(&a);
        let target = Router::default().card_bounds(&b);
        for vertex in &path.vertices()[1..path.vertices().len() - 1] {
            assert!(!source.contains(*vertex), "{vertex:?} inside source card");
            assert!(!target.contains(*vertex), "{vertex:?} inside target card");
        }
    }

    #[test]
    fn test_orthogonal_connector_forces_direction() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 400.0, 100.0);
        let style = ConnectionStyle::new()
            .with_from_connector(Side::Bottom)
            .with_routing(Routing::Orthogonal);
        let connection = Connection::new(b.id(), style);

        let path = Router::default().compute_path(&connection, &a, &b);

        assert!(path.is_axis_aligned());
        let second = path.vertices()[1];
        assert_eq!(second.x(), path.start().x());
    }

    #[test]
    fn test_orthogonal_aligned_nodes_collapse_to_one_segment() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 0.0, 300.0);

        let path = route(Routing::Orthogonal, &a, &b);

        assert_eq!(path.segments().len(), 1);
        assert!(path.is_axis_aligned());
        assert_eq!(path.start(), Point::new(0.0, 45.0));
        assert_eq!(path.end(), Point::new(0.0, 255.0));
    }

    #[test]
    fn test_orthogonal_same_row_is_one_segment() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 400.0, 0.0);

        let path = route(Routing::Orthogonal, &a, &b);

        assert_eq!(
            path.vertices(),
            vec![Point::new(90.0, 0.0), Point::new(310.0, 0.0)]
        );
    }

    #[test]
    fn test_custom_passes_through_control_points_in_order() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 300.0, 0.0);
        let control_points = vec![Point::new(100.0, -80.0), Point::new(200.0, 80.0)];

        let path = route(
            Routing::Custom {
                control_points: control_points.clone(),
            },
            &a,
            &b,
        );

        assert_eq!(
            path.vertices(),
            vec![a.position(), control_points[0], control_points[1], b.position()]
        );
    }

    #[test]
    fn test_custom_without_points_is_straight() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 300.0, 10.0);

        let custom = route(
            Routing::Custom {
                control_points: Vec::new(),
            },
            &a,
            &b,
        );

        assert_eq!(custom, route(Routing::Straight, &a, &b));
    }

    #[test]
    fn test_org_chart_with_offset() {
        let manager = node("m", 200.0, 0.0);
        let report = node("r", 0.0, 300.0);

        let path = route(
            Routing::OrgChart {
                vertical_offset: Some(80.0),
            },
            &manager,
            &report,
        );

        assert_eq!(
            path.vertices(),
            vec![
                Point::new(200.0, 0.0),
                Point::new(200.0, 80.0),
                Point::new(0.0, 80.0),
                Point::new(0.0, 300.0),
            ]
        );
    }

    #[test]
    fn test_org_chart_zero_offset_uses_midpoint() {
        let manager = node("m", 200.0, 0.0);
        let report = node("r", 0.0, 300.0);

        let unset = route(
            Routing::OrgChart {
                vertical_offset: None,
            },
            &manager,
            &report,
        );
        let zero = route(
            Routing::OrgChart {
                vertical_offset: Some(0.0),
            },
            &manager,
            &report,
        );

        assert_eq!(unset, zero);
        assert_eq!(unset.vertices()[1], Point::new(200.0, 150.0));
        assert!(unset.is_axis_aligned());
    }

    #[test]
    fn test_org_chart_vertical_bus_from_side_connector() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 400.0, 200.0);
        let style = ConnectionStyle::new()
            .with_from_connector(Side::Right)
            .with_to_connector(Side::Left)
            .with_routing(Routing::OrgChart {
                vertical_offset: Some(60.0),
            });
        let connection = Connection::new(b.id(), style);

        let path = Router::default().compute_path(&connection, &a, &b);

        assert_eq!(
            path.vertices(),
            vec![
                Point::new(90.0, 0.0),
                Point::new(150.0, 0.0),
                Point::new(150.0, 200.0),
                Point::new(310.0, 200.0),
            ]
        );
    }
}
