//! Renderable connection geometry.
//!
//! A [`PathGeometry`] is a start point followed by segments, each ending at
//! its own `to` point. It knows nothing about styling; the renderer decides
//! colors, dash patterns and markers.

use std::fmt::Write;

use trellis_core::geometry::Point;

/// One piece of a path, starting where the previous piece ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Straight line to `to`
    Line { to: Point },
    /// Quadratic bezier curve to `to`, bent towards `control`
    Quadratic { control: Point, to: Point },
}

impl PathSegment {
    /// Returns the end point of this segment.
    pub fn end(&self) -> Point {
        match self {
            Self::Line { to } | Self::Quadratic { to, .. } => *to,
        }
    }
}

/// Geometry of a routed connection.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGeometry {
    start: Point,
    segments: Vec<PathSegment>,
}

impl PathGeometry {
    /// Creates an empty path at `start`.
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// Builds a path of straight lines through `points`, in order.
    ///
    /// Consecutive duplicate points are collapsed so the path never holds
    /// zero-length lines.
    ///
    /// # Panics
    ///
    /// Panics if `points` is empty.
    pub fn polyline(points: &[Point]) -> Self {
        let (first, rest) = points
            .split_first()
            .expect("a polyline needs at least one point");
        rest.iter()
            .fold(Self::new(*first), |path, point| path.line_to(*point))
    }

    /// Appends a straight line, skipping it if it would have zero length.
    ///
    /// A line that carries on along the same axis, in the same direction,
    /// as the previous line extends that line instead of adding a segment.
    pub fn line_to(mut self, to: Point) -> Self {
        let end = self.end();
        if end == to {
            return self;
        }

        let before = match self.segments.len() {
            0 => None,
            1 => Some(self.start),
            len => Some(self.segments[len - 2].end()),
        };
        if let (Some(before), Some(PathSegment::Line { to: last })) =
            (before, self.segments.last_mut())
            && continues_along_axis(before, end, to)
        {
            *last = to;
            return self;
        }

        self.segments.push(PathSegment::Line { to });
        self
    }

    /// Appends a quadratic curve.
    pub fn quad_to(mut self, control: Point, to: Point) -> Self {
        self.segments.push(PathSegment::Quadratic { control, to });
        self
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// Returns the last point of the path (the start for an empty path).
    pub fn end(&self) -> Point {
        self.segments
            .last()
            .map_or(self.start, PathSegment::end)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the start point followed by every segment end point.
    pub fn vertices(&self) -> Vec<Point> {
        std::iter::once(self.start)
            .chain(self.segments.iter().map(PathSegment::end))
            .collect()
    }

    /// Returns true if any segment is a curve.
    pub fn is_curved(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, PathSegment::Quadratic { .. }))
    }

    /// Returns true if the path consists only of horizontal and vertical lines.
    pub fn is_axis_aligned(&self) -> bool {
        let mut from = self.start;
        self.segments.iter().all(|segment| {
            let aligned = match segment {
                PathSegment::Line { to } => from.x() == to.x() || from.y() == to.y(),
                PathSegment::Quadratic { .. } => false,
            };
            from = segment.end();
            aligned
        })
    }

    /// Renders the path as SVG path data, e.g. `M 0 0 L 100 0`.
    pub fn to_path_data(&self) -> String {
        let mut data = format!("M {} {}", self.start.x(), self.start.y());
        for segment in &self.segments {
            match segment {
                PathSegment::Line { to } => write!(data, " L {} {}", to.x(), to.y()),
                PathSegment::Quadratic { control, to } => write!(
                    data,
                    " Q {} {} {} {}",
                    control.x(),
                    control.y(),
                    to.x(),
                    to.y()
                ),
            }
            .expect("Writing to String buffer is infallible");
        }
        data
    }
}

/// Returns true if `a → b → c` runs along one axis without turning back.
fn continues_along_axis(a: Point, b: Point, c: Point) -> bool {
    let vertical = a.x() == b.x()
        && b.x() == c.x()
        && (b.y() - a.y()).signum() == (c.y() - b.y()).signum();
    let horizontal = a.y() == b.y()
        && b.y() == c.y()
        && (b.x() - a.x()).signum() == (c.x() - b.x()).signum();
    vertical || horizontal
}
