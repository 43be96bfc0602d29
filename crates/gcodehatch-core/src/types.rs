//! Geometric value types for the toolpath engine
//!
//! Everything here is a plain value: points compare by tolerance, polygons
//! are ordered vertex lists, and commands are `(x, y, mode)` triples whose
//! order is the execution order on the machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default tolerance used wherever polygon connectivity is tested.
pub const DEFAULT_POINT_TOLERANCE: f64 = 1e-6;

/// A 2D point in drawing or working-area units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Per-axis tolerance comparison.
    pub fn approx_eq(&self, other: &Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Translate by an offset
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Multiply both coordinates by a factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Flattened approximation of one decoded curve.
pub type Segment = Vec<Point>;

/// Whether a decoded primitive is already a loop or still needs stitching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Ready-made polygon (closed polyline, circle, full ellipse)
    Closed,
    /// Open point sequence that must be joined with others
    Open,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// A curve primitive as produced by the drawing decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub points: Segment,
    /// Entity type the primitive was decoded from (e.g. "LINE"), for logs only
    #[serde(default)]
    pub source: String,
}

impl Primitive {
    /// A closed loop primitive
    pub fn closed(points: Segment) -> Self {
        Self {
            kind: PrimitiveKind::Closed,
            points,
            source: String::new(),
        }
    }

    /// An open curve primitive
    pub fn open(points: Segment) -> Self {
        Self {
            kind: PrimitiveKind::Open,
            points,
            source: String::new(),
        }
    }

    /// Tag the primitive with the entity it came from
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn is_closed(&self) -> bool {
        self.kind == PrimitiveKind::Closed
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of a point set, `None` when the set is empty
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(iter.fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// True when the box has no area in at least one direction
    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        self.width() < tolerance || self.height() < tolerance
    }
}

/// An ordered vertex list. Closed when the first and last points coincide.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// First and last vertex coincide within `tolerance`
    pub fn is_closed(&self, tolerance: f64) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 => {
                first.approx_eq(last, tolerance)
            }
            _ => false,
        }
    }

    /// Copy of the polygon with the first point appended when the endpoints
    /// differ. Uses exact comparison so an almost-closed loop still gets its
    /// closing edge.
    pub fn closed(&self) -> Polygon {
        let mut points = self.points.clone();
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if first != last {
                points.push(first);
            }
        }
        Polygon { points }
    }

    /// Number of vertices that are pairwise distinct within `tolerance`
    pub fn distinct_vertex_count(&self, tolerance: f64) -> usize {
        let mut distinct: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if !distinct.iter().any(|q| q.approx_eq(p, tolerance)) {
                distinct.push(*p);
            }
        }
        distinct.len()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<Point> for Polygon {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Polygon {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Motion mode of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveMode {
    /// Reposition without depositing material
    Move,
    /// Deposit material along the straight segment from the previous position
    Draw,
}

/// One toolpath step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub x: f64,
    pub y: f64,
    pub mode: MoveMode,
}

impl Command {
    pub const fn move_to(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            mode: MoveMode::Move,
        }
    }

    pub const fn draw_to(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            mode: MoveMode::Draw,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_draw(&self) -> bool {
        self.mode == MoveMode::Draw
    }
}

/// A textual motion instruction with absolute target coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GcodeLine {
    pub x: f64,
    pub y: f64,
    /// Deposition amount for draw moves, `None` for travel moves
    pub extrusion: Option<f64>,
}

impl GcodeLine {
    pub fn travel(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            extrusion: None,
        }
    }

    pub fn extrude(x: f64, y: f64, amount: f64) -> Self {
        Self {
            x,
            y,
            extrusion: Some(amount),
        }
    }
}

impl fmt::Display for GcodeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G1 X{:.2} Y{:.2}", self.x, self.y)?;
        if let Some(e) = self.extrusion {
            write!(f, " E{:.2}", e)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_approx_eq() {
        let a = Point::new(1.0, 2.0);
        assert!(a.approx_eq(&Point::new(1.0 + 5e-7, 2.0 - 5e-7), DEFAULT_POINT_TOLERANCE));
        assert!(!a.approx_eq(&Point::new(1.0 + 2e-6, 2.0), DEFAULT_POINT_TOLERANCE));
    }

    #[test]
    fn test_polygon_closed_appends_first_point() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ]);
        let closed = poly.closed();
        assert_eq!(closed.len(), 4);
        assert_eq!(closed.last(), Some(&Point::new(0.0, 0.0)));

        // Already closed input is left alone
        assert_eq!(closed.closed(), closed);
    }

    #[test]
    fn test_distinct_vertex_count_ignores_closing_point() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ]);
        assert_eq!(poly.distinct_vertex_count(DEFAULT_POINT_TOLERANCE), 3);
    }

    #[test]
    fn test_bounds() {
        let poly = Polygon::new(vec![
            Point::new(-2.0, 1.0),
            Point::new(4.0, 3.0),
            Point::new(0.0, -5.0),
        ]);
        let b = poly.bounds().unwrap();
        assert_eq!(b.width(), 6.0);
        assert_eq!(b.height(), 8.0);
        assert_eq!(b.center(), Point::new(1.0, -1.0));
        assert!(Polygon::default().bounds().is_none());
    }

    #[test]
    fn test_gcode_line_display() {
        assert_eq!(GcodeLine::travel(95.0, 95.0).to_string(), "G1 X95.00 Y95.00");
        assert_eq!(
            GcodeLine::extrude(105.0, 95.0, 1.0).to_string(),
            "G1 X105.00 Y95.00 E1.00"
        );
    }

    #[test]
    fn test_command_serializes_mode_lowercase() {
        let json = serde_json::to_string(&Command::draw_to(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"mode":"draw"}"#);
    }
}
