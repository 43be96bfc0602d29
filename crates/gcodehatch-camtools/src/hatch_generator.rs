//! Cross-hatch infill generator
//!
//! Fills a polygon with two families of 45 degree lines: family A follows
//! `x + y = c` (slope -1) and family B follows `y - x = c` (slope +1).
//! Each hatch line is intersected with every polygon edge; sorted
//! intersections are paired into in/out spans, so concave outlines get one
//! draw per span and the gaps between spans stay untouched.

use gcodehatch_core::{Command, Point, Polygon, ToolpathError, ToolpathResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;
use tracing::debug;

/// Default perpendicular distance between hatch lines
pub const DEFAULT_HATCH_SPACING: f64 = 10.0;

/// Default threshold below which an edge counts as parallel to a hatch line
pub const DEFAULT_PARALLEL_EPSILON: f64 = 1e-6;

/// Cross-hatch parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HatchParams {
    /// Perpendicular spacing between neighbouring lines of one family
    pub spacing: f64,
    /// `|A*dx + B*dy|` below this skips the edge as parallel
    pub parallel_epsilon: f64,
}

impl Default for HatchParams {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_HATCH_SPACING,
            parallel_epsilon: DEFAULT_PARALLEL_EPSILON,
        }
    }
}

impl HatchParams {
    pub fn with_spacing(spacing: f64) -> Self {
        Self {
            spacing,
            ..Self::default()
        }
    }
}

/// A hatch line family `a*x + b*y = c`
#[derive(Debug, Clone, Copy)]
struct Family {
    name: &'static str,
    a: f64,
    b: f64,
}

const FAMILY_A: Family = Family {
    name: "x+y",
    a: 1.0,
    b: 1.0,
};

const FAMILY_B: Family = Family {
    name: "y-x",
    a: -1.0,
    b: 1.0,
};

impl Family {
    fn key(&self, p: &Point) -> f64 {
        self.a * p.x + self.b * p.y
    }
}

/// Generate the cross-hatch commands for a polygon.
///
/// The polygon is closed first when needed. Family A is emitted in full,
/// then family B. Every span contributes a move to its first point and a
/// draw to its second, including the zero-length span of a line that only
/// touches a corner.
pub fn cross_hatch(polygon: &Polygon, params: &HatchParams) -> ToolpathResult<Vec<Command>> {
    if !(params.spacing.is_finite() && params.spacing > 0.0) {
        return Err(ToolpathError::invalid_parameter(
            "spacing",
            format!("must be a positive number, got {}", params.spacing),
        ));
    }

    let closed = polygon.closed();
    if closed.len() < 3 {
        return Ok(Vec::new());
    }

    // c-parameter step equivalent to the perpendicular spacing of a 45 degree family
    let step = params.spacing * SQRT_2;

    let mut commands = Vec::new();
    for family in [FAMILY_A, FAMILY_B] {
        let before = commands.len();
        hatch_family(&closed, family, step, params, &mut commands);
        debug!(
            family = family.name,
            spans = (commands.len() - before) / 2,
            "Generated hatch family"
        );
    }

    Ok(commands)
}

fn hatch_family(
    polygon: &Polygon,
    family: Family,
    step: f64,
    params: &HatchParams,
    commands: &mut Vec<Command>,
) {
    let (c_min, c_max) = polygon
        .iter()
        .map(|p| family.key(p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c), hi.max(c))
        });

    let mut index = 0u64;
    loop {
        let c = c_min + index as f64 * step;
        if c > c_max {
            break;
        }
        index += 1;

        let mut hits =
            line_polygon_intersections(polygon, family.a, family.b, -c, params.parallel_epsilon);
        if hits.len() < 2 {
            continue;
        }
        hits.sort_by(|p, q| p.x.total_cmp(&q.x));

        for span in hits.chunks_exact(2) {
            let (start, end) = (span[0], span[1]);
            commands.push(Command::move_to(start.x, start.y));
            commands.push(Command::draw_to(end.x, end.y));
        }
    }
}

/// Intersect the line `a*x + b*y + c = 0` with every edge of `polygon`.
///
/// Edges wrap from the last vertex back to the first. An edge is skipped
/// when `|a*dx + b*dy| < epsilon` (parallel to the line) or when it does not
/// cross the line. Crossing uses a half-open side test: one endpoint strictly
/// on the positive side, the other not. A vertex lying on the line is
/// therefore counted once when the boundary passes through it and zero or two
/// times when the boundary only touches it, which keeps the count even.
pub fn line_polygon_intersections(
    polygon: &Polygon,
    a: f64,
    b: f64,
    c: f64,
    epsilon: f64,
) -> Vec<Point> {
    let points = &polygon.points;
    let n = points.len();
    let mut hits = Vec::new();

    for i in 0..n {
        let p1 = points[i];
        let p2 = points[(i + 1) % n];
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;

        let denom = a * dx + b * dy;
        if denom.abs() < epsilon {
            continue;
        }

        let side1 = a * p1.x + b * p1.y + c;
        let side2 = a * p2.x + b * p2.y + c;
        if (side1 > 0.0) == (side2 > 0.0) {
            continue;
        }

        // Crossing edges meet the line on the segment; clamp absorbs rounding
        let t = (-side1 / denom).clamp(0.0, 1.0);
        hits.push(Point::new(p1.x + t * dx, p1.y + t * dy));
    }

    hits
}
