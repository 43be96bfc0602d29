//! Circular and elliptical arc flattening
//!
//! All curves go through `lyon::geom::Arc<f64>`, whose flattening keeps
//! every chord within `tolerance` of the true curve.

use gcodehatch_core::Point;
use lyon::geom::{point, vector, Angle, Arc};
use std::f64::consts::TAU;

/// Sweeps closer than this to a full turn count as full
const FULL_TURN_EPSILON: f64 = 1e-9;

/// Flattened ellipse together with whether it covers the full turn
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseFlattening {
    pub points: Vec<Point>,
    pub full: bool,
}

/// Flatten a counter-clockwise arc given in degrees.
///
/// The result runs from the start angle to the end angle inclusive. Equal
/// angles describe a full turn.
pub fn flatten_arc(
    center: Point,
    radius: f64,
    start_deg: f64,
    end_deg: f64,
    tolerance: f64,
) -> Vec<Point> {
    if radius <= 0.0 {
        return Vec::new();
    }
    let start = start_deg.to_radians();
    let sweep = ccw_sweep(end_deg.to_radians() - start);
    sample(center, (radius, radius), 0.0, start, sweep, tolerance)
}

/// Flatten a full circle. The closing point is not repeated.
pub fn flatten_circle(center: Point, radius: f64, tolerance: f64) -> Vec<Point> {
    if radius <= 0.0 {
        return Vec::new();
    }
    let mut points = sample(center, (radius, radius), 0.0, 0.0, TAU, tolerance);
    points.pop();
    points
}

/// Flatten an ellipse given by its major axis vector, the minor/major ratio
/// and start/end parameters in radians.
///
/// A full ellipse drops its repeated closing point.
pub fn flatten_ellipse(
    center: Point,
    major_axis: (f64, f64),
    minor_axis_ratio: f64,
    start_parameter: f64,
    end_parameter: f64,
    tolerance: f64,
) -> EllipseFlattening {
    let major = major_axis.0.hypot(major_axis.1);
    let minor = major * minor_axis_ratio;
    if major <= 0.0 || minor <= 0.0 {
        return EllipseFlattening {
            points: Vec::new(),
            full: false,
        };
    }

    let rotation = major_axis.1.atan2(major_axis.0);
    let raw = end_parameter - start_parameter;
    let full = raw.abs() < FULL_TURN_EPSILON || (raw.abs() - TAU).abs() < FULL_TURN_EPSILON;
    let sweep = if full { TAU } else { ccw_sweep(raw) };

    let mut points = sample(
        center,
        (major, minor),
        rotation,
        start_parameter,
        sweep,
        tolerance,
    );
    if full {
        points.pop();
    }
    EllipseFlattening { points, full }
}

/// Normalize a signed sweep into `(0, TAU]`
fn ccw_sweep(raw: f64) -> f64 {
    let sweep = raw.rem_euclid(TAU);
    if sweep < FULL_TURN_EPSILON {
        TAU
    } else {
        sweep
    }
}

fn sample(
    center: Point,
    radii: (f64, f64),
    rotation: f64,
    start: f64,
    sweep: f64,
    tolerance: f64,
) -> Vec<Point> {
    let arc = Arc {
        center: point(center.x, center.y),
        radii: vector(radii.0, radii.1),
        start_angle: Angle::radians(start),
        sweep_angle: Angle::radians(sweep),
        x_rotation: Angle::radians(rotation),
    };

    let from = arc.from();
    let mut points = vec![Point::new(from.x, from.y)];
    points.extend(arc.flattened(tolerance).map(|p| Point::new(p.x, p.y)));
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_radial_error(points: &[Point], center: Point, radius: f64) -> f64 {
        points
            .iter()
            .map(|p| (p.distance_to(&center) - radius).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_quarter_arc_endpoints() {
        let pts = flatten_arc(Point::new(0.0, 0.0), 10.0, 0.0, 90.0, 0.05);
        assert!(pts.len() > 2);
        assert!(pts[0].approx_eq(&Point::new(10.0, 0.0), 1e-9));
        assert!(pts.last().unwrap().approx_eq(&Point::new(0.0, 10.0), 1e-6));
        assert!(max_radial_error(&pts, Point::new(0.0, 0.0), 10.0) < 1e-6);
    }

    #[test]
    fn test_arc_wraps_through_zero() {
        // 350 -> 10 degrees runs counter-clockwise through 0
        let pts = flatten_arc(Point::new(0.0, 0.0), 5.0, 350.0, 10.0, 0.01);
        assert!(pts.iter().all(|p| p.x > 0.0));
        assert!(pts.last().unwrap().y > 0.0);
    }

    #[test]
    fn test_circle_sagitta_bound() {
        let center = Point::new(3.0, -2.0);
        let pts = flatten_circle(center, 20.0, 0.05);
        assert!(pts.len() >= 8);
        assert!(!pts[0].approx_eq(pts.last().unwrap(), 1e-6));
        // Chord midpoints stay within the sagitta of the circle
        for w in pts.windows(2) {
            let mid = Point::new((w[0].x + w[1].x) / 2.0, (w[0].y + w[1].y) / 2.0);
            assert!(20.0 - mid.distance_to(&center) <= 0.05 + 1e-6);
        }
    }

    #[test]
    fn test_full_ellipse() {
        let result = flatten_ellipse(Point::new(0.0, 0.0), (10.0, 0.0), 0.5, 0.0, TAU, 0.1);
        assert!(result.full);
        let xs = result.points.iter().map(|p| p.x.abs()).fold(0.0, f64::max);
        let ys = result.points.iter().map(|p| p.y.abs()).fold(0.0, f64::max);
        assert!((xs - 10.0).abs() < 1e-6);
        assert!(ys <= 5.0 + 1e-9 && ys > 4.5);
    }

    #[test]
    fn test_half_ellipse_is_open() {
        let result = flatten_ellipse(
            Point::new(0.0, 0.0),
            (0.0, 8.0),
            0.25,
            0.0,
            std::f64::consts::PI,
            0.1,
        );
        assert!(!result.full);
        // Rotated major axis: starts on +y, ends on -y
        assert!(result.points[0].approx_eq(&Point::new(0.0, 8.0), 1e-9));
        assert!(result.points.last().unwrap().approx_eq(&Point::new(0.0, -8.0), 1e-6));
    }

    #[test]
    fn test_degenerate_radius() {
        assert!(flatten_circle(Point::new(0.0, 0.0), 0.0, 0.05).is_empty());
        assert!(flatten_arc(Point::new(0.0, 0.0), -1.0, 0.0, 90.0, 0.05).is_empty());
    }
}
