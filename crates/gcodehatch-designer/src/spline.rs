//! B-spline evaluation and adaptive flattening
//!
//! Splines are evaluated with de Boor's algorithm in homogeneous
//! coordinates, so rational (weighted) splines work too. Flattening splits
//! every knot span recursively until the curve midpoint of each piece lies
//! within the tolerance of its chord.

use gcodehatch_core::Point;

/// Every knot span is split at least this many times
const MIN_DEPTH: u32 = 2;

/// Subdivision stops here whatever the deviation
const MAX_DEPTH: u32 = 16;

/// Homogeneous control point `(w*x, w*y, w)`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Weighted {
    x: f64,
    y: f64,
    w: f64,
}

impl Weighted {
    fn lerp(self, other: Weighted, alpha: f64) -> Weighted {
        Weighted {
            x: (1.0 - alpha) * self.x + alpha * other.x,
            y: (1.0 - alpha) * self.y + alpha * other.y,
            w: (1.0 - alpha) * self.w + alpha * other.w,
        }
    }

    fn project(self) -> Point {
        Point::new(self.x / self.w, self.y / self.w)
    }
}

/// A validated non-uniform rational B-spline
#[derive(Debug, Clone, PartialEq)]
pub struct BSpline {
    degree: usize,
    knots: Vec<f64>,
    control: Vec<Weighted>,
}

impl BSpline {
    /// Build a spline from its definition.
    ///
    /// The degree is lowered when there are too few control points for it.
    /// A knot vector of the wrong length, decreasing, or with an empty
    /// domain is replaced by a clamped uniform one. Weights are used only
    /// when there is one per control point and all are positive. Returns
    /// `None` with fewer than two control points or a degree below one.
    pub fn new(
        degree: usize,
        knots: &[f64],
        control_points: &[Point],
        weights: &[f64],
    ) -> Option<Self> {
        if control_points.len() < 2 || degree == 0 {
            return None;
        }
        let degree = degree.min(control_points.len() - 1);

        let use_weights = weights.len() == control_points.len()
            && weights.iter().all(|w| w.is_finite() && *w > 0.0);
        let control = control_points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let w = if use_weights { weights[i] } else { 1.0 };
                Weighted {
                    x: p.x * w,
                    y: p.y * w,
                    w,
                }
            })
            .collect::<Vec<_>>();

        let knots = if knots_are_valid(knots, degree, control.len()) {
            knots.to_vec()
        } else {
            clamped_uniform_knots(degree, control.len())
        };

        Some(Self {
            degree,
            knots,
            control,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Parameter range `[t_start, t_end]` the curve is defined on
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.control.len()])
    }

    /// Evaluate the curve at parameter `t`, clamped to the domain
    pub fn evaluate(&self, t: f64) -> Point {
        let p = self.degree;
        let (start, end) = self.domain();
        let t = t.clamp(start, end);
        let k = self.span(t);

        let mut d: Vec<Weighted> = (0..=p).map(|j| self.control[j + k - p]).collect();
        for r in 1..=p {
            for j in (r..=p).rev() {
                let i = j + k - p;
                let denom = self.knots[i + p + 1 - r] - self.knots[i];
                let alpha = if denom == 0.0 {
                    0.0
                } else {
                    (t - self.knots[i]) / denom
                };
                d[j] = d[j - 1].lerp(d[j], alpha);
            }
        }
        d[p].project()
    }

    /// Approximate the curve with a polyline whose pieces deviate from the
    /// curve by at most `tolerance` at their midpoints.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point> {
        let (start, end) = self.domain();

        let mut breaks: Vec<f64> = self
            .knots
            .iter()
            .copied()
            .filter(|k| *k > start && *k < end)
            .collect();
        breaks.dedup();
        breaks.insert(0, start);
        breaks.push(end);

        let mut points = vec![self.evaluate(start)];
        for span in breaks.windows(2) {
            let (a, b) = (span[0], span[1]);
            let pa = self.evaluate(a);
            let pb = self.evaluate(b);
            self.subdivide(a, b, pa, pb, 0, tolerance, &mut points);
        }
        points
    }

    #[allow(clippy::too_many_arguments)]
    fn subdivide(
        &self,
        a: f64,
        b: f64,
        pa: Point,
        pb: Point,
        depth: u32,
        tolerance: f64,
        out: &mut Vec<Point>,
    ) {
        let mid = (a + b) / 2.0;
        let pm = self.evaluate(mid);

        let flat = depth >= MIN_DEPTH && distance_to_segment(&pm, &pa, &pb) <= tolerance;
        if flat || depth >= MAX_DEPTH {
            out.push(pb);
            return;
        }

        self.subdivide(a, mid, pa, pm, depth + 1, tolerance, out);
        self.subdivide(mid, b, pm, pb, depth + 1, tolerance, out);
    }

    /// Index `k` of the knot span containing `t`, with `knots[k] < knots[k + 1]`
    fn span(&self, t: f64) -> usize {
        let p = self.degree;
        let n = self.control.len() - 1;
        (p..=n)
            .rev()
            .find(|&k| self.knots[k] <= t && self.knots[k] < self.knots[k + 1])
            .unwrap_or(p)
    }
}

fn knots_are_valid(knots: &[f64], degree: usize, control_count: usize) -> bool {
    knots.len() == control_count + degree + 1
        && knots.iter().all(|k| k.is_finite())
        && knots.windows(2).all(|w| w[0] <= w[1])
        && knots[degree] < knots[control_count]
}

/// Knot vector with `degree + 1` repeated zeros and ones and evenly spaced
/// interior knots, so the curve starts and ends on its end control points.
fn clamped_uniform_knots(degree: usize, control_count: usize) -> Vec<f64> {
    let interior = control_count - degree - 1;
    let mut knots = vec![0.0; degree + 1];
    knots.extend((1..=interior).map(|i| i as f64 / (interior + 1) as f64));
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_clamped_uniform_knots() {
        assert_eq!(
            clamped_uniform_knots(3, 4),
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]
        );
        assert_eq!(
            clamped_uniform_knots(2, 4),
            vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_linear_spline_is_the_control_polygon() {
        let spline = BSpline::new(1, &[], &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)], &[]).unwrap();
        assert!(spline.evaluate(0.0).approx_eq(&p(0.0, 0.0), 1e-12));
        assert!(spline.evaluate(0.5).approx_eq(&p(10.0, 0.0), 1e-12));
        assert!(spline.evaluate(1.0).approx_eq(&p(10.0, 10.0), 1e-12));
        assert!(spline.evaluate(0.25).approx_eq(&p(5.0, 0.0), 1e-12));
    }

    #[test]
    fn test_cubic_bezier_midpoint() {
        // Single-span clamped cubic is a Bezier curve
        let ctrl = [p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)];
        let spline = BSpline::new(3, &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0], &ctrl, &[]).unwrap();
        assert!(spline.evaluate(0.5).approx_eq(&p(5.0, 7.5), 1e-12));
        assert!(spline.evaluate(1.0).approx_eq(&p(10.0, 0.0), 1e-12));
    }

    #[test]
    fn test_inconsistent_knots_fall_back_to_uniform() {
        let ctrl = [p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)];
        let spline = BSpline::new(3, &[0.0, 1.0, 2.0], &ctrl, &[]).unwrap();
        assert_eq!(spline.domain(), (0.0, 1.0));
        assert!(spline.evaluate(0.5).approx_eq(&p(5.0, 7.5), 1e-12));
    }

    #[test]
    fn test_rational_quarter_circle() {
        // Quadratic NURBS quarter circle
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let spline = BSpline::new(
            2,
            &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            &[p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)],
            &[1.0, w, 1.0],
        )
        .unwrap();
        for i in 0..=10 {
            let q = spline.evaluate(i as f64 / 10.0);
            assert!((q.distance_to(&p(0.0, 0.0)) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_flatten_respects_tolerance() {
        let ctrl = [p(0.0, 0.0), p(20.0, 40.0), p(40.0, -40.0), p(60.0, 0.0), p(80.0, 20.0)];
        let spline = BSpline::new(3, &[], &ctrl, &[]).unwrap();
        let pts = spline.flatten(0.1);

        assert!(pts[0].approx_eq(&ctrl[0], 1e-12));
        assert!(pts.last().unwrap().approx_eq(&ctrl[4], 1e-12));

        // Sample the curve densely and check it stays near the polyline
        for i in 0..=400 {
            let q = spline.evaluate(i as f64 / 400.0);
            let nearest = pts
                .windows(2)
                .map(|w| distance_to_segment(&q, &w[0], &w[1]))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest < 0.15, "curve point {:?} is {} away", q, nearest);
        }
    }

    #[test]
    fn test_degree_is_capped_by_control_count() {
        let spline = BSpline::new(3, &[], &[p(0.0, 0.0), p(4.0, 4.0)], &[]).unwrap();
        assert_eq!(spline.degree(), 1);
        assert!(spline.evaluate(0.5).approx_eq(&p(2.0, 2.0), 1e-12));
    }

    #[test]
    fn test_unusable_definitions() {
        assert!(BSpline::new(3, &[], &[p(0.0, 0.0)], &[]).is_none());
        assert!(BSpline::new(0, &[], &[p(0.0, 0.0), p(1.0, 1.0)], &[]).is_none());
    }
}
