//! Axis word extraction from motion lines

use regex::Regex;
use std::sync::OnceLock;

/// X/Y/Z values found on one line. A missing word stays `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisWords {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl AxisWords {
    /// Machine origin, the assumed position before the first line
    pub const ORIGIN: AxisWords = AxisWords {
        x: Some(0.0),
        y: Some(0.0),
        z: Some(0.0),
    };

    pub fn has_any(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }
}

fn axis_regex(axis: char) -> &'static Regex {
    static X: OnceLock<Regex> = OnceLock::new();
    static Y: OnceLock<Regex> = OnceLock::new();
    static Z: OnceLock<Regex> = OnceLock::new();

    let cell = match axis {
        'X' => &X,
        'Y' => &Y,
        _ => &Z,
    };
    cell.get_or_init(|| {
        Regex::new(&format!(r"{axis}([-+]?[0-9]*\.?[0-9]+)")).expect("invalid axis regex")
    })
}

fn axis_value(line: &str, axis: char) -> Option<f64> {
    axis_regex(axis)
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// First X, Y and Z values on a line, e.g. `G1 X10.00 Y-2.5 E1.00`
pub fn extract_coordinates(line: &str) -> AxisWords {
    AxisWords {
        x: axis_value(line, 'X'),
        y: axis_value(line, 'Y'),
        z: axis_value(line, 'Z'),
    }
}

/// Euclidean distance between two positions. An axis missing on either
/// side contributes nothing.
pub fn travel_distance(previous: &AxisWords, current: &AxisWords) -> f64 {
    let delta = |a: Option<f64>, b: Option<f64>| match (a, b) {
        (Some(a), Some(b)) => b - a,
        _ => 0.0,
    };
    let dx = delta(previous.x, current.x);
    let dy = delta(previous.y, current.y);
    let dz = delta(previous.z, current.z);
    (dx * dx + dy * dy + dz * dz).sqrt()
}
