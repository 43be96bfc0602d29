//! Polygon placement on the working area
//!
//! Pure transforms: each returns a new polygon and leaves the input alone.

use gcodehatch_core::{Polygon, ToolpathError, ToolpathResult};
use tracing::debug;

/// Multiply every coordinate by `factor` (e.g. 25.4 for inch drawings).
pub fn scale_polygon(polygon: &Polygon, factor: f64) -> ToolpathResult<Polygon> {
    if polygon.is_empty() {
        return Err(ToolpathError::invalid_polygon("cannot scale an empty polygon"));
    }
    Ok(polygon.iter().map(|p| p.scaled(factor)).collect())
}

/// Translate the polygon so its bounding-box center sits on the center of a
/// `bed_width` x `bed_height` working area.
pub fn center_polygon(
    polygon: &Polygon,
    bed_width: f64,
    bed_height: f64,
) -> ToolpathResult<Polygon> {
    let bounds = polygon
        .bounds()
        .ok_or_else(|| ToolpathError::invalid_polygon("cannot center an empty polygon"))?;

    let center = bounds.center();
    let offset_x = bed_width / 2.0 - center.x;
    let offset_y = bed_height / 2.0 - center.y;

    debug!(offset_x, offset_y, "Centering polygon on working area");

    Ok(polygon.iter().map(|p| p.offset(offset_x, offset_y)).collect())
}
