//! Toolpath pipeline
//!
//! Runs normalize -> validate -> scale -> center -> perimeter -> cross-hatch
//! and returns the placed polygon together with its command list.

use crate::hatch_generator::{
    cross_hatch, HatchParams, DEFAULT_HATCH_SPACING, DEFAULT_PARALLEL_EPSILON,
};
use crate::normalizer::normalize_primitives;
use crate::perimeter::perimeter_path;
use crate::placement::{center_polygon, scale_polygon};
use gcodehatch_core::{
    Command, Point, Polygon, Primitive, ToolpathError, ToolpathResult, DEFAULT_POINT_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default working area width in millimetres
pub const DEFAULT_BED_WIDTH: f64 = 200.0;

/// Default working area height in millimetres
pub const DEFAULT_BED_HEIGHT: f64 = 200.0;

/// What the pipeline starts from
#[derive(Debug, Clone, PartialEq)]
pub enum ToolpathInput {
    /// An already assembled outline
    Polygon(Polygon),
    /// Decoded primitives that still need normalizing
    Primitives(Vec<Primitive>),
}

impl From<Polygon> for ToolpathInput {
    fn from(polygon: Polygon) -> Self {
        Self::Polygon(polygon)
    }
}

impl From<Vec<Primitive>> for ToolpathInput {
    fn from(primitives: Vec<Primitive>) -> Self {
        Self::Primitives(primitives)
    }
}

/// Pipeline parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolpathParams {
    /// Perpendicular distance between hatch lines
    pub spacing: f64,
    pub bed_width: f64,
    pub bed_height: f64,
    /// Applied before centering; 1.0 leaves the polygon untouched
    pub scale_factor: f64,
    /// Endpoint matching and closure tolerance
    pub point_tolerance: f64,
    /// Parallel edge threshold for hatch intersection
    pub parallel_epsilon: f64,
}

impl Default for ToolpathParams {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_HATCH_SPACING,
            bed_width: DEFAULT_BED_WIDTH,
            bed_height: DEFAULT_BED_HEIGHT,
            scale_factor: 1.0,
            point_tolerance: DEFAULT_POINT_TOLERANCE,
            parallel_epsilon: DEFAULT_PARALLEL_EPSILON,
        }
    }
}

impl ToolpathParams {
    /// Check every parameter is finite and in range
    pub fn validate(&self) -> ToolpathResult<()> {
        let positive = [
            ("spacing", self.spacing),
            ("bed_width", self.bed_width),
            ("bed_height", self.bed_height),
            ("scale_factor", self.scale_factor),
            ("point_tolerance", self.point_tolerance),
            ("parallel_epsilon", self.parallel_epsilon),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ToolpathError::invalid_parameter(
                    name,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }
        Ok(())
    }

    fn hatch_params(&self) -> HatchParams {
        HatchParams {
            spacing: self.spacing,
            parallel_epsilon: self.parallel_epsilon,
        }
    }
}

/// A generated toolpath
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toolpath {
    /// The polygon after scaling and centering
    pub polygon: Polygon,
    pub perimeter: Vec<Command>,
    pub infill: Vec<Command>,
    /// False when stitching left segments over or did not close the loop.
    /// Always true for a polygon or closed primitive input.
    pub fully_closed: bool,
}

impl Toolpath {
    /// Perimeter followed by infill, in execution order
    pub fn commands(&self) -> Vec<Command> {
        self.perimeter
            .iter()
            .chain(self.infill.iter())
            .copied()
            .collect()
    }

    /// Positions of every command, in execution order
    pub fn points(&self) -> Vec<Point> {
        self.perimeter
            .iter()
            .chain(self.infill.iter())
            .map(Command::position)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.perimeter.len() + self.infill.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the full toolpath for one outline.
pub fn generate_toolpath(input: ToolpathInput, params: &ToolpathParams) -> ToolpathResult<Toolpath> {
    params.validate()?;

    let (polygon, fully_closed) = match input {
        ToolpathInput::Polygon(polygon) => {
            if polygon.is_empty() {
                return Err(ToolpathError::NoGeometryFound);
            }
            // A supplied polygon is a loop whether or not it repeats its first vertex
            (polygon, true)
        }
        ToolpathInput::Primitives(primitives) => {
            let stitched = normalize_primitives(primitives, params.point_tolerance)?;
            (stitched.polygon, stitched.fully_closed)
        }
    };

    validate_outline(&polygon, params.point_tolerance)?;

    let polygon = if params.scale_factor != 1.0 {
        debug!(factor = params.scale_factor, "Scaling polygon");
        scale_polygon(&polygon, params.scale_factor)?
    } else {
        polygon
    };

    let polygon = center_polygon(&polygon, params.bed_width, params.bed_height)?;

    let perimeter = perimeter_path(&polygon);
    let infill = cross_hatch(&polygon, &params.hatch_params())?;

    info!(
        vertices = polygon.len(),
        perimeter = perimeter.len(),
        infill = infill.len(),
        fully_closed,
        "Toolpath generated"
    );

    Ok(Toolpath {
        polygon,
        perimeter,
        infill,
        fully_closed,
    })
}

fn validate_outline(polygon: &Polygon, tolerance: f64) -> ToolpathResult<()> {
    let distinct = polygon.distinct_vertex_count(tolerance);
    if distinct < 3 {
        return Err(ToolpathError::invalid_polygon(format!(
            "outline has {distinct} distinct vertices, at least 3 are required"
        )));
    }

    let bounds = polygon
        .bounds()
        .ok_or_else(|| ToolpathError::invalid_polygon("outline is empty"))?;
    if bounds.is_degenerate(tolerance) {
        return Err(ToolpathError::invalid_polygon(format!(
            "bounding box has no area ({} x {})",
            bounds.width(),
            bounds.height()
        )));
    }

    Ok(())
}
