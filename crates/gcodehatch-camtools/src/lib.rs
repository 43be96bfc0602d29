//! # GCodeHatch CAM Tools
//!
//! The toolpath generation engine. A drawing's decoded primitives flow
//! through these stages in order:
//!
//! - **Normalizer**: stitches open curve segments into a single polygon
//! - **Placement**: optional unit scaling and centering on the working area
//! - **Perimeter**: traces the polygon boundary once
//! - **Hatch Generator**: two-direction diagonal cross-hatch infill
//! - **G-code Emitter**: turns move/draw commands into motion lines
//!
//! [`generate_toolpath`] runs the whole chain.

pub mod gcode_emitter;
pub mod hatch_generator;
pub mod normalizer;
pub mod perimeter;
pub mod placement;
pub mod toolpath;

pub use gcode_emitter::{emit_gcode, render_program, EmitterParams, DEFAULT_EXTRUSION_DIVISOR};
pub use hatch_generator::{
    cross_hatch, line_polygon_intersections, HatchParams, DEFAULT_HATCH_SPACING,
    DEFAULT_PARALLEL_EPSILON,
};
pub use normalizer::{normalize_primitives, stitch_segments, StitchResult};
pub use perimeter::perimeter_path;
pub use placement::{center_polygon, scale_polygon};
pub use toolpath::{
    generate_toolpath, Toolpath, ToolpathInput, ToolpathParams, DEFAULT_BED_HEIGHT,
    DEFAULT_BED_WIDTH,
};
