//! # GCodeHatch Designer
//!
//! Drawing import for the toolpath engine. Reads DXF model-space entities
//! and flattens every supported curve into a [`Primitive`](gcodehatch_core::Primitive):
//!
//! - **Polylines** (`LWPOLYLINE`, `POLYLINE`): vertices as-is, closed flag honoured
//! - **Lines**: two-point open primitives
//! - **Circles and arcs**: flattened to a maximum sagitta
//! - **Ellipses**: full or partial, flattened to a maximum deviation
//! - **Splines**: evaluated with de Boor's algorithm and subdivided adaptively

pub mod flatten;
pub mod import;
pub mod spline;

pub use flatten::{flatten_arc, flatten_circle, flatten_ellipse, EllipseFlattening};
pub use import::{DxfImporter, ImportOptions, DEFAULT_ARC_SAGITTA, DEFAULT_CURVE_DISTANCE};
pub use spline::BSpline;
