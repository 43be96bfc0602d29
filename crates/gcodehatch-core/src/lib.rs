//! # GCodeHatch Core
//!
//! Core types and utilities shared by every GCodeHatch crate.
//! Provides the geometric value types the toolpath engine works on,
//! unit conversion helpers, and the tagged error enums that callers
//! branch on.

pub mod error;
pub mod types;
pub mod units;

pub use error::{ConnectionError, ImportError, ToolpathError, ToolpathResult};

pub use types::{
    Bounds, Command, GcodeLine, MoveMode, Point, Polygon, Primitive, PrimitiveKind, Segment,
    DEFAULT_POINT_TOLERANCE,
};

pub use units::Units;
