//! # GCodeHatch Visualizer
//!
//! Raster previews of a generated toolpath. A [`PreviewRenderer`] draws the
//! working area with every draw move in solid blue, every travel move in
//! dashed green and the final head position as a red dot. A
//! [`PreviewSession`] steps through the program one command at a time.

pub mod renderer;
pub mod session;

pub use renderer::{PreviewError, PreviewRenderer, DEFAULT_PREVIEW_SIZE};
pub use session::PreviewSession;
