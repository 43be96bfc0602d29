//! PNG preview renderer

use gcodehatch_camtools::{DEFAULT_BED_HEIGHT, DEFAULT_BED_WIDTH};
use gcodehatch_core::{Command, MoveMode};
use image::{Rgb, RgbImage};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Default preview edge length in pixels
pub const DEFAULT_PREVIEW_SIZE: u32 = 600;

/// Margin between the image border and the working area outline
const PADDING_PX: f64 = 10.0;

/// Travel moves alternate this many pixels on and off
const DASH_PX: u32 = 6;

const DOT_RADIUS_PX: i32 = 4;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BED_OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);
const DRAW_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const TRAVEL_COLOR: Rgb<u8> = Rgb([0, 160, 0]);
const HEAD_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Preview errors
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Image or working area dimensions are unusable
    #[error("Invalid preview size: {reason}")]
    InvalidSize { reason: String },
    /// Encoding or writing the image failed
    #[error("Failed to write preview image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    Solid,
    Dashed,
}

/// Renders toolpath commands onto a working-area image. Bed Y points up.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRenderer {
    bed_width: f64,
    bed_height: f64,
    width_px: u32,
    height_px: u32,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self {
            bed_width: DEFAULT_BED_WIDTH,
            bed_height: DEFAULT_BED_HEIGHT,
            width_px: DEFAULT_PREVIEW_SIZE,
            height_px: DEFAULT_PREVIEW_SIZE,
        }
    }
}

impl PreviewRenderer {
    pub fn new(
        bed_width: f64,
        bed_height: f64,
        width_px: u32,
        height_px: u32,
    ) -> Result<Self, PreviewError> {
        if !(bed_width.is_finite() && bed_width > 0.0 && bed_height.is_finite() && bed_height > 0.0)
        {
            return Err(PreviewError::InvalidSize {
                reason: format!("working area {bed_width} x {bed_height} has no area"),
            });
        }
        let min_px = (2.0 * PADDING_PX) as u32 + 1;
        if width_px <= min_px || height_px <= min_px {
            return Err(PreviewError::InvalidSize {
                reason: format!("{width_px} x {height_px} px is too small"),
            });
        }
        Ok(Self {
            bed_width,
            bed_height,
            width_px,
            height_px,
        })
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    /// Render every command
    pub fn render(&self, commands: &[Command]) -> RgbImage {
        let mut img = self.blank();
        self.draw_commands(&mut img, commands);
        img
    }

    /// Render commands `0..=frame` only
    pub fn render_frame(&self, commands: &[Command], frame: usize) -> RgbImage {
        let end = frame.saturating_add(1).min(commands.len());
        self.render(&commands[..end])
    }

    /// Render every command and write the result as PNG
    pub fn save_png(&self, commands: &[Command], path: impl AsRef<Path>) -> Result<(), PreviewError> {
        let path = path.as_ref();
        self.render(commands)
            .save_with_format(path, image::ImageFormat::Png)?;
        debug!(path = %path.display(), commands = commands.len(), "Saved preview image");
        Ok(())
    }

    /// Pixel position of a working-area coordinate
    pub fn to_pixel(&self, x: f64, y: f64) -> (i32, i32) {
        let scale = self.scale();
        let offset_x = PADDING_PX + (self.avail_width() - self.bed_width * scale) / 2.0;
        let offset_y = PADDING_PX + (self.avail_height() - self.bed_height * scale) / 2.0;

        let px = offset_x + x * scale;
        let py = self.height_px as f64 - 1.0 - (offset_y + y * scale);
        (px.round() as i32, py.round() as i32)
    }

    fn avail_width(&self) -> f64 {
        self.width_px as f64 - 2.0 * PADDING_PX
    }

    fn avail_height(&self) -> f64 {
        self.height_px as f64 - 2.0 * PADDING_PX
    }

    fn scale(&self) -> f64 {
        (self.avail_width() / self.bed_width).min(self.avail_height() / self.bed_height)
    }

    fn blank(&self) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width_px, self.height_px, BACKGROUND);

        let corners = [
            self.to_pixel(0.0, 0.0),
            self.to_pixel(self.bed_width, 0.0),
            self.to_pixel(self.bed_width, self.bed_height),
            self.to_pixel(0.0, self.bed_height),
        ];
        for i in 0..corners.len() {
            let (x0, y0) = corners[i];
            let (x1, y1) = corners[(i + 1) % corners.len()];
            draw_line_segment(&mut img, x0, y0, x1, y1, BED_OUTLINE, LineStyle::Solid);
        }
        img
    }

    fn draw_commands(&self, img: &mut RgbImage, commands: &[Command]) {
        for pair in commands.windows(2) {
            let (x0, y0) = self.to_pixel(pair[0].x, pair[0].y);
            let (x1, y1) = self.to_pixel(pair[1].x, pair[1].y);
            match pair[1].mode {
                MoveMode::Draw => {
                    draw_line_segment(img, x0, y0, x1, y1, DRAW_COLOR, LineStyle::Solid)
                }
                MoveMode::Move => {
                    draw_line_segment(img, x0, y0, x1, y1, TRAVEL_COLOR, LineStyle::Dashed)
                }
            }
        }

        if let Some(head) = commands.last() {
            let (cx, cy) = self.to_pixel(head.x, head.y);
            draw_dot(img, cx, cy, DOT_RADIUS_PX, HEAD_COLOR);
        }
    }
}

fn put_pixel_clipped(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && x < img.width() as i32 && y >= 0 && y < img.height() as i32 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_line_segment(
    img: &mut RgbImage,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Rgb<u8>,
    style: LineStyle,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;
    let mut step = 0u32;

    loop {
        let on = match style {
            LineStyle::Solid => true,
            LineStyle::Dashed => (step / DASH_PX) % 2 == 0,
        };
        if on {
            put_pixel_clipped(img, x, y, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1;
    }
}

fn draw_dot(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_clipped(img, cx + dx, cy + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pixel_flips_y() {
        let renderer = PreviewRenderer::default();
        // 580 px available for 200 mm
        assert_eq!(renderer.to_pixel(0.0, 0.0), (10, 589));
        assert_eq!(renderer.to_pixel(200.0, 200.0), (590, 9));
        assert_eq!(renderer.to_pixel(100.0, 100.0), (300, 299));
    }

    #[test]
    fn test_non_square_bed_is_letterboxed() {
        let renderer = PreviewRenderer::new(400.0, 100.0, 420, 420).unwrap();
        let (left, bottom) = renderer.to_pixel(0.0, 0.0);
        let (right, top) = renderer.to_pixel(400.0, 100.0);
        assert_eq!(left, 10);
        assert_eq!(right, 410);
        // 100 mm tall at 1 px/mm, centered vertically
        assert_eq!(bottom - top, 100);
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(PreviewRenderer::new(0.0, 100.0, 600, 600).is_err());
        assert!(PreviewRenderer::new(100.0, f64::NAN, 600, 600).is_err());
        assert!(PreviewRenderer::new(100.0, 100.0, 10, 600).is_err());
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut img = RgbImage::from_pixel(100, 10, BACKGROUND);
        draw_line_segment(&mut img, 0, 5, 99, 5, TRAVEL_COLOR, LineStyle::Dashed);
        let row: Vec<_> = (0..100).map(|x| *img.get_pixel(x, 5)).collect();
        assert_eq!(row[0], TRAVEL_COLOR);
        assert_eq!(row[DASH_PX as usize], BACKGROUND);
        assert_eq!(row[2 * DASH_PX as usize], TRAVEL_COLOR);
    }

    #[test]
    fn test_line_is_clipped_to_image() {
        let mut img = RgbImage::from_pixel(10, 10, BACKGROUND);
        draw_line_segment(&mut img, -20, -20, 30, 30, DRAW_COLOR, LineStyle::Solid);
        assert_eq!(*img.get_pixel(5, 5), DRAW_COLOR);
    }
}
