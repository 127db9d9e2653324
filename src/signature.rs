//! Drawable signature surface owned by the registration view

use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

use crate::error::Result;

pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 200;

const INK: Luma<u8> = Luma([0]);
const PAPER: Luma<u8> = Luma([255]);

/// A point in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Freehand strokes captured on a fixed-size surface
#[derive(Debug, Clone)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    strokes: Vec<Vec<Point>>,
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            strokes: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn clamp(&self, p: Point) -> Point {
        Point {
            x: p.x.clamp(0.0, (self.width - 1) as f32),
            y: p.y.clamp(0.0, (self.height - 1) as f32),
        }
    }

    /// Start a new stroke (pen down)
    pub fn begin_stroke(&mut self, at: Point) {
        let at = self.clamp(at);
        self.strokes.push(vec![at]);
    }

    /// Continue the current stroke; starts one if the pen was up
    pub fn extend_stroke(&mut self, to: Point) {
        let to = self.clamp(to);
        match self.strokes.last_mut() {
            Some(stroke) => stroke.push(to),
            None => self.strokes.push(vec![to]),
        }
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Rasterize the strokes, black on white
    pub fn render(&self) -> GrayImage {
        let mut img = GrayImage::from_pixel(self.width, self.height, PAPER);
        for stroke in &self.strokes {
            match stroke.as_slice() {
                [only] => plot(&mut img, *only),
                points => {
                    for pair in points.windows(2) {
                        draw_line(&mut img, pair[0], pair[1]);
                    }
                }
            }
        }
        img
    }

    /// Downsample the drawing to a `cols` x `rows` grid; a cell is set when
    /// any pixel it covers is inked
    pub fn coverage(&self, cols: u16, rows: u16) -> Vec<Vec<bool>> {
        let (cols, rows) = (u32::from(cols.max(1)), u32::from(rows.max(1)));
        let img = self.render();
        let mut grid = vec![vec![false; cols as usize]; rows as usize];
        for (x, y, pixel) in img.enumerate_pixels() {
            if *pixel == INK {
                let cx = (x * cols / self.width) as usize;
                let cy = (y * rows / self.height) as usize;
                grid[cy][cx] = true;
            }
        }
        grid
    }

    /// Encode the drawing as PNG
    pub fn export_image(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.render()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

fn plot(img: &mut GrayImage, p: Point) {
    let (x, y) = (p.x.round() as u32, p.y.round() as u32);
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, INK);
    }
}

// Sample the segment at one-pixel steps along its longer axis.
fn draw_line(img: &mut GrayImage, from: Point, to: Point) {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        plot(img, Point::new(from.x + dx * t, from.y + dy * t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pad_is_blank() {
        let pad = SignaturePad::default();
        assert!(pad.is_empty());
        assert_eq!((pad.width(), pad.height()), (500, 200));
        assert!(pad.render().pixels().all(|p| *p == PAPER));
    }

    #[test]
    fn test_stroke_is_rasterized() {
        let mut pad = SignaturePad::new(20, 10);
        pad.begin_stroke(Point::new(0.0, 5.0));
        pad.extend_stroke(Point::new(19.0, 5.0));

        let img = pad.render();
        for x in 0..20 {
            assert_eq!(*img.get_pixel(x, 5), INK);
        }
        assert_eq!(*img.get_pixel(0, 0), PAPER);
    }

    #[test]
    fn test_points_are_clamped() {
        let mut pad = SignaturePad::new(10, 10);
        pad.begin_stroke(Point::new(-5.0, 50.0));

        let img = pad.render();
        assert_eq!(*img.get_pixel(0, 9), INK);
    }

    #[test]
    fn test_clear_removes_strokes() {
        let mut pad = SignaturePad::default();
        pad.begin_stroke(Point::new(1.0, 1.0));
        pad.extend_stroke(Point::new(40.0, 30.0));
        pad.begin_stroke(Point::new(60.0, 60.0));
        assert_eq!(pad.stroke_count(), 2);

        pad.clear();
        assert!(pad.is_empty());
    }

    #[test]
    fn test_coverage_grid() {
        let mut pad = SignaturePad::new(100, 40);
        pad.begin_stroke(Point::new(0.0, 0.0));
        pad.extend_stroke(Point::new(10.0, 0.0));

        let grid = pad.coverage(10, 4);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0].len(), 10);
        assert!(grid[0][0] && grid[0][1]);
        assert!(!grid[0][5]);
        assert!(grid[1..].iter().flatten().all(|cell| !cell));
    }

    #[test]
    fn test_export_image_is_png() {
        let mut pad = SignaturePad::new(32, 16);
        pad.begin_stroke(Point::new(2.0, 2.0));
        pad.extend_stroke(Point::new(30.0, 14.0));

        let bytes = pad.export_image().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }
}
