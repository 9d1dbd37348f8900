//! Primitive drawing surfaces.
//!
//! Figures and scenes are described as a sequence of four primitive calls
//! (ellipse, polygon, polyline, rectangle). [`RasterCanvas`] turns them into
//! pixels with `imageproc`; [`RecordingCanvas`] keeps the calls themselves so
//! the exact sequence can be compared between runs.

use crate::error::Result;
use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_ellipse_mut, draw_line_segment_mut, draw_polygon_mut,
};
use kurbo::{BezPath, PathEl, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// Pixel coordinates are clamped to this range before rasterizing.
const COORD_LIMIT: f64 = 1_000_000.0;

/// Ellipse radii beyond this are clamped to keep the rasterizer in range.
const MAX_RADIUS: f64 = 4096.0;

/// Tolerance used when flattening Bézier paths into polylines.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// An RGB color, serialized as a 3-element integer array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parse a parenthesized integer triple such as `(139, 69, 19)`.
    ///
    /// Anything other than exactly three comma-separated integers in
    /// `0..=255` is rejected.
    pub fn from_tuple(text: &str) -> Option<Self> {
        let inner = text.trim().strip_prefix('(')?.strip_suffix(')')?;
        let channels = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().ok())
            .collect::<Option<Vec<u8>>>()?;
        match channels.as_slice() {
            [r, g, b] => Some(Self::rgb(*r, *g, *b)),
            _ => None,
        }
    }

    /// Linear interpolation between two colors; channels are truncated.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t) as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b]
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb([color.r, color.g, color.b])
    }
}

/// A surface accepting the primitive calls figures and scenes are made of.
pub trait Canvas {
    /// Filled axis-aligned ellipse inscribed in `bounds`.
    fn ellipse(&mut self, bounds: Rect, fill: Color);

    /// Filled polygon; the outline is closed implicitly.
    fn polygon(&mut self, points: &[Point], fill: Color);

    /// Open polyline of the given stroke width in pixels.
    fn line(&mut self, points: &[Point], color: Color, width: u32);

    /// Filled axis-aligned rectangle.
    fn rectangle(&mut self, bounds: Rect, fill: Color);
}

/// One recorded primitive call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Ellipse {
        bounds: Rect,
        fill: Color,
    },
    Polygon {
        points: Vec<Point>,
        fill: Color,
    },
    Line {
        points: Vec<Point>,
        color: Color,
        width: u32,
    },
    Rectangle {
        bounds: Rect,
        fill: Color,
    },
}

/// Canvas that records calls instead of rasterizing them.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }
}

impl Canvas for RecordingCanvas {
    fn ellipse(&mut self, bounds: Rect, fill: Color) {
        self.ops.push(DrawOp::Ellipse { bounds, fill });
    }

    fn polygon(&mut self, points: &[Point], fill: Color) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            fill,
        });
    }

    fn line(&mut self, points: &[Point], color: Color, width: u32) {
        self.ops.push(DrawOp::Line {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn rectangle(&mut self, bounds: Rect, fill: Color) {
        self.ops.push(DrawOp::Rectangle { bounds, fill });
    }
}

/// Canvas backed by an RGB image buffer.
pub struct RasterCanvas {
    image: RgbImage,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background.into()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Encode the canvas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Fill every subpath of `path` with `color` at the given opacity.
    pub fn fill_path_blended(&mut self, path: &BezPath, color: Color, opacity: u8) {
        let mut mask = GrayImage::new(self.width(), self.height());
        for (points, _) in flatten_subpaths(path) {
            fill_polygon(&mut mask, &points, Luma([255]));
        }
        self.blend_mask(&mask, color, opacity);
    }

    /// Stroke every subpath of `path` with `color` at the given opacity.
    pub fn stroke_path_blended(&mut self, path: &BezPath, color: Color, width: u32, opacity: u8) {
        let mut mask = GrayImage::new(self.width(), self.height());
        for (mut points, closed) in flatten_subpaths(path) {
            if closed {
                if let Some(first) = points.first().copied() {
                    points.push(first);
                }
            }
            stroke_polyline(&mut mask, &points, width, Luma([255]));
        }
        self.blend_mask(&mask, color, opacity);
    }

    /// Porter-Duff "over" of a solid color through a coverage mask onto the
    /// opaque canvas.
    fn blend_mask(&mut self, mask: &GrayImage, color: Color, opacity: u8) {
        let alpha = opacity as f32 / 255.0;
        let inv_alpha = 1.0 - alpha;
        let src = [color.r, color.g, color.b];
        for (x, y, coverage) in mask.enumerate_pixels() {
            if coverage.0[0] == 0 {
                continue;
            }
            let dst = self.image.get_pixel_mut(x, y);
            for c in 0..3 {
                dst.0[c] = (src[c] as f32 * alpha + dst.0[c] as f32 * inv_alpha) as u8;
            }
        }
    }
}

impl Canvas for RasterCanvas {
    fn ellipse(&mut self, bounds: Rect, fill: Color) {
        let bounds = bounds.abs();
        let center = bounds.center();
        let rx = clamp_radius(bounds.width() / 2.0);
        let ry = clamp_radius(bounds.height() / 2.0);
        draw_filled_ellipse_mut(
            &mut self.image,
            (clamp_coord(center.x), clamp_coord(center.y)),
            rx,
            ry,
            fill.into(),
        );
    }

    fn polygon(&mut self, points: &[Point], fill: Color) {
        fill_polygon(&mut self.image, points, fill.into());
    }

    fn line(&mut self, points: &[Point], color: Color, width: u32) {
        stroke_polyline(&mut self.image, points, width, color.into());
    }

    fn rectangle(&mut self, bounds: Rect, fill: Color) {
        let bounds = bounds.abs();
        let corners = [
            Point::new(bounds.x0, bounds.y0),
            Point::new(bounds.x1, bounds.y0),
            Point::new(bounds.x1, bounds.y1),
            Point::new(bounds.x0, bounds.y1),
        ];
        fill_polygon(&mut self.image, &corners, fill.into());
    }
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn clamp_coord(v: f64) -> i32 {
    if v.is_finite() {
        v.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i32
    } else {
        0
    }
}

fn clamp_radius(r: f64) -> i32 {
    if r.is_finite() {
        r.abs().round().min(MAX_RADIUS) as i32
    } else {
        0
    }
}

/// Round to pixel positions, dropping repeats the polygon filler rejects.
fn pixel_outline(points: &[Point]) -> Vec<imageproc::point::Point<i32>> {
    let mut outline: Vec<imageproc::point::Point<i32>> = Vec::with_capacity(points.len());
    for p in points {
        let q = imageproc::point::Point::new(clamp_coord(p.x), clamp_coord(p.y));
        if outline.last() != Some(&q) {
            outline.push(q);
        }
    }
    while outline.len() > 1 && outline.first() == outline.last() {
        outline.pop();
    }
    outline
}

fn fill_polygon<C>(canvas: &mut C, points: &[Point], pixel: C::Pixel)
where
    C: imageproc::drawing::Canvas,
{
    let outline = pixel_outline(points);
    match outline.as_slice() {
        [] => {}
        [p] => draw_filled_circle_mut(canvas, (p.x, p.y), 0, pixel),
        [a, b] => draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            pixel,
        ),
        _ => draw_polygon_mut(canvas, &outline, pixel),
    }
}

/// Polyline with square ends and no joins; widths above one pixel become a
/// quadrilateral per segment.
fn stroke_polyline<C>(canvas: &mut C, points: &[Point], width: u32, pixel: C::Pixel)
where
    C: imageproc::drawing::Canvas,
{
    for segment in points.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        if width <= 1 {
            draw_line_segment_mut(
                canvas,
                (clamp_coord(a.x) as f32, clamp_coord(a.y) as f32),
                (clamp_coord(b.x) as f32, clamp_coord(b.y) as f32),
                pixel,
            );
            continue;
        }
        let along = b - a;
        let length = along.hypot();
        if !length.is_normal() {
            continue;
        }
        let half = width as f64 / 2.0;
        let normal = Vec2::new(-along.y, along.x) * (half / length);
        let quad = [a + normal, b + normal, b - normal, a - normal];
        fill_polygon(canvas, &quad, pixel);
    }
}

/// Flatten a path into polylines, one per subpath, flagged when closed.
pub(crate) fn flatten_subpaths(path: &BezPath) -> Vec<(Vec<Point>, bool)> {
    let mut subpaths = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut closed = false;
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            if current.len() > 1 {
                subpaths.push((std::mem::take(&mut current), closed));
            }
            current.clear();
            current.push(p);
            closed = false;
        }
        PathEl::LineTo(p) => current.push(p),
        PathEl::ClosePath => closed = true,
        _ => {}
    });
    if current.len() > 1 {
        subpaths.push((current, closed));
    }
    subpaths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_tuple_colors() {
        assert_eq!(Color::from_hex("#8B4513"), Some(Color::rgb(139, 69, 19)));
        assert_eq!(Color::from_hex("#ZZZ"), None);
        assert_eq!(Color::from_hex("#12345G"), None);
        assert_eq!(Color::from_tuple("(139, 69, 19)"), Some(Color::rgb(139, 69, 19)));
        assert_eq!(Color::from_tuple("(1, 2)"), None);
        assert_eq!(Color::from_tuple("(1, 2, 300)"), None);
        assert_eq!(Color::from_tuple("__import__('os')"), None);
    }

    #[test]
    fn color_serializes_as_array() {
        let json = serde_json::to_string(&Color::rgb(51, 25, 0)).unwrap();
        assert_eq!(json, "[51,25,0]");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(51, 25, 0));
    }

    #[test]
    fn raster_canvas_fills_ellipse_center() {
        let mut canvas = RasterCanvas::new(100, 100, Color::WHITE);
        canvas.ellipse(Rect::new(30.0, 40.0, 70.0, 60.0), Color::rgb(139, 69, 19));
        assert_eq!(canvas.image().get_pixel(50, 50), &Rgb([139, 69, 19]));
        assert_eq!(canvas.image().get_pixel(5, 5), &Rgb([255, 255, 255]));
    }

    #[test]
    fn degenerate_primitives_do_not_panic() {
        let mut canvas = RasterCanvas::new(64, 64, Color::BLACK);
        let p = Point::new(10.0, 10.0);
        canvas.polygon(&[], Color::WHITE);
        canvas.polygon(&[p, p, p, p], Color::WHITE);
        canvas.polygon(&[p, Point::new(20.0, 10.0), p], Color::WHITE);
        canvas.line(&[p, p], Color::WHITE, 5);
        canvas.ellipse(Rect::new(40.0, 40.0, 20.0, 20.0), Color::WHITE);
        canvas.ellipse(Rect::new(f64::NAN, 0.0, f64::INFINITY, 1e30), Color::WHITE);
        canvas.rectangle(Rect::new(5.0, 5.0, 5.0, 5.0), Color::WHITE);
        canvas.line(&[Point::new(-1e12, 0.0), Point::new(1e12, 0.0)], Color::WHITE, 1);
    }

    #[test]
    fn blended_fill_mixes_with_background() {
        let mut canvas = RasterCanvas::new(20, 20, Color::BLACK);
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((19.0, 0.0));
        path.line_to((19.0, 19.0));
        path.line_to((0.0, 19.0));
        path.close_path();
        canvas.fill_path_blended(&path, Color::rgb(200, 100, 0), 128);
        let px = canvas.image().get_pixel(10, 10);
        assert!(px.0[0] > 90 && px.0[0] < 110, "{px:?}");
        assert!(px.0[1] > 40 && px.0[1] < 60, "{px:?}");
        assert_eq!(px.0[2], 0);
    }

    #[test]
    fn recording_canvas_keeps_call_order() {
        let mut canvas = RecordingCanvas::new();
        canvas.rectangle(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK);
        canvas.line(&[Point::ZERO, Point::new(1.0, 1.0)], Color::WHITE, 2);
        assert!(matches!(canvas.ops()[0], DrawOp::Rectangle { .. }));
        assert!(matches!(canvas.ops()[1], DrawOp::Line { width: 2, .. }));
    }

    #[test]
    fn png_encoding_produces_signature() {
        let canvas = RasterCanvas::new(4, 4, Color::WHITE);
        let png = canvas.to_png().unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }
}
