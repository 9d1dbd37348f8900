//! Replaying strokes onto a raster.

use super::{path, MarkSpec, Painting, StrokeRecord};
use crate::canvas::{Color, RasterCanvas};
use crate::error::Result;
use tracing::debug;

/// Put one stroke on the canvas. Pens outline the stroke path, brushes
/// fill it; both blend at the mark's opacity.
pub fn paint_stroke(canvas: &mut RasterCanvas, stroke: &StrokeRecord) -> Result<()> {
    let commands = path::parse(&stroke.mark)?;
    let shape = path::to_bez_path(&commands, stroke.start_point);
    match stroke.mark_spec {
        MarkSpec::Pen {
            color,
            width,
            opacity,
        } => canvas.stroke_path_blended(&shape, color, width, opacity),
        MarkSpec::Brush { color, opacity } => canvas.fill_path_blended(&shape, color, opacity),
    }
    Ok(())
}

/// Render a whole painting on a black canvas.
///
/// The painting is checked before any stroke is drawn.
pub fn render_painting(painting: &Painting, width: u32, height: u32) -> Result<RasterCanvas> {
    painting.validate()?;
    let mut canvas = RasterCanvas::new(width, height, Color::BLACK);
    for stroke in painting.strokes() {
        paint_stroke(&mut canvas, &stroke)?;
    }
    debug!(strokes = painting.len(), width, height, "rendered painting");
    Ok(canvas)
}
