//! Tail styles, all anchored on the rear of the body.

use super::geometry::{FigureGeometry, TailAnchor};
use super::stroke_width;
use crate::canvas::Canvas;
use crate::params::{FigureParameters, TailStyle};
use kurbo::Point;
use rand::Rng;

/// Samples along a braided tail.
const BRAID_STEPS: usize = 10;

pub fn draw<C: Canvas>(
    canvas: &mut C,
    geometry: &FigureGeometry,
    params: &FigureParameters,
    size_factor: f64,
    rng: &mut impl Rng,
) {
    let anchor = &geometry.tail;
    let color = params.mane_color;
    match params.tail_style {
        TailStyle::Flowing => {
            let width = stroke_width(1, 2.0 * size_factor * params.tail_thickness);
            for _ in 0..params.tail_strands() {
                let jitter: f64 = rng.gen_range(-20.0..=20.0);
                let angle = anchor.angle + jitter.to_radians();
                let length = anchor.length * (0.7 + 0.3 * rng.gen::<f64>());
                let end = anchor.start + TailAnchor::direction(angle) * length;
                canvas.line(&[anchor.start, end], color, width);
            }
        }
        TailStyle::Short => {
            let end = anchor.point_at(0.4);
            let half_width = geometry.dims.body_height * 0.2 * params.tail_thickness;
            let across = anchor.across() * half_width;
            canvas.polygon(&[anchor.start, end + across, end - across], color);
        }
        TailStyle::Braided => {
            let zigzag = anchor.length * 0.1;
            let across = anchor.across();
            let points: Vec<Point> = (0..BRAID_STEPS)
                .map(|i| {
                    let t = i as f64 / (BRAID_STEPS - 1) as f64;
                    let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                    anchor.point_at(t) + across * (zigzag * side)
                })
                .collect();
            let width = stroke_width(3, 5.0 * size_factor * params.tail_thickness);
            canvas.line(&points, color, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::figure::Placement;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn render(params: &FigureParameters, seed: u64) -> Vec<DrawOp> {
        let geometry = FigureGeometry::derive(params, Placement::new(200.0, 200.0, 1.0));
        let mut canvas = RecordingCanvas::new();
        draw(&mut canvas, &geometry, params, 1.0, &mut StdRng::seed_from_u64(seed));
        canvas.ops
    }

    #[test]
    fn flowing_strands_scale_with_thickness() {
        let params = FigureParameters {
            tail_thickness: 1.2,
            ..FigureParameters::default()
        };
        let ops = render(&params, 9);
        assert_eq!(ops.len(), 8);
        let geometry = FigureGeometry::derive(&params, Placement::new(200.0, 200.0, 1.0));
        for op in &ops {
            match op {
                DrawOp::Line { points, .. } => {
                    assert_eq!(points[0], geometry.tail.start);
                    let length = (points[1] - points[0]).hypot();
                    assert!(length >= geometry.tail.length * 0.7 - 1e-9);
                    assert!(length <= geometry.tail.length + 1e-9);
                }
                other => panic!("unexpected op {other:?}"),
            }
        }
    }

    #[test]
    fn short_tail_is_a_triangle() {
        let params = FigureParameters {
            tail_style: TailStyle::Short,
            ..FigureParameters::default()
        };
        let ops = render(&params, 0);
        assert!(matches!(&ops[..], [DrawOp::Polygon { points, .. }] if points.len() == 3));
        assert_eq!(ops, render(&params, 1));
    }

    #[test]
    fn short_tail_spreads_across_its_axis() {
        for tail_angle in [30.0, 45.0, 60.0] {
            let params = FigureParameters {
                tail_style: TailStyle::Short,
                tail_angle,
                ..FigureParameters::default()
            };
            let ops = render(&params, 0);
            let DrawOp::Polygon { points, .. } = &ops[0] else {
                panic!("expected a polygon");
            };
            let area = (points[1] - points[0]).cross(points[2] - points[0]).abs() / 2.0;
            // 0.4 of the 120 px tail times the 16 px half width
            assert_relative_eq!(area, 48.0 * 16.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn braided_tail_zigzags_across_its_axis() {
        let params = FigureParameters {
            tail_style: TailStyle::Braided,
            ..FigureParameters::default()
        };
        let ops = render(&params, 0);
        assert!(matches!(&ops[..], [DrawOp::Line { points, width: 5, .. }] if points.len() == 10));

        let geometry = FigureGeometry::derive(&params, Placement::new(200.0, 200.0, 1.0));
        let axis = TailAnchor::direction(geometry.tail.angle);
        let DrawOp::Line { points, .. } = &ops[0] else {
            unreachable!()
        };
        let offsets: Vec<f64> = points
            .iter()
            .map(|point| axis.cross(*point - geometry.tail.start))
            .collect();
        // Zigzag of 0.1 of the 120 px tail, alternating sides
        for pair in offsets.windows(2) {
            assert_relative_eq!(pair[0].abs(), 12.0, epsilon = 1e-9);
            assert!(pair[0] * pair[1] < 0.0);
        }
    }
}
