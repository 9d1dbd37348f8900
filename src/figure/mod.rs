//! The figure drawing engine.
//!
//! A figure is drawn in derivation order: body, neck, head and face, mane,
//! legs, tail. Geometry is computed up front by [`FigureGeometry::derive`];
//! the only randomness is strand jitter in the mane and tail, which comes from
//! the injected rng.

pub mod geometry;
pub mod mane;
pub mod tail;

pub use geometry::FigureGeometry;

use crate::canvas::{Canvas, Color};
use crate::error::Result;
use crate::params::{EyeStyle, FigureParameters};
use kurbo::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

const HOOF_COLOR: Color = Color::rgb(30, 30, 30);
const NOSTRIL_COLOR: Color = Color::rgb(30, 30, 30);
const IRIS_COLOR: Color = Color::rgb(139, 69, 19);

/// Where a figure sits on the canvas and how large it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Center of the body ellipse.
    pub center: Point,
    pub size_factor: f64,
}

impl Placement {
    pub fn new(x: f64, y: f64, size_factor: f64) -> Self {
        Self {
            center: Point::new(x, y),
            size_factor,
        }
    }
}

/// Pixel width of a stroke, never thinner than `min`.
pub(crate) fn stroke_width(min: u32, value: f64) -> u32 {
    (value.max(0.0) as u32).max(min)
}

/// Draw one figure and return the parameters that were used.
pub fn draw<C: Canvas>(
    canvas: &mut C,
    placement: Placement,
    params: &FigureParameters,
    rng: &mut impl Rng,
) -> FigureParameters {
    let geometry = FigureGeometry::derive(params, placement);
    let size = placement.size_factor;
    debug!(
        x = placement.center.x,
        y = placement.center.y,
        size,
        mane = %params.mane_style,
        tail = %params.tail_style,
        "drawing figure"
    );

    canvas.ellipse(geometry.body, params.body_color);
    canvas.polygon(&geometry.neck.corners, params.body_color);

    canvas.ellipse(geometry.head.bounds, params.body_color);
    canvas.polygon(&geometry.nose.bridge, params.body_color);
    canvas.ellipse(geometry.nose.bounds, params.body_color);
    draw_eye(canvas, &geometry, params);

    for nostril in geometry.nostrils {
        canvas.ellipse(nostril, NOSTRIL_COLOR);
    }
    canvas.line(&geometry.mouth, NOSTRIL_COLOR, stroke_width(1, 2.0 * size));
    for ear in &geometry.ears {
        canvas.polygon(ear, params.body_color);
    }

    mane::draw(
        canvas,
        params.mane_style,
        &geometry,
        params.mane_strands(),
        params.mane_color,
        size,
        rng,
    );

    let leg_width = stroke_width(1, geometry.dims.leg_thickness);
    for leg in &geometry.legs {
        canvas.line(&[leg.attachment, leg.end], params.body_color, leg_width);
        canvas.ellipse(leg.hoof, HOOF_COLOR);
    }

    tail::draw(canvas, &geometry, params, size, rng);

    params.clone()
}

/// Resolve `overrides` against the defaults, then draw.
///
/// Coercion and style errors are reported before anything touches the canvas.
pub fn draw_with_overrides<C: Canvas>(
    canvas: &mut C,
    placement: Placement,
    overrides: &Map<String, Value>,
    rng: &mut impl Rng,
) -> Result<FigureParameters> {
    let params = FigureParameters::resolve(overrides)?;
    Ok(draw(canvas, placement, &params, rng))
}

fn draw_eye<C: Canvas>(canvas: &mut C, geometry: &FigureGeometry, params: &FigureParameters) {
    let eye = &geometry.eye;
    match params.eye_style {
        EyeStyle::Normal => {
            canvas.ellipse(eye.circle(1.0), params.eye_color);
        }
        EyeStyle::Cartoon => {
            canvas.ellipse(eye.circle(2.0), Color::WHITE);
            canvas.ellipse(eye.circle(1.0), params.eye_color);
        }
        EyeStyle::Realistic => {
            canvas.ellipse(eye.circle(2.0), Color::WHITE);
            canvas.ellipse(eye.circle(1.4), IRIS_COLOR);
            canvas.ellipse(eye.circle(0.6), params.eye_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RasterCanvas, RecordingCanvas};
    use crate::error::Error;
    use crate::params::{LegPose, ManeStyle, TailStyle, MAX_STRANDS};
    use kurbo::Rect;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn record(params: &FigureParameters, placement: Placement, seed: u64) -> Vec<DrawOp> {
        let mut canvas = RecordingCanvas::new();
        draw(&mut canvas, placement, params, &mut StdRng::seed_from_u64(seed));
        canvas.ops
    }

    fn count_ellipses(ops: &[DrawOp]) -> usize {
        ops.iter()
            .filter(|op| matches!(op, DrawOp::Ellipse { .. }))
            .count()
    }

    #[test]
    fn identical_inputs_give_identical_call_sequences() {
        let params = FigureParameters::random(&mut StdRng::seed_from_u64(11));
        let placement = Placement::new(400.0, 300.0, 0.8);
        let first = record(&params, placement, 99);
        let second = record(&params, placement, 99);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn body_is_the_first_primitive() {
        let params = FigureParameters {
            body_length: 1.2,
            body_height: 0.9,
            ..FigureParameters::default()
        };
        let ops = record(&params, Placement::new(400.0, 300.0, 0.5), 0);
        match &ops[0] {
            DrawOp::Ellipse { bounds, fill } => {
                assert_relative_eq!(bounds.width(), 200.0 * 1.2 * 0.5, epsilon = 1e-9);
                assert_relative_eq!(bounds.height(), 80.0 * 0.9 * 0.5, epsilon = 1e-9);
                assert_eq!(*fill, params.body_color);
            }
            other => panic!("unexpected op {other:?}"),
        }
        assert!(matches!(&ops[1], DrawOp::Polygon { points, .. } if points.len() == 4));
    }

    #[test]
    fn eye_styles_layer_circles() {
        let placement = Placement::new(400.0, 300.0, 1.0);
        let counts: Vec<usize> = EyeStyle::ALL
            .into_iter()
            .map(|eye_style| {
                let params = FigureParameters {
                    eye_style,
                    ..FigureParameters::default()
                };
                count_ellipses(&record(&params, placement, 0))
            })
            .collect();
        // body, head, nose, two nostrils and four hooves besides the eye
        assert_eq!(counts, vec![10, 11, 12]);
    }

    #[test]
    fn eye_circles_are_sized_from_the_eye() {
        let placement = Placement::new(400.0, 300.0, 1.0);
        let cases = [
            (EyeStyle::Normal, vec![(1.0, Color::BLACK)]),
            (EyeStyle::Cartoon, vec![(2.0, Color::WHITE), (1.0, Color::BLACK)]),
            (
                EyeStyle::Realistic,
                vec![(2.0, Color::WHITE), (1.4, IRIS_COLOR), (0.6, Color::BLACK)],
            ),
        ];
        for (eye_style, expected) in cases {
            let params = FigureParameters {
                eye_style,
                ..FigureParameters::default()
            };
            let eye = FigureGeometry::derive(&params, placement).eye;
            let ellipses: Vec<(Rect, Color)> = record(&params, placement, 0)
                .into_iter()
                .filter_map(|op| match op {
                    DrawOp::Ellipse { bounds, fill } => Some((bounds, fill)),
                    _ => None,
                })
                .collect();
            // body, head and nose come first
            let circles = &ellipses[3..3 + expected.len()];
            for ((bounds, fill), (scale, color)) in circles.iter().zip(&expected) {
                assert_relative_eq!(bounds.width(), eye.size * scale, epsilon = 1e-9);
                assert_relative_eq!(bounds.height(), eye.size * scale, epsilon = 1e-9);
                assert_relative_eq!(bounds.center().x, eye.center.x, epsilon = 1e-9);
                assert_relative_eq!(bounds.center().y, eye.center.y, epsilon = 1e-9);
                assert_eq!(fill, color);
            }
        }
    }

    #[test]
    fn absurd_density_is_drawn_with_bounded_strands() {
        let overrides = json!({ "mane_density": 1e30, "mane_style": "short" });
        let mut canvas = RecordingCanvas::new();
        draw_with_overrides(
            &mut canvas,
            Placement::new(200.0, 200.0, 1.0),
            overrides.as_object().unwrap(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        let mane = canvas
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Polygon { points, fill } if *fill == Color::rgb(51, 25, 0) => {
                    Some(points.len())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(mane, 2 * MAX_STRANDS);

        let params = FigureParameters {
            mane_density: f64::MAX,
            mane_style: ManeStyle::Braided,
            tail_thickness: 1e300,
            ..FigureParameters::default()
        };
        let ops = record(&params, Placement::new(200.0, 200.0, 1.0), 0);
        let tail_lines = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { color, .. } if *color == params.mane_color))
            .count();
        // one braid line plus the flowing tail strands
        assert_eq!(tail_lines, 1 + MAX_STRANDS);
    }

    #[test]
    fn mane_strand_count_follows_density() {
        let placement = Placement::new(400.0, 300.0, 1.0);
        for (density, expected) in [(0.7, 7), (1.0, 10)] {
            let params = FigureParameters {
                mane_density: density,
                mane_style: ManeStyle::Mohawk,
                tail_style: TailStyle::Short,
                ..FigureParameters::default()
            };
            let lines = record(&params, placement, 0)
                .iter()
                .filter(|op| matches!(op, DrawOp::Line { width: 3, .. }))
                .count();
            assert_eq!(lines, expected);
        }
    }

    #[test]
    fn draw_returns_the_parameters_used() {
        let params = FigureParameters {
            leg_pose: LegPose::Walking,
            neck_angle: 12.5,
            ..FigureParameters::default()
        };
        let mut canvas = RecordingCanvas::new();
        let used = draw(
            &mut canvas,
            Placement::new(0.0, 0.0, 1.0),
            &params,
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(used, params);
    }

    #[test]
    fn unsupported_style_fails_before_drawing() {
        let overrides = json!({ "mane_style": "spiky" });
        let mut canvas = RecordingCanvas::new();
        let result = draw_with_overrides(
            &mut canvas,
            Placement::new(0.0, 0.0, 1.0),
            overrides.as_object().unwrap(),
            &mut StdRng::seed_from_u64(0),
        );
        assert!(matches!(
            result,
            Err(Error::UnsupportedStyle { field: "mane_style", .. })
        ));
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn overrides_are_resolved_and_returned() {
        let overrides = json!({ "body_color": "#8B4513", "head_size": "1.2" });
        let mut canvas = RecordingCanvas::new();
        let used = draw_with_overrides(
            &mut canvas,
            Placement::new(200.0, 200.0, 1.0),
            overrides.as_object().unwrap(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert_eq!(used.body_color, Color::rgb(139, 69, 19));
        assert_relative_eq!(used.head_size, 1.2);
        assert!(!canvas.ops.is_empty());
    }

    #[test]
    fn degenerate_scales_render_without_panicking() {
        let params = FigureParameters {
            body_length: 0.0,
            body_height: -1.0,
            neck_thickness: 0.0,
            head_size: -2.0,
            leg_length: 0.0,
            leg_thickness: -1.0,
            tail_length: 0.0,
            tail_thickness: -0.5,
            mane_length: 0.0,
            ..FigureParameters::default()
        };
        for mane_style in ManeStyle::ALL {
            for tail_style in TailStyle::ALL {
                let params = FigureParameters {
                    mane_style,
                    tail_style,
                    ..params.clone()
                };
                let mut canvas = RasterCanvas::new(64, 64, Color::WHITE);
                draw(
                    &mut canvas,
                    Placement::new(32.0, 32.0, 1.0),
                    &params,
                    &mut StdRng::seed_from_u64(1),
                );
            }
        }
    }

    #[test]
    fn figure_paints_body_color_at_its_center() {
        let params = FigureParameters::default();
        let mut canvas = RasterCanvas::new(400, 300, Color::WHITE);
        draw(
            &mut canvas,
            Placement::new(200.0, 180.0, 1.0),
            &params,
            &mut StdRng::seed_from_u64(3),
        );
        assert_eq!(canvas.image().get_pixel(200, 180).0, [139, 69, 19]);
        assert_eq!(canvas.image().get_pixel(2, 2).0, [255, 255, 255]);
    }
}
