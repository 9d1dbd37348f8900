//! Stroke-art paintings.
//!
//! A painting is a list of strokes. Each stroke is a start point, a stroke
//! sentence describing its shape and a mark maker: a pen that outlines the
//! shape or a brush that fills it. The three are kept as parallel lists so a
//! saved painting can be replayed stroke for stroke.

pub mod corpus;
pub mod path;
pub mod render;

pub use corpus::{colour_swatch, PaintingStore, Verdict};
pub use render::{paint_stroke, render_painting};

use crate::canvas::Color;
use crate::error::{Error, Result};
use kurbo::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a stroke is put on the canvas.
///
/// Persisted as a `[color, width_or_opacity, opacity_or_null]` triple; a
/// populated third slot means a pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MarkTriple", into = "MarkTriple")]
pub enum MarkSpec {
    /// Outlines the stroke path
    Pen { color: Color, width: u32, opacity: u8 },
    /// Fills the stroke path
    Brush { color: Color, opacity: u8 },
}

type MarkTriple = (Color, u32, Option<u32>);

impl MarkSpec {
    pub fn color(&self) -> Color {
        match *self {
            MarkSpec::Pen { color, .. } | MarkSpec::Brush { color, .. } => color,
        }
    }

    pub fn opacity(&self) -> u8 {
        match *self {
            MarkSpec::Pen { opacity, .. } | MarkSpec::Brush { opacity, .. } => opacity,
        }
    }

    pub fn is_pen(&self) -> bool {
        matches!(self, MarkSpec::Pen { .. })
    }
}

impl From<MarkSpec> for MarkTriple {
    fn from(spec: MarkSpec) -> Self {
        match spec {
            MarkSpec::Pen {
                color,
                width,
                opacity,
            } => (color, width, Some(opacity as u32)),
            MarkSpec::Brush { color, opacity } => (color, opacity as u32, None),
        }
    }
}

impl TryFrom<MarkTriple> for MarkSpec {
    type Error = String;

    fn try_from((color, second, third): MarkTriple) -> std::result::Result<Self, Self::Error> {
        let opacity = |value: u32| {
            u8::try_from(value).map_err(|_| format!("opacity {value} is out of range"))
        };
        Ok(match third {
            Some(value) => MarkSpec::Pen {
                color,
                width: second,
                opacity: opacity(value)?,
            },
            None => MarkSpec::Brush {
                color,
                opacity: opacity(second)?,
            },
        })
    }
}

/// One stroke of a painting.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeRecord {
    pub start_point: Point,
    pub mark: String,
    pub mark_spec: MarkSpec,
}

/// The full reconstruction record of a painting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Painting {
    pub start_points: Vec<Point>,
    pub marks: Vec<String>,
    pub mark_specs: Vec<MarkSpec>,
}

impl Painting {
    pub fn from_strokes(strokes: impl IntoIterator<Item = StrokeRecord>) -> Self {
        let mut painting = Self::default();
        for stroke in strokes {
            painting.start_points.push(stroke.start_point);
            painting.marks.push(stroke.mark);
            painting.mark_specs.push(stroke.mark_spec);
        }
        painting
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Check that the three sequences line up.
    pub fn validate(&self) -> Result<()> {
        let (points, marks, specs) = (
            self.start_points.len(),
            self.marks.len(),
            self.mark_specs.len(),
        );
        if points != marks || marks != specs {
            return Err(Error::MalformedPainting(format!(
                "{points} start points, {marks} marks and {specs} mark specs"
            )));
        }
        Ok(())
    }

    /// Strokes in painting order.
    pub fn strokes(&self) -> impl Iterator<Item = StrokeRecord> + '_ {
        self.start_points
            .iter()
            .zip(&self.marks)
            .zip(&self.mark_specs)
            .map(|((start_point, mark), mark_spec)| StrokeRecord {
                start_point: *start_point,
                mark: mark.clone(),
                mark_spec: *mark_spec,
            })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let painting: Painting = serde_json::from_str(text)?;
        painting.validate()?;
        Ok(painting)
    }
}

/// Random stroke paintings.
pub struct StrokeGenerator {
    pub marks: usize,
    /// Probability of choosing a brush over a pen.
    pub pen_bias: f64,
    pub min_opacity: u8,
    pub max_stroke_size: f64,
    pub max_start_point: f64,
    pub max_pen_width: u32,
}

impl Default for StrokeGenerator {
    fn default() -> Self {
        Self {
            marks: 100,
            pen_bias: 0.4,
            min_opacity: 150,
            max_stroke_size: 500.0,
            max_start_point: 400.0,
            max_pen_width: 10,
        }
    }
}

impl StrokeGenerator {
    pub fn new(marks: usize) -> Self {
        Self {
            marks,
            ..Self::default()
        }
    }

    pub fn with_pen_bias(mut self, pen_bias: f64) -> Self {
        self.pen_bias = pen_bias;
        self
    }

    pub fn with_min_opacity(mut self, min_opacity: u8) -> Self {
        self.min_opacity = min_opacity;
        self
    }

    pub fn with_max_stroke_size(mut self, max_stroke_size: f64) -> Self {
        self.max_stroke_size = max_stroke_size;
        self
    }

    pub fn with_max_start_point(mut self, max_start_point: f64) -> Self {
        self.max_start_point = max_start_point;
        self
    }

    pub fn with_max_pen_width(mut self, max_pen_width: u32) -> Self {
        self.max_pen_width = max_pen_width;
        self
    }

    /// A painting of [`Self::marks`] strokes. Shapes are drawn first, then
    /// the mark makers.
    pub fn generate(&self, rng: &mut impl Rng) -> Painting {
        let shapes: Vec<(Point, String)> = (0..self.marks).map(|_| self.shape(rng)).collect();
        let specs: Vec<MarkSpec> = (0..self.marks).map(|_| self.mark_spec(rng)).collect();
        Painting::from_strokes(shapes.into_iter().zip(specs).map(
            |((start_point, mark), mark_spec)| StrokeRecord {
                start_point,
                mark,
                mark_spec,
            },
        ))
    }

    /// `count` independent strokes.
    pub fn generate_strokes(&self, count: usize, rng: &mut impl Rng) -> Vec<StrokeRecord> {
        (0..count)
            .map(|_| {
                let (start_point, mark) = self.shape(rng);
                StrokeRecord {
                    start_point,
                    mark,
                    mark_spec: self.mark_spec(rng),
                }
            })
            .collect()
    }

    fn shape(&self, rng: &mut impl Rng) -> (Point, String) {
        let length = (rng.gen::<f64>() * self.max_stroke_size) as usize;
        let start = Point::new(
            rng.gen::<f64>() * self.max_start_point,
            rng.gen::<f64>() * self.max_start_point,
        );
        let commands = path::random_commands(length, self.max_stroke_size, rng);
        (start, path::sentence(&commands))
    }

    fn mark_spec(&self, rng: &mut impl Rng) -> MarkSpec {
        let use_pen = rng.gen::<f64>() > self.pen_bias;
        let mut channel = || (rng.gen::<f64>() * 255.0) as u8;
        let color = Color::rgb(channel(), channel(), channel());
        let headroom = (255 - self.min_opacity) as f64;
        let opacity = self.min_opacity + (rng.gen::<f64>() * headroom) as u8;
        let width = (rng.gen::<f64>() * self.max_pen_width as f64) as u32;
        if use_pen {
            MarkSpec::Pen {
                color,
                width,
                opacity,
            }
        } else {
            MarkSpec::Brush { color, opacity }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn mark_specs_persist_as_triples() {
        let pen = MarkSpec::Pen {
            color: Color::rgb(1, 2, 3),
            width: 4,
            opacity: 200,
        };
        let brush = MarkSpec::Brush {
            color: Color::rgb(9, 8, 7),
            opacity: 180,
        };
        assert_eq!(serde_json::to_value(pen).unwrap(), json!([[1, 2, 3], 4, 200]));
        assert_eq!(serde_json::to_value(brush).unwrap(), json!([[9, 8, 7], 180, null]));
    }

    #[test]
    fn third_slot_decides_pen_or_brush() {
        let pen: MarkSpec = serde_json::from_value(json!([[0, 0, 0], 0, 150])).unwrap();
        assert!(pen.is_pen());
        let brush: MarkSpec = serde_json::from_value(json!([[0, 0, 0], 150, null])).unwrap();
        assert_eq!(
            brush,
            MarkSpec::Brush {
                color: Color::BLACK,
                opacity: 150
            }
        );
        assert!(serde_json::from_value::<MarkSpec>(json!([[0, 0, 0], 300, null])).is_err());
    }

    #[test]
    fn generated_painting_has_parallel_sequences() {
        let painting = StrokeGenerator::new(12)
            .with_max_stroke_size(20.0)
            .generate(&mut StdRng::seed_from_u64(5));
        assert_eq!(painting.len(), 12);
        painting.validate().unwrap();
        for stroke in painting.strokes() {
            assert!((0.0..400.0).contains(&stroke.start_point.x));
            assert!((0.0..400.0).contains(&stroke.start_point.y));
            let commands = path::parse(&stroke.mark).unwrap();
            assert!(commands.len() < 20);
            assert!(stroke.mark_spec.opacity() >= 150);
            if let MarkSpec::Pen { width, .. } = stroke.mark_spec {
                assert!(width < 10);
            }
        }
    }

    #[test]
    fn pen_bias_controls_the_mix() {
        let mut rng = StdRng::seed_from_u64(1);
        let all_pens = StrokeGenerator::new(0).with_pen_bias(-1.0);
        let all_brushes = StrokeGenerator::new(0).with_pen_bias(1.0);
        assert!(all_pens
            .generate_strokes(20, &mut rng)
            .iter()
            .all(|s| s.mark_spec.is_pen()));
        assert!(all_brushes
            .generate_strokes(20, &mut rng)
            .iter()
            .all(|s| !s.mark_spec.is_pen()));
    }

    #[test]
    fn uneven_paintings_are_rejected() {
        let mut painting = StrokeGenerator::new(3)
            .with_max_stroke_size(5.0)
            .generate(&mut StdRng::seed_from_u64(0));
        painting.marks.pop();
        assert!(matches!(painting.validate(), Err(Error::MalformedPainting(_))));
        let text = serde_json::to_string(&painting).unwrap();
        assert!(Painting::from_json(&text).is_err());
    }

    #[test]
    fn painting_json_round_trip() {
        let painting = StrokeGenerator::new(4)
            .with_max_stroke_size(30.0)
            .generate(&mut StdRng::seed_from_u64(77));
        let restored = Painting::from_json(&painting.to_json().unwrap()).unwrap();
        assert_eq!(restored, painting);
    }
}
