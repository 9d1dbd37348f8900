//! Herd scenes: a painted landscape with several independently generated
//! figures standing in it.
//!
//! Layers are drawn strictly back to front: sky gradient, hills, ground band,
//! grass, then figures. Smaller figures are placed higher up so they read as
//! further away.

use crate::canvas::{Canvas, Color, RasterCanvas};
use crate::figure::{self, Placement};
use crate::params::FigureParameters;
use image::RgbImage;
use kurbo::{Point, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SKY_TOP: Color = Color::rgb(135, 206, 235);
const SKY_BOTTOM: Color = Color::rgb(100, 150, 200);
const GROUND: Color = Color::rgb(34, 139, 34);

/// Fraction of the image height where the ground starts.
const HORIZON: f64 = 0.7;

/// A figure as placed in a scene.
///
/// `seed` drives the strand jitter, so `params`, `placement` and `seed`
/// together reproduce the figure exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFigure {
    pub placement: Placement,
    pub seed: u64,
    pub params: FigureParameters,
}

impl PlacedFigure {
    /// Draw this figure again with its recorded jitter.
    pub fn redraw<C: Canvas>(&self, canvas: &mut C) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        figure::draw(canvas, self.placement, &self.params, &mut rng);
    }
}

/// A rendered herd and the figures in it.
pub struct Scene {
    pub image: RgbImage,
    pub figures: Vec<PlacedFigure>,
}

pub struct HerdGenerator {
    pub width: u32,
    pub height: u32,
    pub hills: usize,
    pub grass_blades: usize,
}

impl Default for HerdGenerator {
    fn default() -> Self {
        Self::new(1200, 800)
    }
}

impl HerdGenerator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            hills: 3,
            grass_blades: 100,
        }
    }

    pub fn with_hills(mut self, hills: usize) -> Self {
        self.hills = hills;
        self
    }

    pub fn with_grass_blades(mut self, grass_blades: usize) -> Self {
        self.grass_blades = grass_blades;
        self
    }

    /// Render a herd of `count` figures to a fresh image.
    pub fn render(&self, count: usize, rng: &mut impl Rng) -> Scene {
        let mut canvas = RasterCanvas::new(self.width, self.height, SKY_TOP);
        let figures = self.compose(&mut canvas, count, rng);
        Scene {
            image: canvas.into_image(),
            figures,
        }
    }

    /// Draw the landscape and `count` random figures onto `canvas`.
    pub fn compose<C: Canvas>(
        &self,
        canvas: &mut C,
        count: usize,
        rng: &mut impl Rng,
    ) -> Vec<PlacedFigure> {
        self.draw_sky(canvas);
        for _ in 0..self.hills {
            self.draw_hill(canvas, rng);
        }
        self.draw_ground(canvas);
        for _ in 0..self.grass_blades {
            self.draw_grass_blade(canvas, rng);
        }

        let (width, height) = (self.width as f64, self.height as f64);
        let figures: Vec<PlacedFigure> = (0..count)
            .map(|_| {
                let size: f64 = rng.gen_range(0.3..1.0);
                let y = height * (HORIZON - 0.1 * (1.0 - size));
                let x = width * rng.gen_range(0.1_f64..0.9);
                let placed = PlacedFigure {
                    placement: Placement::new(x, y, size),
                    params: FigureParameters::random(rng),
                    seed: rng.gen(),
                };
                placed.redraw(canvas);
                placed
            })
            .collect();

        debug!(
            width = self.width,
            height = self.height,
            figures = figures.len(),
            "composed herd"
        );
        figures
    }

    fn draw_sky<C: Canvas>(&self, canvas: &mut C) {
        let (width, height) = (self.width as f64, self.height as f64);
        for row in 0..self.height {
            let t = row as f64 / height;
            let y = row as f64;
            canvas.line(
                &[Point::new(0.0, y), Point::new(width, y)],
                SKY_TOP.lerp(SKY_BOTTOM, t),
                1,
            );
        }
    }

    /// A parabolic hill sampled once per pixel column, closed along the
    /// bottom edge.
    fn draw_hill<C: Canvas>(&self, canvas: &mut C, rng: &mut impl Rng) {
        let (width, height) = (self.width as f64, self.height as f64);
        let hill_height = rng.gen_range(0.2..0.4);
        let hill_width = rng.gen_range(0.5..1.5);
        let hill_x = rng.gen_range(-0.3..0.7) * width;
        let color = Color::rgb(
            rng.gen_range(30..=100),
            rng.gen_range(100..=160),
            rng.gen_range(30..=80),
        );

        let mut outline: Vec<Point> = (0..self.width)
            .filter_map(|column| {
                let x = column as f64;
                let dx = (x - hill_x) / (width * hill_width);
                let y = height * (HORIZON - hill_height * (1.0 - dx * dx));
                (y < height).then_some(Point::new(x, y))
            })
            .collect();
        if outline.is_empty() {
            return;
        }
        outline.push(Point::new(width, height));
        outline.push(Point::new(0.0, height));
        canvas.polygon(&outline, color);
    }

    fn draw_ground<C: Canvas>(&self, canvas: &mut C) {
        let (width, height) = (self.width as f64, self.height as f64);
        canvas.rectangle(Rect::new(0.0, height * HORIZON, width, height), GROUND);
    }

    fn draw_grass_blade<C: Canvas>(&self, canvas: &mut C, rng: &mut impl Rng) {
        let horizon = (self.height as f64 * HORIZON) as u32;
        let x = rng.gen_range(0..=self.width) as f64;
        let y = rng.gen_range(horizon..=self.height.max(horizon)) as f64;
        let length = rng.gen_range(5..=15) as f64;
        let color = Color::rgb(
            rng.gen_range(30..=100),
            rng.gen_range(120..=180),
            rng.gen_range(30..=80),
        );
        canvas.line(&[Point::new(x, y), Point::new(x, y - length)], color, 2);
    }
}

/// Paint the plain sky and ground used behind a lone figure and return where
/// that figure stands.
pub fn single_figure_backdrop<C: Canvas>(canvas: &mut C, width: u32, height: u32) -> Placement {
    let (width, height) = (width as f64, height as f64);
    canvas.rectangle(Rect::new(0.0, 0.0, width, height), SKY_TOP);
    canvas.rectangle(Rect::new(0.0, height * HORIZON, width, height), GROUND);
    Placement::new(width / 2.0, height * HORIZON, 1.0)
}

/// Render one figure on the plain backdrop, jittered from `seed`.
pub fn render_portrait(
    width: u32,
    height: u32,
    params: &FigureParameters,
    seed: u64,
) -> RasterCanvas {
    let mut canvas = RasterCanvas::new(width, height, SKY_TOP);
    let placement = single_figure_backdrop(&mut canvas, width, height);
    figure::draw(
        &mut canvas,
        placement,
        params,
        &mut StdRng::seed_from_u64(seed),
    );
    canvas
}
