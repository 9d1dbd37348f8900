//! Mane styles. Each style is its own algorithm; they share only the strand
//! base positions spread evenly along the neck.

use super::geometry::{FigureGeometry, Neck};
use super::stroke_width;
use crate::canvas::{Canvas, Color};
use crate::params::ManeStyle;
use kurbo::{Point, Vec2};
use rand::Rng;
use std::f64::consts::{FRAC_PI_2, PI};

/// Evenly spaced `(t, point)` pairs along the neck, `t` running 0 to 1.
///
/// A single strand sits at the neck midpoint.
pub fn strand_bases(neck: &Neck, count: usize) -> impl Iterator<Item = (f64, Point)> + '_ {
    (0..count).map(move |i| {
        let t = if count > 1 {
            i as f64 / (count - 1) as f64
        } else {
            0.5
        };
        (t, neck.point_at(t))
    })
}

pub fn draw<C: Canvas>(
    canvas: &mut C,
    style: ManeStyle,
    geometry: &FigureGeometry,
    strands: usize,
    color: Color,
    size_factor: f64,
    rng: &mut impl Rng,
) {
    match style {
        ManeStyle::Flowing => flowing(canvas, geometry, strands, color, size_factor, rng),
        ManeStyle::Short => short(canvas, geometry, strands, color, rng),
        ManeStyle::Mohawk => mohawk(canvas, geometry, strands, color, size_factor),
        ManeStyle::Braided => braided(canvas, geometry, strands, color, size_factor),
    }
}

fn flowing<C: Canvas>(
    canvas: &mut C,
    geometry: &FigureGeometry,
    strands: usize,
    color: Color,
    size_factor: f64,
    rng: &mut impl Rng,
) {
    let width = stroke_width(1, 2.0 * size_factor);
    for (t, base) in strand_bases(&geometry.neck, strands) {
        // Longest in the middle of the neck
        let length = geometry.mane_length * (1.0 - 0.5 * (2.0 * t - 1.0).abs());
        let jitter: f64 = rng.gen_range(-20.0..=20.0);
        let angle = geometry.neck.perpendicular + jitter.to_radians();
        let end = base + Vec2::from_angle(angle) * length;
        canvas.line(&[base, end], color, width);
    }
}

fn short<C: Canvas>(
    canvas: &mut C,
    geometry: &FigureGeometry,
    strands: usize,
    color: Color,
    rng: &mut impl Rng,
) {
    let length = geometry.mane_length * 0.3;
    let mut outline = Vec::with_capacity(strands.saturating_mul(2));
    for (_, base) in strand_bases(&geometry.neck, strands) {
        let jitter: f64 = rng.gen_range(-10.0..=10.0);
        let angle = geometry.neck.perpendicular + jitter.to_radians();
        outline.push(base);
        outline.push(base + Vec2::from_angle(angle) * length);
    }
    if !outline.is_empty() {
        canvas.polygon(&outline, color);
    }
}

fn mohawk<C: Canvas>(
    canvas: &mut C,
    geometry: &FigureGeometry,
    strands: usize,
    color: Color,
    size_factor: f64,
) {
    let width = stroke_width(2, 3.0 * size_factor);
    let upright = Vec2::from_angle(geometry.neck.angle - FRAC_PI_2);
    for (t, base) in strand_bases(&geometry.neck, strands) {
        let length = geometry.mane_length * (0.7 + 0.3 * (t * PI).sin());
        canvas.line(&[base, base + upright * length], color, width);
    }
}

fn braided<C: Canvas>(
    canvas: &mut C,
    geometry: &FigureGeometry,
    strands: usize,
    color: Color,
    size_factor: f64,
) {
    let zigzag = geometry.mane_length * 0.2;
    let across = Vec2::from_angle(geometry.neck.perpendicular);
    let points: Vec<Point> = strand_bases(&geometry.neck, strands.saturating_mul(2))
        .enumerate()
        .map(|(i, (_, base))| {
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            base + across * (zigzag * side)
        })
        .collect();
    if !points.is_empty() {
        canvas.line(&points, color, stroke_width(3, 5.0 * size_factor));
    }
}
