//! Geometry derived from a parameter set and a placement.
//!
//! Every position the drawing pass needs is computed here, in dependency
//! order: body box, neck, head, facial features, mane base line, legs and
//! tail anchor. Nothing in this module is random.

use super::Placement;
use crate::params::{FigureParameters, LegPose};
use kurbo::{Point, Rect, Vec2};
use std::f64::consts::PI;

const BODY_LENGTH: f64 = 200.0;
const BODY_HEIGHT: f64 = 80.0;
const NECK_LENGTH: f64 = 100.0;
const NECK_THICKNESS: f64 = 40.0;
const HEAD_SIZE: f64 = 60.0;
const LEG_LENGTH: f64 = 120.0;
const LEG_THICKNESS: f64 = 15.0;

/// Leg attachment points, as fractions of the body length.
const LEG_ATTACHMENTS: [f64; 4] = [0.2, 0.3, 0.7, 0.8];

/// Base dimensions after applying scale factors and the size factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub body_length: f64,
    pub body_height: f64,
    pub neck_length: f64,
    pub neck_thickness: f64,
    pub head_size: f64,
    pub leg_length: f64,
    pub leg_thickness: f64,
}

impl Dimensions {
    pub fn new(params: &FigureParameters, size_factor: f64) -> Self {
        Self {
            body_length: BODY_LENGTH * params.body_length * size_factor,
            body_height: BODY_HEIGHT * params.body_height * size_factor,
            neck_length: NECK_LENGTH * params.neck_length * size_factor,
            neck_thickness: NECK_THICKNESS * params.neck_thickness * size_factor,
            head_size: HEAD_SIZE * params.head_size * size_factor,
            leg_length: LEG_LENGTH * params.leg_length * size_factor,
            leg_thickness: LEG_THICKNESS * params.leg_thickness * size_factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neck {
    pub start: Point,
    pub end: Point,
    /// Radians from vertical.
    pub angle: f64,
    /// Direction at right angles to the neck, out of its back edge.
    /// Mane strands grow this way and the neck is widened along it.
    pub perpendicular: f64,
    /// Quadrilateral: two base corners, then two (narrower) far corners.
    pub corners: [Point; 4],
}

impl Neck {
    /// Point at fraction `t` of the way from the base to the head.
    pub fn point_at(&self, t: f64) -> Point {
        self.start.lerp(self.end, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Head {
    pub center: Point,
    pub bounds: Rect,
    /// Neck angle plus head angle, radians.
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nose {
    pub tip: Point,
    pub width: f64,
    /// Polygon joining the head to the muzzle.
    pub bridge: [Point; 4],
    /// Muzzle ellipse around the tip.
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eye {
    pub center: Point,
    pub size: f64,
}

impl Eye {
    /// Square bounds of a circle `scale` eye-sizes across.
    pub fn circle(&self, scale: f64) -> Rect {
        Rect::from_center_size(self.center, (self.size * scale, self.size * scale))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub attachment: Point,
    /// Degrees from vertical; positive swings toward the head.
    pub angle: f64,
    pub end: Point,
    pub hoof: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailAnchor {
    pub start: Point,
    pub length: f64,
    /// Radians below the horizontal, pointing away from the head.
    pub angle: f64,
}

impl TailAnchor {
    /// Unit direction of a tail strand at `angle` radians.
    pub fn direction(angle: f64) -> Vec2 {
        Vec2::new(-angle.cos(), angle.sin())
    }

    /// Unit vector perpendicular to the tail axis.
    pub fn across(&self) -> Vec2 {
        Vec2::new(self.angle.sin(), self.angle.cos())
    }

    /// Point at fraction `t` of the nominal tail length.
    pub fn point_at(&self, t: f64) -> Point {
        self.start + Self::direction(self.angle) * (self.length * t)
    }
}

/// All derived positions of one figure.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureGeometry {
    pub dims: Dimensions,
    pub body: Rect,
    pub neck: Neck,
    pub head: Head,
    pub nose: Nose,
    pub eye: Eye,
    pub nostrils: [Rect; 2],
    pub mouth: [Point; 2],
    pub ears: [[Point; 3]; 2],
    /// Nominal strand length before per-style tapering.
    pub mane_length: f64,
    pub legs: [Leg; 4],
    pub tail: TailAnchor,
}

/// Pose angles, in degrees, for the four legs front to back.
pub fn leg_angles(pose: LegPose) -> [f64; 4] {
    match pose {
        LegPose::Standing => [0.0, 0.0, 0.0, 0.0],
        LegPose::Walking => [15.0, -15.0, -15.0, 15.0],
        LegPose::Running => [30.0, 30.0, -30.0, -30.0],
        LegPose::Rearing => [-60.0, -60.0, 0.0, 0.0],
    }
}

/// How far the front attachments rise, as a fraction of body height.
pub fn front_lift(pose: LegPose) -> f64 {
    match pose {
        LegPose::Rearing => 0.3,
        _ => 0.0,
    }
}

/// Unit vector `angle` radians clockwise from straight up (screen space).
fn from_vertical(angle: f64) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}

impl FigureGeometry {
    pub fn derive(params: &FigureParameters, placement: Placement) -> Self {
        let dims = Dimensions::new(params, placement.size_factor);
        let Point { x: cx, y: cy } = placement.center;

        let body = Rect::new(
            cx - dims.body_length / 2.0,
            cy - dims.body_height / 2.0,
            cx + dims.body_length / 2.0,
            cy + dims.body_height / 2.0,
        );

        // Neck, anchored on the upper front of the body
        let neck_angle = params.neck_angle.to_radians();
        let neck_start = Point::new(
            body.x0 + dims.body_length * 0.8,
            body.y0 + dims.body_height * 0.3,
        );
        let neck_end = neck_start + from_vertical(neck_angle) * dims.neck_length;
        let perpendicular = neck_angle + PI;
        let across = Vec2::from_angle(perpendicular);
        let half_width = dims.neck_thickness * 0.8;
        let neck = Neck {
            start: neck_start,
            end: neck_end,
            angle: neck_angle,
            perpendicular,
            corners: [
                neck_start + across * half_width,
                neck_start - across * half_width,
                neck_end - across * (half_width * 0.9),
                neck_end + across * (half_width * 0.9),
            ],
        };

        // Head sits just past the neck end
        let head_angle = neck_angle + params.head_angle.to_radians();
        let head_size = dims.head_size;
        let head_center = neck_end + from_vertical(head_angle) * (head_size * 0.3);
        let head = Head {
            center: head_center,
            bounds: Rect::from_center_size(head_center, (head_size, head_size * 0.7)),
            angle: head_angle,
        };

        let nose_length = head_size * 0.9;
        let nose_width = head_size * 0.4;
        let tip = head_center + Vec2::from_angle(head_angle) * nose_length;
        let nose = Nose {
            tip,
            width: nose_width,
            bridge: [
                Point::new(head_center.x + head_size / 4.0, head_center.y),
                Point::new(head_center.x - head_size / 4.0, head_center.y),
                Point::new(tip.x - nose_width / 3.0, tip.y),
                Point::new(tip.x + nose_width / 3.0, tip.y),
            ],
            bounds: Rect::new(
                tip.x - nose_width / 2.0,
                tip.y - nose_width / 3.0,
                tip.x + nose_width / 2.0,
                tip.y + nose_width / 3.0,
            ),
        };

        let eye = Eye {
            center: Point::new(
                head_center.x + head_size * 0.15,
                head_center.y - head_size * 0.15,
            ),
            size: head_size * 0.15,
        };

        // Nostrils sit one nostril-width either side of the tip
        let nostril_size = head_size * 0.08;
        let nostrils = [-nostril_size, nostril_size].map(|dx| {
            Rect::from_center_size(
                Point::new(tip.x + dx, tip.y),
                (nostril_size, nostril_size),
            )
        });

        let mouth_half = nose_width * 0.3;
        let mouth_y = tip.y + nose_width / 4.0;
        let mouth = [
            Point::new(tip.x - mouth_half, mouth_y),
            Point::new(tip.x + mouth_half, mouth_y),
        ];

        let ear_size = head_size * 0.25;
        let ears = [-0.2, 0.2].map(|side| {
            let base = Point::new(
                head_center.x + head_size * side,
                head_center.y - head_size * 0.3,
            );
            [
                base,
                Point::new(base.x - ear_size, base.y - ear_size * 1.5),
                Point::new(base.x + ear_size, base.y - ear_size * 1.5),
            ]
        });

        let mane_length = dims.neck_length * params.mane_length * 0.5;

        let angles = leg_angles(params.leg_pose);
        let lift = front_lift(params.leg_pose) * dims.body_height;
        let hoof_size = dims.leg_thickness * 0.8;
        let legs = std::array::from_fn(|i| {
            let raise = if i < 2 { lift } else { 0.0 };
            let attachment = Point::new(
                body.x0 + dims.body_length * LEG_ATTACHMENTS[i],
                body.y1 - raise,
            );
            let angle = angles[i];
            let swing = angle.to_radians();
            let end = attachment + Vec2::new(swing.sin(), swing.cos()) * dims.leg_length;
            Leg {
                attachment,
                angle,
                end,
                hoof: Rect::from_center_size(end, (hoof_size * 2.0, hoof_size)),
            }
        });

        let tail = TailAnchor {
            start: Point::new(
                body.x0 + dims.body_length * 0.1,
                body.y0 + dims.body_height * 0.4,
            ),
            length: dims.body_length * 0.6 * params.tail_length,
            angle: params.tail_angle.to_radians(),
        };

        Self {
            dims,
            body,
            neck,
            head,
            nose,
            eye,
            nostrils,
            mouth,
            ears,
            mane_length,
            legs,
            tail,
        }
    }
}
