//! Figure parameters: the typed record, its defaults, override resolution
//! and random generation.
//!
//! A resolved [`FigureParameters`] is the authoritative record of what was
//! drawn. Overrides arriving from a form or the command line are merged onto
//! the defaults without touching the caller's map; text values are coerced
//! here, so the drawing engine only ever sees typed data.

use crate::canvas::Color;
use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Scale factor keys; positive reals, default 1.0.
pub const SCALE_KEYS: [&str; 11] = [
    "body_length",
    "body_height",
    "neck_length",
    "neck_thickness",
    "head_size",
    "leg_length",
    "leg_thickness",
    "tail_length",
    "tail_thickness",
    "mane_length",
    "mane_density",
];

/// Pose angle keys, in degrees.
pub const ANGLE_KEYS: [&str; 3] = ["head_angle", "neck_angle", "tail_angle"];

pub const COLOR_KEYS: [&str; 3] = ["body_color", "mane_color", "eye_color"];

pub const STYLE_KEYS: [&str; 4] = ["leg_pose", "mane_style", "tail_style", "eye_style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegPose {
    #[default]
    Standing,
    Walking,
    Running,
    Rearing,
}

impl LegPose {
    pub const ALL: [LegPose; 4] = [
        LegPose::Standing,
        LegPose::Walking,
        LegPose::Running,
        LegPose::Rearing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegPose::Standing => "standing",
            LegPose::Walking => "walking",
            LegPose::Running => "running",
            LegPose::Rearing => "rearing",
        }
    }
}

impl FromStr for LegPose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standing" => Ok(LegPose::Standing),
            "walking" => Ok(LegPose::Walking),
            "running" => Ok(LegPose::Running),
            "rearing" => Ok(LegPose::Rearing),
            other => Err(Error::UnsupportedStyle {
                field: "leg_pose",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManeStyle {
    /// Individual strands, longest mid-neck
    #[default]
    Flowing,
    /// Spikes merged into one closed shape
    Short,
    /// Upright strands without jitter
    Mohawk,
    /// Zigzag polyline along the neck
    Braided,
}

impl ManeStyle {
    pub const ALL: [ManeStyle; 4] = [
        ManeStyle::Flowing,
        ManeStyle::Short,
        ManeStyle::Mohawk,
        ManeStyle::Braided,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ManeStyle::Flowing => "flowing",
            ManeStyle::Short => "short",
            ManeStyle::Mohawk => "mohawk",
            ManeStyle::Braided => "braided",
        }
    }
}

impl FromStr for ManeStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flowing" => Ok(ManeStyle::Flowing),
            "short" => Ok(ManeStyle::Short),
            "mohawk" => Ok(ManeStyle::Mohawk),
            "braided" => Ok(ManeStyle::Braided),
            other => Err(Error::UnsupportedStyle {
                field: "mane_style",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailStyle {
    /// Fan of jittered strands
    #[default]
    Flowing,
    /// Single filled triangle
    Short,
    /// Ten-point zigzag polyline
    Braided,
}

impl TailStyle {
    pub const ALL: [TailStyle; 3] = [TailStyle::Flowing, TailStyle::Short, TailStyle::Braided];

    pub fn as_str(&self) -> &'static str {
        match self {
            TailStyle::Flowing => "flowing",
            TailStyle::Short => "short",
            TailStyle::Braided => "braided",
        }
    }
}

impl FromStr for TailStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flowing" => Ok(TailStyle::Flowing),
            "short" => Ok(TailStyle::Short),
            "braided" => Ok(TailStyle::Braided),
            other => Err(Error::UnsupportedStyle {
                field: "tail_style",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeStyle {
    #[default]
    Normal,
    Cartoon,
    Realistic,
}

impl EyeStyle {
    pub const ALL: [EyeStyle; 3] = [EyeStyle::Normal, EyeStyle::Cartoon, EyeStyle::Realistic];

    pub fn as_str(&self) -> &'static str {
        match self {
            EyeStyle::Normal => "normal",
            EyeStyle::Cartoon => "cartoon",
            EyeStyle::Realistic => "realistic",
        }
    }
}

impl FromStr for EyeStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(EyeStyle::Normal),
            "cartoon" => Ok(EyeStyle::Cartoon),
            "realistic" => Ok(EyeStyle::Realistic),
            other => Err(Error::UnsupportedStyle {
                field: "eye_style",
                value: other.to_string(),
            }),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(LegPose, ManeStyle, TailStyle, EyeStyle);

/// Every shape, pose and style parameter of one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureParameters {
    // Scale factors relative to the base dimensions
    pub body_length: f64,
    pub body_height: f64,
    pub neck_length: f64,
    pub neck_thickness: f64,
    pub head_size: f64,
    pub leg_length: f64,
    pub leg_thickness: f64,
    pub tail_length: f64,
    pub tail_thickness: f64,
    pub mane_length: f64,
    /// Strands per ten; 1.0 draws ten mane strands
    pub mane_density: f64,

    pub body_color: Color,
    pub mane_color: Color,
    pub eye_color: Color,

    /// Degrees, relative to the neck
    pub head_angle: f64,
    /// Degrees from vertical
    pub neck_angle: f64,
    /// Degrees below the horizontal, pointing away from the head
    pub tail_angle: f64,
    pub leg_pose: LegPose,

    pub mane_style: ManeStyle,
    pub tail_style: TailStyle,
    pub eye_style: EyeStyle,

    /// Unrecognized override keys. Kept for the caller, never persisted.
    #[serde(skip)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for FigureParameters {
    fn default() -> Self {
        Self {
            body_length: 1.0,
            body_height: 1.0,
            neck_length: 1.0,
            neck_thickness: 1.0,
            head_size: 1.0,
            leg_length: 1.0,
            leg_thickness: 1.0,
            tail_length: 1.0,
            tail_thickness: 1.0,
            mane_length: 1.0,
            mane_density: 1.0,
            body_color: Color::rgb(139, 69, 19),
            mane_color: Color::rgb(51, 25, 0),
            eye_color: Color::BLACK,
            head_angle: 0.0,
            neck_angle: 0.0,
            tail_angle: 45.0,
            leg_pose: LegPose::Standing,
            mane_style: ManeStyle::Flowing,
            tail_style: TailStyle::Flowing,
            eye_style: EyeStyle::Normal,
            extra: BTreeMap::new(),
        }
    }
}

impl FigureParameters {
    /// Merge `overrides` onto the defaults, coercing text values.
    ///
    /// Scale and angle keys accept numbers or numeric strings. Color keys
    /// accept `#RRGGBB`, `(r, g, b)` or a 3-element integer array. Style keys
    /// must name a supported variant. Unknown keys land in [`Self::extra`].
    pub fn resolve(overrides: &Map<String, Value>) -> Result<Self> {
        let mut params = Self::default();
        for (key, value) in overrides {
            match key.as_str() {
                "body_length" => params.body_length = coerce_number(key, value)?,
                "body_height" => params.body_height = coerce_number(key, value)?,
                "neck_length" => params.neck_length = coerce_number(key, value)?,
                "neck_thickness" => params.neck_thickness = coerce_number(key, value)?,
                "head_size" => params.head_size = coerce_number(key, value)?,
                "leg_length" => params.leg_length = coerce_number(key, value)?,
                "leg_thickness" => params.leg_thickness = coerce_number(key, value)?,
                "tail_length" => params.tail_length = coerce_number(key, value)?,
                "tail_thickness" => params.tail_thickness = coerce_number(key, value)?,
                "mane_length" => params.mane_length = coerce_number(key, value)?,
                "mane_density" => params.mane_density = coerce_number(key, value)?,
                "head_angle" => params.head_angle = coerce_number(key, value)?,
                "neck_angle" => params.neck_angle = coerce_number(key, value)?,
                "tail_angle" => params.tail_angle = coerce_number(key, value)?,
                "body_color" => params.body_color = coerce_color(key, value)?,
                "mane_color" => params.mane_color = coerce_color(key, value)?,
                "eye_color" => params.eye_color = coerce_color(key, value)?,
                "leg_pose" => params.leg_pose = coerce_style(value, "leg_pose")?,
                "mane_style" => params.mane_style = coerce_style(value, "mane_style")?,
                "tail_style" => params.tail_style = coerce_style(value, "tail_style")?,
                "eye_style" => params.eye_style = coerce_style(value, "eye_style")?,
                _ => {
                    params.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(params)
    }

    /// Draw a complete parameter set, biased toward brown and chestnut coats.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            body_length: rng.gen_range(0.8..=1.2),
            body_height: rng.gen_range(0.8..=1.2),
            neck_length: rng.gen_range(0.7..=1.3),
            neck_thickness: rng.gen_range(1.0..=1.5),
            head_size: rng.gen_range(0.8..=1.2),
            leg_length: rng.gen_range(0.8..=1.2),
            leg_thickness: rng.gen_range(0.8..=1.2),
            tail_length: rng.gen_range(0.7..=1.3),
            tail_thickness: rng.gen_range(0.8..=1.2),
            mane_length: rng.gen_range(0.7..=1.3),
            mane_density: rng.gen_range(0.7..=1.3),
            body_color: Color::rgb(
                rng.gen_range(100..=160),
                rng.gen_range(50..=90),
                rng.gen_range(10..=30),
            ),
            mane_color: Color::rgb(
                rng.gen_range(30..=70),
                rng.gen_range(15..=40),
                rng.gen_range(0..=15),
            ),
            eye_color: Color::BLACK,
            head_angle: rng.gen_range(-20.0..=20.0),
            neck_angle: rng.gen_range(-10.0..=30.0),
            tail_angle: rng.gen_range(30.0..=60.0),
            leg_pose: LegPose::ALL[rng.gen_range(0..LegPose::ALL.len())],
            mane_style: ManeStyle::ALL[rng.gen_range(0..ManeStyle::ALL.len())],
            tail_style: TailStyle::ALL[rng.gen_range(0..TailStyle::ALL.len())],
            eye_style: EyeStyle::ALL[rng.gen_range(0..EyeStyle::ALL.len())],
            extra: BTreeMap::new(),
        }
    }

    /// Number of mane strands: `floor(10 * mane_density)`, bounded to
    /// `0..=MAX_STRANDS`.
    pub fn mane_strands(&self) -> usize {
        strand_count(10.0 * self.mane_density)
    }

    /// Number of flowing tail strands: `floor(7 * tail_thickness)`, bounded
    /// to `0..=MAX_STRANDS`.
    pub fn tail_strands(&self) -> usize {
        strand_count(7.0 * self.tail_thickness)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Upper bound on mane and tail strands per figure.
pub const MAX_STRANDS: usize = 1000;

fn strand_count(raw: f64) -> usize {
    if raw.is_nan() {
        return 0;
    }
    raw.floor().clamp(0.0, MAX_STRANDS as f64) as usize
}

/// Parse a `key=value` override as typed on a command line.
///
/// The value is read as JSON when it parses as JSON (numbers, arrays) and
/// kept as text otherwise, so `body_color=#8B4513` and `head_size=1.2` both
/// work.
pub fn parse_override(text: &str) -> Result<(String, Value)> {
    let (key, raw) = text
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| Error::InvalidValue {
            key: text.to_string(),
            value: "expected key=value".to_string(),
        })?;
    let raw = raw.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}

fn coerce_number(key: &str, value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn coerce_color(key: &str, value: &Value) -> Result<Color> {
    let color = match value {
        Value::String(s) if s.trim_start().starts_with('#') => Color::from_hex(s),
        Value::String(s) => Color::from_tuple(s),
        Value::Array(items) => {
            let channels = items
                .iter()
                .map(|item| item.as_u64().and_then(|c| u8::try_from(c).ok()))
                .collect::<Option<Vec<u8>>>();
            match channels.as_deref() {
                Some([r, g, b]) => Some(Color::rgb(*r, *g, *b)),
                _ => None,
            }
        }
        _ => None,
    };
    color.ok_or_else(|| Error::InvalidColor {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn coerce_style<T>(value: &Value, field: &'static str) -> Result<T>
where
    T: FromStr<Err = Error>,
{
    match value {
        Value::String(s) => s.parse(),
        other => Err(Error::UnsupportedStyle {
            field,
            value: other.to_string(),
        }),
    }
}
