//! Stroke sentences.
//!
//! A sentence is a space separated list of commands, each a path letter
//! glued to its first magnitude followed by a second magnitude:
//! `"L120.5 33.2 C4.75 310"`. Magnitudes are coordinates relative to the
//! stroke's start point.

use crate::error::{Error, Result};
use kurbo::{BezPath, Point, Vec2};
use rand::Rng;
use std::fmt;

/// The nine path letters a sentence is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathLetter {
    /// Move without drawing
    M,
    /// Straight line
    L,
    /// Horizontal line
    H,
    /// Vertical line
    V,
    /// Cubic curve
    C,
    /// Cubic continuing the previous one smoothly
    S,
    /// Quadratic curve
    Q,
    /// Quadratic continuing the previous one smoothly
    T,
    /// Close the current subpath
    Z,
}

impl PathLetter {
    pub const ALL: [PathLetter; 9] = [
        PathLetter::M,
        PathLetter::L,
        PathLetter::H,
        PathLetter::V,
        PathLetter::C,
        PathLetter::S,
        PathLetter::Q,
        PathLetter::T,
        PathLetter::Z,
    ];

    pub fn as_char(self) -> char {
        match self {
            PathLetter::M => 'M',
            PathLetter::L => 'L',
            PathLetter::H => 'H',
            PathLetter::V => 'V',
            PathLetter::C => 'C',
            PathLetter::S => 'S',
            PathLetter::Q => 'Q',
            PathLetter::T => 'T',
            PathLetter::Z => 'Z',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|letter| letter.as_char() == c)
    }
}

/// One command of a sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathCommand {
    pub letter: PathLetter,
    pub size: f64,
    pub movement: f64,
}

impl PathCommand {
    /// The command's target, relative to the stroke start.
    fn target(&self) -> Vec2 {
        Vec2::new(self.size, self.movement)
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.letter.as_char(), self.size, self.movement)
    }
}

/// Join commands into sentence text.
pub fn sentence(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(PathCommand::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `length` random commands with magnitudes in `[0, max_size)`.
pub fn random_commands(length: usize, max_size: f64, rng: &mut impl Rng) -> Vec<PathCommand> {
    (0..length)
        .map(|_| {
            let letter = PathLetter::ALL[rng.gen_range(0..PathLetter::ALL.len())];
            PathCommand {
                letter,
                size: rng.gen::<f64>() * max_size,
                movement: rng.gen::<f64>() * max_size,
            }
        })
        .collect()
}

/// Parse sentence text back into commands.
pub fn parse(text: &str) -> Result<Vec<PathCommand>> {
    let malformed = |detail: String| Error::MalformedPainting(format!("stroke sentence: {detail}"));
    let mut tokens = text.split_whitespace();
    let mut commands = Vec::new();
    while let Some(head) = tokens.next() {
        let mut chars = head.chars();
        let letter = chars
            .next()
            .and_then(PathLetter::from_char)
            .ok_or_else(|| malformed(format!("unknown command `{head}`")))?;
        let number = |text: &str| {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| malformed(format!("bad magnitude `{text}`")))
        };
        let size = number(chars.as_str())?;
        let movement = number(
            tokens
                .next()
                .ok_or_else(|| malformed(format!("`{head}` is missing its second magnitude")))?,
        )?;
        commands.push(PathCommand {
            letter,
            size,
            movement,
        });
    }
    Ok(commands)
}

/// Interpret commands as a path anchored at `start`.
///
/// Curves take their control points from the current point and the target:
/// `C` bends through `(current.x, target.y)` and `(target.x, current.y)`, `Q`
/// through `(target.x, current.y)`. `S` and `T` reflect the previous curve's
/// last control point, or start from the current point when there is none.
pub fn to_bez_path(commands: &[PathCommand], start: Point) -> BezPath {
    let mut pen = Pen::new(start);
    for command in commands {
        pen.apply(command, start);
    }
    pen.path
}

#[derive(Clone, Copy)]
enum LastControl {
    None,
    Cubic(Point),
    Quad(Point),
}

struct Pen {
    path: BezPath,
    current: Point,
    subpath_start: Point,
    needs_move: bool,
    last: LastControl,
}

impl Pen {
    fn new(start: Point) -> Self {
        Self {
            path: BezPath::new(),
            current: start,
            subpath_start: start,
            needs_move: true,
            last: LastControl::None,
        }
    }

    fn begin(&mut self) {
        if self.needs_move {
            self.path.move_to(self.current);
            self.subpath_start = self.current;
            self.needs_move = false;
        }
    }

    fn reflect(&self, control: Point) -> Point {
        self.current + (self.current - control)
    }

    fn apply(&mut self, command: &PathCommand, origin: Point) {
        let target = origin + command.target();
        let current = self.current;
        let mut last = LastControl::None;
        match command.letter {
            PathLetter::M => {
                self.current = target;
                self.subpath_start = target;
                self.needs_move = true;
            }
            PathLetter::L => {
                self.begin();
                self.path.line_to(target);
            }
            PathLetter::H => {
                self.begin();
                self.path.line_to(Point::new(target.x, current.y));
            }
            PathLetter::V => {
                self.begin();
                self.path.line_to(Point::new(current.x, target.y));
            }
            PathLetter::C => {
                self.begin();
                let c2 = Point::new(target.x, current.y);
                self.path
                    .curve_to(Point::new(current.x, target.y), c2, target);
                last = LastControl::Cubic(c2);
            }
            PathLetter::S => {
                self.begin();
                let c1 = match self.last {
                    LastControl::Cubic(control) => self.reflect(control),
                    _ => current,
                };
                let c2 = Point::new(target.x, current.y);
                self.path.curve_to(c1, c2, target);
                last = LastControl::Cubic(c2);
            }
            PathLetter::Q => {
                self.begin();
                let control = Point::new(target.x, current.y);
                self.path.quad_to(control, target);
                last = LastControl::Quad(control);
            }
            PathLetter::T => {
                self.begin();
                let control = match self.last {
                    LastControl::Quad(control) => self.reflect(control),
                    _ => current,
                };
                self.path.quad_to(control, target);
                last = LastControl::Quad(control);
            }
            PathLetter::Z => {
                if !self.needs_move {
                    self.path.close_path();
                }
                self.needs_move = true;
                self.current = self.subpath_start;
                self.last = LastControl::None;
                return;
            }
        }
        if command.letter != PathLetter::M {
            self.current = target_point(command.letter, current, target);
        }
        self.last = last;
    }
}

/// Where the pen ends up after a drawing command.
fn target_point(letter: PathLetter, current: Point, target: Point) -> Point {
    match letter {
        PathLetter::H => Point::new(target.x, current.y),
        PathLetter::V => Point::new(current.x, target.y),
        _ => target,
    }
}
