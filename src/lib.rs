//! Honse - Parametric horse drawings, herd scenes and curated stroke art.
//!
//! A honse is drawn from a typed parameter record by a deterministic engine:
//! identical parameters, placement and rng seed always produce the same
//! sequence of primitive calls. Herds compose many random honses into a
//! painted landscape. A separate stroke-art pipeline paints random pen and
//! brush marks and keeps the ones a reviewer likes.

pub mod canvas;
pub mod config;
pub mod error;
pub mod figure;
pub mod params;
pub mod scene;
pub mod service;
pub mod store;
pub mod strokes;

pub use canvas::{Canvas, Color, RasterCanvas, RecordingCanvas};
pub use config::HonseConfig;
pub use error::{Error, Result};
pub use figure::{draw, draw_with_overrides, Placement};
pub use params::FigureParameters;
pub use scene::{HerdGenerator, PlacedFigure, Scene};
pub use service::{Request, Response, Studio};
pub use store::FigureStore;
pub use strokes::{MarkSpec, Painting, StrokeGenerator};
