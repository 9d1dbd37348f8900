//! Configuration loading for Honse.
//!
//! Configuration is loaded from TOML files with environment variable overrides.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HonseConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub figure: FigureConfig,

    #[serde(default)]
    pub herd: HerdConfig,

    #[serde(default)]
    pub paintings: PaintingsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: String,

    #[serde(default = "default_save_params")]
    pub save_params: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            save_params: default_save_params(),
        }
    }
}

fn default_directory() -> String {
    "static/images".to_string()
}

fn default_save_params() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct FigureConfig {
    #[serde(default = "default_figure_width")]
    pub width: u32,

    #[serde(default = "default_figure_height")]
    pub height: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: default_figure_width(),
            height: default_figure_height(),
        }
    }
}

fn default_figure_width() -> u32 {
    800
}

fn default_figure_height() -> u32 {
    600
}

#[derive(Debug, Clone, Deserialize)]
pub struct HerdConfig {
    #[serde(default = "default_herd_width")]
    pub width: u32,

    #[serde(default = "default_herd_height")]
    pub height: u32,

    #[serde(default = "default_herd_count")]
    pub default_count: usize,

    #[serde(default = "default_max_count")]
    pub max_count: usize,

    #[serde(default = "default_hills")]
    pub hills: usize,

    #[serde(default = "default_grass_blades")]
    pub grass_blades: usize,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            width: default_herd_width(),
            height: default_herd_height(),
            default_count: default_herd_count(),
            max_count: default_max_count(),
            hills: default_hills(),
            grass_blades: default_grass_blades(),
        }
    }
}

impl HerdConfig {
    /// Bound a requested herd size to `1..=max_count`.
    pub fn clamp_count(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_count.max(1))
    }
}

fn default_herd_width() -> u32 {
    1200
}

fn default_herd_height() -> u32 {
    800
}

fn default_herd_count() -> usize {
    5
}

fn default_max_count() -> usize {
    10
}

fn default_hills() -> usize {
    3
}

fn default_grass_blades() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaintingsConfig {
    #[serde(default = "default_paintings_directory")]
    pub directory: String,

    #[serde(default = "default_figure_width")]
    pub width: u32,

    #[serde(default = "default_figure_height")]
    pub height: u32,

    #[serde(default = "default_marks")]
    pub marks: usize,

    #[serde(default = "default_pen_bias")]
    pub pen_bias: f64,

    #[serde(default = "default_min_opacity")]
    pub min_opacity: u8,

    #[serde(default = "default_max_stroke_size")]
    pub max_stroke_size: f64,

    #[serde(default = "default_max_start_point")]
    pub max_start_point: f64,

    #[serde(default = "default_max_pen_width")]
    pub max_pen_width: u32,
}

impl Default for PaintingsConfig {
    fn default() -> Self {
        Self {
            directory: default_paintings_directory(),
            width: default_figure_width(),
            height: default_figure_height(),
            marks: default_marks(),
            pen_bias: default_pen_bias(),
            min_opacity: default_min_opacity(),
            max_stroke_size: default_max_stroke_size(),
            max_start_point: default_max_start_point(),
            max_pen_width: default_max_pen_width(),
        }
    }
}

fn default_paintings_directory() -> String {
    "data".to_string()
}

fn default_marks() -> usize {
    100
}

fn default_pen_bias() -> f64 {
    0.4
}

fn default_min_opacity() -> u8 {
    150
}

fn default_max_stroke_size() -> f64 {
    500.0
}

fn default_max_start_point() -> f64 {
    400.0
}

fn default_max_pen_width() -> u32 {
    10
}

impl HonseConfig {
    /// Defaults, then `config.default.toml`, then `path`, then `HONSE_*`
    /// environment variables. Nested keys use a double underscore, as in
    /// `HONSE_HERD__MAX_COUNT`.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("HONSE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let honse_config: HonseConfig = config.try_deserialize()?;
        Ok(honse_config)
    }
}
