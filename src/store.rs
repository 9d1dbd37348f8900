//! Saved figures and herds.
//!
//! Every output gets a random five digit id shared by its image and its
//! JSON sidecar: `honse_{id}.png` / `honse_{id}.json` for single figures,
//! `herd_{id}.png` / `herd_{id}.json` for herds.

use crate::error::{Error, Result};
use crate::params::FigureParameters;
use crate::scene::PlacedFigure;
use image::RgbImage;
use rand::Rng;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ID_RANGE: RangeInclusive<u32> = 10000..=99999;

/// Paths written for one saved output.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub id: u32,
    pub image: PathBuf,
    pub sidecar: Option<PathBuf>,
}

pub struct FigureStore {
    root: PathBuf,
    save_params: bool,
}

impl FigureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            save_params: true,
        }
    }

    /// Skip writing JSON sidecars.
    pub fn with_save_params(mut self, save_params: bool) -> Self {
        self.save_params = save_params;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn new_id(rng: &mut impl Rng) -> u32 {
        rng.gen_range(ID_RANGE)
    }

    pub fn figure_image_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("honse_{id}.png"))
    }

    pub fn figure_params_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("honse_{id}.json"))
    }

    pub fn herd_image_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("herd_{id}.png"))
    }

    pub fn herd_params_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("herd_{id}.json"))
    }

    /// Write a single figure and its parameter record.
    pub fn save_figure(
        &self,
        id: u32,
        image: &RgbImage,
        params: &FigureParameters,
    ) -> Result<Saved> {
        fs::create_dir_all(&self.root)?;
        let image_path = self.figure_image_path(id);
        image.save_with_format(&image_path, image::ImageFormat::Png)?;
        let sidecar = if self.save_params {
            let path = self.figure_params_path(id);
            fs::write(&path, params.to_json()?)?;
            Some(path)
        } else {
            None
        };
        info!(id, path = %image_path.display(), "saved figure");
        Ok(Saved {
            id,
            image: image_path,
            sidecar,
        })
    }

    /// Write a herd and the records of every figure in it.
    pub fn save_herd(&self, id: u32, image: &RgbImage, figures: &[PlacedFigure]) -> Result<Saved> {
        fs::create_dir_all(&self.root)?;
        let image_path = self.herd_image_path(id);
        image.save_with_format(&image_path, image::ImageFormat::Png)?;
        let sidecar = if self.save_params {
            let path = self.herd_params_path(id);
            fs::write(&path, serde_json::to_string_pretty(figures)?)?;
            Some(path)
        } else {
            None
        };
        info!(id, figures = figures.len(), path = %image_path.display(), "saved herd");
        Ok(Saved {
            id,
            image: image_path,
            sidecar,
        })
    }

    pub fn load_params(&self, id: u32) -> Result<FigureParameters> {
        let path = self.figure_params_path(id);
        if !path.is_file() {
            return Err(Error::NotFound(path));
        }
        FigureParameters::from_json(&fs::read_to_string(&path)?)
    }

    pub fn load_herd(&self, id: u32) -> Result<Vec<PlacedFigure>> {
        let path = self.herd_params_path(id);
        if !path.is_file() {
            return Err(Error::NotFound(path));
        }
        Ok(serde_json::from_str(&fs::read_to_string(&path)?)?)
    }

    /// Raw bytes of a saved file, by bare file name.
    pub fn read_image(&self, name: &str) -> Result<Vec<u8>> {
        let is_bare = !name.is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && !name.contains("..");
        if !is_bare {
            return Err(Error::InvalidImageName(name.to_string()));
        }
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(Error::NotFound(path));
        }
        Ok(fs::read(path)?)
    }
}
