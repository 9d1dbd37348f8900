//! Curated paintings on disk.
//!
//! Each verdict has its own directory. A painting is saved as
//! `art_<timestamp>.png` with an `art_<timestamp>.json` reconstruction record
//! next to it.

use super::Painting;
use crate::canvas::Color;
use crate::error::Result;
use chrono::{Local, NaiveDateTime};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A reviewer's judgement on a painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Like,
    Dislike,
}

impl Verdict {
    pub const ALL: [Verdict; 2] = [Verdict::Like, Verdict::Dislike];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Verdict::Like => "like",
            Verdict::Dislike => "dislike",
        }
    }
}

pub struct PaintingStore {
    root: PathBuf,
}

impl PaintingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, verdict: Verdict) -> PathBuf {
        self.root.join(verdict.dir_name())
    }

    /// Save under the current local time. Returns the image path.
    pub fn save(&self, verdict: Verdict, painting: &Painting, image: &RgbImage) -> Result<PathBuf> {
        self.save_at(verdict, painting, image, Local::now().naive_local())
    }

    /// Save with an explicit timestamp. A painting saved in the same second
    /// as another replaces it.
    pub fn save_at(
        &self,
        verdict: Verdict,
        painting: &Painting,
        image: &RgbImage,
        at: NaiveDateTime,
    ) -> Result<PathBuf> {
        painting.validate()?;
        let dir = self.dir(verdict);
        fs::create_dir_all(&dir)?;

        let stem = at.format("art_%Y_%m_%d_%H_%M_%S").to_string();
        let image_path = dir.join(format!("{stem}.png"));
        image.save_with_format(&image_path, image::ImageFormat::Png)?;
        fs::write(dir.join(format!("{stem}.json")), painting.to_json()?)?;

        info!(path = %image_path.display(), verdict = verdict.dir_name(), "saved painting");
        Ok(image_path)
    }

    /// Every painting saved under `verdict`, oldest first. A verdict that has
    /// never been used has no paintings.
    pub fn load(&self, verdict: Verdict) -> Result<Vec<Painting>> {
        let dir = self.dir(verdict);
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "no paintings saved yet");
            return Ok(Vec::new());
        }

        let mut records: Vec<PathBuf> = fs::read_dir(&dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        records.retain(|path| path.extension().is_some_and(|ext| ext == "json"));
        records.sort();

        records
            .iter()
            .map(|path| Painting::from_json(&fs::read_to_string(path)?))
            .collect()
    }
}

/// A square image whose pixels are the colors of every mark, in order.
///
/// The side is the largest square the colors fill; leftovers are dropped.
/// Returns `None` when there are no marks at all.
pub fn colour_swatch(paintings: &[Painting]) -> Option<RgbImage> {
    let colors: Vec<Color> = paintings
        .iter()
        .flat_map(|painting| painting.mark_specs.iter().map(|spec| spec.color()))
        .collect();
    let side = (colors.len() as f64).sqrt() as u32;
    if side == 0 {
        return None;
    }
    Some(RgbImage::from_fn(side, side, |x, y| {
        colors[(y * side + x) as usize].into()
    }))
}
