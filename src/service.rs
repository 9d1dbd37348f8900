//! Request handling for front ends.
//!
//! A [`Studio`] answers the four requests a front end makes: a random
//! figure, a customized figure, a herd, and a previously saved file. Each
//! request is handled in isolation with its own canvas and its own seeded
//! rng, so requests can be served from any number of threads.

use crate::canvas::encode_png;
use crate::config::HonseConfig;
use crate::error::Result;
use crate::params::FigureParameters;
use crate::scene::{render_portrait, HerdGenerator, PlacedFigure};
use crate::store::FigureStore;
use base64::{engine::general_purpose, Engine as _};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    /// A figure with random parameters
    Random,
    /// A figure from parameter overrides; values may be text
    Customize {
        #[serde(default)]
        params: Map<String, Value>,
    },
    /// A herd scene
    Herd {
        #[serde(default)]
        num_honses: Option<i64>,
    },
    /// A saved file, by name
    Download { filename: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    Figure {
        /// `data:image/png;base64,...`
        image: String,
        honse_id: u32,
        seed: u64,
        params: FigureParameters,
    },
    Herd {
        image: String,
        herd_id: u32,
        seed: u64,
        figures: Vec<PlacedFigure>,
    },
    File {
        filename: String,
        content_type: String,
        /// Base64 file contents
        data: String,
    },
}

/// Embed PNG bytes as a data URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png)
    )
}

pub struct Studio {
    config: HonseConfig,
    store: FigureStore,
}

impl Studio {
    pub fn new(config: HonseConfig) -> Self {
        let store = FigureStore::new(&config.output.directory)
            .with_save_params(config.output.save_params);
        Self { config, store }
    }

    pub fn store(&self) -> &FigureStore {
        &self.store
    }

    /// Handle a request with a fresh random seed.
    pub fn handle(&self, request: Request) -> Result<Response> {
        self.handle_seeded(request, rand::random())
    }

    /// Handle a request with a known seed. The same request and seed always
    /// produce the same image and id.
    pub fn handle_seeded(&self, request: Request, seed: u64) -> Result<Response> {
        let mut rng = StdRng::seed_from_u64(seed);
        match request {
            Request::Random => {
                let params = FigureParameters::random(&mut rng);
                self.figure(params, seed, &mut rng)
            }
            Request::Customize { params } => {
                let params = FigureParameters::resolve(&params)?;
                self.figure(params, seed, &mut rng)
            }
            Request::Herd { num_honses } => {
                let requested = num_honses.unwrap_or(self.config.herd.default_count as i64);
                let count = self
                    .config
                    .herd
                    .clamp_count(usize::try_from(requested.max(0)).unwrap_or(usize::MAX));
                self.herd(count, seed, &mut rng)
            }
            Request::Download { filename } => {
                let bytes = self.store.read_image(&filename)?;
                Ok(Response::File {
                    content_type: content_type(&filename).to_string(),
                    data: general_purpose::STANDARD.encode(bytes),
                    filename,
                })
            }
        }
    }

    fn figure(&self, params: FigureParameters, seed: u64, rng: &mut StdRng) -> Result<Response> {
        let figure = &self.config.figure;
        let canvas = render_portrait(figure.width, figure.height, &params, seed);
        let honse_id = FigureStore::new_id(rng);
        let image = canvas.image();
        self.store.save_figure(honse_id, image, &params)?;
        info!(honse_id, seed, "generated figure");
        Ok(Response::Figure {
            image: data_uri(image)?,
            honse_id,
            seed,
            params,
        })
    }

    fn herd(&self, count: usize, seed: u64, rng: &mut StdRng) -> Result<Response> {
        let herd = &self.config.herd;
        let scene = HerdGenerator::new(herd.width, herd.height)
            .with_hills(herd.hills)
            .with_grass_blades(herd.grass_blades)
            .render(count, rng);
        let herd_id = FigureStore::new_id(rng);
        self.store.save_herd(herd_id, &scene.image, &scene.figures)?;
        info!(herd_id, seed, count, "generated herd");
        Ok(Response::Herd {
            image: data_uri(&scene.image)?,
            herd_id,
            seed,
            figures: scene.figures,
        })
    }
}

fn data_uri(image: &RgbImage) -> Result<String> {
    Ok(png_data_uri(&encode_png(image)?))
}

fn content_type(filename: &str) -> &'static str {
    if filename.ends_with(".png") {
        "image/png"
    } else if filename.ends_with(".json") {
        "application/json"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Color;
    use crate::error::Error;
    use serde_json::json;
    use tempfile::TempDir;

    fn studio(tmp: &TempDir) -> Studio {
        let mut config = HonseConfig::default();
        config.output.directory = tmp.path().to_string_lossy().into_owned();
        config.figure.width = 400;
        config.figure.height = 300;
        config.herd.width = 160;
        config.herd.height = 120;
        config.herd.grass_blades = 10;
        Studio::new(config)
    }

    fn request(value: serde_json::Value) -> Request {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn requests_parse_from_json() {
        assert_eq!(request(json!({ "kind": "random" })), Request::Random);
        assert_eq!(
            request(json!({ "kind": "herd" })),
            Request::Herd { num_honses: None }
        );
        assert_eq!(
            request(json!({ "kind": "download", "filename": "honse_10000.png" })),
            Request::Download {
                filename: "honse_10000.png".into()
            }
        );
    }

    #[test]
    fn random_figure_is_saved_and_embedded() {
        let tmp = TempDir::new().unwrap();
        let studio = studio(&tmp);
        let response = studio.handle_seeded(Request::Random, 42).unwrap();
        let Response::Figure {
            image,
            honse_id,
            seed,
            params,
        } = response
        else {
            panic!("expected a figure");
        };
        assert!(image.starts_with("data:image/png;base64,"));
        assert_eq!(seed, 42);
        assert!((10000..=99999).contains(&honse_id));
        assert_eq!(studio.store().load_params(honse_id).unwrap(), params);
        assert!(studio.store().figure_image_path(honse_id).is_file());
    }

    #[test]
    fn same_seed_same_figure() {
        let tmp = TempDir::new().unwrap();
        let studio = studio(&tmp);
        let first = studio.handle_seeded(Request::Random, 7).unwrap();
        let second = studio.handle_seeded(Request::Random, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn customized_text_values_are_coerced() {
        let tmp = TempDir::new().unwrap();
        let studio = studio(&tmp);
        let request = request(json!({
            "kind": "customize",
            "params": { "body_color": "#8B4513", "mane_color": "(10, 20, 30)", "leg_length": "1.3" }
        }));
        let Response::Figure { params, .. } = studio.handle_seeded(request, 1).unwrap() else {
            panic!("expected a figure");
        };
        assert_eq!(params.body_color, Color::rgb(139, 69, 19));
        assert_eq!(params.mane_color, Color::rgb(10, 20, 30));
        assert_eq!(params.leg_length, 1.3);
    }

    #[test]
    fn customize_errors_reach_the_caller() {
        let tmp = TempDir::new().unwrap();
        let studio = studio(&tmp);
        let bad_color = request(json!({ "kind": "customize", "params": { "eye_color": "#ZZZ" } }));
        assert!(matches!(
            studio.handle_seeded(bad_color, 0),
            Err(Error::InvalidColor { .. })
        ));
        let bad_style = request(json!({ "kind": "customize", "params": { "tail_style": "bushy" } }));
        assert!(matches!(
            studio.handle_seeded(bad_style, 0),
            Err(Error::UnsupportedStyle { .. })
        ));
    }

    #[test]
    fn herd_size_is_bounded() {
        let tmp = TempDir::new().unwrap();
        let studio = studio(&tmp);
        for (requested, expected) in [(Some(-3), 1), (Some(0), 1), (Some(25), 10), (None, 5)] {
            let response = studio
                .handle_seeded(Request::Herd { num_honses: requested }, 3)
                .unwrap();
            let Response::Herd { figures, herd_id, .. } = response else {
                panic!("expected a herd");
            };
            assert_eq!(figures.len(), expected);
            assert!(studio.store().herd_image_path(herd_id).is_file());
        }
    }

    #[test]
    fn download_serves_saved_files_only() {
        let tmp = TempDir::new().unwrap();
        let studio = studio(&tmp);
        let Response::Figure { honse_id, .. } = studio.handle_seeded(Request::Random, 9).unwrap()
        else {
            panic!("expected a figure");
        };
        let filename = format!("honse_{honse_id}.png");
        let Response::File {
            content_type, data, ..
        } = studio
            .handle_seeded(Request::Download { filename }, 0)
            .unwrap()
        else {
            panic!("expected a file");
        };
        assert_eq!(content_type, "image/png");
        let bytes = general_purpose::STANDARD.decode(data).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");

        let escape = Request::Download {
            filename: "../honse.toml".into(),
        };
        assert!(matches!(
            studio.handle_seeded(escape, 0),
            Err(Error::InvalidImageName(_))
        ));
    }
}
