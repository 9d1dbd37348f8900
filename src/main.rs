//! Honse CLI - Draw parametric honses, herds, and curated stroke paintings.

use anyhow::{bail, Context, Result};
use clap::Parser;
use honse::config::HonseConfig;
use honse::params::{self, FigureParameters};
use honse::scene::{render_portrait, HerdGenerator};
use honse::service::{Request, Studio};
use honse::store::FigureStore;
use honse::strokes::{
    colour_swatch, render_painting, Painting, PaintingStore, StrokeGenerator, Verdict,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "honse")]
#[command(about = "Draw parametric honses, herds and stroke paintings")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "honse.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Draw a single honse
    Figure {
        /// Parameter override, e.g. `mane_style=mohawk` (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// JSON file of parameter overrides
        #[arg(long)]
        params: Option<PathBuf>,

        /// Seed for random parameters and strand jitter
        #[arg(short = 'S', long)]
        seed: Option<u64>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Draw a herd in a landscape
    Herd {
        /// Number of honses
        #[arg(short, long)]
        count: Option<usize>,

        /// Seed for the whole scene
        #[arg(short = 'S', long)]
        seed: Option<u64>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate stroke paintings and sort them into liked and disliked
    Paint {
        /// Seed for the first painting
        #[arg(short = 'S', long)]
        seed: Option<u64>,
    },

    /// Re-render a saved painting record
    Replay {
        /// Painting record (.json)
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Summarize curated paintings and build colour swatches
    Analyse,

    /// Answer one JSON request, from a file or stdin
    Request {
        /// Request file; stdin when omitted
        file: Option<PathBuf>,

        /// Seed for the request
        #[arg(short = 'S', long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("honse=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = HonseConfig::load(Path::new(&cli.config))?;

    match cli.command {
        Commands::Figure {
            set,
            params: params_file,
            seed,
            output,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            let mut rng = StdRng::seed_from_u64(seed);

            let figure_params = if set.is_empty() && params_file.is_none() {
                FigureParameters::random(&mut rng)
            } else {
                let mut overrides = match &params_file {
                    Some(path) => read_overrides(path)?,
                    None => Map::new(),
                };
                for assignment in &set {
                    let (key, value) = params::parse_override(assignment)?;
                    overrides.insert(key, value);
                }
                FigureParameters::resolve(&overrides)?
            };

            println!(
                "Drawing honse with seed {} ({} mane, {} tail, {} legs)...",
                seed, figure_params.mane_style, figure_params.tail_style, figure_params.leg_pose
            );
            let canvas = render_portrait(
                config.figure.width,
                config.figure.height,
                &figure_params,
                seed,
            );

            match output {
                Some(path) => {
                    create_parent(&path)?;
                    canvas.save(&path)?;
                    println!("Saved to {}", path.display());
                    if config.output.save_params {
                        let params_path = path.with_extension("json");
                        fs::write(&params_path, figure_params.to_json()?)?;
                        println!("Saved parameters to {}", params_path.display());
                    }
                }
                None => {
                    let store = FigureStore::new(&config.output.directory)
                        .with_save_params(config.output.save_params);
                    let id = FigureStore::new_id(&mut rng);
                    let saved = store.save_figure(id, canvas.image(), &figure_params)?;
                    println!("Saved to {}", saved.image.display());
                    if let Some(sidecar) = saved.sidecar {
                        println!("Saved parameters to {}", sidecar.display());
                    }
                }
            }
        }

        Commands::Herd {
            count,
            seed,
            output,
        } => {
            let count = config
                .herd
                .clamp_count(count.unwrap_or(config.herd.default_count));
            let seed = seed.unwrap_or_else(rand::random);
            let mut rng = StdRng::seed_from_u64(seed);

            println!("Drawing a herd of {} with seed {}...", count, seed);
            let scene = HerdGenerator::new(config.herd.width, config.herd.height)
                .with_hills(config.herd.hills)
                .with_grass_blades(config.herd.grass_blades)
                .render(count, &mut rng);

            for (i, figure) in scene.figures.iter().enumerate() {
                println!(
                    "  #{} at ({:.0}, {:.0}) size {:.2}, {} mane",
                    i + 1,
                    figure.placement.center.x,
                    figure.placement.center.y,
                    figure.placement.size_factor,
                    figure.params.mane_style
                );
            }

            match output {
                Some(path) => {
                    create_parent(&path)?;
                    scene.image.save_with_format(&path, image::ImageFormat::Png)?;
                    println!("Saved to {}", path.display());
                    if config.output.save_params {
                        let params_path = path.with_extension("json");
                        fs::write(&params_path, serde_json::to_string_pretty(&scene.figures)?)?;
                        println!("Saved parameters to {}", params_path.display());
                    }
                }
                None => {
                    let store = FigureStore::new(&config.output.directory)
                        .with_save_params(config.output.save_params);
                    let id = FigureStore::new_id(&mut rng);
                    let saved = store.save_herd(id, &scene.image, &scene.figures)?;
                    println!("Saved to {}", saved.image.display());
                }
            }
        }

        Commands::Paint { seed } => {
            let paintings = &config.paintings;
            let generator = StrokeGenerator::new(paintings.marks)
                .with_pen_bias(paintings.pen_bias)
                .with_min_opacity(paintings.min_opacity)
                .with_max_stroke_size(paintings.max_stroke_size)
                .with_max_start_point(paintings.max_start_point)
                .with_max_pen_width(paintings.max_pen_width);
            let store = PaintingStore::new(&paintings.directory);
            fs::create_dir_all(store.root())?;
            let preview = store.root().join("preview.png");

            let mut seed = seed.unwrap_or_else(rand::random);
            loop {
                let painting = generator.generate(&mut StdRng::seed_from_u64(seed));
                let canvas = render_painting(&painting, paintings.width, paintings.height)?;
                canvas.save(&preview)?;
                println!(
                    "Painting {} strokes with seed {}, preview at {}",
                    painting.len(),
                    seed,
                    preview.display()
                );

                let options = ["Like", "Dislike", "Quit"];
                let choice = dialoguer::Select::new()
                    .with_prompt("Do you like it?")
                    .items(&options)
                    .default(0)
                    .interact()?;
                let verdict = match choice {
                    0 => Verdict::Like,
                    1 => Verdict::Dislike,
                    _ => break,
                };

                let saved = store.save(verdict, &painting, canvas.image())?;
                println!("Saved to {}", saved.display());
                seed = StdRng::seed_from_u64(seed).gen();
            }
        }

        Commands::Replay { file, output } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let painting = Painting::from_json(&text)?;
            let canvas =
                render_painting(&painting, config.paintings.width, config.paintings.height)?;
            create_parent(&output)?;
            canvas.save(&output)?;
            println!(
                "Replayed {} strokes from {} to {}",
                painting.len(),
                file.display(),
                output.display()
            );
        }

        Commands::Analyse => {
            let store = PaintingStore::new(&config.paintings.directory);
            let liked = store.load(Verdict::Like)?;
            let disliked = store.load(Verdict::Dislike)?;
            println!(
                "Loaded {} liked and {} disliked paintings",
                liked.len(),
                disliked.len()
            );

            for (verdict, paintings) in [(Verdict::Like, &liked), (Verdict::Dislike, &disliked)] {
                let pens = paintings
                    .iter()
                    .flat_map(|p| &p.mark_specs)
                    .filter(|spec| spec.is_pen())
                    .count();
                let marks: usize = paintings.iter().map(Painting::len).sum();
                println!("  {}: {} marks, {} pens", verdict.dir_name(), marks, pens);

                match colour_swatch(paintings) {
                    Some(swatch) => {
                        let path = store.root().join(format!("{}d.png", verdict.dir_name()));
                        swatch.save_with_format(&path, image::ImageFormat::Png)?;
                        println!(
                            "  Saved {}x{} swatch to {}",
                            swatch.width(),
                            swatch.height(),
                            path.display()
                        );
                    }
                    None => println!("  No colours to show"),
                }
            }
        }

        Commands::Request { file, seed } => {
            let text = match &file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            let request: Request = serde_json::from_str(&text).context("parsing request")?;
            let studio = Studio::new(config);
            let response = match seed {
                Some(seed) => studio.handle_seeded(request, seed)?,
                None => studio.handle(request)?,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn read_overrides(path: &Path) -> Result<Map<String, Value>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match serde_json::from_str(&text)? {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must hold a JSON object of parameters", path.display()),
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
