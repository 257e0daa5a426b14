//! kiln - render one of the demo scenes to a PPM or PNG file.
//!
//! Usage: kiln <scene> [--output PATH] [--config settings.json] [--seed N]
//!             [--sequential] [--assets DIR]
//!        kiln --list

mod scenes;
mod settings;

use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use kiln_renderer::{render, render_parallel, write_ppm, Camera, ImageBuffer, DEFAULT_BUCKET_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;

use settings::RenderSettings;

const USAGE: &str = "Usage: kiln <scene> [--output PATH] [--config settings.json] [--seed N] \
                     [--sequential] [--assets DIR]\n       kiln --list";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Args {
    scene: Option<String>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    sequential: bool,
    assets: Option<PathBuf>,
    list: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .with_context(|| format!("{} needs a value\n{}", flag, USAGE))
            };
            match arg.as_str() {
                "--output" | "-o" => parsed.output = Some(PathBuf::from(value(&arg)?)),
                "--config" | "-c" => parsed.config = Some(PathBuf::from(value(&arg)?)),
                "--assets" => parsed.assets = Some(PathBuf::from(value(&arg)?)),
                "--seed" => {
                    let raw = value(&arg)?;
                    let seed = raw
                        .parse()
                        .with_context(|| format!("Invalid seed '{}'", raw))?;
                    parsed.seed = Some(seed);
                }
                "--sequential" => parsed.sequential = true,
                "--list" => parsed.list = true,
                flag if flag.starts_with('-') => bail!("Unknown option '{}'\n{}", flag, USAGE),
                _ if parsed.scene.is_none() => parsed.scene = Some(arg),
                _ => bail!("Unexpected argument '{}'\n{}", arg, USAGE),
            }
        }

        Ok(parsed)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse(env::args().skip(1))?;

    if args.list {
        for (i, name) in scenes::SCENES.iter().enumerate() {
            println!("{}. {}", i + 1, name);
        }
        return Ok(());
    }

    let Some(selector) = args.scene.as_deref() else {
        bail!("No scene given\n{}", USAGE);
    };

    let settings = match &args.config {
        Some(path) => RenderSettings::load(path)?,
        None => RenderSettings::default(),
    };

    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(rand::random::<u64>);
    log::info!("Seed: {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let assets = args.assets.clone().unwrap_or_else(|| PathBuf::from("assets"));
    let scene = scenes::build(selector, &assets, &mut rng)?;
    let camera = Camera::new(settings.apply(scene.camera))
        .with_context(|| format!("Scene '{}' has an unusable camera", scene.name))?;

    let parallel = !args.sequential && settings.parallel.unwrap_or(true);
    let image = if parallel {
        let bucket_size = settings.bucket_size.unwrap_or(DEFAULT_BUCKET_SIZE);
        render_parallel(&camera, scene.world.as_ref(), seed, bucket_size)
    } else {
        render(&camera, scene.world.as_ref(), &mut rng)
    };

    let output = args
        .output
        .or(settings.output)
        .unwrap_or_else(|| PathBuf::from(format!("output/{}.ppm", scene.name)));
    save_image(&image, &output)?;
    log::info!("Saved to {}", output.display());

    Ok(())
}

/// Write `image` as PNG when the extension says so, PPM otherwise.
fn save_image(image: &ImageBuffer, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    if is_png {
        let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
            .context("Image buffer does not match its dimensions")?;
        rgb.save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_ppm(&mut writer, image)?;
        writer.flush()?;
    }

    Ok(())
}
