use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use retouch_core::{
    list_images, BatchController, FlipAxis, InterpolationFilter, ParameterSet, Pipeline, SingleImageController,
};

#[derive(Parser)]
#[command(name = "retouch")]
#[command(version, about = "Photo editing pipeline for single images and folders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit one image and export the result
    Edit {
        /// Input PNG or JPEG file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file; the extension picks the format (default: <name>_edited.<ext> next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Apply one set of parameters to every image in a folder
    Batch {
        /// Folder with the source images
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Destination folder (created if missing)
        #[arg(short, long, value_name = "DIR")]
        out: PathBuf,

        /// Number of parallel threads
        #[arg(short = 'j', long = "jobs", value_name = "N")]
        threads: Option<usize>,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// List the images a batch run would pick up
    List {
        #[arg(value_name = "DIR")]
        input: PathBuf,
    },
}

/// Parameter preset plus per-value overrides.
#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// TOML preset with [position], [filters] and [effects] tables
    #[arg(short, long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Rotation in degrees, counter-clockwise
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    rotation: Option<f32>,

    /// Border to remove from every edge, in pixels
    #[arg(long, value_name = "PX")]
    zoom: Option<u32>,

    /// Flip axis: none, x, y or both
    #[arg(long, value_name = "AXIS")]
    flip: Option<FlipAxis>,

    /// Brightness multiplier (1.0 = unchanged)
    #[arg(long, value_name = "FLOAT")]
    brightness: Option<f32>,

    /// Saturation multiplier (1.0 = unchanged, 0 = gray)
    #[arg(long, value_name = "FLOAT")]
    saturation: Option<f32>,

    #[arg(long)]
    grayscale: bool,

    #[arg(long)]
    invert: bool,

    /// Reduce to an adaptive four-color palette
    #[arg(long)]
    four_color: bool,

    /// Gaussian blur sigma
    #[arg(long, value_name = "SIGMA")]
    blur: Option<f32>,

    /// Unsharp mask strength
    #[arg(long, value_name = "FLOAT")]
    contrast: Option<f32>,

    /// Hue shift (-100 to 100)
    #[arg(long, value_name = "STEPS", allow_negative_numbers = true)]
    hue: Option<i32>,

    /// Use the Lanczos3 filter for rotation instead of bilinear
    #[arg(long)]
    lanczos: bool,
}

impl ParamArgs {
    fn resolve(&self) -> Result<ParameterSet> {
        let mut params = match &self.params {
            Some(path) => {
                ParameterSet::load(path).with_context(|| format!("Failed to load preset {}", path.display()))?
            }
            None => ParameterSet::default(),
        };

        if let Some(rotation) = self.rotation {
            params.position.rotation = rotation;
        }
        if let Some(zoom) = self.zoom {
            params.position.zoom = zoom;
        }
        if let Some(flip) = self.flip {
            params.position.flip = flip;
        }
        if let Some(brightness) = self.brightness {
            params.filters.brightness = brightness;
        }
        if let Some(saturation) = self.saturation {
            params.filters.saturation = saturation;
        }
        params.filters.grayscale |= self.grayscale;
        params.filters.invert |= self.invert;
        params.filters.four_color |= self.four_color;
        if let Some(blur) = self.blur {
            params.effects.blur = blur;
        }
        if let Some(contrast) = self.contrast {
            params.effects.contrast = contrast;
        }
        if let Some(hue) = self.hue {
            params.effects.hue = hue;
        }

        params.validate().context("Invalid editing parameters")?;
        Ok(params)
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline::new(if self.lanczos {
            InterpolationFilter::Lanczos3
        } else {
            InterpolationFilter::Bilinear
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Edit { input, output, params } => cmd_edit(&input, output.as_deref(), &params),
        Commands::Batch {
            input,
            out,
            threads,
            params,
        } => cmd_batch(&input, &out, threads, &params),
        Commands::List { input } => cmd_list(&input),
    }
}

/// Split an output path into the (name, extension, directory) triple the
/// export step takes.
fn output_parts(input: &Path, output: Option<&Path>) -> Result<(String, String, PathBuf)> {
    let target = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
            let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("png");
            input.with_file_name(format!("{}_edited.{}", stem, ext))
        }
    };

    let name = target
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Output path {} has no file name", target.display()))?;
    let extension = target
        .extension()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Output path {} has no extension", target.display()))?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((name.to_string(), extension.to_string(), dir))
}

fn cmd_edit(input: &Path, output: Option<&Path>, args: &ParamArgs) -> Result<()> {
    let params = args.resolve()?;
    let (name, extension, dir) = output_parts(input, output)?;

    let mut controller = SingleImageController::open(input, args.pipeline())
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let skipped = controller.parameters_changed(params)?.len();
    if skipped > 0 {
        log::info!("{} stage(s) skipped for {}", skipped, input.display());
    }

    let written = controller
        .export(&name, &extension, &dir)
        .with_context(|| format!("Failed to export {}", input.display()))?;
    println!("{}", written.display());
    Ok(())
}

fn cmd_batch(input: &Path, out: &Path, threads: Option<usize>, args: &ParamArgs) -> Result<()> {
    let params = args.resolve()?;

    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .context("Failed to configure thread pool")?;
        log::info!("Using {} threads for parallel processing", num_threads);
    }

    if !out.exists() {
        std::fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;
    }

    let mut controller = BatchController::open(input, args.pipeline())
        .with_context(|| format!("Failed to read {}", input.display()))?;
    if controller.job().is_empty() {
        bail!("No PNG or JPEG images found in {}", input.display());
    }
    controller.parameters_changed(params)?;

    let report = controller.export_all(out);
    for path in report.exported() {
        println!("{}", path.display());
    }
    let failed = report.failed();
    if !failed.is_empty() {
        bail!("{} of {} images failed", failed.len(), report.outcomes.len());
    }
    Ok(())
}

fn cmd_list(input: &Path) -> Result<()> {
    let names = list_images(input).with_context(|| format!("Failed to read {}", input.display()))?;
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
