//! retouch: apply non-destructive edits to an image from the command line.
//!
//! Loads an image into an edit session, commits the requested
//! adjustments and transforms (or replays a JSON edit script), and saves
//! the rendered result. The output format follows the output file's
//! extension (`.jpg`, `.jpeg`, `.png`, `.gif`).
//!
//! # Usage
//!
//! ```text
//! retouch photo.png --output out.jpg --brightness 20 --rotate 1
//! retouch photo.png -o out.png --edits-json '[{"action":"set","operation":{"kind":"hue","value":30}}]'
//! ```
//!
//! Log verbosity is controlled with `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod save;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use retouch_core::diagnostics::{Clock, render_with_diagnostics};
use retouch_core::{EditCommand, EditError, EditSession, Operation, ResampleFilter, SessionConfig};
use tracing_subscriber::EnvFilter;

use crate::save::{SaveError, save_image};

/// Apply non-destructive edits to an image and save the result.
///
/// Continuous adjustments are committed in the order brightness,
/// contrast, hue, saturation, sepia, blur, colour balance; discrete
/// transforms follow in the order grayscale, rotate, flips, resize.
#[derive(Parser)]
#[command(name = "retouch", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, GIF, BMP, WebP).
    input: PathBuf,

    /// Where to write the result. The extension picks the format.
    #[arg(short, long)]
    output: PathBuf,

    /// Brightness adjustment in percent (-100 to 100).
    #[arg(long, allow_negative_numbers = true)]
    brightness: Option<f32>,

    /// Contrast adjustment in percent (-100 to 100).
    #[arg(long, allow_negative_numbers = true)]
    contrast: Option<f32>,

    /// Hue rotation in degrees (-180 to 180).
    #[arg(long, allow_negative_numbers = true)]
    hue: Option<f32>,

    /// Saturation adjustment in percent (-100 to 500).
    #[arg(long, allow_negative_numbers = true)]
    saturation: Option<f32>,

    /// Sepia strength in percent (0 to 100).
    #[arg(long)]
    sepia: Option<f32>,

    /// Gaussian blur radius (0 to 100).
    #[arg(long)]
    blur: Option<f32>,

    /// Per-channel balance in percent, as `R,G,B` (each -100 to 500).
    #[arg(long, value_name = "R,G,B", allow_hyphen_values = true, value_parser = parse_color_balance)]
    color_balance: Option<[f32; 3]>,

    /// Convert to grayscale.
    #[arg(long)]
    grayscale: bool,

    /// Number of quarter turns counter-clockwise.
    #[arg(long, default_value_t = 0)]
    rotate: u8,

    /// Mirror left to right.
    #[arg(long)]
    flip_horizontal: bool,

    /// Mirror top to bottom.
    #[arg(long)]
    flip_vertical: bool,

    /// Resize to `WIDTHxHEIGHT`.
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    resize: Option<(u32, u32)>,

    /// With `--resize`, fit inside the box instead of cropping to fill it.
    #[arg(long, requires = "resize")]
    keep_aspect_ratio: bool,

    /// Edit script as a JSON array of commands.
    ///
    /// When provided, all edit flags are ignored. Each command is one of
    /// `set`, `add` (with an `operation`), `undo`, `redo`, or `reset`.
    #[arg(long)]
    edits_json: Option<String>,

    /// Full session config as a JSON string.
    ///
    /// When provided, `--history-limit` and `--resample` are ignored.
    /// The JSON must be a valid `SessionConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Maximum undo depth (unbounded if omitted).
    #[arg(long)]
    history_limit: Option<usize>,

    /// Resampling filter used by `--resize`.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_RESAMPLE)]
    resample: Resample,

    /// Print per-operation render timings.
    #[arg(long)]
    timings: bool,

    /// With `--timings`, print diagnostics as JSON.
    #[arg(long, requires = "timings")]
    json: bool,
}

/// Resampling filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Resample {
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (fast, decent quality).
    Triangle,
    /// Bicubic Catmull-Rom (moderate, good quality).
    CatmullRom,
    /// Gaussian (moderate, smooth).
    Gaussian,
    /// Lanczos with 3 lobes (slowest, sharpest).
    Lanczos3,
}

/// Maps a [`ResampleFilter`] to the local CLI [`Resample`] enum.
const fn resample_from_core(f: ResampleFilter) -> Resample {
    match f {
        ResampleFilter::Nearest => Resample::Nearest,
        ResampleFilter::Triangle => Resample::Triangle,
        ResampleFilter::CatmullRom => Resample::CatmullRom,
        ResampleFilter::Gaussian => Resample::Gaussian,
        ResampleFilter::Lanczos3 => Resample::Lanczos3,
    }
}

/// The CLI default filter, derived from [`SessionConfig::DEFAULT_RESAMPLE`]
/// so the two cannot silently diverge.
const CLI_DEFAULT_RESAMPLE: Resample = resample_from_core(SessionConfig::DEFAULT_RESAMPLE);

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("error parsing --config-json: {0}")]
    Config(#[source] serde_json::Error),

    #[error("error parsing --edits-json: {0}")]
    Edits(#[source] serde_json::Error),

    #[error("error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error loading {}: {source}", .path.display())]
    Load { path: PathBuf, source: EditError },

    #[error("edit {index} rejected: {source}")]
    Edit { index: usize, source: EditError },

    #[error("error serializing diagnostics: {0}")]
    Diagnostics(#[source] serde_json::Error),

    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Monotonic clock backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

fn parse_color_balance(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [red, green, blue] = parts.as_slice() else {
        return Err(format!("expected R,G,B, got {s:?}"));
    };
    let channel = |v: &str| {
        v.parse::<f32>()
            .map_err(|e| format!("invalid channel {v:?}: {e}"))
    };
    Ok([channel(red)?, channel(green)?, channel(blue)?])
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let dimension = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid dimension {v:?}: {e}"))
    };
    Ok((dimension(width)?, dimension(height)?))
}

/// Build a [`SessionConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual config flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<SessionConfig, CliError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(CliError::Config);
    }

    Ok(SessionConfig {
        history_limit: cli.history_limit,
        resample: match cli.resample {
            Resample::Nearest => ResampleFilter::Nearest,
            Resample::Triangle => ResampleFilter::Triangle,
            Resample::CatmullRom => ResampleFilter::CatmullRom,
            Resample::Gaussian => ResampleFilter::Gaussian,
            Resample::Lanczos3 => ResampleFilter::Lanczos3,
        },
    })
}

/// Build the edit script from CLI arguments.
///
/// If `--edits-json` is provided, the JSON is parsed directly and the
/// individual edit flags are ignored.
fn edits_from_cli(cli: &Cli) -> Result<Vec<EditCommand>, CliError> {
    if let Some(ref json) = cli.edits_json {
        return serde_json::from_str(json).map_err(CliError::Edits);
    }

    let continuous = [
        cli.brightness.map(|value| Operation::Brightness { value }),
        cli.contrast.map(|value| Operation::Contrast { value }),
        cli.hue.map(|value| Operation::Hue { value }),
        cli.saturation.map(|value| Operation::Saturation { value }),
        cli.sepia.map(|value| Operation::Sepia { value }),
        cli.blur.map(|radius| Operation::Blur { radius }),
        cli.color_balance
            .map(|[red, green, blue]| Operation::ColorBalance { red, green, blue }),
    ];
    let mut commands: Vec<EditCommand> = continuous
        .into_iter()
        .flatten()
        .map(|operation| EditCommand::Set { operation })
        .collect();

    let mut add = |operation| commands.push(EditCommand::Add { operation });
    if cli.grayscale {
        add(Operation::Grayscale);
    }
    for _ in 0..cli.rotate % 4 {
        add(Operation::Rotate90);
    }
    if cli.flip_horizontal {
        add(Operation::FlipHorizontal);
    }
    if cli.flip_vertical {
        add(Operation::FlipVertical);
    }
    if let Some((width, height)) = cli.resize {
        add(Operation::Resize {
            width,
            height,
            keep_aspect_ratio: cli.keep_aspect_ratio,
        });
    }

    Ok(commands)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = config_from_cli(cli)?;
    let commands = edits_from_cli(cli)?;

    let bytes = std::fs::read(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    tracing::debug!(path = %cli.input.display(), bytes = bytes.len(), ?config, "Input read");

    let mut session = EditSession::load(&bytes, config).map_err(|source| CliError::Load {
        path: cli.input.clone(),
        source,
    })?;

    for (index, command) in commands.iter().enumerate() {
        let changed = session
            .apply(command)
            .map_err(|source| CliError::Edit { index, source })?;
        if !changed {
            tracing::warn!(index, ?command, "Edit had no effect");
        }
    }
    tracing::info!(
        operations = session.chain().len(),
        width = session.dimensions().width,
        height = session.dimensions().height,
        "Edits applied"
    );

    if cli.timings {
        let (_, diagnostics) = render_with_diagnostics(
            session.renderer(),
            session.source_image(),
            session.chain(),
            &StdClock,
        );
        if cli.json {
            let json =
                serde_json::to_string_pretty(&diagnostics).map_err(CliError::Diagnostics)?;
            println!("{json}");
        } else {
            println!("{}", diagnostics.report());
        }
    }

    save_image(&cli.output, session.current_image())?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
