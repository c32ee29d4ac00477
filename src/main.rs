mod colors;
mod config;
mod help;
mod settings;
mod terminal;
mod viz;

use clap::{Args, Parser, Subcommand};
use config::{EscapeConfig, FernConfig, FractalType, LSystemConfig, SpiroConfig, ViewConfig};
use fractart::escape::EscapeKind;
use fractart::ifs::{FernPreset, DEFAULT_ITERATIONS};
use fractart::lsystem::LSystemPreset;
use fractart::raster::{parse_hex, Rgb};
use fractart::spirograph::{SpiroColor, SpiroPreset, MAX_CIRCLES};
use settings::Settings;
use std::io;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fractart")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Terminal fractal viewer: ferns, Mandelbrot and Julia sets, L-systems and spirographs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

const DEFAULT_TIME_STEP: f32 = 0.03;
const MAX_TIME_STEP: f32 = 5.0;

/// Frame delay clamped to 0..=5 seconds; NaN and infinities fall back to the default
fn clamp_time_step(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.clamp(0.0, MAX_TIME_STEP)
    } else {
        DEFAULT_TIME_STEP
    }
}

/// Flags every viewer accepts
#[derive(Args)]
struct ViewArgs {
    /// Animation speed (seconds per frame)
    #[arg(short, long, default_value = "0.03")]
    time: f32,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Render once to stdout (no interactive display)
    #[arg(short, long)]
    print: bool,
}

impl ViewArgs {
    fn config(&self) -> ViewConfig {
        ViewConfig {
            time_step: clamp_time_step(self.time),
            seed: self.seed,
            print: self.print,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Grow chaos-game ferns; click to plant more
    Fern {
        #[command(flatten)]
        view: ViewArgs,

        /// Preset: barnsley, cyclosorus, tree
        #[arg(short = 'P', long)]
        preset: Option<String>,

        /// Points per planted fern
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Size slider for planted ferns (1-100)
        #[arg(short = 'S', long)]
        slider: Option<u32>,

        /// Color of planted ferns (#rrggbb)
        #[arg(short, long)]
        color: Option<String>,

        /// Iterations drawn per frame for each growing fern
        #[arg(long, default_value = "2000")]
        steps: usize,

        /// Coefficient table: four rows of "a b c d e f p" separated by ';'
        #[arg(long)]
        table: Option<String>,
    },

    /// Explore the Mandelbrot set; click to zoom
    Mandelbrot {
        #[command(flatten)]
        view: ViewArgs,

        /// Maximum iterations per pixel (1-5000)
        #[arg(short, long)]
        depth: Option<u32>,

        /// Divergence threshold on |z|
        #[arg(short = 'T', long)]
        threshold: Option<f64>,

        /// Base color (#rrggbb)
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Animate the Julia set; click to zoom
    Julia {
        #[command(flatten)]
        view: ViewArgs,

        /// Maximum iterations per pixel (1-5000)
        #[arg(short, long)]
        depth: Option<u32>,

        /// Divergence threshold on |z|
        #[arg(short = 'T', long)]
        threshold: Option<f64>,

        /// Base color (#rrggbb)
        #[arg(short, long)]
        color: Option<String>,

        /// Real part of a fixed constant (stops the animation)
        #[arg(long, allow_hyphen_values = true)]
        re: Option<f64>,

        /// Imaginary part of a fixed constant (stops the animation)
        #[arg(long, allow_hyphen_values = true)]
        im: Option<f64>,
    },

    /// Draw an L-system with turtle graphics
    Lsystem {
        #[command(flatten)]
        view: ViewArgs,

        /// Preset: tree, sierpinski, dragon
        #[arg(short = 'P', long)]
        preset: Option<String>,

        /// Rewriting generations (clamped per preset)
        #[arg(short, long)]
        generations: Option<u32>,

        /// Turn angle in degrees
        #[arg(short, long, allow_hyphen_values = true)]
        angle: Option<f64>,

        /// Stroke color (#rrggbb)
        #[arg(short, long)]
        color: Option<String>,

        /// Segments drawn per frame
        #[arg(long, default_value = "40")]
        segments: usize,
    },

    /// Trace nested epicycles
    Spirograph {
        #[command(flatten)]
        view: ViewArgs,

        /// Preset: cross, donut, star, nucleus, star-fractal
        #[arg(short = 'P', long)]
        preset: Option<String>,

        /// Custom step counts per circle, comma-separated (empty entries default)
        #[arg(long)]
        steps: Option<String>,

        /// Circles in a custom chain (1-7, default: one per step count)
        #[arg(long)]
        circles: Option<usize>,

        /// Trace color: red, white, rainbow
        #[arg(short, long)]
        color: Option<String>,

        /// Chain ticks per frame
        #[arg(long)]
        speed: Option<usize>,

        /// Hide the circle overlay
        #[arg(long)]
        no_circles: bool,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env("FRACTART_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Parse a color flag or config value, falling back on error
fn color_or(text: Option<&str>, fallback: Rgb) -> Rgb {
    match text.map(parse_hex) {
        Some(Ok(rgb)) => rgb,
        Some(Err(e)) => {
            warn!(error = %e, "using default color");
            fallback
        }
        None => fallback,
    }
}

/// Look up a preset by name, warning on unknown names
fn preset_or<T>(name: Option<&str>, lookup: fn(&str) -> Option<T>, fallback: T, kind: &str) -> T {
    match name {
        Some(name) => lookup(name).unwrap_or_else(|| {
            warn!(preset = name, kind, "unknown preset, using default");
            fallback
        }),
        None => fallback,
    }
}

/// Comma-separated step counts; blank or unparsable entries become None
fn parse_steps(text: &str) -> Vec<Option<u32>> {
    text.split(',').map(|t| t.trim().parse().ok()).collect()
}

fn escape_config(
    kind: EscapeKind,
    view: &ViewArgs,
    depth: Option<u32>,
    threshold: Option<f64>,
    color: Option<String>,
    defaults: &settings::EscapeSettings,
) -> EscapeConfig {
    let initial = fractart::escape::ComplexViewport::initial(kind);
    EscapeConfig {
        view: view.config(),
        kind,
        depth: depth.or(defaults.depth).unwrap_or(initial.max_depth),
        threshold: threshold.or(defaults.threshold).unwrap_or(initial.divergence_threshold),
        color: color_or(color.as_deref().or(defaults.color.as_deref()), kind.base_color()),
        custom_c: None,
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let (settings, problem) = Settings::load();
    init_logging(&settings.log.level);
    if let Some(problem) = problem {
        warn!("{problem}");
    }

    let fractal_type = match &cli.command {
        Commands::Fern { .. } => FractalType::Fern,
        Commands::Mandelbrot { .. } => FractalType::Mandelbrot,
        Commands::Julia { .. } => FractalType::Julia,
        Commands::Lsystem { .. } => FractalType::LSystem,
        Commands::Spirograph { .. } => FractalType::Spirograph,
    };
    tracing::debug!(view = fractal_type.name(), "starting viewer");

    match cli.command {
        Commands::Fern {
            view,
            preset,
            iterations,
            slider,
            color,
            steps,
            table,
        } => {
            let defaults = &settings.fern;
            let config = FernConfig {
                view: view.config(),
                preset: preset_or(
                    preset.as_deref().or(defaults.preset.as_deref()),
                    FernPreset::from_name,
                    FernPreset::Barnsley,
                    "fern",
                ),
                iterations: iterations.or(defaults.iterations).unwrap_or(DEFAULT_ITERATIONS),
                slider: slider.or(defaults.slider).unwrap_or(20),
                color: color_or(color.as_deref().or(defaults.color.as_deref()), (0, 128, 0)),
                steps_per_frame: steps,
                table: table.map(|t| t.replace(';', "\n")),
            };
            viz::fern::run(config)?;
        }
        Commands::Mandelbrot {
            view,
            depth,
            threshold,
            color,
        } => {
            let config = escape_config(EscapeKind::Mandelbrot, &view, depth, threshold, color, &settings.mandelbrot);
            viz::mandelbrot::run(config)?;
        }
        Commands::Julia {
            view,
            depth,
            threshold,
            color,
            re,
            im,
        } => {
            let mut config = escape_config(EscapeKind::Julia, &view, depth, threshold, color, &settings.julia);
            let fallback = fractart::escape::DEFAULT_CUSTOM_C;
            if re.is_some() || im.is_some() {
                config.custom_c = Some((re.unwrap_or(fallback.re), im.unwrap_or(fallback.im)));
            }
            viz::julia::run(config)?;
        }
        Commands::Lsystem {
            view,
            preset,
            generations,
            angle,
            color,
            segments,
        } => {
            let defaults = &settings.lsystem;
            let preset = preset_or(
                preset.as_deref().or(defaults.preset.as_deref()),
                LSystemPreset::from_name,
                LSystemPreset::Tree,
                "lsystem",
            );
            let config = LSystemConfig {
                view: view.config(),
                preset,
                generations: generations
                    .or(defaults.generations)
                    .unwrap_or(preset.default_generations()),
                angle: angle.or(defaults.angle),
                color: color_or(color.as_deref().or(defaults.color.as_deref()), (120, 200, 90)),
                segments_per_frame: segments,
            };
            viz::lsystem::run(config)?;
        }
        Commands::Spirograph {
            view,
            preset,
            steps,
            circles,
            color,
            speed,
            no_circles,
        } => {
            let defaults = &settings.spirograph;
            let custom_steps = steps.as_deref().map(parse_steps);
            let circles = circles
                .or(custom_steps.as_ref().map(Vec::len))
                .unwrap_or(MAX_CIRCLES)
                .clamp(1, MAX_CIRCLES);
            let config = SpiroConfig {
                view: view.config(),
                preset: preset_or(
                    preset.as_deref().or(defaults.preset.as_deref()),
                    SpiroPreset::from_name,
                    SpiroPreset::Cross,
                    "spirograph",
                ),
                custom_steps,
                circles,
                color: preset_or(
                    color.as_deref().or(defaults.color.as_deref()),
                    SpiroColor::from_name,
                    SpiroColor::Rainbow,
                    "spirograph color",
                ),
                speed: speed.or(defaults.speed).unwrap_or(200),
                show_circles: !no_circles,
            };
            viz::spirograph::run(config)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_list_keeps_blanks_as_defaults() {
        assert_eq!(parse_steps("500, ,x,20000"), vec![Some(500), None, None, Some(20_000)]);
    }

    #[test]
    fn bad_color_falls_back() {
        assert_eq!(color_or(Some("#010203"), (9, 9, 9)), (1, 2, 3));
        assert_eq!(color_or(Some("blue"), (9, 9, 9)), (9, 9, 9));
        assert_eq!(color_or(None, (9, 9, 9)), (9, 9, 9));
    }

    #[test]
    fn unknown_preset_falls_back() {
        assert_eq!(preset_or(Some("star"), SpiroPreset::from_name, SpiroPreset::Cross, "t"), SpiroPreset::Star);
        assert_eq!(preset_or(Some("nope"), SpiroPreset::from_name, SpiroPreset::Cross, "t"), SpiroPreset::Cross);
    }

    #[test]
    fn frame_delay_is_clamped() {
        let cli = Cli::try_parse_from(["fractart", "mandelbrot", "--time=-1"]).unwrap();
        match cli.command {
            Commands::Mandelbrot { view, .. } => assert_eq!(view.config().time_step, 0.0),
            _ => panic!("expected mandelbrot"),
        }
        assert_eq!(clamp_time_step(60.0), MAX_TIME_STEP);
        assert_eq!(clamp_time_step(f32::NAN), DEFAULT_TIME_STEP);
        assert_eq!(clamp_time_step(f32::INFINITY), DEFAULT_TIME_STEP);
        assert_eq!(clamp_time_step(0.1), 0.1);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["fractart", "julia", "--re", "-0.8", "--im", "0.156", "--print"]).unwrap();
        match cli.command {
            Commands::Julia { re, im, view, .. } => {
                assert_eq!(re, Some(-0.8));
                assert_eq!(im, Some(0.156));
                assert!(view.print);
            }
            _ => panic!("expected julia"),
        }
    }
}
