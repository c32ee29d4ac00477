use fractart::escape::EscapeKind;
use fractart::ifs::FernPreset;
use fractart::lsystem::LSystemPreset;
use fractart::spirograph::{SpiroColor, SpiroPreset};
use fractart::Rgb;

/// Types of fractal views available
#[derive(Clone, Copy, PartialEq)]
pub enum FractalType {
    Fern,        // Chaos-game IFS ferns
    Mandelbrot,  // Escape-time, c = pixel
    Julia,       // Escape-time, animated c
    LSystem,     // Rewriting + turtle
    Spirograph,  // Nested epicycles
}

impl FractalType {
    pub fn name(self) -> &'static str {
        match self {
            FractalType::Fern => "fern",
            FractalType::Mandelbrot => "mandelbrot",
            FractalType::Julia => "julia",
            FractalType::LSystem => "lsystem",
            FractalType::Spirograph => "spirograph",
        }
    }
}

/// Settings shared by every view
#[derive(Clone)]
pub struct ViewConfig {
    pub time_step: f32,
    pub seed: Option<u64>,
    pub print: bool,
}

/// Configuration for the fern view
#[derive(Clone)]
pub struct FernConfig {
    pub view: ViewConfig,
    pub preset: FernPreset,
    pub iterations: usize,
    pub slider: u32,
    pub color: Rgb,
    pub steps_per_frame: usize,
    /// Edited coefficient table (`a b c d e f p` per row) replacing the preset maps
    pub table: Option<String>,
}

/// Configuration for the Mandelbrot and Julia views
#[derive(Clone)]
pub struct EscapeConfig {
    pub view: ViewConfig,
    pub kind: EscapeKind,
    pub depth: u32,
    pub threshold: f64,
    pub color: Rgb,
    /// Fixed Julia constant; disables the animation
    pub custom_c: Option<(f64, f64)>,
}

/// Configuration for the L-system view
#[derive(Clone)]
pub struct LSystemConfig {
    pub view: ViewConfig,
    pub preset: LSystemPreset,
    pub generations: u32,
    /// Turn angle in degrees; preset default when None
    pub angle: Option<f64>,
    pub color: Rgb,
    pub segments_per_frame: usize,
}

/// Configuration for the spirograph view
#[derive(Clone)]
pub struct SpiroConfig {
    pub view: ViewConfig,
    pub preset: SpiroPreset,
    /// Custom per-circle step counts, clamped before use
    pub custom_steps: Option<Vec<Option<u32>>>,
    pub circles: usize,
    pub color: SpiroColor,
    pub speed: usize,
    pub show_circles: bool,
}
