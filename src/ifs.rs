//! Affine iterated function systems rendered with the chaos game.
//!
//! A fern is four affine maps with selection probabilities. Starting from the
//! origin, each step picks a map at random (weighted), applies it to the
//! current point and plots the result. Because every map is a contraction
//! the point cloud converges on the same attractor whatever the random
//! sequence.

use crate::error::{FractalError, Result};
use crate::matrix::Matrix;
use crate::raster::{Rgb, Surface};
use crate::scheduler::Job;
use rand::Rng;
use tracing::debug;

/// Default number of chaos-game steps for a planted fern.
pub const DEFAULT_ITERATIONS: usize = 50_000;

/// Bounds for the scale slider (percent of canvas height / 50).
pub const SLIDER_MIN: u32 = 1;
pub const SLIDER_MAX: u32 = 100;

/// One affine map: `p' = coefficient · p + summand`, chosen with `probability`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap {
    pub coefficient: [[f64; 2]; 2],
    pub summand: [f64; 2],
    pub probability: f64,
}

impl AffineMap {
    pub const fn new(coefficient: [[f64; 2]; 2], summand: [f64; 2], probability: f64) -> Self {
        Self { coefficient, summand, probability }
    }

    /// Build a map from shape-checked matrices (2×2 coefficient, 2×1 summand).
    pub fn from_matrices(coefficient: &Matrix, summand: &Matrix, probability: f64) -> Result<Self> {
        if coefficient.shape() != (2, 2) {
            return Err(FractalError::DimensionMismatch {
                expected: (2, 2),
                got: coefficient.shape(),
            });
        }
        if summand.shape() != (2, 1) {
            return Err(FractalError::DimensionMismatch {
                expected: (2, 1),
                got: summand.shape(),
            });
        }
        Ok(Self {
            coefficient: [
                [coefficient.get(0, 0), coefficient.get(0, 1)],
                [coefficient.get(1, 0), coefficient.get(1, 1)],
            ],
            summand: [summand.get(0, 0), summand.get(1, 0)],
            probability,
        })
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [[a, b], [c, d]] = self.coefficient;
        (a * x + b * y + self.summand[0], c * x + d * y + self.summand[1])
    }
}

pub type AffineSet = [AffineMap; 4];

static BARNSLEY: AffineSet = [
    AffineMap::new([[0.0, 0.0], [0.0, 0.16]], [0.0, 0.0], 0.01),
    AffineMap::new([[0.85, 0.04], [-0.04, 0.85]], [0.0, 1.6], 0.85),
    AffineMap::new([[0.2, -0.26], [0.23, 0.22]], [0.0, 1.6], 0.07),
    AffineMap::new([[-0.15, 0.28], [0.26, 0.24]], [0.0, 0.44], 0.07),
];

static CYCLOSORUS: AffineSet = [
    AffineMap::new([[0.0, 0.0], [0.0, 0.25]], [0.0, -0.4], 0.02),
    AffineMap::new([[0.95, 0.005], [-0.005, 0.93]], [-0.002, 0.5], 0.84),
    AffineMap::new([[0.035, -0.2], [0.16, 0.04]], [-0.09, 0.02], 0.07),
    AffineMap::new([[-0.04, 0.2], [0.16, 0.04]], [0.083, 0.12], 0.07),
];

static TREE: AffineSet = [
    AffineMap::new([[0.0, 0.0], [0.0, 0.5]], [0.0, 0.0], 0.05),
    AffineMap::new([[0.42, -0.42], [0.42, 0.42]], [0.0, 0.2], 0.4),
    AffineMap::new([[0.42, 0.42], [-0.42, 0.42]], [0.0, 0.2], 0.4),
    AffineMap::new([[0.1, 0.0], [0.0, 0.1]], [0.0, 0.2], 0.15),
];

/// Built-in fern variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FernPreset {
    Barnsley,
    Cyclosorus,
    Tree,
}

impl FernPreset {
    pub const ALL: [FernPreset; 3] = [FernPreset::Barnsley, FernPreset::Cyclosorus, FernPreset::Tree];

    /// A fresh copy of the preset's maps. Editing the copy never touches the
    /// preset tables.
    pub fn maps(self) -> AffineSet {
        match self {
            FernPreset::Barnsley => BARNSLEY,
            FernPreset::Cyclosorus => CYCLOSORUS,
            FernPreset::Tree => TREE,
        }
    }

    /// Extra scale applied when planting this variant so it reads at a
    /// similar size to the Barnsley fern.
    pub fn scale_factor(self) -> f64 {
        match self {
            FernPreset::Barnsley => 1.0,
            FernPreset::Cyclosorus => 1.5,
            FernPreset::Tree => 20.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FernPreset::Barnsley => "barnsley",
            FernPreset::Cyclosorus => "cyclosorus",
            FernPreset::Tree => "tree",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "barnsley" | "fern" => Some(FernPreset::Barnsley),
            "cyclosorus" => Some(FernPreset::Cyclosorus),
            "tree" => Some(FernPreset::Tree),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            FernPreset::Barnsley => FernPreset::Cyclosorus,
            FernPreset::Cyclosorus => FernPreset::Tree,
            FernPreset::Tree => FernPreset::Barnsley,
        }
    }
}

/// Reject probabilities that are NaN or outside [0, 1].
pub fn validate(set: &AffineSet) -> Result<()> {
    for (index, map) in set.iter().enumerate() {
        let value = map.probability;
        if !(0.0..=1.0).contains(&value) {
            return Err(FractalError::InvalidProbability { index, value });
        }
    }
    Ok(())
}

/// Parse an edited coefficient table: four rows of `a b c d e f p`
/// (whitespace or comma separated), one row per map.
pub fn parse_table(text: &str) -> Result<AffineSet> {
    let rows: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if rows.len() != 4 {
        return Err(FractalError::DimensionMismatch {
            expected: (4, 7),
            got: (rows.len(), 7),
        });
    }

    let mut set = BARNSLEY;
    for (row, line) in rows.iter().enumerate() {
        let values = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<f64>().map_err(|e| FractalError::InvalidMatrixTable {
                    row,
                    reason: format!("{t:?}: {e}"),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.len() != 7 {
            return Err(FractalError::DimensionMismatch {
                expected: (1, 7),
                got: (1, values.len()),
            });
        }

        let coefficient = Matrix::from_rows(&[values[0..2].to_vec(), values[2..4].to_vec()])?;
        let summand = Matrix::column(&values[4..6]);
        set[row] = AffineMap::from_matrices(&coefficient, &summand, values[6])?;
    }

    validate(&set)?;
    Ok(set)
}

/// Cumulative probability bounds used to pick a map from a uniform draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Buckets {
    bounds: [f64; 4],
    widths: [f64; 4],
}

impl Buckets {
    pub fn new(set: &AffineSet) -> Self {
        let mut bounds = [0.0; 4];
        let mut widths = [0.0; 4];
        let mut acc = 0.0;
        for (i, map) in set.iter().enumerate() {
            acc += map.probability;
            bounds[i] = acc;
            widths[i] = map.probability;
        }
        Self { bounds, widths }
    }

    pub fn bounds(&self) -> [f64; 4] {
        self.bounds
    }

    /// Index of the first non-empty bucket whose cumulative bound is `>= p`.
    /// Draws beyond the final bound (floating error, or probabilities that
    /// sum below one) fall into the last non-empty bucket.
    pub fn select(&self, p: f64) -> usize {
        let mut last_live = self.widths.len() - 1;
        let mut found_live = false;
        for i in 0..self.bounds.len() {
            if self.widths[i] <= 0.0 {
                continue;
            }
            if p <= self.bounds[i] {
                return i;
            }
            last_live = i;
            found_live = true;
        }
        if found_live {
            last_live
        } else {
            self.widths.len() - 1
        }
    }
}

/// The point being iterated, tracked both in model space and on screen.
///
/// Screen coordinates only ever move by the model delta times `scale`, with
/// the y axis flipped (screen y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationPoint {
    pub x: f64,
    pub y: f64,
    pub canvas_x: f64,
    pub canvas_y: f64,
    pub scale: f64,
}

impl IterationPoint {
    /// Model origin placed at screen `origin`.
    pub fn new(origin: (f64, f64), scale: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            canvas_x: origin.0,
            canvas_y: origin.1,
            scale,
        }
    }

    pub fn advance(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        self.canvas_x += dx * self.scale;
        self.canvas_y -= dy * self.scale;
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.advance(x - self.x, y - self.y);
    }

    pub fn canvas(&self) -> (f64, f64) {
        (self.canvas_x, self.canvas_y)
    }
}

/// A single chaos-game output pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelWrite {
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
}

/// Chaos-game state: the maps, their buckets and the moving point.
#[derive(Debug, Clone)]
pub struct ChaosGame {
    maps: AffineSet,
    buckets: Buckets,
    point: IterationPoint,
    color: Rgb,
}

impl ChaosGame {
    pub fn new(maps: AffineSet, origin: (f64, f64), scale: f64, color: Rgb) -> Self {
        Self {
            buckets: Buckets::new(&maps),
            maps,
            point: IterationPoint::new(origin, scale),
            color,
        }
    }

    pub fn point(&self) -> &IterationPoint {
        &self.point
    }

    /// Apply the map selected by `p` and return the pixel to plot.
    pub fn step(&mut self, p: f64) -> PixelWrite {
        let pick = self.buckets.select(p);
        let (x, y) = self.maps[pick].apply(self.point.x, self.point.y);
        self.point.move_to(x, y);
        PixelWrite {
            x: self.point.canvas_x,
            y: self.point.canvas_y,
            color: self.color,
        }
    }
}

/// Run `iterations` chaos-game steps eagerly and collect the pixel writes.
pub fn run<R: Rng>(
    maps: AffineSet,
    iterations: usize,
    origin: (f64, f64),
    scale: f64,
    color: Rgb,
    rng: &mut R,
) -> Vec<PixelWrite> {
    let mut game = ChaosGame::new(maps, origin, scale, color);
    (0..iterations).map(|_| game.step(rng.gen::<f64>())).collect()
}

/// Everything needed to plant one fern on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FernRequest {
    pub maps: AffineSet,
    pub iterations: usize,
    pub origin: (f64, f64),
    pub scale: f64,
    pub color: Rgb,
}

/// Model-to-screen scale chosen by the size slider.
pub fn user_scale(canvas_height: usize, slider: u32) -> f64 {
    canvas_height as f64 * slider.clamp(SLIDER_MIN, SLIDER_MAX) as f64 / 50.0
}

/// The two-toned Barnsley fern drawn when the fern view opens.
pub fn boot_scene(width: usize, height: usize) -> [FernRequest; 2] {
    let origin = (width as f64 * 0.4, height as f64 * 0.9);
    let scale = height as f64 * 0.08;
    [
        FernRequest {
            maps: FernPreset::Barnsley.maps(),
            iterations: 10_000,
            origin,
            scale,
            color: (0, 0, 255),
        },
        FernRequest {
            maps: FernPreset::Barnsley.maps(),
            iterations: 70_000,
            origin,
            scale,
            color: (0, 128, 0),
        },
    ]
}

/// Incremental chaos-game render: one iteration per scheduler step.
pub struct FernJob<R: Rng> {
    game: ChaosGame,
    remaining: usize,
    rng: R,
}

impl<R: Rng> FernJob<R> {
    pub fn new(request: FernRequest, rng: R) -> Self {
        debug!(
            iterations = request.iterations,
            origin_x = request.origin.0,
            origin_y = request.origin.1,
            scale = request.scale,
            "planting fern"
        );
        Self {
            game: ChaosGame::new(request.maps, request.origin, request.scale, request.color),
            remaining: request.iterations,
            rng,
        }
    }
}

impl<R: Rng> Job for FernJob<R> {
    fn step(&mut self, surface: &mut dyn Surface) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        let write = self.game.step(self.rng.gen::<f64>());
        surface.plot(write.x, write.y, write.color);
        true
    }

    fn name(&self) -> &'static str {
        "fern"
    }
}
