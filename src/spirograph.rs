//! Nested epicycles: a chain of circles, each rolling around the attachment
//! point of the one before it. The attachment point of the last circle
//! traces the figure.

use crate::mapping::ColorCycle;
use crate::raster::{Rgb, Surface};
use crate::scheduler::Job;
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use tracing::debug;

pub const MIN_STEP_COUNT: u32 = 10;
pub const MAX_STEP_COUNT: u32 = 40_000;
pub const DEFAULT_STEP_COUNT: u32 = 1_000;
pub const MAX_CIRCLES: usize = 7;

/// Clamp a user-entered per-circle step count into the accepted range.
pub fn clamp_step_count(steps: u32) -> u32 {
    steps.clamp(MIN_STEP_COUNT, MAX_STEP_COUNT)
}

/// Step counts for a custom chain of `circles` circles. Missing entries
/// default to [`DEFAULT_STEP_COUNT`]; all entries are clamped.
pub fn custom_steps(values: &[Option<u32>], circles: usize) -> Vec<u32> {
    let circles = circles.clamp(1, MAX_CIRCLES);
    (0..circles)
        .map(|i| {
            values
                .get(i)
                .copied()
                .flatten()
                .map(clamp_step_count)
                .unwrap_or(DEFAULT_STEP_COUNT)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub radius: f64,
    /// Angular step per tick, `2π / step_count`.
    pub step: f64,
    /// Own step plus every ancestor's step.
    pub cumulative_step: f64,
    /// +1 or -1; children spin opposite to their parent.
    pub direction: f64,
    pub parent: Option<usize>,
    pub center: (f64, f64),
    pub attachment: (f64, f64),
    pub angle: f64,
}

/// Owned chain of circles; parents are referenced by index.
#[derive(Debug, Clone, PartialEq)]
pub struct EpicycleChain {
    circles: Vec<Circle>,
}

impl EpicycleChain {
    /// Root at `center` with `root_radius`; every following circle has half
    /// the radius of its parent.
    pub fn new(center: (f64, f64), root_radius: f64, step_counts: &[u32]) -> Self {
        let mut circles: Vec<Circle> = Vec::with_capacity(step_counts.len());
        let mut radius = root_radius;

        for (i, &count) in step_counts.iter().enumerate() {
            let step = TAU / count.max(1) as f64;
            let circle = match i.checked_sub(1).map(|p| (p, circles[p])) {
                None => Circle {
                    radius,
                    step,
                    cumulative_step: step,
                    direction: 1.0,
                    parent: None,
                    center,
                    attachment: (center.0 + radius, center.1),
                    angle: 0.0,
                },
                Some((p, parent)) => {
                    let c = (parent.attachment.0 + radius, parent.attachment.1);
                    Circle {
                        radius,
                        step,
                        cumulative_step: step + parent.cumulative_step,
                        direction: -parent.direction,
                        parent: Some(p),
                        center: c,
                        attachment: (c.0 + radius, c.1),
                        angle: 0.0,
                    }
                }
            };
            circles.push(circle);
            radius /= 2.0;
        }

        Self { circles }
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Attachment point of the innermost circle.
    pub fn trace_point(&self) -> Option<(f64, f64)> {
        self.circles.last().map(|c| c.attachment)
    }

    /// Advance every circle by one tick, parent first, and return the new
    /// trace point.
    pub fn tick(&mut self) -> Option<(f64, f64)> {
        for i in 0..self.circles.len() {
            if let Some(p) = self.circles[i].parent {
                let parent = self.circles[p];
                let circle = &mut self.circles[i];
                circle.center = (
                    parent.attachment.0 + circle.radius * parent.angle.cos(),
                    parent.attachment.1 + circle.radius * parent.angle.sin(),
                );
            }
            let circle = &mut self.circles[i];
            circle.attachment = (
                circle.center.0 + circle.radius * circle.angle.cos(),
                circle.center.1 + circle.radius * circle.angle.sin(),
            );
            circle.angle += circle.cumulative_step * circle.direction;
        }
        self.trace_point()
    }

    /// Stroke every circle outline.
    pub fn draw_circles(&self, surface: &mut dyn Surface, color: Rgb) {
        for circle in &self.circles {
            surface.circle(circle.center, circle.radius, color);
        }
    }
}

/// Built-in chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiroPreset {
    Cross,
    Donut,
    Star,
    Nucleus,
    StarFractal,
}

impl SpiroPreset {
    pub const ALL: [SpiroPreset; 5] = [
        SpiroPreset::Cross,
        SpiroPreset::Donut,
        SpiroPreset::Star,
        SpiroPreset::Nucleus,
        SpiroPreset::StarFractal,
    ];

    pub fn step_counts(self) -> &'static [u32] {
        match self {
            SpiroPreset::Cross => &[40_000, 10_000, 10_000, 1_000, 500, 100, 10],
            SpiroPreset::Donut => &[500, 20_000, 500, 500, 500],
            SpiroPreset::Star => &[500, 1_000, 20_000],
            SpiroPreset::Nucleus => &[100_000, 1_600, 800, 400, 200, 100, 10],
            SpiroPreset::StarFractal => &[40_000, 10_000, 20_000, 1_000, 500, 100, 10],
        }
    }

    /// Number of ticks drawn for one full figure.
    pub fn ticks(self) -> usize {
        match self {
            SpiroPreset::Cross | SpiroPreset::StarFractal => 40_000,
            SpiroPreset::Donut | SpiroPreset::Star => 20_000,
            SpiroPreset::Nucleus => 100_000,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpiroPreset::Cross => "cross",
            SpiroPreset::Donut => "donut",
            SpiroPreset::Star => "star",
            SpiroPreset::Nucleus => "nucleus",
            SpiroPreset::StarFractal => "star-fractal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "cross" => Some(SpiroPreset::Cross),
            "donut" => Some(SpiroPreset::Donut),
            "star" => Some(SpiroPreset::Star),
            "nucleus" => Some(SpiroPreset::Nucleus),
            "star-fractal" | "star_fractal" | "starfractal" => Some(SpiroPreset::StarFractal),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// Trace colour options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiroColor {
    Red,
    White,
    Rainbow,
}

impl SpiroColor {
    pub fn cycle(self) -> ColorCycle {
        match self {
            SpiroColor::Red => ColorCycle::new((255, 0, 0), [0, 0, 0]),
            SpiroColor::White => ColorCycle::new((255, 255, 255), [0, 0, 0]),
            SpiroColor::Rainbow => ColorCycle::new((255, 50, 0), [1, -1, -1]),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "red" => Some(SpiroColor::Red),
            "white" => Some(SpiroColor::White),
            "rainbow" | "multi" => Some(SpiroColor::Rainbow),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpiroColor::Red => "red",
            SpiroColor::White => "white",
            SpiroColor::Rainbow => "rainbow",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SpiroColor::Red => SpiroColor::White,
            SpiroColor::White => SpiroColor::Rainbow,
            SpiroColor::Rainbow => SpiroColor::Red,
        }
    }
}

pub type SharedChain = Rc<RefCell<EpicycleChain>>;

/// Incremental spirograph render: one chain tick per step, plotting the
/// trace point onto the surface.
pub struct SpiroJob {
    chain: SharedChain,
    remaining: usize,
    color: ColorCycle,
    rainbow: bool,
}

impl SpiroJob {
    pub fn new(chain: SharedChain, ticks: usize, color: SpiroColor) -> Self {
        debug!(circles = chain.borrow().len(), ticks, "spirograph started");
        Self {
            chain,
            remaining: ticks,
            color: color.cycle(),
            rainbow: color == SpiroColor::Rainbow,
        }
    }
}

impl Job for SpiroJob {
    fn step(&mut self, surface: &mut dyn Surface) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        let point = self.chain.borrow_mut().tick();
        if self.rainbow {
            self.color.advance();
        }
        if let Some((x, y)) = point {
            surface.plot(x, y, self.color.color());
        }
        true
    }

    fn name(&self) -> &'static str {
        "spirograph"
    }
}
