//! Escape-time rendering of the Mandelbrot and Julia sets.
//!
//! Every pixel is mapped to a point of the complex plane through the
//! viewport, `z ← z² + c` is iterated until `|z|` passes the divergence
//! threshold or the depth runs out, and the iteration count is turned into a
//! shade of the base colour. The whole frame is written into one packed
//! raster and blitted once.

use crate::mapping::map;
use crate::raster::{Raster, Rgb};
use tracing::{debug, trace};

pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub const fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    #[inline]
    pub fn abs_sq(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    pub fn square_add(&self, c: Complex) -> Complex {
        Complex::new(
            self.re * self.re - self.im * self.im + c.re,
            2.0 * self.re * self.im + c.im,
        )
    }
}

/// Which escape-time set a viewport is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    Mandelbrot,
    Julia,
}

impl EscapeKind {
    /// Factor applied to the viewport scale on every zoom click.
    pub fn zoom_factor(self) -> f64 {
        match self {
            EscapeKind::Mandelbrot => 0.9,
            EscapeKind::Julia => 0.8,
        }
    }

    pub fn base_color(self) -> Rgb {
        match self {
            EscapeKind::Mandelbrot => (255, 0, 255),
            EscapeKind::Julia => (255, 174, 0),
        }
    }
}

/// Window onto the complex plane plus the iteration parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexViewport {
    pub center: Complex,
    /// Half-width of the visible square.
    pub scale: f64,
    pub divergence_threshold: f64,
    pub max_depth: u32,
}

impl ComplexViewport {
    pub fn new(center: Complex, scale: f64, divergence_threshold: f64, max_depth: u32) -> Self {
        Self {
            center,
            scale,
            divergence_threshold,
            max_depth: max_depth.clamp(MIN_DEPTH, MAX_DEPTH),
        }
    }

    /// Opening view for each set.
    pub fn initial(kind: EscapeKind) -> Self {
        match kind {
            EscapeKind::Mandelbrot => Self::new(Complex::new(-0.5, 0.0), 1.5, 50.0, 100),
            EscapeKind::Julia => Self::new(Complex::ZERO, 1.7, 50.0, 100),
        }
    }

    /// View restored by the reset action. Threshold and depth are kept.
    pub fn reset(&mut self, kind: EscapeKind) {
        let (center, scale) = match kind {
            EscapeKind::Mandelbrot => (Complex::new(-0.5, 0.0), 1.5),
            EscapeKind::Julia => (Complex::ZERO, 1.65),
        };
        self.center = center;
        self.scale = scale;
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.max_depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
    }

    pub fn escape_value(&self) -> f64 {
        self.divergence_threshold * self.divergence_threshold
    }

    /// Complex coordinate of pixel `(px, py)` on a `width × height` raster.
    #[inline]
    pub fn pixel_to_complex(&self, px: f64, py: f64, width: usize, height: usize) -> Complex {
        Complex::new(
            map(px, 0.0, width as f64, self.center.re - self.scale, self.center.re + self.scale),
            map(py, 0.0, height as f64, self.center.im - self.scale, self.center.im + self.scale),
        )
    }

    /// Zoom by `factor` keeping the clicked point fixed on screen. Clicks
    /// outside the raster are ignored and return `false`.
    pub fn zoom_at(&mut self, px: f64, py: f64, width: usize, height: usize, factor: f64) -> bool {
        if px < 0.0 || py < 0.0 || px > width as f64 || py > height as f64 {
            return false;
        }
        let mapped = self.pixel_to_complex(px, py, width, height);
        self.center = Complex::new(
            mapped.re - (mapped.re - self.center.re) * factor,
            mapped.im - (mapped.im - self.center.im) * factor,
        );
        self.scale *= factor;
        debug!(
            re = self.center.re,
            im = self.center.im,
            scale = self.scale,
            "viewport zoomed"
        );
        true
    }
}

/// Number of iterations completed before `|z|² > escape_value`, or
/// `max_depth` if the orbit never escapes.
#[inline]
pub fn escape_count(z0: Complex, c: Complex, max_depth: u32, escape_value: f64) -> u32 {
    let mut z = z0;
    let mut count = 0;
    while count < max_depth {
        z = z.square_add(c);
        if z.abs_sq() > escape_value {
            break;
        }
        count += 1;
    }
    count
}

/// Colour for an escape count: black inside the set, otherwise the base
/// colour scaled by `sqrt(count / max_depth)`.
#[inline]
pub fn shade(count: u32, max_depth: u32, base: Rgb) -> Rgb {
    if count >= max_depth {
        return (0, 0, 0);
    }
    let intensity = (count as f64 / max_depth as f64).sqrt();
    let channel = |v: u8| (intensity * v as f64).round().clamp(0.0, 255.0) as u8;
    (channel(base.0), channel(base.1), channel(base.2))
}

/// Render into an existing raster. `c = None` draws the Mandelbrot set
/// (z₀ = 0, c = pixel); `Some(c)` draws the Julia set for that constant.
pub fn render_into(viewport: &ComplexViewport, c: Option<Complex>, base: Rgb, raster: &mut Raster) {
    let width = raster.width();
    let height = raster.height();
    let escape_value = viewport.escape_value();
    let depth = viewport.max_depth;

    for py in 0..height {
        for px in 0..width {
            let point = viewport.pixel_to_complex(px as f64, py as f64, width, height);
            let count = match c {
                None => escape_count(Complex::ZERO, point, depth, escape_value),
                Some(c) => escape_count(point, c, depth, escape_value),
            };
            raster.set(px, py, shade(count, depth, base));
        }
    }
    trace!(width, height, depth, julia = c.is_some(), "escape-time frame rendered");
}

pub fn render(viewport: &ComplexViewport, c: Option<Complex>, base: Rgb, width: usize, height: usize) -> Raster {
    let mut raster = Raster::new(width, height);
    render_into(viewport, c, base, &mut raster);
    raster
}

/// Julia constant walking back and forth across a rectangle of the complex
/// plane, one step per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JuliaAnimation {
    real: (f64, f64),
    imag: (f64, f64),
    step: Complex,
    c: Complex,
    direction: f64,
}

impl JuliaAnimation {
    pub fn new(real: (f64, f64), real_steps: u32, imag: (f64, f64), imag_steps: u32, start: Complex) -> Self {
        Self {
            real,
            imag,
            step: Complex::new(
                (real.1 - real.0) / real_steps.max(1) as f64,
                (imag.1 - imag.0) / imag_steps.max(1) as f64,
            ),
            c: start,
            direction: 1.0,
        }
    }

    pub fn c(&self) -> Complex {
        self.c
    }

    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Return the constant for this frame and move to the next one. The
    /// direction reverses as soon as either component leaves its bounds.
    pub fn frame(&mut self) -> Complex {
        let current = self.c;
        self.c.re += self.step.re * self.direction;
        self.c.im += self.step.im * self.direction;

        let above = self.c.re > self.real.1 || self.c.im > self.imag.1;
        let below = self.c.re < self.real.0 || self.c.im < self.imag.0;
        if above || below {
            self.direction = -self.direction;
        }
        current
    }
}

impl Default for JuliaAnimation {
    fn default() -> Self {
        Self::new((0.34, 0.4), 200, (0.34, 0.4), 200, Complex::new(0.34, 0.34))
    }
}

pub const DEFAULT_CUSTOM_C: Complex = Complex::new(0.28, 0.01);

/// Julia view state: viewport, animated constant and an optional fixed
/// user constant.
#[derive(Debug, Clone)]
pub struct JuliaSession {
    pub viewport: ComplexViewport,
    pub animation: JuliaAnimation,
    pub custom: Option<Complex>,
    pub paused: bool,
    start_viewport: ComplexViewport,
}

impl JuliaSession {
    pub fn new(viewport: ComplexViewport, animation: JuliaAnimation) -> Self {
        Self {
            viewport,
            animation,
            custom: None,
            paused: false,
            start_viewport: viewport,
        }
    }

    /// Constant for the next frame. Advances the animation unless it is
    /// paused or a custom constant is active.
    pub fn next_c(&mut self) -> Complex {
        match self.custom {
            Some(c) => c,
            None if self.paused => self.animation.c(),
            None => self.animation.frame(),
        }
    }

    /// Constant currently on screen, without advancing anything.
    pub fn active_c(&self) -> Complex {
        self.custom.unwrap_or_else(|| self.animation.c())
    }

    /// Fix the constant to `c`. This pauses the animation and restores the
    /// opening view.
    pub fn set_custom(&mut self, c: Complex) {
        self.custom = Some(c);
        self.paused = true;
        self.viewport.center = self.start_viewport.center;
        self.viewport.scale = self.start_viewport.scale;
        debug!(re = c.re, im = c.im, "custom julia constant");
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.custom = None;
        self.viewport.reset(EscapeKind::Julia);
    }

    /// Resume the animation from the start-of-animation view.
    pub fn resume(&mut self) {
        self.paused = false;
        self.custom = None;
        self.viewport.center = self.start_viewport.center;
        self.viewport.scale = self.start_viewport.scale;
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn reset(&mut self) {
        self.viewport.reset(EscapeKind::Julia);
    }
}

impl Default for JuliaSession {
    fn default() -> Self {
        Self::new(ComplexViewport::initial(EscapeKind::Julia), JuliaAnimation::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes_mandelbrot() {
        for depth in [1, 2, 10, 100, 1000] {
            assert_eq!(escape_count(Complex::ZERO, Complex::ZERO, depth, 4.0), depth);
        }
    }

    #[test]
    fn far_point_escapes_immediately() {
        assert_eq!(escape_count(Complex::ZERO, Complex::new(2.0, 2.0), 100, 4.0), 0);
    }

    #[test]
    fn julia_uses_pixel_as_start() {
        // z0 = 3 escapes on the first step for any small c
        assert_eq!(escape_count(Complex::new(3.0, 0.0), Complex::new(0.1, 0.1), 50, 4.0), 0);
        assert_eq!(escape_count(Complex::ZERO, Complex::ZERO, 50, 4.0), 50);
    }

    #[test]
    fn shade_is_black_inside_and_sqrt_outside() {
        assert_eq!(shade(100, 100, (255, 174, 0)), (0, 0, 0));
        assert_eq!(shade(0, 100, (255, 174, 0)), (0, 0, 0));
        assert_eq!(shade(25, 100, (200, 100, 0)), (100, 50, 0));
    }

    #[test]
    fn pixel_mapping_spans_viewport() {
        let vp = ComplexViewport::new(Complex::new(-0.5, 0.0), 1.5, 2.0, 10);
        let tl = vp.pixel_to_complex(0.0, 0.0, 100, 100);
        assert_eq!((tl.re, tl.im), (-2.0, -1.5));
        let mid = vp.pixel_to_complex(50.0, 50.0, 100, 100);
        assert!((mid.re + 0.5).abs() < 1e-12 && mid.im.abs() < 1e-12);
    }

    #[test]
    fn zoom_keeps_clicked_point_fixed() {
        let mut vp = ComplexViewport::initial(EscapeKind::Mandelbrot);
        let before = vp.pixel_to_complex(30.0, 70.0, 100, 100);
        assert!(vp.zoom_at(30.0, 70.0, 100, 100, 0.9));
        let after = vp.pixel_to_complex(30.0, 70.0, 100, 100);
        assert!((before.re - after.re).abs() < 1e-12);
        assert!((before.im - after.im).abs() < 1e-12);
        assert!((vp.scale - 1.35).abs() < 1e-12);
    }

    #[test]
    fn zoom_outside_raster_is_ignored() {
        let mut vp = ComplexViewport::initial(EscapeKind::Julia);
        let before = vp;
        assert!(!vp.zoom_at(101.0, 5.0, 100, 100, 0.8));
        assert_eq!(vp, before);
    }

    #[test]
    fn render_marks_center_of_mandelbrot_black() {
        let mut vp = ComplexViewport::initial(EscapeKind::Mandelbrot);
        vp.center = Complex::ZERO;
        let raster = render(&vp, None, (255, 0, 255), 21, 21);
        // pixel (10.5, 10.5) is complex 0; pixel 10 sits just left/above it
        assert_eq!(raster.get(10, 10), Some((0, 0, 0)));
        // the far corner (-1.5, -1.5) escapes quickly and is tinted
        let corner = raster.get(0, 0).unwrap();
        assert_ne!(corner, (0, 0, 0));
        assert_eq!(corner.1, 0);
    }

    #[test]
    fn depth_is_clamped() {
        let mut vp = ComplexViewport::initial(EscapeKind::Mandelbrot);
        vp.set_depth(0);
        assert_eq!(vp.max_depth, MIN_DEPTH);
        vp.set_depth(1_000_000);
        assert_eq!(vp.max_depth, MAX_DEPTH);
    }

    #[test]
    fn animation_bounces_between_bounds() {
        let mut anim = JuliaAnimation::new((0.0, 1.0), 4, (0.0, 1.0), 4, Complex::ZERO);
        let seen: Vec<f64> = (0..12).map(|_| anim.frame().re).collect();
        assert!(seen.iter().all(|&r| (-0.25..=1.25).contains(&r)));
        assert_eq!(seen[0], 0.0);
        // it climbs first, then turns around
        assert!(seen[3] > seen[1]);
        let peak = seen.iter().cloned().fold(f64::MIN, f64::max);
        let peak_at = seen.iter().position(|&r| r == peak).unwrap();
        assert!(seen[peak_at + 1] < peak);
    }

    #[test]
    fn paused_session_holds_constant() {
        let mut session = JuliaSession::default();
        let first = session.next_c();
        session.pause();
        let held = session.next_c();
        assert_eq!(held, session.next_c());
        assert_ne!(first, held);
    }

    #[test]
    fn resume_restores_start_viewport() {
        let mut session = JuliaSession::default();
        session.viewport.zoom_at(10.0, 10.0, 100, 100, 0.8);
        session.pause();
        session.resume();
        assert_eq!(session.viewport, ComplexViewport::initial(EscapeKind::Julia));
    }

    #[test]
    fn custom_constant_wins() {
        let mut session = JuliaSession::default();
        session.set_custom(DEFAULT_CUSTOM_C);
        assert_eq!(session.next_c(), DEFAULT_CUSTOM_C);
        assert_eq!(session.active_c(), DEFAULT_CUSTOM_C);
        assert!(session.paused);
    }
}
