/// End-to-end scenarios driving the engines through the scheduler
use fractart::escape::{self, ComplexViewport, EscapeKind, JuliaAnimation};
use fractart::ifs::{self, ChaosGame, FernJob, FernPreset, FernRequest};
use fractart::lsystem::{self, LSystemPreset, StrokeJob, TurtleConfig};
use fractart::raster::{Raster, Rgb, BACKGROUND};
use fractart::spirograph::{EpicycleChain, SpiroColor, SpiroJob, SpiroPreset};
use fractart::{Scheduler, Surface};
use rand::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Surface that only records what was plotted
struct Recorder {
    size: (usize, usize),
    writes: Vec<Rgb>,
}

impl Recorder {
    fn new(width: usize, height: usize) -> Self {
        Self {
            size: (width, height),
            writes: Vec::new(),
        }
    }
}

impl Surface for Recorder {
    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn plot(&mut self, _x: f64, _y: f64, color: Rgb) {
        self.writes.push(color);
    }
}

fn painted(raster: &Raster) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            if raster.get(x, y) != Some(BACKGROUND) {
                out.push((x, y));
            }
        }
    }
    out
}

#[test]
fn barnsley_fern_stays_in_its_bounding_box() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut game = ChaosGame::new(FernPreset::Barnsley.maps(), (40.0, 90.0), 8.0, (0, 128, 0));
    let mut canvas = Raster::new(100, 100);

    for _ in 0..10_000 {
        let write = game.step(rng.gen());
        canvas.plot(write.x, write.y, write.color);
        let point = game.point();
        assert!((-2.5..=2.8).contains(&point.x), "x = {}", point.x);
        assert!((0.0..=10.0).contains(&point.y), "y = {}", point.y);
    }

    assert!(painted(&canvas).len() > 500);
}

#[test]
fn stale_generation_never_writes_again() {
    let old: Rgb = (255, 0, 0);
    let new: Rgb = (0, 0, 255);
    let request = |color| FernRequest {
        maps: FernPreset::Barnsley.maps(),
        iterations: 5_000,
        origin: (50.0, 90.0),
        scale: 8.0,
        color,
    };

    let mut surface = Recorder::new(100, 100);
    let mut scheduler = Scheduler::new(100);
    let first = scheduler.schedule(FernJob::new(request(old), StdRng::seed_from_u64(1)));
    scheduler.tick(&mut surface);
    assert_eq!(surface.writes.len(), 100);

    let second = scheduler.invalidate();
    assert!(second > first);
    assert!(!scheduler.is_current(first));
    let cut = surface.writes.len();

    scheduler.schedule(FernJob::new(request(new), StdRng::seed_from_u64(2)));
    scheduler.run_to_completion(&mut surface);

    let after = &surface.writes[cut..];
    assert_eq!(after.len(), 5_000);
    assert!(after.iter().all(|&c| c == new));
}

#[test]
fn boot_scene_draws_both_tones() {
    let mut surface = Recorder::new(120, 120);
    let mut scheduler = Scheduler::new(5_000);
    for (i, request) in ifs::boot_scene(120, 120).into_iter().enumerate() {
        scheduler.schedule(FernJob::new(request, StdRng::seed_from_u64(i as u64)));
    }
    assert_eq!(scheduler.pending(), 2);
    scheduler.run_to_completion(&mut surface);

    let blue = surface.writes.iter().filter(|&&c| c == (0, 0, 255)).count();
    let green = surface.writes.iter().filter(|&&c| c == (0, 128, 0)).count();
    assert_eq!((blue, green), (10_000, 70_000));
}

#[test]
fn mandelbrot_is_symmetric_about_real_axis() {
    let viewport = ComplexViewport::initial(EscapeKind::Mandelbrot);
    let raster = escape::render(&viewport, None, EscapeKind::Mandelbrot.base_color(), 64, 64);

    for y in 1..64 {
        for x in 0..64 {
            assert_eq!(raster.get(x, y), raster.get(x, 64 - y), "pixel ({x}, {y})");
        }
    }
    // pixel (42, 32) is c = -0.03125, inside the main cardioid
    assert_eq!(raster.get(42, 32), Some((0, 0, 0)));
}

#[test]
fn zoomed_render_differs_from_opening_view() {
    let mut viewport = ComplexViewport::initial(EscapeKind::Julia);
    let c = Some(JuliaAnimation::default().c());
    let base = EscapeKind::Julia.base_color();
    let before = escape::render(&viewport, c, base, 48, 48);

    assert!(viewport.zoom_at(10.0, 30.0, 48, 48, EscapeKind::Julia.zoom_factor()));
    let after = escape::render(&viewport, c, base, 48, 48);
    assert_ne!(before, after);

    viewport.reset(EscapeKind::Julia);
    assert_eq!(viewport.scale, 1.65);
}

#[test]
fn julia_constant_stays_near_its_bounds() {
    let mut animation = JuliaAnimation::default();
    let step = (0.4 - 0.34) / 200.0;
    let mut reversals = 0;
    let mut direction = animation.direction();

    for _ in 0..1_000 {
        let c = animation.frame();
        assert!(c.re >= 0.34 - step - 1e-12 && c.re <= 0.4 + step + 1e-12);
        if animation.direction() != direction {
            reversals += 1;
            direction = animation.direction();
        }
    }
    assert!(reversals >= 3);
}

#[test]
fn dragon_curve_draws_onto_canvas() {
    let preset = LSystemPreset::Dragon;
    let commands = preset.grammar().generate(10);
    let turtle = TurtleConfig::for_canvas(preset, 10, 80, 80);
    let segments = lsystem::interpret(&commands, &turtle).unwrap();
    assert_eq!(segments.len(), 1 << 10);

    let fitted = lsystem::fit(&segments, 80, 80, 2.0);
    let mut canvas = Raster::new(80, 80);
    let mut scheduler = Scheduler::new(1);
    scheduler.schedule(StrokeJob::new(fitted, 64, (255, 255, 255)));

    // 1024 segments at 64 per step
    let mut frames = 0;
    while !scheduler.is_idle() {
        scheduler.tick(&mut canvas);
        frames += 1;
    }
    assert_eq!(frames, 17);
    assert!(painted(&canvas).len() > 200);
}

#[test]
fn tree_preset_is_balanced() {
    let preset = LSystemPreset::Tree;
    let commands = preset.grammar().generate(3);
    let opens = commands.matches('[').count();
    assert_eq!(opens, commands.matches(']').count());
    assert!(lsystem::interpret(&commands, &TurtleConfig::for_canvas(preset, 3, 100, 100)).is_ok());
}

#[test]
fn spirograph_trace_stays_inside_the_chain() {
    let (width, height) = (120, 120);
    let center = (60.0, 60.0);
    let root = width as f64 / 6.0;
    let chain = Rc::new(RefCell::new(EpicycleChain::new(center, root, SpiroPreset::Star.step_counts())));

    let mut canvas = Raster::new(width, height);
    let mut scheduler = Scheduler::new(1_000);
    scheduler.schedule(SpiroJob::new(Rc::clone(&chain), SpiroPreset::Star.ticks(), SpiroColor::White));
    scheduler.run_to_completion(&mut canvas);

    let reach = root + chain.borrow().circles()[1..].iter().map(|c| 2.0 * c.radius).sum::<f64>() + 1.0;
    let pixels = painted(&canvas);
    assert!(!pixels.is_empty());
    for (x, y) in pixels {
        let d = ((x as f64 + 0.5 - center.0).powi(2) + (y as f64 + 0.5 - center.1).powi(2)).sqrt();
        assert!(d <= reach, "pixel ({x}, {y}) at {d}");
    }
}
