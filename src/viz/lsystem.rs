//! L-system viewer: progressive stroke drawing with generation and angle keys

use crate::colors::scheme_rgb;
use crate::config::LSystemConfig;
use crate::help::show_help_modal;
use crate::terminal::{Input, Terminal};
use super::{apply_pause, build_help, draw_status, VizState};
use crossterm::event::KeyCode;
use fractart::lsystem::{self, LSystemPreset, Segment, StrokeJob, TurtleConfig};
use fractart::raster::{Raster, Rgb, BACKGROUND};
use fractart::{Result, Scheduler};
use std::io;
use tracing::{debug, warn};

const HELP_KEYS: &str = "\
 n       Next preset
 +/-     Generations
 </>     Turn angle -/+5°
 r       Redraw";

/// Margin in pixels kept around the fitted drawing
const MARGIN: f64 = 2.0;

/// What is currently drawn
struct Drawing {
    preset: LSystemPreset,
    generations: u32,
    angle: f64,  // radians
}

impl Drawing {
    fn new(config: &LSystemConfig) -> Self {
        Self {
            preset: config.preset,
            generations: config.preset.clamp_generations(config.generations),
            angle: config
                .angle
                .map(f64::to_radians)
                .unwrap_or_else(|| config.preset.default_angle()),
        }
    }

    fn switch_preset(&mut self) {
        self.preset = self.preset.next();
        self.generations = self.preset.default_generations();
        self.angle = self.preset.default_angle();
    }

    /// Expand, interpret and fit into the canvas
    fn segments(&self, width: usize, height: usize) -> Result<Vec<Segment>> {
        let commands = self.preset.grammar().generate(self.generations);
        let turtle = TurtleConfig {
            angle_increment: self.angle,
            ..TurtleConfig::for_canvas(self.preset, self.generations, width, height)
        };
        let segments = lsystem::interpret(&commands, &turtle)?;
        Ok(lsystem::fit(&segments, width, height, MARGIN))
    }
}

/// Cancel what is drawing and start over. On error the last frame stays.
fn redraw(
    scheduler: &mut Scheduler,
    canvas: &mut Raster,
    drawing: &Drawing,
    per_step: usize,
    color: Rgb,
) {
    scheduler.invalidate();
    match drawing.segments(canvas.width(), canvas.height()) {
        Ok(segments) => {
            debug!(
                preset = drawing.preset.name(),
                generations = drawing.generations,
                segments = segments.len(),
                "l-system drawing"
            );
            canvas.fill(BACKGROUND);
            scheduler.schedule(StrokeJob::new(segments, per_step, color));
        }
        Err(e) => warn!(error = %e, "l-system drawing failed"),
    }
}

/// Run the L-system viewer
pub fn run(config: LSystemConfig) -> io::Result<()> {
    let mut term = Terminal::new(!config.view.print)?;
    let (width, height) = term.canvas_size();
    let mut canvas = Raster::new(width, height);
    let mut scheduler = Scheduler::new(1);
    let mut drawing = Drawing::new(&config);

    if config.view.print {
        redraw(&mut scheduler, &mut canvas, &drawing, config.segments_per_frame, config.color);
        scheduler.run_to_completion(&mut canvas);
        term.blit(&canvas);
        term.print_to_stdout();
        return Ok(());
    }

    let help = build_help("L-SYSTEM", HELP_KEYS);
    let mut state = VizState::new(config.view.time_step);
    let mut stale = true;

    term.clear_screen()?;

    loop {
        let speed = state.speed;
        let scheme = state.color_scheme;
        let paused = state.paused;

        while let Some(input) = term.check_input()? {
            match input {
                Input::Key(KeyCode::Char('?'), _) => {
                    if show_help_modal(&mut term, &help)? {
                        return Ok(());
                    }
                }
                Input::Key(KeyCode::Char('n'), _) => {
                    drawing.switch_preset();
                    stale = true;
                }
                Input::Key(KeyCode::Char('+'), _) | Input::Key(KeyCode::Char('='), _) => {
                    drawing.generations = drawing.preset.clamp_generations(drawing.generations + 1);
                    stale = true;
                }
                Input::Key(KeyCode::Char('-'), _) => {
                    drawing.generations = drawing.generations.saturating_sub(1);
                    stale = true;
                }
                Input::Key(KeyCode::Char('<'), _) => {
                    drawing.angle -= 5f64.to_radians();
                    stale = true;
                }
                Input::Key(KeyCode::Char('>'), _) => {
                    drawing.angle += 5f64.to_radians();
                    stale = true;
                }
                Input::Key(KeyCode::Char('r'), _) => stale = true,
                Input::Key(code, mods) => {
                    if state.handle_key(code, mods) {
                        return Ok(());
                    }
                }
                Input::Click(..) => {}
                Input::Resize(w, h) => {
                    term.resize(w, h);
                    term.clear_screen()?;
                    let (width, height) = term.canvas_size();
                    canvas = Raster::new(width, height);
                    stale = true;
                }
            }
        }

        stale |= state.speed != speed || state.color_scheme != scheme;
        stale |= apply_pause(&mut scheduler, paused, &state);

        if stale {
            let color = scheme_rgb(state.color_scheme, config.color);
            redraw(&mut scheduler, &mut canvas, &drawing, config.segments_per_frame, color);
            stale = false;
        }

        if !state.paused {
            scheduler.tick(&mut canvas);
        }

        term.clear();
        term.blit(&canvas);
        let status = format!(
            "L-SYSTEM  {}  generations {}  angle {:.1}°{}",
            drawing.preset.name(),
            drawing.generations,
            drawing.angle.to_degrees(),
            if scheduler.is_idle() { "" } else { "  drawing" }
        );
        draw_status(&mut term, &state, &status);
        term.render()?;
        term.sleep(state.speed);
    }
}
