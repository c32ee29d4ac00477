//! Spirograph viewer: accumulated trace with the circle chain drawn on top

use crate::config::SpiroConfig;
use crate::help::show_help_modal;
use crate::terminal::{Input, Terminal};
use super::{apply_pause, build_help, draw_status, VizState};
use crossterm::event::KeyCode;
use fractart::raster::{Raster, Rgb, BACKGROUND};
use fractart::spirograph::{self, EpicycleChain, SharedChain, SpiroColor, SpiroJob, SpiroPreset, MAX_STEP_COUNT};
use fractart::{Scheduler, Surface};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use tracing::debug;

const HELP_KEYS: &str = "\
 n       Next preset
 c       Next trace colour
 o       Toggle circles
 +/-     Ticks per frame
 r       Restart";

const OVERLAY: Rgb = (90, 90, 110);

/// Which chain is drawn: a preset or the custom step counts
#[derive(Clone, Copy)]
enum Figure {
    Preset(SpiroPreset),
    Custom,
}

struct Pattern {
    figure: Figure,
    custom: Vec<u32>,
    color: SpiroColor,
}

impl Pattern {
    fn new(config: &SpiroConfig) -> Self {
        let custom = config
            .custom_steps
            .as_deref()
            .map(|values| spirograph::custom_steps(values, config.circles))
            .unwrap_or_default();
        Self {
            figure: if custom.is_empty() { Figure::Preset(config.preset) } else { Figure::Custom },
            custom,
            color: config.color,
        }
    }

    fn steps_and_ticks(&self) -> (&[u32], usize) {
        match self.figure {
            Figure::Preset(preset) => (preset.step_counts(), preset.ticks()),
            Figure::Custom => (self.custom.as_slice(), MAX_STEP_COUNT as usize),
        }
    }

    fn name(&self) -> &'static str {
        match self.figure {
            Figure::Preset(preset) => preset.name(),
            Figure::Custom => "custom",
        }
    }

    /// Double the ticks per frame, capped at one whole figure per frame.
    fn faster(&self, per_tick: usize) -> usize {
        per_tick.saturating_mul(2).min(self.steps_and_ticks().1.max(1))
    }

    fn next_preset(&mut self) {
        self.figure = match self.figure {
            Figure::Preset(preset) => Figure::Preset(preset.next()),
            Figure::Custom => Figure::Preset(SpiroPreset::ALL[0]),
        };
    }
}

/// Cancel the running figure, clear the trace and start the pattern anew.
fn restart(scheduler: &mut Scheduler, trace: &mut Raster, pattern: &Pattern) -> SharedChain {
    scheduler.invalidate();
    trace.fill(BACKGROUND);

    let (width, height) = trace.size();
    let (steps, ticks) = pattern.steps_and_ticks();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let chain = Rc::new(RefCell::new(EpicycleChain::new(center, width as f64 / 6.0, steps)));
    scheduler.schedule(SpiroJob::new(Rc::clone(&chain), ticks, pattern.color));
    debug!(pattern = pattern.name(), circles = steps.len(), ticks, "spirograph restarted");
    chain
}

/// Run the spirograph viewer
pub fn run(config: SpiroConfig) -> io::Result<()> {
    let mut term = Terminal::new(!config.view.print)?;
    let (width, height) = term.canvas_size();
    let mut trace = Raster::new(width, height);
    let mut scheduler = Scheduler::new(config.speed.max(1));
    let mut pattern = Pattern::new(&config);
    let mut chain = restart(&mut scheduler, &mut trace, &pattern);

    if config.view.print {
        scheduler.run_to_completion(&mut trace);
        term.blit(&trace);
        term.print_to_stdout();
        return Ok(());
    }

    let help = build_help("SPIROGRAPH", HELP_KEYS);
    let mut state = VizState::new(config.view.time_step);
    let mut frame = trace.clone();
    let mut show_circles = config.show_circles;

    term.clear_screen()?;

    loop {
        let speed = state.speed;
        let paused = state.paused;
        let mut stale = false;

        while let Some(input) = term.check_input()? {
            match input {
                Input::Key(KeyCode::Char('?'), _) => {
                    if show_help_modal(&mut term, &help)? {
                        return Ok(());
                    }
                }
                Input::Key(KeyCode::Char('n'), _) => {
                    pattern.next_preset();
                    stale = true;
                }
                Input::Key(KeyCode::Char('c'), _) => {
                    pattern.color = pattern.color.next();
                    stale = true;
                }
                Input::Key(KeyCode::Char('o'), _) => show_circles = !show_circles,
                Input::Key(KeyCode::Char('+'), _) | Input::Key(KeyCode::Char('='), _) => {
                    scheduler.set_steps_per_tick(pattern.faster(scheduler.steps_per_tick()));
                    stale = true;
                }
                Input::Key(KeyCode::Char('-'), _) => {
                    scheduler.set_steps_per_tick(scheduler.steps_per_tick() / 2);
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
                    trace = Raster::new(width, height);
                    frame = trace.clone();
                    stale = true;
                }
            }
        }

        stale |= apply_pause(&mut scheduler, paused, &state);
        if stale || state.speed != speed {
            chain = restart(&mut scheduler, &mut trace, &pattern);
        }

        if !state.paused {
            scheduler.tick(&mut trace);
        }

        frame.blit(&trace);
        if show_circles {
            chain.borrow().draw_circles(&mut frame, OVERLAY);
        }

        term.clear();
        term.blit(&frame);
        let status = format!(
            "SPIROGRAPH  {}  {}  {} ticks/frame{}",
            pattern.name(),
            pattern.color.name(),
            scheduler.steps_per_tick(),
            if scheduler.is_idle() { "  done" } else { "" }
        );
        draw_status(&mut term, &state, &status);
        term.render()?;
        term.sleep(state.speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;

    fn config(custom_steps: Option<Vec<Option<u32>>>) -> SpiroConfig {
        SpiroConfig {
            view: ViewConfig { time_step: 0.03, seed: None, print: true },
            preset: SpiroPreset::Star,
            custom_steps,
            circles: 3,
            color: SpiroColor::Rainbow,
            speed: 100,
            show_circles: true,
        }
    }

    #[test]
    fn custom_steps_are_clamped_and_filled() {
        let pattern = Pattern::new(&config(Some(vec![Some(5), None, Some(90_000)])));
        let (steps, ticks) = pattern.steps_and_ticks();
        assert_eq!(steps, &[10u32, 1_000, 40_000]);
        assert_eq!(ticks, 40_000);
        assert_eq!(pattern.name(), "custom");
    }

    #[test]
    fn speed_up_saturates_at_figure_length() {
        let pattern = Pattern::new(&config(Some(vec![Some(100)])));
        assert_eq!(pattern.faster(200), 400);
        assert_eq!(pattern.faster(30_000), MAX_STEP_COUNT as usize);
        assert_eq!(pattern.faster(usize::MAX), MAX_STEP_COUNT as usize);

        let mut per_tick = 1;
        for _ in 0..100 {
            per_tick = pattern.faster(per_tick);
        }
        assert_eq!(per_tick, MAX_STEP_COUNT as usize);
    }

    #[test]
    fn next_preset_leaves_custom_mode() {
        let mut pattern = Pattern::new(&config(Some(vec![Some(100)])));
        pattern.next_preset();
        assert_eq!(pattern.name(), SpiroPreset::ALL[0].name());
        assert_eq!(pattern.steps_and_ticks().0, SpiroPreset::ALL[0].step_counts());
    }

    #[test]
    fn restart_drops_running_figure() {
        let pattern = Pattern::new(&config(None));
        let mut trace = Raster::new(40, 40);
        let mut scheduler = Scheduler::new(10);
        let first = restart(&mut scheduler, &mut trace, &pattern);
        scheduler.tick(&mut trace);
        let before = first.borrow().circles()[0].angle;

        let second = restart(&mut scheduler, &mut trace, &pattern);
        scheduler.tick(&mut trace);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(first.borrow().circles()[0].angle, before);
        assert!(second.borrow().circles()[0].angle > 0.0);
    }
}
