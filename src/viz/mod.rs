//! Fractal viewers
//!
//! Each viewer is its own module with a `run()` function.

pub mod fern;
pub mod julia;
pub mod lsystem;
pub mod mandelbrot;
pub mod spirograph;

use crate::colors::{scheme_color, SCHEME_NAMES};
use crate::terminal::Terminal;
use crossterm::event::{KeyCode, KeyModifiers};
use fractart::Scheduler;
use rand::prelude::*;

/// Runtime state for interactive controls (shared by all viewers)
pub struct VizState {
    pub speed: f32,        // Current speed (time per frame)
    pub color_scheme: u8,  // Current color scheme (0-9)
    pub paused: bool,
}

impl VizState {
    pub fn new(initial_speed: f32) -> Self {
        Self {
            speed: initial_speed,
            color_scheme: 0,
            paused: false,
        }
    }

    /// Handle keypress, returns true if should quit
    pub fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            // Number keys: change speed (1=fastest, 9=slowest, 0=very slow)
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.speed = match c.to_digit(10) {
                    Some(0) => 0.2,
                    Some(1) => 0.005,
                    Some(2) => 0.01,
                    Some(3) => 0.02,
                    Some(4) => 0.03,
                    Some(5) => 0.05,
                    Some(6) => 0.07,
                    Some(7) => 0.1,
                    Some(8) => 0.15,
                    Some(9) => 0.2,
                    _ => self.speed,
                };
            }
            // Shift+number produces symbols - use these for color schemes
            KeyCode::Char('!') => self.color_scheme = 1,  // Shift+1: fire
            KeyCode::Char('@') => self.color_scheme = 2,  // Shift+2: ice
            KeyCode::Char('#') => self.color_scheme = 3,  // Shift+3: pink
            KeyCode::Char('$') => self.color_scheme = 4,  // Shift+4: gold
            KeyCode::Char('%') => self.color_scheme = 5,  // Shift+5: electric
            KeyCode::Char('^') => self.color_scheme = 6,  // Shift+6: lava
            KeyCode::Char('&') => self.color_scheme = 7,  // Shift+7: mono
            KeyCode::Char('*') => self.color_scheme = 8,  // Shift+8: rainbow
            KeyCode::Char('(') => self.color_scheme = 9,  // Shift+9: neon
            KeyCode::Char(')') => self.color_scheme = 0,  // Shift+0: view default
            _ => {}
        }
        false
    }
}

/// Help section appended to every viewer's help text
pub const GLOBAL_HELP: &str = "\
───────────────────────
 Space   Pause/resume
 0-9     Frame delay (1=fast)
 !-()    Color scheme
 q/Esc   Quit
 ?       Close help
───────────────────────";

/// Build viewer help text from a title and its own key lines
pub fn build_help(title: &str, extra: &str) -> String {
    if extra.is_empty() {
        format!("{title}\n─────────────────\n{GLOBAL_HELP}")
    } else {
        format!("{title}\n─────────────────\n{extra}\n{GLOBAL_HELP}")
    }
}

/// Seeded RNG; without a seed the clock picks one
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0) // Fallback seed for misconfigured system clocks
    });
    StdRng::seed_from_u64(seed)
}

/// Pausing cancels in-flight work. Returns true when the view was just
/// resumed and has to start its drawing again.
pub fn apply_pause(scheduler: &mut Scheduler, was_paused: bool, state: &VizState) -> bool {
    match (was_paused, state.paused) {
        (false, true) => {
            scheduler.invalidate();
            false
        }
        (true, false) => true,
        _ => false,
    }
}

/// Write the status line on the last terminal row
pub fn draw_status(term: &mut Terminal, state: &VizState, text: &str) {
    let (width, height) = term.size();
    let row = height.saturating_sub(1) as i32;
    let scheme = SCHEME_NAMES[state.color_scheme as usize % SCHEME_NAMES.len()];
    let paused = if state.paused { "  [paused]" } else { "" };
    let line = format!(" {text}  scheme {scheme}{paused}  ? help");
    let (color, bold) = scheme_color(state.color_scheme, true);

    term.set_str(0, row, &" ".repeat(width as usize), None, false);
    term.set_str(0, row, &line, Some(color), bold);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_set_frame_delay() {
        let mut state = VizState::new(0.03);
        assert!(!state.handle_key(KeyCode::Char('1'), KeyModifiers::NONE));
        assert_eq!(state.speed, 0.005);
        state.handle_key(KeyCode::Char('0'), KeyModifiers::NONE);
        assert_eq!(state.speed, 0.2);
    }

    #[test]
    fn shifted_digits_pick_scheme() {
        let mut state = VizState::new(0.03);
        state.handle_key(KeyCode::Char('%'), KeyModifiers::SHIFT);
        assert_eq!(state.color_scheme, 5);
        state.handle_key(KeyCode::Char(')'), KeyModifiers::SHIFT);
        assert_eq!(state.color_scheme, 0);
    }

    #[test]
    fn quit_and_pause_keys() {
        let mut state = VizState::new(0.03);
        assert!(state.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(state.handle_key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!state.handle_key(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(state.paused);
    }

    #[test]
    fn help_includes_global_section() {
        let text = build_help("FERN", "n  Next preset");
        assert!(text.starts_with("FERN"));
        assert!(text.contains("n  Next preset"));
        assert!(text.contains(GLOBAL_HELP));
    }

    #[test]
    fn pause_cancels_jobs_and_resume_asks_for_redraw() {
        use fractart::ifs::{FernJob, FernPreset, FernRequest};

        let mut scheduler = Scheduler::new(10);
        let request = FernRequest {
            maps: FernPreset::Barnsley.maps(),
            iterations: 100,
            origin: (10.0, 20.0),
            scale: 2.0,
            color: (0, 128, 0),
        };
        scheduler.schedule(FernJob::new(request, StdRng::seed_from_u64(3)));
        let before = scheduler.generation();

        let mut state = VizState::new(0.03);
        state.handle_key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert!(!apply_pause(&mut scheduler, false, &state));
        assert!(scheduler.is_idle());
        assert!(scheduler.generation() > before);

        state.handle_key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert!(apply_pause(&mut scheduler, true, &state));
        assert!(!apply_pause(&mut scheduler, false, &state));
    }

    #[test]
    fn same_seed_same_sequence() {
        let a: u64 = seeded_rng(Some(7)).gen();
        let b: u64 = seeded_rng(Some(7)).gen();
        assert_eq!(a, b);
    }
}
