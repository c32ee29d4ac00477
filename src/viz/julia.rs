//! Julia viewer: animated constant, custom constant, click to zoom

use crate::colors::scheme_rgb;
use crate::config::EscapeConfig;
use crate::help::show_help_modal;
use crate::terminal::{cell_to_pixel, Input, Terminal};
use super::mandelbrot::{adjust_depth, viewport_from};
use super::{build_help, draw_status, VizState};
use crossterm::event::KeyCode;
use fractart::escape::{self, Complex, EscapeKind, JuliaAnimation, JuliaSession, DEFAULT_CUSTOM_C};
use fractart::Raster;
use std::io;
use tracing::debug;

const HELP_KEYS: &str = "\
 click   Zoom in at point
 Space   Pause/resume animation
 c       Use custom constant
 +/-     Double/halve depth
 r       Reset view";

fn session_from(config: &EscapeConfig) -> JuliaSession {
    let mut session = JuliaSession::new(viewport_from(config), JuliaAnimation::default());
    if let Some((re, im)) = config.custom_c {
        session.set_custom(Complex::new(re, im));
    }
    session
}

/// Run the Julia viewer
pub fn run(config: EscapeConfig) -> io::Result<()> {
    let mut term = Terminal::new(!config.view.print)?;
    let (mut width, mut height) = term.canvas_size();
    let mut session = session_from(&config);

    if config.view.print {
        let c = session.next_c();
        term.blit(&escape::render(&session.viewport, Some(c), config.color, width, height));
        term.print_to_stdout();
        return Ok(());
    }

    let help = build_help("JULIA", HELP_KEYS);
    let mut state = VizState::new(config.view.time_step);
    let mut canvas = Raster::new(width, height);
    let mut dirty = true;

    term.clear_screen()?;

    loop {
        let scheme = state.color_scheme;

        while let Some(input) = term.check_input()? {
            match input {
                Input::Key(KeyCode::Char('?'), _) => {
                    if show_help_modal(&mut term, &help)? {
                        return Ok(());
                    }
                }
                Input::Key(KeyCode::Char(' '), _) => {
                    session.toggle_pause();
                    dirty = true;
                }
                Input::Key(KeyCode::Char('c'), _) => {
                    let (re, im) = config.custom_c.unwrap_or((DEFAULT_CUSTOM_C.re, DEFAULT_CUSTOM_C.im));
                    session.set_custom(Complex::new(re, im));
                    dirty = true;
                }
                Input::Key(KeyCode::Char('r'), _) => {
                    session.reset();
                    dirty = true;
                }
                Input::Key(code, mods) => {
                    if adjust_depth(&mut session.viewport, code) {
                        dirty = true;
                    } else if state.handle_key(code, mods) {
                        return Ok(());
                    }
                }
                Input::Click(column, row) => {
                    let (px, py) = cell_to_pixel(column, row);
                    let factor = EscapeKind::Julia.zoom_factor();
                    dirty |= session.viewport.zoom_at(px, py, width, height, factor);
                }
                Input::Resize(w, h) => {
                    term.resize(w, h);
                    term.clear_screen()?;
                    (width, height) = term.canvas_size();
                    canvas = Raster::new(width, height);
                    dirty = true;
                }
            }
        }

        dirty |= state.color_scheme != scheme;
        state.paused = session.paused;

        if dirty || !session.paused {
            let c = session.next_c();
            let base = scheme_rgb(state.color_scheme, config.color);
            escape::render_into(&session.viewport, Some(c), base, &mut canvas);
            if dirty {
                debug!(re = c.re, im = c.im, scale = session.viewport.scale, "julia rendered");
            }
            dirty = false;
        }

        term.clear();
        term.blit(&canvas);
        let c = session.active_c();
        let mode = if session.custom.is_some() { "custom" } else { "animated" };
        let status = format!(
            "JULIA  c {:.4}{:+.4}i ({mode})  scale {:.3e}  depth {}",
            c.re, c.im, session.viewport.scale, session.viewport.max_depth
        );
        draw_status(&mut term, &state, &status);
        term.render()?;
        term.sleep(state.speed);
    }
}
