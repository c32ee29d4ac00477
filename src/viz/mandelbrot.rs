//! Mandelbrot viewer: click to zoom, depth keys, reset

use crate::colors::scheme_rgb;
use crate::config::EscapeConfig;
use crate::help::show_help_modal;
use crate::terminal::{cell_to_pixel, Input, Terminal};
use super::{build_help, draw_status, VizState};
use crossterm::event::KeyCode;
use fractart::escape::{self, ComplexViewport, EscapeKind};
use fractart::Raster;
use std::io;
use tracing::debug;

const HELP_KEYS: &str = "\
 click   Zoom in at point
 +/-     Double/halve depth
 r       Reset view";

pub(super) fn viewport_from(config: &EscapeConfig) -> ComplexViewport {
    let initial = ComplexViewport::initial(config.kind);
    ComplexViewport::new(initial.center, initial.scale, config.threshold, config.depth)
}

/// Depth keys shared with the Julia viewer. Returns true if depth changed.
pub(super) fn adjust_depth(viewport: &mut ComplexViewport, code: KeyCode) -> bool {
    let depth = viewport.max_depth;
    match code {
        KeyCode::Char('+') | KeyCode::Char('=') => viewport.set_depth(depth.saturating_mul(2)),
        KeyCode::Char('-') => viewport.set_depth(depth / 2),
        _ => return false,
    }
    viewport.max_depth != depth
}

/// Run the Mandelbrot viewer
pub fn run(config: EscapeConfig) -> io::Result<()> {
    let mut term = Terminal::new(!config.view.print)?;
    let (mut width, mut height) = term.canvas_size();
    let mut viewport = viewport_from(&config);

    if config.view.print {
        term.blit(&escape::render(&viewport, None, config.color, width, height));
        term.print_to_stdout();
        return Ok(());
    }

    let help = build_help("MANDELBROT", HELP_KEYS);
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
                Input::Key(KeyCode::Char('r'), _) => {
                    viewport.reset(EscapeKind::Mandelbrot);
                    dirty = true;
                }
                Input::Key(code, mods) => {
                    if adjust_depth(&mut viewport, code) {
                        dirty = true;
                    } else if state.handle_key(code, mods) {
                        return Ok(());
                    }
                }
                Input::Click(column, row) => {
                    let (px, py) = cell_to_pixel(column, row);
                    let factor = EscapeKind::Mandelbrot.zoom_factor();
                    dirty |= viewport.zoom_at(px, py, width, height, factor);
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

        if dirty && !state.paused {
            let base = scheme_rgb(state.color_scheme, config.color);
            escape::render_into(&viewport, None, base, &mut canvas);
            debug!(
                re = viewport.center.re,
                im = viewport.center.im,
                scale = viewport.scale,
                depth = viewport.max_depth,
                "mandelbrot rendered"
            );
            dirty = false;
        }

        term.clear();
        term.blit(&canvas);
        let status = format!(
            "MANDELBROT  center {:.6}{:+.6}i  scale {:.3e}  depth {}",
            viewport.center.re, viewport.center.im, viewport.scale, viewport.max_depth
        );
        draw_status(&mut term, &state, &status);
        term.render()?;
        term.sleep(state.speed);
    }
}
