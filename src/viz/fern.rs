//! Chaos-game fern viewer: boot scene, click to plant, clear and preset cycling

use crate::colors::scheme_rgb;
use crate::config::FernConfig;
use crate::help::show_help_modal;
use crate::terminal::{cell_to_pixel, Input, Terminal};
use super::{apply_pause, build_help, draw_status, seeded_rng, VizState};
use crossterm::event::KeyCode;
use fractart::ifs::{self, AffineSet, FernJob, FernPreset, FernRequest, SLIDER_MAX, SLIDER_MIN};
use fractart::raster::{Raster, BACKGROUND};
use fractart::Scheduler;
use rand::prelude::*;
use std::io;
use tracing::{debug, warn};

const HELP_KEYS: &str = "\
 click   Plant a fern
 n       Next preset
 +/-     Fern size
 c       Clear canvas
 b       Replay boot scene";

/// Parse the user's coefficient table once. A rejected table is logged and
/// dropped.
fn user_table(config: &FernConfig) -> Option<AffineSet> {
    match ifs::parse_table(config.table.as_deref()?) {
        Ok(maps) => Some(maps),
        Err(e) => {
            warn!(error = %e, "coefficient table rejected, using {} preset", config.preset.name());
            None
        }
    }
}

/// The table replaces the configured preset's maps only.
fn maps_for(table: Option<&AffineSet>, configured: FernPreset, preset: FernPreset) -> AffineSet {
    match table {
        Some(maps) if preset == configured => *maps,
        _ => preset.maps(),
    }
}

fn plant(scheduler: &mut Scheduler, request: FernRequest, rng: &mut StdRng) {
    scheduler.schedule(FernJob::new(request, StdRng::seed_from_u64(rng.gen())));
}

fn boot(scheduler: &mut Scheduler, width: usize, height: usize, rng: &mut StdRng) {
    for request in ifs::boot_scene(width, height) {
        plant(scheduler, request, rng);
    }
}

/// Run the fern viewer
pub fn run(config: FernConfig) -> io::Result<()> {
    let mut rng = seeded_rng(config.view.seed);
    let mut term = Terminal::new(!config.view.print)?;
    let (mut width, mut height) = term.canvas_size();
    let mut canvas = Raster::new(width, height);
    let mut scheduler = Scheduler::new(config.steps_per_frame);

    if config.view.print {
        boot(&mut scheduler, width, height, &mut rng);
        scheduler.run_to_completion(&mut canvas);
        term.blit(&canvas);
        term.print_to_stdout();
        return Ok(());
    }

    let help = build_help("FERN", HELP_KEYS);
    let mut state = VizState::new(config.view.time_step);
    let mut preset = config.preset;
    let table = user_table(&config);
    let mut maps = maps_for(table.as_ref(), config.preset, preset);
    let mut slider = config.slider.clamp(SLIDER_MIN, SLIDER_MAX);

    term.clear_screen()?;
    boot(&mut scheduler, width, height, &mut rng);

    loop {
        let speed = state.speed;
        let paused = state.paused;

        while let Some(input) = term.check_input()? {
            match input {
                Input::Key(KeyCode::Char('?'), _) => {
                    if show_help_modal(&mut term, &help)? {
                        return Ok(());
                    }
                }
                Input::Key(KeyCode::Char('n'), _) => {
                    preset = preset.next();
                    maps = maps_for(table.as_ref(), config.preset, preset);
                    scheduler.invalidate();
                }
                Input::Key(KeyCode::Char('+'), _) | Input::Key(KeyCode::Char('='), _) => {
                    slider = (slider + 5).min(SLIDER_MAX);
                }
                Input::Key(KeyCode::Char('-'), _) => {
                    slider = slider.saturating_sub(5).max(SLIDER_MIN);
                }
                Input::Key(KeyCode::Char('c'), _) => {
                    scheduler.invalidate();
                    canvas.fill(BACKGROUND);
                }
                Input::Key(KeyCode::Char('b'), _) => {
                    scheduler.invalidate();
                    canvas.fill(BACKGROUND);
                    boot(&mut scheduler, width, height, &mut rng);
                }
                Input::Key(code, mods) => {
                    if state.handle_key(code, mods) {
                        return Ok(());
                    }
                }
                Input::Click(column, row) => {
                    let origin = cell_to_pixel(column, row);
                    if origin.0 < width as f64 && origin.1 < height as f64 {
                        let request = FernRequest {
                            maps,
                            iterations: config.iterations,
                            origin,
                            scale: ifs::user_scale(height, slider) * preset.scale_factor(),
                            color: scheme_rgb(state.color_scheme, config.color),
                        };
                        plant(&mut scheduler, request, &mut rng);
                    }
                }
                Input::Resize(w, h) => {
                    term.resize(w, h);
                    term.clear_screen()?;
                    (width, height) = term.canvas_size();
                    canvas = Raster::new(width, height);
                    scheduler.invalidate();
                    debug!(width, height, "fern canvas resized");
                }
            }
        }

        if state.speed != speed {
            scheduler.invalidate();
        }
        apply_pause(&mut scheduler, paused, &state);

        if !state.paused {
            scheduler.tick(&mut canvas);
        }

        term.clear();
        term.blit(&canvas);
        let status = format!(
            "FERN  {}  size {}  growing {}",
            preset.name(),
            slider,
            scheduler.pending()
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

    fn config(table: Option<&str>) -> FernConfig {
        FernConfig {
            view: ViewConfig { time_step: 0.03, seed: Some(1), print: true },
            preset: FernPreset::Cyclosorus,
            iterations: 100,
            slider: 20,
            color: (0, 200, 0),
            steps_per_frame: 10,
            table: table.map(str::to_string),
        }
    }

    #[test]
    fn bad_table_falls_back_to_preset() {
        let table = user_table(&config(Some("1 2 3")));
        assert!(table.is_none());
        for preset in [FernPreset::Cyclosorus, FernPreset::Tree, FernPreset::Barnsley] {
            assert_eq!(maps_for(table.as_ref(), FernPreset::Cyclosorus, preset), preset.maps());
        }
    }

    #[test]
    fn table_applies_only_to_configured_preset() {
        let table = "0 0 0 0.16 0 0 0.25\n0 0 0 0.16 0 0 0.25\n0 0 0 0.16 0 0 0.25\n0 0 0 0.16 0 0 0.25";
        let parsed = user_table(&config(Some(table)));
        let maps = maps_for(parsed.as_ref(), FernPreset::Cyclosorus, FernPreset::Cyclosorus);
        assert_eq!(maps[0].coefficient, [[0.0, 0.0], [0.0, 0.16]]);
        assert_eq!(maps_for(parsed.as_ref(), FernPreset::Cyclosorus, FernPreset::Tree), FernPreset::Tree.maps());
    }

    #[test]
    fn missing_table_uses_preset() {
        assert!(user_table(&config(None)).is_none());
        assert_eq!(maps_for(None, FernPreset::Cyclosorus, FernPreset::Cyclosorus), FernPreset::Cyclosorus.maps());
    }
}
