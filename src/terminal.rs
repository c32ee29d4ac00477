use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use fractart::Raster;
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: char = '▀';

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

/// Input the viewers react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Key(KeyCode, KeyModifiers),
    /// Left click at a cell (column, row)
    Click(u16, u16),
    Resize(u16, u16),
}

impl Terminal {
    /// Initialize the terminal for drawing. Interactive mode also captures
    /// the mouse so clicks can zoom or plant.
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        // Print mode may run with stdout redirected
        let (width, height) = if alternate_screen {
            size()?
        } else {
            size().unwrap_or((80, 24))
        };

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
        }

        let buffer = vec![vec![Cell::default(); width as usize]; height as usize];

        Ok(Self {
            width,
            height,
            buffer,
            alternate_screen,
        })
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Side of the square pixel canvas that fits the terminal. Each cell is
    /// one pixel wide and two tall; the last row is kept for the status line.
    pub fn canvas_size(&self) -> (usize, usize) {
        let side = (self.width as usize).min(self.height.saturating_sub(1) as usize * 2);
        (side, side)
    }

    /// Resize the back buffer after a terminal resize
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bg: None, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Copy a raster into the buffer as half-block cells, two pixel rows per
    /// cell row. Pixels beyond the buffer are dropped.
    pub fn blit(&mut self, raster: &Raster) {
        let rows = (raster.height() + 1) / 2;
        for cy in 0..rows.min(self.height as usize) {
            for cx in 0..raster.width().min(self.width as usize) {
                let top = raster.get(cx, cy * 2);
                let bottom = raster.get(cx, cy * 2 + 1);
                self.buffer[cy][cx] = Cell {
                    ch: HALF_BLOCK,
                    fg: top.map(|(r, g, b)| Color::Rgb { r, g, b }),
                    bg: bottom.map(|(r, g, b)| Color::Rgb { r, g, b }),
                    bold: false,
                };
            }
        }
    }

    /// Render the entire buffer to screen
    pub fn render(&self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, MoveTo(0, 0))?;

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(stdout, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(stdout, SetAttribute(Attribute::Bold))?;
                }
                if let Some(color) = cell.fg {
                    queue!(stdout, SetForegroundColor(color))?;
                }
                if let Some(color) = cell.bg {
                    queue!(stdout, SetBackgroundColor(color))?;
                }

                queue!(stdout, Print(cell.ch))?;

                if cell.fg.is_some() || cell.bg.is_some() {
                    queue!(stdout, ResetColor)?;
                }
                if cell.bold {
                    queue!(stdout, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        stdout.flush()?;
        Ok(())
    }

    /// Check for input (non-blocking)
    pub fn check_input(&self) -> io::Result<Option<Input>> {
        if poll(Duration::from_millis(0))? {
            return Ok(match read()? {
                Event::Key(key_event) => Some(Input::Key(key_event.code, key_event.modifiers)),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => Some(Input::Click(mouse.column, mouse.row)),
                    _ => None,
                },
                Event::Resize(w, h) => Some(Input::Resize(w, h)),
                _ => None,
            });
        }
        Ok(None)
    }

    /// Wait for a keypress with timeout
    pub fn wait_key(&self, timeout_ms: u64) -> io::Result<Option<KeyCode>> {
        if poll(Duration::from_millis(timeout_ms))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some(key_event.code));
            }
        }
        Ok(None)
    }

    /// Sleep for specified duration. Negative or non-finite delays do not sleep.
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::try_from_secs_f32(seconds).unwrap_or_default());
    }

    /// Print buffer to stdout with ANSI colors (for print mode)
    pub fn print_to_stdout(&self) {
        for row in &self.buffer {
            for cell in row {
                if cell.ch == ' ' && cell.bg.is_none() {
                    print!(" ");
                    continue;
                }

                if cell.bold {
                    print!("\x1b[1m");
                }
                if let Some(Color::Rgb { r, g, b }) = cell.fg {
                    print!("\x1b[38;2;{};{};{}m", r, g, b);
                }
                if let Some(Color::Rgb { r, g, b }) = cell.bg {
                    print!("\x1b[48;2;{};{};{}m", r, g, b);
                }

                print!("{}", cell.ch);
                print!("\x1b[0m");
            }
            println!();
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Map a clicked cell to the pixel at its top half.
pub fn cell_to_pixel(column: u16, row: u16) -> (f64, f64) {
    (column as f64 + 0.5, row as f64 * 2.0 + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_maps_to_upper_pixel_of_cell() {
        assert_eq!(cell_to_pixel(0, 0), (0.5, 0.5));
        assert_eq!(cell_to_pixel(3, 2), (3.5, 4.5));
    }
}
