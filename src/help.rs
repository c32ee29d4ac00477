use crate::terminal::Terminal;
use crossterm::cursor::MoveTo;
use crossterm::event::KeyCode;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::queue;
use std::io::{self, stdout, Write};

/// Placement of the help box on screen
#[derive(Debug, PartialEq)]
struct HelpBox {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    text_width: usize,
}

/// Centre a box around `help_text`, with 2 chars of padding each side and
/// one row top and bottom.
fn layout(width: u16, height: u16, help_text: &str) -> HelpBox {
    let lines = help_text.lines().count();
    let text_width = help_text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = text_width + 4;
    let box_height = lines + 2;
    HelpBox {
        x: (width as usize).saturating_sub(box_width) / 2,
        y: (height as usize).saturating_sub(box_height) / 2,
        width: box_width,
        height: box_height,
        text_width,
    }
}

/// Show a modal help overlay without modifying the back buffer.
/// Returns true if the user requested quit (q/Esc) while the overlay is open.
pub fn show_help_modal(term: &mut Terminal, help_text: &str) -> io::Result<bool> {
    if help_text.is_empty() {
        return Ok(false);
    }

    let (width, height) = term.size();
    render_help_overlay_direct(&layout(width, height, help_text), help_text)?;

    loop {
        if let Some(code) = term.wait_key(50)? {
            match code {
                KeyCode::Char('?') => break,
                KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                _ => {}
            }
        }
    }

    // Restore previous frame from back buffer.
    term.render()?;
    Ok(false)
}

fn render_help_overlay_direct(frame: &HelpBox, help_text: &str) -> io::Result<()> {
    let border_color = Color::White;
    let text_color = Color::Grey;
    let (x0, y0) = (frame.x as u16, frame.y as u16);
    let right = (frame.x + frame.width - 1) as u16;
    let rule = "─".repeat(frame.width - 2);

    let mut out = stdout();

    queue!(out, MoveTo(x0, y0), SetForegroundColor(border_color), Print(format!("┌{rule}┐")))?;

    for (i, line) in help_text.lines().enumerate() {
        let y = y0 + 1 + i as u16;
        let padding = frame.text_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));

        queue!(out, MoveTo(x0, y), SetForegroundColor(border_color), Print('│'))?;
        queue!(out, SetForegroundColor(text_color), Print(padded))?;
        queue!(out, MoveTo(right, y), SetForegroundColor(border_color), Print('│'))?;
    }

    let bottom = (frame.y + frame.height - 1) as u16;
    queue!(out, MoveTo(x0, bottom), SetForegroundColor(border_color), Print(format!("└{rule}┘")))?;

    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
    out.flush()?;
    Ok(())
}
