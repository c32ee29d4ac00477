use crossterm::style::Color;
use fractart::Rgb;

/// Names shown in the status line, indexed by scheme number
pub const SCHEME_NAMES: [&str; 10] = [
    "default", "fire", "ice", "pink", "gold", "electric", "lava", "mono", "rainbow", "neon",
];

/// Base colour a scheme paints with. Scheme 0 keeps the view's own colour.
pub fn scheme_rgb(scheme: u8, default: Rgb) -> Rgb {
    match scheme {
        1 => (255, 96, 0),     // fire
        2 => (64, 160, 255),   // ice
        3 => (255, 64, 200),   // pink
        4 => (255, 200, 40),   // gold
        5 => (0, 255, 255),    // electric
        6 => (220, 20, 60),    // lava
        7 => (230, 230, 230),  // mono
        8 => (255, 50, 0),     // rainbow start
        9 => (160, 0, 255),    // neon
        _ => default,
    }
}

/// Status line colour for a scheme
pub fn scheme_color(scheme: u8, bold: bool) -> (Color, bool) {
    match scheme {
        1 => (Color::Yellow, bold),
        2 => (Color::Cyan, bold),
        3 => (Color::Magenta, bold),
        4 => (Color::DarkYellow, bold),
        5 => (Color::AnsiValue(14), true),  // Bright cyan
        6 => (Color::Red, bold),
        7 => (Color::Grey, false),
        8 => (Color::Green, bold),
        9 => (Color::AnsiValue(13), true),  // Bright magenta
        _ => (Color::White, bold),
    }
}
