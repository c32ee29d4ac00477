//! L-system string rewriting and a turtle-graphics interpreter.
//!
//! `+`, `-`, `[` and `]` are control symbols: they turn the turtle or save
//! and restore its state, and are never rewritten. Every other symbol is
//! rewritten by its rule (or copied when it has none) and draws one step
//! forward when interpreted.

use crate::error::{FractalError, Result};
use crate::raster::{Rgb, Surface};
use crate::scheduler::Job;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::debug;

pub const RESERVED: [char; 4] = ['+', '-', '[', ']'];

/// Axiom plus production rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub axiom: String,
    pub rules: BTreeMap<char, String>,
}

impl Grammar {
    pub fn new(axiom: &str) -> Self {
        Self {
            axiom: axiom.to_string(),
            rules: BTreeMap::new(),
        }
    }

    /// Add a rule. Rules for control symbols are ignored.
    pub fn with_rule(mut self, symbol: char, replacement: &str) -> Self {
        if !RESERVED.contains(&symbol) {
            self.rules.insert(symbol, replacement.to_string());
        }
        self
    }

    /// One simultaneous rewriting pass.
    pub fn step(&self, input: &str) -> String {
        let mut next = String::with_capacity(input.len() * 2);
        for symbol in input.chars() {
            match self.rules.get(&symbol) {
                Some(replacement) => next.push_str(replacement),
                None => next.push(symbol),
            }
        }
        next
    }

    /// Rewrite the axiom `generations` times.
    pub fn generate(&self, generations: u32) -> String {
        let mut current = self.axiom.clone();
        for _ in 0..generations {
            current = self.step(&current);
        }
        debug!(generations, length = current.len(), "l-system expanded");
        current
    }
}

/// Built-in grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LSystemPreset {
    Tree,
    Sierpinski,
    Dragon,
}

impl LSystemPreset {
    pub const ALL: [LSystemPreset; 3] = [LSystemPreset::Tree, LSystemPreset::Sierpinski, LSystemPreset::Dragon];

    pub fn grammar(self) -> Grammar {
        match self {
            LSystemPreset::Tree => Grammar::new("F").with_rule('F', "FF+[+F-F-F]-[-F+F+F]"),
            LSystemPreset::Sierpinski => Grammar::new("F-G-G")
                .with_rule('F', "F-G+F+G-F")
                .with_rule('G', "GG"),
            LSystemPreset::Dragon => Grammar::new("F")
                .with_rule('F', "F+G")
                .with_rule('G', "F-G"),
        }
    }

    /// Turn applied by `+` (and negated by `-`), in radians.
    pub fn default_angle(self) -> f64 {
        match self {
            LSystemPreset::Tree => -0.45,
            LSystemPreset::Sierpinski => 120f64.to_radians(),
            LSystemPreset::Dragon => 90f64.to_radians(),
        }
    }

    pub fn default_generations(self) -> u32 {
        match self {
            LSystemPreset::Tree => 5,
            LSystemPreset::Sierpinski => 7,
            LSystemPreset::Dragon => 12,
        }
    }

    /// Largest generation count accepted; string length grows
    /// exponentially with each generation.
    pub fn max_generations(self) -> u32 {
        match self {
            LSystemPreset::Tree => 6,
            LSystemPreset::Sierpinski => 9,
            LSystemPreset::Dragon => 16,
        }
    }

    pub fn clamp_generations(self, generations: u32) -> u32 {
        generations.min(self.max_generations())
    }

    pub fn name(self) -> &'static str {
        match self {
            LSystemPreset::Tree => "tree",
            LSystemPreset::Sierpinski => "sierpinski",
            LSystemPreset::Dragon => "dragon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tree" | "plant" => Some(LSystemPreset::Tree),
            "sierpinski" | "triangle" => Some(LSystemPreset::Sierpinski),
            "dragon" => Some(LSystemPreset::Dragon),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            LSystemPreset::Tree => LSystemPreset::Sierpinski,
            LSystemPreset::Sierpinski => LSystemPreset::Dragon,
            LSystemPreset::Dragon => LSystemPreset::Tree,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleState {
    pub position: (f64, f64),
    pub heading: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleConfig {
    pub step_length: f64,
    pub angle_increment: f64,
    pub origin: (f64, f64),
    /// Initial heading in radians. Screen y grows downward, so `-π/2`
    /// points up.
    pub heading: f64,
}

impl TurtleConfig {
    /// Bottom-centre start pointing up, as the tree view lays out.
    pub fn for_canvas(preset: LSystemPreset, generations: u32, width: usize, height: usize) -> Self {
        Self {
            step_length: step_length(generations, height),
            angle_increment: preset.default_angle(),
            origin: (width as f64 / 2.0, height as f64 - 25.0_f64.min(height as f64 * 0.05)),
            heading: -PI / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// Turtle with a save/restore stack.
#[derive(Debug, Clone)]
pub struct Turtle {
    state: TurtleState,
    stack: Vec<TurtleState>,
    step_length: f64,
    angle_increment: f64,
}

impl Turtle {
    pub fn new(config: &TurtleConfig) -> Self {
        Self {
            state: TurtleState {
                position: config.origin,
                heading: config.heading,
            },
            stack: Vec::new(),
            step_length: config.step_length,
            angle_increment: config.angle_increment,
        }
    }

    pub fn state(&self) -> TurtleState {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Interpret one symbol. `position` is only used for error reporting.
    pub fn apply(&mut self, symbol: char, position: usize) -> Result<Option<Segment>> {
        match symbol {
            '+' => self.state.heading += self.angle_increment,
            '-' => self.state.heading -= self.angle_increment,
            '[' => self.stack.push(self.state),
            ']' => {
                self.state = self
                    .stack
                    .pop()
                    .ok_or(FractalError::StackUnderflow { position })?;
            }
            _ => {
                let start = self.state.position;
                let end = (
                    start.0 + self.step_length * self.state.heading.cos(),
                    start.1 + self.step_length * self.state.heading.sin(),
                );
                self.state.position = end;
                return Ok(Some(Segment { start, end }));
            }
        }
        Ok(None)
    }
}

/// Walk `commands` and return the line segments drawn. An unmatched `]`
/// fails with [`FractalError::StackUnderflow`].
pub fn interpret(commands: &str, config: &TurtleConfig) -> Result<Vec<Segment>> {
    let mut turtle = Turtle::new(config);
    let mut segments = Vec::new();
    for (position, symbol) in commands.chars().enumerate() {
        if let Some(segment) = turtle.apply(symbol, position)? {
            segments.push(segment);
        }
    }
    Ok(segments)
}

/// Stroke length heuristic: shorter strokes for deeper generations.
pub fn step_length(generations: u32, canvas_height: usize) -> f64 {
    let base = canvas_height as f64 / 65.0;
    match generations {
        0..=4 => base,
        5 => base / 2.0,
        _ => base / 4.0,
    }
}

/// Axis-aligned bounds of all segment endpoints as `(min, max)`.
pub fn bounds(segments: &[Segment]) -> Option<((f64, f64), (f64, f64))> {
    let first = segments.first()?;
    let mut min = first.start;
    let mut max = first.start;
    for s in segments {
        for p in [s.start, s.end] {
            min = (min.0.min(p.0), min.1.min(p.1));
            max = (max.0.max(p.0), max.1.max(p.1));
        }
    }
    Some((min, max))
}

/// Uniformly scale and translate `segments` so they fit inside a
/// `width × height` canvas with `margin` pixels on every side, centred.
pub fn fit(segments: &[Segment], width: usize, height: usize, margin: f64) -> Vec<Segment> {
    let Some((min, max)) = bounds(segments) else {
        return Vec::new();
    };
    let avail_w = (width as f64 - 2.0 * margin).max(1.0);
    let avail_h = (height as f64 - 2.0 * margin).max(1.0);
    let span_w = max.0 - min.0;
    let span_h = max.1 - min.1;

    let scale = match (span_w > 0.0, span_h > 0.0) {
        (true, true) => (avail_w / span_w).min(avail_h / span_h),
        (true, false) => avail_w / span_w,
        (false, true) => avail_h / span_h,
        (false, false) => 1.0,
    };

    let offset_x = margin + (avail_w - span_w * scale) / 2.0;
    let offset_y = margin + (avail_h - span_h * scale) / 2.0;
    let place = |p: (f64, f64)| ((p.0 - min.0) * scale + offset_x, (p.1 - min.1) * scale + offset_y);

    segments
        .iter()
        .map(|s| Segment {
            start: place(s.start),
            end: place(s.end),
        })
        .collect()
}

/// Progressive stroke drawing: a fixed number of segments per step.
pub struct StrokeJob {
    segments: Vec<Segment>,
    next: usize,
    per_step: usize,
    color: Rgb,
}

impl StrokeJob {
    pub fn new(segments: Vec<Segment>, per_step: usize, color: Rgb) -> Self {
        Self {
            segments,
            next: 0,
            per_step: per_step.max(1),
            color,
        }
    }
}

impl Job for StrokeJob {
    fn step(&mut self, surface: &mut dyn Surface) -> bool {
        if self.next >= self.segments.len() {
            return false;
        }
        let end = (self.next + self.per_step).min(self.segments.len());
        for segment in &self.segments[self.next..end] {
            surface.line(segment.start, segment.end, self.color);
        }
        self.next = end;
        true
    }

    fn name(&self) -> &'static str {
        "l-system"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_config() -> TurtleConfig {
        TurtleConfig {
            step_length: 1.0,
            angle_increment: PI / 2.0,
            origin: (0.0, 0.0),
            heading: 0.0,
        }
    }

    #[test]
    fn zero_generations_is_axiom() {
        for preset in LSystemPreset::ALL {
            let grammar = preset.grammar();
            assert_eq!(grammar.generate(0), grammar.axiom);
        }
    }

    #[test]
    fn dragon_expansion() {
        let dragon = LSystemPreset::Dragon.grammar();
        assert_eq!(dragon.generate(1), "F+G");
        assert_eq!(dragon.generate(2), "F+G+F-G");
        assert_eq!(dragon.generate(2).len(), 7);
        // each generation doubles the drawing symbols
        let draws = |s: &str| s.chars().filter(|c| !RESERVED.contains(c)).count();
        assert_eq!(draws(&dragon.generate(6)), 64);
    }

    #[test]
    fn rewriting_is_simultaneous() {
        // G -> F must not be rewritten again by F -> FG in the same pass
        let grammar = Grammar::new("FG").with_rule('F', "FG").with_rule('G', "F");
        assert_eq!(grammar.generate(1), "FGF");
    }

    #[test]
    fn control_symbols_are_never_rewritten() {
        let grammar = Grammar::new("F+[F]").with_rule('+', "XX").with_rule('F', "FF");
        assert_eq!(grammar.generate(1), "FF+[FF]");
    }

    #[test]
    fn sierpinski_first_generation() {
        let g = LSystemPreset::Sierpinski.grammar();
        assert_eq!(g.generate(1), "F-G+F+G-F-GG-GG");
    }

    #[test]
    fn turtle_draws_and_turns() {
        let segments = interpret("F+F", &unit_config()).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].end, (1.0, 0.0));
        let end = segments[1].end;
        assert!((end.0 - 1.0).abs() < 1e-12 && (end.1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_brackets_are_a_no_op() {
        let config = unit_config();
        let mut with = Turtle::new(&config);
        let mut without = Turtle::new(&config);
        for (i, s) in "F+F[]F".chars().enumerate() {
            with.apply(s, i).unwrap();
        }
        for (i, s) in "F+FF".chars().enumerate() {
            without.apply(s, i).unwrap();
        }
        assert_eq!(with.state(), without.state());
        assert_eq!(with.depth(), 0);
    }

    #[test]
    fn brackets_restore_state() {
        let segments = interpret("[+F]F", &unit_config()).unwrap();
        assert_eq!(segments[1].start, (0.0, 0.0));
        assert_eq!(segments[1].end, (1.0, 0.0));
    }

    #[test]
    fn unmatched_close_bracket_underflows() {
        assert_eq!(
            interpret("F]F", &unit_config()),
            Err(FractalError::StackUnderflow { position: 1 })
        );
    }

    #[test]
    fn fit_keeps_everything_on_canvas() {
        let preset = LSystemPreset::Dragon;
        let commands = preset.grammar().generate(10);
        let config = TurtleConfig::for_canvas(preset, 10, 200, 100);
        let raw = interpret(&commands, &config).unwrap();
        let placed = fit(&raw, 200, 100, 2.0);
        let (min, max) = bounds(&placed).unwrap();
        assert!(min.0 >= 2.0 - 1e-9 && min.1 >= 2.0 - 1e-9);
        assert!(max.0 <= 198.0 + 1e-9 && max.1 <= 98.0 + 1e-9);
    }

    #[test]
    fn generations_are_clamped() {
        assert_eq!(LSystemPreset::Tree.clamp_generations(40), 6);
        assert_eq!(LSystemPreset::Dragon.clamp_generations(3), 3);
    }

    #[test]
    fn step_length_shrinks_with_depth() {
        assert_eq!(step_length(3, 650), 10.0);
        assert_eq!(step_length(5, 650), 5.0);
        assert_eq!(step_length(8, 650), 2.5);
    }
}
