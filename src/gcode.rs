/// G-code emitter.
///
/// Swiss-cheese layer: **Output format**
/// Extension point: add a controller dialect by adding a `PostProcessor`
/// variant and its line formatting.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;
use crate::settings::CamSettings;

/// Controller-specific line formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PostProcessor {
    #[default]
    #[serde(rename = "GRBL", alias = "grbl")]
    Grbl,
    /// Terminates every motion block with `;`.
    #[serde(rename = "Mach3", alias = "mach3")]
    Mach3,
    #[serde(rename = "LinuxCNC", alias = "linuxcnc")]
    LinuxCnc,
}

impl PostProcessor {
    pub fn terminator(self) -> Option<char> {
        match self {
            Self::Mach3 => Some(';'),
            Self::Grbl | Self::LinuxCnc => None,
        }
    }

    /// Apply this dialect to one motion line.
    pub fn format_line(self, line: String) -> String {
        match self.terminator() {
            Some(t) => {
                let mut line = line;
                line.push(t);
                line
            }
            None => line,
        }
    }
}

impl fmt::Display for PostProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grbl => write!(f, "GRBL"),
            Self::Mach3 => write!(f, "Mach3"),
            Self::LinuxCnc => write!(f, "LinuxCNC"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcodeParams {
    pub feed_rate: f64,
    pub plunge_rate: f64,
    pub spindle_speed: u32,
    pub safe_height: f64,
    pub post_processor: PostProcessor,
}

impl Default for GcodeParams {
    fn default() -> Self {
        Self::from(&CamSettings::default())
    }
}

impl From<&CamSettings> for GcodeParams {
    fn from(s: &CamSettings) -> Self {
        Self {
            feed_rate: s.feed_rate,
            plunge_rate: s.plunge_rate,
            spindle_speed: s.spindle_speed,
            safe_height: s.safe_height,
            post_processor: s.post_processor,
        }
    }
}

/// Two-decimal position, never printed as `-0.00`.
pub fn format_coord(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.2}")
}

/// Feed rates print as configured; whole numbers without a fraction.
fn format_rate(value: f64) -> String {
    format!("{value}")
}

/// Program preamble: units, positioning mode, spindle, retract.
pub fn header_lines(params: &GcodeParams) -> Vec<String> {
    vec![
        "G21 ; Metric units".to_string(),
        "G90 ; Absolute positioning".to_string(),
        format!("S{} M3 ; Spindle start", params.spindle_speed),
        format!("G0 Z{} ; Safe height", format_coord(params.safe_height)),
    ]
}

/// Program end: spindle off, return home, end of program.
pub fn footer_lines() -> Vec<String> {
    vec![
        "M5 ; Spindle stop".to_string(),
        "G0 X0 Y0 ; Return home".to_string(),
        "M30 ; Program end".to_string(),
    ]
}

/// Motion block for one layer: retract, rapid over the first point,
/// plunge to `-depth`, cut through every point, retract.
///
/// Returns nothing for an empty point list.
pub fn layer_block(params: &GcodeParams, points: &[Vec3], depth: f64) -> Vec<String> {
    let first = match points.first() {
        Some(p) => p,
        None => return Vec::new(),
    };
    let post = params.post_processor;
    let safe = format!("G0 Z{}", format_coord(params.safe_height));

    let mut lines = Vec::with_capacity(points.len() + 4);
    lines.push(post.format_line(safe.clone()));
    lines.push(post.format_line(format!(
        "G0 X{} Y{}",
        format_coord(first.x),
        format_coord(first.y)
    )));
    lines.push(post.format_line(format!(
        "G1 Z{} F{}",
        format_coord(-depth),
        format_rate(params.plunge_rate)
    )));
    let feed = format_rate(params.feed_rate);
    for p in points {
        lines.push(post.format_line(format!(
            "G1 X{} Y{} F{}",
            format_coord(p.x),
            format_coord(p.y),
            feed
        )));
    }
    lines.push(post.format_line(safe));
    lines
}

// ── Program ──────────────────────────────────────────────────────────

/// Finished program text, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub lines: Vec<String>,
    /// Layer blocks actually emitted.
    pub layer_count: usize,
    /// Linear cutting points across all layers.
    pub cut_points: usize,
}

impl Program {
    /// Newline-joined text with a trailing newline.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Accumulates a program: header on creation, layer blocks, footer on
/// [`GcodeWriter::finish`].
pub struct GcodeWriter {
    params: GcodeParams,
    program: Program,
}

impl GcodeWriter {
    pub fn new(params: GcodeParams) -> Self {
        let program = Program {
            lines: header_lines(&params),
            ..Default::default()
        };
        Self { params, program }
    }

    /// Append a commented layer block. Returns `false`, writing nothing,
    /// when there are no points.
    pub fn write_layer(&mut self, comment: &str, points: &[Vec3], depth: f64) -> bool {
        let block = layer_block(&self.params, points, depth);
        if block.is_empty() {
            return false;
        }
        self.program.lines.push(format!("; {comment}"));
        self.program.lines.extend(block);
        self.program.layer_count += 1;
        self.program.cut_points += points.len();
        true
    }

    pub fn finish(mut self) -> Program {
        self.program.lines.extend(footer_lines());
        self.program
    }
}
