//! Epidemic curve figures.
//!
//! After all scenarios finish, their infected and susceptible series are drawn as line charts
//! side by side in a single SVG figure, one subplot per scenario.
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::debug;

use crate::error::SimError;

pub const FIGURE_NAME: &str = "epidemic_curves.svg";

const SUBPLOT_WIDTH: f64 = 600.0;
const FIGURE_HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 50.0;
const INFECTED_COLOR: &str = "red";
const SUSCEPTIBLE_COLOR: &str = "blue";

/// The curves for one scenario.
#[derive(Clone, Debug)]
pub struct Curves<'a> {
    pub title: String,
    pub infected: &'a [usize],
    pub susceptible: &'a [usize],
}

struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    x_max: f64,
    y_max: f64,
}

impl Frame {
    #[allow(clippy::cast_precision_loss)]
    fn new(left: f64, curves: &Curves) -> Frame {
        let len = curves.infected.len().max(curves.susceptible.len());
        let y_max = curves
            .infected
            .iter()
            .chain(curves.susceptible)
            .copied()
            .max()
            .unwrap_or(0);
        Frame {
            left: left + MARGIN_LEFT,
            top: MARGIN_TOP,
            width: SUBPLOT_WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            height: FIGURE_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
            x_max: len.saturating_sub(1).max(1) as f64,
            y_max: y_max.max(1) as f64,
        }
    }

    fn x(&self, tick: f64) -> f64 {
        self.left + tick / self.x_max * self.width
    }

    fn y(&self, count: f64) -> f64 {
        self.top + self.height - count / self.y_max * self.height
    }

    #[allow(clippy::cast_precision_loss)]
    fn polyline(&self, svg: &mut String, values: &[usize], color: &str) {
        if values.is_empty() {
            return;
        }
        let points: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(tick, &count)| {
                format!("{:.1},{:.1}", self.x(tick as f64), self.y(count as f64))
            })
            .collect();
        let _ = writeln!(
            svg,
            r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
            color,
            points.join(" ")
        );
    }
}

fn subplot(svg: &mut String, left: f64, curves: &Curves) {
    let frame = Frame::new(left, curves);
    let bottom = frame.top + frame.height;
    let right = frame.left + frame.width;

    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="16">{}</text>"#,
        frame.left + frame.width / 2.0,
        frame.top - 20.0,
        escape(&curves.title)
    );
    let _ = writeln!(
        svg,
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"#,
        frame.left, frame.top, frame.width, frame.height
    );

    // Axis extents
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12">{}</text>"#,
        frame.left - 6.0,
        frame.top + 4.0,
        frame.y_max
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12">0</text>"#,
        frame.left - 6.0,
        bottom + 4.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="start" font-size="12">0</text>"#,
        frame.left,
        bottom + 18.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12">{}</text>"#,
        right,
        bottom + 18.0,
        frame.x_max
    );

    frame.polyline(svg, curves.infected, INFECTED_COLOR);
    frame.polyline(svg, curves.susceptible, SUSCEPTIBLE_COLOR);

    // Legend
    for (row, (label, color)) in [("Infected", INFECTED_COLOR), ("Susceptible", SUSCEPTIBLE_COLOR)]
        .iter()
        .enumerate()
    {
        #[allow(clippy::cast_precision_loss)]
        let y = frame.top + 16.0 + row as f64 * 18.0;
        let x = right - 110.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="2"/>"#,
            x,
            y - 4.0,
            x + 20.0,
            y - 4.0,
            color
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="12">{}</text>"#,
            x + 26.0,
            y,
            label
        );
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders one subplot per scenario, left to right.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn render_svg(charts: &[Curves]) -> String {
    let width = SUBPLOT_WIDTH * charts.len().max(1) as f64;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{FIGURE_HEIGHT}" viewBox="0 0 {width} {FIGURE_HEIGHT}">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect width="100%" height="100%" fill="white"/>"#
    );
    for (index, curves) in charts.iter().enumerate() {
        subplot(&mut svg, index as f64 * SUBPLOT_WIDTH, curves);
    }
    svg.push_str("</svg>\n");
    svg
}

/// Writes the figure to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_svg(path: &Path, charts: &[Curves]) -> Result<(), SimError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_svg(charts))?;
    debug!("wrote {} curve(s) to {}", charts.len(), path.display());
    Ok(())
}
