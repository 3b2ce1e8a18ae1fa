//! ASCII/Unicode trend chart for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed slots: `o`
//! - connecting line: `-`
//!
//! Slots without a positive value are gaps; the line joins the remaining points.

use crate::domain::{SERIES_LABELS, Series};
use crate::plot::bounds::{Bounds, series_bounds};

/// Render a four-slot series scaled to its padded bounds.
pub fn render_trend_chart(title: &str, series: &Series, width: usize, height: usize) -> String {
    let bounds = series_bounds(series);
    render_with_bounds(title, series, bounds, width, height)
}

fn render_with_bounds(title: &str, series: &Series, bounds: Bounds, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let y_min = bounds.min as f64;
    let y_max = bounds.max as f64;

    let mut grid = vec![vec![' '; width]; height];

    let points: Vec<(usize, usize)> = series
        .values()
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0)
        .map(|(i, v)| {
            (
                map_x(i, SERIES_LABELS.len(), width),
                map_y(*v as f64, y_min, y_max, height),
            )
        })
        .collect();

    // Line first so points overlay it.
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        draw_line(&mut grid, x0, y0, x1, y1, '-');
    }
    for &(x, y) in &points {
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!("{title}: y=[{}, {}]\n", bounds.min, bounds.max));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let slots: Vec<String> = SERIES_LABELS
        .iter()
        .zip(series.readings())
        .map(|(label, reading)| match reading.value() {
            Some(v) => format!("{label} {v}"),
            None => format!("{label} --"),
        })
        .collect();
    out.push_str(&slots.join(" | "));
    out.push('\n');

    out
}

fn map_x(slot: usize, slots: usize, width: usize) -> usize {
    let width = width.max(2);
    let u = slot as f64 / (slots.max(2) as f64 - 1.0);
    (u.clamp(0.0, 1.0) * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let span = (y_max - y_min).max(1.0);
    let u = ((y - y_min) / span).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reading;

    #[test]
    fn flat_series_golden_snapshot() {
        let series = Series::from_readings([Reading::Value(100); 4]);
        let txt = render_trend_chart("Pellet", &series, 10, 5);
        let expected = concat!(
            "Pellet: y=[95, 105]\n",
            "\n",
            "\n",
            "o--o--o--o\n",
            "\n",
            "\n",
            "Year 100 | 6 Months 100 | Month 100 | Week 100\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn rising_series_puts_extremes_on_edge_rows() {
        let series = Series::from_readings([Reading::Value(100), Reading::Missing, Reading::Missing, Reading::Value(200)]);
        let txt = render_trend_chart("Briquette", &series, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();

        assert_eq!(lines[0], "Briquette: y=[95, 210]");
        assert!(lines[1].ends_with('o'));
        assert!(lines[5].starts_with('o'));
        assert_eq!(lines[6], "Year 100 | 6 Months -- | Month -- | Week 200");
    }

    #[test]
    fn empty_series_renders_blank_grid_with_fallback_range() {
        let txt = render_trend_chart("Pellet", &Series::default(), 12, 5);
        assert!(txt.starts_with("Pellet: y=[0, 1000]\n"));
        assert!(!txt.contains('o'));
        assert!(txt.ends_with("Year -- | 6 Months -- | Month -- | Week --\n"));
    }
}
