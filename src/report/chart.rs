//! ASCII line charts
//!
//! Series are scaled to a fixed number of rows and drawn with box-drawing
//! segments next to a labelled y axis.

/// Decimal places in axis labels
const PRECISION: usize = 2;

/// Render `series` as a line chart about `height` rows tall.
///
/// Returns `None` for an empty series.
pub fn plot(series: &[f64], height: usize) -> Option<String> {
    if series.is_empty() {
        return None;
    }

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let interval = max - min;

    let ratio = if interval > 0.0 { height.max(1) as f64 / interval } else { 1.0 };
    let min_scaled = (min * ratio).round() as i64;
    let max_scaled = (max * ratio).round() as i64;
    let rows = (max_scaled - min_scaled) as usize;

    // Row index of a value, counted from the bottom
    let level = |v: f64| ((v * ratio).round() as i64 - min_scaled) as usize;

    let width = series.len();
    let mut grid = vec![vec![' '; width]; rows + 1];

    for x in 0..width.saturating_sub(1) {
        let y0 = level(series[x]);
        let y1 = level(series[x + 1]);

        if y0 == y1 {
            grid[rows - y0][x] = '─';
            continue;
        }

        if y0 > y1 {
            grid[rows - y1][x] = '╰';
            grid[rows - y0][x] = '╮';
        } else {
            grid[rows - y1][x] = '╭';
            grid[rows - y0][x] = '╯';
        }
        for y in y0.min(y1) + 1..y0.max(y1) {
            grid[rows - y][x] = '│';
        }
    }

    let label_width = format!("{:.*}", PRECISION, max)
        .len()
        .max(format!("{:.*}", PRECISION, min).len())
        + 1;
    let start_row = rows - level(series[0]);

    let lines: Vec<String> = grid
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let mut magnitude = if rows > 0 {
                max - row as f64 * interval / rows as f64
            } else {
                max
            };
            // No "-0.00" labels
            if magnitude == 0.0 {
                magnitude = 0.0;
            }
            let axis = if row == start_row { '┼' } else { '┤' };
            let data: String = cells.iter().collect();
            format!("{:>w$.p$}{}{}", magnitude, axis, data, w = label_width, p = PRECISION)
                .trim_end()
                .to_string()
        })
        .collect();

    Some(lines.join("\n"))
}
