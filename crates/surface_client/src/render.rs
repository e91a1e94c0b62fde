//! Plain-text heatmap rendering.

use std::fmt::Write;

use surface_core::heatmap::{column_labels, to_series};
use surface_core::{ScenarioSummary, SurfaceRow};

use crate::lifecycle::SurfaceState;

pub const CALL_TITLE: &str = "Call Option Prices";
pub const PUT_TITLE: &str = "Put Option Prices";

/// Printed in place of a missing price
const MISSING_CELL: &str = "-";
const MIN_CELL_WIDTH: usize = 8;

/// Render one surface as an aligned table.
///
/// Columns follow the first row's labels; an empty surface renders the
/// "no data" line instead of an empty grid.
pub fn render_heatmap(rows: &[SurfaceRow], title: &str) -> String {
    let series = to_series(rows);
    if series.is_empty() {
        return format!("No data available for {}", title);
    }

    let columns = column_labels(rows);
    let label_width = series.iter().map(|s| s.id.len()).max().unwrap_or(0);
    let cell_width = columns
        .iter()
        .map(|c| c.len())
        .chain(series.iter().flat_map(|s| s.points.iter().map(|p| format_price(p.y).len())))
        .max()
        .unwrap_or(0)
        .max(MIN_CELL_WIDTH);

    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    let _ = write!(out, "{:>label_width$}", "");
    for column in &columns {
        let _ = write!(out, " {:>cell_width$}", column);
    }
    out.push('\n');

    for s in &series {
        let _ = write!(out, "{:>label_width$}", s.id);
        for column in &columns {
            let price = s
                .points
                .iter()
                .find(|p| p.x == *column)
                .map(|p| format_price(p.y))
                .unwrap_or_else(|| MISSING_CELL.to_string());
            let _ = write!(out, " {:>cell_width$}", price);
        }
        out.push('\n');
    }
    out.pop();
    out
}

/// Render progress, error, scenario summary and both surfaces
pub fn render_state(state: &SurfaceState) -> String {
    let mut sections = Vec::new();

    if !state.progress().is_empty() {
        sections.push(state.progress().to_string());
    }
    if let Some(error) = state.error() {
        sections.push(format!("Error: {}", error));
    }
    if let Some(response) = state.response() {
        sections.push(ScenarioSummary::from(response).to_string());
        sections.push(render_heatmap(&response.call_data, CALL_TITLE));
        sections.push(render_heatmap(&response.put_data, PUT_TITLE));
    }

    sections.join("\n\n")
}

fn format_price(price: f64) -> String {
    if price.is_nan() {
        MISSING_CELL.to_string()
    } else {
        format!("{:.2}", price)
    }
}
