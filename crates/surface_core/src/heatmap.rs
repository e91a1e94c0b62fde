//! Surface rows to heatmap series.
//!
//! A heatmap renderer wants one series per row, each a list of
//! `(column label, price)` points. Cells that do not hold a finite number
//! become `NaN` points rather than being dropped, so the grid stays
//! rectangular and the renderer can draw them as empty.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::wire::SurfaceRow;

/// One heatmap cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// Column label (spot price)
    pub x: String,
    /// Price, `NaN` when missing; serialized as `null`
    #[serde(deserialize_with = "deserialize_price")]
    pub y: f64,
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl HeatmapPoint {
    pub fn is_missing(&self) -> bool {
        self.y.is_nan()
    }
}

impl PartialEq for HeatmapPoint {
    /// Missing points compare equal to each other.
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && (self.y == other.y || (self.y.is_nan() && other.y.is_nan()))
    }
}

/// One heatmap row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSeries {
    /// Row label
    pub id: String,
    /// Points in the row's column order
    #[serde(rename = "data")]
    pub points: Vec<HeatmapPoint>,
}

/// Convert surface rows into heatmap series.
///
/// One series per row, in row order; one point per non-`id` column, in
/// the row's column order. Pure and deterministic. An empty input yields
/// an empty output, which callers should present as "no data".
pub fn to_series(rows: &[SurfaceRow]) -> Vec<HeatmapSeries> {
    rows.iter()
        .map(|row| HeatmapSeries {
            id: row.id().to_string(),
            points: row
                .cells()
                .map(|(column, cell)| HeatmapPoint {
                    x: column.to_string(),
                    y: cell.price(),
                })
                .collect(),
        })
        .collect()
}

/// Column labels of a surface, taken from its first row
pub fn column_labels(rows: &[SurfaceRow]) -> Vec<&str> {
    rows.first()
        .map(|row| row.columns().collect())
        .unwrap_or_default()
}

/// Verify every row shares the first row's column set.
///
/// Order may differ between rows; only membership is checked.
pub fn check_rectangular(rows: &[SurfaceRow]) -> Result<(), SurfaceError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let expected: HashSet<&str> = first.columns().collect();

    for row in &rows[1..] {
        if row.len() != expected.len() {
            return Err(SurfaceError::ColumnCountMismatch {
                row: row.id().to_string(),
                expected: expected.len(),
                found: row.len(),
            });
        }
        if let Some(column) = row.columns().find(|c| !expected.contains(c)) {
            return Err(SurfaceError::UnknownColumn {
                row: row.id().to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
