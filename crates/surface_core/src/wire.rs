//! Wire contract between client, gateway and pricing engine.
//!
//! All payloads are camelCase JSON. Absent optional request fields are
//! serialised as `null` rather than omitted so the receiver can tell
//! "not supplied" apart from zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::SurfaceError;

/// Key holding the row label inside a surface row object
pub const ROW_ID_KEY: &str = "id";

/// Immutable snapshot of the parameters sent for one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSurfaceRequest {
    pub stock: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub strike_price: Option<f64>,
    pub time_to_maturity: f64,
    pub risk_free_rate: f64,
    pub min_spot_price: Option<f64>,
    pub max_spot_price: Option<f64>,
}

/// Priced surface returned by the engine.
///
/// The engine historically reports the spot as `currentPrice`; both
/// spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSurfaceResponse {
    pub call_data: Vec<SurfaceRow>,
    pub put_data: Vec<SurfaceRow>,
    #[serde(alias = "currentPrice")]
    pub stock_price: f64,
    pub implied_volatility: f64,
    pub strike_price: f64,
    pub time_to_maturity: f64,
    pub risk_free_rate: f64,
}

/// Single grid cell as delivered by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// JSON number
    Number(f64),
    /// JSON string, parsed lazily
    Text(String),
    /// `null` or any non-scalar value
    Missing,
}

impl Cell {
    /// Numeric price of the cell, `NaN` when it cannot be read as a finite number
    pub fn price(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(f64::NAN),
            Cell::Missing => f64::NAN,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Missing),
            Value::String(s) => Cell::Text(s),
            _ => Cell::Missing,
        }
    }
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Number(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
            Cell::Text(s) => Value::String(s),
            Cell::Missing => Value::Null,
        }
    }
}

/// One row of a pricing surface.
///
/// An ordered mapping from column label (a spot price) to a cell, plus
/// the row label `id`. Column order is the order the engine sent them
/// in. Within one surface every row carries the same column set; see
/// [`check_rectangular`](crate::heatmap::check_rectangular).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct SurfaceRow {
    id: String,
    cells: Vec<(String, Cell)>,
}

impl SurfaceRow {
    /// Create an empty row
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    /// Builder-style insert
    pub fn with_cell(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.insert(column, cell);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Insert or replace a cell. Replacing keeps the column's position.
    pub fn insert(&mut self, column: impl Into<String>, cell: Cell) {
        let column = column.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = cell,
            None => self.cells.push((column, cell)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, cell)| cell)
    }

    /// Column labels in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    /// `(column, cell)` pairs in insertion order
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(c, cell)| (c.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for SurfaceRow {
    type Error = SurfaceError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut id = None;
        let mut cells = Vec::with_capacity(map.len().saturating_sub(1));

        for (key, value) in map {
            if key == ROW_ID_KEY {
                id = Some(match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    other => return Err(SurfaceError::InvalidId(other.to_string())),
                });
            } else {
                cells.push((key, Cell::from(value)));
            }
        }

        let id = id.ok_or(SurfaceError::MissingId)?;
        Ok(Self { id, cells })
    }
}

impl From<SurfaceRow> for Map<String, Value> {
    fn from(row: SurfaceRow) -> Self {
        let mut map = Map::with_capacity(row.cells.len() + 1);
        map.insert(ROW_ID_KEY.to_string(), Value::String(row.id));
        for (column, cell) in row.cells {
            map.insert(column, Value::from(cell));
        }
        map
    }
}
