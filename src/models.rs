use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single observation: a numeric value, or missing. World Bank exports
/// leave missing years blank or use a placeholder token; both become `None`.
pub type Cell = Option<f64>;

/// Which direction of a table to summarize. Consumers summarize the same
/// indicator along different directions, so this is always caller-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// One series per row key.
    Rows,
    /// One series per column key.
    Columns,
}

/// The as-loaded indicator dataset: a header plus raw string rows.
///
/// The first one or two columns are entity identifiers (a name and optionally
/// a short code); the remaining columns are period labels in header order.
/// Every row has exactly the header's width (enforced at load). Immutable
/// after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Invariant: `rows[i].len() == columns.len()` for all `i`. The loader in
    /// [`crate::reshape`] checks this before construction.
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copy of this table without the named columns. Absent names are
    /// silently ignored; `Country Code` is present in some exports and not in
    /// others.
    pub fn without_columns(&self, names: &[&str]) -> RawTable {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !names.contains(&c.as_str()))
            .map(|(i, _)| i)
            .collect();
        let columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
            .collect();
        RawTable::new(columns, rows)
    }
}

/// Read access shared by the two table orientations, so statistics can run
/// along either axis of either table without caring which one it got.
pub trait Table {
    fn row_keys(&self) -> &[String];
    fn column_keys(&self) -> &[String];
    /// Borrow the series for row `idx`. Panics on out-of-range `idx`; keyed
    /// access goes through the checked `value`/`series` methods instead.
    fn row(&self, idx: usize) -> &[Cell];

    /// Materialize the series for column `idx`.
    fn column(&self, idx: usize) -> Vec<Cell> {
        (0..self.row_keys().len()).map(|r| self.row(r)[idx]).collect()
    }
}

/// Rows keyed by entity identifier, columns = periods in header order.
///
/// Row keys are unique: if the source contains duplicate identifiers, the
/// later row overwrites the earlier one (the first-seen position is kept).
#[derive(Debug, Clone, Serialize)]
pub struct EntityIndexedTable {
    entities: Vec<String>,
    periods: Vec<String>,
    cells: Vec<Vec<Cell>>,
    #[serde(skip)]
    index: AHashMap<String, usize>,
}

impl EntityIndexedTable {
    pub(crate) fn new(entities: Vec<String>, periods: Vec<String>, cells: Vec<Vec<Cell>>) -> Self {
        let index = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.clone(), i))
            .collect();
        Self {
            entities,
            periods,
            cells,
            index,
        }
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Full series for one entity, in period order.
    pub fn series(&self, entity: &str) -> Result<&[Cell]> {
        let &i = self.index.get(entity).ok_or_else(|| Error::Schema {
            name: entity.to_string(),
        })?;
        Ok(&self.cells[i])
    }

    /// Single cell lookup. Absent keys are a checked error, not a silent
    /// fault.
    pub fn value(&self, entity: &str, period: &str) -> Result<Cell> {
        let row = self.series(entity)?;
        let j = self
            .periods
            .iter()
            .position(|p| p == period)
            .ok_or_else(|| Error::Schema {
                name: period.to_string(),
            })?;
        Ok(row[j])
    }

    /// Exact transpose: periods become row keys, entities become column keys,
    /// in their existing order. No recomputation; transpose is its own
    /// inverse.
    pub fn transposed(&self) -> PeriodIndexedTable {
        PeriodIndexedTable::new(
            self.periods.clone(),
            self.entities.clone(),
            transpose_cells(&self.cells, self.periods.len()),
        )
    }
}

impl PartialEq for EntityIndexedTable {
    fn eq(&self, other: &Self) -> bool {
        self.entities == other.entities
            && self.periods == other.periods
            && self.cells == other.cells
    }
}

impl Table for EntityIndexedTable {
    fn row_keys(&self) -> &[String] {
        &self.entities
    }

    fn column_keys(&self) -> &[String] {
        &self.periods
    }

    fn row(&self, idx: usize) -> &[Cell] {
        &self.cells[idx]
    }
}

/// Rows keyed by period (header order), columns = entity identifiers.
///
/// Invariant: `period_table[p][e] == entity_table[e][p]` for every period and
/// entity present in both.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodIndexedTable {
    periods: Vec<String>,
    entities: Vec<String>,
    cells: Vec<Vec<Cell>>,
    #[serde(skip)]
    index: AHashMap<String, usize>,
}

impl PeriodIndexedTable {
    pub(crate) fn new(periods: Vec<String>, entities: Vec<String>, cells: Vec<Vec<Cell>>) -> Self {
        let index = periods
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), i))
            .collect();
        Self {
            periods,
            entities,
            cells,
            index,
        }
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Full cross-section for one period, in entity order.
    pub fn series(&self, period: &str) -> Result<&[Cell]> {
        let &i = self.index.get(period).ok_or_else(|| Error::Schema {
            name: period.to_string(),
        })?;
        Ok(&self.cells[i])
    }

    pub fn value(&self, period: &str, entity: &str) -> Result<Cell> {
        let row = self.series(period)?;
        let j = self
            .entities
            .iter()
            .position(|e| e == entity)
            .ok_or_else(|| Error::Schema {
                name: entity.to_string(),
            })?;
        Ok(row[j])
    }

    pub fn transposed(&self) -> EntityIndexedTable {
        EntityIndexedTable::new(
            self.entities.clone(),
            self.periods.clone(),
            transpose_cells(&self.cells, self.entities.len()),
        )
    }
}

impl PartialEq for PeriodIndexedTable {
    fn eq(&self, other: &Self) -> bool {
        self.periods == other.periods
            && self.entities == other.entities
            && self.cells == other.cells
    }
}

impl Table for PeriodIndexedTable {
    fn row_keys(&self) -> &[String] {
        &self.periods
    }

    fn column_keys(&self) -> &[String] {
        &self.entities
    }

    fn row(&self, idx: usize) -> &[Cell] {
        &self.cells[idx]
    }
}

fn transpose_cells(cells: &[Vec<Cell>], width: usize) -> Vec<Vec<Cell>> {
    (0..width)
        .map(|j| cells.iter().map(|row| row[j]).collect())
        .collect()
}
