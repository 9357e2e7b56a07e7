//! Load World-Bank-format indicator CSVs and derive the two canonical
//! orientations: entity-indexed (rows = countries, columns = periods) and
//! period-indexed (the transpose).
//!
//! Both orientations come from one raw load, so the two views always agree:
//! a grouped bar chart wants entity-major access with one series per period,
//! a time-series line chart wants period-major access with one series per
//! entity, and re-parsing the source for each would let them drift.

use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use csv::ReaderBuilder;
use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{Cell, EntityIndexedTable, PeriodIndexedTable, RawTable};

/// Read a CSV file into a [`RawTable`].
///
/// Fails with [`Error::NotFound`] when the file cannot be opened and
/// [`Error::Parse`] when the header is empty or a row does not match the
/// header's width. A malformed file rejects the whole load.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| Error::NotFound {
        path: path.display().to_string(),
        source: e,
    })?;
    let table = load_from_reader(file)?;
    log::debug!(
        "loaded {}: {} columns, {} rows",
        path.display(),
        table.columns().len(),
        table.len()
    );
    Ok(table)
}

/// Read CSV text from any reader. Same contract as [`load`] minus the file
/// open step.
pub fn load_from_reader<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| Error::Parse(e.to_string()))?
        .clone();
    let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(Error::Parse("empty header".to_string()));
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| Error::Parse(e.to_string()))?;
        if record.len() != columns.len() {
            return Err(Error::Parse(format!(
                "row {} has {} fields, header has {}",
                i + 1,
                record.len(),
                columns.len()
            )));
        }
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(RawTable::new(columns, rows))
}

/// Select `identifier_column` as the row key; all other columns become the
/// period columns, preserving header order.
///
/// Fails with [`Error::Schema`] if the identifier column is absent. Cells in
/// period columns are parsed as numbers; parse failures and placeholder
/// tokens are recorded as missing, not as errors.
pub fn to_entity_indexed(raw: &RawTable, identifier_column: &str) -> Result<EntityIndexedTable> {
    let id_idx = raw
        .column_index(identifier_column)
        .ok_or_else(|| Error::Schema {
            name: identifier_column.to_string(),
        })?;

    let periods: Vec<String> = raw
        .columns()
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != id_idx)
        .map(|(_, c)| c.clone())
        .collect();

    let mut entities: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<Cell>> = Vec::new();
    for row in raw.rows() {
        let entity = row[id_idx].clone();
        let values: Vec<Cell> = row
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != id_idx)
            .map(|(_, v)| parse_cell(v))
            .collect();
        // Duplicate identifiers: the later row wins, at the first-seen
        // position.
        match entities.iter().position(|e| *e == entity) {
            Some(at) => {
                log::debug!("duplicate entity {entity:?}: overwriting earlier row");
                cells[at] = values;
            }
            None => {
                entities.push(entity);
                cells.push(values);
            }
        }
    }
    Ok(EntityIndexedTable::new(entities, periods, cells))
}

/// Exact transpose of an entity-indexed table. Structural transform only;
/// transposing twice returns the original table.
pub fn to_period_indexed(table: &EntityIndexedTable) -> PeriodIndexedTable {
    table.transposed()
}

/// Column labels that look like calendar years (4-digit labels). Used to
/// separate period columns from auxiliary identifier columns in exports that
/// carry both a `Country Name` and a `Country Code`.
pub fn year_columns(raw: &RawTable) -> Vec<String> {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    let re = YEAR.get_or_init(|| Regex::new(r"^\d{4}$").expect("year regex"));
    raw.columns()
        .iter()
        .filter(|c| re.is_match(c))
        .cloned()
        .collect()
}

/// World Bank exports mark missing observations with a blank cell or `..`;
/// `NA`-style tokens show up in hand-edited files.
fn parse_cell(s: &str) -> Cell {
    let t = s.trim();
    if t.is_empty() || t == ".." || t.eq_ignore_ascii_case("na") || t.eq_ignore_ascii_case("n/a") {
        return None;
    }
    t.parse::<f64>().ok()
}
