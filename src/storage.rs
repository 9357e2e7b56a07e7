use anyhow::Result;
use csv::WriterBuilder;
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::models::Table;
use crate::stats::AxisSummaries;

/// Save an oriented table as CSV: key column first, then one column per key
/// of the other axis. Missing cells are written as empty fields.
pub fn save_table_csv<T: Table, P: AsRef<Path>>(table: &T, key_header: &str, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let mut header = vec![key_header.to_string()];
    header.extend(table.column_keys().iter().cloned());
    wtr.write_record(&header)?;
    for (i, key) in table.row_keys().iter().enumerate() {
        let mut record = vec![key.clone()];
        record.extend(
            table
                .row(i)
                .iter()
                .map(|c| c.map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save an oriented table as pretty JSON: `{row_key: {column_key: value}}`,
/// with `null` for missing cells.
pub fn save_table_json<T: Table, P: AsRef<Path>>(table: &T, path: P) -> Result<()> {
    let mut root = Map::new();
    for (i, key) in table.row_keys().iter().enumerate() {
        let mut row = Map::new();
        for (col, cell) in table.column_keys().iter().zip(table.row(i)) {
            let v = cell
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null);
            row.insert(col.clone(), v);
        }
        root.insert(key.clone(), Value::Object(row));
    }
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&Value::Object(root))?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save per-series summaries as CSV with header, one row per described key.
/// Skipped series are appended with empty statistic fields and the reason in
/// the last column.
pub fn save_summaries_csv<P: AsRef<Path>>(summaries: &AxisSummaries, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record([
        "key", "count", "missing", "mean", "std_dev", "skewness", "kurtosis", "min", "q1",
        "median", "q3", "max", "note",
    ])?;
    for s in summaries.reports.values() {
        wtr.write_record([
            s.key.clone(),
            s.count.to_string(),
            s.missing.to_string(),
            s.mean.to_string(),
            s.std_dev.to_string(),
            s.skewness.to_string(),
            s.kurtosis.to_string(),
            s.min.to_string(),
            s.q1.to_string(),
            s.median.to_string(),
            s.q3.to_string(),
            s.max.to_string(),
            String::new(),
        ])?;
    }
    for (key, reason) in &summaries.skipped {
        let mut record = vec![key.clone()];
        record.extend(std::iter::repeat_n(String::new(), 11));
        record.push(reason.clone());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save per-series summaries as pretty JSON.
pub fn save_summaries_json<P: AsRef<Path>>(summaries: &AxisSummaries, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(summaries)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
