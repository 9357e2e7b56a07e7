//! Descriptive statistics over reshaped indicator tables.
//!
//! Missing values are excluded from every computation, never coerced to
//! zero. Standard deviation, skewness, and kurtosis use the population
//! conventions: divide by N, biased standardized central moments, and
//! excess kurtosis (a normal distribution reports 0).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Axis, Cell, Table};

/// Summary statistics for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub key: String,
    /// Non-missing observations.
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    /// Population standard deviation (divisor N).
    pub std_dev: f64,
    /// Third standardized central moment.
    pub skewness: f64,
    /// Excess kurtosis: fourth standardized central moment minus 3.
    pub kurtosis: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Describe a single series. Missing entries are dropped first; fewer than 2
/// remaining values is [`Error::InsufficientData`], naming the series.
pub fn describe(key: &str, values: &[Cell]) -> Result<Summary> {
    let mut vals: Vec<f64> = values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect();
    let count = vals.len();
    if count < 2 {
        return Err(Error::InsufficientData {
            series: key.to_string(),
            count,
        });
    }
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let n = count as f64;
    let mean = vals.iter().sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in &vals {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    m2 /= n;
    m3 /= n;
    m4 /= n;

    // Degenerate series (all values equal) report 0 for both shape moments.
    let (skewness, kurtosis) = if m2 > 0.0 {
        (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
    } else {
        (0.0, 0.0)
    };

    Ok(Summary {
        key: key.to_string(),
        count,
        missing: values.len() - count,
        mean,
        std_dev: m2.sqrt(),
        skewness,
        kurtosis,
        min: vals[0],
        q1: percentile(&vals, 25.0),
        median: percentile(&vals, 50.0),
        q3: percentile(&vals, 75.0),
        max: vals[count - 1],
    })
}

/// Per-key summaries along one axis of a table.
///
/// Series below the 2-value threshold land in `skipped` with the reason; they
/// never abort the batch, so one bad series cannot block statistics for the
/// rest.
#[derive(Debug, Clone, Serialize)]
pub struct AxisSummaries {
    pub axis: Axis,
    pub reports: BTreeMap<String, Summary>,
    pub skipped: BTreeMap<String, String>,
}

/// Apply [`describe`] along the requested axis over every row or column.
///
/// The axis is caller-selected on purpose: "per-country over all years" and
/// "per-year across countries" are both in active use for the same
/// indicators, so neither is hardcoded.
pub fn describe_all<T: Table>(table: &T, axis: Axis) -> AxisSummaries {
    let keys = match axis {
        Axis::Rows => table.row_keys(),
        Axis::Columns => table.column_keys(),
    };
    let mut out = AxisSummaries {
        axis,
        reports: BTreeMap::new(),
        skipped: BTreeMap::new(),
    };
    for (i, key) in keys.iter().enumerate() {
        let series: Vec<Cell> = match axis {
            Axis::Rows => table.row(i).to_vec(),
            Axis::Columns => table.column(i),
        };
        match describe(key, &series) {
            Ok(summary) => {
                out.reports.insert(key.clone(), summary);
            }
            Err(e) => {
                log::debug!("skipping series {key:?}: {e}");
                out.skipped.insert(key.clone(), e.to_string());
            }
        }
    }
    out
}

/// All cells of a table in row-major order. The bar-chart analyses pool the
/// whole table into one series before describing it.
pub fn flatten<T: Table>(table: &T) -> Vec<Cell> {
    (0..table.row_keys().len())
        .flat_map(|i| table.row(i).iter().copied().collect::<Vec<_>>())
        .collect()
}

/// Pearson correlation over a set of named columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[i][j]` is the correlation of `labels[i]` with `labels[j]`;
    /// `None` when fewer than 2 complete pairs exist or a column is constant.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values[i][j]
    }
}

/// Correlate the named columns of `table` pairwise, using complete
/// observations only (a row missing in either column is dropped for that
/// pair). An empty `columns` selection means all columns. Unknown names are
/// [`Error::Schema`].
pub fn correlation_matrix<T: Table>(table: &T, columns: &[String]) -> Result<CorrelationMatrix> {
    let all = table.column_keys();
    let selected: Vec<usize> = if columns.is_empty() {
        (0..all.len()).collect()
    } else {
        columns
            .iter()
            .map(|c| {
                all.iter()
                    .position(|k| k == c)
                    .ok_or_else(|| Error::Schema { name: c.clone() })
            })
            .collect::<Result<_>>()?
    };

    let labels: Vec<String> = selected.iter().map(|&j| all[j].clone()).collect();
    let series: Vec<Vec<Cell>> = selected.iter().map(|&j| table.column(j)).collect();
    let values = series
        .iter()
        .map(|a| series.iter().map(|b| pearson(a, b)).collect())
        .collect();
    Ok(CorrelationMatrix { labels, values })
}

fn pearson(a: &[Cell], b: &[Cell]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(cov / denom)
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty and
/// ascending.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * p / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let w = rank - lo as f64;
        sorted[lo] * (1.0 - w) + sorted[hi] * w
    }
}
