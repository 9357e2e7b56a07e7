//! wbtab_rs
//!
//! A lightweight Rust library for reshaping, summarizing, and visualizing
//! World Bank indicator CSV exports. Pairs with the `wbtab` CLI.
//!
//! ### Features
//! - Load World-Bank-format CSVs (entity rows, one column per year)
//! - Derive the two canonical orientations: entity-indexed and
//!   period-indexed (exact transposes of each other)
//! - Summary statistics per row or column: count, mean, population standard
//!   deviation, skewness, excess kurtosis, quartiles
//! - Pearson correlation matrices over named indicator columns
//! - Generate SVG/PNG bar, line, and heatmap charts from the tables
//!
//! ### Example
//! ```no_run
//! use wbtab_rs::{reshape, stats, viz, Axis};
//!
//! let raw = reshape::load("gdp_growth.csv")?;
//! let by_country = reshape::to_entity_indexed(&raw, "Country Name")?;
//! let by_year = reshape::to_period_indexed(&by_country);
//! let summaries = stats::describe_all(&by_country, Axis::Rows);
//! println!("{:#?}", summaries.reports);
//! viz::plot_lines(&by_year, "gdp.svg", 1000, 600, "GDP growth", "annual %", "en")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod error;
pub mod models;
pub mod reshape;
pub mod stats;
pub mod storage;
pub mod viz;

pub use error::Error;
pub use models::{Axis, Cell, EntityIndexedTable, PeriodIndexedTable, RawTable, Table};
pub use stats::{Summary, describe, describe_all};
