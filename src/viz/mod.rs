//! Visualization utilities: render the reshaped tables to **SVG** or **PNG**.
//!
//! - Grouped bars (one bar group per entity, one bar per period)
//! - Multi-series lines (period on the x-axis, one line per entity)
//! - Annotated correlation heatmaps
//! - Distinct series colors (Microsoft Office palette)
//! - Locale-aware tick labels (`30,000` vs `30.000`)
//!
//! Rendering consumes the data model only; it never reshapes and never
//! computes statistics.

pub mod util;

use anyhow::{Result, anyhow};
use num_format::Locale;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::{EntityIndexedTable, PeriodIndexedTable, Table};
use crate::stats::CorrelationMatrix;
use util::{choose_axis_scale, diverging_color, fmt_tick, is_percentage_like, map_locale, office_color};

/// One-time registration for a fallback "sans-serif" font when using the
/// `ab_glyph` text path. Required because `ab_glyph` doesn't discover OS
/// fonts; we probe the usual install locations instead of bundling one.
static INIT_FONTS: Once = Once::new();
static FONTS_OK: AtomicBool = AtomicBool::new(false);

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

fn ensure_fonts_registered() {
    // Safe to call many times; only runs once.
    INIT_FONTS.call_once(|| {
        for path in FONT_CANDIDATES {
            if let Ok(bytes) = std::fs::read(path) {
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                if plotters::style::register_font(
                    "sans-serif",
                    plotters::style::FontStyle::Normal,
                    bytes,
                )
                .is_ok()
                {
                    log::debug!("registered chart font from {path}");
                    FONTS_OK.store(true, Ordering::Relaxed);
                    return;
                }
            }
        }
        log::debug!("no system font found; chart text will not render");
    });
}

/// Whether a usable chart font was found on this system. Text elements fail
/// to draw without one.
pub fn fonts_available() -> bool {
    ensure_fonts_registered();
    FONTS_OK.load(Ordering::Relaxed)
}

/// Render a grouped bar chart: one bar group per entity, one bar per period.
pub fn plot_grouped_bar<P: AsRef<Path>>(
    table: &EntityIndexedTable,
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
    y_label: &str,
    locale_tag: &str,
) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_grouped_bar(root, table, title, y_label, map_locale(locale_tag))
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_grouped_bar(root, table, title, y_label, map_locale(locale_tag))
    }
}

/// Render a multi-series line chart: period on the x-axis, one line per
/// entity.
pub fn plot_lines<P: AsRef<Path>>(
    table: &PeriodIndexedTable,
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
    y_label: &str,
    locale_tag: &str,
) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_lines(root, table, title, y_label, map_locale(locale_tag))
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_lines(root, table, title, y_label, map_locale(locale_tag))
    }
}

/// Render an annotated correlation heatmap on a diverging blue-white-red
/// ramp. Cells without a defined correlation are drawn gray and unlabeled.
pub fn plot_heatmap<P: AsRef<Path>>(
    corr: &CorrelationMatrix,
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_heatmap(root, corr, title)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_heatmap(root, corr, title)
    }
}

/// Y range plus axis title with magnitude scaling applied: percent units are
/// left alone, large counts are scaled to thousands/millions/...
fn scaled_y_range<T: Table>(
    table: &T,
    y_label: &str,
    include_zero: bool,
) -> Result<(f64, f64, f64, String)> {
    let values: Vec<f64> = (0..table.row_keys().len())
        .flat_map(|i| table.row(i).iter().copied())
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(anyhow!("no numeric values to plot"));
    }
    let mut min_val = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut max_val = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if include_zero {
        min_val = min_val.min(0.0);
        max_val = max_val.max(0.0);
    }
    if (max_val - min_val).abs() < f64::EPSILON {
        min_val -= 1.0;
        max_val += 1.0;
    }

    let max_abs = min_val.abs().max(max_val.abs());
    let (yscale, scale_word) = if is_percentage_like(y_label) {
        (1.0, "")
    } else {
        choose_axis_scale(max_abs)
    };
    let y_axis_title = match (y_label, scale_word) {
        ("", "") => "Value".to_string(),
        ("", sw) => format!("Value ({sw})"),
        (u, "") => u.to_string(),
        (u, sw) => format!("{u} ({sw})"),
    };
    // 5% headroom keeps the tallest bar/line off the frame.
    let pad = (max_val - min_val) * 0.05;
    Ok((
        (min_val - if min_val < 0.0 { pad } else { 0.0 }) / yscale,
        (max_val + pad) / yscale,
        yscale,
        y_axis_title,
    ))
}

/// Formatter for category axes: integer tick positions map to labels, the
/// rest stay blank.
fn category_fmt(labels: &[String]) -> impl Fn(&f64) -> String + '_ {
    move |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn draw_grouped_bar<DB>(
    root: DrawingArea<DB, Shift>,
    table: &EntityIndexedTable,
    title: &str,
    y_label: &str,
    locale: &Locale,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let entities = table.entities();
    let periods = table.periods();
    if entities.is_empty() || periods.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    let (y_min, y_max, yscale, y_title) = scaled_y_range(table, y_label, true)?;

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let n = entities.len() as f64;
    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(-0.5f64..(n - 0.5), y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Countries")
        .y_desc(y_title)
        .x_labels(entities.len().min(12))
        .y_labels(10)
        .x_label_formatter(&category_fmt(entities))
        .y_label_formatter(&|v| fmt_tick(*v, locale))
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    // One bar group per entity; within a group, one slot per period.
    let slot = 0.8 / periods.len() as f64;
    for (j, period) in periods.iter().enumerate() {
        let color = office_color(j);
        let bars = entities.iter().enumerate().filter_map(|(i, entity)| {
            let v = table.value(entity, period).ok().flatten()?;
            let x0 = i as f64 - 0.4 + j as f64 * slot;
            Some(Rectangle::new([(x0, 0.0), (x0 + slot, v / yscale)], color.filled()))
        });
        chart
            .draw_series(bars)
            .map_err(|e| anyhow!("{:?}", e))?
            .label(period.clone())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font((FontFamily::SansSerif, 13))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_lines<DB>(
    root: DrawingArea<DB, Shift>,
    table: &PeriodIndexedTable,
    title: &str,
    y_label: &str,
    locale: &Locale,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let periods = table.periods();
    let entities = table.entities();
    if entities.is_empty() || periods.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    let (y_min, y_max, yscale, y_title) = scaled_y_range(table, y_label, false)?;

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let n = periods.len() as f64;
    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(-0.5f64..(n - 0.5), y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc("Years")
        .y_desc(y_title)
        .x_labels(periods.len().min(12))
        .y_labels(10)
        .x_label_formatter(&category_fmt(periods))
        .y_label_formatter(&|v| fmt_tick(*v, locale))
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (idx, entity) in entities.iter().enumerate() {
        let color = office_color(idx);
        let style = ShapeStyle {
            color,
            filled: false,
            stroke_width: 2,
        };
        // Missing periods are skipped; the line connects across the gap.
        let pts: Vec<(f64, f64)> = periods
            .iter()
            .enumerate()
            .filter_map(|(j, period)| {
                let v = table.value(period, entity).ok().flatten()?;
                Some((j as f64, v / yscale))
            })
            .collect();
        chart
            .draw_series(LineSeries::new(pts, style))
            .map_err(|e| anyhow!("{:?}", e))?
            .label(entity.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font((FontFamily::SansSerif, 13))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_heatmap<DB>(root: DrawingArea<DB, Shift>, corr: &CorrelationMatrix, title: &str) -> Result<()>
where
    DB: DrawingBackend,
{
    let n = corr.len();
    if n == 0 {
        return Err(anyhow!("no data to plot"));
    }
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    // Wide left gutter: indicator names are long.
    let longest = corr.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let left_px = ((longest as u32) * 7 + 18).clamp(60, 220);

    let nf = n as f64;
    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 72)
        .build_cartesian_2d(-0.5f64..(nf - 0.5), -0.5f64..(nf - 0.5))
        .map_err(|e| anyhow!("{:?}", e))?;

    // Row 0 at the top, like the tabular view of the matrix.
    let flipped: Vec<String> = corr.labels.iter().rev().cloned().collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&category_fmt(&corr.labels))
        .y_label_formatter(&category_fmt(&flipped))
        .label_style((FontFamily::SansSerif, 11))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let cells = (0..n).flat_map(|row| (0..n).map(move |col| (row, col)));
    chart
        .draw_series(cells.clone().map(|(row, col)| {
            let y = (n - 1 - row) as f64;
            let color = match corr.get(row, col) {
                Some(r) => diverging_color((r + 1.0) / 2.0),
                None => RGBColor(200, 200, 200),
            };
            Rectangle::new(
                [(col as f64 - 0.5, y - 0.5), (col as f64 + 0.5, y + 0.5)],
                color.filled(),
            )
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    let annotations = cells.filter_map(|(row, col)| {
        let r = corr.get(row, col)?;
        // White text on the saturated ends of the ramp.
        let color = if r.abs() > 0.6 { &WHITE } else { &BLACK };
        let style = (FontFamily::SansSerif, 12)
            .into_font()
            .color(color)
            .pos(centered);
        let y = (n - 1 - row) as f64;
        Some(Text::new(format!("{:.2}", r), (col as f64, y), style))
    });
    chart
        .draw_series(annotations)
        .map_err(|e| anyhow!("{:?}", e))?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
