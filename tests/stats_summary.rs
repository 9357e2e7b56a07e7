use wbtab_rs::error::Error;
use wbtab_rs::models::Axis;
use wbtab_rs::stats::{correlation_matrix, describe, describe_all, flatten};
use wbtab_rs::reshape;

fn assert_close(got: f64, want: f64, tol: f64) {
    assert!(
        (got - want).abs() < tol,
        "got {got}, want {want} (tol {tol})"
    );
}

#[test]
fn missing_values_are_excluded_not_zeroed() {
    let summary = describe(
        "gdp",
        &[Some(1.0), None, Some(3.0), None, Some(5.0)],
    )
    .unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.missing, 2);
    assert_close(summary.mean, 3.0, 1e-12);
    // Population std of {1, 3, 5}: sqrt(8/3).
    assert_close(summary.std_dev, 1.632_993_161_855_452, 1e-9);
    assert_eq!(summary.min, 1.0);
    assert_eq!(summary.max, 5.0);
}

#[test]
fn symmetric_series_has_zero_skew_and_negative_excess_kurtosis() {
    let summary = describe(
        "uniform",
        &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
    )
    .unwrap();
    assert_close(summary.skewness, 0.0, 1e-12);
    assert_close(summary.kurtosis, -1.3, 1e-9);
    assert_close(summary.mean, 3.0, 1e-12);
    assert_close(summary.std_dev, std::f64::consts::SQRT_2, 1e-12);
    // Linear-interpolation quartiles.
    assert_close(summary.q1, 2.0, 1e-12);
    assert_close(summary.median, 3.0, 1e-12);
    assert_close(summary.q3, 4.0, 1e-12);
}

#[test]
fn skewed_series_reports_positive_skew() {
    let summary = describe("skewed", &[Some(1.0), Some(1.0), Some(1.0), Some(10.0)]).unwrap();
    assert!(summary.skewness > 1.0, "got {}", summary.skewness);
}

#[test]
fn constant_series_reports_zero_shape_moments() {
    let summary = describe("flat", &[Some(4.0), Some(4.0), Some(4.0)]).unwrap();
    assert_eq!(summary.std_dev, 0.0);
    assert_eq!(summary.skewness, 0.0);
    assert_eq!(summary.kurtosis, 0.0);
}

#[test]
fn fewer_than_two_values_is_insufficient_data() {
    let err = describe("lonely", &[Some(7.0)]).unwrap_err();
    match err {
        Error::InsufficientData { series, count } => {
            assert_eq!(series, "lonely");
            assert_eq!(count, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(matches!(
        describe("empty", &[]),
        Err(Error::InsufficientData { count: 0, .. })
    ));
    // All-missing behaves like empty.
    assert!(matches!(
        describe("ghost", &[None, None, None]),
        Err(Error::InsufficientData { count: 0, .. })
    ));
}

const PANEL: &str = "\
Country Name,2018,2019,2020,2021
A,1.0,2.0,3.0,4.0
B,10.0,20.0,30.0,40.0
C,5.0,,,
";

#[test]
fn describe_all_rows_summarizes_each_entity() {
    let raw = reshape::load_from_reader(PANEL.as_bytes()).unwrap();
    let table = reshape::to_entity_indexed(&raw, "Country Name").unwrap();
    let summaries = describe_all(&table, Axis::Rows);

    let a = &summaries.reports["A"];
    assert_eq!(a.count, 4);
    assert_close(a.mean, 2.5, 1e-12);

    let b = &summaries.reports["B"];
    assert_close(b.mean, 25.0, 1e-12);

    // One value only: skipped, without blocking the rest of the batch.
    assert!(!summaries.reports.contains_key("C"));
    assert!(summaries.skipped["C"].contains("non-missing"));
}

#[test]
fn describe_all_columns_summarizes_each_period() {
    let raw = reshape::load_from_reader(PANEL.as_bytes()).unwrap();
    let table = reshape::to_entity_indexed(&raw, "Country Name").unwrap();
    let summaries = describe_all(&table, Axis::Columns);

    // 2018 across countries: {1, 10, 5}.
    let y2018 = &summaries.reports["2018"];
    assert_eq!(y2018.count, 3);
    assert_close(y2018.mean, 16.0 / 3.0, 1e-12);

    // 2019 across countries: {2, 20} with C missing.
    let y2019 = &summaries.reports["2019"];
    assert_eq!(y2019.count, 2);
    assert_eq!(y2019.missing, 1);
}

#[test]
fn describe_all_agrees_across_orientations() {
    let raw = reshape::load_from_reader(PANEL.as_bytes()).unwrap();
    let entity = reshape::to_entity_indexed(&raw, "Country Name").unwrap();
    let period = reshape::to_period_indexed(&entity);

    // Per-entity series are rows of one table and columns of the other.
    let by_rows = describe_all(&entity, Axis::Rows);
    let by_cols = describe_all(&period, Axis::Columns);
    assert_eq!(by_rows.reports, by_cols.reports);
    assert_eq!(by_rows.skipped, by_cols.skipped);
}

#[test]
fn flatten_pools_every_cell_in_row_major_order() {
    let raw = reshape::load_from_reader(PANEL.as_bytes()).unwrap();
    let table = reshape::to_entity_indexed(&raw, "Country Name").unwrap();
    let pooled = flatten(&table);
    assert_eq!(pooled.len(), 12);
    assert_eq!(pooled[0], Some(1.0));
    assert_eq!(pooled[4], Some(10.0));
    assert_eq!(pooled[9], None);

    let summary = describe("all values", &pooled).unwrap();
    assert_eq!(summary.count, 9);
    assert_eq!(summary.missing, 3);
}

const INDICATOR_PANEL: &str = "\
Country Name,GDP Growth,CO2 Emissions,Unemployment Rate
A,1.0,2.0,8.0
B,2.0,4.0,6.0
C,3.0,6.0,4.0
D,4.0,8.0,2.0
";

#[test]
fn correlation_matrix_over_named_columns() {
    let raw = reshape::load_from_reader(INDICATOR_PANEL.as_bytes()).unwrap();
    let table = reshape::to_entity_indexed(&raw, "Country Name").unwrap();
    let corr = correlation_matrix(
        &table,
        &["GDP Growth".to_string(), "Unemployment Rate".to_string()],
    )
    .unwrap();

    assert_eq!(corr.labels, ["GDP Growth", "Unemployment Rate"]);
    assert_close(corr.get(0, 0).unwrap(), 1.0, 1e-12);
    assert_close(corr.get(0, 1).unwrap(), -1.0, 1e-12);
    assert_close(corr.get(1, 0).unwrap(), -1.0, 1e-12);
}

#[test]
fn correlation_matrix_defaults_to_all_columns() {
    let raw = reshape::load_from_reader(INDICATOR_PANEL.as_bytes()).unwrap();
    let table = reshape::to_entity_indexed(&raw, "Country Name").unwrap();
    let corr = correlation_matrix(&table, &[]).unwrap();
    assert_eq!(corr.len(), 3);
    // GDP Growth and CO2 Emissions move in lockstep in this panel.
    assert_close(corr.get(0, 1).unwrap(), 1.0, 1e-12);
}

#[test]
fn correlation_matrix_rejects_unknown_columns() {
    let raw = reshape::load_from_reader(INDICATOR_PANEL.as_bytes()).unwrap();
    let table = reshape::to_entity_indexed(&raw, "Country Name").unwrap();
    let err = correlation_matrix(&table, &["Internet Usage".to_string()]).unwrap_err();
    assert!(matches!(err, Error::Schema { .. }), "got {err:?}");
}

#[test]
fn correlation_uses_pairwise_complete_observations() {
    let csv = "\
Country Name,X,Y
A,1.0,
B,2.0,4.0
C,3.0,6.0
D,,8.0
";
    let raw = reshape::load_from_reader(csv.as_bytes()).unwrap();
    let table = reshape::to_entity_indexed(&raw, "Country Name").unwrap();
    let corr = correlation_matrix(&table, &[]).unwrap();
    // Only B and C are complete pairs; they are perfectly correlated.
    assert_close(corr.get(0, 1).unwrap(), 1.0, 1e-12);
}
