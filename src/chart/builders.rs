//! Chart builders: pure functions from a view or the raw dataset to a
//! [`ChartSpec`]. Every binding is a column name and is checked against the
//! columns the input actually has.

use std::collections::BTreeMap;

use super::spec::{
    Bin, Bindings, BoxStats, ChartData, ChartKind, ChartSpec, Point, PointSeries, Series, Slice,
};
use crate::data::aggregate::AggregatedView;
use crate::data::model::{Dataset, Field, Record, Value};
use crate::error::ValidationError;

/// Series name used when no color binding splits the data.
pub const SINGLE_SERIES: &str = "all";

// ---------------------------------------------------------------------------
// Binding resolution
// ---------------------------------------------------------------------------

/// Where a bound column lives inside an [`AggregatedView`].
#[derive(Debug, Clone, Copy, PartialEq)]
enum ViewColumn {
    Group(usize),
    Value,
}

fn view_column(view: &AggregatedView, name: &str) -> Result<ViewColumn, ValidationError> {
    if let Some(idx) = view.group_fields.iter().position(|f| f.column() == name) {
        return Ok(ViewColumn::Group(idx));
    }
    if view.value_field.column() == name {
        return Ok(ViewColumn::Value);
    }
    Err(ValidationError::unknown(name, &view.columns()))
}

fn view_group(view: &AggregatedView, name: &str) -> Result<usize, ValidationError> {
    match view_column(view, name)? {
        ViewColumn::Group(idx) => Ok(idx),
        ViewColumn::Value => Err(ValidationError::InvalidOption(format!(
            "'{name}' is the aggregated value, not a grouping column"
        ))),
    }
}

fn view_value(view: &AggregatedView, name: &str) -> Result<(), ValidationError> {
    match view_column(view, name)? {
        ViewColumn::Value => Ok(()),
        ViewColumn::Group(_) => Err(ValidationError::InvalidOption(format!(
            "'{name}' is a grouping column, not the aggregated value"
        ))),
    }
}

/// Every grouping column of `view` must be bound, otherwise two entries
/// would land on the same mark.
fn require_all_groups_bound(
    view: &AggregatedView,
    bound: &[usize],
) -> Result<(), ValidationError> {
    match (0..view.group_fields.len()).find(|i| !bound.contains(i)) {
        Some(i) => Err(ValidationError::InvalidOption(format!(
            "view is grouped by unbound column '{}'",
            view.group_fields[i]
        ))),
        None => Ok(()),
    }
}

fn dataset_field(dataset: &Dataset, name: &str) -> Result<Field, ValidationError> {
    Field::from_column(name).ok_or_else(|| ValidationError::unknown(name, &dataset.column_names()))
}

fn numeric_field(dataset: &Dataset, name: &str) -> Result<Field, ValidationError> {
    let field = dataset_field(dataset, name)?;
    if field.is_numeric() {
        Ok(field)
    } else {
        Err(ValidationError::NotNumeric(name.to_string()))
    }
}

/// Distinct values in order of first appearance.
fn distinct_in_order<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    let mut seen = Vec::new();
    for v in values {
        if !seen.contains(v) {
            seen.push(v.clone());
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// View-based builders
// ---------------------------------------------------------------------------

/// Bars of `y` per `x` category, one series per `color` value.
pub fn grouped_bar(
    view: &AggregatedView,
    x: &str,
    y: &str,
    color: Option<&str>,
    title: &str,
) -> Result<ChartSpec, ValidationError> {
    let x_idx = view_group(view, x)?;
    view_value(view, y)?;
    let color_idx = color.map(|c| view_group(view, c)).transpose()?;
    let bound: Vec<usize> = std::iter::once(x_idx).chain(color_idx).collect();
    require_all_groups_bound(view, &bound)?;

    let categories = distinct_in_order(view.keys().map(|k| &k[x_idx]));
    let series = split_series(view, x_idx, color_idx, &categories);

    Ok(ChartSpec {
        kind: ChartKind::GroupedBar,
        title: title.to_string(),
        bindings: Bindings {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            color: color.map(str::to_string),
            ..Default::default()
        },
        data: ChartData::Bars {
            categories: categories.iter().map(|v| v.to_string()).collect(),
            series,
        },
    })
}

/// Areas of `y` over a numeric `x`, stacked or overlaid per `color` value.
/// Missing (x, color) cells count as zero.
pub fn area_over_time(
    view: &AggregatedView,
    x: &str,
    y: &str,
    color: Option<&str>,
    stacked: bool,
    title: &str,
) -> Result<ChartSpec, ValidationError> {
    let x_idx = view_group(view, x)?;
    if !view.group_fields[x_idx].is_numeric() {
        return Err(ValidationError::NotNumeric(x.to_string()));
    }
    view_value(view, y)?;
    let color_idx = color.map(|c| view_group(view, c)).transpose()?;
    let bound: Vec<usize> = std::iter::once(x_idx).chain(color_idx).collect();
    require_all_groups_bound(view, &bound)?;

    let mut xs = distinct_in_order(view.keys().map(|k| &k[x_idx]));
    xs.sort();
    let series = split_series(view, x_idx, color_idx, &xs);

    Ok(ChartSpec {
        kind: ChartKind::Area,
        title: title.to_string(),
        bindings: Bindings {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            color: color.map(str::to_string),
            ..Default::default()
        },
        data: ChartData::Areas {
            x: xs.iter().filter_map(Value::as_f64).collect(),
            series,
            stacked,
        },
    })
}

/// One series per color value, aligned with `positions` along x.
fn split_series(
    view: &AggregatedView,
    x_idx: usize,
    color_idx: Option<usize>,
    positions: &[Value],
) -> Vec<Series> {
    let names: Vec<Option<Value>> = match color_idx {
        Some(c) => distinct_in_order(view.keys().map(|k| &k[c]))
            .into_iter()
            .map(Some)
            .collect(),
        None if view.is_empty() => Vec::new(),
        None => vec![None],
    };

    names
        .into_iter()
        .map(|name| {
            // All grouping columns are bound, so x and color pin down a key.
            let values = positions
                .iter()
                .map(|pos| {
                    let mut key = vec![pos.clone(); view.group_fields.len()];
                    if let (Some(c), Some(name)) = (color_idx, &name) {
                        key[c] = name.clone();
                    }
                    key[x_idx] = pos.clone();
                    view.get(&key).unwrap_or(0.0)
                })
                .collect();
            Series {
                name: name.map_or_else(|| SINGLE_SERIES.to_string(), |n| n.to_string()),
                values,
            }
        })
        .collect()
}

/// Proportions of `values` per `names` category.
pub fn pie(
    view: &AggregatedView,
    names: &str,
    values: &str,
    title: &str,
) -> Result<ChartSpec, ValidationError> {
    let name_idx = view_group(view, names)?;
    view_value(view, values)?;
    require_all_groups_bound(view, &[name_idx])?;

    let total = view.total();
    let slices = view
        .entries
        .iter()
        .map(|(key, value)| Slice {
            label: key[name_idx].to_string(),
            value: *value,
            fraction: if total == 0.0 { 0.0 } else { value / total },
        })
        .collect();

    Ok(ChartSpec {
        kind: ChartKind::Pie,
        title: title.to_string(),
        bindings: Bindings {
            x: Some(names.to_string()),
            y: Some(values.to_string()),
            ..Default::default()
        },
        data: ChartData::Pie { slices },
    })
}

// ---------------------------------------------------------------------------
// Dataset-based builders
// ---------------------------------------------------------------------------

/// Distribution of numeric `y` per `x` category, categories in natural order.
pub fn box_by_category(
    dataset: &Dataset,
    x: &str,
    y: &str,
    title: &str,
) -> Result<ChartSpec, ValidationError> {
    let x_field = dataset_field(dataset, x)?;
    let y_field = numeric_field(dataset, y)?;

    let mut groups: BTreeMap<Value, Vec<f64>> = BTreeMap::new();
    for r in dataset.records() {
        if let Some(v) = r.numeric(y_field) {
            groups.entry(r.value(x_field)).or_default().push(v);
        }
    }

    let boxes = groups
        .into_iter()
        .map(|(label, values)| box_stats(label.to_string(), values))
        .collect();

    Ok(ChartSpec {
        kind: ChartKind::Box,
        title: title.to_string(),
        bindings: Bindings {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            ..Default::default()
        },
        data: ChartData::Boxes { boxes },
    })
}

/// Quantile by linear interpolation between closest ranks. `sorted` must be
/// non-empty and ascending.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn box_stats(label: String, mut values: Vec<f64>) -> BoxStats {
    values.sort_by(f64::total_cmp);
    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);
    let fence = 1.5 * (q3 - q1);
    let (low_fence, high_fence) = (q1 - fence, q3 + fence);

    let inside = values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);

    BoxStats {
        label,
        count: values.len(),
        min: values[0],
        q1,
        median,
        q3,
        max: values[values.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers: values
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect(),
    }
}

/// Equal-width histogram of numeric `x`. With a `color` binding one count
/// series per color value is produced over shared bins, meant to be drawn
/// overlaid.
pub fn histogram(
    dataset: &Dataset,
    x: &str,
    color: Option<&str>,
    bins: usize,
    title: &str,
) -> Result<ChartSpec, ValidationError> {
    let x_field = numeric_field(dataset, x)?;
    let color_field = color.map(|c| dataset_field(dataset, c)).transpose()?;
    if bins == 0 {
        return Err(ValidationError::InvalidOption(
            "histogram needs at least one bin".to_string(),
        ));
    }

    let values: Vec<(Option<Value>, f64)> = dataset
        .records()
        .iter()
        .filter_map(|r| Some((color_field.map(|f| r.value(f)), r.numeric(x_field)?)))
        .collect();

    let (bin_edges, series) = if values.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let min = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let mut max = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
        if max == min {
            max = min + 1.0;
        }
        let width = (max - min) / bins as f64;
        let bin_edges: Vec<Bin> = (0..bins)
            .map(|i| Bin {
                start: min + width * i as f64,
                end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            })
            .collect();

        let mut counts: BTreeMap<Option<Value>, Vec<f64>> = BTreeMap::new();
        for (group, v) in values {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts.entry(group).or_insert_with(|| vec![0.0; bins])[idx] += 1.0;
        }
        let series = counts
            .into_iter()
            .map(|(group, values)| Series {
                name: group.map_or_else(|| SINGLE_SERIES.to_string(), |g| g.to_string()),
                values,
            })
            .collect();
        (bin_edges, series)
    };

    Ok(ChartSpec {
        kind: ChartKind::Histogram,
        title: title.to_string(),
        bindings: Bindings {
            x: Some(x.to_string()),
            color: color.map(str::to_string),
            ..Default::default()
        },
        data: ChartData::Histogram {
            bins: bin_edges,
            series,
        },
    })
}

/// Points in three numeric dimensions, one series per `color` value.
pub fn scatter_3d(
    dataset: &Dataset,
    x: &str,
    y: &str,
    z: &str,
    color: Option<&str>,
    title: &str,
) -> Result<ChartSpec, ValidationError> {
    let x_field = numeric_field(dataset, x)?;
    let y_field = numeric_field(dataset, y)?;
    let z_field = numeric_field(dataset, z)?;
    let color_field = color.map(|c| dataset_field(dataset, c)).transpose()?;

    let series = point_series(dataset, color_field, |r| {
        Some(Point {
            label: r.country.clone(),
            x: r.numeric(x_field)?,
            y: r.numeric(y_field)?,
            z: Some(r.numeric(z_field)?),
            size: None,
            radius: None,
        })
    });

    Ok(ChartSpec {
        kind: ChartKind::Scatter3d,
        title: title.to_string(),
        bindings: Bindings {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            z: Some(z.to_string()),
            color: color.map(str::to_string),
            ..Default::default()
        },
        data: ChartData::Points {
            series,
            log_x: false,
        },
    })
}

/// Scatter with a size channel. Marker area is proportional to `size`, the
/// largest value getting radius `size_max`. On a log x axis rows with
/// non-positive x are left out.
#[allow(clippy::too_many_arguments)]
pub fn bubble(
    dataset: &Dataset,
    x: &str,
    y: &str,
    size: &str,
    color: Option<&str>,
    size_max: f64,
    log_x: bool,
    title: &str,
) -> Result<ChartSpec, ValidationError> {
    let x_field = numeric_field(dataset, x)?;
    let y_field = numeric_field(dataset, y)?;
    let size_field = numeric_field(dataset, size)?;
    let color_field = color.map(|c| dataset_field(dataset, c)).transpose()?;
    if size_max.is_nan() || size_max <= 0.0 {
        return Err(ValidationError::InvalidOption(format!(
            "size_max must be positive, got {size_max}"
        )));
    }

    let largest = dataset
        .records()
        .iter()
        .filter_map(|r| r.numeric(size_field))
        .fold(0.0_f64, f64::max);

    let series = point_series(dataset, color_field, |r| {
        let x = r.numeric(x_field)?;
        if log_x && x <= 0.0 {
            return None;
        }
        let size = r.numeric(size_field)?;
        let radius = if largest > 0.0 {
            size_max * (size.max(0.0) / largest).sqrt()
        } else {
            0.0
        };
        Some(Point {
            label: r.country.clone(),
            x,
            y: r.numeric(y_field)?,
            z: None,
            size: Some(size),
            radius: Some(radius),
        })
    });

    Ok(ChartSpec {
        kind: ChartKind::Bubble,
        title: title.to_string(),
        bindings: Bindings {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            size: Some(size.to_string()),
            color: color.map(str::to_string),
            ..Default::default()
        },
        data: ChartData::Points { series, log_x },
    })
}

/// Group rows into point series by `color_field` (natural order).
fn point_series(
    dataset: &Dataset,
    color_field: Option<Field>,
    to_point: impl Fn(&Record) -> Option<Point>,
) -> Vec<PointSeries> {
    let mut groups: BTreeMap<Option<Value>, Vec<Point>> = BTreeMap::new();
    for r in dataset.records() {
        if let Some(p) = to_point(r) {
            groups.entry(color_field.map(|f| r.value(f))).or_default().push(p);
        }
    }
    groups
        .into_iter()
        .map(|(group, points)| PointSeries {
            name: group.map_or_else(|| SINGLE_SERIES.to_string(), |g| g.to_string()),
            points,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{mean_by, sum_by};
    use crate::data::model::tests::{record, sample_dataset};
    use crate::data::model::Continent;

    #[test]
    fn grouped_bar_splits_by_color() {
        let ds = sample_dataset();
        let view = sum_by(&ds, &[Field::Year, Field::Continent], Field::Pop)
            .unwrap()
            .sorted();
        let spec = grouped_bar(&view, "continent", "pop", Some("year"), "Pop").unwrap();
        let ChartData::Bars { categories, series } = &spec.data else {
            panic!("expected bars");
        };
        assert_eq!(categories, &vec!["Africa", "Asia", "Europe"]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "2002");
        assert_eq!(series[0].values, vec![39.0, 120.0, 60.0]);
        assert_eq!(series[1].values, vec![45.0, 127.0, 62.0]);
    }

    #[test]
    fn grouped_bar_single_series() {
        let ds = sample_dataset();
        let view = mean_by(&ds, Field::Continent, Field::Pop).unwrap().sorted();
        let spec = grouped_bar(&view, "continent", "pop", None, "").unwrap();
        let ChartData::Bars { series, .. } = &spec.data else {
            panic!("expected bars");
        };
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, SINGLE_SERIES);
        assert_eq!(series[0].values, vec![21.0, 123.5, 61.0]);
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let ds = sample_dataset();
        let view = mean_by(&ds, Field::Continent, Field::Pop).unwrap();

        let err = grouped_bar(&view, "region", "pop", None, "").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownColumn { ref column, .. } if column == "region"));
        assert!(matches!(
            pie(&view, "continent", "population", ""),
            Err(ValidationError::UnknownColumn { .. })
        ));
        assert!(matches!(
            box_by_category(&ds, "continent", "GDP", ""),
            Err(ValidationError::UnknownColumn { .. })
        ));
        assert!(matches!(
            scatter_3d(&ds, "gdpPercap", "lifeExp", "height", None, ""),
            Err(ValidationError::UnknownColumn { .. })
        ));
        assert!(matches!(
            bubble(&ds, "gdpPercap", "lifeExp", "pop", Some("region"), 40.0, true, ""),
            Err(ValidationError::UnknownColumn { .. })
        ));
        assert!(matches!(
            histogram(&ds, "age", None, 10, ""),
            Err(ValidationError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn categorical_column_is_not_numeric() {
        let ds = sample_dataset();
        assert_eq!(
            histogram(&ds, "country", None, 10, ""),
            Err(ValidationError::NotNumeric("country".to_string()))
        );
        let view = sum_by(&ds, &[Field::Continent], Field::Pop).unwrap();
        assert_eq!(
            area_over_time(&view, "continent", "pop", None, true, ""),
            Err(ValidationError::NotNumeric("continent".to_string()))
        );
    }

    #[test]
    fn unbound_grouping_column_is_rejected() {
        let ds = sample_dataset();
        let view = sum_by(&ds, &[Field::Year, Field::Continent], Field::Pop).unwrap();
        assert!(matches!(
            pie(&view, "continent", "pop", ""),
            Err(ValidationError::InvalidOption(_))
        ));
    }

    #[test]
    fn area_fills_missing_cells_with_zero() {
        let ds = Dataset::from_records(vec![
            record("A", Continent::Africa, 1952, 10),
            record("B", Continent::Asia, 1957, 20),
            record("A", Continent::Africa, 1957, 12),
        ])
        .unwrap();
        let view = sum_by(&ds, &[Field::Year, Field::Continent], Field::Pop)
            .unwrap()
            .sorted();
        let spec = area_over_time(&view, "year", "pop", Some("continent"), true, "").unwrap();
        let ChartData::Areas { x, series, stacked } = &spec.data else {
            panic!("expected areas");
        };
        assert!(*stacked);
        assert_eq!(x, &vec![1952.0, 1957.0]);
        assert_eq!(series[0].name, "Africa");
        assert_eq!(series[0].values, vec![10.0, 12.0]);
        assert_eq!(series[1].name, "Asia");
        assert_eq!(series[1].values, vec![0.0, 20.0]);
    }

    #[test]
    fn pie_fractions_sum_to_one() {
        let ds = sample_dataset();
        let view = sum_by(&ds, &[Field::Continent], Field::Pop).unwrap().sorted();
        let spec = pie(&view, "continent", "pop", "").unwrap();
        let ChartData::Pie { slices } = &spec.data else {
            panic!("expected pie");
        };
        let total: f64 = slices.iter().map(|s| s.fraction).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(slices[0].label, "Africa");
        assert_eq!(slices[0].value, 84.0);
    }

    #[test]
    fn box_statistics_use_linear_quantiles() {
        let stats = box_stats("x".to_string(), vec![7.0, 1.0, 3.0, 2.0, 100.0, 4.0, 5.0, 6.0]);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 100.0);
        assert!((stats.q1 - 2.75).abs() < 1e-12);
        assert!((stats.median - 4.5).abs() < 1e-12);
        assert!((stats.q3 - 6.25).abs() < 1e-12);
        assert_eq!(stats.upper_whisker, 7.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.outliers, vec![100.0]);
    }

    #[test]
    fn box_categories_are_sorted() {
        let ds = sample_dataset();
        let spec = box_by_category(&ds, "continent", "lifeExp", "").unwrap();
        let ChartData::Boxes { boxes } = &spec.data else {
            panic!("expected boxes");
        };
        let labels: Vec<&str> = boxes.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Africa", "Asia", "Europe"]);
        assert_eq!(boxes[0].count, 4);
    }

    #[test]
    fn histogram_counts_every_row_once() {
        let ds = sample_dataset();
        let spec = histogram(&ds, "lifeExp", Some("continent"), 5, "").unwrap();
        let ChartData::Histogram { bins, series } = &spec.data else {
            panic!("expected histogram");
        };
        assert_eq!(bins.len(), 5);
        assert_eq!(series.len(), 3);
        let total: f64 = series.iter().flat_map(|s| s.values.iter()).sum();
        assert_eq!(total, ds.len() as f64);
        // the maximum lands in the last bin
        assert_eq!(series[1].values[4], 2.0);
        assert_eq!(
            histogram(&ds, "lifeExp", None, 0, "").unwrap_err(),
            ValidationError::InvalidOption("histogram needs at least one bin".to_string())
        );
    }

    #[test]
    fn bubble_radius_scales_with_area() {
        let ds = sample_dataset();
        let spec = bubble(&ds, "gdpPercap", "lifeExp", "pop", Some("continent"), 40.0, true, "")
            .unwrap();
        let ChartData::Points { series, log_x } = &spec.data else {
            panic!("expected points");
        };
        assert!(*log_x);
        let japan = series
            .iter()
            .flat_map(|s| s.points.iter())
            .find(|p| p.label == "Japan" && p.size == Some(127.0))
            .unwrap();
        assert_eq!(japan.radius, Some(40.0));
        let chad = series[0].points.iter().find(|p| p.size == Some(10.0)).unwrap();
        assert!((chad.radius.unwrap() - 40.0 * (10.0_f64 / 127.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn scatter_keeps_three_dimensions() {
        let ds = sample_dataset();
        let spec = scatter_3d(&ds, "gdpPercap", "lifeExp", "pop", Some("continent"), "").unwrap();
        let ChartData::Points { series, .. } = &spec.data else {
            panic!("expected points");
        };
        assert_eq!(series.iter().map(|s| s.points.len()).sum::<usize>(), ds.len());
        assert!(series.iter().flat_map(|s| &s.points).all(|p| p.z.is_some()));
        assert_eq!(spec.bindings.z.as_deref(), Some("pop"));
    }

    #[test]
    fn empty_input_gives_empty_specs() {
        let ds = Dataset::default();
        let mean = mean_by(&ds, Field::Continent, Field::GdpPercap).unwrap();
        let sums = sum_by(&ds, &[Field::Year, Field::Continent], Field::Pop).unwrap();

        let specs = vec![
            grouped_bar(&mean, "continent", "gdpPercap", None, "").unwrap(),
            area_over_time(&sums, "year", "pop", Some("continent"), true, "").unwrap(),
            pie(&mean, "continent", "gdpPercap", "").unwrap(),
            box_by_category(&ds, "continent", "lifeExp", "").unwrap(),
            histogram(&ds, "lifeExp", Some("continent"), 20, "").unwrap(),
            scatter_3d(&ds, "gdpPercap", "lifeExp", "pop", Some("continent"), "").unwrap(),
            bubble(&ds, "gdpPercap", "lifeExp", "pop", Some("continent"), 40.0, true, "").unwrap(),
        ];
        assert!(specs.iter().all(ChartSpec::is_empty));
    }
}
