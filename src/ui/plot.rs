use std::f64::consts::TAU;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, MarkerShape, Plot,
    PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::chart::builders::SINGLE_SERIES;
use crate::chart::spec::{BoxStats, ChartData, ChartSpec, PointSeries, Series, Slice};
use crate::color::ColorMap;
use crate::data::model::Field;

const PLOT_HEIGHT: f32 = 340.0;
const FILL_ALPHA: f32 = 0.45;

// ---------------------------------------------------------------------------
// Chart (one ChartSpec → one plot)
// ---------------------------------------------------------------------------

/// Draw `spec` with its title. `index` keeps plot ids unique on a page.
pub fn chart(ui: &mut Ui, spec: &ChartSpec, colors: &ColorMap, index: usize) {
    ui.label(RichText::new(&spec.title).strong().size(16.0));
    if spec.is_empty() {
        ui.label(RichText::new("No data to display.").italics());
        return;
    }

    let x_label = axis_label(spec.bindings.x.as_deref());
    let y_label = axis_label(spec.bindings.y.as_deref());

    match &spec.data {
        ChartData::Bars { categories, series } => {
            bars(ui, index, categories, series, colors, &x_label, &y_label)
        }
        ChartData::Areas { x, series, stacked } => {
            areas(ui, index, x, series, *stacked, colors, &x_label, &y_label)
        }
        ChartData::Pie { slices } => pie(ui, index, slices, colors),
        ChartData::Boxes { boxes } => box_plot(ui, index, boxes, colors, &x_label, &y_label),
        ChartData::Histogram { bins, series } => {
            let bars: Vec<(f64, f64)> = bins.iter().map(|b| (b.center(), b.width())).collect();
            histogram(ui, index, &bars, series, colors, &x_label)
        }
        ChartData::Points { series, log_x } => match spec.bindings.z.as_deref() {
            Some(z) => scatter_3d(ui, index, series, colors, [&x_label, &y_label, &axis_label(Some(z))]),
            None => bubbles(ui, index, series, *log_x, colors, &x_label, &y_label),
        },
    }
}

fn axis_label(column: Option<&str>) -> String {
    match column {
        Some(c) => Field::from_column(c).map_or_else(|| c.to_string(), |f| f.label().to_string()),
        None => String::new(),
    }
}

fn base_plot(id: (&str, usize), x_label: &str, y_label: &str) -> Plot<'static> {
    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_scroll(false)
}

/// Axis formatter that shows category names at integer positions.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn bars(
    ui: &mut Ui,
    index: usize,
    categories: &[String],
    series: &[Series],
    colors: &ColorMap,
    x_label: &str,
    y_label: &str,
) {
    let group_width = 0.8;
    let bar_width = group_width / series.len().max(1) as f64;

    base_plot(("bars", index), x_label, y_label)
        .x_axis_formatter(category_formatter(categories.to_vec()))
        .show(ui, |plot_ui| {
            for (s_idx, s) in series.iter().enumerate() {
                let offset = -group_width / 2.0 + bar_width * (s_idx as f64 + 0.5);
                let series_color = colors.color_for(&s.name);
                let bars: Vec<Bar> = s
                    .values
                    .iter()
                    .zip(categories)
                    .enumerate()
                    .map(|(i, (v, category))| {
                        // An unsplit series is coloured per category.
                        let color = if s.name == SINGLE_SERIES {
                            colors.color_for(category)
                        } else {
                            series_color
                        };
                        Bar::new(i as f64 + offset, *v)
                            .width(bar_width * 0.95)
                            .name(category)
                            .fill(color)
                            .stroke(Stroke::new(1.0, color))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&s.name).color(series_color));
            }
        });
}

// ---------------------------------------------------------------------------
// Areas
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn areas(
    ui: &mut Ui,
    index: usize,
    x: &[f64],
    series: &[Series],
    stacked: bool,
    colors: &ColorMap,
    x_label: &str,
    y_label: &str,
) {
    base_plot(("areas", index), x_label, y_label).show(ui, |plot_ui| {
        let mut baseline = vec![0.0; x.len()];
        for s in series {
            let color = colors.color_for(&s.name);
            let lower: Vec<f64> = if stacked { baseline.clone() } else { vec![0.0; x.len()] };
            let upper: Vec<f64> = lower.iter().zip(&s.values).map(|(b, v)| b + v).collect();

            let mut outline: Vec<[f64; 2]> = x.iter().zip(&upper).map(|(x, y)| [*x, *y]).collect();
            outline.extend(x.iter().zip(&lower).rev().map(|(x, y)| [*x, *y]));

            plot_ui.polygon(
                Polygon::new(PlotPoints::from(outline))
                    .name(&s.name)
                    .fill_color(color.gamma_multiply(FILL_ALPHA))
                    .stroke(Stroke::new(0.0, color)),
            );
            let top: PlotPoints = x.iter().zip(&upper).map(|(x, y)| [*x, *y]).collect();
            plot_ui.line(Line::new(top).name(&s.name).color(color).width(1.5));

            if stacked {
                baseline = upper;
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

fn pie(ui: &mut Ui, index: usize, slices: &[Slice], colors: &ColorMap) {
    Plot::new(("pie", index))
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for slice in slices {
                let sweep = slice.fraction * TAU;
                let color = colors.color_for(&slice.label);
                // ~1 vertex per degree keeps the arc smooth.
                let steps = ((sweep.to_degrees()).ceil() as usize).max(1);
                let mut wedge = vec![[0.0, 0.0]];
                wedge.extend((0..=steps).map(|i| {
                    let angle = start + sweep * i as f64 / steps as f64;
                    [angle.cos(), angle.sin()]
                }));
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(wedge))
                        .name(&slice.label)
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );

                if slice.fraction >= 0.02 {
                    let mid = start + sweep / 2.0;
                    plot_ui.text(Text::new(
                        PlotPoint::new(0.7 * mid.cos(), 0.7 * mid.sin()),
                        RichText::new(format!("{:.1}%", slice.fraction * 100.0))
                            .color(Color32::WHITE)
                            .strong(),
                    ));
                }
                start += sweep;
            }
        });
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

fn box_plot(
    ui: &mut Ui,
    index: usize,
    boxes: &[BoxStats],
    colors: &ColorMap,
    x_label: &str,
    y_label: &str,
) {
    let labels: Vec<String> = boxes.iter().map(|b| b.label.clone()).collect();
    base_plot(("boxes", index), x_label, y_label)
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            for (i, b) in boxes.iter().enumerate() {
                let color = colors.color_for(&b.label);
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .name(&b.label)
                .box_width(0.6)
                .whisker_width(0.3)
                .fill(color.gamma_multiply(FILL_ALPHA))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&b.label).color(color));

                if !b.outliers.is_empty() {
                    let outliers: PlotPoints = b.outliers.iter().map(|v| [i as f64, *v]).collect();
                    plot_ui.points(
                        Points::new(outliers)
                            .name(&b.label)
                            .color(color)
                            .radius(2.5)
                            .shape(MarkerShape::Circle),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Histogram (overlaid)
// ---------------------------------------------------------------------------

fn histogram(
    ui: &mut Ui,
    index: usize,
    bins: &[(f64, f64)],
    series: &[Series],
    colors: &ColorMap,
    x_label: &str,
) {
    base_plot(("histogram", index), x_label, "Count").show(ui, |plot_ui| {
        for s in series {
            let color = colors.color_for(&s.name);
            let bars: Vec<Bar> = bins
                .iter()
                .zip(&s.values)
                .filter(|(_, count)| **count > 0.0)
                .map(|((center, width), count)| {
                    Bar::new(*center, *count)
                        .width(*width)
                        .fill(color.gamma_multiply(FILL_ALPHA))
                        .stroke(Stroke::new(1.0, color))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(&s.name).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Bubble chart
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn bubbles(
    ui: &mut Ui,
    index: usize,
    series: &[PointSeries],
    log_x: bool,
    colors: &ColorMap,
    x_label: &str,
    y_label: &str,
) {
    let mut plot = base_plot(("bubbles", index), x_label, y_label);
    if log_x {
        plot = plot.x_axis_formatter(|mark, _range| format_number(10f64.powf(mark.value)));
    }
    plot.show(ui, |plot_ui| {
        for s in series {
            let color = colors.color_for(&s.name);
            for p in &s.points {
                let x = if log_x { p.x.log10() } else { p.x };
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[x, p.y]]))
                        .name(&s.name)
                        .color(color.gamma_multiply(0.7))
                        .filled(true)
                        .radius(p.radius.unwrap_or(3.0).max(1.5) as f32),
                );
            }
        }
    });
}

fn format_number(v: f64) -> String {
    if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

// ---------------------------------------------------------------------------
// 3D scatter (projected)
// ---------------------------------------------------------------------------

/// Map one axis onto [-1, 1]; axes spanning more than two decades use log10.
struct AxisScale {
    log: bool,
    min: f64,
    max: f64,
}

impl AxisScale {
    fn fit(values: impl Iterator<Item = f64> + Clone) -> Self {
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.fold(f64::NEG_INFINITY, f64::max);
        let log = min > 0.0 && max / min > 100.0;
        let (min, max) = if log { (min.log10(), max.log10()) } else { (min, max) };
        Self { log, min, max }
    }

    fn apply(&self, v: f64) -> f64 {
        let v = if self.log { v.log10() } else { v };
        if self.max > self.min {
            2.0 * (v - self.min) / (self.max - self.min) - 1.0
        } else {
            0.0
        }
    }
}

/// Orthographic projection after rotating by `yaw` around the vertical axis
/// and tilting by a fixed pitch.
fn project([x, y, z]: [f64; 3], yaw: f64) -> [f64; 2] {
    const PITCH: f64 = 0.45;
    let (sy, cy) = yaw.sin_cos();
    let (xr, zr) = (x * cy - z * sy, x * sy + z * cy);
    let (sp, cp) = PITCH.sin_cos();
    [xr, y * cp - zr * sp]
}

fn scatter_3d(
    ui: &mut Ui,
    index: usize,
    series: &[PointSeries],
    colors: &ColorMap,
    labels: [&str; 3],
) {
    let yaw_id = ui.id().with(("scatter3d_yaw", index));
    let mut yaw: f32 = ui.data_mut(|d| *d.get_temp_mut_or(yaw_id, 0.6));
    if ui
        .add(egui::Slider::new(&mut yaw, 0.0..=std::f32::consts::TAU).text("Rotate"))
        .changed()
    {
        ui.data_mut(|d| d.insert_temp(yaw_id, yaw));
    }
    ui.label(
        RichText::new(format!("x: {}   y: {}   depth: {}", labels[0], labels[1], labels[2]))
            .small()
            .weak(),
    );

    let all = || series.iter().flat_map(|s| s.points.iter());
    let sx = AxisScale::fit(all().map(|p| p.x));
    let sy = AxisScale::fit(all().map(|p| p.y));
    let sz = AxisScale::fit(all().map(|p| p.z.unwrap_or(0.0)));
    let yaw = yaw as f64;

    Plot::new(("scatter3d", index))
        .legend(Legend::default())
        .height(PLOT_HEIGHT + 60.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // Unit cube edges as a frame of reference.
            let corners = |i: u8| {
                [
                    if i & 1 == 0 { -1.0 } else { 1.0 },
                    if i & 2 == 0 { -1.0 } else { 1.0 },
                    if i & 4 == 0 { -1.0 } else { 1.0 },
                ]
            };
            for a in 0u8..8 {
                for bit in [1u8, 2, 4] {
                    let b = a | bit;
                    if b != a {
                        let edge: PlotPoints =
                            vec![project(corners(a), yaw), project(corners(b), yaw)].into();
                        plot_ui.line(Line::new(edge).color(Color32::from_gray(140)).width(0.5));
                    }
                }
            }

            for s in series {
                let color = colors.color_for(&s.name);
                let projected: PlotPoints = s
                    .points
                    .iter()
                    .map(|p| {
                        project(
                            [sx.apply(p.x), sy.apply(p.y), sz.apply(p.z.unwrap_or(0.0))],
                            yaw,
                        )
                    })
                    .collect();
                plot_ui.points(
                    Points::new(projected)
                        .name(&s.name)
                        .color(color)
                        .filled(true)
                        .radius(3.5),
                );
            }
        });
}
