use serde::Serialize;

// ---------------------------------------------------------------------------
// ChartSpec – declarative chart description
// ---------------------------------------------------------------------------

/// What to draw. Built by [`super::builders`], drawn by `ui::plot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub bindings: Bindings,
    pub data: ChartData,
}

impl ChartSpec {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match &self.data {
            ChartData::Bars { categories, .. } => categories.is_empty(),
            ChartData::Areas { x, .. } => x.is_empty(),
            ChartData::Pie { slices } => slices.is_empty(),
            ChartData::Boxes { boxes } => boxes.is_empty(),
            ChartData::Histogram { bins, series } => {
                bins.is_empty() || series.iter().all(|s| s.values.iter().all(|c| *c == 0.0))
            }
            ChartData::Points { series, .. } => series.iter().all(|s| s.points.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    GroupedBar,
    Area,
    Pie,
    Box,
    Histogram,
    Scatter3d,
    Bubble,
}

/// Column bound to each visual channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Per-kind payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    /// `series[i].values[j]` is the bar of `categories[j]`.
    Bars {
        categories: Vec<String>,
        series: Vec<Series>,
    },
    /// `series[i].values[j]` is the height at `x[j]`, ascending x.
    Areas {
        x: Vec<f64>,
        series: Vec<Series>,
        stacked: bool,
    },
    Pie {
        slices: Vec<Slice>,
    },
    Boxes {
        boxes: Vec<BoxStats>,
    },
    /// Overlaid counts: `series[i].values[j]` counts rows in `bins[j]`.
    Histogram {
        bins: Vec<Bin>,
        series: Vec<Series>,
    },
    Points {
        series: Vec<PointSeries>,
        log_x: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    /// Share of the total, 0 when the total is 0.
    pub fraction: f64,
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Half-open bin `[start, end)`; the last bin also holds its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Raw value of the size channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Marker radius derived from `size`, in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}
