/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  URL / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, unique (country, year)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ filter/aggregate  │  year slices, grouped mean/sum → AggregatedView
///   └──────────────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
