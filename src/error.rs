//! Error types shared across the dashboard.

use std::path::PathBuf;

use thiserror::Error;

use crate::assets::AssetKind;

/// The dataset could not be fetched or parsed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Remote source unreachable or answered with an error status.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// Wrong columns, non-numeric cells, invalid values.
    #[error("malformed dataset: {0:#}")]
    Malformed(#[source] anyhow::Error),
}

/// The (country, year) uniqueness invariant was violated.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("duplicate observation for {country} in {year}")]
    DuplicateObservation { country: String, year: i32 },
}

impl From<DatasetError> for LoadError {
    fn from(e: DatasetError) -> Self {
        LoadError::Malformed(e.into())
    }
}

/// Aggregation over a field that cannot be aggregated.
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("column '{0}' is not numeric")]
    NonNumeric(String),

    #[error("at least one grouping column is required")]
    NoGroupFields,
}

/// A chart binding does not fit its input.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("unknown column '{column}' (available: {available})")]
    UnknownColumn { column: String, available: String },

    #[error("column '{0}' must be numeric for this binding")]
    NotNumeric(String),

    #[error("invalid chart option: {0}")]
    InvalidOption(String),
}

impl ValidationError {
    pub(crate) fn unknown(column: &str, available: &[&str]) -> Self {
        ValidationError::UnknownColumn {
            column: column.to_string(),
            available: available.join(", "),
        }
    }
}

/// Anything that stops one chart of a page from rendering.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A downloadable asset could not be delivered.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{kind} file not found: {path}")]
    Missing { kind: AssetKind, path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Regenerating the presentation failed or produced nothing.
    #[error("could not generate {kind}: {message}")]
    Generation { kind: AssetKind, message: String },
}
