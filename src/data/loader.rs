use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail, ensure};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Continent, Dataset, Field, Record};
use crate::error::LoadError;

/// File name of the cached copy of a remote dataset.
pub const CACHE_FILE_NAME: &str = "gapminder.csv";

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the Gapminder table from `source`.
///
/// Remote sources go through the local cache when `cache_dir` is set: a
/// cached copy is used unless `refresh` is true, and every successful
/// download replaces it.
pub fn load(
    source: &DataSource,
    cache_dir: Option<&Path>,
    refresh: bool,
) -> Result<Dataset, LoadError> {
    match source {
        DataSource::File(path) => load_file(path),
        DataSource::Url(url) => {
            let cache_path = cache_dir.map(|dir| dir.join(CACHE_FILE_NAME));

            if let Some(cached) = cache_path.as_deref().filter(|p| !refresh && p.exists()) {
                match load_file(cached) {
                    Ok(dataset) => {
                        log::info!("Using cached dataset {}", cached.display());
                        return Ok(dataset);
                    }
                    Err(e) => log::warn!("Ignoring unusable cache {}: {e}", cached.display()),
                }
            }

            let body = fetch_url(url)?;
            let dataset = parse_csv(body.as_bytes())?;
            if let Some(path) = &cache_path {
                if let Err(e) = write_cache(path, &body) {
                    log::warn!("Could not cache dataset at {}: {e:#}", path.display());
                }
            }
            Ok(dataset)
        }
    }
}

/// Load a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the published layout, header row required
/// * `.json`    – `[{ "country": ..., "year": ..., ... }, ...]`
/// * `.parquet` – flat columns named like the CSV header
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_json(&text)
        }
        "parquet" | "pq" => {
            let records = read_parquet(path).map_err(LoadError::Malformed)?;
            Ok(Dataset::from_records(records)?)
        }
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

fn fetch_url(url: &str) -> Result<String, LoadError> {
    log::info!("Downloading dataset from {url}");
    let fetch_err = |message: String| LoadError::Fetch {
        url: url.to_string(),
        message,
    };

    let response = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => fetch_err(format!("HTTP {code}")),
        ureq::Error::Transport(t) => fetch_err(t.to_string()),
    })?;

    let mut body = String::new();
    response
        .into_reader()
        .read_to_string(&mut body)
        .map_err(|e| fetch_err(format!("reading response body: {e}")))?;
    Ok(body)
}

fn write_cache(path: &Path, body: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating cache directory {}", dir.display()))?;
    }
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Parse the published CSV layout. Column order is free, extra columns are
/// ignored, and every one of the six Gapminder columns must be present.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let records = read_csv_records(reader).map_err(LoadError::Malformed)?;
    Ok(Dataset::from_records(records)?)
}

fn read_csv_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let index_of = |field: Field| {
        headers
            .iter()
            .position(|h| h == field.column())
            .with_context(|| format!("CSV missing '{}' column", field.column()))
    };
    let country_idx = index_of(Field::Country)?;
    let year_idx = index_of(Field::Year)?;
    let pop_idx = index_of(Field::Pop)?;
    let continent_idx = index_of(Field::Continent)?;
    let life_idx = index_of(Field::LifeExp)?;
    let gdp_idx = index_of(Field::GdpPercap)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = row_no + 1;
        let cells = result.with_context(|| format!("CSV row {row}"))?;
        let cell = |idx: usize| cells.get(idx).unwrap_or("");

        let raw = RawRow {
            country: cell(country_idx).to_string(),
            year: parse_number(cell(year_idx), row, Field::Year)?,
            pop: parse_number(cell(pop_idx), row, Field::Pop)?,
            continent: cell(continent_idx).to_string(),
            life_exp: parse_number(cell(life_idx), row, Field::LifeExp)?,
            gdp_percap: parse_number(cell(gdp_idx), row, Field::GdpPercap)?,
        };
        records.push(raw.into_record(row)?);
    }
    Ok(records)
}

fn parse_number(s: &str, row: usize, field: Field) -> Result<f64> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .with_context(|| format!("Row {row}, {field}: '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
pub fn parse_json(text: &str) -> Result<Dataset, LoadError> {
    let rows: Vec<RawRow> = serde_json::from_str(text)
        .context("parsing JSON records")
        .map_err(LoadError::Malformed)?;
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, raw)| raw.into_record(i + 1))
        .collect::<Result<Vec<_>>>()
        .map_err(LoadError::Malformed)?;
    Ok(Dataset::from_records(records)?)
}

// ---------------------------------------------------------------------------
// Row validation shared by every format
// ---------------------------------------------------------------------------

/// One row as read from a source, before domain checks.
#[derive(Debug, Deserialize)]
struct RawRow {
    country: String,
    year: f64,
    pop: f64,
    continent: String,
    #[serde(rename = "lifeExp")]
    life_exp: f64,
    #[serde(rename = "gdpPercap")]
    gdp_percap: f64,
}

impl RawRow {
    fn into_record(self, row: usize) -> Result<Record> {
        ensure!(!self.country.is_empty(), "Row {row}: empty country");
        for (field, v) in [
            (Field::Year, self.year),
            (Field::Pop, self.pop),
            (Field::LifeExp, self.life_exp),
            (Field::GdpPercap, self.gdp_percap),
        ] {
            ensure!(v.is_finite(), "Row {row}, {field}: {v} is not a finite number");
        }
        let continent = Continent::from_label(&self.continent)
            .with_context(|| format!("Row {row}: unknown continent '{}'", self.continent))?;
        ensure!(
            self.year.fract() == 0.0 && self.year.abs() < i32::MAX as f64,
            "Row {row}, year: {} is not a whole year",
            self.year
        );
        ensure!(
            self.pop >= 0.0 && self.pop.fract() == 0.0,
            "Row {row}, pop: {} is not a non-negative count",
            self.pop
        );
        // Grouping keys carry pop as i64.
        ensure!(
            self.pop < i64::MAX as f64,
            "Row {row}, pop: {} is out of range",
            self.pop
        );
        ensure!(
            self.life_exp > 0.0,
            "Row {row}, lifeExp: {} must be positive",
            self.life_exp
        );
        ensure!(
            self.gdp_percap >= 0.0,
            "Row {row}, gdpPercap: {} must not be negative",
            self.gdp_percap
        );

        Ok(Record {
            country: self.country,
            continent,
            year: self.year as i32,
            pop: self.pop as u64,
            life_exp: self.life_exp,
            gdp_percap: self.gdp_percap,
        })
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Read a Parquet file with one flat column per Gapminder field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), and by the `generate_sample` binary.
fn read_parquet(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let column = |field: Field| -> Result<usize> {
            schema
                .index_of(field.column())
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", field.column()))
        };

        let country = batch.column(column(Field::Country)?);
        let year = batch.column(column(Field::Year)?);
        let pop = batch.column(column(Field::Pop)?);
        let continent = batch.column(column(Field::Continent)?);
        let life_exp = batch.column(column(Field::LifeExp)?);
        let gdp_percap = batch.column(column(Field::GdpPercap)?);

        for i in 0..batch.num_rows() {
            let row = records.len() + 1;
            let raw = RawRow {
                country: text_at(country, i).with_context(|| format!("Row {row}, country"))?,
                year: number_at(year, i).with_context(|| format!("Row {row}, year"))?,
                pop: number_at(pop, i).with_context(|| format!("Row {row}, pop"))?,
                continent: text_at(continent, i)
                    .with_context(|| format!("Row {row}, continent"))?,
                life_exp: number_at(life_exp, i).with_context(|| format!("Row {row}, lifeExp"))?,
                gdp_percap: number_at(gdp_percap, i)
                    .with_context(|| format!("Row {row}, gdpPercap"))?,
            };
            records.push(raw.into_record(row)?);
        }
    }
    Ok(records)
}

// -- Parquet / Arrow helpers --

fn text_at(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("expected a string column, got {other:?}"),
    }
}

fn number_at(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        other => bail!("expected a numeric column, got {other:?}"),
    };
    value.context("column type does not match its array")
}
