use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

// ---------------------------------------------------------------------------
// Continent
// ---------------------------------------------------------------------------

/// The five-way continent grouping used by the Gapminder panel.
///
/// Declaration order is alphabetical, so the derived `Ord` sorts by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Continent {
    pub const ALL: [Continent; 5] = [
        Continent::Africa,
        Continent::Americas,
        Continent::Asia,
        Continent::Europe,
        Continent::Oceania,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Americas => "Americas",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::Oceania => "Oceania",
        }
    }

    /// Case-sensitive lookup by published label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == label)
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Field – one column of the published table
// ---------------------------------------------------------------------------

/// A column of the Gapminder table, named exactly as published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Country,
    Year,
    Pop,
    Continent,
    LifeExp,
    GdpPercap,
}

impl Field {
    /// Columns in the order of the published CSV header.
    pub const ALL: [Field; 6] = [
        Field::Country,
        Field::Year,
        Field::Pop,
        Field::Continent,
        Field::LifeExp,
        Field::GdpPercap,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Field::Country => "country",
            Field::Year => "year",
            Field::Pop => "pop",
            Field::Continent => "continent",
            Field::LifeExp => "lifeExp",
            Field::GdpPercap => "gdpPercap",
        }
    }

    /// Human readable axis label.
    pub fn label(self) -> &'static str {
        match self {
            Field::Country => "Country",
            Field::Year => "Year",
            Field::Pop => "Population",
            Field::Continent => "Continent",
            Field::LifeExp => "Life expectancy (years)",
            Field::GdpPercap => "GDP per capita (US$)",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Field::Year | Field::Pop | Field::LifeExp | Field::GdpPercap
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Value – a single cell, used as a grouping-key component
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Grouping keys live in ordered collections, so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can sort and hash grouping keys --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Integer(_) => 0,
                Float(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One country-year observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub continent: Continent,
    pub year: i32,
    pub pop: u64,
    pub life_exp: f64,
    pub gdp_percap: f64,
}

impl Record {
    pub fn value(&self, field: Field) -> Value {
        match field {
            Field::Country => Value::Text(self.country.clone()),
            Field::Continent => Value::Text(self.continent.name().to_string()),
            Field::Year => Value::Integer(self.year as i64),
            Field::Pop => Value::Integer(self.pop as i64),
            Field::LifeExp => Value::Float(self.life_exp),
            Field::GdpPercap => Value::Float(self.gdp_percap),
        }
    }

    /// Numeric reading of `field`, `None` for categorical columns.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        match field {
            Field::Year => Some(self.year as f64),
            Field::Pop => Some(self.pop as f64),
            Field::LifeExp => Some(self.life_exp),
            Field::GdpPercap => Some(self.gdp_percap),
            Field::Country | Field::Continent => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded panel. Read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset, enforcing that every (country, year) pair is unique.
    pub fn from_records(records: Vec<Record>) -> Result<Self, DatasetError> {
        let mut seen: HashSet<(&str, i32)> = HashSet::with_capacity(records.len());
        for r in &records {
            if !seen.insert((r.country.as_str(), r.year)) {
                return Err(DatasetError::DuplicateObservation {
                    country: r.country.clone(),
                    year: r.year,
                });
            }
        }
        Ok(Dataset { records })
    }

    /// Subsets of an already valid dataset keep the uniqueness invariant.
    pub(crate) fn from_subset(records: Vec<Record>) -> Self {
        Dataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names, in published order.
    pub fn column_names(&self) -> Vec<&'static str> {
        Field::ALL.iter().map(|f| f.column()).collect()
    }

    /// Sorted set of distinct values of one column.
    pub fn distinct(&self, field: Field) -> BTreeSet<Value> {
        self.records.iter().map(|r| r.value(field)).collect()
    }

    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).max()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(country: &str, continent: Continent, year: i32, pop: u64) -> Record {
        Record {
            country: country.to_string(),
            continent,
            year,
            pop,
            life_exp: 50.0 + pop as f64 / 10.0,
            gdp_percap: 1000.0 * pop as f64,
        }
    }

    /// Small two-year panel used across the crate's tests.
    pub(crate) fn sample_dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Kenya", Continent::Africa, 2002, 30),
            record("Japan", Continent::Asia, 2002, 120),
            record("Chad", Continent::Africa, 2002, 9),
            record("France", Continent::Europe, 2002, 60),
            record("Kenya", Continent::Africa, 2007, 35),
            record("Japan", Continent::Asia, 2007, 127),
            record("Chad", Continent::Africa, 2007, 10),
            record("France", Continent::Europe, 2007, 62),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_country_year() {
        let err = Dataset::from_records(vec![
            record("Chad", Continent::Africa, 2007, 10),
            record("Chad", Continent::Africa, 2007, 11),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::DuplicateObservation { ref country, year: 2007 } if country == "Chad"
        ));
    }

    #[test]
    fn continent_order_is_alphabetical() {
        let mut names: Vec<&str> = Continent::ALL.iter().map(|c| c.name()).collect();
        names.sort();
        let ordered: Vec<&str> = Continent::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, ordered);
        assert_eq!(Continent::from_label("Asia"), Some(Continent::Asia));
        assert_eq!(Continent::from_label("asia"), None);
    }

    #[test]
    fn field_lookup_is_case_sensitive() {
        assert_eq!(Field::from_column("gdpPercap"), Some(Field::GdpPercap));
        assert_eq!(Field::from_column("gdppercap"), None);
        assert!(Field::Pop.is_numeric());
        assert!(!Field::Continent.is_numeric());
    }

    #[test]
    fn distinct_and_latest_year() {
        let ds = sample_dataset();
        assert_eq!(ds.latest_year(), Some(2007));
        assert_eq!(ds.distinct(Field::Country).len(), 4);
        assert_eq!(ds.years().into_iter().collect::<Vec<_>>(), vec![2002, 2007]);
        assert_eq!(Dataset::default().latest_year(), None);
    }
}
