use std::collections::HashMap;

use serde::Serialize;

use super::model::{Dataset, Field, Value};
use crate::error::AggregateError;

/// One value per grouping field, in grouping order.
pub type GroupKey = Vec<Value>;

/// Summary statistic of an [`AggregatedView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stat {
    Mean,
    Sum,
}

/// Grouped summary of one numeric column.
///
/// Entries keep first-occurrence order of their key in the input;
/// [`AggregatedView::sorted`] gives natural key order instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedView {
    pub group_fields: Vec<Field>,
    pub value_field: Field,
    pub stat: Stat,
    pub entries: Vec<(GroupKey, f64)>,
}

impl AggregatedView {
    /// Group column names followed by the value column name.
    pub fn columns(&self) -> Vec<&'static str> {
        self.group_fields
            .iter()
            .chain(std::iter::once(&self.value_field))
            .map(|f| f.column())
            .collect()
    }

    pub fn get(&self, key: &[Value]) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by key: years ascending, names alphabetical.
    pub fn sorted(mut self) -> Self {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }
}

/// Mean of `value_field` within each distinct value of `group_field`.
pub fn mean_by(
    dataset: &Dataset,
    group_field: Field,
    value_field: Field,
) -> Result<AggregatedView, AggregateError> {
    mean_by_many(dataset, &[group_field], value_field)
}

/// Mean of `value_field` per composite key.
pub fn mean_by_many(
    dataset: &Dataset,
    group_fields: &[Field],
    value_field: Field,
) -> Result<AggregatedView, AggregateError> {
    let groups = accumulate(dataset, group_fields, value_field)?;
    Ok(AggregatedView {
        group_fields: group_fields.to_vec(),
        value_field,
        stat: Stat::Mean,
        entries: groups
            .into_iter()
            .map(|(key, acc)| (key, acc.sum / acc.count as f64))
            .collect(),
    })
}

/// Sum of `value_field` per single or composite key, e.g. `[Year, Continent]`.
pub fn sum_by(
    dataset: &Dataset,
    group_fields: &[Field],
    value_field: Field,
) -> Result<AggregatedView, AggregateError> {
    let groups = accumulate(dataset, group_fields, value_field)?;
    Ok(AggregatedView {
        group_fields: group_fields.to_vec(),
        value_field,
        stat: Stat::Sum,
        entries: groups.into_iter().map(|(key, acc)| (key, acc.sum)).collect(),
    })
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Single pass over the rows; groups come out in first-occurrence order.
fn accumulate(
    dataset: &Dataset,
    group_fields: &[Field],
    value_field: Field,
) -> Result<Vec<(GroupKey, Accumulator)>, AggregateError> {
    if group_fields.is_empty() {
        return Err(AggregateError::NoGroupFields);
    }
    if !value_field.is_numeric() {
        return Err(AggregateError::NonNumeric(value_field.column().to_string()));
    }

    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Accumulator)> = Vec::new();

    for record in dataset.records() {
        let Some(value) = record.numeric(value_field) else {
            continue;
        };
        let key: GroupKey = group_fields.iter().map(|f| record.value(*f)).collect();
        let slot = *slots.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Accumulator::default()));
            groups.len() - 1
        });
        let acc = &mut groups[slot].1;
        acc.sum += value;
        acc.count += 1;
    }
    Ok(groups)
}
