//! Collapses timestamped field records into one current value per field.

use chrono::NaiveDateTime;
use common::model::data::DataRecord;
use std::collections::HashMap;

/// Field name to current value, built once per generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDataSet {
    values: HashMap<String, String>,
}

impl ResolvedDataSet {
    pub fn get(&self, field_name: &str) -> Option<&str> {
        self.values.get(field_name).map(String::as_str)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.values.contains_key(field_name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResolvedDataSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Picks, per field name, the value of the record with the greatest
/// `created_at`. On equal timestamps the record fetched first wins. A `None`
/// value resolves to the empty string.
pub fn resolve(records: &[DataRecord]) -> ResolvedDataSet {
    let mut latest: HashMap<&str, (&NaiveDateTime, Option<&str>)> = HashMap::new();

    for record in records {
        let newer = latest
            .get(record.field_name.as_str())
            .map_or(true, |(seen, _)| record.created_at > **seen);
        if newer {
            latest.insert(
                &record.field_name,
                (&record.created_at, record.value.as_deref()),
            );
        }
    }

    latest
        .into_iter()
        .map(|(name, (_, value))| (name, value.unwrap_or_default()))
        .collect()
}
