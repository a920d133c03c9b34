use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single filter predicate value.
///
/// Multi-select filters keep their selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Flag(bool),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FilterValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FilterValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            FilterValue::Many(vs) => Some(vs),
            _ => None,
        }
    }

    /// Raw tokens this value contributes to a query string, in order.
    pub fn query_tokens(&self) -> Vec<String> {
        match self {
            FilterValue::Text(s) => vec![s.clone()],
            FilterValue::Int(n) => vec![n.to_string()],
            FilterValue::Flag(b) => vec![b.to_string()],
            FilterValue::Many(vs) => vs.clone(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Flag(b)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(vs: Vec<String>) -> Self {
        FilterValue::Many(vs)
    }
}

/// Active filter predicates for one collection view, keyed by filter name.
///
/// Keys are kept sorted so serialization and fingerprinting are order
/// independent. An absent key means the filter is not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, FilterValue>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a filter value. Last write wins.
    pub fn insert(&mut self, key: impl Into<String>, value: FilterValue) {
        self.0.insert(key.into(), value);
    }

    /// Removes a filter, returning the previous value if it was set.
    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates filters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
