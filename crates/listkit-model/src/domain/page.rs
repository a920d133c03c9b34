use serde::{Deserialize, Serialize};

use super::CursorToken;

/// One page of a collection, as returned by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token for the next page, if the server reports one.
    pub next_cursor: Option<CursorToken>,
    /// Collection size across all pages, when the endpoint reports it.
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// A page with no items and no continuation.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            total_count: Some(0),
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
