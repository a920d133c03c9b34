use serde::{Deserialize, Serialize};

/// Client-side position within a paginated collection.
///
/// The cursor token is opaque: issued by the server and replayed verbatim
/// on the next request. `page_index` is for display only and carries no
/// authority over what the server returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    pub cursor: Option<String>,
    pub page_size: usize,
    pub page_index: usize,
}

impl CursorState {
    /// Initial position: first page, no continuation token.
    pub fn initial(page_size: usize) -> Self {
        Self {
            cursor: None,
            page_size,
            page_index: 0,
        }
    }

    /// Back to the first page, keeping the page size.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.page_index = 0;
    }

    /// Moves to the next page using a server-issued continuation token.
    pub fn advance(&mut self, token: impl Into<String>) {
        self.cursor = Some(token.into());
        self.page_index += 1;
    }

    pub fn is_first_page(&self) -> bool {
        self.cursor.is_none() && self.page_index == 0
    }
}
