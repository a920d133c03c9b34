use tracing::debug;

use listkit_model::{CursorState, PageSchema};

/// Tracks the opaque continuation cursor for one collection view.
///
/// The pager never mints or inspects tokens: it replays what the server
/// issued. A server echoing back the token it was just sent is treated as
/// the end of the collection, so paging can never loop.
#[derive(Debug, Clone)]
pub struct CursorPager {
    state: CursorState,
    next_token: Option<String>,
}

impl CursorPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: CursorState::initial(page_size),
            next_token: None,
        }
    }

    /// Replaces the position with state decoded from a URL.
    pub fn restore(&mut self, state: CursorState) {
        self.state = state;
        self.next_token = None;
    }

    /// Records the continuation token of a settled page belonging to the
    /// current position. Empty and repeated tokens mean the collection is
    /// exhausted.
    pub fn observe(&mut self, next_cursor: Option<&str>) {
        self.next_token = match next_cursor {
            None => None,
            Some("") => None,
            Some(token) if self.state.cursor.as_deref() == Some(token) => {
                debug!(token, "server repeated the cursor it was sent; treating as last page");
                None
            }
            Some(token) => Some(token.to_string()),
        };
    }

    /// True when a further page has been confirmed by the server.
    pub fn can_advance(&self) -> bool {
        self.next_token.is_some()
    }

    /// Moves to the observed next page. Returns `false` when there is
    /// nothing to advance to.
    pub fn advance(&mut self) -> bool {
        let Some(token) = self.next_token.take() else {
            return false;
        };
        self.state.advance(token);
        true
    }

    /// Back to the first page, keeping the page size.
    pub fn reset(&mut self) {
        self.state.reset();
        self.next_token = None;
    }

    /// Applies a new page size, clamped by the schema, resetting the
    /// position. Returns whether anything changed.
    pub fn set_page_size(&mut self, requested: usize, schema: &PageSchema) -> bool {
        let clamped = schema.clamp_page_size(requested);
        if clamped == self.state.page_size {
            return false;
        }
        self.state = CursorState::initial(clamped);
        self.next_token = None;
        true
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }
}
