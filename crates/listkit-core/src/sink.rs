use std::sync::Mutex;

/// Write-only handle to the page's URL query string.
///
/// The routing layer implements this. The controller only ever replaces
/// the query in place, never pushes, so filter changes do not pile up in
/// the browser's back-button history.
pub trait UrlSink: Send + Sync + 'static {
    fn replace_query(&self, query: &str);
}

/// Sink for headless use; query writes are dropped.
pub struct NullSink;

impl UrlSink for NullSink {
    fn replace_query(&self, _query: &str) {}
}

/// Sink that remembers every replacement, newest last.
#[derive(Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The query most recently written, if any.
    pub fn last(&self) -> Option<String> {
        self.writes.lock().unwrap().last().cloned()
    }

    /// Every write in order.
    pub fn all(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.lock().unwrap().is_empty()
    }
}

impl UrlSink for RecordingSink {
    fn replace_query(&self, query: &str) {
        self.writes.lock().unwrap().push(query.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_writes_in_order() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.replace_query("status=RUNNING");
        sink.replace_query("status=RUNNING&sort=name&dir=ASC");

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.last().as_deref(), Some("status=RUNNING&sort=name&dir=ASC"));
        assert_eq!(sink.all()[0], "status=RUNNING");
    }
}
