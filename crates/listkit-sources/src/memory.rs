use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use listkit_core::CollectionSource;
use listkit_model::{CollectionRequest, FetchError, FilterSet, Page, SortDirection};
use tracing::debug;

type Matcher<T> = dyn Fn(&T, &FilterSet) -> bool + Send + Sync;
type FieldOrder<T> = dyn Fn(&T, &T, &str) -> Ordering + Send + Sync;

/// Collection source backed by an in-memory list.
///
/// Pages are addressed by offset cursors: the continuation token is the
/// decimal index of the first item on the next page, opaque to callers.
/// Filtering and ordering are delegated to closures supplied at build
/// time; the defaults match everything and keep insertion order.
///
/// Meant for demos and tests. Failures can be scripted per fetch and a
/// fixed latency can be injected to exercise in-flight states.
pub struct MemorySource<T> {
    items: RwLock<Vec<T>>,
    matcher: Box<Matcher<T>>,
    order: Box<FieldOrder<T>>,
    latency: Option<Duration>,
    failures: Mutex<VecDeque<FetchError>>,
}

impl<T: Clone + Send + Sync + 'static> MemorySource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            matcher: Box::new(|_, _| true),
            order: Box::new(|_, _, _| Ordering::Equal),
            latency: None,
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Decides whether an item survives the request's filter set.
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&T, &FilterSet) -> bool + Send + Sync + 'static,
    {
        self.matcher = Box::new(matcher);
        self
    }

    /// Orders two items ascending by the named sort field. The source
    /// reverses the result itself when the request asks for descending.
    pub fn with_field_order<F>(mut self, order: F) -> Self
    where
        F: Fn(&T, &T, &str) -> Ordering + Send + Sync + 'static,
    {
        self.order = Box::new(order);
        self
    }

    /// Delays every fetch by a fixed duration.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queues an error; the next fetch returns it instead of a page.
    pub fn fail_next(&self, error: FetchError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn push(&self, item: T) {
        self.items.write().unwrap().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().unwrap().is_empty()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> CollectionSource<T> for MemorySource<T> {
    async fn fetch(&self, request: CollectionRequest) -> Result<Page<T>, FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let offset = match request.cursor.as_deref() {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| FetchError::InvalidArgument(format!("unrecognized cursor {raw:?}")))?,
            None => 0,
        };

        let mut filtered: Vec<T> = {
            let items = self.items.read().unwrap();
            items
                .iter()
                .filter(|item| (self.matcher)(item, &request.filters))
                .cloned()
                .collect()
        };
        filtered.sort_by(|a, b| {
            let ordering = (self.order)(a, b, &request.sort.field);
            match request.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        // a real server clamps too; zero would loop the pager in place
        let page_size = request.page_size.max(1);

        let total = filtered.len();
        let end = offset.saturating_add(page_size).min(total);
        let page_items = if offset < total {
            filtered[offset..end].to_vec()
        } else {
            Vec::new()
        };
        let next_cursor = (end < total).then(|| end.to_string());

        debug!(total, offset, returned = page_items.len(), "memory source served a page");

        Ok(Page {
            items: page_items,
            next_cursor,
            total_count: Some(total as u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listkit_model::SortSpec;

    #[derive(Debug, Clone, PartialEq)]
    struct Run {
        name: String,
        status: String,
        created_at: i64,
    }

    fn run(name: &str, status: &str, created_at: i64) -> Run {
        Run {
            name: name.to_string(),
            status: status.to_string(),
            created_at,
        }
    }

    fn setup_source() -> MemorySource<Run> {
        MemorySource::new(vec![
            run("alpha", "RUNNING", 3),
            run("bravo", "STOPPED", 1),
            run("carol", "RUNNING", 5),
            run("delta", "RUNNING", 2),
            run("echo", "STOPPED", 4),
        ])
        .with_matcher(|item, filters| {
            filters
                .get("status")
                .and_then(|v| v.as_text())
                .is_none_or(|status| item.status == status)
        })
        .with_field_order(|a, b, field| match field {
            "name" => a.name.cmp(&b.name),
            _ => a.created_at.cmp(&b.created_at),
        })
    }

    fn request(page_size: usize) -> CollectionRequest {
        CollectionRequest::new(SortSpec::ascending("name")).with_page_size(page_size)
    }

    #[tokio::test]
    async fn first_page_carries_an_offset_cursor() {
        let source = setup_source();

        let page = source.fetch(request(2)).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.items[0].name, "alpha");
        assert_eq!(page.next_cursor.as_deref(), Some("2"));
        assert_eq!(page.total_count, Some(5));
    }

    #[tokio::test]
    async fn cursor_walks_pages_to_exhaustion() {
        let source = setup_source();

        let mut names = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut req = request(2);
            if let Some(token) = cursor.take() {
                req = req.with_cursor(token);
            }
            let page = source.fetch(req).await.unwrap();
            names.extend(page.items.iter().map(|r| r.name.clone()));
            match page.next_cursor {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        assert_eq!(names, vec!["alpha", "bravo", "carol", "delta", "echo"]);
    }

    #[tokio::test]
    async fn filters_narrow_before_pagination() {
        let source = setup_source();

        let mut filters = FilterSet::new();
        filters.insert("status", "RUNNING".into());
        let page = source
            .fetch(request(10).with_filters(filters))
            .await
            .unwrap();

        assert_eq!(page.total_count, Some(3));
        assert!(page.items.iter().all(|r| r.status == "RUNNING"));
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn descending_sort_reverses_field_order() {
        let source = setup_source();

        let req = CollectionRequest::new(SortSpec::descending("createdAt")).with_page_size(10);
        let page = source.fetch(req).await.unwrap();

        let stamps: Vec<i64> = page.items.iter().map(|r| r.created_at).collect();
        assert_eq!(stamps, vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn scripted_failure_surfaces_once() {
        let source = setup_source();
        source.fail_next(FetchError::Network("connection reset".into()));

        let error = source.fetch(request(2)).await.unwrap_err();
        assert!(error.retryable());

        let page = source.fetch(request(2)).await.unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn malformed_cursor_is_rejected() {
        let source = setup_source();

        let error = source
            .fetch(request(2).with_cursor("not-a-number"))
            .await
            .unwrap_err();

        assert!(matches!(error, FetchError::InvalidArgument(_)));
        assert!(!error.retryable());
    }

    #[tokio::test]
    async fn offset_past_the_end_yields_an_empty_page() {
        let source = setup_source();

        let page = source.fetch(request(2).with_cursor("99")).await.unwrap();

        assert!(page.is_empty());
        assert!(page.next_cursor.is_none());
        assert_eq!(page.total_count, Some(5));
    }

    #[tokio::test]
    async fn push_extends_the_backing_list() {
        let source = setup_source();
        assert_eq!(source.len(), 5);

        source.push(run("foxtrot", "RUNNING", 6));

        let page = source.fetch(request(10)).await.unwrap();
        assert_eq!(page.total_count, Some(6));
    }
}
