use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use listkit_model::{
    CollectionRequest, CursorState, FetchPhase, FilterSet, FilterValue, Page, PageSchema,
    RequestScope, SortDirection, SortSpec,
};

use crate::{
    codec,
    fingerprint::Fingerprint,
    machine::FetchMachine,
    pager::CursorPager,
    sink::UrlSink,
    source::CollectionSource,
    store::FilterSortStore,
};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Tuning knobs for a [`PageController`].
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Quiet window before a debounced text-filter change is applied.
    pub debounce: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ControllerOptions {
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }
}

/// Point-in-time view of a controller, for rendering.
#[derive(Debug, Clone)]
pub struct ControllerSnapshot<T> {
    pub phase: FetchPhase<T>,
    /// Most recent settled page, kept across same-parameter retries.
    pub last_good: Option<Page<T>>,
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub cursor: CursorState,
    /// True only when the phase is Success and the server confirmed a
    /// further page, so it can drive a "next" control directly.
    pub can_advance: bool,
    /// Last reported collection size, when the source provides one.
    pub total_count: Option<u64>,
}

/// One page's collection-query controller.
///
/// Wires the filter/sort store, cursor pager, query codec and fetch state
/// machine behind a cheap-to-clone handle. Mutations are validated and,
/// when accepted, rewrite the URL (replace, never push), reset the cursor
/// where required and dispatch exactly one fetch. Responses settle through
/// a fingerprint check, so a slow response for parameters the user has
/// already left never overwrites newer data.
///
/// All methods take `&self`; internal state sits behind a lock that is
/// never held across an await. Mutating methods spawn the fetch task and
/// must run inside a tokio runtime.
pub struct PageController<T> {
    inner: Arc<ControllerInner<T>>,
}

struct ControllerInner<T> {
    schema: Arc<PageSchema>,
    scope: RequestScope,
    source: Arc<dyn CollectionSource<T>>,
    sink: Arc<dyn UrlSink>,
    machine: FetchMachine<T>,
    params: RwLock<ParamState>,
    debounce_seq: AtomicU64,
    options: ControllerOptions,
    cancel: CancellationToken,
}

struct ParamState {
    store: FilterSortStore,
    pager: CursorPager,
}

impl<T> Clone for PageController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> PageController<T> {
    pub fn new(
        schema: PageSchema,
        source: Arc<dyn CollectionSource<T>>,
        sink: Arc<dyn UrlSink>,
        scope: RequestScope,
    ) -> Self {
        Self::with_options(schema, source, sink, scope, ControllerOptions::default())
    }

    pub fn with_options(
        schema: PageSchema,
        source: Arc<dyn CollectionSource<T>>,
        sink: Arc<dyn UrlSink>,
        scope: RequestScope,
        options: ControllerOptions,
    ) -> Self {
        let schema = Arc::new(schema);
        let store = FilterSortStore::new(Arc::clone(&schema));
        let pager = CursorPager::new(schema.default_page_size());
        Self {
            inner: Arc::new(ControllerInner {
                schema,
                scope,
                source,
                sink,
                machine: FetchMachine::new(),
                params: RwLock::new(ParamState { store, pager }),
                debounce_seq: AtomicU64::new(0),
                options,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Restores state from the initial query string and dispatches the
    /// first fetch.
    ///
    /// The URL is only read here, never written; writes happen on the
    /// first accepted mutation.
    #[instrument(level = "info", skip(self))]
    pub fn mount(&self, initial_query: &str) {
        if self.dismissed() {
            return;
        }
        let mut params = self.inner.params.write().unwrap();
        let (filters, sort, cursor) = codec::decode(&self.inner.schema, initial_query);
        params.store.restore(filters, sort);
        params.pager.restore(cursor);
        info!("collection view mounted");
        self.dispatch(&params);
    }

    /// Applies one filter. Mutations outside the schema are ignored;
    /// accepted ones rewrite the URL, reset the cursor and dispatch.
    pub fn set_filter(&self, key: &str, value: impl Into<FilterValue>) {
        if self.dismissed() {
            return;
        }
        let mut params = self.inner.params.write().unwrap();
        if !params.store.set_filter(key, value.into()) {
            return;
        }
        params.pager.reset();
        self.after_change(&params);
    }

    /// Like [`PageController::set_filter`], but rapid successive calls on
    /// a free-text filter collapse into one URL write and one request.
    /// Filters of any other kind apply immediately.
    pub fn set_filter_debounced(&self, key: &str, value: impl Into<FilterValue>) {
        if self.dismissed() {
            return;
        }
        let value = value.into();
        let is_text = self
            .inner
            .schema
            .filter(key)
            .map(|decl| decl.kind.is_text())
            .unwrap_or(false);
        if !is_text {
            self.set_filter(key, value);
            return;
        }

        let seq = self.inner.debounce_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let this = self.clone();
        let key = key.to_string();
        let window = self.inner.options.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if this.inner.debounce_seq.load(Ordering::SeqCst) != seq {
                // a newer keystroke owns the window
                return;
            }
            this.set_filter(&key, value);
        });
    }

    /// Removes one filter. A no-op when the key is not set.
    pub fn clear_filter(&self, key: &str) {
        if self.dismissed() {
            return;
        }
        let mut params = self.inner.params.write().unwrap();
        if !params.store.clear_filter(key) {
            return;
        }
        params.pager.reset();
        self.after_change(&params);
    }

    /// Applies a sort order. Fields outside the whitelist are ignored.
    pub fn set_sort(&self, field: &str, direction: SortDirection) {
        if self.dismissed() {
            return;
        }
        let mut params = self.inner.params.write().unwrap();
        if !params.store.set_sort(field, direction) {
            return;
        }
        params.pager.reset();
        self.after_change(&params);
    }

    /// Applies a new page size, clamped by the schema, resetting the
    /// position to the first page.
    pub fn set_page_size(&self, size: usize) {
        if self.dismissed() {
            return;
        }
        let mut params = self.inner.params.write().unwrap();
        if !params.pager.set_page_size(size, &self.inner.schema) {
            return;
        }
        self.after_change(&params);
    }

    /// Advances to the next confirmed page. A no-op unless the current
    /// phase is Success and the server reported a further page.
    pub fn next_page(&self) {
        if self.dismissed() {
            return;
        }
        let mut params = self.inner.params.write().unwrap();
        if !self.inner.machine.is_success() {
            debug!("ignoring next page before the current request settles");
            return;
        }
        if !params.pager.advance() {
            debug!("no further pages");
            return;
        }
        self.after_change(&params);
    }

    /// Re-dispatches the current parameters under the same fingerprint,
    /// keeping last-good data if the retry fails. A no-op while loading.
    pub fn retry(&self) {
        if self.dismissed() {
            return;
        }
        let params = self.inner.params.read().unwrap();
        if self.inner.machine.is_loading() {
            debug!("ignoring retry while a request is in flight");
            return;
        }
        self.dispatch(&params);
    }

    /// Back to an empty filter set, the default sort and the first page.
    /// Dispatches when anything actually changed.
    pub fn reset(&self) {
        if self.dismissed() {
            return;
        }
        let mut params = self.inner.params.write().unwrap();
        let store_changed = params.store.reset();
        let pager_changed = !params.pager.state().is_first_page();
        params.pager.reset();
        if store_changed || pager_changed {
            self.after_change(&params);
        }
    }

    /// Cancels any in-flight request and clears all view state. The
    /// controller is inert afterwards; pages build a fresh one per visit.
    pub fn dismiss(&self) {
        self.inner.cancel.cancel();
        let mut params = self.inner.params.write().unwrap();
        self.inner.machine.clear();
        params.store.reset();
        params.pager.reset();
        info!("collection view dismissed");
    }

    pub fn snapshot(&self) -> ControllerSnapshot<T> {
        let params = self.inner.params.read().unwrap();
        let phase = self.inner.machine.phase();
        let last_good = self.inner.machine.last_good();
        ControllerSnapshot {
            can_advance: phase.is_success() && params.pager.can_advance(),
            total_count: last_good.as_ref().and_then(|p| p.total_count),
            filters: params.store.filters().clone(),
            sort: params.store.sort().clone(),
            cursor: params.pager.state().clone(),
            last_good,
            phase,
        }
    }

    /// Current state as it would appear in the URL.
    pub fn query_string(&self) -> String {
        let params = self.inner.params.read().unwrap();
        codec::encode(
            &self.inner.schema,
            params.store.filters(),
            params.store.sort(),
            params.pager.state(),
        )
    }

    fn dismissed(&self) -> bool {
        if self.inner.cancel.is_cancelled() {
            debug!("controller already dismissed");
            return true;
        }
        false
    }

    /// Rewrites the URL and dispatches for the current parameters.
    /// Callers hold the params lock.
    fn after_change(&self, params: &ParamState) {
        let query = codec::encode(
            &self.inner.schema,
            params.store.filters(),
            params.store.sort(),
            params.pager.state(),
        );
        self.inner.sink.replace_query(&query);
        self.dispatch(params);
    }

    fn dispatch(&self, params: &ParamState) {
        let fingerprint = Fingerprint::compute(
            params.store.filters(),
            params.store.sort(),
            params.pager.state(),
            &self.inner.scope,
        );
        let request = CollectionRequest {
            filters: params.store.filters().clone(),
            sort: params.store.sort().clone(),
            cursor: params.pager.state().cursor.clone(),
            page_size: params.pager.state().page_size,
            scope: self.inner.scope.clone(),
        };
        self.inner.machine.begin(&fingerprint);

        let request_id = Uuid::new_v4();
        debug!(%request_id, fingerprint = %fingerprint, "dispatching collection fetch");

        let inner = Arc::clone(&self.inner);
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(%request_id, "fetch cancelled");
                    return;
                }
                outcome = inner.source.fetch(request) => outcome,
            };
            let was_ok = outcome.is_ok();
            let next_cursor = outcome.as_ref().ok().and_then(|p| p.next_cursor.clone());

            // params before machine, same order as the mutation path
            let mut params = inner.params.write().unwrap();
            if inner.machine.settle(&fingerprint, outcome) && was_ok {
                params.pager.observe(next_cursor.as_deref());
                debug!(%request_id, "fetch settled");
            }
        });
    }
}
