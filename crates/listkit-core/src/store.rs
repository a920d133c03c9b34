use std::sync::Arc;

use tracing::debug;

use listkit_model::{FilterSet, FilterValue, PageSchema, SortDirection, SortSpec};

/// Current filter predicates and sort order for one collection view.
///
/// Mutations are validated against the page schema and silently ignored
/// when invalid, matching the codec's lenient decode policy. Every method
/// returns whether the state actually changed, so the caller knows when to
/// rewrite the URL, reset the pager and dispatch a fresh request.
#[derive(Debug, Clone)]
pub struct FilterSortStore {
    schema: Arc<PageSchema>,
    filters: FilterSet,
    sort: SortSpec,
}

impl FilterSortStore {
    pub fn new(schema: Arc<PageSchema>) -> Self {
        let sort = schema.default_sort().clone();
        Self {
            schema,
            filters: FilterSet::new(),
            sort,
        }
    }

    /// Replaces the whole state with values decoded from a URL.
    pub fn restore(&mut self, filters: FilterSet, sort: SortSpec) {
        self.filters = filters;
        self.sort = sort;
    }

    /// Applies one filter value. Unknown keys and kind-mismatched values
    /// are ignored; a value equal to the declared default clears the key.
    pub fn set_filter(&mut self, key: &str, value: FilterValue) -> bool {
        let Some(decl) = self.schema.filter(key) else {
            debug!(key, "ignoring filter for undeclared key");
            return false;
        };
        if !decl.kind.admits(&value) {
            debug!(key, ?value, "ignoring filter value of the wrong kind");
            return false;
        }
        if decl.default.as_ref() == Some(&value) {
            return self.filters.remove(key).is_some();
        }
        if self.filters.get(key) == Some(&value) {
            return false;
        }
        self.filters.insert(key, value);
        true
    }

    /// Removes one filter. Clearing an absent key is a no-op.
    pub fn clear_filter(&mut self, key: &str) -> bool {
        self.filters.remove(key).is_some()
    }

    /// Applies a sort order. Fields outside the whitelist are ignored.
    pub fn set_sort(&mut self, field: &str, direction: SortDirection) -> bool {
        if !self.schema.is_sortable(field) {
            debug!(field, "ignoring sort on non-sortable field");
            return false;
        }
        let next = SortSpec::new(field, direction);
        if next == self.sort {
            return false;
        }
        self.sort = next;
        true
    }

    /// Back to an empty filter set and the default sort.
    pub fn reset(&mut self) -> bool {
        let changed = !self.filters.is_empty() || self.sort != *self.schema.default_sort();
        self.filters.clear();
        self.sort = self.schema.default_sort().clone();
        changed
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn schema(&self) -> &PageSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_store() -> FilterSortStore {
        let schema = PageSchema::new(SortSpec::descending("createdAt"))
            .with_choice("status", &["RUNNING", "STOPPED"])
            .unwrap()
            .with_text("keyword")
            .unwrap()
            .with_flag("archived")
            .unwrap()
            .with_sortable("name");
        FilterSortStore::new(Arc::new(schema))
    }

    #[test]
    fn set_filter_accepts_declared_key() {
        let mut store = setup_store();

        assert!(store.set_filter("status", FilterValue::from("RUNNING")));
        assert_eq!(
            store.filters().get("status").and_then(|v| v.as_text()),
            Some("RUNNING")
        );
    }

    #[test]
    fn set_filter_unknown_key_ignored() {
        let mut store = setup_store();

        assert!(!store.set_filter("maintainer", FilterValue::from("ada@example.com")));
        assert!(store.filters().is_empty());
    }

    #[test]
    fn set_filter_wrong_kind_ignored() {
        let mut store = setup_store();

        assert!(!store.set_filter("archived", FilterValue::from("yes")));
        assert!(!store.set_filter("status", FilterValue::from("PAUSED")));
        assert!(store.filters().is_empty());
    }

    #[test]
    fn set_filter_same_value_reports_no_change() {
        let mut store = setup_store();

        assert!(store.set_filter("status", FilterValue::from("RUNNING")));
        assert!(!store.set_filter("status", FilterValue::from("RUNNING")));
        assert!(store.set_filter("status", FilterValue::from("STOPPED")));
    }

    #[test]
    fn set_filter_default_value_clears_key() {
        let mut store = setup_store();

        assert!(store.set_filter("archived", FilterValue::from(true)));
        assert!(store.set_filter("archived", FilterValue::from(false)));
        assert!(!store.filters().contains("archived"));

        // clearing an already-absent key is not a change
        assert!(!store.set_filter("archived", FilterValue::from(false)));
    }

    #[test]
    fn clear_filter_only_reports_real_removals() {
        let mut store = setup_store();

        store.set_filter("keyword", FilterValue::from("dark"));
        assert!(store.clear_filter("keyword"));
        assert!(!store.clear_filter("keyword"));
    }

    #[test]
    fn set_sort_enforces_whitelist() {
        let mut store = setup_store();

        assert!(store.set_sort("name", SortDirection::Asc));
        assert_eq!(store.sort(), &SortSpec::ascending("name"));

        assert!(!store.set_sort("salary", SortDirection::Asc));
        assert_eq!(store.sort(), &SortSpec::ascending("name"));
    }

    #[test]
    fn set_sort_same_spec_reports_no_change() {
        let mut store = setup_store();

        assert!(store.set_sort("createdAt", SortDirection::Asc));
        assert!(!store.set_sort("createdAt", SortDirection::Asc));
        assert!(store.set_sort("createdAt", SortDirection::Desc));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = setup_store();

        store.set_filter("status", FilterValue::from("RUNNING"));
        store.set_sort("name", SortDirection::Asc);

        assert!(store.reset());
        assert!(store.filters().is_empty());
        assert_eq!(store.sort(), &SortSpec::descending("createdAt"));

        assert!(!store.reset());
    }

    #[test]
    fn restore_takes_decoded_state_verbatim() {
        let mut store = setup_store();

        let mut filters = FilterSet::new();
        filters.insert("status", FilterValue::from("STOPPED"));
        store.restore(filters.clone(), SortSpec::ascending("name"));

        assert_eq!(store.filters(), &filters);
        assert_eq!(store.sort(), &SortSpec::ascending("name"));
    }
}
