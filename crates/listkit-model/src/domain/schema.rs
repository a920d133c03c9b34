use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{FilterValue, SortDirection, SortSpec};

/// Query-string parameter names owned by the sort and cursor layers.
///
/// Filter declarations may not use these keys.
pub const RESERVED_PARAMS: [&str; 5] = ["sort", "dir", "cursor", "size", "page"];

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Value shape accepted by one declared filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// Free text, e.g. a search keyword.
    Text,
    /// Signed integer.
    Int,
    /// Boolean toggle.
    Flag,
    /// Exactly one of a fixed option list.
    Choice(Vec<String>),
    /// Any subset of a fixed option list, order preserving.
    Multi(Vec<String>),
}

impl FilterKind {
    /// Parses one raw query token into a value of this kind.
    ///
    /// `Multi` parses a single token; repeated parameters are accumulated
    /// by the caller. Returns `None` for malformed or out-of-option tokens.
    pub fn parse_token(&self, raw: &str) -> Option<FilterValue> {
        match self {
            FilterKind::Text => Some(FilterValue::Text(raw.to_string())),
            FilterKind::Int => raw.parse::<i64>().ok().map(FilterValue::Int),
            FilterKind::Flag => match raw.to_ascii_lowercase().as_str() {
                "true" => Some(FilterValue::Flag(true)),
                "false" => Some(FilterValue::Flag(false)),
                _ => None,
            },
            FilterKind::Choice(options) => options
                .iter()
                .any(|o| o == raw)
                .then(|| FilterValue::Text(raw.to_string())),
            FilterKind::Multi(options) => options
                .iter()
                .any(|o| o == raw)
                .then(|| FilterValue::Many(vec![raw.to_string()])),
        }
    }

    /// Returns `true` if `value` is well formed for this kind.
    pub fn admits(&self, value: &FilterValue) -> bool {
        match (self, value) {
            (FilterKind::Text, FilterValue::Text(_)) => true,
            (FilterKind::Int, FilterValue::Int(_)) => true,
            (FilterKind::Flag, FilterValue::Flag(_)) => true,
            (FilterKind::Choice(options), FilterValue::Text(v)) => {
                options.iter().any(|o| o == v)
            }
            (FilterKind::Multi(options), FilterValue::Many(vs)) => {
                vs.iter().all(|v| options.iter().any(|o| o == v))
            }
            _ => false,
        }
    }

    /// Free-text filters are the ones worth debouncing.
    pub fn is_text(&self) -> bool {
        matches!(self, FilterKind::Text)
    }
}

/// One whitelisted filter: its key, accepted shape, and inactive default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDecl {
    pub key: String,
    pub kind: FilterKind,
    /// Value meaning "filter not applied". Such values are kept out of the
    /// set and the URL, so absence and default stay interchangeable.
    pub default: Option<FilterValue>,
}

impl FilterDecl {
    pub fn new(key: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            key: key.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: FilterValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// Invalid page-schema declaration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("filter key '{0}' is reserved for sort/cursor parameters")]
    ReservedKey(String),
    #[error("filter key '{0}' is declared twice")]
    DuplicateKey(String),
    #[error("filter '{0}' declares an empty option list")]
    EmptyOptions(String),
    #[error("default value for filter '{0}' does not match its kind")]
    DefaultMismatch(String),
}

/// Whitelist of filters and sortable fields for one collection view,
/// with its default sort and page-size bounds.
#[derive(Debug, Clone)]
pub struct PageSchema {
    filters: BTreeMap<String, FilterDecl>,
    sortable: Vec<String>,
    default_sort: SortSpec,
    default_page_size: usize,
    max_page_size: usize,
}

impl PageSchema {
    /// Starts a schema from its default sort. The default sort field is
    /// implicitly sortable.
    pub fn new(default_sort: SortSpec) -> Self {
        Self {
            filters: BTreeMap::new(),
            sortable: vec![default_sort.field.clone()],
            default_sort,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Declares a filter. Reserved keys, duplicate keys, empty option lists
    /// and kind-mismatched defaults are rejected.
    pub fn with_filter(mut self, decl: FilterDecl) -> Result<Self, SchemaError> {
        if RESERVED_PARAMS.contains(&decl.key.as_str()) {
            return Err(SchemaError::ReservedKey(decl.key));
        }
        if self.filters.contains_key(&decl.key) {
            return Err(SchemaError::DuplicateKey(decl.key));
        }
        match &decl.kind {
            FilterKind::Choice(options) | FilterKind::Multi(options) if options.is_empty() => {
                return Err(SchemaError::EmptyOptions(decl.key));
            }
            _ => {}
        }
        if let Some(default) = &decl.default {
            if !decl.kind.admits(default) {
                return Err(SchemaError::DefaultMismatch(decl.key));
            }
        }
        self.filters.insert(decl.key.clone(), decl);
        Ok(self)
    }

    /// Shorthand for a free-text filter with an empty-string default.
    pub fn with_text(self, key: &str) -> Result<Self, SchemaError> {
        self.with_filter(
            FilterDecl::new(key, FilterKind::Text).with_default(FilterValue::Text(String::new())),
        )
    }

    /// Shorthand for a boolean filter defaulting to `false`.
    pub fn with_flag(self, key: &str) -> Result<Self, SchemaError> {
        self.with_filter(FilterDecl::new(key, FilterKind::Flag).with_default(FilterValue::Flag(false)))
    }

    pub fn with_int(self, key: &str) -> Result<Self, SchemaError> {
        self.with_filter(FilterDecl::new(key, FilterKind::Int))
    }

    /// Shorthand for a single-choice filter with no default selection.
    pub fn with_choice(self, key: &str, options: &[&str]) -> Result<Self, SchemaError> {
        let options = options.iter().map(|o| o.to_string()).collect();
        self.with_filter(FilterDecl::new(key, FilterKind::Choice(options)))
    }

    pub fn with_multi(self, key: &str, options: &[&str]) -> Result<Self, SchemaError> {
        let options = options.iter().map(|o| o.to_string()).collect();
        self.with_filter(FilterDecl::new(key, FilterKind::Multi(options)))
    }

    /// Adds a sortable field. Adding a field twice is a no-op.
    pub fn with_sortable(mut self, field: &str) -> Self {
        if !self.sortable.iter().any(|f| f == field) {
            self.sortable.push(field.to_string());
        }
        self
    }

    /// Sets the default and maximum page size. The default is clamped into
    /// the accepted range.
    pub fn with_page_size(mut self, default: usize, max: usize) -> Self {
        self.max_page_size = max.max(1);
        self.default_page_size = default.clamp(1, self.max_page_size);
        self
    }

    pub fn filter(&self, key: &str) -> Option<&FilterDecl> {
        self.filters.get(key)
    }

    /// Iterates declared filters in key order.
    pub fn filters(&self) -> impl Iterator<Item = &FilterDecl> {
        self.filters.values()
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.iter().any(|f| f == field)
    }

    pub fn default_sort(&self) -> &SortSpec {
        &self.default_sort
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Clamps a requested page size into the schema's accepted range.
    /// Zero falls back to the default.
    pub fn clamp_page_size(&self, requested: usize) -> usize {
        if requested == 0 {
            self.default_page_size
        } else {
            requested.min(self.max_page_size)
        }
    }

    /// Whitelists a sort request, falling back to the default sort.
    pub fn sanitize_sort(&self, field: &str, direction: SortDirection) -> SortSpec {
        if self.is_sortable(field) {
            SortSpec::new(field, direction)
        } else {
            self.default_sort.clone()
        }
    }

    /// Returns `true` when `value` means "filter not applied" for `key`.
    pub fn is_default_value(&self, key: &str, value: &FilterValue) -> bool {
        self.filter(key).and_then(|d| d.default.as_ref()) == Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> PageSchema {
        PageSchema::new(SortSpec::descending("createdAt"))
            .with_choice("status", &["RUNNING", "STOPPED"])
            .unwrap()
            .with_text("keyword")
            .unwrap()
            .with_flag("archived")
            .unwrap()
            .with_sortable("name")
            .with_page_size(20, 100)
    }

    #[test]
    fn reserved_key_rejected() {
        let err = schema().with_text("cursor").unwrap_err();
        assert_eq!(err, SchemaError::ReservedKey("cursor".to_string()));
    }

    #[test]
    fn duplicate_key_rejected() {
        let err = schema().with_flag("archived").unwrap_err();
        assert_eq!(err, SchemaError::DuplicateKey("archived".to_string()));
    }

    #[test]
    fn empty_options_rejected() {
        let err = schema().with_choice("role", &[]).unwrap_err();
        assert_eq!(err, SchemaError::EmptyOptions("role".to_string()));
    }

    #[test]
    fn kind_mismatched_default_rejected() {
        let decl = FilterDecl::new("flags", FilterKind::Flag)
            .with_default(FilterValue::Text("yes".to_string()));
        let err = schema().with_filter(decl).unwrap_err();
        assert_eq!(err, SchemaError::DefaultMismatch("flags".to_string()));
    }

    #[test]
    fn default_sort_field_is_sortable() {
        let schema = schema();
        assert!(schema.is_sortable("createdAt"));
        assert!(schema.is_sortable("name"));
        assert!(!schema.is_sortable("updatedAt"));
    }

    #[test]
    fn sanitize_sort_falls_back_to_default() {
        let schema = schema();

        let kept = schema.sanitize_sort("name", SortDirection::Asc);
        assert_eq!(kept, SortSpec::ascending("name"));

        let fallback = schema.sanitize_sort("salary", SortDirection::Asc);
        assert_eq!(fallback, SortSpec::descending("createdAt"));
    }

    #[test]
    fn clamp_page_size_bounds() {
        let schema = schema();
        assert_eq!(schema.clamp_page_size(0), 20);
        assert_eq!(schema.clamp_page_size(35), 35);
        assert_eq!(schema.clamp_page_size(400), 100);
    }

    #[test]
    fn parse_token_per_kind() {
        let choice = FilterKind::Choice(vec!["RUNNING".into(), "STOPPED".into()]);
        assert_eq!(
            choice.parse_token("RUNNING"),
            Some(FilterValue::Text("RUNNING".to_string()))
        );
        assert_eq!(choice.parse_token("running"), None);

        assert_eq!(FilterKind::Int.parse_token("42"), Some(FilterValue::Int(42)));
        assert_eq!(FilterKind::Int.parse_token("forty-two"), None);

        assert_eq!(FilterKind::Flag.parse_token("TRUE"), Some(FilterValue::Flag(true)));
        assert_eq!(FilterKind::Flag.parse_token("0"), None);
    }

    #[test]
    fn default_value_detection() {
        let schema = schema();
        assert!(schema.is_default_value("keyword", &FilterValue::Text(String::new())));
        assert!(schema.is_default_value("archived", &FilterValue::Flag(false)));
        assert!(!schema.is_default_value("archived", &FilterValue::Flag(true)));
        assert!(!schema.is_default_value("status", &FilterValue::Text("RUNNING".to_string())));
    }
}
