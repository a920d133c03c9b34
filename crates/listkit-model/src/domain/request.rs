use serde::{Deserialize, Serialize};

use super::{FilterSet, MAX_PAGE_SIZE, SortSpec};

/// Tenant identifiers merged into every fetch.
///
/// Supplied by the authentication context; never validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestScope {
    pub environment_id: Option<String>,
    pub organization_id: Option<String>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(mut self, id: impl Into<String>) -> Self {
        self.environment_id = Some(id.into());
        self
    }

    pub fn with_organization(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }
}

/// Parameters for one page fetch against a collection source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    pub filters: FilterSet,
    pub sort: SortSpec,
    /// Continuation token from the previous page, verbatim. `None` asks
    /// for the first page.
    pub cursor: Option<String>,
    pub page_size: usize,
    pub scope: RequestScope,
}

impl CollectionRequest {
    pub fn new(sort: SortSpec) -> Self {
        Self {
            filters: FilterSet::new(),
            sort,
            cursor: None,
            page_size: super::DEFAULT_PAGE_SIZE,
            scope: RequestScope::default(),
        }
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.min(MAX_PAGE_SIZE);
        self
    }

    pub fn with_scope(mut self, scope: RequestScope) -> Self {
        self.scope = scope;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilterValue;

    #[test]
    fn builder_clamps_page_size() {
        let req = CollectionRequest::new(SortSpec::descending("createdAt")).with_page_size(5000);
        assert_eq!(req.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn scope_builders() {
        let scope = RequestScope::new()
            .with_environment("env-7")
            .with_organization("org-1");
        assert_eq!(scope.environment_id.as_deref(), Some("env-7"));
        assert_eq!(scope.organization_id.as_deref(), Some("org-1"));
    }

    #[test]
    fn serde_uses_camel_case() {
        let mut filters = FilterSet::new();
        filters.insert("status", FilterValue::from("RUNNING"));

        let req = CollectionRequest::new(SortSpec::descending("createdAt"))
            .with_filters(filters)
            .with_cursor("40")
            .with_page_size(20)
            .with_scope(RequestScope::new().with_environment("env-7"));

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["pageSize"], 20);
        assert_eq!(json["cursor"], "40");
        assert_eq!(json["sort"]["direction"], "DESC");
        assert_eq!(json["scope"]["environmentId"], "env-7");
        assert_eq!(json["filters"]["status"], "RUNNING");
    }
}
