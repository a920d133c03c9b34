use std::fmt;

use url::form_urlencoded;

use listkit_model::{CursorState, FilterSet, RequestScope, SortSpec};

/// Identity of one dispatched request's parameters.
///
/// Two fingerprints are equal iff the filters, sort, cursor position, page
/// size and scope they were computed from are equal. Filter key order never
/// matters: `FilterSet` iterates sorted. Unlike the URL codec, nothing is
/// omitted here, so states that merely display the same are still told
/// apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(
        filters: &FilterSet,
        sort: &SortSpec,
        cursor: &CursorState,
        scope: &RequestScope,
    ) -> Self {
        let mut ser = form_urlencoded::Serializer::new(String::new());

        for (key, value) in filters.iter() {
            for token in value.query_tokens() {
                ser.append_pair(key, &token);
            }
        }
        ser.append_pair("sort", &sort.field);
        ser.append_pair("dir", sort.direction.as_query());
        if let Some(token) = &cursor.cursor {
            ser.append_pair("cursor", token);
        }
        ser.append_pair("size", &cursor.page_size.to_string());
        ser.append_pair("page", &cursor.page_index.to_string());
        if let Some(env) = &scope.environment_id {
            ser.append_pair("env", env);
        }
        if let Some(org) = &scope.organization_id {
            ser.append_pair("org", org);
        }

        Self(ser.finish())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
