use std::collections::BTreeMap;

use tracing::debug;
use url::form_urlencoded;

use listkit_model::{CursorState, FilterSet, FilterValue, PageSchema, SortDirection, SortSpec};

const PARAM_SORT: &str = "sort";
const PARAM_DIR: &str = "dir";
const PARAM_CURSOR: &str = "cursor";
const PARAM_SIZE: &str = "size";
const PARAM_PAGE: &str = "page";

/// Serializes filter, sort and cursor state into a URL query string.
///
/// The output is minimal: values equal to a filter's declared default are
/// left out, as are the default sort, the default page size, a first-page
/// index and an absent cursor. Filters appear in key order; multi-valued
/// filters become repeated parameters in selection order.
pub fn encode(
    schema: &PageSchema,
    filters: &FilterSet,
    sort: &SortSpec,
    cursor: &CursorState,
) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());

    for (key, value) in filters.iter() {
        if schema.is_default_value(key, value) {
            continue;
        }
        for token in value.query_tokens() {
            ser.append_pair(key, &token);
        }
    }

    if sort != schema.default_sort() {
        ser.append_pair(PARAM_SORT, &sort.field);
        ser.append_pair(PARAM_DIR, sort.direction.as_query());
    }

    if let Some(token) = &cursor.cursor {
        ser.append_pair(PARAM_CURSOR, token);
    }
    if cursor.page_index > 0 {
        // 1-based in the URL, the way page numbers read to humans.
        ser.append_pair(PARAM_PAGE, &(cursor.page_index + 1).to_string());
    }
    if cursor.page_size != schema.default_page_size() {
        ser.append_pair(PARAM_SIZE, &cursor.page_size.to_string());
    }

    ser.finish()
}

/// Parses a URL query string into filter, sort and cursor state.
///
/// Never fails: unknown keys are dropped, malformed values fall back to
/// the filter's declared default (kept out of the set), an out-of-whitelist
/// sort field falls back to the page default, and page size is clamped.
/// Repeated single-valued parameters keep the last occurrence; repeated
/// multi-valued parameters accumulate in order.
pub fn decode(schema: &PageSchema, query: &str) -> (FilterSet, SortSpec, CursorState) {
    let raw = query.strip_prefix('?').unwrap_or(query);

    let mut filters = FilterSet::new();
    let mut multi: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut sort_field: Option<String> = None;
    let mut direction: Option<SortDirection> = None;
    let mut cursor_token: Option<String> = None;
    let mut page_size: Option<usize> = None;
    let mut page_number: Option<usize> = None;

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            PARAM_SORT => sort_field = Some(value.into_owned()),
            PARAM_DIR => {
                direction = SortDirection::from_query(&value);
                if direction.is_none() {
                    debug!(token = value.as_ref(), "dropping malformed sort direction");
                }
            }
            PARAM_CURSOR => {
                cursor_token = (!value.is_empty()).then(|| value.into_owned());
            }
            PARAM_SIZE => {
                page_size = value.parse().ok();
                if page_size.is_none() {
                    debug!(token = value.as_ref(), "dropping malformed page size");
                }
            }
            PARAM_PAGE => {
                page_number = value.parse().ok();
            }
            key => {
                let Some(decl) = schema.filter(key) else {
                    debug!(key, "dropping unknown query parameter");
                    continue;
                };
                match decl.kind.parse_token(&value) {
                    None => debug!(key, token = value.as_ref(), "dropping malformed filter value"),
                    Some(FilterValue::Many(tokens)) => {
                        multi.entry(key.to_string()).or_default().extend(tokens);
                    }
                    Some(value) => {
                        if schema.is_default_value(key, &value) {
                            continue;
                        }
                        filters.insert(key, value);
                    }
                }
            }
        }
    }

    for (key, tokens) in multi {
        let value = FilterValue::Many(tokens);
        if schema.is_default_value(&key, &value) {
            continue;
        }
        filters.insert(key, value);
    }

    let sort = match sort_field {
        Some(field) => schema.sanitize_sort(&field, direction.unwrap_or_default()),
        None => schema.default_sort().clone(),
    };

    let mut cursor = CursorState::initial(schema.clamp_page_size(page_size.unwrap_or(0)));
    cursor.cursor = cursor_token;
    cursor.page_index = page_number.map(|p| p.saturating_sub(1)).unwrap_or(0);

    (filters, sort, cursor)
}
