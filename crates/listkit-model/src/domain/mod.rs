mod filter;
pub use filter::{FilterSet, FilterValue};

mod sort;
pub use sort::{SortDirection, SortSpec};

mod cursor;
pub use cursor::CursorState;

mod schema;
pub use schema::{
    DEFAULT_PAGE_SIZE, FilterDecl, FilterKind, MAX_PAGE_SIZE, PageSchema, RESERVED_PARAMS,
    SchemaError,
};

mod page;
pub use page::Page;

mod request;
pub use request::{CollectionRequest, RequestScope};

mod error;
pub use error::FetchError;

mod phase;
pub use phase::FetchPhase;

/// Opaque server-issued continuation token.
///
/// Replayed verbatim on the next request; never constructed or inspected
/// by this library.
pub type CursorToken = String;
