use async_trait::async_trait;

use listkit_model::{CollectionRequest, FetchError, Page};

/// Asynchronous provider of one collection's pages.
///
/// This trait abstracts the transport, allowing users to:
/// - Use the in-memory source from `listkit-sources`
/// - Implement adapters over HTTP/gRPC clients with auth, retries, etc.
///
/// Implementations must treat `request.cursor` as an opaque token and
/// resolve with the continuation token for the following page, if any.
/// Timeout policy belongs to the implementation; the caller only discards
/// responses that arrive after their parameters were superseded.
#[async_trait]
pub trait CollectionSource<T>: Send + Sync + 'static {
    async fn fetch(&self, request: CollectionRequest) -> Result<Page<T>, FetchError>;
}
