use futures::{
    StreamExt, TryStreamExt,
    stream::{self, BoxStream},
};
use std::future::Future;

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{ListOptions, Page},
};

/// Turn a page fetcher into a lazy stream of items
///
/// The next page is requested only once the items of the previous one have
/// been consumed. Bulk listings drain this same stream, so both always agree.
pub(crate) fn paged_stream<T, F, Fut>(fetch: F) -> BoxStream<'static, StorageResult<T>>
where
    T: Send + 'static,
    F: Fn(ListOptions) -> Fut + Send + 'static,
    Fut: Future<Output = StorageResult<Page<T>>> + Send + 'static,
{
    stream::try_unfold(Some(ListOptions::new()), move |next: Option<ListOptions>| {
        let request = next.map(&fetch);
        async move {
            let Some(request) = request else {
                return Ok(None);
            };
            let page = request.await?;
            let next = page.next_marker.map(|marker| ListOptions::new().after(marker));
            Ok::<_, StorageError>(Some((page.items, next)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
    .try_flatten()
    .boxed()
}
