use std::future::Future;

use cloudsweep_core::ResourceError;
use futures::Stream;
use tracing::warn;

use super::api::Page;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily walk a marker-paginated listing.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's marker afterwards. The stream yields each page's items, ends when
/// the provider stops returning a marker, and ends right after yielding the
/// first error. It cannot be restarted; call `paginate` again for a fresh walk.
pub fn paginate<T, F, Fut>(fetch: F) -> impl Stream<Item = Result<Vec<T>, ResourceError>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ResourceError>>,
{
    futures::stream::unfold((Cursor::Start, fetch), |(cursor, mut fetch)| async move {
        let marker = match cursor {
            Cursor::Start => None,
            Cursor::Next(marker) => Some(marker),
            Cursor::Done => return None,
        };

        match fetch(marker.clone()).await {
            Ok(page) => {
                let next = match page.next_marker {
                    Some(next) if next.is_empty() => Cursor::Done,
                    // A provider echoing the marker back would loop forever.
                    Some(next) if marker.as_deref() == Some(next.as_str()) => {
                        warn!(marker = %next, "provider repeated pagination marker, stopping");
                        Cursor::Done
                    }
                    Some(next) => Cursor::Next(next),
                    None => Cursor::Done,
                };
                Some((Ok(page.items), (next, fetch)))
            }
            Err(e) => Some((Err(e), (Cursor::Done, fetch))),
        }
    })
}
