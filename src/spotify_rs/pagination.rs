use serde::de::DeserializeOwned;
use url::Url;

use crate::ports::spotify::{ApiRequest, RequestExecutor};
use crate::spotify_rs::error::SpotifyApiError;
use crate::spotify_rs::types::{Page, decode};

/// Upper bound on followed `next` links before a listing is abandoned.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Fetches every page of a listing, starting at `initial_url` and following the
/// server's `next` links until there are none left.
///
/// Items are returned in server order, concatenated page by page. Pages are
/// requested one at a time. Fails with [`SpotifyApiError::PaginationLimitExceeded`]
/// when the chain is longer than `max_pages`.
pub async fn fetch_all<T, R>(
    executor: &R,
    initial_url: Url,
    max_pages: usize,
) -> Result<Vec<T>, SpotifyApiError>
where
    T: DeserializeOwned,
    R: RequestExecutor + ?Sized,
{
    let mut all_items = Vec::new();
    let mut next_url = Some(initial_url);
    let mut pages = 0;

    while let Some(url) = next_url {
        if pages == max_pages {
            log::warn!("Stopped paginating at {} after {} pages", url, pages);
            return Err(SpotifyApiError::PaginationLimitExceeded { max_pages });
        }

        let body = executor.perform_request(ApiRequest::get(url.clone())).await?;
        let page: Page<T> = decode(&url, body)?;
        pages += 1;

        all_items.extend(page.items);
        next_url = page
            .next
            .map(|next| {
                Url::parse(&next).map_err(|source| SpotifyApiError::InvalidUrl { url: next, source })
            })
            .transpose()?;
    }

    log::debug!("Fetched {} items over {} pages", all_items.len(), pages);
    Ok(all_items)
}
