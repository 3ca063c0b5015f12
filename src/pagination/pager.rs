//! Forward-only traversal of a paginated listing.

use std::collections::HashSet;

use crate::clients::{HttpClient, HttpError, HttpRequest};
use crate::pagination::{Page, PaginationScheme};

/// Walks a listing page by page through an [`HttpClient`].
///
/// Each page is fetched only when the previous one has been handed out,
/// so a caller that stops early never causes further requests.
///
/// # Example
///
/// ```rust,ignore
/// use cloudplane::pagination::{LinkScheme, Pager, PaginationScheme};
///
/// let mut pager = Pager::new(&client, request, PaginationScheme::Linked(LinkScheme::new().items_key("images")));
/// while let Some(page) = pager.next_page().await? {
///     println!("{} images", page.extract_items()?.len());
/// }
/// ```
#[derive(Debug)]
pub struct Pager<'c> {
    client: &'c HttpClient,
    seed: HttpRequest,
    scheme: PaginationScheme,
    next: Option<HttpRequest>,
    visited: HashSet<String>,
}

impl<'c> Pager<'c> {
    /// Creates a pager starting at `request`.
    ///
    /// A marker scheme with a `limit` adds it to the seed request.
    #[must_use]
    pub fn new(client: &'c HttpClient, request: HttpRequest, scheme: PaginationScheme) -> Self {
        let seed = match &scheme {
            PaginationScheme::Marker(marker) => match marker.limit {
                Some(limit) => request.with_query_param("limit", limit.to_string()),
                None => request,
            },
            _ => request,
        };

        Self {
            client,
            next: Some(seed.clone()),
            seed,
            scheme,
            visited: HashSet::new(),
        }
    }

    /// Returns the scheme this pager follows.
    #[must_use]
    pub const fn scheme(&self) -> &PaginationScheme {
        &self.scheme
    }

    /// Restarts the traversal from the seed request.
    pub fn reset(&mut self) {
        self.next = Some(self.seed.clone());
        self.visited.clear();
    }

    /// Fetches the next page.
    ///
    /// Returns `Ok(None)` once the listing has ended: the last page had no
    /// successor, the fetched page was empty, or its URL was already fetched.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`DecodeError::PaginationScheme`](crate::clients::DecodeError::PaginationScheme)
    /// if the page lacks what its scheme needs. The pager is exhausted afterwards.
    pub async fn next_page(&mut self) -> Result<Option<Page>, HttpError> {
        let Some(request) = self.next.take() else {
            return Ok(None);
        };

        let url = self.canonical_url(&request);
        if !self.visited.insert(url.clone()) {
            tracing::warn!(url = %url, "Listing links back to a page already fetched, stopping");
            return Ok(None);
        }

        tracing::debug!(url = %url, page = self.visited.len(), "Fetching page");
        let result = self.client.call(request.clone()).await;
        if let Some(error) = result.extract_err() {
            return Err(error.clone());
        }

        let page = Page::new(&self.scheme, result, request, url);
        if page.is_empty()? {
            return Ok(None);
        }

        self.next = page.next_request()?;
        Ok(Some(page))
    }

    /// Visits every page from the start of the listing.
    ///
    /// `visit` returns `Ok(true)` to continue, `Ok(false)` to stop. An error
    /// from `visit` or from a fetch stops iteration and is returned; no
    /// further page is fetched.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error (converted into `E`) or visitor error.
    pub async fn each_page<F, E>(&mut self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&Page) -> Result<bool, E>,
        E: From<HttpError>,
    {
        self.reset();
        while let Some(page) = self.next_page().await? {
            if !visit(&page)? {
                break;
            }
        }
        Ok(())
    }

    /// Collects every page from the start of the listing.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error.
    pub async fn all_pages(&mut self) -> Result<Vec<Page>, HttpError> {
        let mut pages = Vec::new();
        self.each_page(|page| {
            pages.push(page.clone());
            Ok::<_, HttpError>(true)
        })
        .await?;
        Ok(pages)
    }

    /// Returns the request URL with its query parameters in sorted order.
    fn canonical_url(&self, request: &HttpRequest) -> String {
        let base = self.client.resolve_url(&request.path);
        let Some(query) = request.query.as_ref().filter(|q| !q.is_empty()) else {
            return base;
        };

        let mut pairs: Vec<_> = query.iter().collect();
        pairs.sort();
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}{query}")
    }
}
