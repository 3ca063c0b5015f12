//! Uniform iteration over paginated listings.
//!
//! Services paginate differently: some take an opaque `marker` query
//! parameter, some return a next-page URL in the body or the `Link` header,
//! some return everything at once. A [`PaginationScheme`] describes which,
//! and a [`Pager`] walks the listing one [`Page`] at a time.
//!
//! # Iteration Contract
//!
//! - Pages are fetched only when asked for; there is no read-ahead.
//! - An empty page ends the listing and is not delivered.
//! - A missing next link, a next link equal to the current URL, or a URL
//!   already fetched in this traversal ends the listing.
//! - A failed fetch ends the listing with that error. Pages already
//!   delivered stay delivered.
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudplane::pagination::{MarkerScheme, Pager, PaginationScheme};
//! use cloudplane::{HttpMethod, HttpRequest};
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "nodes").build()?;
//! let scheme = PaginationScheme::Marker(MarkerScheme::new("uuid").items_key("nodes").limit(100));
//!
//! let mut pager = Pager::new(&client, request, scheme);
//! pager
//!     .each_page(|page| {
//!         for node in page.extract_items()? {
//!             println!("{}", node["uuid"]);
//!         }
//!         Ok::<_, cloudplane::HttpError>(true)
//!     })
//!     .await?;
//! ```

mod page;
mod pager;

pub use page::{LinkedPage, MarkerPage, Page, SinglePage};
pub use pager::Pager;

/// Which wire scheme a listing paginates with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaginationScheme {
    /// Everything arrives in one response.
    Single(SingleScheme),
    /// Each request carries the last item's identifier as a marker.
    Marker(MarkerScheme),
    /// Each response names the URL of the next page.
    Linked(LinkScheme),
}

/// A listing that is never paginated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SingleScheme {
    /// Top-level field holding the items; `None` for a bare array or text.
    pub items_key: Option<String>,
}

impl SingleScheme {
    /// Creates a scheme reading a bare array or text lines.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads items from a top-level field.
    #[must_use]
    pub fn items_key(mut self, key: impl Into<String>) -> Self {
        self.items_key = Some(key.into());
        self
    }
}

/// Marker pagination.
///
/// The next request repeats the previous one with `marker_param` set to the
/// last item's `marker_field` (or to the last line of a text page).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerScheme {
    /// Top-level field holding the items; `None` for a bare array or text.
    pub items_key: Option<String>,
    /// Item field whose value becomes the next marker.
    pub marker_field: String,
    /// Query parameter carrying the marker.
    pub marker_param: String,
    /// Page size to ask for, sent as `limit`.
    pub limit: Option<u32>,
}

impl MarkerScheme {
    /// Creates a scheme using `marker_field` of the last item as the marker.
    #[must_use]
    pub fn new(marker_field: impl Into<String>) -> Self {
        Self {
            items_key: None,
            marker_field: marker_field.into(),
            marker_param: "marker".to_string(),
            limit: None,
        }
    }

    /// Reads items from a top-level field.
    #[must_use]
    pub fn items_key(mut self, key: impl Into<String>) -> Self {
        self.items_key = Some(key.into());
        self
    }

    /// Uses another query parameter for the marker.
    #[must_use]
    pub fn marker_param(mut self, param: impl Into<String>) -> Self {
        self.marker_param = param.into();
        self
    }

    /// Asks for pages of at most `limit` items.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Link pagination.
///
/// The next URL is read from the body at `link_path`, which may hold a
/// string or an array of `{rel, href}` links. When the body has none and
/// `use_link_header` is set, the `Link` header's `rel="next"` is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkScheme {
    /// Top-level field holding the items; `None` for a bare array.
    pub items_key: Option<String>,
    /// Path of fields leading to the next link in the body.
    pub link_path: Vec<String>,
    /// Falls back to the `Link` response header.
    pub use_link_header: bool,
}

impl Default for LinkScheme {
    fn default() -> Self {
        Self {
            items_key: None,
            link_path: vec!["links".to_string(), "next".to_string()],
            use_link_header: true,
        }
    }
}

impl LinkScheme {
    /// Creates a scheme reading `links.next`, then the `Link` header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads items from a top-level field.
    #[must_use]
    pub fn items_key(mut self, key: impl Into<String>) -> Self {
        self.items_key = Some(key.into());
        self
    }

    /// Reads the next link from another body path, e.g. `["servers_links"]`.
    #[must_use]
    pub fn link_path(mut self, path: &[&str]) -> Self {
        self.link_path = path.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Ignores the `Link` response header.
    #[must_use]
    pub const fn without_link_header(mut self) -> Self {
        self.use_link_header = false;
        self
    }
}
