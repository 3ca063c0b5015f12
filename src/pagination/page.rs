//! Page variants, one per pagination scheme.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::clients::{ApiResult, DataType, DecodeError, HttpError, HttpRequest, HttpResponse};
use crate::pagination::{LinkScheme, MarkerScheme, PaginationScheme, SingleScheme};

/// One fetched page of a listing.
///
/// Each variant owns the [`ApiResult`] it was built from and computes the
/// request for the following page as a pure function of that result.
#[derive(Clone, Debug)]
pub enum Page {
    /// The only page of an unpaginated listing.
    Single(SinglePage),
    /// A page of a marker-paginated listing.
    Marker(MarkerPage),
    /// A page of a link-paginated listing.
    Linked(LinkedPage),
}

#[derive(Clone, Debug)]
struct PageData {
    result: ApiResult,
    request: HttpRequest,
    url: String,
}

impl PageData {
    fn response(&self) -> Result<&HttpResponse, HttpError> {
        if let Some(error) = self.result.extract_err() {
            return Err(error.clone());
        }
        self.result
            .response()
            .ok_or_else(|| DecodeError::EmptyBody.into())
    }

    /// The JSON body of a page asked for as JSON; `None` for an empty body.
    ///
    /// A body the client did not decode is parsed from the raw bytes, so a
    /// malformed page is an error rather than text.
    fn json(&self) -> Result<Option<Cow<'_, Value>>, HttpError> {
        let response = self.response()?;
        if let Some(body) = &response.body {
            return Ok(Some(Cow::Borrowed(body)));
        }
        if response.raw.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&response.raw)
            .map(|body| Some(Cow::Owned(body)))
            .map_err(|e| {
                DecodeError::Incompatible {
                    reason: format!("page body is not valid JSON: {e}"),
                }
                .into()
            })
    }

    /// Items of the page: the non-empty lines when the request asked for
    /// text, otherwise the JSON array at `items_key` (or the whole body).
    fn items(&self, items_key: Option<&str>) -> Result<Vec<Value>, HttpError> {
        if self.request.accept == DataType::Text {
            return Ok(self
                .result
                .extract_lines()?
                .into_iter()
                .map(Value::String)
                .collect());
        }

        let Some(body) = self.json()? else {
            return Ok(Vec::new());
        };

        let items = match items_key {
            Some(key) => body.get(key).ok_or_else(|| DecodeError::PaginationScheme {
                reason: format!("response has no `{key}` field"),
            })?,
            None => &*body,
        };

        match items {
            Value::Array(items) => Ok(items.clone()),
            Value::Null => Ok(Vec::new()),
            _ => Err(DecodeError::PaginationScheme {
                reason: format!(
                    "items at `{}` are not an array",
                    items_key.unwrap_or("<body>")
                ),
            }
            .into()),
        }
    }
}

/// The only page of an unpaginated listing.
#[derive(Clone, Debug)]
pub struct SinglePage {
    data: PageData,
    scheme: SingleScheme,
}

impl SinglePage {
    fn is_empty(&self) -> Result<bool, HttpError> {
        if self.data.request.accept == DataType::Json && self.scheme.items_key.is_none() {
            if let Some(body) = self.data.json()? {
                if !body.is_array() {
                    return Ok(body.is_null());
                }
            }
        }
        Ok(self.data.items(self.scheme.items_key.as_deref())?.is_empty())
    }
}

/// A page of a marker-paginated listing.
#[derive(Clone, Debug)]
pub struct MarkerPage {
    data: PageData,
    scheme: MarkerScheme,
}

impl MarkerPage {
    /// Returns the marker for the next request, or `None` on an empty page.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::PaginationScheme`] if the last item carries no
    /// usable marker field.
    pub fn last_marker(&self) -> Result<Option<String>, HttpError> {
        let items = self.data.items(self.scheme.items_key.as_deref())?;
        let Some(last) = items.last() else {
            return Ok(None);
        };

        let marker = match last {
            Value::String(s) => Some(s.clone()),
            item => match item.get(&self.scheme.marker_field) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            },
        };

        marker
            .filter(|m| !m.is_empty())
            .map(Some)
            .ok_or_else(|| {
                DecodeError::PaginationScheme {
                    reason: format!(
                        "last item has no `{}` to use as a marker",
                        self.scheme.marker_field
                    ),
                }
                .into()
            })
    }

    fn next_request(&self) -> Result<Option<HttpRequest>, HttpError> {
        Ok(self.last_marker()?.map(|marker| {
            self.data
                .request
                .with_query_param(self.scheme.marker_param.clone(), marker)
        }))
    }
}

/// A page of a link-paginated listing.
#[derive(Clone, Debug)]
pub struct LinkedPage {
    data: PageData,
    scheme: LinkScheme,
}

impl LinkedPage {
    /// Returns the next-page URL named by this page, if any.
    ///
    /// Looks in the body at the scheme's link path first, then in the
    /// `Link` header when the scheme allows it.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::PaginationScheme`] if the link path holds
    /// something other than a string, an array of links, or null.
    pub fn next_link(&self) -> Result<Option<String>, HttpError> {
        let response = self.data.response()?;

        let from_body = match self.data.request.accept {
            DataType::Json => match self.data.json()? {
                Some(body) => self.link_in_body(&body)?,
                None => None,
            },
            DataType::Text => None,
        };

        let link = from_body.or_else(|| {
            self.scheme
                .use_link_header
                .then(|| response.next_link.clone())
                .flatten()
        });

        Ok(link.filter(|l| !l.is_empty()))
    }

    fn link_in_body(&self, body: &Value) -> Result<Option<String>, HttpError> {
        let mut cursor = body;
        for key in &self.scheme.link_path {
            match cursor.get(key) {
                Some(next) => cursor = next,
                None => return Ok(None),
            }
        }

        match cursor {
            Value::String(url) => Ok(Some(url.clone())),
            Value::Null => Ok(None),
            Value::Array(links) => Ok(links
                .iter()
                .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))
                .and_then(|link| link.get("href"))
                .and_then(Value::as_str)
                .map(String::from)),
            _ => Err(DecodeError::PaginationScheme {
                reason: format!(
                    "next link at `{}` is neither a URL nor a list of links",
                    self.scheme.link_path.join(".")
                ),
            }
            .into()),
        }
    }

    fn next_request(&self) -> Result<Option<HttpRequest>, HttpError> {
        let Some(link) = self.next_link()? else {
            return Ok(None);
        };
        if link == self.data.url {
            tracing::warn!(url = %link, "Next link points at the current page, stopping");
            return Ok(None);
        }
        Ok(Some(self.data.request.with_url(link)))
    }
}

impl Page {
    /// Wraps a fetched result as a page of `scheme`.
    ///
    /// `url` is the URL the page was fetched from, query included.
    #[must_use]
    pub fn new(
        scheme: &PaginationScheme,
        result: ApiResult,
        request: HttpRequest,
        url: impl Into<String>,
    ) -> Self {
        let data = PageData {
            result,
            request,
            url: url.into(),
        };
        match scheme {
            PaginationScheme::Single(scheme) => Self::Single(SinglePage {
                data,
                scheme: scheme.clone(),
            }),
            PaginationScheme::Marker(scheme) => Self::Marker(MarkerPage {
                data,
                scheme: scheme.clone(),
            }),
            PaginationScheme::Linked(scheme) => Self::Linked(LinkedPage {
                data,
                scheme: scheme.clone(),
            }),
        }
    }

    const fn data(&self) -> &PageData {
        match self {
            Self::Single(page) => &page.data,
            Self::Marker(page) => &page.data,
            Self::Linked(page) => &page.data,
        }
    }

    fn items_key(&self) -> Option<&str> {
        match self {
            Self::Single(page) => page.scheme.items_key.as_deref(),
            Self::Marker(page) => page.scheme.items_key.as_deref(),
            Self::Linked(page) => page.scheme.items_key.as_deref(),
        }
    }

    /// Returns the result this page was built from.
    #[must_use]
    pub const fn result(&self) -> &ApiResult {
        &self.data().result
    }

    /// Returns the request that fetched this page.
    #[must_use]
    pub const fn request(&self) -> &HttpRequest {
        &self.data().request
    }

    /// Returns the URL this page was fetched from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.data().url
    }

    /// Returns `true` if the page holds no items.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::PaginationScheme`] if the items cannot be found.
    pub fn is_empty(&self) -> Result<bool, HttpError> {
        match self {
            Self::Single(page) => page.is_empty(),
            _ => Ok(self.extract_items()?.is_empty()),
        }
    }

    /// Returns the request for the following page, or `None` if this is the last.
    ///
    /// Never returns a request once the page is empty, has no next link, or
    /// links to itself.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::PaginationScheme`] if the page lacks what its
    /// scheme needs to find the next page.
    pub fn next_request(&self) -> Result<Option<HttpRequest>, HttpError> {
        if self.is_empty()? {
            return Ok(None);
        }
        match self {
            Self::Single(_) => Ok(None),
            Self::Marker(page) => page.next_request(),
            Self::Linked(page) => page.next_request(),
        }
    }

    /// Returns the raw items of the page.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::PaginationScheme`] if the items are not an array.
    pub fn extract_items(&self) -> Result<Vec<Value>, HttpError> {
        self.data().items(self.items_key())
    }

    /// Returns the items as names: text lines, string items, or each
    /// item's `name` field.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::PaginationScheme`] if an item has no name.
    pub fn extract_names(&self) -> Result<Vec<String>, HttpError> {
        self.extract_items()?
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                item => item
                    .get("name")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .ok_or_else(|| {
                        DecodeError::PaginationScheme {
                            reason: "item has no `name` field".to_string(),
                        }
                        .into()
                    }),
            })
            .collect()
    }

    /// Decodes the items into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Incompatible`] if an item does not have `T`'s shape.
    pub fn extract_into<T: DeserializeOwned>(&self) -> Result<Vec<T>, HttpError> {
        serde_json::from_value(Value::Array(self.extract_items()?)).map_err(|e| {
            DecodeError::Incompatible {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use serde_json::json;
    use std::collections::HashMap;

    fn json_result(body: &Value) -> ApiResult {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            vec!["application/json".to_string()],
        );
        ApiResult::from(Ok(HttpResponse::new(
            200,
            headers,
            body.to_string().into_bytes(),
            true,
        )))
    }

    fn text_result(body: &str) -> ApiResult {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), vec!["text/plain".to_string()]);
        ApiResult::from(Ok(HttpResponse::new(
            200,
            headers,
            body.as_bytes().to_vec(),
            true,
        )))
    }

    fn request() -> HttpRequest {
        HttpRequest::builder(HttpMethod::Get, "https://example.com/v1/items")
            .build()
            .unwrap()
    }

    fn page(scheme: PaginationScheme, result: ApiResult) -> Page {
        Page::new(&scheme, result, request(), "https://example.com/v1/items")
    }

    #[test]
    fn test_marker_next_request_uses_last_item() {
        let scheme = PaginationScheme::Marker(MarkerScheme::new("uuid").items_key("nodes"));
        let page = page(
            scheme,
            json_result(&json!({"nodes": [{"uuid": "a"}, {"uuid": "b"}]})),
        );

        let next = page.next_request().unwrap().unwrap();
        assert_eq!(
            next.query.unwrap().get("marker"),
            Some(&"b".to_string())
        );
    }

    #[test]
    fn test_marker_empty_page_is_terminal() {
        let scheme = PaginationScheme::Marker(MarkerScheme::new("uuid").items_key("nodes"));
        let page = page(scheme, json_result(&json!({"nodes": []})));
        assert!(page.is_empty().unwrap());
        assert!(page.next_request().unwrap().is_none());
    }

    #[test]
    fn test_marker_text_page_uses_last_line() {
        let scheme = PaginationScheme::Marker(MarkerScheme::new("name"));
        let request = HttpRequest::builder(HttpMethod::Get, "https://example.com/v1/")
            .accept(DataType::Text)
            .build()
            .unwrap();
        let page = Page::new(
            &scheme,
            text_result("janeausten\nmarktwain\n"),
            request,
            "https://example.com/v1/",
        );
        assert_eq!(
            page.extract_names().unwrap(),
            vec!["janeausten", "marktwain"]
        );
        let next = page.next_request().unwrap().unwrap();
        assert_eq!(
            next.query.unwrap().get("marker"),
            Some(&"marktwain".to_string())
        );
    }

    #[test]
    fn test_malformed_json_page_is_decode_error() {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            vec!["application/json".to_string()],
        );
        let result = ApiResult::from(Ok(HttpResponse::new(
            200,
            headers,
            br#"{"nodes": [{"uuid": "a"},"#.to_vec(),
            true,
        )));
        let scheme = PaginationScheme::Marker(MarkerScheme::new("uuid").items_key("nodes"));
        let page = page(scheme, result);

        assert!(matches!(
            page.is_empty(),
            Err(HttpError::Decode(DecodeError::Incompatible { .. }))
        ));
        assert!(page.next_request().is_err());
    }

    #[test]
    fn test_json_page_decoded_from_raw_body() {
        let result = ApiResult::from(Ok(HttpResponse::new(
            200,
            HashMap::new(),
            br#"{"nodes": [{"uuid": "a"}]}"#.to_vec(),
            true,
        )));
        let scheme = PaginationScheme::Marker(MarkerScheme::new("uuid").items_key("nodes"));
        let page = page(scheme, result);
        assert_eq!(page.extract_items().unwrap(), vec![json!({"uuid": "a"})]);
    }

    #[test]
    fn test_marker_missing_field_is_scheme_error() {
        let scheme = PaginationScheme::Marker(MarkerScheme::new("uuid"));
        let page = page(scheme, json_result(&json!([{"id": 1}])));
        assert!(matches!(
            page.next_request(),
            Err(HttpError::Decode(DecodeError::PaginationScheme { .. }))
        ));
    }

    #[test]
    fn test_linked_next_from_body_string() {
        let scheme = PaginationScheme::Linked(LinkScheme::new().items_key("items"));
        let page = page(
            scheme,
            json_result(&json!({
                "items": [1, 2],
                "links": {"next": "https://example.com/v1/items?page=2"}
            })),
        );
        let next = page.next_request().unwrap().unwrap();
        assert_eq!(next.path, "https://example.com/v1/items?page=2");
    }

    #[test]
    fn test_linked_next_from_rel_array() {
        let scheme = PaginationScheme::Linked(
            LinkScheme::new()
                .items_key("servers")
                .link_path(&["servers_links"]),
        );
        let page = page(
            scheme,
            json_result(&json!({
                "servers": [{"id": "s1"}],
                "servers_links": [
                    {"rel": "self", "href": "https://example.com/v1/items"},
                    {"rel": "next", "href": "https://example.com/v1/items?marker=s1"}
                ]
            })),
        );
        assert_eq!(
            page.next_request().unwrap().unwrap().path,
            "https://example.com/v1/items?marker=s1"
        );
    }

    #[test]
    fn test_linked_self_reference_is_terminal() {
        let scheme = PaginationScheme::Linked(LinkScheme::new().items_key("items"));
        let page = page(
            scheme,
            json_result(&json!({
                "items": [1],
                "links": {"next": "https://example.com/v1/items"}
            })),
        );
        assert!(page.next_request().unwrap().is_none());
    }

    #[test]
    fn test_linked_missing_link_is_terminal() {
        let scheme = PaginationScheme::Linked(LinkScheme::new().items_key("items"));
        let page = page(
            scheme,
            json_result(&json!({"items": [1], "links": {"next": null}})),
        );
        assert!(page.next_request().unwrap().is_none());
    }

    #[test]
    fn test_single_page_never_has_next() {
        let scheme = PaginationScheme::Single(SingleScheme::new().items_key("flavors"));
        let page = page(scheme, json_result(&json!({"flavors": [{"name": "m1.tiny"}]})));
        assert!(!page.is_empty().unwrap());
        assert!(page.next_request().unwrap().is_none());
        assert_eq!(page.extract_names().unwrap(), vec!["m1.tiny"]);
    }

    #[test]
    fn test_single_object_body_is_not_empty() {
        let scheme = PaginationScheme::Single(SingleScheme::new());
        let page = page(scheme, json_result(&json!({"quota": {"cores": 20}})));
        assert!(!page.is_empty().unwrap());
    }

    #[test]
    fn test_extract_into_typed_items() {
        #[derive(serde::Deserialize)]
        struct Item {
            uuid: String,
        }

        let scheme = PaginationScheme::Marker(MarkerScheme::new("uuid").items_key("nodes"));
        let page = page(scheme, json_result(&json!({"nodes": [{"uuid": "a"}]})));
        let items: Vec<Item> = page.extract_into().unwrap();
        assert_eq!(items[0].uuid, "a");

        let wrong: Result<Vec<u32>, _> = page.extract_into();
        assert!(matches!(
            wrong,
            Err(HttpError::Decode(DecodeError::Incompatible { .. }))
        ));
    }
}
