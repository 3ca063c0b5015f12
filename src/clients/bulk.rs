//! Bulk deletion of named resources in one request.

use serde::Deserialize;

use crate::clients::errors::HttpError;
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{DataType, HttpMethod, HttpRequest};

/// Summary returned by a bulk delete.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct BulkDeleteResponse {
    /// How many names were deleted.
    #[serde(rename = "Number Deleted")]
    pub number_deleted: u64,
    /// How many names did not exist.
    #[serde(rename = "Number Not Found")]
    pub number_not_found: u64,
    /// Overall status line reported by the server.
    #[serde(rename = "Response Status", default)]
    pub response_status: String,
    /// Free-form body reported by the server.
    #[serde(rename = "Response Body", default)]
    pub response_body: String,
    /// `[name, status]` pairs for names that could not be deleted.
    #[serde(rename = "Errors", default)]
    pub errors: Vec<Vec<String>>,
}

impl HttpClient {
    /// Deletes many resources in one request.
    ///
    /// Names are sent as a newline-terminated, percent-encoded text body to
    /// the endpoint root with the `bulk-delete` query flag. A `/` inside a
    /// name is kept so `container/object` names address objects.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the call fails or the summary cannot be decoded.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let summary = client.bulk_delete(&["testContainer1", "testContainer2"]).await?;
    /// assert_eq!(summary.number_deleted, 2);
    /// ```
    pub async fn bulk_delete<S: AsRef<str>>(&self, names: &[S]) -> Result<BulkDeleteResponse, HttpError> {
        let body: String = names
            .iter()
            .map(|name| format!("{}\n", encode_name(name.as_ref())))
            .collect();

        let request = HttpRequest::builder(HttpMethod::Post, "")
            .query_param("bulk-delete", "true")
            .text(body)
            .accept(DataType::Json)
            .build()?;

        tracing::debug!(count = names.len(), "Bulk deleting");
        self.call(request).await.extract_into()
    }
}

fn encode_name(name: &str) -> String {
    name.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
