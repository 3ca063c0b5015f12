//! Patch documents for partial updates.
//!
//! A [`PatchDocument`] is an ordered list of `add`/`replace`/`remove`
//! operations at slash-delimited paths. Servers apply the operations in
//! sequence, so the order given to the builder is the order sent.
//!
//! # Example
//!
//! ```rust
//! use cloudplane::patch::PatchDocument;
//! use cloudplane::{HttpMethod, HttpRequest};
//! use serde_json::json;
//!
//! let document = PatchDocument::builder()
//!     .replace("/driver_info/ipmi_address", json!("10.0.0.5"))
//!     .add("/extra/rack", json!("r12"))
//!     .remove("/properties/root_gb")
//!     .build()
//!     .unwrap();
//!
//! let request = HttpRequest::builder(HttpMethod::Patch, "nodes/abc")
//!     .patch_document(&document)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::InvalidHttpRequestError;

/// A patch operation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Adds a value at the path.
    Add,
    /// Replaces the value at the path.
    Replace,
    /// Removes the value at the path.
    Remove,
}

impl PatchOp {
    /// Returns the wire name of the operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        }
    }

    const fn requires_value(self) -> bool {
        matches!(self, Self::Add | Self::Replace)
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation of a patch document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// The operation kind.
    pub op: PatchOp,
    /// Slash-delimited pointer into the target document.
    pub path: String,
    /// The value; required for `add` and `replace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A validated, ordered sequence of patch operations.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PatchDocument {
    operations: Vec<PatchOperation>,
}

impl PatchDocument {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> PatchDocumentBuilder {
        PatchDocumentBuilder::default()
    }

    /// Validates and wraps a list of operations.
    ///
    /// `remove` operations lose any value they carry.
    ///
    /// # Errors
    ///
    /// - [`InvalidHttpRequestError::InvalidPatchPath`] if a path does not start with `/`
    /// - [`InvalidHttpRequestError::MissingPatchValue`] if `add` or `replace` has no value
    pub fn new(operations: Vec<PatchOperation>) -> Result<Self, InvalidHttpRequestError> {
        let operations = operations
            .into_iter()
            .map(|mut operation| {
                if !operation.path.starts_with('/') {
                    return Err(InvalidHttpRequestError::InvalidPatchPath {
                        path: operation.path,
                    });
                }
                if operation.op.requires_value() && operation.value.is_none() {
                    return Err(InvalidHttpRequestError::MissingPatchValue {
                        op: operation.op.to_string(),
                        path: operation.path,
                    });
                }
                if operation.op == PatchOp::Remove {
                    operation.value = None;
                }
                Ok(operation)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { operations })
    }

    /// Returns the operations in order.
    #[must_use]
    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    /// Returns `true` if the document has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the wire form: a JSON array of `{op, path, value}` objects.
    #[must_use]
    pub fn to_json(&self) -> Value {
        // Operations hold only string keys, so serialisation cannot fail.
        serde_json::to_value(&self.operations).unwrap_or_default()
    }
}

/// Builder for [`PatchDocument`].
#[derive(Debug, Default)]
pub struct PatchDocumentBuilder {
    operations: Vec<PatchOperation>,
}

impl PatchDocumentBuilder {
    /// Appends an operation.
    #[must_use]
    pub fn operation(mut self, op: PatchOp, path: impl Into<String>, value: Option<Value>) -> Self {
        self.operations.push(PatchOperation {
            op,
            path: path.into(),
            value,
        });
        self
    }

    /// Appends an `add` operation.
    #[must_use]
    pub fn add(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.operation(PatchOp::Add, path, Some(value.into()))
    }

    /// Appends a `replace` operation.
    #[must_use]
    pub fn replace(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.operation(PatchOp::Replace, path, Some(value.into()))
    }

    /// Appends a `remove` operation.
    #[must_use]
    pub fn remove(self, path: impl Into<String>) -> Self {
        self.operation(PatchOp::Remove, path, None)
    }

    /// Validates the operations and builds the document.
    ///
    /// # Errors
    ///
    /// See [`PatchDocument::new`].
    pub fn build(self) -> Result<PatchDocument, InvalidHttpRequestError> {
        PatchDocument::new(self.operations)
    }
}
