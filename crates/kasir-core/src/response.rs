//! # Response Envelope
//!
//! Every HTTP body, success or failure, is an [`ApiResponse`].
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  {                                                                      │
//! │    "context": "...",          optional, caller supplied                 │
//! │    "id":      "2X5ZV3lF...",  base-62 UUIDv7, fresh per response        │
//! │    "kind":    "kasir#product",                                          │
//! │    "etag":    "9f86d0...",    SHA-256 hex of the serialized `data`      │
//! │    "updated": "2024-...",     optional RFC 3339                         │
//! │    "data":    { ... } | { "items": [ ... ] },                           │
//! │    "error":   { "code": 404, "message": "...",                          │
//! │                 "errors": [{ "reason": "notFound", "message": "..." }] }│
//! │  }                                                                      │
//! │                                                                         │
//! │  Absent fields are omitted, never sent as null.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Collections
//! [`ApiResponse::with_items`] takes an explicit `Option<Vec<T>>`:
//! `None` omits `data` and `etag`, `Some(vec![])` sends `{"items": []}`
//! with its hash.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::id;

// =============================================================================
// Error Reasons
// =============================================================================

/// Machine-readable reason attached to an [`ErrorItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorReason {
    InvalidParameter,
    InvalidValue,
    Required,
    NotFound,
    AlreadyExists,
    Unauthorized,
    Forbidden,
    RateLimitExceeded,
    BackendError,
    ServiceUnavailable,
}

/// One detailed error, usually about a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorReason>,
    pub message: String,
}

impl ErrorItem {
    /// Creates an item with a message and no reason.
    pub fn new(message: impl Into<String>) -> Self {
        ErrorItem {
            reason: None,
            message: message.into(),
        }
    }

    /// Sets the reason.
    pub fn with_reason(mut self, reason: ErrorReason) -> Self {
        self.reason = Some(reason);
        self
    }
}

/// Error block of the envelope.
///
/// `message` is always serialized. When it is empty, the first item's
/// message is used instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    /// HTTP status code
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

impl ErrorDetail {
    /// The message as it will be serialized.
    pub fn effective_message(&self) -> &str {
        match self.errors.first() {
            Some(first) if self.message.is_empty() => &first.message,
            _ => &self.message,
        }
    }
}

impl Serialize for ErrorDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.errors.is_empty() { 2 } else { 3 };
        let mut state = serializer.serialize_struct("ErrorDetail", len)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", self.effective_message())?;
        if self.errors.is_empty() {
            state.skip_field("errors")?;
        } else {
            state.serialize_field("errors", &self.errors)?;
        }
        state.end()
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Wrapper for collections: `{"items": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

/// The response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T = serde_json::Value> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response carrying `data`, with a fresh id and its etag.
    pub fn new(data: T) -> Self {
        let etag = etag_of(&data);
        ApiResponse {
            etag,
            data: Some(data),
            ..ApiResponse::blank()
        }
    }

    /// Success response with no payload.
    pub fn empty() -> Self {
        ApiResponse::blank()
    }

    fn blank() -> Self {
        ApiResponse {
            context: None,
            id: id::encode(id::new_id()),
            kind: None,
            etag: None,
            updated: None,
            data: None,
            error: None,
        }
    }

    /// Sets the context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Overrides the generated response id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the resource kind, e.g. `kasir#product`.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Overrides the computed etag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the last-updated timestamp (RFC 3339).
    pub fn with_updated(mut self, updated: impl Into<String>) -> Self {
        self.updated = Some(updated.into());
        self
    }

    /// Appends an error item. No-op on a success response.
    pub fn add_error(mut self, item: ErrorItem) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.errors.push(item);
        }
        self
    }

    /// Appends several error items. No-op on a success response.
    pub fn add_errors(mut self, items: impl IntoIterator<Item = ErrorItem>) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.errors.extend(items);
        }
        self
    }
}

impl<T: Serialize> ApiResponse<Items<T>> {
    /// Collection response.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::response::{ApiResponse, Items};
    ///
    /// let absent = ApiResponse::<Items<String>>::with_items(None);
    /// assert!(absent.data.is_none() && absent.etag.is_none());
    ///
    /// let empty = ApiResponse::<Items<String>>::with_items(Some(vec![]));
    /// assert!(empty.data.is_some() && empty.etag.is_some());
    /// ```
    pub fn with_items(items: Option<Vec<T>>) -> Self {
        match items {
            Some(items) => ApiResponse::new(Items { items }),
            None => ApiResponse::empty(),
        }
    }
}

impl ApiResponse {
    /// Error response with a status code and message.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        ApiResponse {
            error: Some(ErrorDetail {
                code,
                message: message.into(),
                errors: Vec::new(),
            }),
            ..ApiResponse::blank()
        }
    }

    /// Error response whose message comes from the first item.
    pub fn error_with_items(code: u16, items: Vec<ErrorItem>) -> Self {
        ApiResponse {
            error: Some(ErrorDetail {
                code,
                message: String::new(),
                errors: items,
            }),
            ..ApiResponse::blank()
        }
    }
}

/// SHA-256 hex digest of the JSON serialization of `data`.
///
/// `None` only if `data` cannot be serialized.
pub fn etag_of<T: Serialize + ?Sized>(data: &T) -> Option<String> {
    let bytes = serde_json::to_vec(data).ok()?;
    Some(hex::encode(Sha256::digest(&bytes)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_sets_id_and_etag() {
        let response = ApiResponse::new(json!({"name": "Kopi"}));
        assert!(id::decode(&response.id).is_ok());
        assert_eq!(response.etag.as_deref().map(str::len), Some(64));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_etag_is_deterministic() {
        let a = ApiResponse::new(json!({"name": "Kopi", "stocks": 3}));
        let b = ApiResponse::new(json!({"name": "Kopi", "stocks": 3}));
        let c = ApiResponse::new(json!({"name": "Teh", "stocks": 3}));

        assert_ne!(a.id, b.id);
        assert_eq!(a.etag, b.etag);
        assert_ne!(a.etag, c.etag);
    }

    #[test]
    fn test_absent_items_omit_data_and_etag() {
        let response = ApiResponse::<Items<String>>::with_items(None);
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("data").is_none());
        assert!(json.get("etag").is_none());
        assert!(json.get("id").is_some());
    }

    #[test]
    fn test_empty_items_are_present_and_hashed() {
        let response = ApiResponse::<Items<String>>::with_items(Some(vec![]));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["data"], json!({"items": []}));
        assert_eq!(
            json["etag"],
            "eef46741adfc3a9f76294d3b78f37a45f113092ac9d44ee77c7a038a88ff09a1"
        );
    }

    #[test]
    fn test_builders() {
        let response = ApiResponse::new(1)
            .with_context("ctx")
            .with_id("abc")
            .with_kind("kasir#number")
            .with_etag("etag")
            .with_updated("2024-01-01T00:00:00Z");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            json!({
                "context": "ctx",
                "id": "abc",
                "kind": "kasir#number",
                "etag": "etag",
                "updated": "2024-01-01T00:00:00Z",
                "data": 1
            })
        );
    }

    #[test]
    fn test_error_message_without_items() {
        let response = ApiResponse::error(400, "Invalid request body");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"], json!({"code": 400, "message": "Invalid request body"}));
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_error_message_filled_from_first_item() {
        let response = ApiResponse::error_with_items(
            400,
            vec![
                ErrorItem::new("name is required").with_reason(ErrorReason::Required),
                ErrorItem::new("price must not be negative").with_reason(ErrorReason::InvalidValue),
            ],
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"]["message"], "name is required");
        assert_eq!(json["error"]["errors"][0]["reason"], "required");
        assert_eq!(json["error"]["errors"][1]["reason"], "invalidValue");
    }

    #[test]
    fn test_empty_error_serializes_empty_message() {
        let response = ApiResponse::error_with_items(500, vec![]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], json!({"code": 500, "message": ""}));
    }

    #[test]
    fn test_add_error_only_touches_error_responses() {
        let response = ApiResponse::error(404, "")
            .add_error(ErrorItem::new("Product not found: x").with_reason(ErrorReason::NotFound))
            .add_errors(vec![ErrorItem::new("second")]);
        let detail = response.error.unwrap();
        assert_eq!(detail.errors.len(), 2);
        assert_eq!(detail.effective_message(), "Product not found: x");

        let success = ApiResponse::new(1).add_error(ErrorItem::new("ignored"));
        assert!(success.error.is_none());
    }

    #[test]
    fn test_reason_spellings() {
        let reasons = [
            (ErrorReason::InvalidParameter, "invalidParameter"),
            (ErrorReason::RateLimitExceeded, "rateLimitExceeded"),
            (ErrorReason::BackendError, "backendError"),
            (ErrorReason::ServiceUnavailable, "serviceUnavailable"),
        ];
        for (reason, expected) in reasons {
            assert_eq!(serde_json::to_value(reason).unwrap(), expected);
        }
    }
}
