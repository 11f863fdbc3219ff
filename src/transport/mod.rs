//! Network seam for the chat widget.
//!
//! - [`ChatTransport`]: one request in, one reply or error out
//! - [`HttpTransport`]: JSON POST over `reqwest` with CSRF header and cookie jar
//!
//! The wire format is a single JSON exchange:
//!
//! ```text
//! POST /api/chat/        {"message": "hello"}
//! 200                    {"response": "hi"}
//! 4xx/5xx                {"error": "bad request"}
//! ```

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Description used when a failed response carries no usable `error` field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Body of the chat POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user text.
    pub message: String,
}

/// Successful reply from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Text to show as the bot message.
    pub response: String,
}

/// Sends one chat request and resolves exactly once.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver `request` and return the endpoint's reply.
    ///
    /// Non-2xx answers become [`crate::Error::Api`]; transport and decoding
    /// failures become [`crate::Error::Http`] / [`crate::Error::Json`].
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply>;
}

/// Extract the user-facing description from a failed response body.
///
/// A non-empty string `error` is used as is. Falsy values (`null`, `false`,
/// `0`, `""`) and a missing field fall back to [`UNKNOWN_ERROR`]; any other
/// value is shown as its JSON text.
pub fn error_description(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null | Value::Bool(false) | Value::String(_)) | None => {
            UNKNOWN_ERROR.to_string()
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => UNKNOWN_ERROR.to_string(),
        Some(other) => other.to_string(),
    }
}
