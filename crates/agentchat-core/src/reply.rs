//! Turning the endpoint's JSON body into the text shown to the user.

use serde_json::Value;

use crate::error::{ChatError, Result};

/// Shown when a well-formed body carries neither `response` nor `error`.
pub const PLACEHOLDER_REPLY: &str = "No response received.";

/// Shown for every failed submission; the cause goes to the log.
pub const FAILURE_REPLY: &str = "Sorry, something went wrong while contacting the agent. Please try again.";

/// Prefer `response`, then `error`, then the placeholder. Only string values count.
pub fn extract_reply(body: &Value) -> String {
    ["response", "error"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| PLACEHOLDER_REPLY.to_string())
}

/// Parse a raw response body and extract the reply text.
pub fn parse_reply(raw: &str) -> Result<String> {
    let body: Value = serde_json::from_str(raw).map_err(|e| ChatError::Decode(e.to_string()))?;
    Ok(extract_reply(&body))
}
