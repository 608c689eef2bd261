use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::error::{ChatError, Result};
use crate::reply::parse_reply;
use crate::request::{OutboundRequest, RequestBody, RequestFormat};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// HTTP client for the agent workflow endpoint. Cheap to clone into tasks.
#[derive(Clone, Debug)]
pub struct WorkflowClient {
    client: Client,
    base_url: String,
    format: RequestFormat,
}

impl WorkflowClient {
    pub fn new(base_url: &str, format: RequestFormat) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            format,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn format(&self) -> RequestFormat {
        self.format
    }

    /// Send one submission and return the reply text.
    ///
    /// A body without `response` or `error` is a success that yields the
    /// placeholder; only transport, status, and decode problems are errors.
    #[instrument(skip_all, fields(format = self.format.as_str()))]
    pub async fn submit(&self, request: OutboundRequest) -> Result<String> {
        let url = format!("{}{}", self.base_url, request.path(self.format));
        let has_file = request.attachment().is_some();
        debug!(%url, has_file, "sending submission");

        let builder = self.client.post(&url);
        let builder = match request.into_body(self.format).await? {
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status { status, body });
        }

        let raw = response.text().await?;
        let reply = parse_reply(&raw)?;
        info!(%url, reply_chars = reply.chars().count(), "submission answered");
        Ok(reply)
    }
}
