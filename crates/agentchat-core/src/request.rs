//! Building the outbound request for one submission.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::Result;
use crate::state::PendingAttachment;

pub const WORKFLOW_PATH: &str = "/agent-workflow";
pub const WORKFLOW_FORM_PATH: &str = "/agent-workflow/form";

/// How a submission is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestFormat {
    /// Always multipart form data with `message` and `file` fields.
    #[default]
    Multipart,
    /// JSON `{"query": ...}` without a file, multipart with one.
    Hybrid,
}

impl RequestFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestFormat::Multipart => "multipart",
            RequestFormat::Hybrid => "hybrid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "multipart" => Some(RequestFormat::Multipart),
            "hybrid" => Some(RequestFormat::Hybrid),
            _ => None,
        }
    }

    pub fn all() -> Vec<RequestFormat> {
        vec![RequestFormat::Multipart, RequestFormat::Hybrid]
    }
}

/// Transient value built at submit time. Carries at least one of text or file.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    text: String,
    attachment: Option<PendingAttachment>,
}

/// A request body ready to hand to reqwest.
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(Form),
}

impl OutboundRequest {
    /// Returns `None` when the trimmed text is empty and there is no file.
    pub fn compose(text: &str, attachment: Option<PendingAttachment>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() && attachment.is_none() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            attachment,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachment(&self) -> Option<&PendingAttachment> {
        self.attachment.as_ref()
    }

    /// Endpoint path this request targets under `format`.
    pub fn path(&self, format: RequestFormat) -> &'static str {
        match format {
            RequestFormat::Multipart => WORKFLOW_PATH,
            RequestFormat::Hybrid => {
                if self.attachment.is_some() && !self.text.is_empty() {
                    WORKFLOW_FORM_PATH
                } else {
                    WORKFLOW_PATH
                }
            }
        }
    }

    /// Read the staged file (if any) and assemble the body.
    pub async fn into_body(self, format: RequestFormat) -> Result<RequestBody> {
        if format == RequestFormat::Hybrid && self.attachment.is_none() {
            debug!(chars = self.text.chars().count(), "building JSON query body");
            return Ok(RequestBody::Json(json!({ "query": self.text })));
        }

        let mut form = Form::new();
        if !self.text.is_empty() {
            form = form.text("message", self.text);
        }

        if let Some(attachment) = self.attachment {
            let bytes = attachment.read().await?;
            debug!(
                file = attachment.name(),
                bytes = bytes.len(),
                "attaching file to multipart body"
            );
            let part = Part::bytes(bytes)
                .file_name(attachment.name().to_string())
                .mime_str(&attachment.mime_type())?;
            form = form.part("file", part);
        }

        Ok(RequestBody::Multipart(form))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn staged(contents: &[u8]) -> (tempfile::NamedTempFile, PendingAttachment) {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        file.write_all(contents).unwrap();
        let attachment = PendingAttachment::from_path(file.path()).unwrap();
        (file, attachment)
    }

    #[test]
    fn test_compose_suppresses_empty_submission() {
        assert!(OutboundRequest::compose("", None).is_none());
        assert!(OutboundRequest::compose("   \n\t", None).is_none());
    }

    #[test]
    fn test_compose_trims_text() {
        let request = OutboundRequest::compose("  when is the quiz?\n", None).unwrap();
        assert_eq!(request.text(), "when is the quiz?");
        assert!(request.attachment().is_none());
    }

    #[test]
    fn test_compose_allows_file_without_text() {
        let (_file, attachment) = staged(b"notes");
        let request = OutboundRequest::compose("  ", Some(attachment)).unwrap();
        assert_eq!(request.text(), "");
        assert!(request.attachment().is_some());
    }

    #[test]
    fn test_multipart_always_targets_workflow_path() {
        let (_file, attachment) = staged(b"notes");
        let text_only = OutboundRequest::compose("hi", None).unwrap();
        let both = OutboundRequest::compose("hi", Some(attachment)).unwrap();
        assert_eq!(text_only.path(RequestFormat::Multipart), WORKFLOW_PATH);
        assert_eq!(both.path(RequestFormat::Multipart), WORKFLOW_PATH);
    }

    #[test]
    fn test_hybrid_paths() {
        let (_file, attachment) = staged(b"notes");
        let text_only = OutboundRequest::compose("hi", None).unwrap();
        let file_only = OutboundRequest::compose("", Some(attachment.clone())).unwrap();
        let both = OutboundRequest::compose("hi", Some(attachment)).unwrap();
        assert_eq!(text_only.path(RequestFormat::Hybrid), WORKFLOW_PATH);
        assert_eq!(file_only.path(RequestFormat::Hybrid), WORKFLOW_PATH);
        assert_eq!(both.path(RequestFormat::Hybrid), WORKFLOW_FORM_PATH);
    }

    #[tokio::test]
    async fn test_hybrid_text_only_is_json_query() {
        let request = OutboundRequest::compose("summarize week 3", None).unwrap();
        match request.into_body(RequestFormat::Hybrid).await.unwrap() {
            RequestBody::Json(value) => assert_eq!(value, json!({ "query": "summarize week 3" })),
            RequestBody::Multipart(_) => panic!("expected a JSON body"),
        }
    }

    #[tokio::test]
    async fn test_multipart_text_only_is_form() {
        let request = OutboundRequest::compose("hello", None).unwrap();
        let body = request.into_body(RequestFormat::Multipart).await.unwrap();
        assert!(matches!(body, RequestBody::Multipart(_)));
    }

    #[tokio::test]
    async fn test_unreadable_attachment_fails_body() {
        let (file, attachment) = staged(b"notes");
        drop(file);
        let request = OutboundRequest::compose("hi", Some(attachment)).unwrap();
        assert!(request.into_body(RequestFormat::Multipart).await.is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(RequestFormat::from_str("Hybrid"), Some(RequestFormat::Hybrid));
        assert_eq!(RequestFormat::from_str("multipart"), Some(RequestFormat::Multipart));
        assert_eq!(RequestFormat::from_str("xml"), None);
        assert_eq!(RequestFormat::all().len(), 2);
    }
}
