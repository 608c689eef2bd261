//! One chat client instance: input text, staged file, transcript.
//!
//! A submission is split in two halves so a front end can run the network
//! call off its event loop: [`ChatSession::begin_submission`] records the
//! user's message and hands back the request, and
//! [`ChatSession::finish_submission`] records whatever came back. Several
//! submissions may be outstanding at once; replies land in completion order.

use std::path::Path;

use tracing::{error, info};

use crate::client::WorkflowClient;
use crate::error::Result;
use crate::reply::FAILURE_REPLY;
use crate::request::OutboundRequest;
use crate::state::{ChatMessage, PendingAttachment, Transcript};

pub struct ChatSession {
    client: WorkflowClient,
    transcript: Transcript,
    input: String,
    attachment: Option<PendingAttachment>,
    in_flight: usize,
}

impl ChatSession {
    pub fn new(client: WorkflowClient) -> Self {
        Self {
            client,
            transcript: Transcript::new(),
            input: String::new(),
            attachment: None,
            in_flight: 0,
        }
    }

    pub fn client(&self) -> &WorkflowClient {
        &self.client
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn attachment(&self) -> Option<&PendingAttachment> {
        self.attachment.as_ref()
    }

    /// Label shown next to the input; `None` when nothing is staged.
    pub fn attachment_label(&self) -> Option<&str> {
        self.attachment.as_ref().map(PendingAttachment::name)
    }

    /// Stage a file, replacing any earlier unsent selection. On error the
    /// previous selection is left in place.
    pub fn select_file(&mut self, path: impl AsRef<Path>) -> Result<&PendingAttachment> {
        let attachment = PendingAttachment::from_path(path)?;
        if let Some(previous) = &self.attachment {
            info!(previous = previous.name(), next = attachment.name(), "replacing staged file");
        }
        let staged = self.attachment.insert(attachment);
        Ok(&*staged)
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    /// Number of submissions sent but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Record the user's message and build the request.
    ///
    /// Returns `None` and changes nothing when there is neither text nor a
    /// staged file. Otherwise the input is cleared and the staged file moves
    /// into the request.
    pub fn begin_submission(&mut self) -> Option<OutboundRequest> {
        let request = OutboundRequest::compose(&self.input, self.attachment.take())?;
        self.transcript.push(ChatMessage::user(request.text()));
        self.input.clear();
        self.in_flight += 1;
        Some(request)
    }

    /// Record the outcome of a submission as exactly one assistant message.
    ///
    /// The staged file and its label are cleared whether or not this
    /// submission carried one, including a file picked while it was in flight.
    pub fn finish_submission(&mut self, outcome: Result<String>) -> ChatMessage {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.attachment = None;
        let message = match outcome {
            Ok(reply) => ChatMessage::assistant(reply),
            Err(e) => {
                error!(error = %e, "submission failed");
                ChatMessage::assistant(FAILURE_REPLY)
            }
        };
        self.transcript.push(message.clone());
        message
    }

    /// Run a whole submission inline. Returns `false` if it was suppressed.
    pub async fn submit(&mut self) -> bool {
        let Some(request) = self.begin_submission() else {
            return false;
        };
        let client = self.client.clone();
        let outcome = client.submit(request).await;
        self.finish_submission(outcome);
        true
    }
}
