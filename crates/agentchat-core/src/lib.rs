pub mod client;
pub mod config;
pub mod error;
pub mod reply;
pub mod request;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use client::{WorkflowClient, DEFAULT_ENDPOINT};
pub use config::Config;
pub use error::{ChatError, Result};
pub use reply::{extract_reply, FAILURE_REPLY, PLACEHOLDER_REPLY};
pub use request::{OutboundRequest, RequestFormat};
pub use session::ChatSession;
pub use state::{ChatMessage, ChatRole, PendingAttachment, Transcript};
