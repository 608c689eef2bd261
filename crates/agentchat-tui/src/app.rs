use agentchat_core::{ChatSession, Result as ChatResult};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::tui::AppEvent;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Typing a message.
    Compose,
    /// Typing a path into the attach prompt.
    Attach,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    pub session: ChatSession,
    pub cursor: usize, // char index into the session's input

    // Attach prompt
    pub attach_input: String,
    pub attach_cursor: usize,

    /// One-line notice under the input (rejected attachment, etc.).
    pub status: Option<String>,

    // Transcript view
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript pane
    pub chat_width: u16,  // inner width, the wrap width

    pub animation_frame: u8,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(session: ChatSession, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Compose,
            session,
            cursor: 0,
            attach_input: String::new(),
            attach_cursor: 0,
            status: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            events,
        }
    }

    /// Record the user's message and send it on a background task. The reply
    /// comes back as [`AppEvent::Reply`].
    pub fn submit(&mut self) {
        let Some(request) = self.session.begin_submission() else {
            return;
        };
        self.cursor = 0;
        self.status = None;

        let client = self.session.client().clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = client.submit(request).await;
            if events.send(AppEvent::Reply(outcome)).is_err() {
                debug!("reply arrived after the event loop closed");
            }
        });

        self.scroll_to_bottom();
    }

    pub fn apply_reply(&mut self, outcome: ChatResult<String>) {
        self.session.finish_submission(outcome);
        self.scroll_to_bottom();
    }

    pub fn open_attach_prompt(&mut self) {
        self.input_mode = InputMode::Attach;
        self.attach_input.clear();
        self.attach_cursor = 0;
        self.status = None;
    }

    pub fn close_attach_prompt(&mut self) {
        self.input_mode = InputMode::Compose;
        self.attach_input.clear();
        self.attach_cursor = 0;
    }

    /// Stage the path typed into the attach prompt.
    pub fn confirm_attach(&mut self) {
        let path = self.attach_input.trim().to_string();
        if !path.is_empty() {
            match self.session.select_file(&path) {
                Ok(_) => self.status = None,
                Err(e) => {
                    warn!(error = %e, "file selection rejected");
                    self.status = Some(format!("Cannot attach {path}"));
                }
            }
        }
        self.close_attach_prompt();
    }

    pub fn clear_attachment(&mut self) {
        self.session.clear_attachment();
        self.status = None;
    }

    pub fn tick_animation(&mut self) {
        if self.session.in_flight() > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.transcript_lines().saturating_sub(self.visible_height());
        self.chat_scroll = (self.chat_scroll.saturating_add(lines)).min(max_scroll);
    }

    /// Scroll the transcript so the newest entry is visible.
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.transcript_lines().saturating_sub(self.visible_height());
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered height of the transcript at the current pane width.
    fn transcript_lines(&self) -> u16 {
        let width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let rows = ui::transcript_paragraph(&self.session, self.animation_frame).line_count(width);
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentchat_core::{ChatError, ChatRole, RequestFormat, WorkflowClient, FAILURE_REPLY};
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = WorkflowClient::new("http://127.0.0.1:1", RequestFormat::Multipart);
        (App::new(ChatSession::new(client), tx), rx)
    }

    #[tokio::test]
    async fn test_submit_spawns_and_reply_is_applied() {
        let (mut app, mut rx) = test_app();
        app.session.set_input("hello");
        app.cursor = 5;
        app.submit();

        assert_eq!(app.cursor, 0);
        assert_eq!(app.session.input(), "");
        assert_eq!(app.session.in_flight(), 1);

        // Nothing listens on port 1, so the task reports a transport failure.
        let event = rx.recv().await.unwrap();
        let AppEvent::Reply(outcome) = event else {
            panic!("expected a reply event");
        };
        app.apply_reply(outcome);

        let transcript = app.session.transcript();
        assert_eq!(transcript.count_role(ChatRole::User), 1);
        assert_eq!(transcript.last().unwrap().content, FAILURE_REPLY);
        assert_eq!(app.session.in_flight(), 0);
    }

    #[test]
    fn test_empty_submit_does_nothing() {
        let (mut app, mut rx) = test_app();
        app.submit();
        assert!(app.session.transcript().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_rejected_attachment_sets_status() {
        let (mut app, _rx) = test_app();
        app.open_attach_prompt();
        app.attach_input = "/definitely/not/here.pdf".to_string();
        app.confirm_attach();

        assert_eq!(app.input_mode, InputMode::Compose);
        assert!(app.session.attachment().is_none());
        assert!(app.status.as_deref().unwrap().contains("here.pdf"));
    }

    #[test]
    fn test_attach_prompt_stages_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut app, _rx) = test_app();
        app.open_attach_prompt();
        app.attach_input = format!("  {}  ", file.path().display());
        app.confirm_attach();

        assert_eq!(app.session.attachment().unwrap().path(), file.path());
        app.clear_attachment();
        assert!(app.session.attachment_label().is_none());
    }

    #[test]
    fn test_scroll_follows_new_messages() {
        let (mut app, _rx) = test_app();
        app.chat_height = 4;
        app.chat_width = 40;
        for i in 0..5 {
            app.apply_reply(Ok(format!("reply {i}")));
        }
        // Five messages at three lines each, four visible.
        assert_eq!(app.chat_scroll, 11);

        app.scroll_up(3);
        assert_eq!(app.chat_scroll, 8);
        app.scroll_down(100);
        assert_eq!(app.chat_scroll, 11);
    }

    #[test]
    fn test_scroll_accounts_for_word_wrap() {
        let (mut app, _rx) = test_app();
        app.chat_height = 2;
        app.chat_width = 20;
        // Five 15-char words: only one fits per 20-column row.
        let word = "a".repeat(15);
        app.apply_reply(Ok(vec![word; 5].join(" ")));
        // Label, five wrapped rows, spacer.
        assert_eq!(app.chat_scroll, 5);
        app.scroll_down(10);
        assert_eq!(app.chat_scroll, 5);
    }

    #[test]
    fn test_scroll_with_reply_exactly_pane_width() {
        let (mut app, _rx) = test_app();
        app.chat_height = 1;
        app.chat_width = 20;
        app.apply_reply(Ok("b".repeat(20)));
        // The body fills one row without spilling onto a second.
        assert_eq!(app.chat_scroll, 2);
    }

    #[test]
    fn test_failed_reply_counts_down_in_flight() {
        let (mut app, _rx) = test_app();
        app.session.set_input("a");
        app.session.begin_submission();
        app.apply_reply(Err(ChatError::Decode("eof".to_string())));
        assert_eq!(app.session.in_flight(), 0);
    }
}
