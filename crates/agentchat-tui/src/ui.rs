use agentchat_core::{ChatMessage, ChatRole, ChatSession};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, InputMode};

/// Tallest the input box grows before it scrolls, borders included.
const MAX_INPUT_HEIGHT: u16 = 7;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c != '*' || chars.peek() != Some(&'*') {
            current_text.push(c);
            continue;
        }
        chars.next();

        // Find closing **
        let mut bold_text = String::new();
        let mut found_close = false;
        while let Some(c) = chars.next() {
            if c == '*' && chars.peek() == Some(&'*') {
                chars.next();
                found_close = true;
                break;
            }
            bold_text.push(c);
        }

        if found_close && !bold_text.is_empty() {
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }
            spans.push(Span::styled(
                bold_text,
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else {
            // No closing **, treat as literal
            current_text.push_str("**");
            current_text.push_str(&bold_text);
            if found_close {
                current_text.push_str("**");
            }
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

fn role_label(role: ChatRole) -> (&'static str, Color) {
    match role {
        ChatRole::User => ("You", Color::Cyan),
        ChatRole::Assistant => ("Agent", Color::Yellow),
    }
}

/// Lines for one transcript entry: label with timestamp, body, blank spacer.
fn message_lines(msg: &ChatMessage) -> Vec<Line<'static>> {
    let (label, color) = role_label(msg.role);
    let mut lines = vec![Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", msg.created_at.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    if msg.content.is_empty() {
        lines.push(Line::from(Span::styled(
            "(attachment only)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    for line in msg.content.lines() {
        match msg.role {
            ChatRole::User => lines.push(Line::from(line.to_string())),
            ChatRole::Assistant => lines.push(parse_markdown_line(line)),
        }
    }

    lines.push(Line::default());
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let input_lines = app.session.input().split('\n').count() as u16;
    let input_height = (input_lines + 2).min(MAX_INPUT_HEIGHT);

    let [header_area, chat_area, attachment_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_attachment(app, frame, attachment_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let client = app.session.client();
    let title = Line::from(vec![
        Span::styled(" agentchat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("{} ({})", client.base_url(), client.format().as_str()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// The transcript as rendered, without its border. Shared with the scroll
/// logic so both agree on how many rows the wrapped text takes.
pub fn transcript_paragraph(session: &ChatSession, animation_frame: u8) -> Paragraph<'static> {
    let in_flight = session.in_flight();
    let transcript = session.transcript();

    let chat_text = if transcript.is_empty() && in_flight == 0 {
        Text::from(Span::styled(
            "Type a message, or press Ctrl+O to attach a file...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line<'static>> =
            transcript.messages().iter().flat_map(message_lines).collect();

        if in_flight > 0 {
            let (label, color) = role_label(ChatRole::Assistant);
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((animation_frame as usize) + 1);
            let waiting = if in_flight == 1 {
                format!("Thinking{dots}")
            } else {
                format!("Waiting for {in_flight} replies{dots}")
            };
            lines.push(Line::from(Span::styled(
                waiting,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(chat_text).wrap(Wrap { trim: false })
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let chat = transcript_paragraph(&app.session, app.animation_frame)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_attachment(app: &App, frame: &mut Frame, area: Rect) {
    let line = if let Some(status) = &app.status {
        Line::from(Span::styled(format!(" {status}"), Style::default().fg(Color::Red)))
    } else if let Some(name) = app.session.attachment_label() {
        Line::from(vec![
            Span::styled(" Attached: ", Style::default().fg(Color::DarkGray)),
            Span::styled(name.to_string(), Style::default().fg(Color::Magenta).bold()),
            Span::styled("  (Ctrl+X to remove)", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (title, text, cursor, color) = match app.input_mode {
        InputMode::Compose => (
            " Message (Enter to send, Alt+Enter for newline) ",
            app.session.input(),
            app.cursor,
            Color::Yellow,
        ),
        InputMode::Attach => (
            " Attach file path (Enter to select, Esc to cancel) ",
            app.attach_input.as_str(),
            app.attach_cursor,
            Color::Magenta,
        ),
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    // Locate the cursor as (row, col) within the input's lines
    let before_cursor: String = text.chars().take(cursor).collect();
    let cursor_row = before_cursor.matches('\n').count();
    let cursor_col = before_cursor
        .rsplit('\n')
        .next()
        .map(|l| l.chars().count())
        .unwrap_or(0);

    // Keep the cursor visible horizontally and vertically
    let col_offset = if inner_width > 0 && cursor_col >= inner_width {
        cursor_col - inner_width + 1
    } else {
        0
    };
    let row_offset = if inner_height > 0 && cursor_row >= inner_height {
        cursor_row - inner_height + 1
    } else {
        0
    };

    let visible: Vec<Line> = text
        .split('\n')
        .skip(row_offset)
        .take(inner_height.max(1))
        .map(|l| Line::from(l.chars().skip(col_offset).take(inner_width).collect::<String>()))
        .collect();

    let input = Paragraph::new(visible)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    frame.set_cursor_position((
        area.x + 1 + (cursor_col - col_offset) as u16,
        area.y + 1 + (cursor_row - row_offset) as u16,
    ));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Compose => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Attach => Style::default().bg(Color::Magenta).fg(Color::White),
    };
    let mode_text = match app.input_mode {
        InputMode::Compose => " CHAT ",
        InputMode::Attach => " ATTACH ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Compose => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" ^O ", key_style),
            Span::styled(" attach ", label_style),
            Span::styled(" ^X ", key_style),
            Span::styled(" unattach ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::Attach => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" select ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
