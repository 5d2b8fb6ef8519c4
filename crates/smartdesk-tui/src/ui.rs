use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use smartdesk_core::render::{ActivityPane, TranscriptPane, LOG_PLACEHOLDER_TEXT, WELCOME_TEXT};
use smartdesk_core::{ChatRole, ConnectionStatus, Scenario};
use crate::app::{App, Focus, InputField};

const PANE_WRAP: Wrap = Wrap { trim: false };

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if end == 0 {
            // "****" carries no text; keep it literal
            spans.push(Span::raw(rest[..start + 4].to_string()));
            rest = &after[2..];
            continue;
        }
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(
            after[..end].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Rows a set of lines occupies once word-wrapped to `width` columns, using
/// the same wrapping the panes render with
fn wrapped_height(lines: &[Line<'static>], width: u16) -> u16 {
    let rows = Paragraph::new(Text::from(lines.to_vec()))
        .wrap(PANE_WRAP)
        .line_count(width.max(1));
    rows.min(u16::MAX as usize) as u16
}

/// Keep `scroll` in range, jumping to the bottom when the pane follows its tail
fn settle_scroll(scroll: &mut u16, follow_tail: &mut bool, total: u16, visible: u16) {
    let max_scroll = total.saturating_sub(visible);
    if *follow_tail {
        *scroll = max_scroll;
        *follow_tail = false;
    } else {
        *scroll = (*scroll).min(max_scroll);
    }
}

pub fn transcript_lines(pane: &TranscriptPane, thinking_frame: Option<u8>) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    if pane.shows_welcome() {
        lines.push(Line::from(Span::styled(
            WELCOME_TEXT,
            Style::default().fg(Color::DarkGray),
        )));
    }

    for block in pane.blocks() {
        match block.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    format!("{}:", block.label),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.extend(block.content.lines().map(|l| Line::from(l.to_string())));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    format!("{}:", block.label),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.extend(block.content.lines().map(parse_markdown_line));
            }
        }
        lines.push(Line::default());
    }

    if let Some(frame) = thinking_frame {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn activity_lines(pane: &ActivityPane) -> Vec<Line<'static>> {
    if pane.shows_placeholder() {
        return vec![Line::from(Span::styled(
            LOG_PLACEHOLDER_TEXT,
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let mut lines = Vec::new();
    for block in pane.blocks() {
        let color = if block.is_error { Color::Red } else { Color::Magenta };
        lines.push(Line::from(Span::styled(
            format!("🔹 {}", block.label),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for detail in block.details.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {}", detail),
                Style::default().fg(Color::Gray),
            )));
        }
        lines.push(Line::default());
    }
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [chat_area, log_area] = Layout::horizontal([
        Constraint::Percentage(60),
        Constraint::Percentage(40),
    ])
    .areas(body_area);

    render_chat(app, frame, chat_area);
    render_activity_log(app, frame, log_area);
    render_footer(app, frame, footer_area);

    if let Some(message) = app.view.alert.clone() {
        render_alert(frame, area, &message);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let dot_color = match app.status {
        ConnectionStatus::Connected { .. } => Color::Green,
        ConnectionStatus::Checking => Color::Yellow,
        ConnectionStatus::ApiError | ConnectionStatus::Disconnected => Color::Red,
    };

    let mut spans = vec![
        Span::styled(" SmartDesk ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("● ", Style::default().fg(dot_color)),
        Span::styled(app.status.label(), Style::default().fg(Color::White)),
    ];
    if let ConnectionStatus::Connected { environment: Some(env) } = &app.status {
        spans.push(Span::styled(format!(" ({})", env), Style::default().fg(Color::Gray)));
    }
    spans.push(Span::styled(
        format!("  {}  v{}", app.base_url(), env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [user_area, transcript_area, input_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.transcript_area = Some(transcript_area);

    let processing = app.is_processing();
    let editable = !processing && app.view.alert.is_none();

    render_input(
        frame,
        user_area,
        &app.user_id,
        " User ID ",
        app.focus == Focus::UserId,
        editable && app.focus == Focus::UserId,
    );

    let thinking = processing.then_some(app.animation_frame);
    let lines = transcript_lines(&app.view.transcript, thinking);
    let inner_height = transcript_area.height.saturating_sub(2);
    let inner_width = transcript_area.width.saturating_sub(2);
    let total = wrapped_height(&lines, inner_width);
    settle_scroll(
        &mut app.transcript_scroll,
        &mut app.view.transcript.follow_tail,
        total,
        inner_height,
    );

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");
    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(PANE_WRAP)
        .scroll((app.transcript_scroll, 0));
    frame.render_widget(chat, transcript_area);

    let title = if processing { " Sending... " } else { " Message (Enter to send) " };
    render_input(
        frame,
        input_area,
        &app.message,
        title,
        app.focus == Focus::Message,
        editable && app.focus == Focus::Message,
    );
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    field: &InputField,
    title: &str,
    focused: bool,
    show_cursor: bool,
) {
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width > 0 && field.cursor >= inner_width {
        field.cursor - inner_width + 1
    } else {
        0
    };
    let visible_text: String = field
        .text
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if show_cursor {
        let cursor_x = (field.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_activity_log(app: &mut App, frame: &mut Frame, area: Rect) {
    app.log_area = Some(area);

    let lines = activity_lines(&app.view.activity);
    let total = wrapped_height(&lines, area.width.saturating_sub(2));
    settle_scroll(
        &mut app.log_scroll,
        &mut app.view.activity.follow_tail,
        total,
        area.height.saturating_sub(2),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Agent Activity (Ctrl+L to clear) ");
    let log = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(PANE_WRAP)
        .scroll((app.log_scroll, 0));
    frame.render_widget(log, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = if app.view.alert.is_some() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" dismiss ", label_style),
        ]
    } else {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" field ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" ^L ", key_style),
            Span::styled(" clear log ", label_style),
            Span::styled(" ^R ", key_style),
            Span::styled(" health ", label_style),
        ]
    };

    if app.view.alert.is_none() {
        for (i, scenario) in Scenario::all().iter().enumerate() {
            hints.push(Span::styled(format!(" F{} ", i + 1), key_style));
            hints.push(Span::styled(format!(" {} ", scenario.display_name()), label_style));
        }
    }
    hints.push(Span::styled(" Esc ", key_style));
    hints.push(Span::styled(" quit ", label_style));

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let [popup_area] = Layout::horizontal([Constraint::Length(50)])
        .flex(Flex::Center)
        .areas(area);
    let [popup_area] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Notice ");

    let text = Text::from(vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        popup_area,
    );
}
