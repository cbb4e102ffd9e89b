use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
};
use mindmentor_core::{ChatMessage, ChatRole, NoticeKind, SUGGESTED_PROMPTS};
use crate::app::{ApiStatus, App, InputMode};
use crate::markdown;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let notice_height = if app.session.notice().is_some() { 1 } else { 0 };
    let suggestions_height = if app.suggestions_visible() {
        SUGGESTED_PROMPTS.len() as u16 + 2
    } else {
        0
    };

    let [header_area, chat_area, suggestions_area, notice_area, input_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(suggestions_height),
            Constraint::Length(notice_height),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    if suggestions_height > 0 {
        render_suggestions(app, frame, suggestions_area);
    }
    if notice_height > 0 {
        render_notice(app, frame, notice_area);
    }
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_model_picker {
        render_model_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status_color = match app.api_status {
        ApiStatus::Checking => Color::Gray,
        ApiStatus::Online => Color::Green,
        ApiStatus::Offline => Color::Red,
    };

    let title = Line::from(vec![
        Span::styled(" MindMentor ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        Span::styled(
            format!("model: {}", app.session.selected_model()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled("● ", Style::default().fg(status_color)),
        Span::styled(app.api_status.label(), Style::default().fg(status_color)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn message_header(msg: &ChatMessage) -> Line<'static> {
    let time = msg.timestamp.format("%H:%M").to_string();
    match msg.role {
        ChatRole::User => Line::from(vec![
            Span::styled("You", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" · {}", time), Style::default().fg(Color::DarkGray)),
        ]),
        ChatRole::Assistant => {
            let mut meta = String::new();
            if let Some(model) = &msg.model {
                meta.push_str(&format!(" · {}", model));
            }
            meta.push_str(&format!(" · {}", time));
            if let Some(tokens) = msg.token_count {
                meta.push_str(&format!(" · {} tokens", tokens));
            }
            Line::from(vec![
                Span::styled("Tutor", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(meta, Style::default().fg(Color::DarkGray)),
            ])
        }
    }
}

pub fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in app.session.messages() {
        lines.push(message_header(msg));
        match msg.role {
            ChatRole::User => {
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => lines.extend(markdown::render(&msg.content)),
        }
        lines.push(Line::default());
    }

    if app.session.is_pending() {
        lines.push(Line::from(Span::styled(
            "Tutor",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn text_width(text: &str) -> usize {
    Span::raw(text).width()
}

/// Split into alternating runs of whitespace and non-whitespace
fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut last_space: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if last_space.is_some_and(|s| s != space) {
            words.push(&text[start..i]);
            start = i;
        }
        last_space = Some(space);
    }
    if start < text.len() {
        words.push(&text[start..]);
    }
    words
}

/// Word-wrap a styled line to `width` columns, keeping span styles. Words
/// longer than a row are split by character; continuation rows drop their
/// leading whitespace.
pub fn wrap_line(line: &Line<'static>, width: u16) -> Vec<Line<'static>> {
    let width = width.max(1) as usize;
    if line.width() <= width {
        return vec![line.clone()];
    }

    let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0;

    for span in &line.spans {
        for word in split_words(&span.content) {
            let is_space = word.chars().all(char::is_whitespace);
            let word_width = text_width(word);

            // Over-long words fill the rest of the row before splitting
            if current_width > 0 && current_width + word_width > width && word_width <= width {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if is_space && current_width == 0 && !rows.is_empty() {
                continue;
            }

            if word_width <= width {
                current.push(Span::styled(word.to_string(), span.style));
                current_width += word_width;
                continue;
            }

            let mut piece = String::new();
            for c in word.chars() {
                let char_width = text_width(c.encode_utf8(&mut [0; 4]));
                if current_width + char_width > width && current_width > 0 {
                    if !piece.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut piece), span.style));
                    }
                    rows.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                piece.push(c);
                current_width += char_width;
            }
            if !piece.is_empty() {
                current.push(Span::styled(piece, span.style));
            }
        }
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }

    rows.into_iter()
        .map(|spans| Line::from(spans).style(line.style))
        .collect()
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);

    let lines: Vec<Line<'static>> = chat_lines(app)
        .iter()
        .flat_map(|line| wrap_line(line, inner_width))
        .collect();
    let total = lines.len().min(u16::MAX as usize) as u16;
    let max_scroll = total.saturating_sub(app.chat_height);

    // Stick to the newest message unless the user scrolled away
    if app.follow_bottom || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.follow_bottom = true;
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" AI Tutor ");

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);

    if max_scroll > 0 {
        let mut scrollbar_state = ScrollbarState::new(max_scroll as usize)
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_suggestions(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.input_mode == InputMode::Normal;
    let border_color = if focused { Color::Magenta } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Try asking (Esc, ↑/↓, Tab to use) ");

    let items: Vec<ListItem> = SUGGESTED_PROMPTS
        .iter()
        .map(|prompt| {
            ListItem::new(Line::from(vec![
                Span::raw(prompt.text),
                Span::styled(format!("  {}", prompt.category), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.suggestion_state);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notice) = app.session.notice() else {
        return;
    };

    let (prefix, color) = match notice.kind {
        NoticeKind::Fallback => (" ⚠ ", Color::Yellow),
        NoticeKind::Error => (" ✖ ", Color::Red),
    };

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(color).bold()),
        Span::styled(notice.text.clone(), Style::default().fg(color)),
        Span::styled("  (Esc in normal mode to dismiss)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if app.session.is_pending() {
        " Waiting for the tutor... "
    } else {
        " Ask anything (Enter to send) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 || app.cursor < inner_width {
        0
    } else {
        app.cursor - inner_width + 1
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    if editing && !app.show_model_picker {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode, mode_color) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Color::Blue),
        InputMode::Editing => (" INSERT ", Color::Yellow),
    };

    let hints = if app.show_model_picker {
        " ↑/↓ choose  Enter select  Esc cancel"
    } else {
        match app.input_mode {
            InputMode::Editing => " Enter send  Esc normal mode  PgUp/PgDn scroll  Ctrl-C quit",
            InputMode::Normal => " i type  m model  n new chat  j/k scroll  g/G top/bottom  q quit",
        }
    };

    let footer = Line::from(vec![
        Span::styled(mode, Style::default().bg(mode_color).fg(Color::Black).bold()),
        Span::styled(hints, Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(footer).style(Style::default().bg(Color::Black)), area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [vertical] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [centered] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vertical);
    centered
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let height = (app.available_models.len() as u16 + 2).min(area.height);
    let popup = centered_rect(area, 60.min(area.width), height);

    let current = app.session.selected_model().to_string();
    let items: Vec<ListItem> = app
        .available_models
        .iter()
        .map(|model| {
            let marker = if model.name == current { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{}{}", marker, model.display_name())),
                Span::styled(
                    format!("  {}", model.description),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Select Model "),
        )
        .highlight_style(Style::default().bg(Color::Cyan).fg(Color::Black).bold())
        .highlight_symbol("> ");

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut app.model_picker_state);
}
