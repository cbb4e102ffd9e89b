use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => insert_text(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_model_picker {
        handle_model_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_model_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.show_model_picker = false,
        KeyCode::Down | KeyCode::Char('j') => app.model_picker_nav_down(),
        KeyCode::Up | KeyCode::Char('k') => app.model_picker_nav_up(),
        KeyCode::Enter => app.select_model(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    let suggestions = app.suggestions_visible();

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Esc => app.session.dismiss_notice(),
        KeyCode::Char('m') => app.open_model_picker(),
        KeyCode::Char('n') => app.new_conversation(),

        // Suggestions take the arrow keys while they're on screen
        KeyCode::Down | KeyCode::Char('j') if suggestions => app.suggestion_nav_down(),
        KeyCode::Up | KeyCode::Char('k') if suggestions => app.suggestion_nav_up(),
        KeyCode::Tab | KeyCode::Enter if suggestions => app.use_suggestion(),
        KeyCode::Enter => app.input_mode = InputMode::Editing,

        // Chat scrolling
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(app.half_page()),
        KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.half_page())
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.half_page())
        }
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_input();
        }
        KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::PageDown => app.scroll_down(app.half_page()),
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

/// Insert pasted text at the cursor. Newlines become spaces since the input
/// is a single line.
fn insert_text(app: &mut App, text: &str) {
    let cleaned: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let byte_pos = char_to_byte_index(&app.input, app.cursor);
    app.input.insert_str(byte_pos, &cleaned);
    app.cursor += cleaned.chars().count();
    app.input_mode = InputMode::Editing;
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .is_some_and(|r| point_in_rect(mouse.column, mouse.row, r));
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use mindmentor_core::ApiClient;

    fn app() -> App {
        App::new(ApiClient::new("http://127.0.0.1:1"), "DeepSeek")
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_editing_handles_multibyte_chars() {
        let mut app = app();
        type_str(&mut app, "héllo");
        assert_eq!(app.cursor, 5);

        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.input, "hllo");
        assert_eq!(app.cursor, 1);

        handle_event(&mut app, key(KeyCode::Delete)).unwrap();
        assert_eq!(app.input, "hlo");

        handle_event(&mut app, key(KeyCode::End)).unwrap();
        type_str(&mut app, "!");
        assert_eq!(app.input, "hlo!");
    }

    #[test]
    fn test_escape_then_quit() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.should_quit);

        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_q_while_editing_is_typed() {
        let mut app = app();
        type_str(&mut app, "q");
        assert_eq!(app.input, "q");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_mode() {
        let mut app = app();
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        )
        .unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_uses_suggestion_in_normal_mode() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        handle_event(&mut app, key(KeyCode::Down)).unwrap();
        handle_event(&mut app, key(KeyCode::Down)).unwrap();
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.input, "Help with statistics");
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut app = app();
        handle_event(&mut app, AppEvent::Paste("line one\nline two".to_string())).unwrap();
        assert_eq!(app.input, "line one line two");
        assert_eq!(app.cursor, 17);
    }

    #[test]
    fn test_model_picker_captures_keys() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        handle_event(&mut app, key(KeyCode::Char('m'))).unwrap();
        assert!(app.show_model_picker);

        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(!app.show_model_picker);
        assert!(!app.should_quit);
    }
}
