//! Minimal Markdown to ratatui conversion for tutor replies.
//!
//! Handles what the tutor actually produces: headings, bullet lists, block
//! quotes, fenced code blocks and inline `**bold**`, `*italic*` and `code`.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

fn code_style() -> Style {
    Style::default().fg(Color::LightGreen)
}

/// Render a whole reply, tracking fenced code blocks across lines
pub fn render(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for raw in text.lines() {
        let trimmed = raw.trim_start();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            if in_code_block {
                let lang = trimmed.trim_start_matches('`').trim();
                let label = if lang.is_empty() { "code".to_string() } else { lang.to_string() };
                lines.push(Line::from(Span::styled(
                    format!("┌ {}", label),
                    Style::default().fg(Color::DarkGray),
                )));
            } else {
                lines.push(Line::from(Span::styled("└", Style::default().fg(Color::DarkGray))));
            }
            continue;
        }

        if in_code_block {
            lines.push(Line::from(vec![
                Span::styled("│ ", Style::default().fg(Color::DarkGray)),
                Span::styled(raw.to_string(), code_style()),
            ]));
        } else {
            lines.push(render_line(raw));
        }
    }

    lines
}

/// Render a single line outside of a code block
pub fn render_line(text: &str) -> Line<'static> {
    let trimmed = text.trim_start();
    let indent = &text[..text.len() - trimmed.len()];

    // Headings
    let heading_level = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&heading_level) && trimmed[heading_level..].starts_with(' ') {
        let title = trimmed[heading_level..].trim().to_string();
        let style = match heading_level {
            1 => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            2 => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            _ => Style::default().add_modifier(Modifier::BOLD),
        };
        return Line::from(Span::styled(title, style));
    }

    // Bullets
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            let mut spans = vec![Span::raw(format!("{}• ", indent))];
            spans.extend(parse_inline(rest));
            return Line::from(spans);
        }
    }

    // Block quotes
    if let Some(rest) = trimmed.strip_prefix('>') {
        let quote_style = Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC);
        let mut spans = vec![Span::styled("▎ ", Style::default().fg(Color::DarkGray))];
        spans.extend(
            parse_inline(rest.trim_start())
                .into_iter()
                .map(|span| span.patch_style(quote_style)),
        );
        return Line::from(spans);
    }

    let spans = parse_inline(text);
    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Convert `**bold**`, `*italic*` and `` `code` `` into styled spans.
/// Unterminated markers are kept as literal text.
fn parse_inline(text: &str) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        match c {
            '`' => {
                let mut code = String::new();
                let mut found_close = false;
                for c in chars.by_ref() {
                    if c == '`' {
                        found_close = true;
                        break;
                    }
                    code.push(c);
                }

                if found_close && !code.is_empty() {
                    flush(&mut spans, &mut current_text);
                    spans.push(Span::styled(code, code_style()));
                } else {
                    current_text.push('`');
                    current_text.push_str(&code);
                    if found_close {
                        current_text.push('`');
                    }
                }
            }
            '*' if chars.peek() == Some(&'*') => {
                chars.next();

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
                    flush(&mut spans, &mut current_text);
                    spans.push(Span::styled(
                        bold_text,
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                } else {
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                    if found_close {
                        current_text.push_str("**");
                    }
                }
            }
            // `2 * 3` is arithmetic, not emphasis
            '*' if chars.peek().is_some_and(|c| !c.is_whitespace()) => {
                let mut italic_text = String::new();
                let mut found_close = false;
                for c in chars.by_ref() {
                    if c == '*' {
                        found_close = true;
                        break;
                    }
                    italic_text.push(c);
                }

                if found_close {
                    flush(&mut spans, &mut current_text);
                    spans.push(Span::styled(
                        italic_text,
                        Style::default().add_modifier(Modifier::ITALIC),
                    ));
                } else {
                    current_text.push('*');
                    current_text.push_str(&italic_text);
                }
            }
            _ => current_text.push(c),
        }
    }

    flush(&mut spans, &mut current_text);
    spans
}

fn flush(spans: &mut Vec<Span<'static>>, current_text: &mut String) {
    if !current_text.is_empty() {
        spans.push(Span::raw(std::mem::take(current_text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bold_and_italic() {
        let line = render_line("A **strong** and *soft* word");
        assert_eq!(plain(&line), "A strong and soft word");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(line.spans[3].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_unclosed_markers_stay_literal() {
        assert_eq!(plain(&render_line("a **dangling")), "a **dangling");
        assert_eq!(plain(&render_line("a `tick")), "a `tick");
        assert_eq!(plain(&render_line("2 * 3 = 6")), "2 * 3 = 6");
    }

    #[test]
    fn test_inline_code() {
        let line = render_line("Call `useState()` first");
        assert_eq!(plain(&line), "Call useState() first");
        assert_eq!(line.spans[1].content, "useState()");
        assert_eq!(line.spans[1].style.fg, Some(Color::LightGreen));
    }

    #[test]
    fn test_heading_strips_hashes() {
        let line = render_line("## Wave functions");
        assert_eq!(plain(&line), "Wave functions");
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));

        // Not a heading without the space
        assert_eq!(plain(&render_line("#hashtag")), "#hashtag");
    }

    #[test]
    fn test_bullets_keep_indent() {
        assert_eq!(plain(&render_line("- first")), "• first");
        assert_eq!(plain(&render_line("  * nested **item**")), "  • nested item");
    }

    #[test]
    fn test_code_block_is_not_parsed_inline() {
        let lines = render("Example:\n```rust\nlet x = **y**;\n```\ndone");
        let text: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(
            text,
            vec!["Example:", "┌ rust", "│ let x = **y**;", "└", "done"]
        );
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(render_line(""), Line::default());
    }
}
