use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Pane};
use crate::ui::theme::notice_color;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    if app.prompt.is_some() {
        spans.push(hint("enter", "submit"));
        spans.push(hint("esc", "cancel"));
    } else {
        spans.push(hint("↑↓", "navigate"));
        spans.push(hint("tab", "pane"));
        match app.focus {
            Pane::Servers => {
                spans.push(hint("enter", "connect"));
                spans.push(hint("a", "add"));
                spans.push(hint("e", "edit"));
                spans.push(hint("d", "delete"));
            }
            Pane::Agiles => {
                spans.push(hint("→", "expand"));
                spans.push(hint("enter", "select"));
            }
            Pane::Sprints | Pane::Recent => {
                spans.push(hint("enter", "open"));
                spans.push(hint("a", "new"));
                spans.push(hint("s", "state"));
                spans.push(hint("u", "assignee"));
                spans.push(hint("o", "browser"));
                spans.push(hint("b", "branch"));
            }
        }
        spans.push(hint("r", "refresh"));
        spans.push(hint(":", "command"));
        spans.push(hint("q", "quit"));
    }

    // Connection indicator
    spans.push(Span::raw("  "));
    match &app.connected {
        Some(server) => spans.push(Span::styled(
            format!(" {} ", server.label),
            Style::default().fg(Color::Black).bg(Color::Green),
        )),
        None => spans.push(Span::styled(
            " OFFLINE ",
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )),
    }

    if let Some(command) = app.running {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{}...", command.title()),
            Style::default().fg(Color::Cyan),
        ));
    }

    if let Some((msg, level, _)) = &app.flash_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(msg.clone(), Style::default().fg(notice_color(*level))));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(format!(" {key}:{desc} "), Style::default().fg(Color::DarkGray))
}
