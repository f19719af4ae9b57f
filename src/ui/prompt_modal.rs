use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::prompt::ActivePrompt;

const MAX_LIST_ROWS: u16 = 12;

pub fn render(f: &mut Frame, area: Rect, prompt: &ActivePrompt) {
    let items = prompt.visible_items();
    let list_rows = if prompt.is_pick() {
        (items.len() as u16).clamp(1, MAX_LIST_ROWS) + 2
    } else {
        0
    };
    let modal = centered(area, 60, 3 + list_rows);
    f.render_widget(Clear, modal);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(modal);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", prompt.title()));

    let text = if prompt.is_confirm() {
        Line::from(Span::styled("y: yes  n/esc: no", Style::default().fg(Color::Gray)))
    } else if prompt.buffer.is_empty() {
        Line::from(Span::styled(
            prompt.placeholder().to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    } else if prompt.is_secret() {
        Line::raw("•".repeat(prompt.buffer.chars().count()))
    } else {
        Line::raw(prompt.buffer.clone())
    };
    f.render_widget(Paragraph::new(text).block(block), parts[0]);

    if !prompt.is_confirm() {
        let cursor = prompt.buffer.chars().count() as u16;
        let x = parts[0].x + 1 + cursor;
        f.set_cursor_position((x.min(parts[0].x + parts[0].width - 2), parts[0].y + 1));
    }

    if prompt.is_pick() {
        let rows: Vec<ListItem> = if items.is_empty() {
            vec![ListItem::new(Span::styled(
                "No matches",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            items.iter().map(|item| ListItem::new(item.to_string())).collect()
        };
        let list = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(prompt.selected));
        }
        f.render_stateful_widget(list, parts[1], &mut state);
    }
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height.saturating_sub(height) / 3,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 10);
        let modal = centered(area, 60, 40);
        assert_eq!(modal.width, 60);
        assert_eq!(modal.height, 10);
        assert_eq!(modal.x, 20);
        assert_eq!(modal.y, 0);
    }
}
