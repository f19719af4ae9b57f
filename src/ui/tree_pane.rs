use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::{App, Pane};
use crate::tree::outline::OutlineEntry;
use crate::ui::theme::{border_style, icon_color, icon_glyph};

pub fn render(f: &mut Frame, area: Rect, app: &App, pane: Pane) {
    let outline = app.outline(pane);
    let focused = app.focus == pane;

    let items: Vec<ListItem> = outline
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| ListItem::new(row(entry, focused && i == outline.selected_index())))
        .collect();

    let title = if outline.loading {
        format!(" {} (loading...) ", pane.title())
    } else {
        format!(" {} ", pane.title())
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(title),
    );

    let mut state = ListState::default();
    if focused {
        state.select(Some(outline.selected_index()));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn row(entry: &OutlineEntry, selected: bool) -> Line<'static> {
    let node = &entry.node;
    let marker = match (node.is_expandable(), entry.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        _ => "  ",
    };

    let icon = node.icon();
    let label_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if node.is_error() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw("  ".repeat(entry.depth)),
        Span::raw(marker),
        Span::styled(
            format!("{} ", icon_glyph(icon)),
            Style::default().fg(icon_color(icon)),
        ),
        Span::styled(node.label(), label_style),
    ];
    if let Some(detail) = node.detail() {
        spans.push(Span::styled(
            format!(" {detail}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}
