use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Pane};
use crate::tree::node::format_timestamp;
use crate::tree::Node;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let (title, lines) = match &app.description {
        Some(page) => (" Description ", page_lines(page)),
        None => (" Details ", detail_lines(app)),
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// First line is the heading.
fn page_lines(page: &[String]) -> Vec<Line<'static>> {
    page.iter()
        .enumerate()
        .map(|(i, text)| {
            if i == 0 {
                Line::styled(text.clone(), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Line::raw(text.clone())
            }
        })
        .collect()
}

fn field(name: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name}: "), Style::default().fg(Color::Gray)),
        Span::raw(value.into()),
    ])
}

fn detail_lines(app: &App) -> Vec<Line<'static>> {
    if let Some(issue) = app.selected_issue() {
        return page_lines(&issue.tooltip());
    }

    let mut lines = Vec::new();
    match app.outline(app.focus).selected_node() {
        Some(Node::Server(server)) => {
            lines.push(field("Label", server.label.clone()));
            lines.push(field("URL", server.url.clone()));
            let connected = app.connected.as_ref().is_some_and(|c| c.url == server.url);
            lines.push(field("Connected", if connected { "yes" } else { "no" }));
        }
        Some(Node::Project { project, .. }) => {
            lines.push(field("Project", project.name.clone().unwrap_or_default()));
            if let Some(leader) = &project.leader {
                lines.push(field("Leader", leader.full_name.clone()));
            }
            if let Some(description) = &project.description {
                lines.push(Line::raw(""));
                lines.push(Line::raw(description.clone()));
            }
        }
        Some(Node::Agile(agile)) => {
            lines.push(field("Board", agile.name.clone()));
            if let Some(owner) = &agile.owner {
                lines.push(field("Owner", owner.full_name.clone()));
            }
            lines.push(field("Projects", agile.projects.len().to_string()));
            lines.push(field("Sprints", agile.sprints.len().to_string()));
        }
        Some(Node::Sprint(sprint)) => {
            if let Some(goal) = &sprint.goal {
                lines.push(field("Goal", goal.clone()));
            }
            if let Some(start) = sprint.start.and_then(format_timestamp) {
                lines.push(field("Start", start));
            }
            if let Some(finish) = sprint.finish.and_then(format_timestamp) {
                lines.push(field("Finish", finish));
            }
            lines.push(field("Unresolved", sprint.unresolved_issues_count.to_string()));
        }
        _ => {}
    }

    if app.focus != Pane::Servers {
        if let Some(board) = app.board() {
            lines.push(Line::raw(""));
            let scope = match &board.project {
                Some(project) => format!("{} / {}", board.agile.name, project.query_name()),
                None => board.agile.name.clone(),
            };
            lines.push(field("Viewing", scope));
        }
    }

    let settings = app.settings();
    lines.push(Line::raw(""));
    lines.push(field("Group by", settings.group_issues_by.to_string()));
    lines.push(field(
        "Sort",
        format!("{} {}", settings.sort_issues_by, settings.sort_order),
    ));
    lines.push(field("Assigned to", settings.show_issues_assigned_to.to_string()));
    lines
}
