pub mod detail_panel;
pub mod footer;
pub mod prompt_modal;
pub mod theme;
pub mod tree_pane;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, Pane};

pub fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),    // panes
            Constraint::Length(1), // footer
        ])
        .split(size);

    // Servers + Agiles (30%) | Sprints + Recent (45%) | Detail (25%)
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(45),
            Constraint::Percentage(25),
        ])
        .split(vertical[0]);

    let servers_height = (app.servers.entries().len() as u16 + 2).clamp(3, 8);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(servers_height), Constraint::Min(3)])
        .split(columns[0]);

    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);

    tree_pane::render(f, left[0], app, Pane::Servers);
    tree_pane::render(f, left[1], app, Pane::Agiles);
    tree_pane::render(f, middle[0], app, Pane::Sprints);
    tree_pane::render(f, middle[1], app, Pane::Recent);
    detail_panel::render(f, columns[2], app);
    footer::render(f, vertical[1], app);

    if let Some(prompt) = &app.prompt {
        prompt_modal::render(f, size, prompt);
    }
}
