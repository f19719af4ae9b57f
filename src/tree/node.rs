use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::model::server::ServerInfo;
use crate::model::youtrack::{Agile, Issue, Project, Sprint, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Server,
    Board,
    Project,
    ArchivedProject,
    Sprint,
    Folder,
    Issue,
    ResolvedIssue,
    MyIssue,
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Nothing to show ("no data", "select ...").
    Empty,
    /// The listing failed.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueNode {
    pub issue: Issue,
    /// Assigned to the connected user.
    pub mine: bool,
}

impl IssueNode {
    pub fn new(issue: Issue, self_user: Option<&User>) -> Self {
        let mine = match (issue.assignee(), self_user) {
            (Some(assignee), Some(me)) => assignee.login == me.login,
            _ => false,
        };
        Self { issue, mine }
    }

    pub fn code(&self) -> String {
        self.issue.code()
    }

    pub fn label(&self) -> String {
        let summary = self
            .issue
            .summary
            .as_deref()
            .unwrap_or("No summary provided");
        format!("{}: {summary}", self.code())
    }

    pub fn icon(&self) -> Icon {
        if self.issue.resolved.is_some() {
            Icon::ResolvedIssue
        } else if self.mine {
            Icon::MyIssue
        } else {
            Icon::Issue
        }
    }

    pub fn tooltip(&self) -> Vec<String> {
        let issue = &self.issue;
        let mut lines = vec![self.label(), String::new()];
        if let Some(assignee) = issue.assignee() {
            lines.push(format!("Assigned to: {}", assignee.full_name));
        }
        if let Some(state) = issue.field_value_name("State") {
            lines.push(format!("State: {state}"));
        }
        if let Some(priority) = issue.field_value_name("Priority") {
            lines.push(format!("Priority: {priority}"));
        }
        if let Some(reporter) = &issue.reporter {
            lines.push(format!("Created by: {}", reporter.full_name));
        }
        if let Some(updater) = &issue.updater {
            lines.push(format!("Updated by: {}", updater.full_name));
        }
        if let Some(created) = issue.created.and_then(format_timestamp) {
            lines.push(format!("Created on: {created}"));
        }
        if let Some(updated) = issue.updated.and_then(format_timestamp) {
            lines.push(format!("Updated on: {updated}"));
        }
        lines
    }

    /// Plain-text issue description page.
    pub fn description_page(&self) -> Vec<String> {
        let issue = &self.issue;
        let mut lines = vec![self.label(), String::new()];

        let mut created = issue
            .reporter
            .as_ref()
            .map(|r| format!("Created by {}", r.full_name))
            .unwrap_or_default();
        if let Some(date) = issue.created.and_then(format_timestamp) {
            created.push_str(&format!(" on {date}"));
        }
        lines.push(created.trim().to_string());

        let mut updated = issue
            .updater
            .as_ref()
            .map(|u| format!("Updated by {}", u.full_name))
            .unwrap_or_default();
        if let Some(date) = issue.updated.and_then(format_timestamp) {
            updated.push_str(&format!(" on {date}"));
        }
        lines.push(updated.trim().to_string());

        lines.push(String::new());
        lines.push("Description".into());
        let body = issue
            .description
            .as_deref()
            .or(issue.wikified_description.as_deref())
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description available");
        lines.extend(body.lines().map(String::from));
        lines
    }
}

/// Epoch milliseconds rendered in local time, e.g. `14 Nov 2023, 22:13`.
pub fn format_timestamp(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|d| {
        d.with_timezone(&Local)
            .format("%d %b %Y, %H:%M")
            .to_string()
    })
}

/// Every kind of entry the panes show.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Server(ServerInfo),
    Agile(Arc<Agile>),
    Project {
        project: Project,
        agile: Arc<Agile>,
    },
    Sprint(Sprint),
    /// One value of the grouping vocabulary, scoped to a sprint when sprints are enabled.
    Group {
        value: String,
        sprint: Option<Sprint>,
    },
    Issue(IssueNode),
    Placeholder {
        label: String,
        kind: PlaceholderKind,
    },
}

impl Node {
    pub fn empty(label: impl Into<String>) -> Self {
        Node::Placeholder {
            label: label.into(),
            kind: PlaceholderKind::Empty,
        }
    }

    pub fn error(label: impl Into<String>) -> Self {
        Node::Placeholder {
            label: label.into(),
            kind: PlaceholderKind::Error,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Node::Server(server) => server.label.clone(),
            Node::Agile(agile) => agile.name.clone(),
            Node::Project { project, .. } => project
                .name
                .clone()
                .unwrap_or_else(|| "Unnamed Project".into()),
            Node::Sprint(sprint) => sprint
                .name
                .clone()
                .unwrap_or_else(|| "Unnamed Sprint".into()),
            Node::Group { value, .. } => value.clone(),
            Node::Issue(issue) => issue.label(),
            Node::Placeholder { label, .. } => label.clone(),
        }
    }

    /// Dimmed text rendered after the label.
    pub fn detail(&self) -> Option<String> {
        match self {
            Node::Server(server) => Some(server.url.clone()),
            Node::Project { project, .. } => project.short_name.as_ref().map(|s| format!("({s})")),
            Node::Sprint(sprint) if sprint.unresolved_issues_count > 0 => {
                Some(format!("{} open", sprint.unresolved_issues_count))
            }
            _ => None,
        }
    }

    pub fn icon(&self) -> Icon {
        match self {
            Node::Server(_) => Icon::Server,
            Node::Agile(_) => Icon::Board,
            Node::Project { project, .. } if project.archived => Icon::ArchivedProject,
            Node::Project { .. } => Icon::Project,
            Node::Sprint(_) => Icon::Sprint,
            Node::Group { .. } => Icon::Folder,
            Node::Issue(issue) => issue.icon(),
            Node::Placeholder {
                kind: PlaceholderKind::Error,
                ..
            } => Icon::Warning,
            Node::Placeholder { .. } => Icon::Info,
        }
    }

    pub fn is_expandable(&self) -> bool {
        match self {
            Node::Agile(agile) => !agile.projects.is_empty(),
            Node::Sprint(_) | Node::Group { .. } => true,
            Node::Server(_) | Node::Project { .. } | Node::Issue(_) | Node::Placeholder { .. } => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Node::Placeholder {
                kind: PlaceholderKind::Error,
                ..
            }
        )
    }

    pub fn as_issue(&self) -> Option<&IssueNode> {
        match self {
            Node::Issue(issue) => Some(issue),
            _ => None,
        }
    }
}
