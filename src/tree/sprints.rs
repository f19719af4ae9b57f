use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::watch;

use crate::api::TrackerApi;
use crate::host::Notifier;
use crate::model::settings::{GroupBy, ViewSettings};
use crate::model::youtrack::{bundle_values, Sprint};

use super::editor::IssueEditor;
use super::query::IssueQuery;
use super::{BoardContext, IssueNode, Node};

pub const NO_SERVER: &str = "Select a server to view sprints and issues";
pub const NO_BOARD: &str = "Select an agile board or project";
pub const NO_SPRINTS: &str = "No sprints found";
pub const NO_STATES: &str = "No states found";
pub const NO_PRIORITIES: &str = "No priorities found";
pub const NO_TYPES: &str = "No types found";
pub const ISSUES_FAILED: &str = "Error occurred while retrieving issues";
pub const NO_ISSUES: &str = "No issues found";

/// Sprints first, then grouping values, then issues.
pub struct SprintsView {
    client: Option<Arc<dyn TrackerApi>>,
    settings: watch::Receiver<ViewSettings>,
    notifier: Arc<dyn Notifier>,
    context: Option<BoardContext>,
    sprints: Vec<Sprint>,
}

impl SprintsView {
    pub fn new(settings: watch::Receiver<ViewSettings>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client: None,
            settings,
            notifier,
            context: None,
            sprints: Vec::new(),
        }
    }

    pub fn set_client(&mut self, client: Option<Arc<dyn TrackerApi>>) {
        self.client = client;
    }

    /// Seed from an agile or project selection.
    pub fn select(&mut self, context: BoardContext) {
        self.sprints = sort_sprints(context.sprints().to_vec());
        self.context = Some(context);
    }

    /// Back to the "select a server" state.
    pub fn reset(&mut self) {
        self.client = None;
        self.context = None;
        self.sprints.clear();
    }

    pub fn context(&self) -> Option<&BoardContext> {
        self.context.as_ref()
    }

    pub fn sprints(&self) -> &[Sprint] {
        &self.sprints
    }

    /// Mutation handle for the current selection; `None` until a server and
    /// a project are both known.
    pub fn editor(&self) -> Option<IssueEditor> {
        let client = self.client.clone()?;
        let context = self.context.clone()?;
        let project = context.project.clone()?;
        Some(IssueEditor::new(
            client,
            Arc::clone(&self.notifier),
            context,
            project,
            self.sprints.clone(),
        ))
    }

    pub async fn children(&self, parent: Option<&Node>) -> Vec<Node> {
        let Some(client) = &self.client else {
            return vec![Node::empty(NO_SERVER)];
        };
        let Some(context) = &self.context else {
            return vec![Node::empty(NO_BOARD)];
        };
        let client = client.as_ref();

        match parent {
            None if context.agile.sprints_disabled() => self.group_level(client, None).await,
            None if self.sprints.is_empty() => vec![Node::empty(NO_SPRINTS)],
            None => self.sprints.iter().cloned().map(Node::Sprint).collect(),
            Some(Node::Sprint(sprint)) => self.group_level(client, Some(sprint)).await,
            Some(Node::Group { value, sprint }) => {
                self.issues(client, Some(value), sprint.as_ref()).await
            }
            Some(_) => vec![Node::empty(NO_ISSUES)],
        }
    }

    async fn group_level(&self, client: &dyn TrackerApi, sprint: Option<&Sprint>) -> Vec<Node> {
        let group_by = self.settings.borrow().group_issues_by;
        let (values, missing) = match group_by {
            GroupBy::None => return self.issues(client, None, sprint).await,
            GroupBy::State => (
                self.context
                    .as_ref()
                    .and_then(|c| c.column_settings())
                    .map(|c| c.state_names()),
                NO_STATES,
            ),
            GroupBy::Priority => (bundle_values(client.enum_bundles(), "Priorities"), NO_PRIORITIES),
            GroupBy::Type => (bundle_values(client.enum_bundles(), "Types"), NO_TYPES),
        };

        match values {
            Some(values) if !values.is_empty() => values
                .into_iter()
                .map(|value| Node::Group {
                    value,
                    sprint: sprint.cloned(),
                })
                .collect(),
            _ => vec![Node::empty(missing)],
        }
    }

    async fn issues(
        &self,
        client: &dyn TrackerApi,
        group_value: Option<&str>,
        sprint: Option<&Sprint>,
    ) -> Vec<Node> {
        let Some(project) = self.context.as_ref().and_then(|c| c.project.as_ref()) else {
            return vec![Node::empty(NO_BOARD)];
        };
        let settings = *self.settings.borrow();
        let query = IssueQuery::new(project.query_name(), settings)
            .group_value(group_value)
            .sprint(sprint.and_then(|s| s.name.as_deref()))
            .build();
        fetch_issue_nodes(client, self.notifier.as_ref(), &query).await
    }
}

/// Run `query` and wrap the result; failures and empty results become a
/// single placeholder each.
pub(super) async fn fetch_issue_nodes(
    client: &dyn TrackerApi,
    notifier: &dyn Notifier,
    query: &str,
) -> Vec<Node> {
    tracing::debug!(query, "fetching issues");
    match client.get_issues(query).await {
        Ok(issues) if issues.is_empty() => vec![Node::empty(NO_ISSUES)],
        Ok(issues) => issues
            .into_iter()
            .map(|issue| Node::Issue(IssueNode::new(issue, client.self_user())))
            .collect(),
        Err(e) => {
            tracing::error!(error = %e, query, "failed to fetch issues");
            notifier.error(&format!("Failed to retrieve issues: {e}"));
            vec![Node::error(ISSUES_FAILED)]
        }
    }
}

/// Most recent start first.
///
/// Quirk kept for compatibility: a sprint without a start date sorts before
/// every dated sprint, so undated sprints read as "most recent". Undated
/// sprints keep their relative order.
pub fn sort_sprints(mut sprints: Vec<Sprint>) -> Vec<Sprint> {
    sprints.sort_by(|a, b| match (a.start, b.start) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    });
    sprints
}
