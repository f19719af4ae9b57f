use std::sync::Arc;

use tokio::sync::watch;

use crate::api::TrackerApi;
use crate::host::Notifier;
use crate::model::settings::ViewSettings;
use crate::model::youtrack::Project;

use super::query::IssueQuery;
use super::sprints::{fetch_issue_nodes, NO_BOARD};
use super::Node;

pub const NO_SERVER: &str = "Select a server to view recent issues";

/// Flat issue list for the active project: sorted and filtered, never grouped.
pub struct RecentView {
    client: Option<Arc<dyn TrackerApi>>,
    settings: watch::Receiver<ViewSettings>,
    notifier: Arc<dyn Notifier>,
    project: Option<Project>,
}

impl RecentView {
    pub fn new(settings: watch::Receiver<ViewSettings>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client: None,
            settings,
            notifier,
            project: None,
        }
    }

    pub fn set_client(&mut self, client: Option<Arc<dyn TrackerApi>>) {
        self.client = client;
    }

    pub fn set_project(&mut self, project: Option<Project>) {
        self.project = project;
    }

    pub fn reset(&mut self) {
        self.client = None;
        self.project = None;
    }

    pub async fn children(&self) -> Vec<Node> {
        let Some(client) = &self.client else {
            return vec![Node::empty(NO_SERVER)];
        };
        let Some(project) = &self.project else {
            return vec![Node::empty(NO_BOARD)];
        };
        let settings = *self.settings.borrow();
        let query = IssueQuery::new(project.query_name(), settings).build();
        fetch_issue_nodes(client.as_ref(), self.notifier.as_ref(), &query).await
    }
}
