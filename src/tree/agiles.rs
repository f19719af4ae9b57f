use std::cmp::Ordering;
use std::sync::Arc;

use crate::api::TrackerApi;
use crate::host::Notifier;
use crate::model::youtrack::{Agile, Project};

use super::{BoardContext, Node};

pub const NO_SERVER: &str = "Select a server to view agiles and projects";
pub const AGILES_FAILED: &str = "Agiles retrieving failed";
pub const NO_AGILES: &str = "Agiles not found";
pub const NO_PROJECTS: &str = "No projects found";

/// Agile boards at the root, their projects one level down.
pub struct AgilesView {
    client: Option<Arc<dyn TrackerApi>>,
    notifier: Arc<dyn Notifier>,
}

impl AgilesView {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client: None,
            notifier,
        }
    }

    pub fn set_client(&mut self, client: Option<Arc<dyn TrackerApi>>) {
        self.client = client;
    }

    pub async fn children(&self, parent: Option<&Node>) -> Vec<Node> {
        let Some(client) = &self.client else {
            return vec![Node::empty(NO_SERVER)];
        };
        match parent {
            None => self.agiles(client.as_ref()).await,
            Some(Node::Agile(agile)) => self.projects(client.as_ref(), &agile.id).await,
            Some(_) => vec![Node::empty(NO_PROJECTS)],
        }
    }

    async fn fetch(&self, client: &dyn TrackerApi) -> Option<Vec<Agile>> {
        match client.get_agiles().await {
            Ok(agiles) => Some(agiles),
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch agiles");
                self.notifier.error(&format!("Failed to retrieve agiles: {e}"));
                None
            }
        }
    }

    async fn agiles(&self, client: &dyn TrackerApi) -> Vec<Node> {
        let Some(agiles) = self.fetch(client).await else {
            return vec![Node::error(AGILES_FAILED)];
        };
        let nodes: Vec<Node> = agiles
            .into_iter()
            .filter(|a| !a.projects.is_empty())
            .map(|a| Node::Agile(Arc::new(a)))
            .collect();
        if nodes.is_empty() {
            return vec![Node::empty(NO_AGILES)];
        }
        nodes
    }

    /// Re-queries the boards; nothing from the root listing is reused.
    async fn projects(&self, client: &dyn TrackerApi, agile_id: &str) -> Vec<Node> {
        let Some(agiles) = self.fetch(client).await else {
            return vec![Node::error(AGILES_FAILED)];
        };
        let Some(agile) = agiles.into_iter().find(|a| a.id == agile_id) else {
            return vec![Node::empty(NO_PROJECTS)];
        };
        if agile.projects.is_empty() {
            return vec![Node::empty(NO_PROJECTS)];
        }

        let agile = Arc::new(agile);
        let mut projects = agile.projects.clone();
        projects.sort_by(by_name);
        projects
            .into_iter()
            .map(|project| Node::Project {
                project,
                agile: Arc::clone(&agile),
            })
            .collect()
    }

    /// Board context for a selected node. Agiles default to their first project.
    pub fn context_for(node: &Node) -> Option<BoardContext> {
        match node {
            Node::Agile(agile) => Some(BoardContext {
                agile: Arc::clone(agile),
                project: agile.projects.first().cloned(),
            }),
            Node::Project { project, agile } => Some(BoardContext {
                agile: Arc::clone(agile),
                project: Some(project.clone()),
            }),
            _ => None,
        }
    }
}

/// Alphabetical; unnamed projects last.
fn by_name(a: &Project, b: &Project) -> Ordering {
    match (&a.name, &b.name) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
