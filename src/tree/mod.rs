//! The tree panes: agiles and projects, sprints and issues, recent issues.
//!
//! Every listing returns at least one node; absence of data or a failed
//! fetch is a single placeholder.

pub mod agiles;
pub mod editor;
pub mod node;
pub mod outline;
pub mod query;
pub mod recent;
pub mod sprints;

use std::sync::Arc;

use crate::model::youtrack::{Agile, ColumnSettings, Project, Sprint};

pub use node::{IssueNode, Node};

/// What an agile or project selection broadcasts to the issue views.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardContext {
    pub agile: Arc<Agile>,
    pub project: Option<Project>,
}

impl BoardContext {
    pub fn sprints(&self) -> &[Sprint] {
        &self.agile.sprints
    }

    pub fn column_settings(&self) -> Option<&ColumnSettings> {
        self.agile.column_settings.as_ref()
    }
}
