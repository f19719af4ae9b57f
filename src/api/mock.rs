//! In-memory `TrackerApi` used by the tree and command tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::payload::{IssueUpdate, NewIssue};
use super::{ApiError, ConnectOptions, Connector, TrackerApi};
use crate::model::server::ServerInfo;
use crate::model::youtrack::{Agile, EnumBundle, Issue, Project, StateBundle, User};

pub struct MockTracker {
    pub base_url: String,
    pub self_user: Option<User>,
    pub enum_bundles: Vec<EnumBundle>,
    pub agiles: Vec<Agile>,
    pub projects: Vec<Project>,
    pub issues: Vec<Issue>,
    pub users: Vec<User>,
    pub states: Vec<StateBundle>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self {
            base_url: "https://yt.example.com".into(),
            self_user: None,
            enum_bundles: Vec::new(),
            agiles: Vec::new(),
            projects: Vec::new(),
            issues: Vec::new(),
            users: Vec::new(),
            states: Vec::new(),
            fail_reads: false,
            fail_writes: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_read_failure(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn with_write_failure(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn read<T: Clone>(&self, call: String, value: &T) -> Result<T, ApiError> {
        self.record(call);
        if self.fail_reads {
            return Err(mock_error());
        }
        Ok(value.clone())
    }

    fn write(&self, call: String) -> Result<(), ApiError> {
        self.record(call);
        if self.fail_writes {
            return Err(mock_error());
        }
        Ok(())
    }
}

fn mock_error() -> ApiError {
    ApiError::Http {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "Mock failure".into(),
    }
}

#[async_trait]
impl TrackerApi for MockTracker {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn self_user(&self) -> Option<&User> {
        self.self_user.as_ref()
    }

    fn enum_bundles(&self) -> &[EnumBundle] {
        &self.enum_bundles
    }

    async fn get_agiles(&self) -> Result<Vec<Agile>, ApiError> {
        self.read("get_agiles".into(), &self.agiles)
    }

    async fn get_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.read("get_projects".into(), &self.projects)
    }

    async fn get_issues(&self, query: &str) -> Result<Vec<Issue>, ApiError> {
        self.read(format!("get_issues {query}"), &self.issues)
    }

    async fn get_states(&self) -> Result<Vec<StateBundle>, ApiError> {
        self.read("get_states".into(), &self.states)
    }

    async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        self.read("get_users".into(), &self.users)
    }

    async fn update_issue_summary(&self, issue_id: &str, summary: &str) -> Result<(), ApiError> {
        self.write(format!("update_issue_summary {issue_id} {summary}"))
    }

    async fn update_issue_state(&self, issue_id: &str, state: &str) -> Result<(), ApiError> {
        self.write(format!("update_issue_state {issue_id} {state}"))
    }

    async fn update_issue_single_enum(
        &self,
        issue_id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        self.write(format!("update_issue_single_enum {issue_id} {field} {value}"))
    }

    async fn update_issue_assignee(&self, issue_id: &str, login: &str) -> Result<(), ApiError> {
        self.write(format!("update_issue_assignee {issue_id} {login}"))
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> Result<(), ApiError> {
        self.write(format!(
            "update_issue {issue_id} {}",
            serde_json::to_string(update).unwrap_or_default()
        ))
    }

    async fn delete_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.write(format!("delete_issue {issue_id}"))
    }

    async fn add_issue(&self, issue: &NewIssue) -> Result<Issue, ApiError> {
        self.write(format!(
            "add_issue {}",
            serde_json::to_string(issue).unwrap_or_default()
        ))?;
        Ok(Issue {
            id: "2-99".into(),
            number_in_project: 99,
            summary: Some(issue.summary.clone()),
            ..Default::default()
        })
    }

    async fn add_issue_to_sprint(
        &self,
        agile_id: &str,
        sprint_id: &str,
        issue_id: &str,
    ) -> Result<(), ApiError> {
        self.write(format!("add_issue_to_sprint {agile_id} {sprint_id} {issue_id}"))
    }
}

type TrackerFactory = Box<dyn Fn(&ServerInfo) -> MockTracker + Send + Sync>;

/// Hands out a fresh `MockTracker` per connection and records `(url, validate_certificate)`.
pub struct MockConnector {
    make: TrackerFactory,
    pub fail: bool,
    pub connections: Mutex<Vec<(String, bool)>>,
}

impl MockConnector {
    pub fn new(make: impl Fn(&ServerInfo) -> MockTracker + Send + Sync + 'static) -> Self {
        Self {
            make: Box::new(make),
            fail: false,
            connections: Mutex::new(Vec::new()),
        }
    }

    pub fn connections(&self) -> Vec<(String, bool)> {
        self.connections.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        server: &ServerInfo,
        options: ConnectOptions,
    ) -> Result<Arc<dyn TrackerApi>, ApiError> {
        self.connections
            .lock()
            .unwrap()
            .push((server.url.clone(), options.validate_certificate));
        if self.fail {
            return Err(mock_error());
        }
        let mut tracker = (self.make)(server);
        tracker.base_url = server.url.clone();
        Ok(Arc::new(tracker))
    }
}
