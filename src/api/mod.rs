pub mod client;
pub mod payload;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::model::server::ServerInfo;
use crate::model::youtrack::{Agile, EnumBundle, Issue, Project, StateBundle, User};
use payload::{IssueUpdate, NewIssue};

pub use client::{ConnectOptions, YouTrackClient};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// The YouTrack REST surface the trees and commands depend on.
///
/// Every method is one round trip; nothing is cached or retried.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Server URL without a trailing slash.
    fn base_url(&self) -> &str;
    /// The authenticated user, when the connect-time lookup succeeded.
    fn self_user(&self) -> Option<&User>;
    /// Enum bundles fetched at connect time; empty when that lookup failed.
    fn enum_bundles(&self) -> &[EnumBundle];

    async fn get_agiles(&self) -> Result<Vec<Agile>, ApiError>;
    async fn get_projects(&self) -> Result<Vec<Project>, ApiError>;
    async fn get_issues(&self, query: &str) -> Result<Vec<Issue>, ApiError>;
    async fn get_states(&self) -> Result<Vec<StateBundle>, ApiError>;
    async fn get_users(&self) -> Result<Vec<User>, ApiError>;

    async fn update_issue_summary(&self, issue_id: &str, summary: &str) -> Result<(), ApiError>;
    async fn update_issue_state(&self, issue_id: &str, state: &str) -> Result<(), ApiError>;
    async fn update_issue_single_enum(
        &self,
        issue_id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), ApiError>;
    async fn update_issue_assignee(&self, issue_id: &str, login: &str) -> Result<(), ApiError>;
    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> Result<(), ApiError>;
    async fn delete_issue(&self, issue_id: &str) -> Result<(), ApiError>;
    async fn add_issue(&self, issue: &NewIssue) -> Result<Issue, ApiError>;
    async fn add_issue_to_sprint(
        &self,
        agile_id: &str,
        sprint_id: &str,
        issue_id: &str,
    ) -> Result<(), ApiError>;
}

/// Opens a client for a registered server.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        server: &ServerInfo,
        options: ConnectOptions,
    ) -> Result<Arc<dyn TrackerApi>, ApiError>;
}

pub struct YouTrackConnector;

#[async_trait]
impl Connector for YouTrackConnector {
    async fn connect(
        &self,
        server: &ServerInfo,
        options: ConnectOptions,
    ) -> Result<Arc<dyn TrackerApi>, ApiError> {
        tracing::info!(url = %server.url, validate_certificate = options.validate_certificate, "connecting");
        let client = YouTrackClient::connect(&server.url, &server.token, options).await?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
pub mod mock;

#[cfg(test)]
mod tests;
