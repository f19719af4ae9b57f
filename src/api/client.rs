use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::payload::{CustomFieldValue, CustomFieldsUpdate, IssueRef, IssueUpdate, NewIssue, SummaryUpdate};
use super::{ApiError, TrackerApi};
use crate::model::server::normalize_url;
use crate::model::youtrack::{Agile, EnumBundle, Issue, Project, StateBundle, User};

const AGILE_FIELDS: &str = "id,name,owner(id,name,login,fullName),\
projects(id,name,shortName,archived),\
sprints(id,name,unresolvedIssuesCount,start,finish,archived,isDefault,goal),\
columnSettings(field(id,name),columns(presentation,isResolved,fieldValues(id,name))),\
sprintsSettings(disableSprints)";
const PROJECT_FIELDS: &str = "id,name,description,shortName,createdBy(name,login),archived";
const ENUM_BUNDLE_FIELDS: &str = "name,id,values(name,id,description,ordinal),isUpdateable";
const STATE_BUNDLE_FIELDS: &str = "name,id,values(name,id,ordinal,isResolved),isUpdateable";
const ISSUE_FIELDS: &str = "id,idReadable,numberInProject,summary,description,created,updated,\
resolved,wikifiedDescription,project(id,name,shortName),reporter(login,fullName),\
updater(login,fullName),customFields(name,value(id,name,fullName,login))";
const NEW_ISSUE_FIELDS: &str = "id,idReadable,numberInProject,summary,project(id,name,shortName)";
const USER_FIELDS: &str = "id,login,fullName,online";

#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions {
    /// When false, self-signed and otherwise invalid certificates are accepted.
    pub validate_certificate: bool,
    pub timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            validate_certificate: true,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct YouTrackClient {
    base_url: String,
    token: String,
    client: Client,
    self_user: Option<User>,
    enum_bundles: Vec<EnumBundle>,
}

impl YouTrackClient {
    /// Build a client without touching the network.
    pub fn new(url: &str, token: &str, options: ConnectOptions) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.validate_certificate)
            .build()?;
        Ok(Self {
            base_url: normalize_url(url),
            token: token.to_string(),
            client,
            self_user: None,
            enum_bundles: Vec::new(),
        })
    }

    /// Build a client and run the connect-time enrichment.
    pub async fn connect(url: &str, token: &str, options: ConnectOptions) -> Result<Self, ApiError> {
        let mut client = Self::new(url, token, options)?;
        client.enrich().await;
        Ok(client)
    }

    /// Fetch the current user and the enum bundles.
    ///
    /// These two reads are optional enrichment: a failure is logged and the
    /// dependent features degrade (no "assigned to me" highlight, no
    /// priority/type vocabularies). Every other call propagates its error.
    pub async fn enrich(&mut self) {
        match self.get_me().await {
            Ok(user) => self.self_user = Some(user),
            Err(e) => tracing::warn!(url = %self.base_url, error = %e, "failed to fetch current user"),
        }
        match self.get_enum_bundles().await {
            Ok(bundles) => self.enum_bundles = bundles,
            Err(e) => tracing::warn!(url = %self.base_url, error = %e, "failed to fetch enum bundles"),
        }
    }

    pub async fn get_me(&self) -> Result<User, ApiError> {
        self.get("/api/users/me", &[("fields", USER_FIELDS)]).await
    }

    pub async fn get_enum_bundles(&self) -> Result<Vec<EnumBundle>, ApiError> {
        self.get(
            "/api/admin/customFieldSettings/bundles/enum",
            &[("fields", ENUM_BUNDLE_FIELDS)],
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Http { status, body })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        tracing::debug!(path, "GET");
        let response = self.send(self.client.get(self.url(path)).query(query)).await?;
        Ok(response.json().await?)
    }

    async fn post<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        query: &[(&str, &str)],
    ) -> Result<Response, ApiError> {
        tracing::debug!(path, "POST");
        self.send(self.client.post(self.url(path)).query(query).json(body))
            .await
    }

    async fn update_custom_field(&self, issue_id: &str, field: CustomFieldValue) -> Result<(), ApiError> {
        let body = CustomFieldsUpdate::from(field);
        self.post(&format!("/api/issues/{issue_id}"), &body, &[]).await?;
        Ok(())
    }
}

#[async_trait]
impl TrackerApi for YouTrackClient {
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
        self.get("/api/agiles", &[("fields", AGILE_FIELDS)]).await
    }

    async fn get_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get("/api/admin/projects", &[("fields", PROJECT_FIELDS)])
            .await
    }

    async fn get_issues(&self, query: &str) -> Result<Vec<Issue>, ApiError> {
        self.get(
            "/api/issues",
            &[
                ("fields", ISSUE_FIELDS),
                ("customFields", "assignee"),
                ("customFields", "state"),
                ("query", query),
            ],
        )
        .await
    }

    async fn get_states(&self) -> Result<Vec<StateBundle>, ApiError> {
        self.get(
            "/api/admin/customFieldSettings/bundles/state",
            &[("fields", STATE_BUNDLE_FIELDS)],
        )
        .await
    }

    async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/api/users", &[("fields", USER_FIELDS)]).await
    }

    async fn update_issue_summary(&self, issue_id: &str, summary: &str) -> Result<(), ApiError> {
        self.post(&format!("/api/issues/{issue_id}"), &SummaryUpdate { summary }, &[])
            .await?;
        Ok(())
    }

    async fn update_issue_state(&self, issue_id: &str, state: &str) -> Result<(), ApiError> {
        self.update_custom_field(issue_id, CustomFieldValue::state(state))
            .await
    }

    async fn update_issue_single_enum(
        &self,
        issue_id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        self.update_custom_field(issue_id, CustomFieldValue::single_enum(field, value))
            .await
    }

    async fn update_issue_assignee(&self, issue_id: &str, login: &str) -> Result<(), ApiError> {
        self.update_custom_field(issue_id, CustomFieldValue::assignee(login))
            .await
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> Result<(), ApiError> {
        self.post(&format!("/api/issues/{issue_id}"), update, &[])
            .await?;
        Ok(())
    }

    async fn delete_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        tracing::debug!(issue_id, "DELETE");
        self.send(self.client.delete(self.url(&format!("/api/issues/{issue_id}"))))
            .await?;
        Ok(())
    }

    async fn add_issue(&self, issue: &NewIssue) -> Result<Issue, ApiError> {
        let response = self
            .post("/api/issues", issue, &[("fields", NEW_ISSUE_FIELDS)])
            .await?;
        Ok(response.json().await?)
    }

    async fn add_issue_to_sprint(
        &self,
        agile_id: &str,
        sprint_id: &str,
        issue_id: &str,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/agiles/{agile_id}/sprints/{sprint_id}/issues"),
            &IssueRef::new(issue_id),
            &[],
        )
        .await?;
        Ok(())
    }
}
