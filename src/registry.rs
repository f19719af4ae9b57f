use anyhow::{Context, Result};
use std::sync::Arc;

use crate::model::server::{default_label, normalize_url, ServerInfo};
use crate::secrets::SecretStore;

/// Secret record holding the JSON array of servers.
pub const SERVERS_KEY: &str = "servers";

pub const MISSING_URL: &str = "You have not entered YouTrack server address";
pub const MISSING_TOKEN: &str = "You have not entered YouTrack server token";
pub const DUPLICATE_URL: &str = "Server with this URL already exists";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Rejected input; nothing was stored.
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Prompt answers for a new or edited server. `None` or blank means the
/// prompt was cancelled or left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDraft {
    pub url: Option<String>,
    pub label: Option<String>,
    pub token: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Named YouTrack endpoints, stored as one blob in the secret store.
#[derive(Clone)]
pub struct ServerRegistry {
    store: Arc<dyn SecretStore>,
}

impl ServerRegistry {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<ServerInfo>> {
        let Some(raw) = self.store.get(SERVERS_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).context("Failed to parse stored servers")
    }

    pub fn first(&self) -> Result<Option<ServerInfo>> {
        Ok(self.list()?.into_iter().next())
    }

    fn save(&self, servers: &[ServerInfo]) -> Result<()> {
        let json = serde_json::to_string(servers)?;
        self.store.store(SERVERS_KEY, &json)
    }

    fn next_id(servers: &[ServerInfo]) -> u32 {
        servers.iter().map(|s| s.id + 1).max().unwrap_or(0)
    }

    /// Whether a server with this address, after normalization, is already saved.
    pub fn has_url(&self, url: &str) -> Result<bool> {
        let url = normalize_url(url);
        Ok(self.list()?.iter().any(|s| s.url == url))
    }

    pub fn add(&self, draft: ServerDraft) -> Result<ServerInfo, RegistryError> {
        let url = non_blank(draft.url)
            .map(|u| normalize_url(&u))
            .ok_or(RegistryError::Validation(MISSING_URL))?;

        let mut servers = self.list()?;
        if servers.iter().any(|s| s.url == url) {
            return Err(RegistryError::Validation(DUPLICATE_URL));
        }

        let token = non_blank(draft.token).ok_or(RegistryError::Validation(MISSING_TOKEN))?;
        let label = non_blank(draft.label).unwrap_or_else(|| default_label(&url));

        let server = ServerInfo {
            id: Self::next_id(&servers),
            url,
            token,
            label,
        };
        servers.push(server.clone());
        self.save(&servers)?;
        tracing::info!(url = %server.url, label = %server.label, "server added");
        Ok(server)
    }

    /// Replace `existing` with the edited record, appended at the end.
    /// A missing label or token keeps the current one.
    pub fn edit(&self, existing: &ServerInfo, draft: ServerDraft) -> Result<ServerInfo, RegistryError> {
        let url = non_blank(draft.url)
            .map(|u| normalize_url(&u))
            .ok_or(RegistryError::Validation(MISSING_URL))?;

        let mut servers: Vec<ServerInfo> = self
            .list()?
            .into_iter()
            .filter(|s| s.url != existing.url)
            .collect();
        if servers.iter().any(|s| s.url == url) {
            return Err(RegistryError::Validation(DUPLICATE_URL));
        }

        let server = ServerInfo {
            id: Self::next_id(&servers),
            url,
            token: non_blank(draft.token).unwrap_or_else(|| existing.token.clone()),
            label: non_blank(draft.label).unwrap_or_else(|| existing.label.clone()),
        };
        servers.push(server.clone());
        self.save(&servers)?;
        tracing::info!(url = %server.url, label = %server.label, "server updated");
        Ok(server)
    }

    /// Remove every server with the given label; returns the remaining list.
    pub fn delete(&self, label: &str) -> Result<Vec<ServerInfo>, RegistryError> {
        let servers: Vec<ServerInfo> = self
            .list()?
            .into_iter()
            .filter(|s| s.label != label)
            .collect();
        self.save(&servers)?;
        tracing::info!(label, remaining = servers.len(), "server deleted");
        Ok(servers)
    }
}
