use serde::{Deserialize, Serialize};

/// A registered YouTrack endpoint. Persisted as part of the `servers` secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: u32,
    pub url: String,
    pub token: String,
    pub label: String,
}

/// Strip trailing slashes so URLs compare as identity keys.
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Label used when the user leaves the label prompt empty.
pub fn default_label(url: &str) -> String {
    url.replacen("https://", "", 1)
}
