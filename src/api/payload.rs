//! Request bodies for the YouTrack write endpoints.
//!
//! YouTrack dispatches on the `$type` discriminators, so the strings here must
//! match the server's entity names exactly.

use serde::Serialize;

pub const STATE_FIELD_TYPE: &str = "StateIssueCustomField";
pub const STATE_VALUE_TYPE: &str = "StateBundleElement";
pub const ENUM_FIELD_TYPE: &str = "SingleEnumIssueCustomField";
pub const ENUM_VALUE_TYPE: &str = "EnumBundleElement";
pub const USER_FIELD_TYPE: &str = "SingleUserIssueCustomField";
pub const USER_VALUE_TYPE: &str = "User";
pub const ISSUE_TYPE: &str = "Issue";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValueRef {
    Named {
        name: String,
        #[serde(rename = "$type")]
        kind: &'static str,
    },
    User {
        login: String,
        #[serde(rename = "$type")]
        kind: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomFieldValue {
    pub name: String,
    #[serde(rename = "$type")]
    pub kind: &'static str,
    pub value: FieldValueRef,
}

impl CustomFieldValue {
    pub fn state(value: &str) -> Self {
        Self {
            name: "State".into(),
            kind: STATE_FIELD_TYPE,
            value: FieldValueRef::Named {
                name: value.into(),
                kind: STATE_VALUE_TYPE,
            },
        }
    }

    pub fn single_enum(field: &str, value: &str) -> Self {
        Self {
            name: field.into(),
            kind: ENUM_FIELD_TYPE,
            value: FieldValueRef::Named {
                name: value.into(),
                kind: ENUM_VALUE_TYPE,
            },
        }
    }

    pub fn assignee(login: &str) -> Self {
        Self {
            name: "Assignee".into(),
            kind: USER_FIELD_TYPE,
            value: FieldValueRef::User {
                login: login.into(),
                kind: USER_VALUE_TYPE,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomFieldsUpdate {
    #[serde(rename = "customFields")]
    pub custom_fields: Vec<CustomFieldValue>,
}

impl From<CustomFieldValue> for CustomFieldsUpdate {
    fn from(field: CustomFieldValue) -> Self {
        Self {
            custom_fields: vec![field],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryUpdate<'a> {
    pub summary: &'a str,
}

/// Partial update of the plain issue fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project: ProjectRef,
    #[serde(rename = "customFields")]
    pub custom_fields: Vec<CustomFieldValue>,
}

impl NewIssue {
    pub fn new(project_id: &str, summary: &str) -> Self {
        Self {
            summary: summary.into(),
            description: None,
            project: ProjectRef {
                id: project_id.into(),
            },
            custom_fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_state(mut self, state: Option<String>) -> Self {
        if let Some(state) = state {
            self.custom_fields.push(CustomFieldValue::state(&state));
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRef<'a> {
    pub id: &'a str,
    #[serde(rename = "$type")]
    pub kind: &'static str,
}

impl<'a> IssueRef<'a> {
    pub fn new(id: &'a str) -> Self {
        Self {
            id,
            kind: ISSUE_TYPE,
        }
    }
}
