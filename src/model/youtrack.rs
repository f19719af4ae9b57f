use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// YouTrack sends `null` for empty fields as often as it omits them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub login: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub online: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    pub description: Option<String>,
    pub leader: Option<User>,
    pub created_by: Option<User>,
}

impl Project {
    /// Name used to scope issue queries: short name, then name, then id.
    pub fn query_name(&self) -> &str {
        self.short_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub name: Option<String>,
    /// Epoch milliseconds.
    pub start: Option<i64>,
    pub finish: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    pub goal: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unresolved_issues_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub id: String,
    pub name: Option<String>,
}

impl FieldValue {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgileColumn {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_resolved: bool,
    pub presentation: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field_values: Vec<FieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSettings {
    pub field: Option<FieldValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<AgileColumn>,
}

impl ColumnSettings {
    /// The "group by State" vocabulary: every field value across all columns.
    pub fn state_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|col| col.field_values.iter())
            .map(|fv| fv.display_name().to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintsSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub disable_sprints: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agile {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub owner: Option<User>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sprints: Vec<Sprint>,
    pub column_settings: Option<ColumnSettings>,
    pub sprints_settings: Option<SprintsSettings>,
}

impl Agile {
    pub fn sprints_disabled(&self) -> bool {
        self.sprints_settings
            .as_ref()
            .is_some_and(|s| s.disable_sprints)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumBundleElement {
    pub id: String,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ordinal: i32,
    pub description: Option<String>,
}

impl EnumBundleElement {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumBundle {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<EnumBundleElement>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_updateable: bool,
}

/// Value names of the bundle called `bundle_name`, if such a bundle exists.
pub fn bundle_values(bundles: &[EnumBundle], bundle_name: &str) -> Option<Vec<String>> {
    bundles
        .iter()
        .find(|b| b.name == bundle_name)
        .map(|b| b.values.iter().map(|v| v.display_name().to_string()).collect())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBundleElement {
    pub id: String,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ordinal: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_resolved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBundle {
    pub id: String,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<StateBundleElement>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_updateable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCustomField {
    pub name: Option<String>,
    #[serde(rename = "$type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub id_readable: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_in_project: u64,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub wikified_description: Option<String>,
    pub created: Option<i64>,
    pub updated: Option<i64>,
    pub resolved: Option<i64>,
    pub project: Option<Project>,
    pub reporter: Option<User>,
    pub updater: Option<User>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_fields: Vec<IssueCustomField>,
}

impl Issue {
    /// First custom field with the given name; names are unique per issue.
    pub fn custom_field(&self, name: &str) -> Option<&IssueCustomField> {
        self.custom_fields
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
    }

    /// `name` of an enum/state custom field value.
    pub fn field_value_name(&self, name: &str) -> Option<&str> {
        self.custom_field(name)
            .and_then(|f| f.value.get("name"))
            .and_then(Value::as_str)
    }

    pub fn assignee(&self) -> Option<User> {
        self.custom_field("Assignee")
            .map(|f| &f.value)
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn short_name(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|p| p.short_name.as_deref())
            .unwrap_or("Issue")
    }

    /// Human readable code, e.g. `DEMO-42`.
    pub fn code(&self) -> String {
        format!("{}-{}", self.short_name(), self.number_in_project)
    }
}
