use serde::{Deserialize, Serialize};
use std::fmt;

/// Dimension used to group issues under a sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupBy {
    #[default]
    None,
    State,
    Priority,
    Type,
}

impl GroupBy {
    pub const ALL: [GroupBy; 4] = [GroupBy::None, GroupBy::State, GroupBy::Priority, GroupBy::Type];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::None => "None",
            GroupBy::State => "State",
            GroupBy::Priority => "Priority",
            GroupBy::Type => "Type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    Default,
    Priority,
    State,
    Type,
    Votes,
    Created,
    Updated,
    #[serde(rename = "Resolved Date")]
    ResolvedDate,
}

impl SortBy {
    pub const ALL: [SortBy; 8] = [
        SortBy::Default,
        SortBy::Priority,
        SortBy::State,
        SortBy::Type,
        SortBy::Votes,
        SortBy::Created,
        SortBy::Updated,
        SortBy::ResolvedDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Default => "Default",
            SortBy::Priority => "Priority",
            SortBy::State => "State",
            SortBy::Type => "Type",
            SortBy::Votes => "Votes",
            SortBy::Created => "Created",
            SortBy::Updated => "Updated",
            SortBy::ResolvedDate => "Resolved Date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssigneeFilter {
    #[default]
    Anyone,
    Me,
    Unassigned,
}

impl AssigneeFilter {
    pub const ALL: [AssigneeFilter; 3] =
        [AssigneeFilter::Anyone, AssigneeFilter::Me, AssigneeFilter::Unassigned];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssigneeFilter::Anyone => "Anyone",
            AssigneeFilter::Me => "Me",
            AssigneeFilter::Unassigned => "Unassigned",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(GroupBy, SortBy, SortOrder, AssigneeFilter);

/// Process-wide view settings shared by the sprint and recent issue trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub group_issues_by: GroupBy,
    pub sort_issues_by: SortBy,
    pub sort_order: SortOrder,
    pub show_issues_assigned_to: AssigneeFilter,
    /// Only read when a new connection is made.
    pub validate_certificate: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            group_issues_by: GroupBy::None,
            sort_issues_by: SortBy::Default,
            sort_order: SortOrder::Desc,
            show_issues_assigned_to: AssigneeFilter::Anyone,
            validate_certificate: true,
        }
    }
}
