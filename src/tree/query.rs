use crate::model::settings::{AssigneeFilter, GroupBy, SortBy, ViewSettings};

/// YouTrack search query for one issue listing.
///
/// Clauses are emitted in a fixed order, each followed by a space, and
/// omitted entirely when the setting is at its no-op value:
/// `project:{P} State:{Open} sort by:{Priority} asc for:Me #{Sprint 1}`.
#[derive(Debug, Clone)]
pub struct IssueQuery<'a> {
    project: &'a str,
    settings: ViewSettings,
    group_value: Option<&'a str>,
    sprint: Option<&'a str>,
}

impl<'a> IssueQuery<'a> {
    pub fn new(project: &'a str, settings: ViewSettings) -> Self {
        Self {
            project,
            settings,
            group_value: None,
            sprint: None,
        }
    }

    /// Restrict to one value of the `group_issues_by` dimension.
    pub fn group_value(mut self, value: Option<&'a str>) -> Self {
        self.group_value = value;
        self
    }

    pub fn sprint(mut self, name: Option<&'a str>) -> Self {
        self.sprint = name;
        self
    }

    pub fn build(&self) -> String {
        let mut query = format!("project:{{{}}} ", self.project);

        if self.settings.group_issues_by != GroupBy::None {
            if let Some(value) = self.group_value {
                query.push_str(&format!("{}:{{{value}}} ", self.settings.group_issues_by));
            }
        }

        if self.settings.sort_issues_by != SortBy::Default {
            query.push_str(&format!(
                "sort by:{{{}}} {} ",
                self.settings.sort_issues_by, self.settings.sort_order
            ));
        }

        if self.settings.show_issues_assigned_to != AssigneeFilter::Anyone {
            query.push_str(&format!("for:{} ", self.settings.show_issues_assigned_to));
        }

        if let Some(sprint) = self.sprint {
            query.push_str(&format!("#{{{sprint}}}"));
        }

        query
    }
}
