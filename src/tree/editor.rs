use std::sync::Arc;

use crate::api::payload::NewIssue;
use crate::api::{ApiError, TrackerApi};
use crate::host::{InputRequest, Notifier, Prompter, UrlOpener};
use crate::model::youtrack::{bundle_values, Issue, Project, Sprint, User};
use crate::vcs::VersionControl;

use super::BoardContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The user backed out, or input was rejected before any request.
    Cancelled,
    /// The server rejected the write.
    Failed,
}

impl EditOutcome {
    pub fn applied(self) -> bool {
        self == EditOutcome::Applied
    }
}

/// Issue mutations for the current board selection.
///
/// A snapshot: cloning it is cheap and later selection changes don't affect
/// a command that is already running.
#[derive(Clone)]
pub struct IssueEditor {
    client: Arc<dyn TrackerApi>,
    notifier: Arc<dyn Notifier>,
    context: BoardContext,
    project: Project,
    sprints: Vec<Sprint>,
}

impl IssueEditor {
    pub fn new(
        client: Arc<dyn TrackerApi>,
        notifier: Arc<dyn Notifier>,
        context: BoardContext,
        project: Project,
        sprints: Vec<Sprint>,
    ) -> Self {
        Self {
            client,
            notifier,
            context,
            project,
            sprints,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    fn finish(&self, action: &str, result: Result<(), ApiError>) -> EditOutcome {
        match result {
            Ok(()) => EditOutcome::Applied,
            Err(e) => {
                tracing::warn!(error = %e, action, "issue update failed");
                self.notifier.warn(&format!("Failed to {action}: {e}"));
                EditOutcome::Failed
            }
        }
    }

    /// Board states, falling back to every state bundle on the server.
    async fn state_names(&self) -> Vec<String> {
        let from_board = self
            .context
            .column_settings()
            .map(|c| c.state_names())
            .unwrap_or_default();
        if !from_board.is_empty() {
            return from_board;
        }

        match self.client.get_states().await {
            Ok(bundles) => {
                let mut names: Vec<String> = Vec::new();
                for value in bundles.iter().flat_map(|b| b.values.iter()) {
                    let name = value.name.clone().unwrap_or_else(|| value.id.clone());
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                names
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch state bundles");
                Vec::new()
            }
        }
    }

    pub async fn update_issue_state(&self, issue: &Issue, prompter: &dyn Prompter) -> EditOutcome {
        let states = self.state_names().await;
        if states.is_empty() {
            self.notifier.warn("No states found");
            return EditOutcome::Cancelled;
        }
        let Some(state) = prompter.pick("Select issue state", states).await else {
            return EditOutcome::Cancelled;
        };
        let result = self.client.update_issue_state(&issue.id, &state).await;
        self.finish("update issue state", result)
    }

    /// Pick a value from `bundle_name` and store it in the `field` custom field.
    pub async fn update_issue_enum_bundle(
        &self,
        issue: &Issue,
        field: &str,
        bundle_name: &str,
        prompter: &dyn Prompter,
    ) -> EditOutcome {
        let values = bundle_values(self.client.enum_bundles(), bundle_name).unwrap_or_default();
        if values.is_empty() {
            self.notifier.warn(&format!("No values found in {bundle_name}"));
            return EditOutcome::Cancelled;
        }
        let Some(value) = prompter
            .pick(&format!("Select issue {}", field.to_lowercase()), values)
            .await
        else {
            return EditOutcome::Cancelled;
        };
        let result = self
            .client
            .update_issue_single_enum(&issue.id, field, &value)
            .await;
        self.finish(&format!("update issue {}", field.to_lowercase()), result)
    }

    pub async fn update_issue_assignee(&self, issue: &Issue, prompter: &dyn Prompter) -> EditOutcome {
        let users = match self.client.get_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch users");
                self.notifier.warn(&format!("Failed to retrieve users: {e}"));
                return EditOutcome::Failed;
            }
        };
        if users.is_empty() {
            self.notifier.warn("No users found");
            return EditOutcome::Cancelled;
        }

        let items: Vec<String> = users.iter().map(user_choice).collect();
        let Some(choice) = prompter.pick("Select assignee", items).await else {
            return EditOutcome::Cancelled;
        };
        let Some(user) = users.iter().find(|u| user_choice(u) == choice) else {
            return EditOutcome::Cancelled;
        };
        let result = self.client.update_issue_assignee(&issue.id, &user.login).await;
        self.finish("update issue assignee", result)
    }

    pub async fn update_issue_summary(&self, issue: &Issue, prompter: &dyn Prompter) -> EditOutcome {
        let current = issue.summary.clone().unwrap_or_default();
        let request = InputRequest::new("Issue summary")
            .placeholder("Enter new issue summary")
            .value(current.clone());
        let summary = match prompter.input(request).await {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return EditOutcome::Cancelled,
        };
        if summary == current {
            return EditOutcome::Cancelled;
        }
        let result = self.client.update_issue_summary(&issue.id, &summary).await;
        self.finish("update issue summary", result)
    }

    pub async fn delete_issue(&self, issue: &Issue, prompter: &dyn Prompter) -> EditOutcome {
        let message = format!("Do you want to delete {}?", issue.code());
        if !prompter.confirm(&message).await {
            return EditOutcome::Cancelled;
        }
        let result = self.client.delete_issue(&issue.id).await;
        let outcome = self.finish("delete issue", result);
        if outcome.applied() {
            tracing::info!(issue = %issue.code(), "issue deleted");
        }
        outcome
    }

    /// Summary is required; description, state and sprint are optional.
    pub async fn add_issue(&self, prompter: &dyn Prompter) -> EditOutcome {
        let summary = prompter
            .input(InputRequest::new("Issue summary").placeholder("Enter issue summary"))
            .await
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let Some(summary) = summary else {
            self.notifier.warn("Issue summary is required");
            return EditOutcome::Cancelled;
        };

        let description = prompter
            .input(InputRequest::new("Issue description").placeholder("Enter issue description (optional)"))
            .await;

        let states = self.state_names().await;
        let state = if states.is_empty() {
            None
        } else {
            prompter.pick("Select issue state (optional)", states).await
        };

        let new_issue = NewIssue::new(&self.project.id, &summary)
            .with_description(description)
            .with_state(state);
        let created = match self.client.add_issue(&new_issue).await {
            Ok(issue) => issue,
            Err(e) => {
                tracing::warn!(error = %e, "failed to create issue");
                self.notifier.warn(&format!("Failed to create issue: {e}"));
                return EditOutcome::Failed;
            }
        };
        tracing::info!(issue = %created.id, project = %self.project.id, "issue created");

        if let Some(sprint) = self.pick_sprint(prompter).await {
            let result = self
                .client
                .add_issue_to_sprint(&self.context.agile.id, &sprint.id, &created.id)
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, sprint = %sprint.id, "failed to add issue to sprint");
                self.notifier
                    .warn(&format!("Issue created but not added to sprint: {e}"));
            }
        }

        self.notifier.info(&format!("Issue {} created", created.code()));
        EditOutcome::Applied
    }

    async fn pick_sprint(&self, prompter: &dyn Prompter) -> Option<Sprint> {
        if self.context.agile.sprints_disabled() || self.sprints.is_empty() {
            return None;
        }
        let names: Vec<String> = self.sprints.iter().map(sprint_choice).collect();
        let choice = prompter.pick("Add to sprint (optional)", names).await?;
        self.sprints.iter().find(|s| sprint_choice(s) == choice).cloned()
    }

    pub fn issue_page_url(&self, issue: &Issue) -> String {
        format!(
            "{}/agiles/{}/current?issue={}",
            self.client.base_url(),
            self.context.agile.id,
            issue.id
        )
    }

    pub fn goto_issue_page(&self, issue: &Issue, opener: &dyn UrlOpener) {
        let url = self.issue_page_url(issue);
        if let Err(e) = opener.open(&url) {
            tracing::warn!(error = %e, url, "failed to open issue page");
            self.notifier.warn(&format!("Failed to open {url}: {e}"));
        }
    }
}

fn user_choice(user: &User) -> String {
    if user.full_name.is_empty() {
        user.login.clone()
    } else {
        format!("{} ({})", user.full_name, user.login)
    }
}

fn sprint_choice(sprint: &Sprint) -> String {
    sprint.name.clone().unwrap_or_else(|| sprint.id.clone())
}

/// Check out the branch named after the issue, or offer to create one.
/// Every failure here is informational only.
pub async fn create_branch(
    issue: &Issue,
    vcs: Option<&dyn VersionControl>,
    prompter: &dyn Prompter,
    notifier: &dyn Notifier,
) -> EditOutcome {
    let Some(vcs) = vcs else {
        notifier.info("No git repository found");
        return EditOutcome::Cancelled;
    };

    let branch = issue.code().to_lowercase();
    if vcs.checkout(&branch).await.is_ok() {
        notifier.info(&format!("Switched to branch {branch}"));
        return EditOutcome::Applied;
    }

    let request = InputRequest::new("Specify a branch name to create for this issue").value(branch);
    let Some(name) = prompter.input(request).await.filter(|n| !n.trim().is_empty()) else {
        return EditOutcome::Cancelled;
    };
    let name = name.trim();
    match vcs.create_branch(name, true).await {
        Ok(()) => {
            notifier.info(&format!("Created branch {name}"));
            EditOutcome::Applied
        }
        Err(e) => {
            tracing::info!(error = %e, branch = name, "branch not created");
            notifier.info(&format!("Branch was not created: {e}"));
            EditOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTracker;
    use crate::host::testing::{Answer, RecordingNotifier, RecordingOpener, ScriptedPrompter};
    use crate::host::NoticeLevel;
    use crate::model::youtrack::{
        Agile, AgileColumn, ColumnSettings, EnumBundle, EnumBundleElement, FieldValue,
        StateBundle, StateBundleElement,
    };
    use crate::vcs::testing::FakeRepo;

    fn project() -> Project {
        Project {
            id: "0-1".into(),
            short_name: Some("DEMO".into()),
            ..Default::default()
        }
    }

    fn issue() -> Issue {
        Issue {
            id: "2-7".into(),
            number_in_project: 7,
            summary: Some("Old".into()),
            project: Some(project()),
            ..Default::default()
        }
    }

    fn sprints() -> Vec<Sprint> {
        vec![
            Sprint { id: "s1".into(), name: Some("Sprint 1".into()), ..Default::default() },
            Sprint { id: "s2".into(), name: Some("Sprint 2".into()), ..Default::default() },
        ]
    }

    fn context(with_columns: bool) -> BoardContext {
        let column_settings = with_columns.then(|| ColumnSettings {
            field: None,
            columns: vec![AgileColumn {
                is_resolved: false,
                presentation: None,
                field_values: vec![
                    FieldValue { id: "1".into(), name: Some("Open".into()) },
                    FieldValue { id: "2".into(), name: Some("Done".into()) },
                ],
            }],
        });
        BoardContext {
            agile: Arc::new(Agile {
                id: "108-1".into(),
                name: "Board".into(),
                projects: vec![project()],
                sprints: sprints(),
                column_settings,
                ..Default::default()
            }),
            project: Some(project()),
        }
    }

    struct Fixture {
        editor: IssueEditor,
        notifier: Arc<RecordingNotifier>,
        calls: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl Fixture {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn fixture(tracker: MockTracker, with_columns: bool) -> Fixture {
        let notifier = Arc::new(RecordingNotifier::default());
        let calls = tracker.calls.clone();
        let editor = IssueEditor::new(
            Arc::new(tracker),
            notifier.clone(),
            context(with_columns),
            project(),
            sprints(),
        );
        Fixture { editor, notifier, calls }
    }

    fn priorities() -> EnumBundle {
        EnumBundle {
            id: "b".into(),
            name: "Priorities".into(),
            values: vec![
                EnumBundleElement { id: "1".into(), name: Some("Critical".into()), ..Default::default() },
                EnumBundleElement { id: "2".into(), name: Some("Normal".into()), ..Default::default() },
            ],
            is_updateable: true,
        }
    }

    #[tokio::test]
    async fn state_update_picks_from_board_columns() {
        let f = fixture(MockTracker::new(), true);
        let prompter = ScriptedPrompter::new(vec![Answer::Pick(Some("Done".into()))]);

        let outcome = f.editor.update_issue_state(&issue(), &prompter).await;

        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(prompter.offered.lock().unwrap()[0], vec!["Open", "Done"]);
        assert_eq!(f.calls(), vec!["update_issue_state 2-7 Done"]);
    }

    #[tokio::test]
    async fn state_update_falls_back_to_state_bundles() {
        let mut tracker = MockTracker::new();
        let value = |name: &str| StateBundleElement {
            id: name.into(),
            name: Some(name.into()),
            ..Default::default()
        };
        tracker.states = vec![
            StateBundle { id: "a".into(), values: vec![value("Open"), value("Fixed")], ..Default::default() },
            StateBundle { id: "b".into(), values: vec![value("Open")], ..Default::default() },
        ];
        let f = fixture(tracker, false);
        let prompter = ScriptedPrompter::new(vec![Answer::Pick(None)]);

        let outcome = f.editor.update_issue_state(&issue(), &prompter).await;

        assert_eq!(outcome, EditOutcome::Cancelled);
        assert_eq!(prompter.offered.lock().unwrap()[0], vec!["Open", "Fixed"]);
        assert_eq!(f.calls(), vec!["get_states"]);
    }

    #[tokio::test]
    async fn enum_update_sends_single_enum_write() {
        let mut tracker = MockTracker::new();
        tracker.enum_bundles = vec![priorities()];
        let f = fixture(tracker, true);
        let prompter = ScriptedPrompter::new(vec![Answer::Pick(Some("Critical".into()))]);

        let outcome = f
            .editor
            .update_issue_enum_bundle(&issue(), "Priority", "Priorities", &prompter)
            .await;

        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(f.calls(), vec!["update_issue_single_enum 2-7 Priority Critical"]);
    }

    #[tokio::test]
    async fn enum_update_without_bundle_warns() {
        let f = fixture(MockTracker::new(), true);
        let prompter = ScriptedPrompter::new(vec![]);

        let outcome = f
            .editor
            .update_issue_enum_bundle(&issue(), "Type", "Types", &prompter)
            .await;

        assert_eq!(outcome, EditOutcome::Cancelled);
        assert_eq!(
            f.notifier.messages(),
            vec![(NoticeLevel::Warning, "No values found in Types".to_string())]
        );
        assert!(f.calls().is_empty());
    }

    #[tokio::test]
    async fn assignee_is_matched_by_login() {
        let mut tracker = MockTracker::new();
        tracker.users = vec![
            User { login: "jane".into(), full_name: "Jane Roe".into(), ..Default::default() },
            User { login: "bot".into(), ..Default::default() },
        ];
        let f = fixture(tracker, true);
        let prompter = ScriptedPrompter::new(vec![Answer::Pick(Some("Jane Roe (jane)".into()))]);

        let outcome = f.editor.update_issue_assignee(&issue(), &prompter).await;

        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(prompter.offered.lock().unwrap()[0], vec!["Jane Roe (jane)", "bot"]);
        assert_eq!(f.calls(), vec!["get_users", "update_issue_assignee 2-7 jane"]);
    }

    #[tokio::test]
    async fn summary_update_skips_unchanged_text() {
        let f = fixture(MockTracker::new(), true);
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(Some("Old".into())),
            Answer::Input(Some("  New title ".into())),
        ]);

        assert_eq!(f.editor.update_issue_summary(&issue(), &prompter).await, EditOutcome::Cancelled);
        assert_eq!(f.editor.update_issue_summary(&issue(), &prompter).await, EditOutcome::Applied);

        assert_eq!(prompter.inputs.lock().unwrap()[0].value, "Old");
        assert_eq!(f.calls(), vec!["update_issue_summary 2-7 New title"]);
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let f = fixture(MockTracker::new(), true);
        let prompter = ScriptedPrompter::new(vec![Answer::Confirm(false), Answer::Confirm(true)]);

        assert_eq!(f.editor.delete_issue(&issue(), &prompter).await, EditOutcome::Cancelled);
        assert!(f.calls().is_empty());

        assert_eq!(f.editor.delete_issue(&issue(), &prompter).await, EditOutcome::Applied);
        assert_eq!(f.calls(), vec!["delete_issue 2-7"]);
    }

    #[tokio::test]
    async fn write_failure_is_a_warning_not_an_error() {
        let f = fixture(MockTracker::new().with_write_failure(), true);
        let prompter = ScriptedPrompter::new(vec![Answer::Confirm(true)]);

        let outcome = f.editor.delete_issue(&issue(), &prompter).await;

        assert_eq!(outcome, EditOutcome::Failed);
        let messages = f.notifier.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, NoticeLevel::Warning);
        assert!(messages[0].1.starts_with("Failed to delete issue"));
    }

    #[tokio::test]
    async fn add_issue_without_summary_aborts() {
        let f = fixture(MockTracker::new(), true);
        let prompter = ScriptedPrompter::new(vec![Answer::Input(Some("   ".into()))]);

        assert_eq!(f.editor.add_issue(&prompter).await, EditOutcome::Cancelled);
        assert_eq!(
            f.notifier.messages(),
            vec![(NoticeLevel::Warning, "Issue summary is required".to_string())]
        );
        assert!(f.calls().is_empty());
    }

    #[tokio::test]
    async fn add_issue_with_state_and_sprint() {
        let f = fixture(MockTracker::new(), true);
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(Some("Crash on save".into())),
            Answer::Input(Some("Steps".into())),
            Answer::Pick(Some("Open".into())),
            Answer::Pick(Some("Sprint 2".into())),
        ]);

        let outcome = f.editor.add_issue(&prompter).await;

        assert_eq!(outcome, EditOutcome::Applied);
        let calls = f.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("add_issue "));
        let payload: serde_json::Value =
            serde_json::from_str(calls[0].trim_start_matches("add_issue ")).unwrap();
        assert_eq!(payload["summary"], "Crash on save");
        assert_eq!(payload["description"], "Steps");
        assert_eq!(payload["project"]["id"], "0-1");
        assert_eq!(payload["customFields"][0]["value"]["name"], "Open");
        assert_eq!(calls[1], "add_issue_to_sprint 108-1 s2 2-99");
    }

    #[tokio::test]
    async fn add_issue_skipping_optional_steps() {
        let f = fixture(MockTracker::new(), true);
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(Some("Only summary".into())),
            Answer::Input(None),
            Answer::Pick(None),
            Answer::Pick(None),
        ]);

        assert_eq!(f.editor.add_issue(&prompter).await, EditOutcome::Applied);
        let calls = f.calls();
        assert_eq!(calls.len(), 1);
        let payload: serde_json::Value =
            serde_json::from_str(calls[0].trim_start_matches("add_issue ")).unwrap();
        assert!(payload.get("description").is_none());
    }

    #[tokio::test]
    async fn add_issue_failure_skips_sprint_assignment() {
        let f = fixture(MockTracker::new().with_write_failure(), true);
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(Some("Summary".into())),
            Answer::Input(None),
            Answer::Pick(None),
        ]);

        assert_eq!(f.editor.add_issue(&prompter).await, EditOutcome::Failed);
        assert_eq!(f.calls().len(), 1);
    }

    #[test]
    fn issue_page_url_joins_without_double_slash() {
        let f = fixture(MockTracker::new(), true);
        assert_eq!(
            f.editor.issue_page_url(&issue()),
            "https://yt.example.com/agiles/108-1/current?issue=2-7"
        );
        let opener = RecordingOpener::default();
        f.editor.goto_issue_page(&issue(), &opener);
        assert_eq!(opener.opened.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn branch_checkout_uses_lowercase_code() {
        let repo = FakeRepo::with_branches(&["demo-7"]);
        let notifier = RecordingNotifier::default();
        let prompter = ScriptedPrompter::new(vec![]);

        let outcome = create_branch(&issue(), Some(&repo), &prompter, &notifier).await;

        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(repo.calls.lock().unwrap().as_slice(), ["checkout demo-7"]);
    }

    #[tokio::test]
    async fn missing_branch_prompts_and_creates() {
        let repo = FakeRepo::default();
        let notifier = RecordingNotifier::default();
        let prompter = ScriptedPrompter::new(vec![Answer::Input(Some("demo-7-fix".into()))]);

        let outcome = create_branch(&issue(), Some(&repo), &prompter, &notifier).await;

        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(prompter.inputs.lock().unwrap()[0].value, "demo-7");
        assert_eq!(
            repo.calls.lock().unwrap().as_slice(),
            ["checkout demo-7", "create_branch demo-7-fix true"]
        );
    }

    #[tokio::test]
    async fn branch_failures_are_informational() {
        let repo = FakeRepo {
            fail_create: true,
            ..Default::default()
        };
        let notifier = RecordingNotifier::default();
        let prompter = ScriptedPrompter::new(vec![Answer::Input(Some("x".into()))]);

        let outcome = create_branch(&issue(), Some(&repo), &prompter, &notifier).await;

        assert_eq!(outcome, EditOutcome::Failed);
        assert!(notifier
            .messages()
            .iter()
            .all(|(level, _)| *level == NoticeLevel::Info));

        let outcome = create_branch(&issue(), None, &prompter, &notifier).await;
        assert_eq!(outcome, EditOutcome::Cancelled);
    }
}
