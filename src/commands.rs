//! Everything a user can trigger, from a key binding or the command palette.

use std::sync::Arc;

use crate::config::SettingsStore;
use crate::host::{InputRequest, Notifier, Prompter, UrlOpener};
use crate::model::server::ServerInfo;
use crate::model::settings::{AssigneeFilter, GroupBy, SortBy, SortOrder};
use crate::model::youtrack::Issue;
use crate::registry::{RegistryError, ServerDraft, ServerRegistry, DUPLICATE_URL, MISSING_URL};
use crate::tree::editor::{self, EditOutcome, IssueEditor};
use crate::vcs::VersionControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AddServer,
    EditServer,
    DeleteServer,
    RefreshServers,
    RefreshAgiles,
    RefreshSprints,
    RefreshRecent,
    GroupIssuesBy,
    SortIssuesBy,
    SortOrder,
    ShowIssuesAssignedTo,
    ToggleCertificateValidation,
    AddIssue,
    UpdateIssueSummary,
    UpdateIssueState,
    UpdateIssuePriority,
    UpdateIssueType,
    UpdateIssueAssignee,
    DeleteIssue,
    CreateBranch,
    GotoIssuePage,
    ShowIssueDescription,
}

impl Command {
    pub const ALL: [Command; 22] = [
        Command::AddServer,
        Command::EditServer,
        Command::DeleteServer,
        Command::RefreshServers,
        Command::RefreshAgiles,
        Command::RefreshSprints,
        Command::RefreshRecent,
        Command::GroupIssuesBy,
        Command::SortIssuesBy,
        Command::SortOrder,
        Command::ShowIssuesAssignedTo,
        Command::ToggleCertificateValidation,
        Command::AddIssue,
        Command::UpdateIssueSummary,
        Command::UpdateIssueState,
        Command::UpdateIssuePriority,
        Command::UpdateIssueType,
        Command::UpdateIssueAssignee,
        Command::DeleteIssue,
        Command::CreateBranch,
        Command::GotoIssuePage,
        Command::ShowIssueDescription,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Command::AddServer => "Add server",
            Command::EditServer => "Edit server",
            Command::DeleteServer => "Delete server",
            Command::RefreshServers => "Refresh servers",
            Command::RefreshAgiles => "Refresh agiles",
            Command::RefreshSprints => "Refresh sprints",
            Command::RefreshRecent => "Refresh recent issues",
            Command::GroupIssuesBy => "Group issues by",
            Command::SortIssuesBy => "Sort issues by",
            Command::SortOrder => "Sort order",
            Command::ShowIssuesAssignedTo => "Show issues assigned to",
            Command::ToggleCertificateValidation => "Toggle certificate validation",
            Command::AddIssue => "Add issue",
            Command::UpdateIssueSummary => "Update issue summary",
            Command::UpdateIssueState => "Update issue state",
            Command::UpdateIssuePriority => "Update issue priority",
            Command::UpdateIssueType => "Update issue type",
            Command::UpdateIssueAssignee => "Update issue assignee",
            Command::DeleteIssue => "Delete issue",
            Command::CreateBranch => "Create branch",
            Command::GotoIssuePage => "Open issue page",
            Command::ShowIssueDescription => "Show issue description",
        }
    }

    pub fn from_title(title: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|c| c.title() == title)
    }

    /// Commands that prompt or write, run off the UI loop.
    pub fn is_interactive(&self) -> bool {
        !matches!(
            self,
            Command::RefreshServers
                | Command::RefreshAgiles
                | Command::RefreshSprints
                | Command::RefreshRecent
                | Command::ShowIssueDescription
        )
    }
}

/// What the app has to do once a command finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEffect {
    None,
    ServerAdded(ServerInfo),
    ServerEdited {
        previous: ServerInfo,
        updated: ServerInfo,
    },
    ServerDeleted {
        deleted: ServerInfo,
        remaining: Vec<ServerInfo>,
    },
    IssuesChanged,
}

/// Services a running command may use.
#[derive(Clone)]
pub struct CommandContext {
    pub registry: ServerRegistry,
    pub settings: Arc<SettingsStore>,
    pub prompter: Arc<dyn Prompter>,
    pub notifier: Arc<dyn Notifier>,
    pub opener: Arc<dyn UrlOpener>,
    pub vcs: Option<Arc<dyn VersionControl>>,
}

/// The selection a command acts on.
#[derive(Clone, Default)]
pub struct Scope {
    /// Highlighted row of the servers pane.
    pub server: Option<ServerInfo>,
    pub editor: Option<IssueEditor>,
    pub issue: Option<Issue>,
}

pub async fn execute(command: Command, scope: Scope, ctx: &CommandContext) -> CommandEffect {
    tracing::debug!(command = command.title(), "running command");
    match command {
        Command::AddServer => add_server(ctx).await,
        Command::EditServer => match &scope.server {
            Some(server) => edit_server(ctx, server).await,
            None => warn(ctx, "Select a server first"),
        },
        Command::DeleteServer => match &scope.server {
            Some(server) => delete_server(ctx, server).await,
            None => warn(ctx, "Select a server first"),
        },
        Command::GroupIssuesBy => {
            pick_setting(ctx, "Group issues by", &GroupBy::ALL, |s, v| s.group_issues_by = v).await
        }
        Command::SortIssuesBy => {
            pick_setting(ctx, "Sort issues by", &SortBy::ALL, |s, v| s.sort_issues_by = v).await
        }
        Command::SortOrder => {
            pick_setting(
                ctx,
                "Sort order",
                &[SortOrder::Asc, SortOrder::Desc],
                |s, v| s.sort_order = v,
            )
            .await
        }
        Command::ShowIssuesAssignedTo => {
            pick_setting(ctx, "Show issues assigned to", &AssigneeFilter::ALL, |s, v| {
                s.show_issues_assigned_to = v
            })
            .await
        }
        Command::ToggleCertificateValidation => toggle_certificate_validation(ctx),
        Command::AddIssue => match &scope.editor {
            Some(editor) => issue_effect(editor.add_issue(ctx.prompter.as_ref()).await),
            None => warn(ctx, "Select an agile board or project first"),
        },
        Command::CreateBranch => match &scope.issue {
            Some(issue) => {
                editor::create_branch(
                    issue,
                    ctx.vcs.as_deref(),
                    ctx.prompter.as_ref(),
                    ctx.notifier.as_ref(),
                )
                .await;
                CommandEffect::None
            }
            None => warn(ctx, "Select an issue first"),
        },
        _ => match (&scope.editor, &scope.issue) {
            (Some(editor), Some(issue)) => issue_command(command, editor, issue, ctx).await,
            _ => warn(ctx, "Select an issue first"),
        },
    }
}

async fn issue_command(
    command: Command,
    editor: &IssueEditor,
    issue: &Issue,
    ctx: &CommandContext,
) -> CommandEffect {
    let prompter = ctx.prompter.as_ref();
    let outcome = match command {
        Command::UpdateIssueSummary => editor.update_issue_summary(issue, prompter).await,
        Command::UpdateIssueState => editor.update_issue_state(issue, prompter).await,
        Command::UpdateIssuePriority => {
            editor
                .update_issue_enum_bundle(issue, "Priority", "Priorities", prompter)
                .await
        }
        Command::UpdateIssueType => {
            editor
                .update_issue_enum_bundle(issue, "Type", "Types", prompter)
                .await
        }
        Command::UpdateIssueAssignee => editor.update_issue_assignee(issue, prompter).await,
        Command::DeleteIssue => editor.delete_issue(issue, prompter).await,
        Command::GotoIssuePage => {
            editor.goto_issue_page(issue, ctx.opener.as_ref());
            EditOutcome::Cancelled
        }
        other => {
            tracing::debug!(command = other.title(), "not an issue command");
            EditOutcome::Cancelled
        }
    };
    issue_effect(outcome)
}

fn issue_effect(outcome: EditOutcome) -> CommandEffect {
    if outcome.applied() {
        CommandEffect::IssuesChanged
    } else {
        CommandEffect::None
    }
}

fn warn(ctx: &CommandContext, message: &str) -> CommandEffect {
    ctx.notifier.warn(message);
    CommandEffect::None
}

fn registry_failure(ctx: &CommandContext, err: RegistryError) -> CommandEffect {
    match err {
        RegistryError::Validation(message) => warn(ctx, message),
        RegistryError::Storage(e) => {
            tracing::error!(error = %e, "server registry update failed");
            ctx.notifier.error(&format!("Failed to save servers: {e}"));
            CommandEffect::None
        }
    }
}

pub async fn add_server(ctx: &CommandContext) -> CommandEffect {
    let prompter = ctx.prompter.as_ref();
    let url = prompter
        .input(InputRequest::new("YouTrack server URL").placeholder("https://example.myjetbrains.com/youtrack"))
        .await;
    let Some(address) = url.as_deref().filter(|u| !u.trim().is_empty()) else {
        return warn(ctx, MISSING_URL);
    };
    match ctx.registry.has_url(address) {
        Ok(true) => return warn(ctx, DUPLICATE_URL),
        Ok(false) => {}
        Err(e) => return registry_failure(ctx, RegistryError::Storage(e)),
    }
    let label = prompter
        .input(InputRequest::new("Server label").placeholder("Leave empty to use the server address"))
        .await;
    let token = prompter
        .input(InputRequest::new("Permanent token").placeholder("perm:...").secret())
        .await;

    match ctx.registry.add(ServerDraft { url, label, token }) {
        Ok(server) => {
            ctx.notifier.info(&format!("Server {} added", server.label));
            CommandEffect::ServerAdded(server)
        }
        Err(e) => registry_failure(ctx, e),
    }
}

pub async fn edit_server(ctx: &CommandContext, server: &ServerInfo) -> CommandEffect {
    let prompter = ctx.prompter.as_ref();
    let url = prompter
        .input(InputRequest::new("YouTrack server URL").value(server.url.clone()))
        .await;
    if url.as_deref().map_or(true, |u| u.trim().is_empty()) {
        return warn(ctx, MISSING_URL);
    }
    let label = prompter
        .input(InputRequest::new("Server label").value(server.label.clone()))
        .await;
    let token = prompter
        .input(
            InputRequest::new("Permanent token")
                .placeholder("Leave empty to keep the current token")
                .secret(),
        )
        .await;

    match ctx.registry.edit(server, ServerDraft { url, label, token }) {
        Ok(updated) => CommandEffect::ServerEdited {
            previous: server.clone(),
            updated,
        },
        Err(e) => registry_failure(ctx, e),
    }
}

pub async fn delete_server(ctx: &CommandContext, server: &ServerInfo) -> CommandEffect {
    let message = format!("Delete server {}?", server.label);
    if !ctx.prompter.confirm(&message).await {
        return CommandEffect::None;
    }
    match ctx.registry.delete(&server.label) {
        Ok(remaining) => CommandEffect::ServerDeleted {
            deleted: server.clone(),
            remaining,
        },
        Err(e) => registry_failure(ctx, e),
    }
}

/// Offer `options` and store the chosen one; the settings channel tells the
/// views to refresh.
async fn pick_setting<T>(
    ctx: &CommandContext,
    title: &str,
    options: &[T],
    apply: impl FnOnce(&mut crate::model::settings::ViewSettings, T),
) -> CommandEffect
where
    T: Copy + std::fmt::Display,
{
    let items: Vec<String> = options.iter().map(|o| o.to_string()).collect();
    let Some(choice) = ctx.prompter.pick(title, items).await else {
        return CommandEffect::None;
    };
    let Some(value) = options.iter().copied().find(|o| o.to_string() == choice) else {
        return CommandEffect::None;
    };
    if let Err(e) = ctx.settings.update(|s| apply(s, value)) {
        tracing::error!(error = %e, "failed to save settings");
        ctx.notifier.error(&format!("Failed to save settings: {e}"));
    }
    CommandEffect::None
}

fn toggle_certificate_validation(ctx: &CommandContext) -> CommandEffect {
    let result = ctx
        .settings
        .update(|s| s.validate_certificate = !s.validate_certificate);
    match result {
        Ok(_) => {
            let state = if ctx.settings.current().validate_certificate {
                "on"
            } else {
                "off"
            };
            ctx.notifier.info(&format!("Certificate validation {state}"));
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to save settings");
            ctx.notifier.error(&format!("Failed to save settings: {e}"));
        }
    }
    CommandEffect::None
}
