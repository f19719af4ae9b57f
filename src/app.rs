use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::api::{ConnectOptions, Connector};
use crate::commands::{self, Command, CommandContext, CommandEffect, Scope};
use crate::config::SettingsStore;
use crate::event::KeyAction;
use crate::host::{NoticeLevel, Notifier, Prompter, UrlOpener};
use crate::model::server::ServerInfo;
use crate::model::settings::ViewSettings;
use crate::prompt::{ActivePrompt, ChannelNotifier, ChannelPrompter, PromptRequest};
use crate::registry::ServerRegistry;
use crate::tree::agiles::AgilesView;
use crate::tree::outline::Outline;
use crate::tree::recent::RecentView;
use crate::tree::sprints::SprintsView;
use crate::tree::{BoardContext, IssueNode, Node};
use crate::vcs::VersionControl;

pub const NO_SERVERS: &str = "No servers yet, press a to add one";
pub const SERVERS_FAILED: &str = "Servers retrieving failed";

const FLASH_SECS: u64 = 4;

#[derive(Debug)]
pub enum Action {
    Key(KeyAction),
    Tick,
    /// A running command needs an answer.
    Prompt(PromptRequest),
    Notice(NoticeLevel, String),
    SettingsChanged,
    Run(Command),
    /// Second half of a refresh, after a frame has shown the pane as loading.
    Fetch(Pane),
    CommandFinished(CommandEffect),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Servers,
    Agiles,
    Sprints,
    Recent,
}

impl Pane {
    pub const ALL: [Pane; 4] = [Pane::Servers, Pane::Agiles, Pane::Sprints, Pane::Recent];

    pub fn title(&self) -> &'static str {
        match self {
            Pane::Servers => "Servers",
            Pane::Agiles => "Agiles",
            Pane::Sprints => "Sprints",
            Pane::Recent => "Recent Issues",
        }
    }

    fn next(self) -> Pane {
        let i = Pane::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Pane::ALL[(i + 1) % Pane::ALL.len()]
    }

    fn previous(self) -> Pane {
        let i = Pane::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Pane::ALL[(i + Pane::ALL.len() - 1) % Pane::ALL.len()]
    }
}

/// Long-lived collaborators, built once in `main`.
pub struct Services {
    pub registry: ServerRegistry,
    pub settings: Arc<SettingsStore>,
    pub connector: Arc<dyn Connector>,
    pub opener: Arc<dyn UrlOpener>,
    pub vcs: Option<Arc<dyn VersionControl>>,
}

pub struct App {
    pub should_quit: bool,
    pub focus: Pane,
    pub servers: Outline,
    pub agiles: Outline,
    pub sprints: Outline,
    pub recent: Outline,
    /// Server the issue views are connected to.
    pub connected: Option<ServerInfo>,
    /// Full description page of an issue, replacing the detail panel.
    pub description: Option<Vec<String>>,
    pub prompt: Option<ActivePrompt>,
    pub flash_message: Option<(String, NoticeLevel, Instant)>,
    pub running: Option<Command>,
    queued_prompts: VecDeque<PromptRequest>,
    settings_seen: ViewSettings,
    services: Services,
    agiles_view: AgilesView,
    sprints_view: SprintsView,
    recent_view: RecentView,
    notifier: Arc<dyn Notifier>,
    prompter: Arc<dyn Prompter>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(services: Services, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        let notifier: Arc<dyn Notifier> = Arc::new(ChannelNotifier::new(action_tx.clone()));
        let prompter: Arc<dyn Prompter> = Arc::new(ChannelPrompter::new(action_tx.clone()));
        let settings_seen = services.settings.current();

        Self {
            should_quit: false,
            focus: Pane::Servers,
            servers: Outline::default(),
            agiles: Outline::default(),
            sprints: Outline::default(),
            recent: Outline::default(),
            connected: None,
            description: None,
            prompt: None,
            flash_message: None,
            running: None,
            queued_prompts: VecDeque::new(),
            settings_seen,
            agiles_view: AgilesView::new(Arc::clone(&notifier)),
            sprints_view: SprintsView::new(services.settings.subscribe(), Arc::clone(&notifier)),
            recent_view: RecentView::new(services.settings.subscribe(), Arc::clone(&notifier)),
            services,
            notifier,
            prompter,
            action_tx,
        }
    }

    /// Load the servers and connect to the first one.
    pub async fn start(&mut self) {
        self.refresh_servers().await;
        let first = match self.services.registry.first() {
            Ok(first) => first,
            Err(e) => {
                tracing::error!(error = %e, "failed to read servers");
                None
            }
        };
        self.connect(first).await;
    }

    pub fn settings(&self) -> ViewSettings {
        self.services.settings.current()
    }

    pub fn outline(&self, pane: Pane) -> &Outline {
        match pane {
            Pane::Servers => &self.servers,
            Pane::Agiles => &self.agiles,
            Pane::Sprints => &self.sprints,
            Pane::Recent => &self.recent,
        }
    }

    fn outline_mut(&mut self, pane: Pane) -> &mut Outline {
        match pane {
            Pane::Servers => &mut self.servers,
            Pane::Agiles => &mut self.agiles,
            Pane::Sprints => &mut self.sprints,
            Pane::Recent => &mut self.recent,
        }
    }

    pub fn board(&self) -> Option<&BoardContext> {
        self.sprints_view.context()
    }

    pub fn selected_issue(&self) -> Option<&IssueNode> {
        match self.focus {
            Pane::Sprints | Pane::Recent => self.outline(self.focus).selected_node(),
            _ => None,
        }
        .and_then(Node::as_issue)
    }

    pub async fn update(&mut self, action: Action) {
        match action {
            Action::Key(key) => self.handle_key(key).await,
            Action::Tick => self.expire_flash(),
            Action::Prompt(request) => self.open_prompt(request),
            Action::Notice(level, message) => self.flash(level, message),
            Action::SettingsChanged => self.settings_changed().await,
            Action::Run(command) => self.run(command).await,
            Action::Fetch(pane) => self.refresh(pane).await,
            Action::CommandFinished(effect) => {
                self.running = None;
                self.apply_effect(effect).await;
            }
            Action::Quit => {
                self.should_quit = true;
            }
        }
    }

    fn flash(&mut self, level: NoticeLevel, message: String) {
        self.flash_message = Some((message, level, Instant::now()));
    }

    fn expire_flash(&mut self) {
        if let Some((_, _, t)) = &self.flash_message {
            if t.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    fn open_prompt(&mut self, request: PromptRequest) {
        if self.prompt.is_some() {
            self.queued_prompts.push_back(request);
        } else {
            self.prompt = Some(ActivePrompt::new(request));
        }
    }

    async fn handle_key(&mut self, key: KeyAction) {
        if let Some(prompt) = self.prompt.take() {
            self.prompt = prompt
                .handle_key(key)
                .or_else(|| self.queued_prompts.pop_front().map(ActivePrompt::new));
            return;
        }

        match key {
            KeyAction::Up | KeyAction::Char('k') => {
                self.outline_mut(self.focus).select_previous();
                self.description = None;
            }
            KeyAction::Down | KeyAction::Char('j') => {
                self.outline_mut(self.focus).select_next();
                self.description = None;
            }
            KeyAction::Right | KeyAction::Char('l') => self.expand().await,
            KeyAction::Left | KeyAction::Char('h') => self.outline_mut(self.focus).collapse_selected(),
            KeyAction::Enter => self.activate().await,
            KeyAction::Tab => self.focus = self.focus.next(),
            KeyAction::BackTab => self.focus = self.focus.previous(),
            KeyAction::Escape => self.description = None,
            KeyAction::Char('q') => self.should_quit = true,
            KeyAction::Char(':') => self.open_palette(),
            KeyAction::Char(c) => {
                if let Some(command) = self.command_for_key(c) {
                    self.run(command).await;
                }
            }
            KeyAction::Backspace => {}
        }
    }

    fn command_for_key(&self, c: char) -> Option<Command> {
        let on_servers = self.focus == Pane::Servers;
        let command = match c {
            'a' if on_servers => Command::AddServer,
            'a' => Command::AddIssue,
            'e' if on_servers => Command::EditServer,
            'e' => Command::UpdateIssueSummary,
            'd' if on_servers => Command::DeleteServer,
            'd' => Command::DeleteIssue,
            's' => Command::UpdateIssueState,
            'p' => Command::UpdateIssuePriority,
            't' => Command::UpdateIssueType,
            'u' => Command::UpdateIssueAssignee,
            'b' => Command::CreateBranch,
            'o' => Command::GotoIssuePage,
            'i' => Command::ShowIssueDescription,
            'g' => Command::GroupIssuesBy,
            'z' => Command::SortIssuesBy,
            'x' => Command::SortOrder,
            'f' => Command::ShowIssuesAssignedTo,
            'v' => Command::ToggleCertificateValidation,
            'r' => match self.focus {
                Pane::Servers => Command::RefreshServers,
                Pane::Agiles => Command::RefreshAgiles,
                Pane::Sprints => Command::RefreshSprints,
                Pane::Recent => Command::RefreshRecent,
            },
            _ => return None,
        };
        Some(command)
    }

    /// Pick any command by title.
    fn open_palette(&self) {
        let prompter = Arc::clone(&self.prompter);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let titles = Command::ALL.iter().map(|c| c.title().to_string()).collect();
            if let Some(command) = prompter
                .pick("Command", titles)
                .await
                .and_then(|t| Command::from_title(&t))
            {
                let _ = tx.send(Action::Run(command));
            }
        });
    }

    pub async fn run(&mut self, command: Command) {
        if command.is_interactive() {
            self.spawn_command(command);
            return;
        }
        match command {
            Command::RefreshServers => self.begin_refresh(Pane::Servers),
            Command::RefreshAgiles => self.begin_refresh(Pane::Agiles),
            Command::RefreshSprints => self.begin_refresh(Pane::Sprints),
            Command::RefreshRecent => self.begin_refresh(Pane::Recent),
            Command::ShowIssueDescription => self.show_description(),
            _ => {}
        }
    }

    fn command_context(&self) -> CommandContext {
        CommandContext {
            registry: self.services.registry.clone(),
            settings: Arc::clone(&self.services.settings),
            prompter: Arc::clone(&self.prompter),
            notifier: Arc::clone(&self.notifier),
            opener: Arc::clone(&self.services.opener),
            vcs: self.services.vcs.clone(),
        }
    }

    fn scope(&self) -> Scope {
        let server = match self.servers.selected_node() {
            Some(Node::Server(server)) => Some(server.clone()),
            _ => None,
        };
        Scope {
            server,
            editor: self.sprints_view.editor(),
            issue: self.selected_issue().map(|n| n.issue.clone()),
        }
    }

    /// Prompts would block the UI loop, so interactive commands run in their
    /// own task and report back with `CommandFinished`.
    fn spawn_command(&mut self, command: Command) {
        if let Some(running) = self.running {
            self.flash(
                NoticeLevel::Warning,
                format!("{} is still running", running.title()),
            );
            return;
        }
        self.running = Some(command);
        let scope = self.scope();
        let ctx = self.command_context();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let effect = commands::execute(command, scope, &ctx).await;
            let _ = tx.send(Action::CommandFinished(effect));
        });
    }

    async fn apply_effect(&mut self, effect: CommandEffect) {
        match effect {
            CommandEffect::None => {}
            CommandEffect::ServerAdded(server) => {
                self.refresh_servers().await;
                if self.connected.is_none() {
                    self.connect(Some(server)).await;
                }
            }
            CommandEffect::ServerEdited { previous, updated } => {
                self.refresh_servers().await;
                if self.connected.as_ref().is_some_and(|c| c.url == previous.url) {
                    self.connect(Some(updated)).await;
                }
            }
            CommandEffect::ServerDeleted { deleted, remaining } => {
                tracing::info!(label = %deleted.label, "server removed");
                self.refresh_servers().await;
                let still_there = self
                    .connected
                    .as_ref()
                    .is_some_and(|c| remaining.iter().any(|s| s.url == c.url));
                if !still_there {
                    self.connect(None).await;
                }
            }
            CommandEffect::IssuesChanged => {
                self.refresh_sprints().await;
                self.refresh_recent().await;
            }
        }
    }

    async fn activate(&mut self) {
        let Some(node) = self.outline(self.focus).selected_node().cloned() else {
            return;
        };
        match node {
            Node::Server(server) => self.connect(Some(server)).await,
            Node::Placeholder { .. } if self.focus == Pane::Servers => {
                self.spawn_command(Command::AddServer)
            }
            Node::Agile(_) | Node::Project { .. } => {
                if let Some(context) = AgilesView::context_for(&node) {
                    self.select_board(context).await;
                }
            }
            Node::Issue(_) => self.show_description(),
            Node::Sprint(_) | Node::Group { .. } => {
                let expanded = self.outline(self.focus).selected().is_some_and(|e| e.expanded);
                if expanded {
                    self.outline_mut(self.focus).collapse_selected();
                } else {
                    self.expand().await;
                }
            }
            Node::Placeholder { .. } => {}
        }
    }

    async fn expand(&mut self) {
        let Some(entry) = self.outline(self.focus).selected() else {
            return;
        };
        if entry.expanded || !entry.node.is_expandable() {
            return;
        }
        let node = entry.node.clone();
        let children = match self.focus {
            Pane::Agiles => self.agiles_view.children(Some(&node)).await,
            Pane::Sprints => self.sprints_view.children(Some(&node)).await,
            Pane::Servers | Pane::Recent => return,
        };
        self.outline_mut(self.focus).expand_selected(children);
    }

    /// Agile or project selection: seed the issue views.
    async fn select_board(&mut self, context: BoardContext) {
        tracing::info!(agile = %context.agile.id, project = ?context.project.as_ref().map(|p| &p.id), "board selected");
        self.recent_view.set_project(context.project.clone());
        self.sprints_view.select(context);
        self.description = None;
        self.refresh_sprints().await;
        self.refresh_recent().await;
    }

    fn show_description(&mut self) {
        match self.selected_issue() {
            Some(issue) => self.description = Some(issue.description_page()),
            None => self.notifier.warn("Select an issue first"),
        }
    }

    /// Connect the issue views to `server`, or reset them when `None`.
    pub async fn connect(&mut self, server: Option<ServerInfo>) {
        let client = match &server {
            Some(server) => {
                let options = ConnectOptions {
                    validate_certificate: self.settings().validate_certificate,
                    ..Default::default()
                };
                match self.services.connector.connect(server, options).await {
                    Ok(client) => Some(client),
                    Err(e) => {
                        tracing::error!(url = %server.url, error = %e, "failed to connect");
                        self.notifier
                            .error(&format!("Failed to connect to {}: {e}", server.label));
                        None
                    }
                }
            }
            None => None,
        };
        self.connected = server.filter(|_| client.is_some());

        self.agiles_view.set_client(client.clone());
        self.sprints_view.reset();
        self.sprints_view.set_client(client.clone());
        self.recent_view.reset();
        self.recent_view.set_client(client);
        self.description = None;

        self.refresh_agiles().await;
        self.refresh_sprints().await;
        self.refresh_recent().await;
    }

    async fn settings_changed(&mut self) {
        let current = self.settings();
        let previous = std::mem::replace(&mut self.settings_seen, current);
        if previous == current {
            return;
        }
        if previous.validate_certificate != current.validate_certificate {
            if let Some(server) = self.connected.clone() {
                self.connect(Some(server)).await;
                return;
            }
        }
        self.refresh_sprints().await;
        self.refresh_recent().await;
    }

    /// Mark the pane as loading and queue the fetch, so the main loop draws in between.
    fn begin_refresh(&mut self, pane: Pane) {
        self.outline_mut(pane).loading = true;
        if self.action_tx.send(Action::Fetch(pane)).is_err() {
            self.outline_mut(pane).loading = false;
        }
    }

    async fn refresh(&mut self, pane: Pane) {
        match pane {
            Pane::Servers => self.refresh_servers().await,
            Pane::Agiles => self.refresh_agiles().await,
            Pane::Sprints => self.refresh_sprints().await,
            Pane::Recent => self.refresh_recent().await,
        }
    }

    pub async fn refresh_servers(&mut self) {
        let nodes = match self.services.registry.list() {
            Ok(servers) if servers.is_empty() => vec![Node::empty(NO_SERVERS)],
            Ok(servers) => servers.into_iter().map(Node::Server).collect(),
            Err(e) => {
                tracing::error!(error = %e, "failed to read servers");
                self.notifier.error(&format!("Failed to read servers: {e}"));
                vec![Node::error(SERVERS_FAILED)]
            }
        };
        self.servers.set_roots(nodes);
    }

    pub async fn refresh_agiles(&mut self) {
        let nodes = self.agiles_view.children(None).await;
        self.agiles.set_roots(nodes);
    }

    pub async fn refresh_sprints(&mut self) {
        let nodes = self.sprints_view.children(None).await;
        self.sprints.set_roots(nodes);
    }

    pub async fn refresh_recent(&mut self) {
        let nodes = self.recent_view.children().await;
        self.recent.set_roots(nodes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockConnector, MockTracker};
    use crate::host::testing::RecordingOpener;
    use crate::model::youtrack::{Agile, Issue, Project, Sprint};
    use crate::registry::ServerDraft;
    use crate::secrets::testing::MemorySecretStore;
    use crate::tree::{agiles, recent, sprints};

    fn demo_project() -> Project {
        Project {
            id: "0-1".into(),
            name: Some("Demo".into()),
            short_name: Some("DEMO".into()),
            ..Default::default()
        }
    }

    fn tracker() -> MockTracker {
        let mut tracker = MockTracker::new();
        tracker.agiles = vec![Agile {
            id: "108-1".into(),
            name: "Board".into(),
            projects: vec![demo_project()],
            sprints: vec![Sprint {
                id: "s1".into(),
                name: Some("Sprint 1".into()),
                ..Default::default()
            }],
            ..Default::default()
        }];
        tracker.issues = vec![Issue {
            id: "2-1".into(),
            number_in_project: 1,
            summary: Some("First".into()),
            project: Some(demo_project()),
            ..Default::default()
        }];
        tracker
    }

    struct Fixture {
        app: App,
        registry: ServerRegistry,
        settings: Arc<SettingsStore>,
        connector: Arc<MockConnector>,
        rx: mpsc::UnboundedReceiver<Action>,
    }

    fn fixture(servers: &[&str]) -> Fixture {
        let registry = ServerRegistry::new(Arc::new(MemorySecretStore::default()));
        for url in servers {
            registry
                .add(ServerDraft {
                    url: Some(url.to_string()),
                    label: None,
                    token: Some("perm:t".into()),
                })
                .unwrap();
        }
        let settings = Arc::new(SettingsStore::new(ViewSettings::default(), None));
        let connector = Arc::new(MockConnector::new(|_| tracker()));
        let (tx, rx) = mpsc::unbounded_channel();
        let services = Services {
            registry: registry.clone(),
            settings: Arc::clone(&settings),
            connector: connector.clone(),
            opener: Arc::new(RecordingOpener::default()),
            vcs: None,
        };
        Fixture {
            app: App::new(services, tx),
            registry,
            settings,
            connector,
            rx,
        }
    }

    fn labels(outline: &Outline) -> Vec<String> {
        outline.entries().iter().map(|e| e.node.label()).collect()
    }

    #[tokio::test]
    async fn no_servers_means_every_view_asks_for_one() {
        let mut f = fixture(&[]);
        f.app.start().await;

        assert_eq!(labels(&f.app.servers), vec![NO_SERVERS]);
        assert_eq!(labels(&f.app.agiles), vec![agiles::NO_SERVER]);
        assert_eq!(labels(&f.app.sprints), vec![sprints::NO_SERVER]);
        assert_eq!(labels(&f.app.recent), vec![recent::NO_SERVER]);
        assert!(f.connector.connections().is_empty());
    }

    #[tokio::test]
    async fn start_connects_to_first_server() {
        let mut f = fixture(&["https://a.example.com", "https://b.example.com"]);
        f.app.start().await;

        assert_eq!(f.app.connected.as_ref().unwrap().url, "https://a.example.com");
        assert_eq!(labels(&f.app.agiles), vec!["Board"]);
        assert_eq!(labels(&f.app.sprints), vec![sprints::NO_BOARD]);
        assert_eq!(
            f.connector.connections(),
            vec![("https://a.example.com".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn selecting_a_project_seeds_issue_views() {
        let mut f = fixture(&["https://a.example.com"]);
        f.app.start().await;

        f.app.focus = Pane::Agiles;
        f.app.update(Action::Key(KeyAction::Right)).await;
        f.app.update(Action::Key(KeyAction::Down)).await;
        f.app.update(Action::Key(KeyAction::Enter)).await;

        assert_eq!(labels(&f.app.sprints), vec!["Sprint 1"]);
        assert_eq!(labels(&f.app.recent), vec!["DEMO-1: First"]);

        f.app.focus = Pane::Sprints;
        f.app.update(Action::Key(KeyAction::Right)).await;
        assert_eq!(labels(&f.app.sprints), vec!["Sprint 1", "DEMO-1: First"]);

        f.app.update(Action::Key(KeyAction::Down)).await;
        f.app.update(Action::Key(KeyAction::Enter)).await;
        let page = f.app.description.as_ref().unwrap();
        assert_eq!(page[0], "DEMO-1: First");
    }

    #[tokio::test]
    async fn selecting_an_agile_uses_its_first_project() {
        let mut f = fixture(&["https://a.example.com"]);
        f.app.start().await;

        f.app.focus = Pane::Agiles;
        f.app.update(Action::Key(KeyAction::Enter)).await;

        assert_eq!(labels(&f.app.sprints), vec!["Sprint 1"]);
        assert_eq!(labels(&f.app.recent), vec!["DEMO-1: First"]);
        let board = f.app.board().unwrap();
        assert_eq!(board.agile.id, "108-1");
        assert_eq!(board.project.as_ref().unwrap().id, "0-1");
    }

    #[tokio::test]
    async fn expanding_an_agile_lists_its_projects() {
        let mut f = fixture(&["https://a.example.com"]);
        f.app.start().await;

        f.app.focus = Pane::Agiles;
        f.app.update(Action::Key(KeyAction::Right)).await;
        assert_eq!(labels(&f.app.agiles), vec!["Board", "Demo"]);

        f.app.update(Action::Key(KeyAction::Left)).await;
        assert_eq!(labels(&f.app.agiles), vec!["Board"]);
    }

    #[tokio::test]
    async fn deleting_last_server_resets_dependent_views() {
        let mut f = fixture(&["https://a.example.com"]);
        f.app.start().await;
        f.app.focus = Pane::Agiles;
        f.app.update(Action::Key(KeyAction::Enter)).await;

        let server = f.registry.first().unwrap().unwrap();
        let remaining = f.registry.delete(&server.label).unwrap();
        f.app
            .update(Action::CommandFinished(CommandEffect::ServerDeleted {
                deleted: server,
                remaining,
            }))
            .await;

        assert!(f.app.connected.is_none());
        assert_eq!(labels(&f.app.servers), vec![NO_SERVERS]);
        assert_eq!(labels(&f.app.agiles), vec![agiles::NO_SERVER]);
        assert_eq!(labels(&f.app.sprints), vec![sprints::NO_SERVER]);
        assert_eq!(labels(&f.app.recent), vec![recent::NO_SERVER]);
    }

    #[tokio::test]
    async fn deleting_another_server_keeps_the_connection() {
        let mut f = fixture(&["https://a.example.com", "https://b.example.com"]);
        f.app.start().await;

        let other = f.registry.list().unwrap()[1].clone();
        let remaining = f.registry.delete(&other.label).unwrap();
        f.app
            .update(Action::CommandFinished(CommandEffect::ServerDeleted {
                deleted: other,
                remaining,
            }))
            .await;

        assert_eq!(f.app.connected.as_ref().unwrap().url, "https://a.example.com");
        assert_eq!(f.connector.connections().len(), 1);
    }

    #[tokio::test]
    async fn editing_connected_server_reconnects() {
        let mut f = fixture(&["https://a.example.com"]);
        f.app.start().await;

        let previous = f.registry.first().unwrap().unwrap();
        let updated = f
            .registry
            .edit(
                &previous,
                ServerDraft {
                    url: Some("https://c.example.com".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        f.app
            .update(Action::CommandFinished(CommandEffect::ServerEdited { previous, updated }))
            .await;

        assert_eq!(f.app.connected.as_ref().unwrap().url, "https://c.example.com");
        assert_eq!(labels(&f.app.servers), vec!["a.example.com"]);
    }

    #[tokio::test]
    async fn certificate_setting_change_reconnects() {
        let mut f = fixture(&["https://a.example.com"]);
        f.app.start().await;

        f.settings.update(|s| s.validate_certificate = false).unwrap();
        f.app.update(Action::SettingsChanged).await;

        assert_eq!(
            f.connector.connections(),
            vec![
                ("https://a.example.com".to_string(), true),
                ("https://a.example.com".to_string(), false)
            ]
        );
    }

    #[tokio::test]
    async fn prompts_queue_while_one_is_open() {
        let mut f = fixture(&[]);
        let (first_tx, first_rx) = tokio::sync::oneshot::channel();
        let (second_tx, second_rx) = tokio::sync::oneshot::channel();

        f.app
            .update(Action::Prompt(PromptRequest::Confirm {
                message: "first".into(),
                reply: first_tx,
            }))
            .await;
        f.app
            .update(Action::Prompt(PromptRequest::Confirm {
                message: "second".into(),
                reply: second_tx,
            }))
            .await;
        assert_eq!(f.app.prompt.as_ref().unwrap().title(), "first");

        f.app.update(Action::Key(KeyAction::Char('y'))).await;
        assert_eq!(f.app.prompt.as_ref().unwrap().title(), "second");
        f.app.update(Action::Key(KeyAction::Escape)).await;

        assert!(f.app.prompt.is_none());
        assert!(first_rx.await.unwrap());
        assert!(!second_rx.await.unwrap());
        assert!(!f.app.should_quit);
    }

    #[tokio::test]
    async fn refresh_shows_loading_until_fetched() {
        let mut f = fixture(&["https://a.example.com"]);
        f.app.start().await;
        f.app.focus = Pane::Agiles;

        f.app.update(Action::Key(KeyAction::Char('r'))).await;
        assert!(f.app.agiles.loading);
        assert_eq!(labels(&f.app.agiles), vec!["Board"]);

        let pane = loop {
            match f.rx.recv().await {
                Some(Action::Fetch(pane)) => break pane,
                Some(_) => continue,
                None => panic!("action channel closed"),
            }
        };
        assert_eq!(pane, Pane::Agiles);

        f.app.update(Action::Fetch(pane)).await;
        assert!(!f.app.agiles.loading);
        assert_eq!(labels(&f.app.agiles), vec!["Board"]);
    }

    #[tokio::test]
    async fn notices_flash_and_expire() {
        let mut f = fixture(&[]);
        f.app
            .update(Action::Notice(NoticeLevel::Warning, "careful".into()))
            .await;
        assert_eq!(f.app.flash_message.as_ref().unwrap().0, "careful");

        f.app.flash_message.as_mut().unwrap().2 =
            Instant::now() - std::time::Duration::from_secs(FLASH_SECS + 1);
        f.app.update(Action::Tick).await;
        assert!(f.app.flash_message.is_none());
    }

    #[tokio::test]
    async fn focus_cycles_through_panes() {
        let mut f = fixture(&[]);
        for expected in [Pane::Agiles, Pane::Sprints, Pane::Recent, Pane::Servers] {
            f.app.update(Action::Key(KeyAction::Tab)).await;
            assert_eq!(f.app.focus, expected);
        }
        f.app.update(Action::Key(KeyAction::BackTab)).await;
        assert_eq!(f.app.focus, Pane::Recent);
    }
}
