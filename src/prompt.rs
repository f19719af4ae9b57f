//! Prompts and notices raised by background commands, answered by the UI loop.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::app::Action;
use crate::event::KeyAction;
use crate::host::{InputRequest, NoticeLevel, Notifier, Prompter};

#[derive(Debug)]
pub enum PromptRequest {
    Input {
        request: InputRequest,
        reply: oneshot::Sender<Option<String>>,
    },
    Pick {
        title: String,
        items: Vec<String>,
        reply: oneshot::Sender<Option<String>>,
    },
    Confirm {
        message: String,
        reply: oneshot::Sender<bool>,
    },
}

/// `Prompter` that asks the UI loop and waits for the answer. A closed UI
/// counts as a cancel.
#[derive(Clone)]
pub struct ChannelPrompter {
    tx: mpsc::UnboundedSender<Action>,
}

impl ChannelPrompter {
    pub fn new(tx: mpsc::UnboundedSender<Action>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Prompter for ChannelPrompter {
    async fn input(&self, request: InputRequest) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Action::Prompt(PromptRequest::Input { request, reply }))
            .ok()?;
        rx.await.ok().flatten()
    }

    async fn pick(&self, title: &str, items: Vec<String>) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Action::Prompt(PromptRequest::Pick {
                title: title.to_string(),
                items,
                reply,
            }))
            .ok()?;
        rx.await.ok().flatten()
    }

    async fn confirm(&self, message: &str) -> bool {
        let (reply, rx) = oneshot::channel();
        let sent = self.tx.send(Action::Prompt(PromptRequest::Confirm {
            message: message.to_string(),
            reply,
        }));
        sent.is_ok() && rx.await.unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Action>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Action>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, level: NoticeLevel, message: String) {
        let _ = self.tx.send(Action::Notice(level, message));
    }
}

/// The prompt currently shown as a modal.
#[derive(Debug)]
pub struct ActivePrompt {
    request: PromptRequest,
    /// Typed text, or the filter of a pick list.
    pub buffer: String,
    pub selected: usize,
}

impl ActivePrompt {
    pub fn new(request: PromptRequest) -> Self {
        let buffer = match &request {
            PromptRequest::Input { request, .. } => request.value.clone(),
            _ => String::new(),
        };
        Self {
            request,
            buffer,
            selected: 0,
        }
    }

    pub fn title(&self) -> &str {
        match &self.request {
            PromptRequest::Input { request, .. } => &request.title,
            PromptRequest::Pick { title, .. } => title,
            PromptRequest::Confirm { message, .. } => message,
        }
    }

    pub fn placeholder(&self) -> &str {
        match &self.request {
            PromptRequest::Input { request, .. } => &request.placeholder,
            PromptRequest::Pick { .. } => "type to filter",
            PromptRequest::Confirm { .. } => "y/n",
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(&self.request, PromptRequest::Input { request, .. } if request.secret)
    }

    pub fn is_pick(&self) -> bool {
        matches!(self.request, PromptRequest::Pick { .. })
    }

    pub fn is_confirm(&self) -> bool {
        matches!(self.request, PromptRequest::Confirm { .. })
    }

    /// Pick items matching the filter, case-insensitively.
    pub fn visible_items(&self) -> Vec<&str> {
        let PromptRequest::Pick { items, .. } = &self.request else {
            return Vec::new();
        };
        let filter = self.buffer.to_lowercase();
        items
            .iter()
            .filter(|item| item.to_lowercase().contains(&filter))
            .map(String::as_str)
            .collect()
    }

    /// Feed one key. Returns the prompt back while it is still open.
    pub fn handle_key(mut self, key: KeyAction) -> Option<Self> {
        match key {
            KeyAction::Escape => {
                self.cancel();
                None
            }
            KeyAction::Enter => {
                self.submit();
                None
            }
            KeyAction::Char(c) if self.is_confirm() => match c {
                'y' | 'Y' => {
                    self.submit();
                    None
                }
                'n' | 'N' => {
                    self.cancel();
                    None
                }
                _ => Some(self),
            },
            KeyAction::Char(c) => {
                self.buffer.push(c);
                self.selected = 0;
                Some(self)
            }
            KeyAction::Backspace => {
                self.buffer.pop();
                self.selected = 0;
                Some(self)
            }
            KeyAction::Up => {
                self.selected = self.selected.saturating_sub(1);
                Some(self)
            }
            KeyAction::Down => {
                if self.selected + 1 < self.visible_items().len() {
                    self.selected += 1;
                }
                Some(self)
            }
            _ => Some(self),
        }
    }

    fn submit(self) {
        let choice = self
            .visible_items()
            .get(self.selected)
            .map(|s| s.to_string());
        match self.request {
            PromptRequest::Input { reply, .. } => {
                let _ = reply.send(Some(self.buffer));
            }
            PromptRequest::Pick { reply, .. } => {
                let _ = reply.send(choice);
            }
            PromptRequest::Confirm { reply, .. } => {
                let _ = reply.send(true);
            }
        }
    }

    pub fn cancel(self) {
        match self.request {
            PromptRequest::Input { reply, .. } | PromptRequest::Pick { reply, .. } => {
                let _ = reply.send(None);
            }
            PromptRequest::Confirm { reply, .. } => {
                let _ = reply.send(false);
            }
        }
    }
}
