//! Capabilities the terminal host provides to the trees and commands.

use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking, user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: String);

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message.to_string());
    }

    fn warn(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message.to_string());
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRequest {
    pub title: String,
    pub placeholder: String,
    /// Pre-filled text.
    pub value: String,
    /// Mask the typed text (tokens).
    pub secret: bool,
}

impl InputRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }
}

/// Interactive prompts. `None`/`false` means the user cancelled.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn input(&self, request: InputRequest) -> Option<String>;
    async fn pick(&self, title: &str, items: Vec<String>) -> Option<String>;
    async fn confirm(&self, message: &str) -> bool;
}

pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform's default handler.
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        let program = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        };
        std::process::Command::new(program)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to run {program}"))?;
        Ok(())
    }
}
