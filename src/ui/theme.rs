use ratatui::style::{Color, Modifier, Style};

use crate::host::NoticeLevel;
use crate::tree::node::Icon;

pub fn icon_glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Server => "⛁",
        Icon::Board => "▦",
        Icon::Project => "◆",
        Icon::ArchivedProject => "◇",
        Icon::Sprint => "↻",
        Icon::Folder => "▸",
        Icon::Issue => "○",
        Icon::ResolvedIssue => "✓",
        Icon::MyIssue => "●",
        Icon::Info => "ℹ",
        Icon::Warning => "⚠",
    }
}

pub fn icon_color(icon: Icon) -> Color {
    match icon {
        Icon::Server => Color::Rgb(0x4F, 0xC3, 0xF7),
        Icon::Board => Color::Rgb(0xCE, 0x93, 0xD8),
        Icon::Project => Color::Rgb(0x81, 0xC7, 0x84),
        Icon::ArchivedProject => Color::DarkGray,
        Icon::Sprint => Color::Rgb(0xFF, 0x70, 0x43),
        Icon::Folder => Color::Yellow,
        Icon::Issue => Color::Gray,
        Icon::ResolvedIssue => Color::Green,
        Icon::MyIssue => Color::Cyan,
        Icon::Info => Color::DarkGray,
        Icon::Warning => Color::Red,
    }
}

pub fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::Yellow,
        NoticeLevel::Warning => Color::Rgb(0xFF, 0x98, 0x00),
        NoticeLevel::Error => Color::Red,
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
