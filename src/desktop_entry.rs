//! Freedesktop launcher descriptors (`.desktop` files)

use crate::config::KlackConfig;
use std::path::{Path, PathBuf};

pub const SECTION_HEADER: &str = "[Desktop Entry]";

/// Key that marks the autostart copy as enabled for GNOME sessions
pub const AUTOSTART_ENABLED_KEY: &str = "X-GNOME-Autostart-enabled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    pub name: String,
    pub comment: String,
    pub exec: PathBuf,
    pub icon: PathBuf,
    pub terminal: bool,
    pub categories: Vec<String>,
    pub startup_notify: bool,
}

impl DesktopEntry {
    pub fn new(config: &KlackConfig, exec: &Path, icon: &Path) -> Self {
        Self {
            name: config.name.clone(),
            comment: config.comment.clone(),
            exec: exec.to_path_buf(),
            icon: icon.to_path_buf(),
            terminal: config.terminal,
            categories: config.categories.clone(),
            startup_notify: config.startup_notify,
        }
    }

    pub fn render(&self) -> String {
        let categories: String = self
            .categories
            .iter()
            .map(|c| format!("{};", c.trim_end_matches(';')))
            .collect();
        format!(
            "{SECTION_HEADER}
Type=Application
Name={}
Comment={}
Exec={}
Icon={}
Terminal={}
Categories={}
StartupNotify={}
",
            escape_value(&self.name),
            escape_value(&self.comment),
            quote_exec_arg(&self.exec.to_string_lossy()),
            escape_value(&self.icon.to_string_lossy()),
            self.terminal,
            categories,
            self.startup_notify,
        )
    }
}

// In the Exec= line, arguments containing spaces or reserved characters must be
// double quoted, with ", `, $ and \ escaped by a backslash. The whole value is
// then unescaped as a string first, so every quoting backslash is written twice.
// A literal % is written as %% so it is not read as a field code.
pub fn quote_exec_arg(arg: &str) -> String {
    const RESERVED: &[char] = &[
        ' ', '\t', '\n', '\r', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?',
        '#', '(', ')', '`',
    ];
    let needs_quotes = arg.is_empty() || arg.contains(RESERVED);
    let mut out = String::with_capacity(arg.len() + 2);
    if needs_quotes {
        out.push('"');
    }
    for ch in arg.chars() {
        match ch {
            '%' => out.push_str("%%"),
            '"' | '`' | '$' => {
                out.push_str("\\\\");
                out.push(ch);
            }
            '\\' => out.push_str("\\\\\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    if needs_quotes {
        out.push('"');
    }
    out
}

/// Escapes a plain string value (Name, Comment, Icon)
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// Sets `key=value` in descriptor text so the key appears exactly once.
/// The first existing occurrence is replaced in place, later ones are dropped,
/// and the line is appended when the key is absent.
pub fn upsert_key(contents: &str, key: &str, value: &str) -> String {
    let line = format!("{key}={value}");
    let mut out = String::with_capacity(contents.len() + line.len() + 1);
    let mut seen = false;
    for existing in contents.lines() {
        let is_key = existing
            .split_once('=')
            .map(|(k, _)| k.trim() == key)
            .unwrap_or(false);
        if is_key {
            if seen {
                continue;
            }
            seen = true;
            out.push_str(&line);
        } else {
            out.push_str(existing);
        }
        out.push('\n');
    }
    if !seen {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
