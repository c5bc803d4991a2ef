//! Line-oriented config format
//!
//! Fallback encoding used when a file is not valid JSON:
//!
//! ```text
//! # comment
//! [api]
//! cwd = ./services/api
//! commands = cargo build; cargo run
//! color = green
//! ```
//!
//! Parsing never fails. Input with no `[name]` header yields no terminals.

use tracing::{debug, warn};

use crate::models::{TerminalConfig, TerminalLauncherConfig};

/// Parse the line-oriented format into a config with ungrouped terminals only
pub fn parse(content: &str) -> TerminalLauncherConfig {
    let mut terminals = Vec::new();
    let mut current: Option<TerminalConfig> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = section_header(line) {
            if let Some(done) = current.take() {
                terminals.push(done);
            }
            current = Some(TerminalConfig::named(name));
            continue;
        }

        let Some(record) = current.as_mut() else {
            debug!("Ignoring line outside of a [section]: {}", line);
            continue;
        };

        if let Some((key, value)) = line.split_once('=') {
            apply_key(record, key.trim(), value.trim());
        }
    }

    if let Some(done) = current.take() {
        terminals.push(done);
    }

    TerminalLauncherConfig::from_terminals(terminals)
}

/// `[NAME]` on a trimmed line
fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']')
}

fn apply_key(record: &mut TerminalConfig, key: &str, value: &str) {
    match key {
        "cwd" => record.cwd = Some(value.into()),
        "command" => record.command = Some(value.to_string()),
        "script" => record.script = Some(value.into()),
        "icon" => record.icon = Some(value.to_string()),
        "commands" => record.commands = Some(split_commands(value)),
        "color" => match value.parse() {
            Ok(color) => record.color = Some(color),
            Err(e) => warn!("Terminal '{}': {}", record.name, e),
        },
        other => debug!("Terminal '{}': ignoring unknown key '{}'", record.name, other),
    }
}

/// Render terminals back into the line format.
///
/// Grouped terminals are flattened. Fields the format has no key for
/// (env, shell settings, command delay) are not written.
pub fn render(config: &TerminalLauncherConfig) -> String {
    let mut out = String::new();
    let grouped = config.groups().iter().flat_map(|g| g.terminals.iter());

    for terminal in grouped.chain(config.terminals()) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", terminal.name));
        if let Some(cwd) = &terminal.cwd {
            out.push_str(&format!("cwd = {}\n", cwd.display()));
        }
        if let Some(script) = &terminal.script {
            out.push_str(&format!("script = {}\n", script.display()));
        }
        if let Some(commands) = &terminal.commands {
            out.push_str(&format!("commands = {}\n", commands.join("; ")));
        }
        if let Some(command) = &terminal.command {
            out.push_str(&format!("command = {}\n", command));
        }
        if let Some(color) = terminal.color {
            out.push_str(&format!("color = {}\n", color));
        }
        if let Some(icon) = &terminal.icon {
            out.push_str(&format!("icon = {}\n", icon));
        }
    }

    out
}

/// Split a `commands` value on `;`, trimming segments and dropping empty ones
pub fn split_commands(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
