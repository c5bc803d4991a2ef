//! JSON Config Decoding
//!
//! Maps a JSON object onto the config model one field at a time. A field
//! holding the wrong type is dropped with a warning and the rest of the
//! document is kept.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{TerminalColor, TerminalConfig, TerminalGroupConfig, TerminalLauncherConfig};

/// Decode a top-level JSON object into a launcher config. Never fails.
pub fn from_object(root: &Map<String, Value>) -> TerminalLauncherConfig {
    TerminalLauncherConfig {
        version: field(root, "version", "config", scalar_string),
        groups: field(root, "groups", "config", |v| entries(v, "groups", group)),
        terminals: field(root, "terminals", "config", |v| entries(v, "terminals", terminal)),
    }
}

fn group(value: &Value) -> Option<TerminalGroupConfig> {
    let object = value.as_object()?;
    let name = field(object, "name", "group", scalar_string);
    let owner = format!("group '{}'", name.as_deref().unwrap_or("unnamed"));

    Some(TerminalGroupConfig {
        terminals: field(object, "terminals", &owner, |v| entries(v, &owner, terminal))
            .unwrap_or_default(),
        name,
    })
}

fn terminal(value: &Value) -> Option<TerminalConfig> {
    let object = value.as_object()?;
    let name = field(object, "name", "terminal", scalar_string).unwrap_or_default();
    let owner = format!("terminal '{}'", name);

    Some(TerminalConfig {
        cwd: field(object, "cwd", &owner, path),
        script: field(object, "script", &owner, path),
        commands: field(object, "commands", &owner, |v| entries(v, &owner, scalar_string)),
        command: field(object, "command", &owner, scalar_string),
        command_delay: field(object, "commandDelay", &owner, millis),
        color: field(object, "color", &owner, color),
        icon: field(object, "icon", &owner, scalar_string),
        env: field(object, "env", &owner, |v| env(v, &owner)).unwrap_or_default(),
        shell_path: field(object, "shellPath", &owner, path),
        shell_args: field(object, "shellArgs", &owner, |v| entries(v, &owner, scalar_string)),
        name,
    })
}

/// Convert `object[key]`. Absent and `null` are `None`; a present value
/// that does not convert is dropped with a warning.
fn field<T>(
    object: &Map<String, Value>,
    key: &str,
    owner: &str,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let converted = convert(value);
            if converted.is_none() {
                warn!("Ignoring malformed '{}' in {}: {}", key, owner, value);
            }
            converted
        }
    }
}

/// Convert every element of an array, dropping the ones that do not convert
fn entries<T>(value: &Value, owner: &str, item: impl Fn(&Value) -> Option<T>) -> Option<Vec<T>> {
    let array = value.as_array()?;
    let converted = array
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let converted = item(entry);
            if converted.is_none() {
                warn!("Ignoring malformed entry {} of {}: {}", index, owner, entry);
            }
            converted
        })
        .collect();
    Some(converted)
}

/// Strings as-is; numbers and booleans in their JSON spelling
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn path(value: &Value) -> Option<PathBuf> {
    value.as_str().map(PathBuf::from)
}

/// Whole non-negative milliseconds, as a number or a numeric string
fn millis(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn color(value: &Value) -> Option<TerminalColor> {
    value.as_str()?.parse().ok()
}

fn env(value: &Value, owner: &str) -> Option<HashMap<String, String>> {
    let object = value.as_object()?;
    let vars = object
        .iter()
        .filter_map(|(key, entry)| {
            let converted = scalar_string(entry);
            if converted.is_none() {
                warn!("Ignoring malformed env '{}' in {}: {}", key, owner, entry);
            }
            converted.map(|v| (key.clone(), v))
        })
        .collect();
    Some(vars)
}
