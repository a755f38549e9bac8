//! Parsed JSON / TOML objects answering key lookups with plain strings.
//!
//! A key is first matched literally against the top-level object. If that
//! fails and the key contains dots, it is walked as a path through nested
//! objects (`"database.url"`).

use serde_json::{Map, Value as Json};
use toml::{Table, Value as Toml};

#[derive(Debug, Clone)]
pub(crate) enum Document {
    Json(Map<String, Json>),
    Toml(Table),
}

impl Document {
    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            Document::Json(map) => json_get(map, key).map(json_to_string),
            Document::Toml(table) => toml_get(table, key).map(toml_to_string),
        }
    }
}

fn json_get<'a>(map: &'a Map<String, Json>, key: &str) -> Option<&'a Json> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }
    let (path, leaf) = key.rsplit_once('.')?;
    let mut current = map;
    for segment in path.split('.') {
        current = current.get(segment)?.as_object()?;
    }
    current.get(leaf)
}

fn toml_get<'a>(table: &'a Table, key: &str) -> Option<&'a Toml> {
    if let Some(value) = table.get(key) {
        return Some(value);
    }
    let (path, leaf) = key.rsplit_once('.')?;
    let mut current = table;
    for segment in path.split('.') {
        current = current.get(segment)?.as_table()?;
    }
    current.get(leaf)
}

/// Strings verbatim, `null` as empty, everything else as compact JSON text.
fn json_to_string(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

fn toml_to_string(value: &Toml) -> String {
    match value {
        Toml::String(s) => s.clone(),
        Toml::Integer(i) => i.to_string(),
        Toml::Float(f) => f.to_string(),
        Toml::Boolean(b) => b.to_string(),
        Toml::Datetime(dt) => dt.to_string(),
        other => other.to_string(),
    }
}
