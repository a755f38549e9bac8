//! Field metadata: which key feeds a field, and whether it may be absent.
//!
//! A field carries up to two tag systems, each holding `key` or
//! `key,marker`. They are consulted in a fixed priority order and only the
//! first one present counts:
//!
//! | Tag system | Optional marker | Priority |
//! |------------|-----------------|----------|
//! | `json`     | `omitempty`     | first    |
//! | `lookup`   | `optional`      | second   |
//!
//! A field with neither tag is not looked up at all.

/// A convention for attaching a lookup key to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSystem {
    /// General-purpose structured-data tag (`json = "key,omitempty"`).
    Json,
    /// Dedicated lookup tag (`lookup = "KEY,optional"`).
    Lookup,
}

impl TagSystem {
    /// Tag systems in the order they are consulted.
    pub const PRIORITY: [TagSystem; 2] = [TagSystem::Json, TagSystem::Lookup];

    pub fn name(self) -> &'static str {
        match self {
            TagSystem::Json => "json",
            TagSystem::Lookup => "lookup",
        }
    }

    /// The second comma-separated part that marks a field optional.
    pub fn optional_marker(self) -> &'static str {
        match self {
            TagSystem::Json => "omitempty",
            TagSystem::Lookup => "optional",
        }
    }
}

/// The tags declared on one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tags {
    json: Option<&'static str>,
    lookup: Option<&'static str>,
}

impl Tags {
    pub const fn new() -> Self {
        Self {
            json: None,
            lookup: None,
        }
    }

    pub const fn json(mut self, tag: &'static str) -> Self {
        self.json = Some(tag);
        self
    }

    pub const fn lookup(mut self, tag: &'static str) -> Self {
        self.lookup = Some(tag);
        self
    }

    pub fn get(&self, system: TagSystem) -> Option<&'static str> {
        match system {
            TagSystem::Json => self.json,
            TagSystem::Lookup => self.lookup,
        }
    }
}

/// The lookup key of a field and whether it may be missing from every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKey {
    pub key: &'static str,
    pub optional: bool,
}

/// Determine the lookup key and optionality of a field.
///
/// Returns `None` when no recognized tag is present, meaning the field is
/// excluded from resolution. The first comma-separated part is the key as
/// written, so `",omitempty"` looks up the empty key.
pub fn extract(field_name: &'static str, tags: &Tags) -> Option<FieldKey> {
    let (system, tag) = TagSystem::PRIORITY
        .into_iter()
        .find_map(|system| tags.get(system).filter(|t| !t.is_empty()).map(|t| (system, t)))?;

    let mut parts = tag.split(',');
    let key = parts.next().unwrap_or(field_name);
    let optional = parts.next() == Some(system.optional_marker());

    Some(FieldKey { key, optional })
}
