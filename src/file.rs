//! File-backed sources and config directory discovery.
//!
//! [`JsonFile`] and [`TomlFile`] read and parse their file once, on first
//! lookup, and answer every later lookup from the parsed document. The
//! one-time load is guarded by a [`OnceLock`], so a source shared between
//! threads converges on a single parse attempt.
//!
//! A load failure is cached too: every lookup on the same instance returns
//! the same error. Sources built with `allow_missing()` treat a file that
//! does not exist as an empty document instead, which is what the builder
//! uses for [`SearchPath`] locations.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::document::Document;
use crate::error::SourceError;
use crate::source::Source;
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Read a file, mapping "not found" to `None` when `allow_missing` is set.
fn read_file(path: &Path, allow_missing: bool) -> Result<Option<String>, SourceError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if allow_missing && e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        }
        Err(e) => Err(SourceError::Io {
            path: path.to_path_buf(),
            source: Arc::new(e),
        }),
    }
}

fn load_json(path: &Path, allow_missing: bool) -> Result<Document, SourceError> {
    let Some(content) = read_file(path, allow_missing)? else {
        return Ok(Document::Json(Default::default()));
    };
    let map = serde_json::from_str(&content).map_err(|e| SourceError::Json {
        origin: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded JSON config");
    Ok(Document::Json(map))
}

fn load_toml(path: &Path, allow_missing: bool) -> Result<Document, SourceError> {
    let Some(content) = read_file(path, allow_missing)? else {
        return Ok(Document::Toml(Default::default()));
    };
    let table = content.parse().map_err(|e: toml::de::Error| SourceError::Toml {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded TOML config");
    Ok(Document::Toml(table))
}

fn cached_get(
    cell: &Result<Document, SourceError>,
    key: &str,
) -> Result<Option<String>, SourceError> {
    match cell {
        Ok(doc) => Ok(doc.get(key)),
        Err(e) => Err(e.clone()),
    }
}

/// A JSON object file as a [`Source`].
///
/// Top-level strings are returned verbatim, numbers and booleans as their JSON
/// text, `null` as the empty string, and arrays/objects as compact JSON.
#[derive(Debug)]
pub struct JsonFile {
    path: PathBuf,
    allow_missing: bool,
    doc: OnceLock<Result<Document, SourceError>>,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            allow_missing: false,
            doc: OnceLock::new(),
        }
    }

    /// Treat a missing file as empty instead of failing.
    pub fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for JsonFile {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        let doc = self
            .doc
            .get_or_init(|| load_json(&self.path, self.allow_missing));
        cached_get(doc, key)
    }
}

/// A TOML file as a [`Source`]. Dotted keys walk nested tables.
#[derive(Debug)]
pub struct TomlFile {
    path: PathBuf,
    allow_missing: bool,
    doc: OnceLock<Result<Document, SourceError>>,
}

impl TomlFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            allow_missing: false,
            doc: OnceLock::new(),
        }
    }

    /// Treat a missing file as empty instead of failing.
    pub fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for TomlFile {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        let doc = self
            .doc
            .get_or_init(|| load_toml(&self.path, self.allow_missing));
        cached_get(doc, key)
    }
}
