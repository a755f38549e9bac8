use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum LookfigError {
    #[error("Invalid record: {reason}")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(lookfig::invalid_record),
            help("every field returned by Record::fields() needs a distinct name")
        )
    )]
    InvalidRecord { reason: String },

    #[error("Lookup for field '{field}' failed: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(lookfig::source_failed)))]
    SourceLookupFailed {
        field: &'static str,
        source: SourceError,
    },

    #[error("Missing value for required field '{field}' (key '{key}')")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(lookfig::missing_required),
            help("set the key in one of the sources, or mark the field optional")
        )
    )]
    MissingRequiredField { field: &'static str, key: String },

    #[error("Value '{value}' for field '{field}' is not {target}: {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(lookfig::bad_value)))]
    TypeCoercionFailed {
        field: &'static str,
        value: String,
        target: &'static str,
        reason: String,
    },

    #[error("App name is required to resolve {location:?}; call .app_name() on the builder")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(lookfig::app_name_required)))]
    AppNameRequired { location: crate::types::SearchPath },
}

impl LookfigError {
    /// Name of the record field the error is attributed to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            LookfigError::SourceLookupFailed { field, .. }
            | LookfigError::MissingRequiredField { field, .. }
            | LookfigError::TypeCoercionFailed { field, .. } => Some(*field),
            LookfigError::InvalidRecord { .. } | LookfigError::AppNameRequired { .. } => None,
        }
    }
}

/// Failure reported by a [`Source`](crate::Source).
///
/// Cloneable so that sources which parse once can hand the same failure back
/// on every lookup.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: Arc<std::io::Error>,
    },

    #[error("Invalid JSON in {origin}: {reason}")]
    Json { origin: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Toml { path: PathBuf, reason: String },

    #[error("Invalid form data: {0}")]
    Form(String),

    #[error("Value of '{key}' is not valid unicode")]
    NotUnicode { key: String },

    #[error(transparent)]
    Custom(Arc<dyn std::error::Error + Send + Sync>),
}

impl SourceError {
    pub fn custom<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SourceError::Custom(Arc::new(err))
    }
}

/// A raw string that could not be converted to a field's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid {target}: {reason}")]
pub struct CoerceError {
    pub target: &'static str,
    pub reason: String,
}

impl CoerceError {
    pub(crate) fn new(target: &'static str, reason: impl ToString) -> Self {
        Self {
            target,
            reason: reason.to_string(),
        }
    }
}
