use std::collections::HashMap;
use std::env::VarError;

use crate::error::SourceError;
use crate::source::Source;

/// Environment variables as a [`Source`].
///
/// Reads the process environment at lookup time, or a fixed snapshot of
/// variables (built with [`Env::from_vars`]) so tests can pass synthetic data
/// instead of mutating the real environment.
///
/// An optional prefix is prepended to every key: with prefix `MYAPP_`, key
/// `PORT` reads `MYAPP_PORT`.
#[derive(Debug, Clone, Default)]
pub struct Env {
    prefix: String,
    snapshot: Option<HashMap<String, String>>,
}

impl Env {
    /// The live process environment.
    pub fn process() -> Self {
        Self::default()
    }

    /// A fixed set of variables, e.g. `std::env::vars()` or test pairs.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: String::new(),
            snapshot: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }
}

impl Source for Env {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        let name = format!("{}{key}", self.prefix);
        match &self.snapshot {
            Some(vars) => Ok(vars.get(&name).cloned()),
            None => match std::env::var(&name) {
                Ok(value) => Ok(Some(value)),
                Err(VarError::NotPresent) => Ok(None),
                Err(VarError::NotUnicode(_)) => Err(SourceError::NotUnicode { key: name }),
            },
        }
    }
}
