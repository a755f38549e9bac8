//! The lookup capability every source implements, plus the in-memory sources.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// A provider answering single-key lookups.
///
/// - `Ok(Some(value))`: the key was found.
/// - `Ok(None)`: the key is genuinely absent.
/// - `Err(_)`: the source itself failed.
///
/// Lookups take `&self` and must be safe to issue from any thread; sources
/// that parse lazily guard their one-time initialization internally.
pub trait Source: Send + Sync {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError>;
}

impl<S: Source + ?Sized> Source for &S {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        (**self).lookup_key(key)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        (**self).lookup_key(key)
    }
}

impl<S: Source + ?Sized> Source for Arc<S> {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        (**self).lookup_key(key)
    }
}

impl Source for HashMap<String, String> {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(key).cloned())
    }
}

impl Source for BTreeMap<String, String> {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(key).cloned())
    }
}

/// Key-to-string mapping, typically the last source in a chain.
///
/// Also the shape that [`MapReporter`](crate::report::MapReporter) accumulates
/// into, so a reported configuration can be fed back in as defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Defaults(BTreeMap<String, String>);

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Source for Defaults {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.0.get(key).cloned())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Defaults {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Defaults {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Defaults {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Source backed by an infallible function, such as a map lookup.
pub struct FnSource<F>(F);

/// Wrap `f`, which returns `None` for absent keys.
pub fn from_fn<F>(f: F) -> FnSource<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    FnSource(f)
}

impl<F> Source for FnSource<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok((self.0)(key))
    }
}

/// Source backed by a function that reports absence as an error.
pub struct FallibleFnSource<F>(F);

/// Wrap `f`; a key counts as found exactly when `f` succeeds.
pub fn from_fallible_fn<F, E>(f: F) -> FallibleFnSource<F>
where
    F: Fn(&str) -> Result<String, E> + Send + Sync,
    E: std::error::Error + Send + Sync + 'static,
{
    FallibleFnSource(f)
}

impl<F, E> Source for FallibleFnSource<F>
where
    F: Fn(&str) -> Result<String, E> + Send + Sync,
    E: std::error::Error + Send + Sync + 'static,
{
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        (self.0)(key).map(Some).map_err(SourceError::custom)
    }
}
