//! Priority-ordered source lookup.
//!
//! Sources are consulted front to back. The first one that finds the key
//! wins and later sources are never asked. When nobody finds it, the last
//! source's answer is returned as-is: `Ok(None)` if it simply lacks the key,
//! or its error if it failed. Failures of earlier sources are logged and
//! otherwise absorbed, so a broken optional config file does not mask an
//! environment variable further down the chain.

use std::fmt;

use crate::error::{LookfigError, SourceError};
use crate::fill::fill;
use crate::record::Record;
use crate::report::Reporter;
use crate::source::Source;

/// Look `key` up in `sources`, in order.
pub fn resolve<'s, I>(key: &str, sources: I) -> Result<Option<String>, SourceError>
where
    I: IntoIterator<Item = &'s dyn Source>,
{
    let mut last = Ok(None);
    for (index, source) in sources.into_iter().enumerate() {
        if let Err(e) = &last {
            tracing::warn!(key, error = %e, "source failed, trying the next one");
        }
        last = source.lookup_key(key);
        if let Ok(Some(_)) = &last {
            tracing::trace!(key, source = index, "key found");
            return last;
        }
    }
    last
}

/// An owned, ordered list of sources that behaves as a single [`Source`].
///
/// Usually assembled with [`Chain::builder`], but any boxed sources will do.
#[derive(Default)]
pub struct Chain {
    sources: Vec<Box<dyn Source>>,
}

impl Chain {
    pub fn new(sources: Vec<Box<dyn Source>>) -> Self {
        Self { sources }
    }

    /// Append a source with the lowest priority so far.
    pub fn push(&mut self, source: impl Source + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fill `record` from this chain without reporting.
    pub fn fill<R: Record + ?Sized>(&self, record: &mut R) -> Result<(), LookfigError> {
        fill(record, None, &[self as &dyn Source])
    }

    /// Fill `record` from this chain, reporting every set or defaulted field.
    pub fn fill_reporting<R: Record + ?Sized>(
        &self,
        record: &mut R,
        reporter: &mut dyn Reporter,
    ) -> Result<(), LookfigError> {
        fill(record, Some(reporter), &[self as &dyn Source])
    }
}

impl Source for Chain {
    fn lookup_key(&self, key: &str) -> Result<Option<String>, SourceError> {
        resolve(key, self.sources.iter().map(|s| s.as_ref() as &dyn Source))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("sources", &self.sources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::source::{Defaults, from_fn};

    struct Failing;

    impl Source for Failing {
        fn lookup_key(&self, _key: &str) -> Result<Option<String>, SourceError> {
            Err(SourceError::Form("broken".into()))
        }
    }

    struct Counting<'a>(&'a AtomicUsize);

    impl Source for Counting<'_> {
        fn lookup_key(&self, _key: &str) -> Result<Option<String>, SourceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Some("late".into()))
        }
    }

    #[test]
    fn empty_list_is_absent() {
        assert_eq!(resolve("A", Vec::<&dyn Source>::new()).unwrap(), None);
    }

    #[test]
    fn first_found_wins_and_stops() {
        let calls = AtomicUsize::new(0);
        let first = Defaults::from([("A", "early")]);
        let second = Counting(&calls);
        let found = resolve("A", [&first as &dyn Source, &second]).unwrap();
        assert_eq!(found.as_deref(), Some("early"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_string_counts_as_found() {
        let first = Defaults::from([("A", "")]);
        let second = Defaults::from([("A", "fallback")]);
        let found = resolve("A", [&first as &dyn Source, &second]).unwrap();
        assert_eq!(found.as_deref(), Some(""));
    }

    #[test]
    fn earlier_error_is_absorbed() {
        let fallback = Defaults::from([("A", "1")]);
        let found = resolve("A", [&Failing as &dyn Source, &fallback]).unwrap();
        assert_eq!(found.as_deref(), Some("1"));

        let found = resolve("B", [&Failing as &dyn Source, &fallback]).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn last_error_is_returned() {
        let empty = Defaults::new();
        let err = resolve("A", [&empty as &dyn Source, &Failing]).unwrap_err();
        assert!(matches!(err, SourceError::Form(_)));
    }

    #[test]
    fn chain_is_a_source() {
        let mut chain = Chain::default();
        chain.push(from_fn(|key| (key == "A").then(|| "from fn".to_string())));
        chain.push(Defaults::from([("A", "default"), ("B", "default")]));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.lookup_key("A").unwrap().as_deref(), Some("from fn"));
        assert_eq!(chain.lookup_key("B").unwrap().as_deref(), Some("default"));
        assert_eq!(chain.lookup_key("C").unwrap(), None);
    }

    #[test]
    fn chains_nest() {
        let inner = Chain::new(vec![Box::new(Failing)]);
        let outer = Chain::new(vec![
            Box::new(inner),
            Box::new(Defaults::from([("A", "outer")])),
        ]);
        assert_eq!(outer.lookup_key("A").unwrap().as_deref(), Some("outer"));
    }
}
